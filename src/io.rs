//! Thin file/reader convenience wrappers around [`Parser`]. Framing and
//! chunk sizing are generally the host's responsibility; this just
//! feeds an entire file or reader through the chunked API for callers
//! who don't have their own transport layer.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::warn;

use crate::error::{Result, TouchstoneError};
use crate::matcher::match_filename;
use crate::network::TouchstoneDocument;
use crate::parser::Parser;

/// Large enough to amortize syscalls for typical Touchstone files
/// (tens of KB) while still small enough that tests reading through
/// this wrapper exercise the chunk-boundary-buffering logic in the
/// streaming core.
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Parses an entire Touchstone file from disk, returning every sweep
/// and noise block it flushed.
pub fn from_path(path: impl AsRef<Path>) -> Result<TouchstoneDocument> {
    let path = path.as_ref();
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if match_filename(name) == 0 {
            warn!(file = name, "filename does not look like a Touchstone .sNp file");
        }
    }
    let file = File::open(path).map_err(io_error)?;
    from_reader(file)
}

/// Parses an entire Touchstone stream from any [`Read`]er, one
/// fixed-size chunk at a time.
pub fn from_reader(mut reader: impl Read) -> Result<TouchstoneDocument> {
    let mut parser = Parser::new();
    let mut doc = TouchstoneDocument::new();
    let mut buf = [0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut buf).map_err(io_error)?;
        if n == 0 {
            break;
        }
        parser.receive(&buf[..n], &mut doc)?;
    }
    parser.end(&mut doc)?;
    Ok(doc)
}

fn io_error(err: io::Error) -> TouchstoneError {
    TouchstoneError::semantic(format!("I/O error reading Touchstone input: {err}"))
}
