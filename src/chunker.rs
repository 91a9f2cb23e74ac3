//! Accepts arbitrarily-sized byte buffers and reassembles complete,
//! comment-stripped, whitespace-normalized logical lines.

use crate::error::{Result, TouchstoneError};
use tracing::trace;

/// Buffers partial input across calls to [`Chunker::push`] and yields
/// complete logical lines in input order. Lines are never processed
/// until they are known to be complete.
#[derive(Default)]
pub struct Chunker {
    buf: String,
}

impl Chunker {
    pub fn new() -> Self {
        Chunker { buf: String::new() }
    }

    /// Appends `bytes` and returns every complete line they make
    /// available. The trailing partial line, if any, stays buffered.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.ingest(bytes)?;
        Ok(self.flush(false))
    }

    /// Signals end-of-stream: whatever remains buffered is treated as
    /// a final, complete line.
    pub fn finish(&mut self) -> Result<Vec<String>> {
        Ok(self.flush(true))
    }

    fn ingest(&mut self, bytes: &[u8]) -> Result<()> {
        if !bytes.is_ascii() {
            return Err(TouchstoneError::syntax(
                "<binary chunk>",
                "non-ASCII byte in Touchstone input",
            ));
        }
        // `bytes.is_ascii()` guarantees this is valid UTF-8.
        self.buf
            .push_str(std::str::from_utf8(bytes).expect("ascii chunk is valid utf-8"));
        Ok(())
    }

    fn flush(&mut self, eof: bool) -> Vec<String> {
        self.normalize();

        let cut = if eof {
            self.buf.len()
        } else {
            match self.buf.rfind('\n') {
                Some(pos) => pos + 1,
                None => return Vec::new(),
            }
        };

        let remainder = self.buf.split_off(cut);
        let prefix = std::mem::replace(&mut self.buf, remainder);

        let lines: Vec<String> = prefix
            .split('\n')
            .filter_map(Self::strip_comment_and_trim)
            .collect();
        trace!(count = lines.len(), eof, "chunker delivered lines");
        lines
    }

    fn normalize(&mut self) {
        let normalized: String = self
            .buf
            .chars()
            .map(|c| match c {
                '\t' => ' ',
                '\r' => '\n',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        self.buf = normalized;
    }

    fn strip_comment_and_trim(raw: &str) -> Option<String> {
        let without_comment = match raw.find('!') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let trimmed = without_comment.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
