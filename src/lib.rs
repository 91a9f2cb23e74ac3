//! Streaming parser for Touchstone (`.s1p` … `.s8p`) network-parameter
//! files: version-1 and version-2 dialects, S/Y/Z/G/H parameters, the
//! three numeric encodings, full/upper/lower matrix storage, and
//! two-port noise data.
//!
//! The core is [`parser::Parser`]: feed it byte chunks with
//! [`parser::Parser::receive`] and finish with [`parser::Parser::end`];
//! both emit typed [`emitter::Packet`]s to a [`emitter::Consumer`] in
//! calling order. [`network::TouchstoneDocument`] is a ready-made
//! consumer that assembles those packets into complex-valued
//! [`network::Network`] matrices, and [`io::from_path`] /
//! [`io::from_reader`] are thin convenience wrappers for callers
//! without their own transport layer.

mod accumulator;
mod chunker;
pub mod emitter;
pub mod error;
mod io;
mod keywords;
pub mod matcher;
pub mod network;
pub mod numeric;
pub mod options;
pub mod params;
pub mod parser;
mod sweep_store;
mod tokenizer;
pub mod units;

pub use emitter::{Consumer, Packet};
pub use error::{Result, TouchstoneError};
pub use io::{from_path, from_reader};
pub use network::{Network, NoiseSweep, TouchstoneDocument};
pub use parser::Parser;
