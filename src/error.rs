//! Error type for the Touchstone parser.

use thiserror::Error;

/// All failures the parser can report. Every variant is fatal to the
/// current parse; none are retried by the parser itself.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TouchstoneError {
    /// A line could not be tokenized: a malformed number, an unknown
    /// option token, or an invalid keyword payload.
    #[error("syntax error on line {line:?}: {reason}")]
    Syntax {
        /// The offending line, already normalized (upper-cased, comment-stripped).
        line: String,
        reason: String,
    },

    /// The line was well-formed but violates a structural rule, e.g.
    /// `[MATRIX FORMAT]` before `[NUMBER OF PORTS]` is known.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// A keyword or option names a feature this parser deliberately
    /// does not implement (`[MIXED-MODE ORDER]`, non-2.0 versions).
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// A growable buffer could not be expanded.
    #[error("resource exhausted while growing a parser buffer")]
    ResourceExhausted,
}

impl TouchstoneError {
    pub(crate) fn syntax(line: impl Into<String>, reason: impl Into<String>) -> Self {
        TouchstoneError::Syntax {
            line: line.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn semantic(reason: impl Into<String>) -> Self {
        TouchstoneError::Semantic(reason.into())
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        TouchstoneError::Unsupported(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, TouchstoneError>;
