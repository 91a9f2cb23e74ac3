//! Splits a data line into floating-point tokens.

use crate::error::{Result, TouchstoneError};

/// Parses every whitespace-separated token on `line` as an `f64`.
/// Fails the whole line on the first unparsable token.
pub fn tokenize(line: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| TouchstoneError::syntax(line, format!("invalid number {tok:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_row() {
        assert_eq!(tokenize("1.0 0.5 90").unwrap(), vec![1.0, 0.5, 90.0]);
    }

    #[test]
    fn parses_scientific_notation() {
        assert_eq!(tokenize("1E9 .99 0").unwrap(), vec![1e9, 0.99, 0.0]);
    }

    #[test]
    fn fails_on_malformed_token() {
        assert!(tokenize("1.0 abc 90").is_err());
    }

    #[test]
    fn empty_line_yields_empty_vec() {
        assert_eq!(tokenize("").unwrap(), Vec::<f64>::new());
    }
}
