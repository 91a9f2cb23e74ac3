//! Parses bracketed `[…]` keyword lines. Semantic rules that
//! depend on parser state (e.g. `[MATRIX FORMAT]` requiring
//! `num_ports` to already be known) are enforced by the state machine
//! in `parser.rs`, not here — this module is purely syntactic.

use crate::error::{Result, TouchstoneError};
use crate::params::{MatrixFormat, TwoPortOrder};
use crate::tokenizer::tokenize;

/// A syntactically valid keyword line, with its payload parsed into
/// the appropriate type.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    Version(String),
    NumberOfPorts(usize),
    TwoPortOrder(TwoPortOrder),
    NumberOfFrequencies(usize),
    NumberOfNoiseFrequencies(usize),
    /// Tokens present on the keyword line itself; empty when the
    /// reference list wraps onto following lines.
    Reference(Vec<f64>),
    MatrixFormat(MatrixFormat),
    MixedModeOrder,
    BeginInformation,
    EndInformation,
    NetworkData,
    NoiseData,
    End,
}

/// Parses a normalized line beginning with `[`.
pub fn parse_keyword_line(line: &str) -> Result<Keyword> {
    let close = line
        .find(']')
        .ok_or_else(|| TouchstoneError::syntax(line, "unterminated keyword bracket"))?;
    let name = line[1..close].trim();
    let payload = line[close + 1..].trim();

    match name {
        "VERSION" => Ok(Keyword::Version(payload.to_string())),
        "NUMBER OF PORTS" => parse_usize(line, payload).map(Keyword::NumberOfPorts),
        "TWO-PORT ORDER" => payload.parse::<TwoPortOrder>().map(Keyword::TwoPortOrder),
        "NUMBER OF FREQUENCIES" => parse_usize(line, payload).map(Keyword::NumberOfFrequencies),
        "NUMBER OF NOISE FREQUENCIES" => {
            parse_usize(line, payload).map(Keyword::NumberOfNoiseFrequencies)
        }
        "REFERENCE" => {
            if payload.is_empty() {
                Ok(Keyword::Reference(Vec::new()))
            } else {
                tokenize(payload).map(Keyword::Reference)
            }
        }
        "MATRIX FORMAT" => payload.parse::<MatrixFormat>().map(Keyword::MatrixFormat),
        "MIXED-MODE ORDER" => Ok(Keyword::MixedModeOrder),
        "BEGIN INFORMATION" => Ok(Keyword::BeginInformation),
        "END INFORMATION" => Ok(Keyword::EndInformation),
        "NETWORK DATA" => Ok(Keyword::NetworkData),
        "NOISE DATA" => Ok(Keyword::NoiseData),
        "END" => Ok(Keyword::End),
        other => Err(TouchstoneError::syntax(
            line,
            format!("unrecognized keyword [{other}]"),
        )),
    }
}

fn parse_usize(line: &str, payload: &str) -> Result<usize> {
    payload
        .parse::<usize>()
        .map_err(|_| TouchstoneError::syntax(line, format!("expected an integer, got {payload:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version() {
        assert_eq!(
            parse_keyword_line("[VERSION] 2.0").unwrap(),
            Keyword::Version("2.0".to_string())
        );
    }

    #[test]
    fn parses_number_of_ports() {
        assert_eq!(
            parse_keyword_line("[NUMBER OF PORTS] 3").unwrap(),
            Keyword::NumberOfPorts(3)
        );
    }

    #[test]
    fn parses_reference_with_inline_values() {
        assert_eq!(
            parse_keyword_line("[REFERENCE] 50 75 50 75").unwrap(),
            Keyword::Reference(vec![50.0, 75.0, 50.0, 75.0])
        );
    }

    #[test]
    fn parses_reference_with_deferred_values() {
        assert_eq!(
            parse_keyword_line("[REFERENCE]").unwrap(),
            Keyword::Reference(Vec::new())
        );
    }

    #[test]
    fn parses_matrix_format() {
        assert_eq!(
            parse_keyword_line("[MATRIX FORMAT] UPPER").unwrap(),
            Keyword::MatrixFormat(MatrixFormat::Upper)
        );
    }

    #[test]
    fn parses_structural_keywords() {
        assert_eq!(parse_keyword_line("[NETWORK DATA]").unwrap(), Keyword::NetworkData);
        assert_eq!(parse_keyword_line("[NOISE DATA]").unwrap(), Keyword::NoiseData);
        assert_eq!(parse_keyword_line("[END]").unwrap(), Keyword::End);
        assert_eq!(
            parse_keyword_line("[BEGIN INFORMATION]").unwrap(),
            Keyword::BeginInformation
        );
    }

    #[test]
    fn rejects_unknown_keyword() {
        assert!(parse_keyword_line("[BOGUS]").is_err());
    }

    #[test]
    fn rejects_unterminated_bracket() {
        assert!(parse_keyword_line("[VERSION 2.0").is_err());
    }
}
