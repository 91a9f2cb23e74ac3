//! Parses the `#` option line.

use crate::error::{Result, TouchstoneError};
use crate::params::{NumberFormat, ParameterKind};
use crate::units::FrequencyUnit;

/// The decoded contents of an option line, with defaults already
/// applied for any token the line omitted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OptionLine {
    pub frequency_unit: FrequencyUnit,
    pub number_format: NumberFormat,
    pub parameter_kind: ParameterKind,
    pub reference_resistance: f64,
}

impl Default for OptionLine {
    fn default() -> Self {
        OptionLine {
            frequency_unit: FrequencyUnit::default(),
            number_format: NumberFormat::default(),
            parameter_kind: ParameterKind::default(),
            reference_resistance: 50.0,
        }
    }
}

/// Parses a normalized (upper-cased, comment-stripped) line that
/// begins with `#`. Tokens may appear in any order.
pub fn parse_option_line(line: &str) -> Result<OptionLine> {
    let mut opts = OptionLine::default();
    let body = line.trim_start_matches('#').trim();
    let tokens: Vec<&str> = body.split_whitespace().collect();

    let mut i = 0;
    while i < tokens.len() {
        let tok = tokens[i];
        if let Ok(unit) = tok.parse::<FrequencyUnit>() {
            opts.frequency_unit = unit;
        } else if let Ok(fmt) = tok.parse::<NumberFormat>() {
            opts.number_format = fmt;
        } else if let Ok(kind) = tok.parse::<ParameterKind>() {
            opts.parameter_kind = kind;
        } else if tok == "R" {
            let value = tokens.get(i + 1).ok_or_else(|| {
                TouchstoneError::syntax(line, "`R` option token missing a resistance value")
            })?;
            opts.reference_resistance = value.parse::<f64>().map_err(|_| {
                TouchstoneError::syntax(line, format!("invalid resistance value {value:?}"))
            })?;
            i += 1;
        } else {
            return Err(TouchstoneError::syntax(
                line,
                format!("unrecognized option token {tok:?}"),
            ));
        }
        i += 1;
    }

    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_line_has_only_hash() {
        let opts = parse_option_line("#").unwrap();
        assert_eq!(opts, OptionLine::default());
    }

    #[test]
    fn parses_every_token_in_any_order() {
        let opts = parse_option_line("# R 75 GHZ S MA").unwrap();
        assert_eq!(opts.frequency_unit, FrequencyUnit::GHz);
        assert_eq!(opts.number_format, NumberFormat::MagnitudeAngle);
        assert_eq!(opts.parameter_kind, ParameterKind::S);
        assert_eq!(opts.reference_resistance, 75.0);
    }

    #[test]
    fn fails_on_malformed_resistance() {
        assert!(parse_option_line("# R abc").is_err());
    }

    #[test]
    fn fails_on_dangling_r_token() {
        assert!(parse_option_line("# R").is_err());
    }

    #[test]
    fn fails_on_unknown_token() {
        assert!(parse_option_line("# FROB").is_err());
    }
}
