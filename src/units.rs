//! Frequency-unit multiplier recognized on the Touchstone option line.

use crate::error::TouchstoneError;
use std::str::FromStr;

/// Multiplier applied to every frequency token read from a data line.
///
/// Default when the option line is absent is [`FrequencyUnit::GHz`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    GHz,
}

impl Default for FrequencyUnit {
    fn default() -> Self {
        FrequencyUnit::GHz
    }
}

impl FrequencyUnit {
    /// The multiplier applied to a raw frequency token to produce Hz.
    pub fn multiplier(self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
        }
    }

    pub fn to_hz(self, value: f64) -> f64 {
        value * self.multiplier()
    }
}

impl FromStr for FrequencyUnit {
    type Err = TouchstoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use FrequencyUnit::*;
        match s {
            "HZ" => Ok(Hz),
            "KHZ" => Ok(KHz),
            "MHZ" => Ok(MHz),
            "GHZ" => Ok(GHz),
            other => Err(TouchstoneError::syntax(
                other,
                "unrecognized frequency unit",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ghz() {
        assert_eq!(FrequencyUnit::default(), FrequencyUnit::GHz);
    }

    #[test]
    fn multipliers() {
        assert_eq!(FrequencyUnit::Hz.to_hz(1.0), 1.0);
        assert_eq!(FrequencyUnit::KHz.to_hz(1.0), 1e3);
        assert_eq!(FrequencyUnit::MHz.to_hz(1.0), 1e6);
        assert_eq!(FrequencyUnit::GHz.to_hz(2.5), 2.5e9);
    }

    #[test]
    fn parses_case_normalized_tokens() {
        assert_eq!("GHZ".parse::<FrequencyUnit>().unwrap(), FrequencyUnit::GHz);
        assert_eq!("HZ".parse::<FrequencyUnit>().unwrap(), FrequencyUnit::Hz);
        assert!("THZ".parse::<FrequencyUnit>().is_err());
    }
}
