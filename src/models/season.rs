//! Season model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PredictorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::Autumn,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }

    /// Meteorological season for a month (Dec-Feb is winter).
    pub fn from_month(month: u32) -> crate::Result<Self> {
        match month {
            12 | 1 | 2 => Ok(Season::Winter),
            3..=5 => Ok(Season::Spring),
            6..=8 => Ok(Season::Summer),
            9..=11 => Ok(Season::Autumn),
            _ => Err(PredictorError::validation(format!(
                "month must be between 1 and 12, got {month}"
            ))),
        }
    }
}

impl FromStr for Season {
    type Err = PredictorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Season::ALL
            .into_iter()
            .find(|season| season.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PredictorError::validation(format!("unknown season '{trimmed}'")))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, Season::Winter)]
    #[case(2, Season::Winter)]
    #[case(3, Season::Spring)]
    #[case(6, Season::Summer)]
    #[case(9, Season::Autumn)]
    #[case(12, Season::Winter)]
    fn test_from_month(#[case] month: u32, #[case] expected: Season) {
        assert_eq!(Season::from_month(month).unwrap(), expected);
    }

    #[test]
    fn test_from_month_out_of_range() {
        assert!(Season::from_month(0).is_err());
        assert!(Season::from_month(13).is_err());
    }

    #[test]
    fn test_parse_season() {
        assert_eq!("summer".parse::<Season>().unwrap(), Season::Summer);
        assert!("Monsoon".parse::<Season>().is_err());
    }
}
