use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

/// Forecast-hour offset from a cycle time. Kept to two decimal digits
/// because every filename grammar in the archive zero-pads it to `%02d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Outlook(u8);

impl Outlook {
    pub const MAX: u8 = 99;

    pub fn new(hours: u8) -> Result<Self, MirrorError> {
        if hours > Self::MAX {
            return Err(MirrorError::InvalidOutlook(hours.to_string()));
        }
        Ok(Self(hours))
    }

    pub fn hours(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Outlook {
    type Err = MirrorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hours = value
            .trim()
            .parse::<u8>()
            .map_err(|_| MirrorError::InvalidOutlook(value.to_string()))?;
        Self::new(hours)
    }
}

impl TryFrom<u8> for Outlook {
    type Error = MirrorError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Outlook> for u8 {
    fn from(value: Outlook) -> Self {
        value.0
    }
}

/// How a raw timestamp is snapped to a cycle boundary. The production
/// fetchers round to the nearest boundary; the historical backfill
/// variant floors, so the choice is carried explicitly on each profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizePolicy {
    #[default]
    Nearest,
    Floor,
}

impl fmt::Display for QuantizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantizePolicy::Nearest => write!(f, "nearest"),
            QuantizePolicy::Floor => write!(f, "floor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_outlook_valid() {
        let outlook: Outlook = "3".parse().unwrap();
        assert_eq!(outlook.hours(), 3);
    }

    #[test]
    fn parse_outlook_rejects_three_digits() {
        let err = "120".parse::<Outlook>().unwrap_err();
        assert_matches!(err, MirrorError::InvalidOutlook(_));
    }

    #[test]
    fn parse_outlook_rejects_garbage() {
        let err = "-1".parse::<Outlook>().unwrap_err();
        assert_matches!(err, MirrorError::InvalidOutlook(_));
    }
}
