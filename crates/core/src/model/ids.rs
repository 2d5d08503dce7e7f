use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based number of a session within the question bank.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SessionNumber(u32);

impl SessionNumber {
    /// Creates a new `SessionNumber`.
    ///
    /// Returns `None` for zero, which is never a valid session.
    #[must_use]
    pub fn new(number: u32) -> Option<Self> {
        (number > 0).then_some(Self(number))
    }

    /// Returns the underlying 1-based value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Zero-based index of this session, used for range arithmetic.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::try_from(self.0 - 1).unwrap_or(usize::MAX)
    }
}

impl fmt::Debug for SessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionNumber({})", self.0)
    }
}

impl fmt::Display for SessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a session number from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSessionNumberError {
    raw: String,
}

impl fmt::Display for ParseSessionNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse session number from {:?}", self.raw)
    }
}

impl std::error::Error for ParseSessionNumberError {}

impl FromStr for SessionNumber {
    type Err = ParseSessionNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(SessionNumber::new)
            .ok_or_else(|| ParseSessionNumberError { raw: s.to_owned() })
    }
}

impl TryFrom<u32> for SessionNumber {
    type Error = ParseSessionNumberError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| ParseSessionNumberError {
            raw: value.to_string(),
        })
    }
}

impl From<SessionNumber> for u32 {
    fn from(number: SessionNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_session() {
        assert!(SessionNumber::new(0).is_none());
        assert_eq!(SessionNumber::new(3).unwrap().index(), 2);
    }

    #[test]
    fn session_number_display_and_parse() {
        let n: SessionNumber = "12".parse().unwrap();
        assert_eq!(n.to_string(), "12");
        assert!("0".parse::<SessionNumber>().is_err());
        assert!("abc".parse::<SessionNumber>().is_err());
    }

    #[test]
    fn wire_form_is_a_plain_number_and_rejects_zero() {
        let n = SessionNumber::new(7).unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "7");
        assert_eq!(serde_json::from_str::<SessionNumber>("7").unwrap(), n);
        assert!(serde_json::from_str::<SessionNumber>("0").is_err());
    }
}
