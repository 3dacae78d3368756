//! Template identifiers.
//!
//! `TemplateId` is always one of the thirty predefined scan templates, so a
//! bad id fails at the command line instead of deep inside a dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated template id (1-30).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TemplateId(u8);

impl TemplateId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 30;

    /// Create a template id, returning None outside 1-30.
    #[inline]
    pub const fn new(id: u8) -> Option<Self> {
        if id >= Self::MIN && id <= Self::MAX {
            Some(Self(id))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every valid id in ascending order.
    pub fn all() -> impl Iterator<Item = TemplateId> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for template id parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateIdError {
    #[error("template {0} does not exist (valid: 1-30)")]
    OutOfRange(i64),
    #[error("invalid template id: {0}")]
    InvalidFormat(String),
}

impl TryFrom<u8> for TemplateId {
    type Error = TemplateIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(TemplateIdError::OutOfRange(value.into()))
    }
}

impl From<TemplateId> for u8 {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}

impl FromStr for TemplateId {
    type Err = TemplateIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: i64 = s
            .parse()
            .map_err(|_| TemplateIdError::InvalidFormat(s.to_string()))?;
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(TemplateIdError::OutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(TemplateId::new(0).is_none());
        assert_eq!(TemplateId::new(1).map(TemplateId::get), Some(1));
        assert_eq!(TemplateId::new(30).map(TemplateId::get), Some(30));
        assert!(TemplateId::new(31).is_none());
    }

    #[test]
    fn test_parse() {
        assert_eq!("24".parse::<TemplateId>().unwrap().get(), 24);
        assert_eq!("31".parse::<TemplateId>(), Err(TemplateIdError::OutOfRange(31)));
        assert_eq!("-1".parse::<TemplateId>(), Err(TemplateIdError::OutOfRange(-1)));
        assert_eq!("1000".parse::<TemplateId>(), Err(TemplateIdError::OutOfRange(1000)));
        assert!(matches!(
            "fin".parse::<TemplateId>(),
            Err(TemplateIdError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_all_covers_table() {
        let ids: Vec<u8> = TemplateId::all().map(u8::from).collect();
        assert_eq!(ids.len(), 30);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&30));
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<TemplateId>("12").is_ok());
        assert!(serde_json::from_str::<TemplateId>("0").is_err());
    }
}
