//! Creation timestamps as stored in the shared document.
//!
//! Stored values are RFC 3339 strings. A value that fails to parse is kept
//! verbatim so a bad record never aborts a load and round-trips unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A timestamp field that tolerates unparseable stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// Successfully parsed RFC 3339 value
    Parsed(DateTime<Utc>),
    /// Raw stored string that did not parse; preserved as-is
    Raw(String),
}

impl Timestamp {
    /// Current time.
    pub fn now() -> Self {
        Timestamp::Parsed(Utc::now())
    }

    /// Parse a stored string, falling back to the raw form.
    pub fn parse(value: &str) -> Self {
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => Timestamp::Parsed(dt.with_timezone(&Utc)),
            Err(_) => Timestamp::Raw(value.to_string()),
        }
    }

    /// Whether the stored value parsed as a valid timestamp.
    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Parsed(_))
    }

    /// Wire representation: RFC 3339 for parsed values, verbatim otherwise.
    pub fn as_wire(&self) -> String {
        match self {
            Timestamp::Parsed(dt) => dt.to_rfc3339(),
            Timestamp::Raw(raw) => raw.clone(),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&value))
    }
}
