//! Record identifiers as issued by the remote service.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Opaque identifier.
///
/// Numbers, UUIDs and free-form strings are all accepted and compared by their
/// text, so `5` and `"5"` name the same record. Ids that read as a plain
/// integer are written back as JSON numbers, everything else as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

impl Id {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i64> {
        self.0
            .parse::<i64>()
            .ok()
            .filter(|n| n.to_string() == self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Uuid> for Id {
    fn from(u: Uuid) -> Self {
        Self(u.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawId::deserialize(deserializer)? {
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        };
        if text.is_empty() {
            return Err(D::Error::custom("empty id"));
        }
        Ok(Self(text))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uuid_id_round_trips_as_string() {
        let raw = "6f1c2b9e-0d4e-4c1a-9a53-2d7e0b1f4a11";
        let id: Id = serde_json::from_value(json!(raw)).unwrap();
        assert_eq!(id, Id::from(Uuid::parse_str(raw).unwrap()));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(raw));
    }

    #[test]
    fn numeric_ids_stay_numbers_on_the_wire() {
        let id: Id = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id, Id::from("42"));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(Id::from("007")).unwrap(), json!("007"));
    }

    #[test]
    fn number_and_numeric_text_compare_equal() {
        let a: Id = serde_json::from_value(json!(5)).unwrap();
        let b: Id = serde_json::from_value(json!(" 5 ")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(serde_json::from_value::<Id>(json!("  ")).is_err());
        assert!(serde_json::from_value::<Id>(json!(null)).is_err());
    }
}
