use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::vector::Vector;

/// Free-form key/value metadata attached to a point.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A point in the vector space with its payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub vector: Vector,
    #[serde(default)]
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Integer(u64),
    Uuid(Uuid),
    String(String),
}

impl PointId {
    /// Parse a textual id, keeping UUIDs typed so `"A0..."` and `"a0..."`
    /// address the same point.
    pub fn parse(s: &str) -> Self {
        match Uuid::parse_str(s) {
            Ok(u) => PointId::Uuid(u),
            Err(_) => PointId::String(s.to_string()),
        }
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::String(s) => write!(f, "{}", s),
            PointId::Uuid(u) => write!(f, "{}", u),
            PointId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        PointId::parse(&s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::parse(s)
    }
}

impl From<u64> for PointId {
    fn from(i: u64) -> Self {
        PointId::Integer(i)
    }
}

impl From<Uuid> for PointId {
    fn from(u: Uuid) -> Self {
        PointId::Uuid(u)
    }
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PointId>, vector: Vector, payload: Payload) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    /// String payload field, or `""` when absent or not a string.
    pub fn payload_str(&self, key: &str) -> &str {
        self.payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_case_insensitive() {
        let lower = PointId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8");
        let upper = PointId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8");
        assert_eq!(lower, upper);
        assert!(matches!(lower, PointId::Uuid(_)));
    }

    #[test]
    fn test_payload_str_defaults_to_empty() {
        let mut payload = Payload::new();
        payload.insert("text".into(), serde_json::json!("tournesol"));
        payload.insert("page".into(), serde_json::json!(3));
        let point = Point::new("doc", Vector::new(vec![1.0]), payload);

        assert_eq!(point.payload_str("text"), "tournesol");
        assert_eq!(point.payload_str("page"), "");
        assert_eq!(point.payload_str("file_name"), "");
    }
}
