// ── Core identity type ──
//
// Entities minted by slotbook (slots, days, packages, records) carry UUIDs.
// Participants (providers, consumers) and categories come from the
// surrounding account system and keep whatever opaque string id it uses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for any slotbook entity or participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    External(String),
}

impl EntityId {
    /// Mint a fresh random id.
    pub fn generate() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::External(_) => None,
        }
    }

    /// `true` for an empty or whitespace-only external id.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Uuid(_) => false,
            Self::External(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::External(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::External(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000".to_owned());
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn entity_id_from_external_string() {
        let id = EntityId::from("507f1f77bcf86cd799439011");
        assert_eq!(id, EntityId::External("507f1f77bcf86cd799439011".into()));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EntityId::generate(), EntityId::generate());
    }

    #[test]
    fn blank_detection() {
        assert!(EntityId::from("  ").is_blank());
        assert!(!EntityId::from("mentor-1").is_blank());
        assert!(!EntityId::generate().is_blank());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id: EntityId = uuid.to_string().parse().unwrap();
        assert_eq!(id, EntityId::Uuid(uuid));
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }
}
