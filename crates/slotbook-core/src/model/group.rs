// ── Group sessions ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::slot::CallType;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GroupStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A provider-hosted session with a fixed number of seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSession {
    pub id: EntityId,
    pub provider: EntityId,
    pub category: EntityId,
    pub title: String,
    pub description: String,
    /// Audio or video; group sessions are never chat.
    pub call_type: CallType,
    pub price: u64,
    pub capacity: u32,
    pub booked_consumers: Vec<EntityId>,
    pub scheduled_at: DateTime<Utc>,
    pub join_link: Option<String>,
    pub status: GroupStatus,
}

impl GroupSession {
    pub fn booked_count(&self) -> usize {
        self.booked_consumers.len()
    }

    pub fn is_full(&self) -> bool {
        self.booked_count() >= usize::try_from(self.capacity).unwrap_or(usize::MAX)
    }

    pub fn has_consumer(&self, consumer: &EntityId) -> bool {
        self.booked_consumers.contains(consumer)
    }

    pub fn seats_left(&self) -> u32 {
        let booked = u32::try_from(self.booked_count()).unwrap_or(u32::MAX);
        self.capacity.saturating_sub(booked)
    }
}

/// Partial update for a group session. Seats are only added by booking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSessionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub capacity: Option<u32>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub join_link: Option<String>,
    pub status: Option<GroupStatus>,
}
