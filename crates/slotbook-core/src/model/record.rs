// ── Session records & room handles ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::slot::CallType;

/// A created session room with one join link per participant role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomHandle {
    pub room_id: String,
    pub name: String,
    pub host_url: String,
    pub guest_url: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

/// The session produced by a finalized booking. Created in `PENDING`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: EntityId,
    pub consumer: EntityId,
    pub provider: EntityId,
    pub slot: Option<EntityId>,
    pub room: RoomHandle,
    pub call_type: CallType,
    pub duration_minutes: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: RecordStatus,
}

impl BookingRecord {
    /// `true` if the session overlaps `[from, to)`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start < to && self.end > from
    }
}
