// ── Slot & schedule domain types ──

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use slotbook_api::RoomKind;
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::record::RoomHandle;

/// How a session is held. Chat rooms are generated locally; audio and
/// video rooms come from the room service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CallType {
    Chat,
    Audio,
    Video,
}

impl CallType {
    /// The room-service kind for this call type, `None` for chat.
    pub fn room_kind(self) -> Option<RoomKind> {
        match self {
            Self::Chat => None,
            Self::Audio => Some(RoomKind::Audio),
            Self::Video => Some(RoomKind::Video),
        }
    }
}

/// Slot lifecycle: `open → pending → accepted`, `pending → rejected`.
/// A rejected slot is bookable again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SlotStatus {
    Open,
    Pending,
    Accepted,
    Rejected,
}

/// One bookable time on a provider's schedule day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: EntityId,
    /// Time label as published, e.g. `"10:00 AM"`. Deduplication is by
    /// exact string equality.
    pub time: String,
    pub booked: bool,
    pub consumer: Option<EntityId>,
    pub status: SlotStatus,
    pub call_type: Option<CallType>,
    pub duration_minutes: Option<u32>,
    pub note: Option<String>,
    /// Amount debited when the slot was reserved; zero once released
    /// or confirmed.
    #[serde(default)]
    pub charged: u64,
    /// Room provisioned at booking time, reused on confirmation.
    #[serde(default)]
    pub room: Option<RoomHandle>,
}

impl Slot {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            id: EntityId::generate(),
            time: time.into(),
            booked: false,
            consumer: None,
            status: SlotStatus::Open,
            call_type: None,
            duration_minutes: None,
            note: None,
            charged: 0,
            room: None,
        }
    }

    /// `booked` and `consumer` agree.
    pub fn is_consistent(&self) -> bool {
        self.booked == self.consumer.is_some()
    }

    /// Parse the time label as `"10:00 AM"` or `"14:30"`.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        let label = self.time.trim();
        NaiveTime::parse_from_str(label, "%I:%M %p")
            .or_else(|_| NaiveTime::parse_from_str(label, "%H:%M"))
            .ok()
    }
}

/// All slots one provider published for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub id: EntityId,
    pub provider: EntityId,
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}

impl ScheduleDay {
    pub fn new(provider: EntityId, date: NaiveDate) -> Self {
        Self {
            id: EntityId::generate(),
            provider,
            date,
            slots: Vec::new(),
        }
    }

    /// Store key: one day per provider and date.
    pub fn key_for(provider: &EntityId, date: NaiveDate) -> String {
        format!("{provider}:{date}")
    }

    pub fn key(&self) -> String {
        Self::key_for(&self.provider, self.date)
    }

    pub fn slot(&self, id: &EntityId) -> Option<&Slot> {
        self.slots.iter().find(|s| &s.id == id)
    }

    pub fn slot_mut(&mut self, id: &EntityId) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| &s.id == id)
    }

    pub fn has_time(&self, time: &str) -> bool {
        self.slots.iter().any(|s| s.time == time)
    }

    pub fn open_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| !s.booked)
    }
}
