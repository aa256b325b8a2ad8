// ── Booking events ──
//
// Broadcast on the controller's event channel and handed to the
// configured `Notifier` once a workflow step has committed.

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::record::{BookingRecord, RoomHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    /// A slot was reserved and is awaiting provider confirmation.
    SlotReserved {
        slot: EntityId,
        consumer: EntityId,
        provider: EntityId,
        room: RoomHandle,
    },
    /// The provider accepted a pending slot.
    SlotConfirmed { record: BookingRecord },
    /// A slot was cancelled; `refunded` is what went back to the consumer.
    SlotCancelled {
        slot: EntityId,
        consumer: Option<EntityId>,
        refunded: u64,
    },
    /// An instant booking was finalized.
    InstantBooked { record: BookingRecord },
    /// A consumer took a seat in a group session.
    GroupSeatBooked {
        session: EntityId,
        consumer: EntityId,
        provider: EntityId,
        join_link: Option<String>,
    },
    /// A scheduled group session was cancelled or deleted and every
    /// seated consumer got the seat price back.
    GroupSessionCancelled {
        session: EntityId,
        provider: EntityId,
        consumers: Vec<EntityId>,
        refunded: u64,
    },
}

impl BookingEvent {
    /// Host and guest join URLs, when the event carries a room.
    pub fn join_urls(&self) -> Option<(&str, &str)> {
        match self {
            Self::SlotReserved { room, .. } => Some((&room.host_url, &room.guest_url)),
            Self::SlotConfirmed { record } | Self::InstantBooked { record } => {
                Some((&record.room.host_url, &record.room.guest_url))
            }
            Self::SlotCancelled { .. }
            | Self::GroupSeatBooked { .. }
            | Self::GroupSessionCancelled { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SlotReserved { .. } => "slot_reserved",
            Self::SlotConfirmed { .. } => "slot_confirmed",
            Self::SlotCancelled { .. } => "slot_cancelled",
            Self::InstantBooked { .. } => "instant_booked",
            Self::GroupSeatBooked { .. } => "group_seat_booked",
            Self::GroupSessionCancelled { .. } => "group_session_cancelled",
        }
    }
}
