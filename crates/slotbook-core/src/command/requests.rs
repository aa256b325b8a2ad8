// ── Typed request structs for Command payloads ──
//
// Booking intents are a closed set. Each one validates its own required
// fields before the workflow touches any store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{CallType, EntityId, GroupSession, GroupStatus, Package, PackageStatus};

fn require(id: &EntityId, field: &str) -> Result<(), CoreError> {
    if id.is_blank() {
        Err(CoreError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

fn require_duration(minutes: u32) -> Result<(), CoreError> {
    if minutes == 0 {
        Err(CoreError::validation("duration must be greater than zero"))
    } else {
        Ok(())
    }
}

// ── Booking intents ────────────────────────────────────────────────

/// Book one published slot; the provider confirms it later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBooking {
    pub consumer: EntityId,
    pub provider: EntityId,
    pub slot: EntityId,
    pub call_type: CallType,
    pub duration_minutes: u32,
}

/// How an instant booking is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Payment {
    /// Debit the consumer's balance.
    Wallet,
    /// Use one session of a prepaid package.
    Package { package: EntityId },
}

/// Start a session right now, without a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstantBooking {
    pub consumer: EntityId,
    pub provider: EntityId,
    pub call_type: CallType,
    pub duration_minutes: u32,
    pub payment: Payment,
}

/// Take a seat in a group session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBooking {
    pub consumer: EntityId,
    pub session: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookingIntent {
    Slot(SlotBooking),
    Instant(InstantBooking),
    Group(GroupBooking),
}

impl BookingIntent {
    pub fn consumer(&self) -> &EntityId {
        match self {
            Self::Slot(b) => &b.consumer,
            Self::Instant(b) => &b.consumer,
            Self::Group(b) => &b.consumer,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Slot(b) => {
                require(&b.consumer, "consumer id")?;
                require(&b.provider, "provider id")?;
                require(&b.slot, "slot id")?;
                require_duration(b.duration_minutes)
            }
            Self::Instant(b) => {
                require(&b.consumer, "consumer id")?;
                require(&b.provider, "provider id")?;
                if let Payment::Package { package } = &b.payment {
                    require(package, "package id")?;
                }
                require_duration(b.duration_minutes)
            }
            Self::Group(b) => {
                require(&b.consumer, "consumer id")?;
                require(&b.session, "group session id")
            }
        }
    }
}

// ── Packages ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePackageRequest {
    pub consumer: EntityId,
    pub provider: EntityId,
    pub category: EntityId,
    pub call_type: CallType,
    pub total_sessions: u32,
    pub price: u64,
}

impl CreatePackageRequest {
    pub(crate) fn into_package(self) -> Result<Package, CoreError> {
        require(&self.consumer, "consumer id")?;
        require(&self.provider, "provider id")?;
        require(&self.category, "category id")?;
        if self.total_sessions == 0 {
            return Err(CoreError::validation("a package needs at least one session"));
        }
        Ok(Package {
            id: EntityId::generate(),
            consumer: self.consumer,
            provider: self.provider,
            category: self.category,
            call_type: self.call_type,
            total_sessions: self.total_sessions,
            remaining_sessions: self.total_sessions,
            price: self.price,
            status: PackageStatus::Active,
            created_at: Utc::now(),
        })
    }
}

// ── Group sessions ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroupSessionRequest {
    pub provider: EntityId,
    pub category: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub call_type: CallType,
    pub price: u64,
    pub capacity: u32,
    pub scheduled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_link: Option<String>,
}

impl CreateGroupSessionRequest {
    pub(crate) fn into_session(self) -> Result<GroupSession, CoreError> {
        require(&self.provider, "provider id")?;
        require(&self.category, "category id")?;
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("title is required"));
        }
        if self.call_type == CallType::Chat {
            return Err(CoreError::validation("group sessions are audio or video"));
        }
        if self.capacity == 0 {
            return Err(CoreError::validation("capacity must be at least 1"));
        }
        Ok(GroupSession {
            id: EntityId::generate(),
            provider: self.provider,
            category: self.category,
            title: self.title,
            description: self.description,
            call_type: self.call_type,
            price: self.price,
            capacity: self.capacity,
            booked_consumers: Vec::new(),
            scheduled_at: self.scheduled_at,
            join_link: self.join_link,
            status: GroupStatus::Scheduled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_booking() -> SlotBooking {
        SlotBooking {
            consumer: EntityId::from("user-1"),
            provider: EntityId::from("mentor-1"),
            slot: EntityId::generate(),
            call_type: CallType::Video,
            duration_minutes: 30,
        }
    }

    #[test]
    fn complete_slot_booking_validates() {
        assert!(BookingIntent::Slot(slot_booking()).validate().is_ok());
    }

    #[test]
    fn blank_slot_id_is_rejected() {
        let intent = BookingIntent::Slot(SlotBooking {
            slot: EntityId::from(""),
            ..slot_booking()
        });
        assert!(matches!(
            intent.validate(),
            Err(CoreError::ValidationFailed { message }) if message.contains("slot id")
        ));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let intent = BookingIntent::Instant(InstantBooking {
            consumer: EntityId::from("user-1"),
            provider: EntityId::from("mentor-1"),
            call_type: CallType::Chat,
            duration_minutes: 0,
            payment: Payment::Wallet,
        });
        assert!(intent.validate().is_err());
    }

    #[test]
    fn package_payment_needs_package_id() {
        let intent = BookingIntent::Instant(InstantBooking {
            consumer: EntityId::from("user-1"),
            provider: EntityId::from("mentor-1"),
            call_type: CallType::Chat,
            duration_minutes: 10,
            payment: Payment::Package {
                package: EntityId::from(" "),
            },
        });
        assert!(intent.validate().is_err());
    }

    #[test]
    fn new_package_starts_full_and_active() {
        let request = CreatePackageRequest {
            consumer: EntityId::from("user-1"),
            provider: EntityId::from("mentor-1"),
            category: EntityId::from("career"),
            call_type: CallType::Audio,
            total_sessions: 4,
            price: 400,
        };
        let Ok(package) = request.into_package() else {
            panic!("package request should be valid");
        };
        assert_eq!(package.remaining_sessions, 4);
        assert_eq!(package.status, PackageStatus::Active);
        assert_eq!(package.per_session_price(), 100);
    }
}
