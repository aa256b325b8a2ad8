// ── Prepaid session packages ──

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
pub enum PackageStatus {
    Active,
    Expired,
}

/// A bundle of sessions one consumer bought from one provider.
///
/// `remaining_sessions` only ever decreases by one per consumption, and
/// the package flips to [`PackageStatus::Expired`] exactly when it hits 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: EntityId,
    pub consumer: EntityId,
    pub provider: EntityId,
    pub category: EntityId,
    pub call_type: CallType,
    pub total_sessions: u32,
    pub remaining_sessions: u32,
    /// Price paid for the whole package.
    pub price: u64,
    pub status: PackageStatus,
    pub created_at: DateTime<Utc>,
}

impl Package {
    pub fn is_consumable(&self) -> bool {
        self.status == PackageStatus::Active && self.remaining_sessions > 0
    }

    /// Value of one session, used for the wallet entry of a package-paid booking.
    pub fn per_session_price(&self) -> u64 {
        if self.total_sessions == 0 {
            0
        } else {
            self.price / u64::from(self.total_sessions)
        }
    }
}

/// Partial update applied by `PackageStore::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePatch {
    pub total_sessions: Option<u32>,
    pub remaining_sessions: Option<u32>,
    pub price: Option<u64>,
    pub call_type: Option<CallType>,
}

impl PackagePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
