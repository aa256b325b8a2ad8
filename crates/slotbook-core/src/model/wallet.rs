// ── Wallet transactions & revenue split ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionKind {
    Debit,
    Credit,
    Refund,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransactionStatus {
    Confirmed,
    Refunded,
}

/// Append-only wallet entry for one finalized booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: EntityId,
    pub consumer: EntityId,
    pub provider: EntityId,
    pub slot: Option<EntityId>,
    pub amount: u64,
    pub provider_share: u64,
    pub platform_share: u64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Provider / platform division of a booking total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub provider: u64,
    pub platform: u64,
}

impl Split {
    /// Provider gets `total * percent / 100` (rounded down), the platform
    /// keeps the rest, so the two always add up to `total`.
    pub fn of(total: u64, provider_percent: u8) -> Self {
        let percent = u128::from(provider_percent.min(100));
        let provider = u64::try_from(u128::from(total) * percent / 100).unwrap_or(total);
        Self {
            provider,
            platform: total - provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_split_is_seventy_thirty() {
        assert_eq!(
            Split::of(1000, 70),
            Split {
                provider: 700,
                platform: 300
            }
        );
    }

    #[test]
    fn split_rounds_in_platform_favour_and_sums_to_total() {
        let split = Split::of(99, 70);
        assert_eq!(split.provider, 69);
        assert_eq!(split.provider + split.platform, 99);
    }

    #[test]
    fn split_handles_extremes() {
        assert_eq!(Split::of(u64::MAX, 100).provider, u64::MAX);
        assert_eq!(Split::of(500, 0).platform, 500);
    }
}
