// ── Price catalog ──
//
// Per-minute price per (provider, call type). Booking and confirmation
// both price from here.

use dashmap::DashMap;

use crate::error::CoreError;
use crate::model::{CallType, CatalogEntry, EntityId};

#[derive(Default)]
pub struct PriceCatalog {
    prices: DashMap<(EntityId, CallType), u64>,
}

impl PriceCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a provider's per-minute price for a call type.
    pub fn set(&self, provider: EntityId, call_type: CallType, price_per_minute: u64) {
        self.prices.insert((provider, call_type), price_per_minute);
    }

    pub fn price_per_minute(&self, provider: &EntityId, call_type: CallType) -> Option<u64> {
        self.prices
            .get(&(provider.clone(), call_type))
            .map(|p| *p.value())
    }

    /// `price_per_minute × duration`, or `NotFound` when the provider has
    /// no price for this call type.
    pub fn quote(
        &self,
        provider: &EntityId,
        call_type: CallType,
        duration_minutes: u32,
    ) -> Result<u64, CoreError> {
        let per_minute = self
            .price_per_minute(provider, call_type)
            .ok_or_else(|| CoreError::not_found("price", format!("{provider}/{call_type}")))?;
        per_minute
            .checked_mul(u64::from(duration_minutes))
            .ok_or_else(|| CoreError::validation("booking total overflows"))
    }

    /// Every entry, ordered by provider then call type.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self
            .prices
            .iter()
            .map(|r| CatalogEntry {
                provider: r.key().0.clone(),
                call_type: r.key().1,
                price_per_minute: *r.value(),
            })
            .collect();
        entries.sort_by(|a, b| {
            a.provider
                .cmp(&b.provider)
                .then_with(|| a.call_type.cmp(&b.call_type))
        });
        entries
    }

    pub(crate) fn clear(&self) {
        self.prices.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn quote_multiplies_by_duration() {
        let catalog = PriceCatalog::new();
        let mentor = EntityId::from("mentor-1");
        catalog.set(mentor.clone(), CallType::Video, 10);
        assert_eq!(catalog.quote(&mentor, CallType::Video, 30).unwrap(), 300);
    }

    #[test]
    fn missing_price_is_not_found() {
        let catalog = PriceCatalog::new();
        let mentor = EntityId::from("mentor-1");
        catalog.set(mentor.clone(), CallType::Video, 10);
        assert!(matches!(
            catalog.quote(&mentor, CallType::Chat, 30),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn set_replaces_previous_price() {
        let catalog = PriceCatalog::new();
        let mentor = EntityId::from("mentor-1");
        catalog.set(mentor.clone(), CallType::Audio, 4);
        catalog.set(mentor.clone(), CallType::Audio, 6);
        assert_eq!(catalog.price_per_minute(&mentor, CallType::Audio), Some(6));
        assert_eq!(catalog.entries().len(), 1);
    }
}
