// ── Central data store ──
//
// Thread-safe storage for every slotbook entity. Writes use fine-grained
// per-shard locks within `DashMap`; there is no global lock and no single
// writer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::PriceCatalog;
use super::collection::EntityCollection;
use super::groups::GroupStore;
use super::ledger::Ledger;
use super::packages::PackageStore;
use super::slots::SlotStore;
use crate::error::CoreError;
use crate::model::{
    BookingRecord, CatalogEntry, EntityId, GroupSession, Package, ScheduleDay, WalletTransaction,
};

/// Central store for all slotbook state.
pub struct DataStore {
    pub(crate) slots: SlotStore,
    pub(crate) ledger: Ledger,
    pub(crate) packages: PackageStore,
    pub(crate) catalog: PriceCatalog,
    pub(crate) groups: GroupStore,
    pub(crate) records: EntityCollection<BookingRecord>,
    pub(crate) transactions: EntityCollection<WalletTransaction>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            slots: SlotStore::new(),
            ledger: Ledger::new(),
            packages: PackageStore::new(),
            catalog: PriceCatalog::new(),
            groups: GroupStore::new(),
            records: EntityCollection::new(),
            transactions: EntityCollection::new(),
        }
    }

    // ── Component stores ─────────────────────────────────────────────

    pub fn slots(&self) -> &SlotStore {
        &self.slots
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn packages(&self) -> &PackageStore {
        &self.packages
    }

    pub fn catalog(&self) -> &PriceCatalog {
        &self.catalog
    }

    pub fn groups(&self) -> &GroupStore {
        &self.groups
    }

    // ── Booking records ──────────────────────────────────────────────

    pub(crate) fn append_record(&self, record: BookingRecord) {
        self.records
            .upsert(record.id.to_string(), record.id.clone(), record);
    }

    pub fn record(&self, id: &EntityId) -> Option<Arc<BookingRecord>> {
        self.records.get_by_id(id)
    }

    /// Records where `participant` is the consumer or the provider,
    /// newest start first.
    pub fn records_for(&self, participant: &EntityId) -> Vec<Arc<BookingRecord>> {
        newest_records(
            self.records
                .filter(|r| &r.consumer == participant || &r.provider == participant),
        )
    }

    /// Records overlapping `[from, to)`, newest start first.
    pub fn records_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Arc<BookingRecord>> {
        newest_records(self.records.filter(|r| r.overlaps(from, to)))
    }

    pub fn records_snapshot(&self) -> Vec<Arc<BookingRecord>> {
        newest_records(self.records.snapshot())
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    // ── Wallet transactions ──────────────────────────────────────────

    pub(crate) fn append_transaction(&self, txn: WalletTransaction) {
        self.transactions
            .upsert(txn.id.to_string(), txn.id.clone(), txn);
    }

    /// Transactions where `participant` is the consumer or the provider,
    /// newest first.
    pub fn transactions_for(&self, participant: &EntityId) -> Vec<Arc<WalletTransaction>> {
        newest_transactions(
            self.transactions
                .filter(|t| &t.consumer == participant || &t.provider == participant),
        )
    }

    pub fn transactions_for_slot(&self, slot: &EntityId) -> Vec<Arc<WalletTransaction>> {
        newest_transactions(self.transactions.filter(|t| t.slot.as_ref() == Some(slot)))
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    // ── Snapshot export / import ─────────────────────────────────────

    /// Serializable copy of the whole store.
    pub fn export(&self) -> StoreSnapshot {
        StoreSnapshot {
            days: unwrap_all(self.slots.all_days()),
            balances: self
                .ledger
                .balances()
                .into_iter()
                .map(|(consumer, balance)| BalanceEntry { consumer, balance })
                .collect(),
            packages: unwrap_all(self.packages.all()),
            prices: self.catalog.entries(),
            group_sessions: unwrap_all(self.groups.all()),
            records: unwrap_all(self.records_snapshot()),
            transactions: unwrap_all(newest_transactions(self.transactions.snapshot())),
        }
    }

    /// Replace the store contents with `snapshot`. On error the store is
    /// left empty.
    pub fn import(&self, snapshot: StoreSnapshot) -> Result<(), CoreError> {
        self.clear();
        let result = self.load(snapshot);
        if result.is_err() {
            self.clear();
        }
        result
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, CoreError> {
        let store = Self::new();
        store.load(snapshot)?;
        Ok(store)
    }

    fn load(&self, snapshot: StoreSnapshot) -> Result<(), CoreError> {
        for day in snapshot.days {
            self.slots.insert_day(day)?;
        }
        for entry in snapshot.balances {
            self.ledger.set(entry.consumer, entry.balance);
        }
        for package in snapshot.packages {
            self.packages.insert(package);
        }
        for price in snapshot.prices {
            self.catalog
                .set(price.provider, price.call_type, price.price_per_minute);
        }
        for session in snapshot.group_sessions {
            self.groups.insert(session);
        }
        for record in snapshot.records {
            self.append_record(record);
        }
        for txn in snapshot.transactions {
            self.append_transaction(txn);
        }
        Ok(())
    }

    fn clear(&self) {
        self.slots.clear();
        self.ledger.clear();
        self.packages.clear();
        self.catalog.clear();
        self.groups.clear();
        self.records.clear();
        self.transactions.clear();
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Snapshot format ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub consumer: EntityId,
    pub balance: u64,
}

/// Everything in a [`DataStore`], in a serde-friendly shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub days: Vec<ScheduleDay>,
    pub balances: Vec<BalanceEntry>,
    pub packages: Vec<Package>,
    pub prices: Vec<CatalogEntry>,
    pub group_sessions: Vec<GroupSession>,
    pub records: Vec<BookingRecord>,
    pub transactions: Vec<WalletTransaction>,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn unwrap_all<T: Clone>(items: Vec<Arc<T>>) -> Vec<T> {
    items.into_iter().map(|a| T::clone(&a)).collect()
}

fn newest_records(mut records: Vec<Arc<BookingRecord>>) -> Vec<Arc<BookingRecord>> {
    records.sort_by(|a, b| b.start.cmp(&a.start).then_with(|| a.id.cmp(&b.id)));
    records
}

fn newest_transactions(mut txns: Vec<Arc<WalletTransaction>>) -> Vec<Arc<WalletTransaction>> {
    txns.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    txns
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{CallType, Slot};

    #[test]
    fn export_then_import_preserves_state() {
        let store = DataStore::new();
        let mentor = EntityId::from("mentor-1");
        let user = EntityId::from("user-1");
        let date: NaiveDate = "2030-05-01".parse().unwrap();
        store
            .slots()
            .publish(&mentor, date, &["10:00".to_owned(), "11:00".to_owned()])
            .unwrap();
        store.ledger().credit(&user, 250);
        store.catalog().set(mentor.clone(), CallType::Chat, 3);

        let snapshot = store.export();
        let restored = DataStore::from_snapshot(snapshot.clone()).unwrap();

        assert_eq!(restored.export(), snapshot);
        assert_eq!(restored.ledger().balance(&user), 250);
        let slot_id = restored.slots().day(&mentor, date).unwrap().slots[0].id.clone();
        assert!(restored.slots().slot(&slot_id).is_some());
    }

    #[test]
    fn import_rejects_inconsistent_slots_and_leaves_store_empty() {
        let mentor = EntityId::from("mentor-1");
        let mut day = ScheduleDay::new(mentor, "2030-05-01".parse().unwrap());
        let mut slot = Slot::new("10:00");
        slot.booked = true;
        day.slots.push(slot);

        let store = DataStore::new();
        store.ledger().credit(&EntityId::from("u"), 10);
        let err = store
            .import(StoreSnapshot {
                days: vec![day],
                ..StoreSnapshot::default()
            })
            .unwrap_err();

        assert!(matches!(err, CoreError::Consistency { .. }));
        assert!(store.ledger().balances().is_empty());
        assert!(store.slots().all_days().is_empty());
    }
}
