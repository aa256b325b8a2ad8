// ── Slot store ──
//
// Schedule days keyed by `"{provider}:{date}"`, plus an index from slot id
// to its day. Every slot mutation runs inside `EntityCollection::try_update`
// on the owning day, so a reserve is a check-and-set on `booked` under that
// day's shard lock.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tracing::debug;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{CallType, EntityId, ScheduleDay, Slot, SlotStatus};

/// A slot together with the day it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSlot {
    pub day_id: EntityId,
    pub provider: EntityId,
    pub date: NaiveDate,
    pub slot: Slot,
}

pub struct SlotStore {
    days: EntityCollection<ScheduleDay>,
    slot_index: DashMap<EntityId, String>,
}

impl SlotStore {
    pub(crate) fn new() -> Self {
        Self {
            days: EntityCollection::new(),
            slot_index: DashMap::new(),
        }
    }

    // ── Publishing ───────────────────────────────────────────────────

    /// Merge `times` into the provider's day. Times already present (by
    /// exact string match) are skipped. Returns how many slots were added.
    pub fn publish(
        &self,
        provider: &EntityId,
        date: NaiveDate,
        times: &[String],
    ) -> Result<usize, CoreError> {
        if provider.is_blank() {
            return Err(CoreError::validation("provider id is required"));
        }
        if times.iter().any(|t| t.trim().is_empty()) {
            return Err(CoreError::validation("slot times must not be empty"));
        }

        let key = ScheduleDay::key_for(provider, date);
        let fresh = ScheduleDay::new(provider.clone(), date);
        let fresh_id = fresh.id.clone();
        self.days.insert_new(key.clone(), fresh_id, fresh);

        let added: Vec<EntityId> = self
            .days
            .try_update(&key, |day| {
                let mut added = Vec::new();
                for time in times {
                    if day.has_time(time) {
                        continue;
                    }
                    let slot = Slot::new(time.clone());
                    added.push(slot.id.clone());
                    day.slots.push(slot);
                }
                Ok::<_, CoreError>(added)
            })
            .unwrap_or_else(|| Err(CoreError::not_found("schedule day", &key)))?;

        for id in &added {
            self.slot_index.insert(id.clone(), key.clone());
        }
        debug!(%provider, %date, added = added.len(), "published slots");
        Ok(added.len())
    }

    /// Bulk form of [`publish`](Self::publish), one entry per date.
    pub fn publish_many(
        &self,
        provider: &EntityId,
        days: &[(NaiveDate, Vec<String>)],
    ) -> Result<usize, CoreError> {
        if days.iter().flat_map(|(_, t)| t).any(|t| t.trim().is_empty()) {
            return Err(CoreError::validation("slot times must not be empty"));
        }
        let mut added = 0;
        for (date, times) in days {
            added += self.publish(provider, *date, times)?;
        }
        Ok(added)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Days of `provider` dated strictly after `after`, ascending.
    ///
    /// The day list is fixed when called; each day's contents are read
    /// when the iterator reaches it.
    pub fn find_available(&self, provider: &EntityId, after: NaiveDate) -> AvailableDays<'_> {
        let provider_key = provider.to_string();
        let mut keys: Vec<(NaiveDate, String)> = self
            .days
            .keys()
            .into_iter()
            .filter_map(|key| {
                let (owner, date) = key.rsplit_once(':')?;
                if owner != provider_key {
                    return None;
                }
                let date = date.parse::<NaiveDate>().ok()?;
                (date > after).then_some((date, key))
            })
            .collect();
        keys.sort();

        AvailableDays {
            store: self,
            keys: keys.into_iter().map(|(_, k)| k).collect(),
            pos: 0,
        }
    }

    pub fn slot(&self, id: &EntityId) -> Option<LocatedSlot> {
        let key = self.slot_index.get(id)?.value().clone();
        let day = self.days.get_by_key(&key)?;
        let slot = day.slot(id)?.clone();
        Some(LocatedSlot {
            day_id: day.id.clone(),
            provider: day.provider.clone(),
            date: day.date,
            slot,
        })
    }

    pub fn day(&self, provider: &EntityId, date: NaiveDate) -> Option<Arc<ScheduleDay>> {
        self.days.get_by_key(&ScheduleDay::key_for(provider, date))
    }

    /// All days of one provider, newest first.
    pub fn days_for_provider(&self, provider: &EntityId) -> Vec<Arc<ScheduleDay>> {
        let mut days = self.days.filter(|d| &d.provider == provider);
        days.sort_by(|a, b| b.date.cmp(&a.date));
        days
    }

    /// Every day in the store, ordered by date then provider.
    pub fn all_days(&self) -> Vec<Arc<ScheduleDay>> {
        let mut days = self.days.snapshot();
        days.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.provider.cmp(&b.provider)));
        days
    }

    pub fn slot_count(&self) -> usize {
        self.slot_index.len()
    }

    // ── State transitions ────────────────────────────────────────────

    /// Book an unbooked slot for `consumer`. Returns the slot as it was
    /// before the reservation so a failed booking can restore it.
    pub fn reserve(
        &self,
        id: &EntityId,
        consumer: &EntityId,
        call_type: CallType,
        duration_minutes: u32,
        charged: u64,
    ) -> Result<Slot, CoreError> {
        self.update_slot(id, |slot| {
            if slot.booked {
                return Err(CoreError::AlreadyBooked {
                    identifier: slot.id.to_string(),
                });
            }
            let previous = slot.clone();
            slot.booked = true;
            slot.consumer = Some(consumer.clone());
            slot.status = SlotStatus::Pending;
            slot.call_type = Some(call_type);
            slot.duration_minutes = Some(duration_minutes);
            slot.charged = charged;
            slot.room = None;
            Ok(previous)
        })
    }

    /// `pending → accepted`.
    pub fn confirm(&self, id: &EntityId) -> Result<Slot, CoreError> {
        self.update_slot(id, |slot| {
            if slot.status != SlotStatus::Pending {
                return Err(CoreError::invalid_state(
                    "slot",
                    &slot.id,
                    slot.status,
                    "confirm",
                ));
            }
            slot.status = SlotStatus::Accepted;
            Ok(slot.clone())
        })
    }

    /// Mark rejected and release the consumer, whatever the current
    /// status. Returns the slot as it was before.
    pub fn reject(&self, id: &EntityId) -> Result<Slot, CoreError> {
        self.update_slot(id, |slot| {
            let previous = slot.clone();
            slot.status = SlotStatus::Rejected;
            slot.booked = false;
            slot.consumer = None;
            slot.charged = 0;
            slot.room = None;
            Ok(previous)
        })
    }

    pub fn update_note(&self, id: &EntityId, note: Option<String>) -> Result<(), CoreError> {
        self.update_slot(id, |slot| {
            slot.note = note;
            Ok(())
        })
    }

    /// Remove a slot from its day. The day itself stays, even if empty.
    pub fn delete(&self, id: &EntityId) -> Result<Slot, CoreError> {
        let key = self.day_key(id)?;
        let removed = self
            .days
            .try_update(&key, |day| {
                let pos = day
                    .slots
                    .iter()
                    .position(|s| &s.id == id)
                    .ok_or_else(|| CoreError::not_found("slot", id))?;
                Ok(day.slots.remove(pos))
            })
            .unwrap_or_else(|| Err(CoreError::not_found("slot", id)))?;
        self.slot_index.remove(id);
        Ok(removed)
    }

    /// Put a reserved slot back the way it was before `reserve`.
    ///
    /// Only succeeds while the slot is still the pending reservation held
    /// by `consumer`; anything else is a consistency failure.
    pub(crate) fn restore(&self, previous: &Slot, consumer: &EntityId) -> Result<(), CoreError> {
        self.update_slot(&previous.id, |slot| {
            let ours = slot.booked
                && slot.status == SlotStatus::Pending
                && slot.consumer.as_ref() == Some(consumer);
            if !ours {
                return Err(CoreError::Consistency {
                    message: format!(
                        "slot {} changed while its reservation was being rolled back",
                        slot.id
                    ),
                });
            }
            *slot = previous.clone();
            Ok(())
        })
    }

    /// Run `f` on one slot under its day's lock. The change is kept only
    /// if `f` returns `Ok`.
    pub(crate) fn update_slot<R>(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut Slot) -> Result<R, CoreError>,
    ) -> Result<R, CoreError> {
        let key = self.day_key(id)?;
        self.days
            .try_update(&key, |day| {
                let slot = day
                    .slot_mut(id)
                    .ok_or_else(|| CoreError::not_found("slot", id))?;
                f(slot)
            })
            .unwrap_or_else(|| Err(CoreError::not_found("slot", id)))
    }

    // ── Bulk load / reset ────────────────────────────────────────────

    pub(crate) fn insert_day(&self, day: ScheduleDay) -> Result<(), CoreError> {
        let key = day.key();
        for slot in &day.slots {
            if !slot.is_consistent() {
                return Err(CoreError::Consistency {
                    message: format!("slot {} is booked without a consumer (or vice versa)", slot.id),
                });
            }
            if self.slot_index.contains_key(&slot.id) {
                return Err(CoreError::Consistency {
                    message: format!("slot id {} appears more than once", slot.id),
                });
            }
        }
        for slot in &day.slots {
            self.slot_index.insert(slot.id.clone(), key.clone());
        }
        self.days.upsert(key, day.id.clone(), day);
        Ok(())
    }

    pub(crate) fn clear(&self) {
        self.days.clear();
        self.slot_index.clear();
    }

    fn day_key(&self, id: &EntityId) -> Result<String, CoreError> {
        self.slot_index
            .get(id)
            .map(|k| k.value().clone())
            .ok_or_else(|| CoreError::not_found("slot", id))
    }
}

// ── AvailableDays ────────────────────────────────────────────────────

/// Lazy, finite, restartable walk over a provider's upcoming days.
pub struct AvailableDays<'a> {
    store: &'a SlotStore,
    keys: Vec<String>,
    pos: usize,
}

impl AvailableDays<'_> {
    /// Rewind to the first day.
    pub fn restart(&mut self) {
        self.pos = 0;
    }

    /// Number of days the walk was created with.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Iterator for AvailableDays<'_> {
    type Item = Arc<ScheduleDay>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(key) = self.keys.get(self.pos) {
            self.pos += 1;
            // Skip days removed since the walk started.
            if let Some(day) = self.store.days.get_by_key(key) {
                return Some(day);
            }
        }
        None
    }
}
