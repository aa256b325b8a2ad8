// ── Generic concurrent entity collection ──
//
// Sharded storage with O(1) lookups by key or id. Read-modify-write goes
// through `try_update`, which holds the entry's shard lock for the whole
// closure so concurrent writers to the same key serialize.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::model::EntityId;

/// A concurrent collection for a single entity type.
///
/// Values are stored as `Arc<T>` so readers get cheap clones that never
/// observe a half-applied update.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    /// Primary storage: key string -> entity.
    /// Most entities are keyed by their id; schedule days use
    /// `"{provider}:{date}"`.
    by_key: DashMap<String, Arc<T>>,

    /// Secondary index: EntityId -> key string.
    id_to_key: DashMap<EntityId, String>,

    /// Reverse of `id_to_key` for efficient removal.
    key_to_id: DashMap<String, EntityId>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        Self {
            by_key: DashMap::new(),
            id_to_key: DashMap::new(),
            key_to_id: DashMap::new(),
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, id: EntityId, entity: T) -> bool {
        if let Some(old_id) = self.key_to_id.get(&key) {
            if *old_id != id {
                self.id_to_key.remove(&*old_id);
            }
        }

        let is_new = self.by_key.insert(key.clone(), Arc::new(entity)).is_none();
        self.id_to_key.insert(id.clone(), key.clone());
        self.key_to_id.insert(key, id);
        is_new
    }

    /// Insert only if the key is absent. Returns `false` (and drops
    /// `entity`) when something is already stored under `key`.
    pub(crate) fn insert_new(&self, key: String, id: EntityId, entity: T) -> bool {
        match self.by_key.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(entity));
                self.id_to_key.insert(id.clone(), key.clone());
                self.key_to_id.insert(key, id);
                true
            }
        }
    }

    /// Atomically read-modify-write the entity under `key`.
    ///
    /// `f` runs on a private copy while the shard lock is held; the copy
    /// replaces the stored value only if `f` returns `Ok`. Returns `None`
    /// if the key does not exist.
    pub(crate) fn try_update<R, E>(
        &self,
        key: &str,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        let mut entry = self.by_key.get_mut(key)?;
        let mut draft = T::clone(entry.value());
        let result = f(&mut draft);
        if result.is_ok() {
            *entry.value_mut() = Arc::new(draft);
        }
        Some(result)
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            if let Some((_, id)) = self.key_to_id.remove(key) {
                self.id_to_key.remove(&id);
            }
        }
        removed
    }

    /// Look up an entity by its primary key string.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Look up an entity by its `EntityId` (secondary index).
    pub(crate) fn get_by_id(&self, id: &EntityId) -> Option<Arc<T>> {
        let key = self.key_of(id)?;
        self.get_by_key(&key)
    }

    /// Primary key stored for `id`, if any.
    pub(crate) fn key_of(&self, id: &EntityId) -> Option<String> {
        self.id_to_key.get(id).map(|k| k.value().clone())
    }

    /// Point-in-time copy of every stored entity (cheap `Arc` clones).
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.by_key.iter().map(|r| Arc::clone(r.value())).collect()
    }

    /// Entities matching `pred`.
    pub(crate) fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<Arc<T>> {
        self.by_key
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| Arc::clone(r.value()))
            .collect()
    }

    /// Remove all entities.
    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.id_to_key.clear();
        self.key_to_id.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Return all current primary keys in the collection.
    pub(crate) fn keys(&self) -> Vec<String> {
        self.by_key.iter().map(|r| r.key().clone()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.upsert("key1".into(), EntityId::from("a"), "hello".into()));
        assert!(!col.upsert("key1".into(), EntityId::from("a"), "world".into()));
        assert_eq!(*col.get_by_key("key1").unwrap(), "world");
    }

    #[test]
    fn insert_new_refuses_existing_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        assert!(col.insert_new("k".into(), EntityId::from("1"), "first".into()));
        assert!(!col.insert_new("k".into(), EntityId::from("2"), "second".into()));
        assert_eq!(*col.get_by_key("k").unwrap(), "first");
        assert!(col.get_by_id(&EntityId::from("2")).is_none());
    }

    #[test]
    fn get_by_key_and_id() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::generate();
        col.upsert("key1".into(), id.clone(), "hello".into());

        assert_eq!(*col.get_by_key("key1").unwrap(), "hello");
        assert_eq!(*col.get_by_id(&id).unwrap(), "hello");
        assert_eq!(col.key_of(&id).as_deref(), Some("key1"));
    }

    #[test]
    fn try_update_commits_only_on_ok() {
        let col: EntityCollection<u32> = EntityCollection::new();
        col.upsert("n".into(), EntityId::from("n"), 1);

        let ok: Option<Result<(), ()>> = col.try_update("n", |v| {
            *v += 1;
            Ok(())
        });
        assert!(ok.unwrap().is_ok());
        assert_eq!(*col.get_by_key("n").unwrap(), 2);

        let err: Option<Result<(), &str>> = col.try_update("n", |v| {
            *v = 99;
            Err("nope")
        });
        assert_eq!(err.unwrap(), Err("nope"));
        assert_eq!(*col.get_by_key("n").unwrap(), 2);

        let missing: Option<Result<(), ()>> = col.try_update("absent", |_| Ok(()));
        assert!(missing.is_none());
    }

    #[test]
    fn remove_cleans_up_indexes() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::from("test-id");
        col.upsert("key1".into(), id.clone(), "hello".into());

        let removed = col.remove("key1");
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get_by_key("key1").is_none());
        assert!(col.get_by_id(&id).is_none());
        assert!(col.is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.upsert("a".into(), EntityId::from("1"), "x".into());
        col.upsert("b".into(), EntityId::from("2"), "y".into());
        assert_eq!(col.len(), 2);
        assert_eq!(col.filter(|v| v == "y").len(), 1);

        col.clear();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }
}
