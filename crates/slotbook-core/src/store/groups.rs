// ── Group session store ──

use std::sync::Arc;

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{EntityId, GroupSession, GroupSessionPatch, GroupStatus};

pub struct GroupStore {
    sessions: EntityCollection<GroupSession>,
}

impl GroupStore {
    pub(crate) fn new() -> Self {
        Self {
            sessions: EntityCollection::new(),
        }
    }

    pub fn insert(&self, session: GroupSession) {
        self.sessions
            .upsert(session.id.to_string(), session.id.clone(), session);
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<GroupSession>> {
        self.sessions.get_by_id(id)
    }

    /// Sessions hosted by `provider`, soonest first.
    pub fn for_provider(&self, provider: &EntityId) -> Vec<Arc<GroupSession>> {
        let mut sessions = self.sessions.filter(|s| &s.provider == provider);
        sessions.sort_by_key(|s| s.scheduled_at);
        sessions
    }

    pub fn all(&self) -> Vec<Arc<GroupSession>> {
        let mut sessions = self.sessions.snapshot();
        sessions.sort_by_key(|s| s.scheduled_at);
        sessions
    }

    /// The booking pre-checks, in order: bookable status, duplicate
    /// consumer, capacity.
    pub fn check_bookable(session: &GroupSession, consumer: &EntityId) -> Result<(), CoreError> {
        if session.status != GroupStatus::Scheduled {
            return Err(CoreError::invalid_state(
                "group session",
                &session.id,
                session.status,
                "book",
            ));
        }
        if session.has_consumer(consumer) {
            return Err(CoreError::AlreadyBooked {
                identifier: session.id.to_string(),
            });
        }
        if session.is_full() {
            return Err(CoreError::CapacityReached {
                identifier: session.id.to_string(),
                capacity: session.capacity,
            });
        }
        Ok(())
    }

    /// Add `consumer` to the session, re-running every booking check
    /// under the session's lock.
    pub fn add_seat(&self, id: &EntityId, consumer: &EntityId) -> Result<GroupSession, CoreError> {
        self.sessions
            .try_update(&id.to_string(), |session| {
                Self::check_bookable(session, consumer)?;
                session.booked_consumers.push(consumer.clone());
                Ok(session.clone())
            })
            .unwrap_or_else(|| Err(CoreError::not_found("group session", id)))
    }

    /// Apply `patch`. Cancelling a scheduled session releases its seats;
    /// the released consumers are returned alongside the updated session
    /// so the caller can refund them. Completed and cancelled sessions
    /// keep their status.
    pub fn update(
        &self,
        id: &EntityId,
        patch: GroupSessionPatch,
    ) -> Result<(GroupSession, Vec<EntityId>), CoreError> {
        self.sessions
            .try_update(&id.to_string(), |session| {
                if let Some(status) = patch.status {
                    if status != session.status && session.status != GroupStatus::Scheduled {
                        return Err(CoreError::invalid_state(
                            "group session",
                            &session.id,
                            session.status,
                            "change status of",
                        ));
                    }
                }
                if let Some(price) = patch.price {
                    if price != session.price && session.booked_count() > 0 {
                        return Err(CoreError::validation(format!(
                            "price cannot change once seats are booked ({} taken)",
                            session.booked_count()
                        )));
                    }
                }
                if let Some(capacity) = patch.capacity {
                    if usize::try_from(capacity).unwrap_or(usize::MAX) < session.booked_count() {
                        return Err(CoreError::validation(format!(
                            "capacity {capacity} is below the {} seats already booked",
                            session.booked_count()
                        )));
                    }
                    session.capacity = capacity;
                }
                if let Some(title) = patch.title {
                    session.title = title;
                }
                if let Some(description) = patch.description {
                    session.description = description;
                }
                if let Some(price) = patch.price {
                    session.price = price;
                }
                if let Some(at) = patch.scheduled_at {
                    session.scheduled_at = at;
                }
                if let Some(link) = patch.join_link {
                    session.join_link = Some(link);
                }
                let mut released = Vec::new();
                if let Some(status) = patch.status {
                    if status == GroupStatus::Cancelled && session.status == GroupStatus::Scheduled {
                        released = std::mem::take(&mut session.booked_consumers);
                    }
                    session.status = status;
                }
                Ok((session.clone(), released))
            })
            .unwrap_or_else(|| Err(CoreError::not_found("group session", id)))
    }

    pub fn delete(&self, id: &EntityId) -> Result<Arc<GroupSession>, CoreError> {
        self.sessions
            .remove(&id.to_string())
            .ok_or_else(|| CoreError::not_found("group session", id))
    }

    pub(crate) fn clear(&self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::model::CallType;

    fn session(capacity: u32) -> GroupSession {
        GroupSession {
            id: EntityId::generate(),
            provider: EntityId::from("mentor-1"),
            category: EntityId::from("career"),
            title: "Mock interviews".into(),
            description: "Practice round".into(),
            call_type: CallType::Video,
            price: 100,
            capacity,
            booked_consumers: Vec::new(),
            scheduled_at: Utc::now(),
            join_link: None,
            status: GroupStatus::Scheduled,
        }
    }

    #[test]
    fn seats_fill_up_to_capacity() {
        let store = GroupStore::new();
        let s = session(2);
        let id = s.id.clone();
        store.insert(s);

        store.add_seat(&id, &EntityId::from("u1")).unwrap();
        store.add_seat(&id, &EntityId::from("u2")).unwrap();
        let err = store.add_seat(&id, &EntityId::from("u3")).unwrap_err();
        assert!(matches!(err, CoreError::CapacityReached { capacity: 2, .. }));
        assert_eq!(store.get(&id).unwrap().booked_count(), 2);
    }

    #[test]
    fn duplicate_consumer_is_already_booked() {
        let store = GroupStore::new();
        let s = session(5);
        let id = s.id.clone();
        store.insert(s);

        store.add_seat(&id, &EntityId::from("u1")).unwrap();
        let err = store.add_seat(&id, &EntityId::from("u1")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyBooked { .. }));
    }

    #[test]
    fn cancelled_session_cannot_be_booked() {
        let store = GroupStore::new();
        let mut s = session(5);
        s.status = GroupStatus::Cancelled;
        let id = s.id.clone();
        store.insert(s);

        let err = store.add_seat(&id, &EntityId::from("u1")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn capacity_cannot_drop_below_bookings() {
        let store = GroupStore::new();
        let s = session(3);
        let id = s.id.clone();
        store.insert(s);
        store.add_seat(&id, &EntityId::from("u1")).unwrap();
        store.add_seat(&id, &EntityId::from("u2")).unwrap();

        let err = store
            .update(
                &id,
                GroupSessionPatch {
                    capacity: Some(1),
                    ..GroupSessionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(store.get(&id).unwrap().capacity, 3);
    }

    fn cancel() -> GroupSessionPatch {
        GroupSessionPatch {
            status: Some(GroupStatus::Cancelled),
            ..GroupSessionPatch::default()
        }
    }

    #[test]
    fn cancelling_releases_every_seat_once() {
        let store = GroupStore::new();
        let s = session(3);
        let id = s.id.clone();
        store.insert(s);
        store.add_seat(&id, &EntityId::from("u1")).unwrap();
        store.add_seat(&id, &EntityId::from("u2")).unwrap();

        let (updated, released) = store.update(&id, cancel()).unwrap();
        assert_eq!(updated.status, GroupStatus::Cancelled);
        assert_eq!(updated.booked_count(), 0);
        assert_eq!(released, vec![EntityId::from("u1"), EntityId::from("u2")]);

        let (_, released) = store.update(&id, cancel()).unwrap();
        assert!(released.is_empty());
    }

    #[test]
    fn finished_sessions_keep_their_status() {
        let store = GroupStore::new();
        let mut s = session(3);
        s.status = GroupStatus::Completed;
        s.booked_consumers.push(EntityId::from("u1"));
        let id = s.id.clone();
        store.insert(s);

        let err = store.update(&id, cancel()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
        let current = store.get(&id).unwrap();
        assert_eq!(current.status, GroupStatus::Completed);
        assert_eq!(current.booked_count(), 1);
    }

    #[test]
    fn price_is_fixed_once_seats_are_booked() {
        let store = GroupStore::new();
        let s = session(3);
        let id = s.id.clone();
        store.insert(s);
        store.add_seat(&id, &EntityId::from("u1")).unwrap();

        let err = store
            .update(
                &id,
                GroupSessionPatch {
                    price: Some(250),
                    ..GroupSessionPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(store.get(&id).unwrap().price, 100);
    }
}
