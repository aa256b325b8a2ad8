// ── Package store ──

use std::sync::Arc;

use tracing::{debug, info};

use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{EntityId, Package, PackagePatch, PackageStatus};

pub struct PackageStore {
    packages: EntityCollection<Package>,
}

impl PackageStore {
    pub(crate) fn new() -> Self {
        Self {
            packages: EntityCollection::new(),
        }
    }

    pub fn insert(&self, package: Package) {
        debug!(package = %package.id, consumer = %package.consumer, "package stored");
        self.packages
            .upsert(package.id.to_string(), package.id.clone(), package);
    }

    pub fn get(&self, id: &EntityId) -> Option<Arc<Package>> {
        self.packages.get_by_id(id)
    }

    /// Use one session. Fails with `Exhausted` once nothing is left;
    /// the last session flips the package to expired.
    pub fn consume(&self, id: &EntityId) -> Result<Package, CoreError> {
        let package = self
            .packages
            .try_update(&id.to_string(), |pkg| {
                if !pkg.is_consumable() {
                    return Err(CoreError::Exhausted {
                        identifier: pkg.id.to_string(),
                    });
                }
                pkg.remaining_sessions -= 1;
                if pkg.remaining_sessions == 0 {
                    pkg.status = PackageStatus::Expired;
                }
                Ok(pkg.clone())
            })
            .unwrap_or_else(|| Err(CoreError::not_found("package", id)))?;

        if package.status == PackageStatus::Expired {
            info!(package = %package.id, "package used up");
        }
        Ok(package)
    }

    /// Active packages of one consumer, newest first.
    pub fn active_for_consumer(&self, consumer: &EntityId) -> Vec<Arc<Package>> {
        newest_first(
            self.packages
                .filter(|p| &p.consumer == consumer && p.status == PackageStatus::Active),
        )
    }

    /// Every package sold by one provider, newest first.
    pub fn for_provider(&self, provider: &EntityId) -> Vec<Arc<Package>> {
        newest_first(self.packages.filter(|p| &p.provider == provider))
    }

    pub fn all(&self) -> Vec<Arc<Package>> {
        newest_first(self.packages.snapshot())
    }

    /// Apply `patch`. Remaining sessions only ever decrease, so an
    /// expired package stays expired. Status follows the remaining count:
    /// zero means expired, anything else active.
    pub fn update(&self, id: &EntityId, patch: &PackagePatch) -> Result<Package, CoreError> {
        if patch.is_empty() {
            return Err(CoreError::validation("package update changes nothing"));
        }
        self.packages
            .try_update(&id.to_string(), |pkg| {
                if let Some(total) = patch.total_sessions {
                    pkg.total_sessions = total;
                }
                if let Some(remaining) = patch.remaining_sessions {
                    if remaining > pkg.remaining_sessions {
                        return Err(CoreError::validation(format!(
                            "remaining sessions can only go down ({} left, {remaining} requested)",
                            pkg.remaining_sessions
                        )));
                    }
                    pkg.remaining_sessions = remaining;
                }
                if let Some(price) = patch.price {
                    pkg.price = price;
                }
                if let Some(call_type) = patch.call_type {
                    pkg.call_type = call_type;
                }
                if pkg.total_sessions == 0 {
                    return Err(CoreError::validation("total sessions must be at least 1"));
                }
                if pkg.remaining_sessions > pkg.total_sessions {
                    return Err(CoreError::validation(format!(
                        "remaining sessions ({}) exceed total ({})",
                        pkg.remaining_sessions, pkg.total_sessions
                    )));
                }
                pkg.status = if pkg.remaining_sessions == 0 {
                    PackageStatus::Expired
                } else {
                    PackageStatus::Active
                };
                Ok(pkg.clone())
            })
            .unwrap_or_else(|| Err(CoreError::not_found("package", id)))
    }

    pub fn delete(&self, id: &EntityId) -> Result<Arc<Package>, CoreError> {
        self.packages
            .remove(&id.to_string())
            .ok_or_else(|| CoreError::not_found("package", id))
    }

    pub(crate) fn clear(&self) {
        self.packages.clear();
    }
}

fn newest_first(mut packages: Vec<Arc<Package>>) -> Vec<Arc<Package>> {
    packages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    packages
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::model::CallType;

    fn package(remaining: u32) -> Package {
        Package {
            id: EntityId::generate(),
            consumer: EntityId::from("user-1"),
            provider: EntityId::from("mentor-1"),
            category: EntityId::from("career"),
            call_type: CallType::Video,
            total_sessions: 5,
            remaining_sessions: remaining,
            price: 500,
            status: if remaining == 0 {
                PackageStatus::Expired
            } else {
                PackageStatus::Active
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn last_session_expires_package_and_further_use_is_exhausted() {
        let store = PackageStore::new();
        let pkg = package(1);
        let id = pkg.id.clone();
        store.insert(pkg);

        let used = store.consume(&id).unwrap();
        assert_eq!(used.remaining_sessions, 0);
        assert_eq!(used.status, PackageStatus::Expired);

        let err = store.consume(&id).unwrap_err();
        assert!(matches!(err, CoreError::Exhausted { .. }));
        assert_eq!(store.get(&id).unwrap().remaining_sessions, 0);
    }

    #[test]
    fn consume_decrements_by_exactly_one() {
        let store = PackageStore::new();
        let pkg = package(3);
        let id = pkg.id.clone();
        store.insert(pkg);

        assert_eq!(store.consume(&id).unwrap().remaining_sessions, 2);
        assert_eq!(store.consume(&id).unwrap().remaining_sessions, 1);
        assert_eq!(store.get(&id).unwrap().status, PackageStatus::Active);
    }

    #[test]
    fn consume_unknown_package_is_not_found() {
        let store = PackageStore::new();
        assert!(matches!(
            store.consume(&EntityId::generate()),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn active_for_consumer_is_newest_first_and_skips_expired() {
        let store = PackageStore::new();
        let mut old = package(2);
        old.created_at = Utc::now() - Duration::days(3);
        let new = package(2);
        let expired = package(0);
        let (old_id, new_id) = (old.id.clone(), new.id.clone());
        store.insert(old);
        store.insert(new);
        store.insert(expired);

        let ids: Vec<EntityId> = store
            .active_for_consumer(&EntityId::from("user-1"))
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec![new_id, old_id]);
        assert_eq!(store.for_provider(&EntityId::from("mentor-1")).len(), 3);
    }

    #[test]
    fn update_recomputes_status_and_validates() {
        let store = PackageStore::new();
        let pkg = package(3);
        let id = pkg.id.clone();
        store.insert(pkg);

        let spent = store
            .update(
                &id,
                &PackagePatch {
                    remaining_sessions: Some(0),
                    ..PackagePatch::default()
                },
            )
            .unwrap();
        assert_eq!(spent.status, PackageStatus::Expired);

        let err = store
            .update(
                &id,
                &PackagePatch {
                    total_sessions: Some(0),
                    ..PackagePatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(store.get(&id).unwrap().total_sessions, 5);
    }

    #[test]
    fn update_never_adds_sessions_back() {
        let store = PackageStore::new();
        let active = package(2);
        let active_id = active.id.clone();
        store.insert(active);
        let expired = package(0);
        let expired_id = expired.id.clone();
        store.insert(expired);

        let more = PackagePatch {
            remaining_sessions: Some(4),
            ..PackagePatch::default()
        };
        let err = store.update(&active_id, &more).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(store.get(&active_id).unwrap().remaining_sessions, 2);

        let err = store.update(&expired_id, &more).unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        let still = store.get(&expired_id).unwrap();
        assert_eq!(still.remaining_sessions, 0);
        assert_eq!(still.status, PackageStatus::Expired);

        // Other fields of an expired package can still change.
        let repriced = store
            .update(
                &expired_id,
                &PackagePatch {
                    price: Some(450),
                    ..PackagePatch::default()
                },
            )
            .unwrap();
        assert_eq!(repriced.status, PackageStatus::Expired);
        assert_eq!(repriced.price, 450);
    }

    #[test]
    fn delete_removes_package() {
        let store = PackageStore::new();
        let pkg = package(1);
        let id = pkg.id.clone();
        store.insert(pkg);
        store.delete(&id).unwrap();
        assert!(store.get(&id).is_none());
        assert!(store.delete(&id).is_err());
    }
}
