// ── Price catalog entries ──

use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::slot::CallType;

/// What one provider charges per minute for one call type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub provider: EntityId,
    pub call_type: CallType,
    pub price_per_minute: u64,
}
