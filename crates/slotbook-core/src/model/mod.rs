// ── Domain model ──
//
// Canonical representation of every slotbook entity. Stores, the workflow
// and the CLI all speak these types.

pub mod entity_id;

pub mod catalog;
pub mod event;
pub mod group;
pub mod package;
pub mod record;
pub mod slot;
pub mod wallet;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity_id::EntityId;

pub use catalog::CatalogEntry;
pub use event::BookingEvent;
pub use group::{GroupSession, GroupSessionPatch, GroupStatus};
pub use package::{Package, PackagePatch, PackageStatus};
pub use record::{BookingRecord, RecordStatus, RoomHandle};
pub use slot::{CallType, ScheduleDay, Slot, SlotStatus};
pub use wallet::{Split, TransactionKind, TransactionStatus, WalletTransaction};
