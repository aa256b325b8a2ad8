//! Booking engine between `slotbook-api` and the `slotbook` CLI.
//!
//! This crate owns the business logic and domain model for slot booking:
//!
//! - **[`Controller`]**: Facade over the store and the booking workflow.
//!   [`start()`](Controller::start) spawns the command processor;
//!   [`Controller::oneshot()`](Controller::oneshot) runs one closure
//!   between start and shutdown. Every command runs on its own worker task.
//!
//! - **[`DataStore`]**: Concurrent in-memory storage built on `DashMap`:
//!   schedule days and slots, consumer balances, packages, per-minute
//!   prices, group sessions, session records and wallet transactions.
//!   Exports and imports a serializable [`StoreSnapshot`].
//!
//! - **[`Command`]**: Typed mutation requests routed through an `mpsc`
//!   channel. Reads go straight to the store.
//!
//! - **Capabilities**: [`RoomProvisioner`] creates audio/video rooms (the
//!   `slotbook_api::RoomClient` implements it); [`Notifier`] receives every
//!   committed [`BookingEvent`].
//!
//! Every multi-step booking either completes or leaves balances, slots
//! and packages exactly as it found them.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod provision;
pub mod store;
mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{BookingReceipt, Command, CommandResult};
pub use config::BookingConfig;
pub use controller::{Controller, ControllerBuilder, ControllerState};
pub use error::CoreError;
pub use notify::{NoopNotifier, Notifier, TracingNotifier};
pub use provision::{ProvisioningError, RoomProvisioner, Unconfigured};
pub use store::{DataStore, StoreSnapshot};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BookingEvent,
    // Session records
    BookingRecord,
    // Schedule
    CallType,
    CatalogEntry,
    EntityId,
    // Group sessions
    GroupSession,
    GroupSessionPatch,
    GroupStatus,
    // Packages
    Package,
    PackagePatch,
    PackageStatus,
    RecordStatus,
    RoomHandle,
    ScheduleDay,
    Slot,
    SlotStatus,
    // Wallet
    Split,
    TransactionKind,
    TransactionStatus,
    WalletTransaction,
};
