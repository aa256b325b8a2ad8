// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller runs each command in its own task and answers on the
// envelope's oneshot channel.

pub mod requests;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{
    BookingRecord, CallType, EntityId, GroupSession, GroupSessionPatch, Package, PackagePatch,
    RoomHandle,
};

pub use requests::{
    BookingIntent, CreateGroupSessionRequest, CreatePackageRequest, GroupBooking, InstantBooking,
    Payment, SlotBooking,
};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the booking store.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Schedule ─────────────────────────────────────────────────────
    PublishSlots {
        provider: EntityId,
        date: NaiveDate,
        times: Vec<String>,
    },
    PublishSchedule {
        provider: EntityId,
        days: Vec<(NaiveDate, Vec<String>)>,
    },
    UpdateSlotNote {
        slot: EntityId,
        note: Option<String>,
    },
    DeleteSlot {
        slot: EntityId,
    },

    // ── Booking workflow ─────────────────────────────────────────────
    Book(BookingIntent),
    ConfirmSlot {
        slot: EntityId,
    },
    CancelSlot {
        slot: EntityId,
    },

    // ── Ledger ───────────────────────────────────────────────────────
    TopUp {
        consumer: EntityId,
        amount: u64,
    },

    // ── Price catalog ────────────────────────────────────────────────
    SetPrice {
        provider: EntityId,
        call_type: CallType,
        price_per_minute: u64,
    },

    // ── Packages ─────────────────────────────────────────────────────
    CreatePackage(CreatePackageRequest),
    UsePackage {
        package: EntityId,
    },
    UpdatePackage {
        package: EntityId,
        patch: PackagePatch,
    },
    DeletePackage {
        package: EntityId,
    },

    // ── Group sessions ───────────────────────────────────────────────
    CreateGroupSession(CreateGroupSessionRequest),
    UpdateGroupSession {
        session: EntityId,
        patch: GroupSessionPatch,
    },
    DeleteGroupSession {
        session: EntityId,
    },
}

/// What a successful booking hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingReceipt {
    pub consumer: EntityId,
    pub provider: EntityId,
    pub slot: Option<EntityId>,
    pub call_type: CallType,
    pub duration_minutes: u32,
    /// Amount taken from the consumer's balance (0 for package payment).
    pub charged: u64,
    /// Consumer balance after the booking.
    pub balance: u64,
    pub room: RoomHandle,
    /// Present once the booking is finalized (instant bookings).
    pub record: Option<BookingRecord>,
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandResult {
    Ok,
    Published {
        added: usize,
    },
    Booked(Box<BookingReceipt>),
    Confirmed(Box<BookingRecord>),
    Cancelled {
        slot: EntityId,
        refunded: u64,
    },
    SlotDeleted {
        slot: EntityId,
        refunded: u64,
    },
    GroupSessionDeleted {
        session: EntityId,
        refunded: u64,
    },
    GroupBooked {
        session: Box<GroupSession>,
        charged: u64,
        balance: u64,
    },
    Balance {
        consumer: EntityId,
        balance: u64,
    },
    Package(Box<Package>),
    GroupSession(Box<GroupSession>),
}
