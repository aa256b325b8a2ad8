//! Booking, confirmation and cancellation handlers.

use serde::Serialize;

use slotbook_core::{
    BookingIntent, BookingReceipt, BookingRecord, Command as CoreCommand, CommandResult,
    Controller, EntityId, GroupBooking, GroupSession, InstantBooking, Payment, SlotBooking,
};

use crate::cli::{BookArgs, BookCommand, GlobalOpts, SlotRef};
use crate::error::CliError;
use crate::output;

use super::util;

fn unexpected(result: &CommandResult) -> CliError {
    CliError::Internal {
        message: format!("unexpected command result: {result:?}"),
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn receipt_detail(r: &BookingReceipt) -> String {
    let mut lines = vec![
        format!("Consumer:   {}", r.consumer),
        format!("Provider:   {}", r.provider),
    ];
    if let Some(slot) = &r.slot {
        lines.push(format!("Slot:       {slot}"));
    }
    lines.extend([
        format!("Call:       {} ({} min)", r.call_type, r.duration_minutes),
        format!("Charged:    {}", r.charged),
        format!("Balance:    {}", r.balance),
        format!("Host URL:   {}", r.room.host_url),
        format!("Guest URL:  {}", r.room.guest_url),
    ]);
    match &r.record {
        Some(record) => lines.push(format!("Record:     {} ({})", record.id, record.status)),
        None => lines.push("Awaiting provider confirmation".into()),
    }
    lines.join("\n")
}

fn record_detail(r: &BookingRecord) -> String {
    [
        format!("Record:     {}", r.id),
        format!("Consumer:   {}", r.consumer),
        format!("Provider:   {}", r.provider),
        format!("Call:       {} ({} min)", r.call_type, r.duration_minutes),
        format!("Start:      {}", r.start.to_rfc3339()),
        format!("End:        {}", r.end.to_rfc3339()),
        format!("Status:     {}", r.status),
        format!("Host URL:   {}", r.room.host_url),
        format!("Guest URL:  {}", r.room.guest_url),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct GroupSeat {
    session: GroupSession,
    consumer: EntityId,
    charged: u64,
    balance: u64,
}

fn seat_detail(s: &GroupSeat) -> String {
    [
        format!("Session:    {} ({})", s.session.title, s.session.id),
        format!("Starts:     {}", s.session.scheduled_at.to_rfc3339()),
        format!("Seats left: {}", s.session.seats_left()),
        format!("Charged:    {}", s.charged),
        format!("Balance:    {}", s.balance),
        format!(
            "Join link:  {}",
            s.session.join_link.as_deref().unwrap_or("(sent by the provider)")
        ),
    ]
    .join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_book(
    controller: &Controller,
    args: BookArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let intent = match args.command {
        BookCommand::Slot {
            consumer,
            provider,
            slot,
            call_type,
            duration,
        } => BookingIntent::Slot(SlotBooking {
            consumer: util::id(&consumer, "consumer")?,
            provider: util::id(&provider, "provider")?,
            slot: util::id(&slot, "slot")?,
            call_type: util::call_type(call_type),
            duration_minutes: duration,
        }),
        BookCommand::Instant {
            consumer,
            provider,
            call_type,
            duration,
            package,
        } => BookingIntent::Instant(InstantBooking {
            consumer: util::id(&consumer, "consumer")?,
            provider: util::id(&provider, "provider")?,
            call_type: util::call_type(call_type),
            duration_minutes: duration,
            payment: match package {
                Some(p) => Payment::Package {
                    package: util::id(&p, "package")?,
                },
                None => Payment::Wallet,
            },
        }),
        BookCommand::Group { consumer, session } => BookingIntent::Group(GroupBooking {
            consumer: util::id(&consumer, "consumer")?,
            session: util::id(&session, "session")?,
        }),
    };
    let consumer = intent.consumer().clone();

    let out = match controller.execute(CoreCommand::Book(intent)).await? {
        CommandResult::Booked(receipt) => {
            output::render_single(&global.output, receipt.as_ref(), receipt_detail, |r| {
                r.record.as_ref().map_or_else(
                    || r.slot.as_ref().map(ToString::to_string).unwrap_or_default(),
                    |rec| rec.id.to_string(),
                )
            })?
        }
        CommandResult::GroupBooked {
            session,
            charged,
            balance,
        } => {
            let seat = GroupSeat {
                session: *session,
                consumer,
                charged,
                balance,
            };
            output::render_single(&global.output, &seat, seat_detail, |s| {
                s.session.id.to_string()
            })?
        }
        other => return Err(unexpected(&other)),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_confirm(
    controller: &Controller,
    args: SlotRef,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let slot = util::id(&args.slot, "slot")?;
    match controller.execute(CoreCommand::ConfirmSlot { slot }).await? {
        CommandResult::Confirmed(record) => {
            let out = output::render_single(&global.output, record.as_ref(), record_detail, |r| {
                r.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        other => Err(unexpected(&other)),
    }
}

pub async fn handle_cancel(
    controller: &Controller,
    args: SlotRef,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let slot = util::id(&args.slot, "slot")?;
    if !util::confirm(&format!("Cancel slot {slot}?"), "cancel", global.yes)? {
        return Ok(());
    }
    match controller.execute(CoreCommand::CancelSlot { slot }).await? {
        CommandResult::Cancelled { slot, refunded } => {
            let msg = if refunded > 0 {
                format!("Slot {slot} cancelled; {refunded} refunded")
            } else {
                format!("Slot {slot} cancelled")
            };
            output::notice(&msg, global.quiet);
            Ok(())
        }
        other => Err(unexpected(&other)),
    }
}
