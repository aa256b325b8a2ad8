//! Schedule slot command handlers.

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use tabled::Tabled;

use slotbook_core::{Command as CoreCommand, CommandResult, Controller, EntityId, Slot};

use crate::cli::{GlobalOpts, SlotsArgs, SlotsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── View / table row ────────────────────────────────────────────────

#[derive(Serialize)]
struct SlotView {
    provider: EntityId,
    date: NaiveDate,
    #[serde(flatten)]
    slot: Slot,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Consumer")]
    consumer: String,
    #[tabled(rename = "Call")]
    call: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn row(v: &SlotView, color: bool) -> SlotRow {
    SlotRow {
        id: v.slot.id.to_string(),
        date: v.date.to_string(),
        time: v.slot.time.clone(),
        status: output::paint_status(&v.slot.status.to_string(), color),
        consumer: v
            .slot
            .consumer
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        call: match (v.slot.call_type, v.slot.duration_minutes) {
            (Some(t), Some(d)) => format!("{t} {d}m"),
            _ => String::new(),
        },
        note: v.slot.note.clone().unwrap_or_default(),
    }
}

fn detail(v: &SlotView) -> String {
    let s = &v.slot;
    [
        format!("ID:        {}", s.id),
        format!("Provider:  {}", v.provider),
        format!("Date:      {}", v.date),
        format!("Time:      {}", s.time),
        format!("Status:    {}", s.status),
        format!("Booked:    {}", s.booked),
        format!(
            "Consumer:  {}",
            s.consumer.as_ref().map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!(
            "Call:      {}",
            s.call_type.map_or_else(|| "-".into(), |t| t.to_string())
        ),
        format!(
            "Duration:  {}",
            s.duration_minutes.map_or_else(|| "-".into(), |d| format!("{d} min"))
        ),
        format!("Charged:   {}", s.charged),
        format!("Note:      {}", s.note.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: SlotsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SlotsCommand::Publish {
            provider,
            date,
            times,
        } => {
            let result = controller
                .execute(CoreCommand::PublishSlots {
                    provider: util::id(&provider, "provider")?,
                    date: util::date(&date, "date")?,
                    times,
                })
                .await?;
            if let CommandResult::Published { added } = result {
                output::notice(&format!("Published {added} new slot(s) for {date}"), global.quiet);
            }
            Ok(())
        }

        SlotsCommand::List {
            provider,
            after,
            all,
        } => {
            let provider = util::id(&provider, "provider")?;
            let after = match after {
                Some(raw) => util::date(&raw, "after")?,
                None => Utc::now()
                    .date_naive()
                    .checked_sub_days(Days::new(1))
                    .unwrap_or(NaiveDate::MIN),
            };

            let views: Vec<SlotView> = controller
                .available_days(&provider, after)
                .flat_map(|day| {
                    day.slots
                        .iter()
                        .filter(|s| all || !s.booked)
                        .map(|s| SlotView {
                            provider: day.provider.clone(),
                            date: day.date,
                            slot: s.clone(),
                        })
                        .collect::<Vec<_>>()
                })
                .collect();

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &views,
                |v| row(v, color),
                |v| v.slot.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SlotsCommand::Show(slot_ref) => {
            let id = util::id(&slot_ref.slot, "slot")?;
            let located = controller.slot(&id).ok_or_else(|| CliError::NotFound {
                resource_type: "slot".into(),
                identifier: slot_ref.slot.clone(),
                list_command: "slots list --provider <id>".into(),
            })?;
            let view = SlotView {
                provider: located.provider,
                date: located.date,
                slot: located.slot,
            };
            let out = output::render_single(&global.output, &view, detail, |v| {
                v.slot.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SlotsCommand::Note { slot, note } => {
            let cleared = note.is_none();
            controller
                .execute(CoreCommand::UpdateSlotNote {
                    slot: util::id(&slot, "slot")?,
                    note,
                })
                .await?;
            output::notice(
                if cleared { "Note cleared" } else { "Note saved" },
                global.quiet,
            );
            Ok(())
        }

        SlotsCommand::Delete(slot_ref) => {
            let id = util::id(&slot_ref.slot, "slot")?;
            if !util::confirm(
                &format!("Delete slot {id}? A pending booking is refunded."),
                "slots delete",
                global.yes,
            )? {
                return Ok(());
            }
            let result = controller.execute(CoreCommand::DeleteSlot { slot: id }).await?;
            if let CommandResult::SlotDeleted { refunded, .. } = result {
                let msg = if refunded > 0 {
                    format!("Slot deleted; {refunded} refunded")
                } else {
                    "Slot deleted".to_owned()
                };
                output::notice(&msg, global.quiet);
            }
            Ok(())
        }
    }
}
