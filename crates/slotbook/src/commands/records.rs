//! Session record handlers.

use std::sync::Arc;

use tabled::Tabled;

use slotbook_core::{BookingRecord, Controller};

use crate::cli::{GlobalOpts, RecordsArgs, RecordsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "Min")]
    minutes: u32,
    #[tabled(rename = "Call")]
    call_type: String,
    #[tabled(rename = "Consumer")]
    consumer: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn row(r: &Arc<BookingRecord>, color: bool) -> RecordRow {
    RecordRow {
        id: r.id.to_string(),
        start: r.start.format("%Y-%m-%d %H:%M").to_string(),
        minutes: r.duration_minutes,
        call_type: r.call_type.to_string(),
        consumer: r.consumer.to_string(),
        provider: r.provider.to_string(),
        status: output::paint_status(&r.status.to_string(), color),
    }
}

pub fn handle(controller: &Controller, args: RecordsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RecordsCommand::List {
            participant,
            from,
            to,
        } => {
            let participant = participant
                .map(|p| util::id(&p, "participant"))
                .transpose()?;
            let mut records = match (from, to) {
                (Some(from), Some(to)) => controller.records_between(
                    util::datetime(&from, "from")?,
                    util::datetime(&to, "to")?,
                ),
                _ => match &participant {
                    Some(p) => controller.records_for(p),
                    None => controller.store().records_snapshot(),
                },
            };
            if let Some(p) = &participant {
                records.retain(|r| &r.consumer == p || &r.provider == p);
            }

            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &records,
                |r| row(r, color),
                |r| r.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
