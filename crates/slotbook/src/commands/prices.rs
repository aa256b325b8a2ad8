//! Price catalog command handlers.

use tabled::Tabled;

use slotbook_core::{CatalogEntry, Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, PricesArgs, PricesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PriceRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Call")]
    call_type: String,
    #[tabled(rename = "Per minute")]
    price_per_minute: u64,
}

impl From<&CatalogEntry> for PriceRow {
    fn from(e: &CatalogEntry) -> Self {
        Self {
            provider: e.provider.to_string(),
            call_type: e.call_type.to_string(),
            price_per_minute: e.price_per_minute,
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: PricesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PricesCommand::Set {
            provider,
            call_type,
            per_minute,
        } => {
            let call_type = util::call_type(call_type);
            controller
                .execute(CoreCommand::SetPrice {
                    provider: util::id(&provider, "provider")?,
                    call_type,
                    price_per_minute: per_minute,
                })
                .await?;
            output::notice(
                &format!("{provider} {call_type}: {per_minute}/min"),
                global.quiet,
            );
            Ok(())
        }

        PricesCommand::List => {
            let entries = controller.store().catalog().entries();
            let out = output::render_list(&global.output, &entries, |e| PriceRow::from(e), |e| {
                format!("{} {} {}", e.provider, e.call_type, e.price_per_minute)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
