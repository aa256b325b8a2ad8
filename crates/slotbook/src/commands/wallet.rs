//! Wallet command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use slotbook_core::{Command as CoreCommand, CommandResult, Controller, EntityId, WalletTransaction};

use crate::cli::{GlobalOpts, WalletArgs, WalletCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct BalanceView {
    consumer: EntityId,
    balance: u64,
}

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: u64,
    #[tabled(rename = "Provider")]
    provider_share: u64,
    #[tabled(rename = "Platform")]
    platform_share: u64,
    #[tabled(rename = "Consumer")]
    consumer: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Arc<WalletTransaction>> for TransactionRow {
    fn from(t: &Arc<WalletTransaction>) -> Self {
        Self {
            when: t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            kind: t.kind.to_string(),
            amount: t.amount,
            provider_share: t.provider_share,
            platform_share: t.platform_share,
            consumer: t.consumer.to_string(),
            description: t.description.clone(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: WalletArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WalletCommand::Balance { consumer } => {
            let consumer = util::id(&consumer, "consumer")?;
            let view = BalanceView {
                balance: controller.balance(&consumer),
                consumer,
            };
            let out = output::render_single(
                &global.output,
                &view,
                |v| format!("{}: {}", v.consumer, v.balance),
                |v| v.balance.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        WalletCommand::TopUp { consumer, amount } => {
            let result = controller
                .execute(CoreCommand::TopUp {
                    consumer: util::id(&consumer, "consumer")?,
                    amount,
                })
                .await?;
            if let CommandResult::Balance { consumer, balance } = result {
                output::notice(&format!("{consumer} balance: {balance}"), global.quiet);
            }
            Ok(())
        }

        WalletCommand::History { participant } => {
            let participant = util::id(&participant, "participant")?;
            let txns = controller.transactions_for(&participant);
            let out = output::render_list(
                &global.output,
                &txns,
                |t| TransactionRow::from(t),
                |t| t.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
