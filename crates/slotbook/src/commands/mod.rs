//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod booking;
pub mod config_cmd;
pub mod groups;
pub mod packages;
pub mod prices;
pub mod records;
pub mod slots;
pub mod util;
pub mod wallet;

use slotbook_core::Controller;

use crate::cli::{
    Command, GlobalOpts, GroupsCommand, PackagesCommand, PricesCommand, SlotsCommand,
    WalletCommand,
};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Slots(args) => slots::handle(controller, args, global).await,
        Command::Book(args) => booking::handle_book(controller, args, global).await,
        Command::Confirm(args) => booking::handle_confirm(controller, args, global).await,
        Command::Cancel(args) => booking::handle_cancel(controller, args, global).await,
        Command::Wallet(args) => wallet::handle(controller, args, global).await,
        Command::Packages(args) => packages::handle(controller, args, global).await,
        Command::Groups(args) => groups::handle(controller, args, global).await,
        Command::Prices(args) => prices::handle(controller, args, global).await,
        Command::Records(args) => records::handle(controller, args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Whether the command can write to the store, so the state file needs saving.
pub fn changes_state(cmd: &Command) -> bool {
    match cmd {
        Command::Slots(args) => !matches!(
            args.command,
            SlotsCommand::List { .. } | SlotsCommand::Show(_)
        ),
        Command::Wallet(args) => matches!(args.command, WalletCommand::TopUp { .. }),
        Command::Packages(args) => !matches!(args.command, PackagesCommand::List { .. }),
        Command::Groups(args) => !matches!(args.command, GroupsCommand::List { .. }),
        Command::Prices(args) => matches!(args.command, PricesCommand::Set { .. }),
        Command::Book(_) | Command::Confirm(_) | Command::Cancel(_) => true,
        Command::Records(_) | Command::Config(_) | Command::Completions(_) => false,
    }
}
