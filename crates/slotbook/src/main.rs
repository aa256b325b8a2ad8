mod cli;
mod commands;
mod config;
mod error;
mod output;
mod state;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use slotbook_core::{Controller, RoomProvisioner, TracingNotifier, Unconfigured};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::state::StateFile;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't touch the store
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "slotbook", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against the persisted store
        cmd => {
            let cfg = config::load(&cli.global)?;
            let state = StateFile::new(config::state_path(&cli.global, &cfg));
            let store = Arc::new(state.load()?);

            let provisioner: Arc<dyn RoomProvisioner> = match cfg.room_client()? {
                Some(client) => Arc::new(client),
                None => Arc::new(Unconfigured),
            };

            let controller = Controller::builder(cfg.booking_config()?)
                .store(Arc::clone(&store))
                .provisioner(provisioner)
                .notifier(Arc::new(TracingNotifier))
                .build()?;
            controller.start().await;

            let save = commands::changes_state(&cmd);
            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.shutdown().await;

            // Failed commands leave the store compensated; persist what committed.
            if save {
                state.save(&store)?;
            }
            result
        }
    }
}
