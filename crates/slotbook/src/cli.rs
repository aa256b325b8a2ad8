//! Clap derive structures for the `slotbook` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Depends on nothing but `clap` and `clap_complete` so `build.rs` can
//! include it for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// slotbook -- book mentoring sessions on published time slots
#[derive(Debug, Parser)]
#[command(
    name = "slotbook",
    version,
    about = "Publish, book and confirm mentoring session slots",
    long_about = "Publish provider schedules, book slots against a prepaid balance,\n\
        confirm or cancel bookings, and manage packages and group sessions.\n\n\
        State lives in a local JSON file between invocations.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SLOTBOOK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// State file (overrides `state_file` from the config)
    #[arg(long, env = "SLOTBOOK_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SLOTBOOK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CallTypeArg {
    Chat,
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupStatusArg {
    Scheduled,
    Completed,
    Cancelled,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Publish and manage provider schedule slots
    #[command(alias = "s")]
    Slots(SlotsArgs),

    /// Book a slot, an instant session or a group seat
    #[command(alias = "b")]
    Book(BookArgs),

    /// Confirm a pending slot (provider)
    Confirm(SlotRef),

    /// Cancel a pending slot, refunding its charge
    Cancel(SlotRef),

    /// Consumer balances and wallet history
    #[command(alias = "w")]
    Wallet(WalletArgs),

    /// Manage prepaid session packages
    #[command(alias = "pkg")]
    Packages(PackagesArgs),

    /// Manage group sessions
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Manage per-minute provider prices
    Prices(PricesArgs),

    /// View session records
    Records(RecordsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SlotRef {
    /// Slot ID
    pub slot: String,
}

// ── Slots ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SlotsArgs {
    #[command(subcommand)]
    pub command: SlotsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SlotsCommand {
    /// Publish slot times for a date (merged with what is already there)
    Publish {
        /// Provider ID
        #[arg(long)]
        provider: String,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Time labels, e.g. "10:00 AM"
        #[arg(required = true, num_args = 1..)]
        times: Vec<String>,
    },

    /// List a provider's schedule
    #[command(alias = "ls")]
    List {
        /// Provider ID
        #[arg(long)]
        provider: String,

        /// Only days after this date (YYYY-MM-DD, default: yesterday)
        #[arg(long)]
        after: Option<String>,

        /// Include booked slots
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one slot
    Show(SlotRef),

    /// Set or clear a slot's note
    Note {
        /// Slot ID
        slot: String,

        /// Note text (omit to clear)
        note: Option<String>,
    },

    /// Delete a slot
    #[command(alias = "rm")]
    Delete(SlotRef),
}

// ── Booking ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BookArgs {
    #[command(subcommand)]
    pub command: BookCommand,
}

#[derive(Debug, Subcommand)]
pub enum BookCommand {
    /// Reserve a published slot (awaits provider confirmation)
    Slot {
        /// Consumer ID
        #[arg(long)]
        consumer: String,

        /// Provider ID
        #[arg(long)]
        provider: String,

        /// Slot ID
        #[arg(long)]
        slot: String,

        /// Call type
        #[arg(long, short = 't', value_enum)]
        call_type: CallTypeArg,

        /// Session length in minutes
        #[arg(long, short = 'd')]
        duration: u32,
    },

    /// Start a session right now
    Instant {
        /// Consumer ID
        #[arg(long)]
        consumer: String,

        /// Provider ID
        #[arg(long)]
        provider: String,

        /// Call type
        #[arg(long, short = 't', value_enum)]
        call_type: CallTypeArg,

        /// Session length in minutes
        #[arg(long, short = 'd')]
        duration: u32,

        /// Pay with a package instead of the wallet
        #[arg(long)]
        package: Option<String>,
    },

    /// Take a seat in a group session
    Group {
        /// Consumer ID
        #[arg(long)]
        consumer: String,

        /// Group session ID
        #[arg(long)]
        session: String,
    },
}

// ── Wallet ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WalletArgs {
    #[command(subcommand)]
    pub command: WalletCommand,
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    /// Show a consumer's balance
    Balance {
        /// Consumer ID
        consumer: String,
    },

    /// Add coins to a consumer's balance
    TopUp {
        /// Consumer ID
        consumer: String,

        /// Amount in coins
        amount: u64,
    },

    /// Wallet transactions of a consumer or provider
    History {
        /// Consumer or provider ID
        participant: String,
    },
}

// ── Packages ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PackagesArgs {
    #[command(subcommand)]
    pub command: PackagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PackagesCommand {
    /// Create a package
    Create {
        #[arg(long)]
        consumer: String,

        #[arg(long)]
        provider: String,

        #[arg(long)]
        category: String,

        #[arg(long, short = 't', value_enum)]
        call_type: CallTypeArg,

        /// Number of sessions
        #[arg(long)]
        sessions: u32,

        /// Price for the whole package
        #[arg(long)]
        price: u64,
    },

    /// List packages (active ones for a consumer, all for a provider)
    #[command(alias = "ls")]
    List {
        #[arg(long, conflicts_with = "provider", required_unless_present = "provider")]
        consumer: Option<String>,

        #[arg(long)]
        provider: Option<String>,
    },

    /// Consume one session
    Use {
        /// Package ID
        package: String,
    },

    /// Update a package
    Update {
        /// Package ID
        package: String,

        #[arg(long)]
        total: Option<u32>,

        #[arg(long)]
        remaining: Option<u32>,

        #[arg(long)]
        price: Option<u64>,

        #[arg(long, short = 't', value_enum)]
        call_type: Option<CallTypeArg>,
    },

    /// Delete a package
    #[command(alias = "rm")]
    Delete {
        /// Package ID
        package: String,
    },
}

// ── Group sessions ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// Create a group session
    Create {
        #[arg(long)]
        provider: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, short = 't', value_enum)]
        call_type: CallTypeArg,

        /// Price per seat
        #[arg(long)]
        price: u64,

        #[arg(long)]
        capacity: u32,

        /// Start time (RFC 3339)
        #[arg(long)]
        at: String,

        #[arg(long)]
        join_link: Option<String>,
    },

    /// List group sessions of a provider
    #[command(alias = "ls")]
    List {
        #[arg(long)]
        provider: String,
    },

    /// Update a group session
    Update {
        /// Group session ID
        session: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        price: Option<u64>,

        #[arg(long)]
        capacity: Option<u32>,

        /// Start time (RFC 3339)
        #[arg(long)]
        at: Option<String>,

        #[arg(long)]
        join_link: Option<String>,

        #[arg(long, value_enum)]
        status: Option<GroupStatusArg>,
    },

    /// Delete a group session
    #[command(alias = "rm")]
    Delete {
        /// Group session ID
        session: String,
    },
}

// ── Prices ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PricesArgs {
    #[command(subcommand)]
    pub command: PricesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PricesCommand {
    /// Set a provider's per-minute price for a call type
    Set {
        #[arg(long)]
        provider: String,

        #[arg(long, short = 't', value_enum)]
        call_type: CallTypeArg,

        /// Coins per minute
        per_minute: u64,
    },

    /// List all prices
    #[command(alias = "ls")]
    List,
}

// ── Records ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RecordsArgs {
    #[command(subcommand)]
    pub command: RecordsCommand,
}

#[derive(Debug, Subcommand)]
pub enum RecordsCommand {
    /// List session records
    #[command(alias = "ls")]
    List {
        /// Only records of this consumer or provider
        #[arg(long)]
        participant: Option<String>,

        /// Window start (RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Window end (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config and state file paths
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store the room-service token in the system keyring
    SetToken {
        /// Token (prompted for when omitted)
        token: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
