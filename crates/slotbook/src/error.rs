//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use slotbook_config::ConfigError;
use slotbook_core::{CoreError, ProvisioningError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const UNAVAILABLE: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(slotbook::not_found),
        help("Run: slotbook {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Business rejections ──────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(slotbook::conflict))]
    Conflict { message: String },

    #[error("Insufficient balance for {consumer}: have {balance}, need {required}")]
    #[diagnostic(
        code(slotbook::insufficient_funds),
        help("Top up with: slotbook wallet top-up {consumer} <amount>")
    )]
    InsufficientFunds {
        consumer: String,
        balance: u64,
        required: u64,
    },

    #[error("{message}")]
    #[diagnostic(code(slotbook::rejected))]
    Rejected { message: String },

    // ── Room service ─────────────────────────────────────────────────

    #[error("No room service configured")]
    #[diagnostic(
        code(slotbook::rooms_not_configured),
        help(
            "Audio and video sessions need a [rooms] section in the config.\n\
             Run: slotbook config init, then edit the file. Chat sessions work without it."
        )
    )]
    RoomsNotConfigured,

    #[error("No room-service token configured")]
    #[diagnostic(
        code(slotbook::no_credentials),
        help(
            "Store one with: slotbook config set-token\n\
             Or set rooms.token_env in the config to an environment variable name."
        )
    )]
    NoCredentials,

    #[error("Room service rejected the request: {message}")]
    #[diagnostic(
        code(slotbook::rooms_rejected),
        help("Check the room-service token and the template ids under [rooms].")
    )]
    RoomsRejected { message: String },

    #[error("Room service unavailable: {message}")]
    #[diagnostic(code(slotbook::rooms_unavailable), help("Nothing was charged. Try again later."))]
    RoomsUnavailable { message: String },

    #[error("Room provisioning timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(slotbook::timeout),
        help("Nothing was charged. Raise workflow.provisioning_timeout_secs or try again.")
    )]
    Timeout { timeout_ms: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(slotbook::validation))]
    Validation { field: String, reason: String },

    // ── Configuration / state ────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(slotbook::config))]
    Config(Box<ConfigError>),

    #[error("State file {path} is unreadable: {reason}")]
    #[diagnostic(
        code(slotbook::state),
        help("Fix or move the file aside; a missing state file starts empty.")
    )]
    State { path: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(slotbook::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(slotbook::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(slotbook::json))]
    Json(#[from] serde_json::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(slotbook::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials | Self::RoomsRejected { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::InsufficientFunds { .. } | Self::Rejected { .. } => exit_code::REJECTED,
            Self::RoomsNotConfigured | Self::RoomsUnavailable { .. } => exit_code::UNAVAILABLE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials => Self::NoCredentials,
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

fn list_command_for(entity_type: &str) -> String {
    match entity_type {
        "slot" => "slots list --provider <id>".into(),
        "package" => "packages list --consumer <id>".into(),
        "group session" => "groups list --provider <id>".into(),
        "price" => "prices list".into(),
        other => format!("{other}s list"),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            err @ (CoreError::AlreadyBooked { .. } | CoreError::CapacityReached { .. }) => {
                CliError::Conflict {
                    message: err.to_string(),
                }
            }

            err @ (CoreError::InvalidState { .. } | CoreError::Exhausted { .. }) => {
                CliError::Rejected {
                    message: err.to_string(),
                }
            }

            CoreError::InsufficientFunds {
                consumer,
                balance,
                required,
            } => CliError::InsufficientFunds {
                consumer,
                balance,
                required,
            },

            CoreError::Provisioning(p) => match p {
                ProvisioningError::NotConfigured => CliError::RoomsNotConfigured,
                ProvisioningError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },
                ProvisioningError::Rejected { message } => CliError::RoomsRejected { message },
                ProvisioningError::Unavailable { message } => {
                    CliError::RoomsUnavailable { message }
                }
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            err @ (CoreError::Consistency { .. }
            | CoreError::ControllerStopped
            | CoreError::Internal(_)) => CliError::Internal {
                message: err.to_string(),
            },
        }
    }
}
