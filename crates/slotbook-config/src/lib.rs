//! Configuration for the slotbook CLI.
//!
//! TOML file + `SLOTBOOK_*` environment overrides, room-service token
//! resolution (env → keyring → plaintext), and translation into
//! `slotbook_core::BookingConfig` and `slotbook_api::RoomClient`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slotbook_api::{RoomClient, RoomProfiles, RoomTemplate, TlsMode, TransportConfig};
use slotbook_core::BookingConfig;

const KEYRING_SERVICE: &str = "slotbook";
const KEYRING_TOKEN_USER: &str = "rooms/token";
const DEFAULT_ROOMS_BASE_URL: &str = "https://api.100ms.live/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no room-service token configured")]
    NoCredentials,

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("room client setup failed: {0}")]
    Client(#[from] slotbook_api::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Where the CLI keeps its JSON state between runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub workflow: WorkflowSection,

    /// Hosted room service. Without it only chat sessions can be booked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<RoomsSection>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// `[workflow]`: booking workflow tuning.
#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowSection {
    pub provider_share_percent: u8,
    pub provisioning_timeout_secs: u64,
    pub chat_base_url: String,
    pub chat_room_id_len: usize,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        let core = BookingConfig::default();
        Self {
            provider_share_percent: core.provider_share_percent,
            provisioning_timeout_secs: core.provisioning_timeout.as_secs(),
            chat_base_url: core.chat_base_url,
            chat_room_id_len: core.chat_room_id_len,
        }
    }
}

/// `[rooms]`: the hosted audio/video room service.
#[derive(Debug, Deserialize, Serialize)]
pub struct RoomsSection {
    #[serde(default = "default_rooms_base_url")]
    pub base_url: String,

    /// Management token (plaintext; keyring and env var are checked first).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// HTTP timeout in seconds.
    pub timeout: Option<u64>,

    pub audio: TemplateSection,
    pub video: TemplateSection,
}

fn default_rooms_base_url() -> String {
    DEFAULT_ROOMS_BASE_URL.into()
}

/// Room template and join-link subdomain for one call type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateSection {
    pub template_id: String,
    pub subdomain: String,
}

impl TemplateSection {
    fn to_template(&self, field: &str) -> Result<RoomTemplate, ConfigError> {
        if self.template_id.trim().is_empty() {
            return Err(invalid(field, "template_id must not be empty"));
        }
        if self.subdomain.trim().is_empty() {
            return Err(invalid(field, "subdomain must not be empty"));
        }
        Ok(RoomTemplate {
            template_id: self.template_id.clone(),
            subdomain: self.subdomain.clone(),
        })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "slotbook", "slotbook")
}

fn home_fallback(leaf: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("slotbook");
    p.push(leaf);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the CLI state file.
pub fn default_state_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback("state.json"),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from `path` + environment. A missing file is not an
/// error. Nested keys use a double underscore:
/// `SLOTBOOK_WORKFLOW__PROVIDER_SHARE_PERCENT=80`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SLOTBOOK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// The core workflow configuration, validated.
    pub fn booking_config(&self) -> Result<BookingConfig, ConfigError> {
        let w = &self.workflow;
        let config = BookingConfig {
            provider_share_percent: w.provider_share_percent,
            provisioning_timeout: Duration::from_secs(w.provisioning_timeout_secs),
            chat_base_url: w.chat_base_url.clone(),
            chat_room_id_len: w.chat_room_id_len,
        };
        config
            .validate()
            .map_err(|e| invalid("workflow", e.to_string()))?;
        Ok(config)
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }

    /// A room client when `[rooms]` is configured, `None` otherwise.
    pub fn room_client(&self) -> Result<Option<RoomClient>, ConfigError> {
        let Some(rooms) = &self.rooms else {
            return Ok(None);
        };

        url::Url::parse(&rooms.base_url)
            .map_err(|e| invalid("rooms.base_url", format!("{e}: {}", rooms.base_url)))?;
        let profiles = RoomProfiles {
            audio: rooms.audio.to_template("rooms.audio")?,
            video: rooms.video.to_template("rooms.video")?,
        };
        let transport = TransportConfig {
            tls: rooms
                .ca_cert
                .clone()
                .map_or(TlsMode::System, TlsMode::CustomCa),
            timeout: Duration::from_secs(rooms.timeout.unwrap_or(10)),
        };
        let token = resolve_room_token(rooms)?;

        Ok(Some(RoomClient::new(
            &rooms.base_url,
            &token,
            profiles,
            &transport,
        )?))
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the room-service token.
pub fn resolve_room_token(rooms: &RoomsSection) -> Result<SecretString, ConfigError> {
    // 1. token_env → env var lookup
    if let Some(ref env_name) = rooms.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_USER) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = rooms.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials)
}

/// Store the room-service token in the system keyring.
pub fn store_room_token(token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_TOKEN_USER)?;
    entry.set_password(token)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|jail| {
            let cfg = load_config_from(&jail.directory().join("absent.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.defaults.output, "table");
            assert_eq!(cfg.workflow.provider_share_percent, 70);
            assert_eq!(cfg.workflow.provisioning_timeout_secs, 10);
            assert!(cfg.rooms.is_none());
            Ok(())
        });
    }

    #[test]
    fn file_and_env_are_merged() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                state_file = "/tmp/slotbook-state.json"

                [workflow]
                provider_share_percent = 60
                chat_base_url = "https://chat.example.com/rooms"

                [rooms]
                token = "plain"
                audio = { template_id = "tpl-a", subdomain = "talk" }
                video = { template_id = "tpl-v", subdomain = "meet" }
                "#,
            )?;
            jail.set_env("SLOTBOOK_WORKFLOW__PROVISIONING_TIMEOUT_SECS", "3");

            let cfg = load_config_from(&jail.directory().join("config.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.workflow.provider_share_percent, 60);
            assert_eq!(cfg.workflow.provisioning_timeout_secs, 3);
            assert_eq!(cfg.state_path(), PathBuf::from("/tmp/slotbook-state.json"));

            let rooms = cfg
                .rooms
                .as_ref()
                .ok_or_else(|| "rooms section missing".to_string())?;
            assert_eq!(rooms.base_url, DEFAULT_ROOMS_BASE_URL);
            assert_eq!(rooms.video.subdomain, "meet");

            let booking = cfg.booking_config().map_err(|e| e.to_string())?;
            assert_eq!(booking.provisioning_timeout, Duration::from_secs(3));
            assert_eq!(booking.chat_base_url, "https://chat.example.com/rooms");
            Ok(())
        });
    }

    #[test]
    fn out_of_range_share_is_rejected() {
        let cfg = Config {
            workflow: WorkflowSection {
                provider_share_percent: 101,
                ..WorkflowSection::default()
            },
            ..Config::default()
        };
        assert!(matches!(
            cfg.booking_config(),
            Err(ConfigError::Validation { field, .. }) if field == "workflow"
        ));
    }

    #[test]
    fn token_env_takes_precedence() {
        Jail::expect_with(|jail| {
            jail.set_env("SLOTBOOK_TEST_ROOM_TOKEN", "from-env");
            let rooms = RoomsSection {
                base_url: DEFAULT_ROOMS_BASE_URL.into(),
                token: Some("plain".into()),
                token_env: Some("SLOTBOOK_TEST_ROOM_TOKEN".into()),
                ca_cert: None,
                timeout: None,
                audio: TemplateSection {
                    template_id: "a".into(),
                    subdomain: "talk".into(),
                },
                video: TemplateSection {
                    template_id: "v".into(),
                    subdomain: "meet".into(),
                },
            };
            let token = resolve_room_token(&rooms).map_err(|e| e.to_string())?;
            assert_eq!(secrecy::ExposeSecret::expose_secret(&token), "from-env");
            Ok(())
        });
    }

    #[test]
    fn empty_template_is_rejected() {
        let template = TemplateSection {
            template_id: " ".into(),
            subdomain: "meet".into(),
        };
        assert!(matches!(
            template.to_template("rooms.video"),
            Err(ConfigError::Validation { field, .. }) if field == "rooms.video"
        ));
    }

    #[test]
    fn config_without_rooms_has_no_client() {
        let cfg = Config::default();
        assert!(matches!(cfg.room_client(), Ok(None)));
    }

    #[test]
    fn saved_config_round_trips() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let mut cfg = Config::default();
            cfg.workflow.chat_room_id_len = 16;
            save_config(&cfg, &path).map_err(|e| e.to_string())?;

            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded.workflow.chat_room_id_len, 16);
            Ok(())
        });
    }
}
