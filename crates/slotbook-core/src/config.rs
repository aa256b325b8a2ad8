// ── Runtime workflow configuration ──
//
// Tuning knobs for the booking workflow. Never touches disk: the CLI
// builds a `BookingConfig` from its config file and hands it in.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

const DEFAULT_CHAT_BASE_URL: &str = "https://alterbuddy.com/user/chat";

/// Configuration for a single booking controller.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Percentage of every booking total credited to the provider.
    /// The remainder is the platform share.
    pub provider_share_percent: u8,
    /// Upper bound on one room-provisioning call. Exceeding it counts as
    /// a provisioning failure.
    pub provisioning_timeout: Duration,
    /// Base of locally generated chat-room links:
    /// `{chat_base_url}/{provider}/{room_id}`.
    pub chat_base_url: String,
    /// Length of generated chat room ids.
    pub chat_room_id_len: usize,
}

impl BookingConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.provider_share_percent > 100 {
            return Err(CoreError::Config {
                message: format!(
                    "provider share must be between 0 and 100, got {}",
                    self.provider_share_percent
                ),
            });
        }
        if self.provisioning_timeout.is_zero() {
            return Err(CoreError::Config {
                message: "provisioning timeout must be greater than zero".into(),
            });
        }
        if let Err(e) = Url::parse(&self.chat_base_url) {
            return Err(CoreError::Config {
                message: format!("invalid chat base URL {:?}: {e}", self.chat_base_url),
            });
        }
        if self.chat_room_id_len == 0 {
            return Err(CoreError::Config {
                message: "chat room id length must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            provider_share_percent: 70,
            provisioning_timeout: Duration::from_secs(10),
            chat_base_url: DEFAULT_CHAT_BASE_URL.to_owned(),
            chat_room_id_len: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.provider_share_percent, 70);
        assert_eq!(cfg.provisioning_timeout, Duration::from_secs(10));
        assert_eq!(cfg.chat_room_id_len, 12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn malformed_chat_url_is_rejected() {
        let cfg = BookingConfig {
            chat_base_url: "not a url".into(),
            ..BookingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }

    #[test]
    fn share_above_hundred_is_rejected() {
        let cfg = BookingConfig {
            provider_share_percent: 120,
            ..BookingConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
    }
}
