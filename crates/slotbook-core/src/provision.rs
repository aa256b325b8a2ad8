// ── Room provisioning capability ──
//
// The workflow asks a `RoomProvisioner` for audio/video rooms and always
// wraps the call in a timeout. Chat rooms never leave the process: they
// are a random id under the configured chat base URL.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use slotbook_api::{RoomClient, RoomKind};
use thiserror::Error;

use crate::config::BookingConfig;
use crate::model::{EntityId, RoomHandle};

/// Typed failure of a provisioning attempt.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Room provisioning is not configured")]
    NotConfigured,

    #[error("Room provisioning timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Room service rejected the request: {message}")]
    Rejected { message: String },

    #[error("Room service unavailable: {message}")]
    Unavailable { message: String },
}

impl ProvisioningError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
    }
}

impl From<slotbook_api::Error> for ProvisioningError {
    fn from(err: slotbook_api::Error) -> Self {
        match err {
            slotbook_api::Error::Timeout { timeout_secs } => Self::Timeout {
                timeout_ms: timeout_secs.saturating_mul(1000),
            },
            slotbook_api::Error::Api { status, .. } if status >= 500 => Self::Unavailable {
                message: err.to_string(),
            },
            slotbook_api::Error::Authentication { .. } | slotbook_api::Error::Api { .. } => {
                Self::Rejected {
                    message: err.to_string(),
                }
            }
            other => Self::Unavailable {
                message: other.to_string(),
            },
        }
    }
}

/// Creates hosted session rooms.
#[async_trait]
pub trait RoomProvisioner: Send + Sync {
    async fn create_room(&self, kind: RoomKind) -> Result<RoomHandle, ProvisioningError>;
}

/// Stand-in used when no room service is configured: every call fails,
/// so audio/video bookings are compensated and only chat works.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl RoomProvisioner for Unconfigured {
    async fn create_room(&self, _kind: RoomKind) -> Result<RoomHandle, ProvisioningError> {
        Err(ProvisioningError::NotConfigured)
    }
}

#[async_trait]
impl RoomProvisioner for RoomClient {
    async fn create_room(&self, kind: RoomKind) -> Result<RoomHandle, ProvisioningError> {
        let name = format!("slot-booking-{}", Utc::now().timestamp_millis());
        let room = self.provision(kind, &name).await?;
        Ok(RoomHandle {
            room_id: room.room_id,
            name: room.name,
            host_url: room.host_url,
            guest_url: room.guest_url,
        })
    }
}

/// A locally generated chat room. Both participants share one link.
pub(crate) fn chat_room(config: &BookingConfig, provider: &EntityId) -> RoomHandle {
    let room_id: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(config.chat_room_id_len)
        .map(char::from)
        .collect();
    let base = config.chat_base_url.trim_end_matches('/');
    let url = format!("{base}/{provider}/{room_id}");
    RoomHandle {
        name: format!("chat-{room_id}"),
        room_id,
        host_url: url.clone(),
        guest_url: url,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn chat_room_has_configured_id_length_and_shared_link() {
        let config = BookingConfig::default();
        let room = chat_room(&config, &EntityId::from("mentor-9"));

        assert_eq!(room.room_id.len(), 12);
        assert!(room.room_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(room.host_url, room.guest_url);
        assert_eq!(
            room.host_url,
            format!("https://alterbuddy.com/user/chat/mentor-9/{}", room.room_id)
        );
    }

    #[test]
    fn api_errors_split_into_rejected_and_unavailable() {
        let rejected = ProvisioningError::from(slotbook_api::Error::Api {
            message: "bad template".into(),
            code: None,
            status: 422,
        });
        assert!(matches!(rejected, ProvisioningError::Rejected { .. }));
        assert!(!rejected.is_transient());

        let down = ProvisioningError::from(slotbook_api::Error::Api {
            message: "maintenance".into(),
            code: None,
            status: 503,
        });
        assert!(down.is_transient());
    }

    #[tokio::test]
    async fn unconfigured_always_fails() {
        let err = Unconfigured.create_room(RoomKind::Video).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::NotConfigured));
    }
}
