// Wire types and client-side profiles for the hosted room service.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Room kind / role ─────────────────────────────────────────────────

/// Media kind of a hosted room. Chat sessions never reach the room service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Audio,
    Video,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

/// Participant role a join code is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    Host,
    Guest,
}

impl RoomRole {
    /// Path segment used by the room-codes endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Guest => "guest",
        }
    }
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Profiles ─────────────────────────────────────────────────────────

/// Template and meeting subdomain for one room kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub template_id: String,
    pub subdomain: String,
}

/// Audio and video rooms are created from separate templates and are
/// joined through separate meeting subdomains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomProfiles {
    pub audio: RoomTemplate,
    pub video: RoomTemplate,
}

impl RoomProfiles {
    pub fn for_kind(&self, kind: RoomKind) -> &RoomTemplate {
        match kind {
            RoomKind::Audio => &self.audio,
            RoomKind::Video => &self.video,
        }
    }
}

// ── Request / response bodies ────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CreateRoomRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub template_id: &'a str,
}

/// `POST /v2/rooms` response. Only the id is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `POST /v2/room-codes/room/{id}/role/{role}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomCodeResponse {
    pub code: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// A fully provisioned room: id plus a join URL per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionedRoom {
    pub room_id: String,
    pub name: String,
    pub host_code: String,
    pub guest_code: String,
    pub host_url: String,
    pub guest_url: String,
}
