// Hosted room service: room creation and per-role join codes.
//
// Base path: /v2/
// Auth: Bearer management token

pub mod client;
pub mod types;

pub use client::RoomClient;
pub use types::{ProvisionedRoom, RoomKind, RoomProfiles, RoomRole, RoomTemplate};
