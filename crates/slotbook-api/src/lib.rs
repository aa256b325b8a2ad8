// slotbook-api: Async client for the hosted video-room service.
//
// Creates rooms from audio/video templates and mints per-role join codes.
// `slotbook-core` wraps `RoomClient` behind its `RoomProvisioner` trait.

pub mod error;
pub mod rooms;
pub mod transport;

pub use error::Error;
pub use rooms::{ProvisionedRoom, RoomClient, RoomKind, RoomProfiles, RoomRole, RoomTemplate};
pub use transport::{TlsMode, TransportConfig};
