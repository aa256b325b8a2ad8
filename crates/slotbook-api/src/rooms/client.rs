// Async HTTP client for the hosted room service.
//
// Base path: /v2/
// Auth: Authorization: Bearer <management token>

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{
    CreateRoomRequest, ProvisionedRoom, RoomCodeResponse, RoomKind, RoomProfiles, RoomResponse,
    RoomRole,
};
use crate::Error;

const ROOM_DESCRIPTION: &str = "Mentorship Session";

// ── Error response shape from the room service ───────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the hosted room service.
///
/// Creates a room from the template configured for its kind, then mints a
/// host code and a guest code. Join URLs are built from the kind's meeting
/// subdomain.
#[derive(Clone)]
pub struct RoomClient {
    http: reqwest::Client,
    base_url: Url,
    profiles: RoomProfiles,
}

impl RoomClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a management token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a default header.
    pub fn new(
        base_url: &str,
        token: &SecretString,
        profiles: RoomProfiles,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Self::with_client(http, base_url, profiles)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        profiles: RoomProfiles,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            profiles,
        })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn profiles(&self) -> &RoomProfiles {
        &self.profiles
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Public meeting URL for a join code.
    pub fn join_url(&self, kind: RoomKind, code: &str) -> String {
        let subdomain = &self.profiles.for_kind(kind).subdomain;
        format!("https://{subdomain}.app.100ms.live/meeting/{code}")
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        self.handle_response(resp).await
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Create a room from the template configured for `kind`.
    pub async fn create_room(&self, kind: RoomKind, name: &str) -> Result<RoomResponse, Error> {
        let template = self.profiles.for_kind(kind);
        let body = CreateRoomRequest {
            name,
            description: ROOM_DESCRIPTION,
            template_id: &template.template_id,
        };
        self.post("v2/rooms", &body).await
    }

    /// Mint a join code for one role in an existing room.
    pub async fn create_room_code(
        &self,
        room_id: &str,
        role: RoomRole,
    ) -> Result<RoomCodeResponse, Error> {
        self.post_empty(&format!("v2/room-codes/room/{room_id}/role/{role}"))
            .await
    }

    /// Create a room and both join codes, returning the join URLs.
    pub async fn provision(&self, kind: RoomKind, name: &str) -> Result<ProvisionedRoom, Error> {
        let room = self.create_room(kind, name).await?;
        let (host, guest) = tokio::try_join!(
            self.create_room_code(&room.id, RoomRole::Host),
            self.create_room_code(&room.id, RoomRole::Guest),
        )?;

        debug!(room_id = %room.id, %kind, "room provisioned");
        Ok(ProvisionedRoom {
            host_url: self.join_url(kind, &host.code),
            guest_url: self.join_url(kind, &guest.code),
            name: room.name.unwrap_or_else(|| name.to_owned()),
            room_id: room.id,
            host_code: host.code,
            guest_code: guest.code,
        })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Error::Authentication {
                message: format!("room service rejected the management token ({status})"),
            };
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Error::RateLimited { retry_after_secs };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err.message.unwrap_or_else(|| status.to_string()),
                code: err.code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }
}

impl std::fmt::Debug for RoomClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomClient")
            .field("base_url", &self.base_url.as_str())
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::types::RoomTemplate;

    fn profiles() -> RoomProfiles {
        RoomProfiles {
            audio: RoomTemplate {
                template_id: "tpl-audio".into(),
                subdomain: "talk".into(),
            },
            video: RoomTemplate {
                template_id: "tpl-video".into(),
                subdomain: "meet".into(),
            },
        }
    }

    #[test]
    fn join_url_uses_kind_subdomain() {
        let client =
            RoomClient::with_client(reqwest::Client::new(), "https://rooms.test", profiles())
                .expect("client");
        assert_eq!(
            client.join_url(RoomKind::Video, "abc-def"),
            "https://meet.app.100ms.live/meeting/abc-def"
        );
        assert_eq!(
            client.join_url(RoomKind::Audio, "xyz"),
            "https://talk.app.100ms.live/meeting/xyz"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            RoomClient::with_client(reqwest::Client::new(), "https://rooms.test/api", profiles())
                .expect("client");
        let url = client.url("v2/rooms").expect("url");
        assert_eq!(url.as_str(), "https://rooms.test/api/v2/rooms");
    }
}
