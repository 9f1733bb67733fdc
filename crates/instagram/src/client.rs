//! The `ContentSource` trait and its private-web-API implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use sha1::{Digest, Sha1};
use tokio::sync::RwLock;

use crate::error::SourceError;
use crate::session::SessionBlob;
use crate::types::{FeedItem, StoryItem};

/// Base URL of the private web API.
const API_BASE: &str = "https://i.instagram.com/api/v1";

/// App user agent presented on every request.
const APP_USER_AGENT: &str =
    "Instagram 121.0.0.29.119 Android (26/8.0.0; 480dpi; 1080x1920; samsung; SM-G950F; \
     dreamlte; samsungexynos8895; en_US; 185203708)";

/// Request timeout applied to every API call so a stalled fetch cannot
/// block the poll scheduler.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the daemon needs from the content source.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Authenticate with credentials, establishing a fresh session.
    async fn login(&self, username: &str, password: &str) -> Result<(), SourceError>;

    /// Adopt a previously exported session.
    async fn restore_session(&self, blob: &SessionBlob) -> Result<(), SourceError>;

    /// Snapshot the live session for persistence. The snapshot includes
    /// the derived transient key; stripping it is the store's job.
    async fn export_session(&self) -> Result<SessionBlob, SourceError>;

    /// Resolve an account handle to its stable numeric id.
    async fn resolve_user_id(&self, handle: &str) -> Result<String, SourceError>;

    /// Fetch the current feed items of one account.
    async fn user_feed(&self, user_id: &str) -> Result<Vec<FeedItem>, SourceError>;

    /// Fetch the currently available stories of many accounts in one
    /// batched call.
    async fn stories(&self, user_ids: &[String]) -> Result<Vec<StoryItem>, SourceError>;
}

/// Mutable session material behind the client.
#[derive(Debug, Default, Clone)]
struct SessionState {
    username: String,
    device_id: String,
    cookies: BTreeMap<String, String>,
}

impl SessionState {
    /// Cookie header value for the current session.
    fn cookie_string(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Production [`ContentSource`] over the private web API.
pub struct HttpSource {
    client: reqwest::Client,
    state: RwLock<SessionState>,
}

impl HttpSource {
    /// Create a client with a device identity derived from the login
    /// username, so restarts present a stable device.
    pub fn new(username: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            state: RwLock::new(SessionState {
                username: username.to_string(),
                device_id: derive_device_id(username),
                cookies: BTreeMap::new(),
            }),
        })
    }

    /// Execute a prepared request with session headers, absorb rolling
    /// cookie updates, and classify the response.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<String, SourceError> {
        let headers = {
            let state = self.state.read().await;
            let mut headers = HeaderMap::new();
            headers.insert(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT));
            if !state.cookies.is_empty() {
                if let Ok(value) = HeaderValue::from_str(&state.cookie_string()) {
                    headers.insert(COOKIE, value);
                }
            }
            headers
        };

        let response = req.headers(headers).send().await?;
        let status = response.status();

        let updates = parse_set_cookies(response.headers());
        if !updates.is_empty() {
            let mut state = self.state.write().await;
            state.cookies.extend(updates);
        }

        let body = response.text().await?;

        if status == StatusCode::FORBIDDEN
            || status == StatusCode::UNAUTHORIZED
            || body.contains("\"login_required\"")
        {
            return Err(SourceError::LoginRequired(format!(
                "API answered {status}"
            )));
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!("{status}: {body}")));
        }

        Ok(body)
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn login(&self, username: &str, password: &str) -> Result<(), SourceError> {
        let device_id = self.state.read().await.device_id.clone();

        tracing::debug!(username, "Logging in");

        let body = self
            .execute(self.client.post(format!("{API_BASE}/accounts/login/")).form(&[
                ("username", username),
                ("password", password),
                ("device_id", device_id.as_str()),
                ("login_attempt_count", "0"),
            ]))
            .await
            .map_err(|e| match e {
                // A rejected credential login is a plain API failure,
                // not a session invalidation.
                SourceError::LoginRequired(msg) => SourceError::Api(msg),
                other => other,
            })?;

        let parsed: Value = serde_json::from_str(&body)?;
        if parsed.get("logged_in_user").is_none() {
            return Err(SourceError::Api(format!(
                "login rejected: {}",
                parsed
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown reason")
            )));
        }

        let mut state = self.state.write().await;
        state.username = username.to_string();
        tracing::info!(username, "Login succeeded");
        Ok(())
    }

    async fn restore_session(&self, blob: &SessionBlob) -> Result<(), SourceError> {
        let mut restored = SessionState::default();

        if let Some(username) = blob.get("username").and_then(Value::as_str) {
            restored.username = username.to_string();
        }
        restored.device_id = blob
            .get("device_id")
            .and_then(Value::as_str)
            .map_or_else(|| derive_device_id(&restored.username), String::from);

        let cookies = blob
            .get("cookies")
            .and_then(Value::as_object)
            .ok_or_else(|| SourceError::Api("session blob has no cookies".to_string()))?;
        for (name, value) in cookies {
            if let Some(value) = value.as_str() {
                restored.cookies.insert(name.clone(), value.to_string());
            }
        }

        if !restored.cookies.contains_key("sessionid") {
            return Err(SourceError::Api(
                "session blob has no sessionid cookie".to_string(),
            ));
        }

        *self.state.write().await = restored;
        Ok(())
    }

    async fn export_session(&self) -> Result<SessionBlob, SourceError> {
        let state = self.state.read().await;

        let mut blob = SessionBlob::default();
        blob.0
            .insert("username".into(), Value::String(state.username.clone()));
        blob.0
            .insert("device_id".into(), Value::String(state.device_id.clone()));
        blob.0.insert(
            "cookies".into(),
            Value::Object(
                state
                    .cookies
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
        );
        // Derived on every export, stripped before persistence.
        blob.0.insert(
            SessionBlob::TRANSIENT_KEY.into(),
            json!({
                "api_base": API_BASE,
                "user_agent": APP_USER_AGENT,
            }),
        );

        Ok(blob)
    }

    async fn resolve_user_id(&self, handle: &str) -> Result<String, SourceError> {
        let body = self
            .execute(
                self.client
                    .get(format!("{API_BASE}/users/{handle}/usernameinfo/")),
            )
            .await?;

        let parsed: Value = serde_json::from_str(&body)?;
        parsed
            .get("user")
            .and_then(|user| user.get("pk"))
            .and_then(id_string)
            .ok_or_else(|| SourceError::UnknownAccount(handle.to_string()))
    }

    async fn user_feed(&self, user_id: &str) -> Result<Vec<FeedItem>, SourceError> {
        let body = self
            .execute(self.client.get(format!("{API_BASE}/feed/user/{user_id}/")))
            .await?;

        let parsed: FeedResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .items
            .into_iter()
            .filter_map(|raw| raw.into_item(user_id))
            .collect())
    }

    async fn stories(&self, user_ids: &[String]) -> Result<Vec<StoryItem>, SourceError> {
        let body = self
            .execute(
                self.client
                    .post(format!("{API_BASE}/feed/reels_media/"))
                    .json(&json!({ "user_ids": user_ids })),
            )
            .await?;

        let parsed: ReelsResponse = serde_json::from_str(&body)?;
        Ok(parsed
            .reels
            .into_values()
            .flat_map(|reel| reel.items)
            .filter_map(RawStoryItem::into_item)
            .collect())
    }
}

/// Stable device id from the login username, mirroring the device the
/// account first authenticated with.
fn derive_device_id(username: &str) -> String {
    let digest = Sha1::digest(username.as_bytes());
    format!("android-{}", &hex::encode(digest)[..16])
}

/// Extract name=value pairs from Set-Cookie response headers.
fn parse_set_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for header in headers.get_all(SET_COOKIE) {
        let Ok(raw) = header.to_str() else { continue };
        let Some(pair) = raw.split(';').next() else {
            continue;
        };
        if let Some((name, value)) = pair.split_once('=') {
            cookies.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    cookies
}

/// Render a JSON id that may be a number or a string.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    items: Vec<RawFeedItem>,
}

#[derive(Debug, Deserialize)]
struct RawFeedItem {
    id: Option<String>,
    code: Option<String>,
    caption: Option<RawCaption>,
    user: Option<RawUser>,
}

impl RawFeedItem {
    /// Validate into a domain item; malformed entries are dropped here.
    fn into_item(self, fallback_author: &str) -> Option<FeedItem> {
        let (Some(id), Some(code)) = (self.id, self.code) else {
            tracing::debug!("Skipping feed item without id/code");
            return None;
        };
        let author_id = self
            .user
            .and_then(|u| u.pk)
            .and_then(|pk| id_string(&pk))
            .unwrap_or_else(|| fallback_author.to_string());

        Some(FeedItem {
            id,
            author_id,
            caption: self.caption.and_then(|c| c.text),
            code,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawCaption {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    pk: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReelsResponse {
    #[serde(default)]
    reels: BTreeMap<String, RawReel>,
}

#[derive(Debug, Deserialize)]
struct RawReel {
    #[serde(default)]
    items: Vec<RawStoryItem>,
}

#[derive(Debug, Deserialize)]
struct RawStoryItem {
    id: Option<String>,
    user: Option<RawUser>,
    #[serde(default)]
    story_link_stickers: Vec<RawLinkSticker>,
    #[serde(default)]
    story_cta: Vec<RawCta>,
}

impl RawStoryItem {
    fn into_item(self) -> Option<StoryItem> {
        let Some(id) = self.id else {
            tracing::debug!("Skipping story item without id");
            return None;
        };
        let author_id = self.user.and_then(|u| u.pk).and_then(|pk| id_string(&pk))?;

        Some(StoryItem {
            id,
            author_id,
            link_sticker_url: self
                .story_link_stickers
                .into_iter()
                .find_map(|s| s.story_link.and_then(|l| l.url)),
            cta_url: self.story_cta.into_iter().find_map(|c| c.web_uri),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawLinkSticker {
    story_link: Option<RawStoryLink>,
}

#[derive(Debug, Deserialize)]
struct RawStoryLink {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCta {
    web_uri: Option<String>,
}
