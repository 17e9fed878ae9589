use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

/// Room provisioning options sent to the video provider. Defaults match the
/// consultation setup: two participants, chat and screenshare on, cloud
/// recording on, audio/video unmuted, 2-hour expiry unless overridden.
#[derive(Debug, Clone, Serialize)]
pub struct RoomConfig {
    pub max_participants: u32,
    pub enable_chat: bool,
    pub enable_screenshare: bool,
    pub enable_recording: bool,
    pub start_audio_off: bool,
    pub start_video_off: bool,
    pub default_expiry_secs: i64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_participants: 2,
            enable_chat: true,
            enable_screenshare: true,
            enable_recording: true,
            start_audio_off: false,
            start_video_off: false,
            default_expiry_secs: 2 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionedRoom {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct MeetingTokenResponse {
    token: String,
}

/// Minimal video-room provider client built on reqwest (Daily-style REST API).
pub struct VideoRoomClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl VideoRoomClient {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        error!(%status, body = %body, "video: {} failed", context);
        Err(anyhow!("video provider {} failed with status {}", context, status))
    }

    pub async fn create_room(
        &self,
        name: &str,
        expires_at: DateTime<Utc>,
        config: &RoomConfig,
    ) -> Result<ProvisionedRoom> {
        let body = json!({
            "name": name,
            "privacy": "private",
            "properties": {
                "max_participants": config.max_participants,
                "enable_chat": config.enable_chat,
                "enable_screenshare": config.enable_screenshare,
                "enable_recording": if config.enable_recording { "cloud" } else { "off" },
                "start_audio_off": config.start_audio_off,
                "start_video_off": config.start_video_off,
                "exp": expires_at.timestamp(),
            },
        });

        let resp = self
            .http
            .post(format!("{}/rooms", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let resp = Self::ensure_success(resp, "create_room").await?;
        let room = resp.json::<ProvisionedRoom>().await?;
        Ok(room)
    }

    pub async fn delete_room(&self, name: &str) -> Result<()> {
        let resp = self
            .http
            .delete(format!("{}/rooms/{}", self.api_base, name))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        Self::ensure_success(resp, "delete_room").await?;
        Ok(())
    }

    pub async fn issue_token(
        &self,
        room_name: &str,
        display_name: &str,
        elevated: bool,
    ) -> Result<String> {
        let body = json!({
            "properties": {
                "room_name": room_name,
                "user_name": display_name,
                "is_owner": elevated,
                "enable_recording": if elevated { "cloud" } else { "off" },
            },
        });

        let resp = self
            .http
            .post(format!("{}/meeting-tokens", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let resp = Self::ensure_success(resp, "issue_token").await?;
        let token = resp.json::<MeetingTokenResponse>().await?;
        Ok(token.token)
    }
}
