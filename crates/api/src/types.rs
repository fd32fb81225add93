//! Wire types for the CPSS backend API.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

// ── Platforms ────────────────────────────────────────────────────────────────

/// Publishing targets known to the backend. Bot credentials exist only for
/// `telegram` and `discord`; presets may target any platform.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Telegram,
    Discord,
    Youtube,
    Rutube,
    Twitch,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Telegram => "telegram",
            Self::Discord => "discord",
            Self::Youtube => "youtube",
            Self::Rutube => "rutube",
            Self::Twitch => "twitch",
        };
        f.write_str(name)
    }
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ── Bots ─────────────────────────────────────────────────────────────────────

/// Health as reported by `/bots/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotHealth {
    Online,
    Offline,
    Error,
    /// Catch-all for statuses this client does not know about.
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for BotHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Error => "error",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotStatus {
    pub platform: Platform,
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::option")]
    pub last_health_check: Option<DateTime<Utc>>,
    pub status: BotHealth,
}

/// Wholesale replacement of one platform's bot credentials; there is no
/// partial patch.
#[derive(Debug, Serialize)]
pub struct BotConfigRequest {
    pub platform: Platform,
    pub token: String,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfigResponse {
    pub id: i64,
    pub platform: Platform,
    pub is_active: bool,
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default, deserialize_with = "timestamp::option")]
    pub last_health_check: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResult {
    pub platform: Platform,
    pub is_active: bool,
}

// ── Presets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PresetRequest {
    pub name: String,
    pub platform: Platform,
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub id: i64,
    pub name: String,
    pub platform: Platform,
    #[serde(default)]
    pub config: Map<String, Value>,
    pub is_active: bool,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
}

// ── Publishing ───────────────────────────────────────────────────────────────

/// Server-assigned handle for an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    pub id: i64,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PublishRequest {
    pub preset_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Queued,
    Publishing,
    Published,
    Failed,
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Queued => "queued",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Publication {
    pub id: i64,
    pub preset_id: i64,
    #[serde(default)]
    pub media_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::option")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: PublicationStatus,
    #[serde(default)]
    pub result: Value,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
}

// ── Timestamps ───────────────────────────────────────────────────────────────

/// The backend mixes RFC 3339 timestamps with naive UTC ones (Python
/// `datetime.utcnow()` serializes without an offset), so both are accepted.
pub(crate) mod timestamp {
    use {
        chrono::{DateTime, NaiveDateTime, Utc},
        serde::{Deserialize, Deserializer, de::Error},
    };

    fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}")))
    }

    pub fn option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unrecognized timestamp: {raw}"))),
        }
    }
}
