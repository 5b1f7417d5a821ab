use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;
const DEFAULT_SLOT_STEP_MINUTES: u32 = 30;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 3000;

/// Where barbers, services and appointments are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Supabase,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(StorageBackend::Memory),
            "supabase" | "postgrest" => Ok(StorageBackend::Supabase),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Supabase => write!(f, "supabase"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub storage_backend: StorageBackend,
    /// Offset of the shop's local time from UTC. All dates and `HH:MM`
    /// slots are expressed in this zone.
    pub business_utc_offset_minutes: i32,
    pub slot_step_minutes: u32,
    pub booking_lock_timeout_ms: u64,
    pub http_timeout_secs: u64,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: String::new(),
            storage_backend: StorageBackend::Memory,
            business_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            booking_lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Missing or
    /// unparsable values fall back to defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string_or_empty = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                warn!("{} not set, using empty value", key);
                String::new()
            })
        };

        let mut config = Self {
            supabase_url: string_or_empty("SUPABASE_URL"),
            supabase_anon_key: string_or_empty("SUPABASE_ANON_PUBLIC_KEY"),
            supabase_jwt_secret: string_or_empty("SUPABASE_JWT_SECRET"),
            storage_backend: parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Memory),
            business_utc_offset_minutes: parse_or(
                &lookup,
                "BUSINESS_UTC_OFFSET_MINUTES",
                DEFAULT_UTC_OFFSET_MINUTES,
            ),
            slot_step_minutes: parse_or(&lookup, "SLOT_STEP_MINUTES", DEFAULT_SLOT_STEP_MINUTES),
            booking_lock_timeout_ms: parse_or(
                &lookup,
                "BOOKING_LOCK_TIMEOUT_MS",
                DEFAULT_LOCK_TIMEOUT_MS,
            ),
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
        };

        if config.slot_step_minutes == 0 {
            warn!("SLOT_STEP_MINUTES must be positive, using default");
            config.slot_step_minutes = DEFAULT_SLOT_STEP_MINUTES;
        }
        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase storage selected but not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn is_auth_configured(&self) -> bool {
        !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
