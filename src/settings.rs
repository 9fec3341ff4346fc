//! Environment-driven settings. `.env` is read first when present.

use crate::gateway::DEFAULT_CONFLICT_MARKER;
use crate::orchestrator::DEFAULT_PAGE_SIZE;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8090/api";
pub const DEFAULT_BIND: &str = "127.0.0.1:8090";
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub api_url: String,
    pub page_size: u32,
    pub timeout: Duration,
    pub conflict_marker: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            conflict_marker: DEFAULT_CONFLICT_MARKER.to_string(),
        }
    }
}

impl ClientSettings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            api_url: get("BOOKMARKS_API_URL").unwrap_or(d.api_url),
            page_size: parse_or("BOOKMARKS_PAGE_SIZE", get("BOOKMARKS_PAGE_SIZE"), d.page_size)
                .max(1),
            timeout: Duration::from_millis(parse_or(
                "BOOKMARKS_TIMEOUT_MS",
                get("BOOKMARKS_TIMEOUT_MS"),
                DEFAULT_TIMEOUT_MS,
            )),
            conflict_marker: get("BOOKMARKS_CONFLICT_MARKER").unwrap_or(d.conflict_marker),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    pub body_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8090)),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerSettings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            bind: parse_or("BOOKMARKS_BIND", get("BOOKMARKS_BIND"), d.bind),
            body_limit: parse_or("BOOKMARKS_BODY_LIMIT", get("BOOKMARKS_BODY_LIMIT"), d.body_limit),
        }
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %s, "invalid setting; using default");
            default
        }),
    }
}
