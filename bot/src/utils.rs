use crate::error::BotError;
use time::{Duration, OffsetDateTime};

pub fn to_unix(at: OffsetDateTime) -> i64 {
    at.unix_timestamp()
}

pub fn from_unix(seconds: i64) -> Result<OffsetDateTime, BotError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(BotError::from)
}

pub fn window_start(now: OffsetDateTime, window: Duration) -> OffsetDateTime {
    now - window
}

/// Display name for a voter: full name, then username, then a placeholder.
pub fn display_name(first_name: &str, last_name: Option<&str>, username: Option<&str>) -> String {
    let full_name = match last_name.map(str::trim).filter(|l| !l.is_empty()) {
        Some(last) => format!("{} {}", first_name.trim(), last),
        None => first_name.trim().to_string(),
    };
    let full_name = full_name.trim();

    if !full_name.is_empty() {
        full_name.to_string()
    } else if let Some(username) = username.filter(|u| !u.trim().is_empty()) {
        username.to_string()
    } else {
        "Unknown".to_string()
    }
}
