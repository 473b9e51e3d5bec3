use std::collections::HashSet;
use time::Weekday;
use crate::scoring::PointTable;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_QUESTION_LENGTH: usize = 300;
pub const MIN_UTC_OFFSET_HOURS: i8 = -12;
pub const MAX_UTC_OFFSET_HOURS: i8 = 14;
pub const MAX_SECRET_LENGTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Poll question is empty")]
    EmptyQuestion,
    #[error("Poll question exceeds maximum length of {MAX_QUESTION_LENGTH}")]
    QuestionTooLong,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Empty option text")]
    EmptyOption,
    #[error("Option text exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
    #[error("Point table has {points} entries but {options} options are configured")]
    PointTableMismatch { points: usize, options: usize },
    #[error("Point table must not award more points to a later position")]
    PointTableNotDescending,
    #[error("Invalid hour: {0} (must be 0-23)")]
    InvalidHour(u8),
    #[error("Invalid minute: {0} (must be 0-59)")]
    InvalidMinute(u8),
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),
    #[error("Invalid UTC offset: {0} (must be {MIN_UTC_OFFSET_HOURS} to {MAX_UTC_OFFSET_HOURS})")]
    InvalidUtcOffset(i8),
    #[error("No channels configured")]
    NoChannels,
    #[error("A webhook secret is required")]
    MissingWebhookSecret,
    #[error("Webhook secret must be 1-{MAX_SECRET_LENGTH} characters of A-Z, a-z, 0-9, _ or -")]
    InvalidWebhookSecret,
}

pub fn validate_poll(question: &str, options: &[String], points: &PointTable) -> Result<(), ValidationError> {
    if question.trim().is_empty() { return Err(ValidationError::EmptyQuestion); }
    if question.chars().count() > MAX_QUESTION_LENGTH { return Err(ValidationError::QuestionTooLong); }
    if options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }
    if options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }

    if options.iter().any(|opt| opt.trim().is_empty()) { return Err(ValidationError::EmptyOption); }
    if options.iter().any(|opt| opt.chars().count() > MAX_OPTION_LENGTH) { return Err(ValidationError::OptionTooLong); }

    let mut seen = HashSet::with_capacity(options.len());
    if let Some(duplicate) = options.iter().find(|opt| !seen.insert(opt.to_lowercase())) {
        return Err(ValidationError::DuplicateOption(duplicate.clone()));
    }

    if points.len() != options.len() {
        return Err(ValidationError::PointTableMismatch { points: points.len(), options: options.len() });
    }
    if !points.is_non_increasing() { return Err(ValidationError::PointTableNotDescending); }

    Ok(())
}

pub fn validate_time_of_day(hour: u8, minute: u8) -> Result<(), ValidationError> {
    if hour > 23 { return Err(ValidationError::InvalidHour(hour)); }
    if minute > 59 { return Err(ValidationError::InvalidMinute(minute)); }
    Ok(())
}

pub fn validate_utc_offset(hours: i8) -> Result<(), ValidationError> {
    if !(MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&hours) {
        return Err(ValidationError::InvalidUtcOffset(hours));
    }
    Ok(())
}

pub fn parse_weekday(value: &str) -> Result<Weekday, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Monday),
        "tuesday" | "tue" => Ok(Weekday::Tuesday),
        "wednesday" | "wed" => Ok(Weekday::Wednesday),
        "thursday" | "thu" => Ok(Weekday::Thursday),
        "friday" | "fri" => Ok(Weekday::Friday),
        "saturday" | "sat" => Ok(Weekday::Saturday),
        "sunday" | "sun" => Ok(Weekday::Sunday),
        _ => Err(ValidationError::InvalidWeekday(value.to_string())),
    }
}

/// The secret is echoed back by Telegram in a header, which limits its alphabet.
pub fn validate_secret(secret: &str) -> Result<(), ValidationError> {
    if secret.is_empty() { return Err(ValidationError::MissingWebhookSecret); }
    if secret.len() > MAX_SECRET_LENGTH
        || !secret.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::InvalidWebhookSecret);
    }
    Ok(())
}
