use crate::error::AppError;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

pub fn format_timestamp(value: OffsetDateTime) -> Result<String, AppError> {
    value
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Parses a user- or storage-supplied timestamp.
///
/// RFC 3339 values keep their own offset. The offset-less forms produced by
/// date pickers (`2025-12-20T09:30`, `2025-12-20 09:30:15`, `2025-12-20`) are
/// read as wall-clock time in `offset`.
pub fn parse_timestamp(raw: &str, offset: UtcOffset) -> Result<OffsetDateTime, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("datetime is required"));
    }

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(parsed);
    }

    let normalized = trimmed.replacen(' ', "T", 1);
    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");

    if let Ok(parsed) = PrimitiveDateTime::parse(&normalized, with_seconds) {
        return Ok(parsed.assume_offset(offset));
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(&normalized, without_seconds) {
        return Ok(parsed.assume_offset(offset));
    }
    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Ok(date.midnight().assume_offset(offset));
    }

    Err(AppError::invalid_input(format!(
        "unrecognized datetime '{trimmed}' (expected RFC3339, YYYY-MM-DD HH:MM or YYYY-MM-DD)"
    )))
}

/// Serde adapter for optional timestamps: written as RFC 3339, read leniently.
pub(crate) mod lenient_option {
    use super::{format_timestamp, local_offset, parse_timestamp};
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => {
                let formatted = format_timestamp(*value).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_timestamp(value, local_offset())
                .map(Some)
                .map_err(|err| serde::de::Error::custom(err.message().to_string())),
        }
    }
}
