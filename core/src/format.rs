//! Label formatting — instant + zone → the three strings a card shows.
//!
//! Every public formatter comes in two flavours:
//!   - `format_*(instant, &str)` parses the zone and fails with
//!     `ClockError::InvalidTimeZone` on an unknown identifier;
//!   - `*_label(instant, Tz)` takes an already-validated zone and is total.
//! The engine only ever calls the second flavour; zones are validated once
//! when the registry is built.

use crate::error::{ClockError, ClockResult};
use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;

/// Emitted when an offset token has no discoverable sign or offset.
pub const FALLBACK_OFFSET_LABEL: &str = "UTC+00:00";

/// Parse an IANA zone identifier.
pub fn parse_zone(zone: &str) -> ClockResult<Tz> {
    zone.trim()
        .parse::<Tz>()
        .map_err(|_| ClockError::InvalidTimeZone { zone: zone.to_string() })
}

/// `hh:mm AM` in the zone's wall-clock time.
pub fn format_time(instant: DateTime<Utc>, zone: &str) -> ClockResult<String> {
    Ok(time_label(instant, parse_zone(zone)?))
}

/// Strict `UTC±HH:MM` for the zone's offset at `instant`.
pub fn format_utc_offset(instant: DateTime<Utc>, zone: &str) -> ClockResult<String> {
    Ok(utc_label(instant, parse_zone(zone)?))
}

/// `Weekday,Mon DD,YYYY`, e.g. `Sun,Aug 24,2025`.
pub fn format_date(instant: DateTime<Utc>, zone: &str) -> ClockResult<String> {
    Ok(date_label(instant, parse_zone(zone)?))
}

pub fn time_label(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%I:%M %p").to_string()
}

pub fn utc_label(instant: DateTime<Utc>, tz: Tz) -> String {
    let seconds = instant.with_timezone(&tz).offset().fix().local_minus_utc();
    normalize_offset_label(&short_offset_token(seconds))
}

pub fn date_label(instant: DateTime<Utc>, tz: Tz) -> String {
    // Fixed template, not a locale pattern: no space after either comma.
    instant.with_timezone(&tz).format("%a,%b %d,%Y").to_string()
}

/// Render an offset the way locale-aware "short offset" formatting does:
/// `GMT` for zero, `GMT+5` for whole hours, `GMT+5:30` otherwise.
/// The output is deliberately loose; `normalize_offset_label` tightens it.
pub fn short_offset_token(offset_seconds: i32) -> String {
    if offset_seconds == 0 {
        return "GMT".to_string();
    }
    let sign = if offset_seconds < 0 { '-' } else { '+' };
    let total_minutes = offset_seconds.unsigned_abs() / 60;
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if minutes == 0 {
        format!("GMT{sign}{hours}")
    } else {
        format!("GMT{sign}{hours}:{minutes:02}")
    }
}

/// Normalise any offset token to exactly `UTC±HH:MM`.
///
/// Accepts a `GMT` or `UTC` prefix (any case) followed by a sign, one or two
/// hour digits and optionally two minute digits with or without a colon.
/// Anything else, including a bare `GMT`, yields `FALLBACK_OFFSET_LABEL`.
/// Never fails.
pub fn normalize_offset_label(token: &str) -> String {
    let token = token.trim();
    let rest = strip_prefix_ignore_case(token, "GMT")
        .or_else(|| strip_prefix_ignore_case(token, "UTC"));

    match rest.and_then(parse_signed_offset) {
        Some((sign, hours, minutes)) => format!("UTC{sign}{hours:0>2}:{minutes:0>2}"),
        None => FALLBACK_OFFSET_LABEL.to_string(),
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// `+5` → ('+', "5", "00"), `-0330` → ('-', "03", "30"), `+5:30` → ('+', "5", "30").
fn parse_signed_offset(rest: &str) -> Option<(char, &str, &str)> {
    let sign = rest.chars().next().filter(|c| *c == '+' || *c == '-')?;
    let body = &rest[1..];
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None if body.len() > 2 => body.split_at(body.len() - 2),
        None => (body, "00"),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let hours_ok = (1..=2).contains(&hours.len()) && is_digits(hours);
    let minutes_ok = minutes.len() == 2 && is_digits(minutes);
    (hours_ok && minutes_ok).then_some((sign, hours, minutes))
}
