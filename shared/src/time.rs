//! Timestamp normalization and time-window resolution.
//!
//! The backend speaks strict ISO-8601 UTC; user input and stored
//! timestamps arrive looser (space separators, missing zone). The rules
//! here are deliberate: an offset-less timestamp is treated as UTC, not
//! local time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Normalizes a loosely-formatted timestamp into strict ISO-8601 UTC.
///
/// A string already ending in `Z` or carrying a numeric UTC offset
/// (`+HH:MM`, `-HH:MM`, or `+HHMM`) is returned unchanged except for
/// replacing a literal space separator with `T`. Anything else gets the
/// space replaced and a `Z` appended.
///
/// Never fails; garbage in produces garbage out, to be caught by the
/// actual date parse downstream.
///
/// # Example
///
/// ```
/// use shared::time::norm_iso;
///
/// assert_eq!(norm_iso("2024-01-15 10:30:45"), "2024-01-15T10:30:45Z");
/// assert_eq!(
///     norm_iso("2024-01-15T10:30:45+05:00"),
///     "2024-01-15T10:30:45+05:00"
/// );
/// ```
#[must_use]
pub fn norm_iso(input: &str) -> String {
    let normalized = input.replacen(' ', "T", 1);
    if normalized.ends_with('Z') || has_utc_offset(&normalized) {
        normalized
    } else {
        format!("{normalized}Z")
    }
}

/// Returns true if the string ends in a numeric UTC offset.
fn has_utc_offset(s: &str) -> bool {
    let bytes = s.as_bytes();
    let digits = |range: &[u8]| range.iter().all(u8::is_ascii_digit);

    // +HH:MM / -HH:MM
    if bytes.len() >= 6 {
        let tail = &bytes[bytes.len() - 6..];
        if (tail[0] == b'+' || tail[0] == b'-')
            && digits(&tail[1..3])
            && tail[3] == b':'
            && digits(&tail[4..6])
        {
            return true;
        }
    }

    // +HHMM / -HHMM, no colon
    if bytes.len() >= 5 {
        let tail = &bytes[bytes.len() - 5..];
        if (tail[0] == b'+' || tail[0] == b'-') && digits(&tail[1..5]) {
            return true;
        }
    }

    false
}

/// Parses a (possibly loose) timestamp into a UTC datetime.
///
/// Input is normalized with [`norm_iso`] first. Returns `None` when the
/// normalized string still does not parse.
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&norm_iso(input))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Formats a timestamp for display: short month, 2-digit day, year, and
/// a 2-digit `HH:MM:SS` clock.
///
/// Unparseable input yields the literal string `"Invalid Date"`; this
/// function never fails.
#[must_use]
pub fn format_timestamp(input: &str) -> String {
    match parse_timestamp(input) {
        Some(dt) => dt.format("%b %d, %Y %H:%M:%S").to_string(),
        None => "Invalid Date".to_string(),
    }
}

/// An explicit, absolute time window that overrides any relative range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSelection {
    /// Start of the window, ISO-8601.
    pub from: String,
    /// End of the window, ISO-8601.
    pub to: String,
}

/// Unit of a relative time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeUnit {
    /// Minutes.
    #[serde(rename = "m")]
    Minutes,
    /// Hours.
    #[serde(rename = "h")]
    Hours,
    /// Days.
    #[serde(rename = "d")]
    Days,
    /// Weeks.
    #[serde(rename = "w")]
    Weeks,
}

impl RangeUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'm' => Some(Self::Minutes),
            'h' => Some(Self::Hours),
            'd' => Some(Self::Days),
            'w' => Some(Self::Weeks),
            _ => None,
        }
    }
}

impl std::fmt::Display for RangeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minutes => write!(f, "m"),
            Self::Hours => write!(f, "h"),
            Self::Days => write!(f, "d"),
            Self::Weeks => write!(f, "w"),
        }
    }
}

/// A user-typed relative window such as "30m" or "7d".
///
/// Resolved against "now" at fetch time; mutually exclusive with
/// [`TimeSelection`] (selecting one clears the other).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRange {
    /// Magnitude of the window.
    pub value: u32,
    /// Unit of the window.
    pub unit: RangeUnit,
    /// The original user input, kept for display.
    pub label: String,
}

impl CustomRange {
    /// Parses input like "30m", "6h", "7d", "2w".
    ///
    /// Returns `None` for anything else (zero, missing unit, non-numeric).
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let unit = RangeUnit::from_char(trimmed.chars().last()?)?;
        let value: u32 = trimmed[..trimmed.len() - 1].parse().ok()?;
        if value == 0 {
            return None;
        }
        Some(Self {
            value,
            unit,
            label: trimmed.to_string(),
        })
    }

    /// The window length as a duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        let value = i64::from(self.value);
        match self.unit {
            RangeUnit::Minutes => Duration::minutes(value),
            RangeUnit::Hours => Duration::hours(value),
            RangeUnit::Days => Duration::days(value),
            RangeUnit::Weeks => Duration::weeks(value),
        }
    }
}

/// A resolved absolute query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Start of the window.
    pub from: DateTime<Utc>,
    /// End of the window.
    pub to: DateTime<Utc>,
}

/// Resolves the effective query window.
///
/// Precedence: an explicit [`TimeSelection`] wins; otherwise a
/// [`CustomRange`] relative to `now`; otherwise the relative `range`.
/// A selection whose bounds do not parse falls back to the relative
/// path rather than erroring.
#[must_use]
pub fn resolve_window(
    selection: Option<&TimeSelection>,
    custom: Option<&CustomRange>,
    range: &CustomRange,
    now: DateTime<Utc>,
) -> Window {
    if let Some(selection) = selection {
        if let (Some(from), Some(to)) = (
            parse_timestamp(&selection.from),
            parse_timestamp(&selection.to),
        ) {
            return Window { from, to };
        }
        tracing::debug!(
            from = %selection.from,
            to = %selection.to,
            "Unparseable time selection, falling back to relative range"
        );
    }

    let relative = custom.unwrap_or(range);
    Window {
        from: now - relative.duration(),
        to: now,
    }
}
