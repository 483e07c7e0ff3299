//! Timecode Representation and Normalization
//!
//! Canonical tenth-of-second timestamps rendered as `HH:MM:SS,T`.
//!
//! User-entered and upstream-generated timestamps are frequently malformed
//! (missing digits, truncated fractions, bare digit runs). The editor must
//! never hard-fail on display or edit, so [`TimeCode::normalize`] is a total
//! function: it repairs what it can and degrades to zero on anything
//! unrecognizable, letting the user correct the value visually.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TimeSec;

/// Full `H:M:S,frac` form with flexible digit counts.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2}),(\d*)$").unwrap());

/// `H:M:S` without a fractional part.
static HMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{1,2}:\d{1,2}$").unwrap());

/// Bare `M:S`.
static MS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{1,2}$").unwrap());

/// Pure digit run, to be unpacked as `HHMMSS` right-to-left.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

// =============================================================================
// TimeCode
// =============================================================================

/// A timestamp with tenth-of-second precision.
///
/// Invariants: `minutes` and `seconds` are in `[0, 59]`, `tenths` in
/// `[0, 9]`; the total value is a non-negative duration. Overflowing
/// minute/second groups in loose input are carried into the next unit so
/// the invariant holds for every constructed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeCode {
    hours: u32,
    minutes: u32,
    seconds: u32,
    tenths: u32,
}

impl TimeCode {
    /// The zero timestamp, `00:00:00,0`.
    pub const ZERO: TimeCode = TimeCode {
        hours: 0,
        minutes: 0,
        seconds: 0,
        tenths: 0,
    };

    /// Builds a timecode from raw components, carrying overflowing
    /// minutes/seconds into the next unit and capping tenths at 9.
    fn from_components(hours: u32, minutes: u32, seconds: u32, tenths: u32) -> Self {
        let total = hours as u64 * 3600 + minutes as u64 * 60 + seconds as u64;
        Self {
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
            tenths: tenths.min(9),
        }
    }

    /// Normalizes loose textual input into a canonical timecode.
    ///
    /// Total function: repairs common partial forms (trailing comma, missing
    /// fraction, bare `M:S`, packed digit runs) and falls back to
    /// [`TimeCode::ZERO`] on unrecoverable input. Idempotent over its own
    /// output.
    pub fn normalize(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::ZERO;
        }

        // Full form: re-derive canonical two-digit groups. An empty fraction
        // becomes 0; a longer fraction keeps only its first digit, truncated
        // rather than rounded.
        if let Some(caps) = TIME_RE.captures(trimmed) {
            let hours: u32 = caps[1].parse().unwrap_or(0);
            let minutes: u32 = caps[2].parse().unwrap_or(0);
            let seconds: u32 = caps[3].parse().unwrap_or(0);
            let tenths = caps[4]
                .chars()
                .next()
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0);
            return Self::from_components(hours, minutes, seconds, tenths);
        }

        // Repair common partial forms, interior whitespace removed.
        let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();

        // Trailing comma, e.g. "00:00:09,"
        if compact.ends_with(',') {
            return Self::normalize(&format!("{compact}0"));
        }

        // Bare hours:minutes:seconds, e.g. "00:00:09"
        if HMS_RE.is_match(&compact) {
            return Self::normalize(&format!("{compact},0"));
        }

        // Pure digit run, e.g. "1234" -> 00:12:34,0
        if DIGITS_RE.is_match(&compact) {
            return Self::parse_packed_digits(&compact);
        }

        // Bare minutes:seconds, e.g. "1:30" -> 00:01:30,0
        if MS_RE.is_match(&compact) {
            return Self::normalize(&format!("00:{compact},0"));
        }

        Self::ZERO
    }

    /// Unpacks a pure digit string as `HHMMSS`, grouped right-to-left.
    ///
    /// Odd lengths are left-padded with one zero; strings longer than six
    /// digits keep only the last six.
    fn parse_packed_digits(digits: &str) -> Self {
        let stripped = digits.trim_start_matches('0');
        if stripped.is_empty() {
            return Self::ZERO;
        }

        let mut padded = if stripped.len() % 2 == 1 {
            format!("0{stripped}")
        } else {
            stripped.to_string()
        };
        if padded.len() > 6 {
            padded = padded[padded.len() - 6..].to_string();
        }

        let group = |s: &str| s.parse::<u32>().unwrap_or(0);
        match padded.len() {
            2 => Self::from_components(0, 0, group(&padded), 0),
            4 => Self::from_components(0, group(&padded[0..2]), group(&padded[2..4]), 0),
            6 => Self::from_components(
                group(&padded[0..2]),
                group(&padded[2..4]),
                group(&padded[4..6]),
                0,
            ),
            _ => Self::ZERO,
        }
    }

    /// Converts a duration in seconds into a timecode.
    ///
    /// Whole seconds truncate; sub-second milliseconds round to the nearest
    /// tenth, with the tenths digit capped at 9 so rounding never carries
    /// into the seconds group. Negative input clamps to zero.
    pub fn from_seconds(seconds: TimeSec) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::ZERO;
        }
        let total_millis = (seconds * 1000.0).round() as u64;
        let total_secs = total_millis / 1000;
        let tenths = (((total_millis % 1000) + 50) / 100).min(9) as u32;
        Self {
            hours: (total_secs / 3600) as u32,
            minutes: ((total_secs % 3600) / 60) as u32,
            seconds: (total_secs % 60) as u32,
            tenths,
        }
    }

    /// Total value in seconds.
    pub fn to_seconds(&self) -> TimeSec {
        self.hours as f64 * 3600.0
            + self.minutes as f64 * 60.0
            + self.seconds as f64
            + self.tenths as f64 / 10.0
    }

    /// Returns true for the zero timestamp.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{}",
            self.hours, self.minutes, self.seconds, self.tenths
        )
    }
}

impl From<&str> for TimeCode {
    fn from(value: &str) -> Self {
        Self::normalize(value)
    }
}

impl Serialize for TimeCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::normalize(&text))
    }
}

// =============================================================================
// Tests
// =============================================================================
