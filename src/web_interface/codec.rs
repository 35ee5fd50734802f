//! Wire encodings of time spans and timestamps.
//!
//! Spans are written as ISO-8601 durations (`PT1H`, `P1DT2H30M`) and read
//! from ISO-8601, the `[-]D day[s], HH:MM:SS[.ffffff]` text form, or a
//! plain number of seconds. Timestamps are naive UTC, written as
//! `YYYY-MM-DDTHH:MM:SS[.ffffff]` and read from RFC 3339 or naive forms.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use regex::Regex;
use std::sync::OnceLock;

const MICROS_PER_SECOND: i64 = 1_000_000;
const SECONDS_PER_DAY: u64 = 86_400;

fn iso_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([-+])?P(?:(\d+(?:\.\d+)?)W)?(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
        )
        .expect("static regex")
    })
}

fn clock_duration() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:([-+]?\d+) days?, )?(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d{1,6}))?$")
            .expect("static regex")
    })
}

fn seconds_to_delta(seconds: f64) -> Option<TimeDelta> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * MICROS_PER_SECOND as f64).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::microseconds(micros as i64))
}

pub fn parse_duration(input: &str) -> Option<TimeDelta> {
    let input = input.trim();

    if let Some(caps) = iso_duration().captures(input) {
        let part = |i: usize| caps.get(i).map(|m| m.as_str().parse::<f64>());
        let units = [
            (2, 7.0 * SECONDS_PER_DAY as f64),
            (3, SECONDS_PER_DAY as f64),
            (4, 3_600.0),
            (5, 60.0),
            (6, 1.0),
        ];
        let mut seen = false;
        let mut seconds = 0.0;
        for (group, scale) in units {
            if let Some(value) = part(group) {
                seconds += value.ok()? * scale;
                seen = true;
            }
        }
        let has_time_part = (4..=6).any(|i| caps.get(i).is_some());
        if !seen || (input.contains('T') && !has_time_part) {
            return None;
        }
        if caps.get(1).map(|m| m.as_str()) == Some("-") {
            seconds = -seconds;
        }
        return seconds_to_delta(seconds);
    }

    if let Some(caps) = clock_duration().captures(input) {
        let days: i64 = match caps.get(1) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let hours: i64 = caps[2].parse().ok()?;
        let minutes: i64 = caps[3].parse().ok()?;
        let secs: i64 = caps[4].parse().ok()?;
        if minutes >= 60 || secs >= 60 {
            return None;
        }
        let micros: i64 = match caps.get(5) {
            Some(m) => format!("{:0<6}", m.as_str()).parse().ok()?,
            None => 0,
        };
        let clock = TimeDelta::hours(hours)
            + TimeDelta::minutes(minutes)
            + TimeDelta::seconds(secs)
            + TimeDelta::microseconds(micros);
        return TimeDelta::try_days(days).and_then(|d| d.checked_add(&clock));
    }

    input.parse::<f64>().ok().and_then(seconds_to_delta)
}

/// Decodes a JSON number as a count of seconds.
pub fn duration_from_seconds(seconds: f64) -> Option<TimeDelta> {
    seconds_to_delta(seconds)
}

pub fn format_duration(duration: TimeDelta) -> String {
    let negative = duration < TimeDelta::zero();
    let total_micros = duration.num_microseconds().unwrap_or(i64::MAX).unsigned_abs();
    let micros_per_second = MICROS_PER_SECOND as u64;

    let total_secs = total_micros / micros_per_second;
    let micros = total_micros % micros_per_second;
    let days = total_secs / SECONDS_PER_DAY;
    let hours = (total_secs % SECONDS_PER_DAY) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let secs = total_secs % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        out.push_str(&format!("{}D", days));
    }
    let has_clock = hours > 0 || minutes > 0 || secs > 0 || micros > 0;
    if has_clock || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{}H", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}M", minutes));
        }
        if secs > 0 || micros > 0 || !has_clock {
            if micros > 0 {
                let fraction = format!("{:06}", micros);
                out.push_str(&format!("{}.{}S", secs, fraction.trim_end_matches('0')));
            } else {
                out.push_str(&format!("{}S", secs));
            }
        }
    }
    out
}

pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        return Some(with_offset.naive_utc());
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Decodes a JSON number as a Unix timestamp in seconds.
pub fn timestamp_from_unix(seconds: f64) -> Option<NaiveDateTime> {
    let delta = seconds_to_delta(seconds)?;
    DateTime::<Utc>::UNIX_EPOCH
        .checked_add_signed(delta)
        .map(|dt| dt.naive_utc())
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.nanosecond() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
