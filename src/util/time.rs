//! Server-timestamp formatting in the platform's display timezone.
//!
//! DESIGN
//! ======
//! The server speaks UTC ISO 8601; every timestamp the user sees is shown in
//! Pakistan Standard Time (UTC+5, no DST), the platform's fixed display
//! timezone. The conversion here is the only transformation applied to
//! `created_at` values. All functions are pure over parsed epoch seconds —
//! "now" is a parameter — so they run under native tests; only
//! [`now_utc_secs`] touches the browser clock.

#[cfg(test)]
#[path = "time_test.rs"]
mod time_test;

/// Display timezone offset from UTC, in seconds (PKT, UTC+5).
pub const DISPLAY_TZ_OFFSET_SECS: i64 = 5 * 3600;

const SECS_PER_DAY: i64 = 86_400;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format a UTC timestamp as a display-timezone time of day, e.g. `"2:30 PM"`.
/// Empty or unparsable input formats as the empty string.
#[must_use]
pub fn format_time(utc: &str) -> String {
    match parse_utc(utc) {
        Some(secs) => {
            let t = display_parts(secs);
            format!("{}:{:02} {}", t.hour12, t.minute, t.meridiem)
        }
        None => String::new(),
    }
}

/// Format a UTC timestamp as a display-timezone date and time,
/// e.g. `"Jan 1, 2:30 PM"`.
#[must_use]
pub fn format_date_time(utc: &str) -> String {
    match parse_utc(utc) {
        Some(secs) => {
            let t = display_parts(secs);
            format!(
                "{} {}, {}:{:02} {}",
                MONTHS[(t.month - 1) as usize],
                t.day,
                t.hour12,
                t.minute,
                t.meridiem
            )
        }
        None => String::new(),
    }
}

/// Whether a UTC timestamp falls on today's date in the display timezone.
#[must_use]
pub fn is_today(utc: &str, now_utc_secs: i64) -> bool {
    match parse_utc(utc) {
        Some(secs) => display_day_number(secs) == display_day_number(now_utc_secs),
        None => false,
    }
}

/// Whether a UTC timestamp falls on yesterday's date in the display timezone.
#[must_use]
pub fn is_yesterday(utc: &str, now_utc_secs: i64) -> bool {
    match parse_utc(utc) {
        Some(secs) => display_day_number(secs) == display_day_number(now_utc_secs) - 1,
        None => false,
    }
}

/// Roster preview label: time of day for today, `"Yesterday"`, otherwise the
/// full date and time. Empty input yields an empty label.
#[must_use]
pub fn relative_label(utc: &str, now_utc_secs: i64) -> String {
    if utc.is_empty() || parse_utc(utc).is_none() {
        return String::new();
    }
    if is_today(utc, now_utc_secs) {
        format_time(utc)
    } else if is_yesterday(utc, now_utc_secs) {
        "Yesterday".to_owned()
    } else {
        format_date_time(utc)
    }
}

/// Current wall-clock time as UTC epoch seconds.
#[must_use]
pub fn now_utc_secs() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        #[allow(clippy::cast_possible_truncation)]
        {
            (js_sys::Date::now() / 1000.0) as i64
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        0
    }
}

/// Parse a UTC ISO 8601 timestamp (`2024-01-01T10:00:00Z`, fractional
/// seconds and `±hh:mm` offsets tolerated, `T` or space separator) into
/// epoch seconds. Returns `None` for anything unparsable.
#[must_use]
pub fn parse_utc(input: &str) -> Option<i64> {
    let input = input.trim();
    let (date, rest) = input
        .split_once('T')
        .or_else(|| input.split_once(' '))?;

    let mut parts = date.split('-');
    let year: i64 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    let (time, offset_secs) = split_offset(rest)?;
    let time = time.split('.').next()?;
    let mut clock = time.split(':');
    let hour: i64 = clock.next()?.parse().ok()?;
    let minute: i64 = clock.next()?.parse().ok()?;
    let second: i64 = match clock.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if clock.next().is_some() || hour > 23 || minute > 59 || second > 60 {
        return None;
    }

    let days = days_from_civil(year, month, day);
    Some(days * SECS_PER_DAY + hour * 3600 + minute * 60 + second - offset_secs)
}

struct DisplayParts {
    month: u32,
    day: u32,
    hour12: u32,
    minute: u32,
    meridiem: &'static str,
}

fn display_parts(utc_secs: i64) -> DisplayParts {
    let local = utc_secs + DISPLAY_TZ_OFFSET_SECS;
    let days = local.div_euclid(SECS_PER_DAY);
    let secs_of_day = local.rem_euclid(SECS_PER_DAY);
    let (_, month, day) = civil_from_days(days);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hour = (secs_of_day / 3600) as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minute = ((secs_of_day % 3600) / 60) as u32;

    DisplayParts {
        month,
        day,
        hour12: (hour + 11) % 12 + 1,
        minute,
        meridiem: if hour < 12 { "AM" } else { "PM" },
    }
}

/// Day number in the display timezone, for today/yesterday comparisons.
fn display_day_number(utc_secs: i64) -> i64 {
    (utc_secs + DISPLAY_TZ_OFFSET_SECS).div_euclid(SECS_PER_DAY)
}

/// Split a time string from its trailing `Z` or `±hh:mm` offset, returning
/// the offset in seconds.
fn split_offset(rest: &str) -> Option<(&str, i64)> {
    if let Some(stripped) = rest.strip_suffix('Z') {
        return Some((stripped, 0));
    }
    for (i, c) in rest.char_indices().skip(1) {
        if c == '+' || c == '-' {
            let (time, offset) = rest.split_at(i);
            let sign = if c == '+' { 1 } else { -1 };
            let body = &offset[1..];
            let (h, m) = body.split_once(':').unwrap_or((body, "0"));
            let hours: i64 = h.parse().ok()?;
            let minutes: i64 = m.parse().ok()?;
            return Some((time, sign * (hours * 3600 + minutes * 60)));
        }
    }
    // No designator: the server always speaks UTC.
    Some((rest, 0))
}

/// Days since the Unix epoch for a civil date (Howard Hinnant's algorithm).
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let mp = i64::from(if month > 2 { month - 3 } else { month + 9 });
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date from days since the Unix epoch (inverse of `days_from_civil`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    (if month <= 2 { y + 1 } else { y }, month, day)
}
