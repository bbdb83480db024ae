// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

const INVALID_DEADLINE: &str =
    "Invalid date format. Expected format: YYYY-MM-DD, HH:MM and YYYY-MM-DD HH:MM";

/// Parses a deadline given in local time. An empty string means no deadline.
///
/// A bare date is read as midnight, a bare time as today.
pub fn parse_deadline(s: &str, now: &Zoned) -> Result<Option<Timestamp>, &'static str> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    let dt = if let Ok(dt) = DateTime::strptime("%Y-%m-%d %H:%M", s) {
        dt
    } else if let Ok(time) = Time::strptime("%H:%M", s) {
        now.date().to_datetime(time)
    } else if let Ok(date) = Date::strptime("%Y-%m-%d", s) {
        date.to_datetime(Time::midnight())
    } else {
        return Err(INVALID_DEADLINE);
    };

    dt.to_zoned(now.time_zone().clone())
        .map(|z| Some(z.timestamp()))
        .map_err(|e| {
            tracing::warn!(%e, %dt, "local time does not exist");
            "Invalid local time"
        })
}

/// Formats `t` in `tz`, dropping the time when it is midnight.
pub fn format_deadline(t: Timestamp, tz: &TimeZone) -> String {
    let zoned = t.to_zoned(tz.clone());
    if zoned.time() == Time::midnight() {
        zoned.strftime("%Y-%m-%d").to_string()
    } else {
        zoned.strftime("%Y-%m-%d %H:%M").to_string()
    }
}

/// Shortens an item id for display.
pub fn short_id(id: &str) -> &str {
    const LEN: usize = 8;
    match id.char_indices().nth(LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
