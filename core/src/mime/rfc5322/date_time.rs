/*
 * date_time.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Postino, a POP3 mail retrieval client.
 *
 * Postino is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Postino is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Postino.  If not, see <http://www.gnu.org/licenses/>.
 */

//! RFC 5322 date-time parsing (section 3.3) with obsolete forms (section 4.3).

use chrono::{DateTime, FixedOffset};

/// Parse an RFC 5322 date-time string (e.g. "Fri, 21 Nov 1997 09:55:06 -0600").
/// Returns None on parse failure.
pub fn parse_rfc5322_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = strip_trailing_comment(value.trim());
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value).ok().or_else(|| parse_obsolete_date(value))
}

/// Seconds since the Unix epoch, or None when the date cannot be read.
pub fn parse_epoch_seconds(value: &str) -> Option<i64> {
    parse_rfc5322_date(value).map(|dt| dt.timestamp())
}

/// "... -0500 (EST)" -> "... -0500".
fn strip_trailing_comment(value: &str) -> &str {
    match value.rfind('(') {
        Some(i) if value.ends_with(')') => value[..i].trim_end(),
        _ => value,
    }
}

/// Obsolete formats: 2-digit year, optional seconds, legacy zone names, missing zone.
fn parse_obsolete_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = strip_day_of_week(value);
    let value = convert_obsolete_timezones(value);
    let value = convert_two_digit_year(&value);
    for fmt in ["%d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M %z"] {
        if let Ok(dt) = DateTime::parse_from_str(&value, fmt) {
            return Some(dt);
        }
    }
    // no zone at all: assume UTC
    let with_zone = format!("{} +0000", value);
    ["%d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M %z"]
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&with_zone, fmt).ok())
}

fn strip_day_of_week(value: &str) -> &str {
    match value.find(',') {
        Some(i) if i <= 9 => value[i + 1..].trim_start(),
        _ => value,
    }
}

/// Convert 2-digit year to 4-digit (RFC 5322 4.3: 00-49 -> 2000-2049, 50-99 -> 1950-1999).
/// Only replace a 2-digit token that follows a month abbreviation (e.g. "Nov 99").
fn convert_two_digit_year(s: &str) -> String {
    const MONTHS: &[&str] = &[
        " Jan ", " Feb ", " Mar ", " Apr ", " May ", " Jun ",
        " Jul ", " Aug ", " Sep ", " Oct ", " Nov ", " Dec ",
    ];
    let mut s = s.to_string();
    for month in MONTHS {
        if let Some(i) = s.find(month) {
            let after = i + month.len();
            let b = s.as_bytes();
            if after + 2 <= b.len()
                && b[after].is_ascii_digit()
                && b[after + 1].is_ascii_digit()
                && (after + 2 == b.len() || !b[after + 2].is_ascii_digit())
            {
                let yy = (b[after] - b'0') as u32 * 10 + (b[after + 1] - b'0') as u32;
                let full = if yy <= 49 { 2000 + yy } else { 1900 + yy };
                s.replace_range(after..after + 2, &full.to_string());
                break;
            }
        }
    }
    s
}

fn convert_obsolete_timezones(s: &str) -> String {
    const ZONES: &[(&str, &str)] = &[
        ("GMT", "+0000"),
        ("UT", "+0000"),
        ("UTC", "+0000"),
        ("Z", "+0000"),
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
    ];
    let Some((head, zone)) = s.trim_end().rsplit_once(' ') else {
        return s.to_string();
    };
    match ZONES.iter().find(|(name, _)| zone.eq_ignore_ascii_case(name)) {
        Some((_, offset)) => format!("{} {}", head, offset),
        None => s.to_string(),
    }
}
