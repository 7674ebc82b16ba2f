//! Date and time parsing for receipt fields.
//!
//! Accepted date forms: `DD/MM/YYYY`, `DD-MM-YYYY` and the abbreviated
//! month form `DD MES YYYY` printed by app receipts. Output is always
//! ISO-8601 via `NaiveDate`. Missing fields stay missing; nothing is
//! defaulted.

use chrono::{NaiveDate, NaiveTime};

use super::patterns::{DATE_ABBREV, DATE_DMY, TIME};

/// Fixed Portuguese month abbreviation table.
fn month_number(abbrev: &str) -> Option<u32> {
    let n = match abbrev.to_uppercase().as_str() {
        "JAN" => 1,
        "FEV" => 2,
        "MAR" => 3,
        "ABR" => 4,
        "MAI" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AGO" => 8,
        "SET" => 9,
        "OUT" => 10,
        "NOV" => 11,
        "DEZ" => 12,
        _ => return None,
    };
    Some(n)
}

/// Parse the first date found in the string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_DMY.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_ABBREV.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Parse the first time found in the string. Seconds default to zero
/// when the receipt prints only `HH:MM`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let caps = TIME.captures(s)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps
        .get(3)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0);
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Parse a composite `Data/Hora` value such as `20/05/2025 - 17:51:22`.
pub fn parse_date_time(s: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
    (parse_date(s), parse_time(s))
}
