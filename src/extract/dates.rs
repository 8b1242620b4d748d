// src/extract/dates.rs

use chrono::{NaiveDate, NaiveDateTime};

/// Fast parse of `"YYYY/MM/DD HH:MM:SS"`, the dominant layout in the files
/// this crate grew up on. Falls back to a handful of chrono formats.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    // minimal length + separators check before slicing
    let b = s.as_bytes();
    if b.len() >= 19 && b[..19].is_ascii() && b[4] == b'/' && b[7] == b'/' && b[10] == b' ' {
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[5..7].parse().ok()?;
        let day: u32 = s[8..10].parse().ok()?;
        let hour: u32 = s[11..13].parse().ok()?;
        let min: u32 = s[14..16].parse().ok()?;
        let sec: u32 = s[17..19].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, min, sec);
    }

    const DATETIME_FMTS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
    ];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_timestamp_fast_path() {
        let dt = parse_datetime("2024/12/14 09:30:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-12-14 09:30:00");
    }

    #[test]
    fn dash_and_us_formats() {
        assert!(parse_datetime("2024-12-14 09:30:00").is_some());
        assert!(parse_datetime("12/14/2024").is_some());
        assert_eq!(
            parse_datetime("2024-12-14").unwrap().format("%H:%M:%S").to_string(),
            "00:00:00"
        );
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("2024/13/40 99:99:99").is_none());
    }
}
