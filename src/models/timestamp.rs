//! Timestamp codecs for the two schedule formats.
//!
//! - Plan text: fixed-width `YYYYMMDDHHMMSS`, optionally followed by a
//!   sub-second fraction (`.000`). The fraction is ignored on read and always
//!   written as `.000`.
//! - Vendor XML: `MM/DD/YYYY HH:MM:SS`.
//!
//! All values are naive (zone-less). Epoch milliseconds treat them as UTC.

use chrono::{NaiveDate, NaiveDateTime};

/// `chrono` format of the compact plan timestamp (without fraction).
pub const COMPACT_FORMAT: &str = "%Y%m%d%H%M%S";

/// `chrono` format of the vendor XML timestamp.
pub const XML_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// `chrono` format of a compact calendar date.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

const COMPACT_WIDTH: usize = 14;

/// Parses a compact plan timestamp, ignoring any `.fraction` suffix.
///
/// Returns `None` unless the integral part is exactly 14 ASCII digits
/// forming a valid date-time.
pub fn parse_compact(field: &str) -> Option<NaiveDateTime> {
    let (main, fraction) = match field.split_once('.') {
        Some((main, fraction)) => (main, Some(fraction)),
        None => (field, None),
    };
    if main.len() != COMPACT_WIDTH || !main.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    NaiveDateTime::parse_from_str(main, COMPACT_FORMAT).ok()
}

/// Formats a timestamp as `YYYYMMDDHHMMSS.000`.
pub fn format_compact(ts: &NaiveDateTime) -> String {
    format!("{}.000", ts.format(COMPACT_FORMAT))
}

/// Parses the leading `YYYYMMDD` of a compact value (e.g. a deploy marker).
pub fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    let head = value.get(..8)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(head, COMPACT_DATE_FORMAT).ok()
}

/// Parses a vendor XML timestamp.
pub fn parse_xml_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), XML_FORMAT).ok()
}

/// Milliseconds since the Unix epoch, reading the naive value as UTC.
pub fn epoch_millis(ts: &NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(h, min, s).unwrap())
    }

    #[test]
    fn test_parse_compact() {
        assert_eq!(
            parse_compact("20240315103000"),
            Some(dt(2024, 3, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_compact("20240315103000.123"),
            Some(dt(2024, 3, 15, 10, 30, 0))
        );
    }

    #[test]
    fn test_parse_compact_rejects() {
        assert!(parse_compact("2024031510300").is_none()); // 13 digits
        assert!(parse_compact("202403151030000").is_none()); // 15 digits
        assert!(parse_compact("20241315103000").is_none()); // month 13
        assert!(parse_compact("20240315103000.").is_none());
        assert!(parse_compact("20240315103000.abc").is_none());
        assert!(parse_compact("#comment").is_none());
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(
            format_compact(&dt(2024, 3, 15, 0, 5, 9)),
            "20240315000509.000"
        );
    }

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(
            parse_compact_date("20240316120000.000"),
            NaiveDate::from_ymd_opt(2024, 3, 16)
        );
        assert!(parse_compact_date("2024").is_none());
        assert!(parse_compact_date("2024AB16").is_none());
    }

    #[test]
    fn test_parse_xml_timestamp() {
        assert_eq!(
            parse_xml_timestamp("03/15/2024 23:50:00"),
            Some(dt(2024, 3, 15, 23, 50, 0))
        );
        assert!(parse_xml_timestamp("2024-03-15 23:50:00").is_none());
    }

    #[test]
    fn test_epoch_millis() {
        assert_eq!(epoch_millis(&dt(1970, 1, 1, 0, 0, 1)), 1000);
        assert_eq!(epoch_millis(&dt(2024, 1, 1, 0, 0, 0)), 1_704_067_200_000);
    }
}
