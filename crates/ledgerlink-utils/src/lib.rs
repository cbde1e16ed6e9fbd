//! Utility functions and helpers

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static BASENAME_DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9-]").unwrap());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Format a date as `DD-mon-YYYY` with a lowercase month abbreviation
pub fn day_month_year(date: NaiveDate) -> String {
    format!("{:02}-{}-{}", date.day(), MONTHS[date.month0() as usize], date.year())
}

/// Split a file name at its last dot, keeping the dot with the extension
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    }
}

/// Strip everything except ASCII letters, digits and hyphens
pub fn sanitize_basename(basename: &str) -> String {
    BASENAME_DISALLOWED.replace_all(basename, "").into_owned()
}

/// Name an uploaded file `<epoch-ms>-<DD-mon-YYYY>-<basename><ext>`
///
/// Only the basename is sanitized; the extension is kept verbatim.
pub fn upload_file_name<Tz: TimeZone>(original: &str, now: &DateTime<Tz>) -> String {
    let (basename, extension) = split_extension(original);
    format!(
        "{}-{}-{}{}",
        now.timestamp_millis(),
        day_month_year(now.date_naive()),
        sanitize_basename(basename),
        extension
    )
}

/// Millisecond timestamp used as a cache-busting nonce
pub fn cache_buster() -> String {
    Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn test_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(day_month_year(date), "05-jan-2024");
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(day_month_year(date), "31-dec-2023");
    }

    #[test]
    fn test_upload_file_name() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 10, 30, 0).unwrap();
        let t = now.timestamp_millis();
        assert_eq!(
            upload_file_name("My Invoice #1.pdf", &now),
            format!("{}-05-jan-2024-MyInvoice1.pdf", t)
        );
    }

    #[test]
    fn test_upload_file_name_uses_local_calendar_day() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 1, 2, 0, 0).unwrap();
        assert!(upload_file_name("scan.png", &now).contains("-01-mar-2024-scan.png"));
    }

    #[test]
    fn test_extension_kept_verbatim() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        let name = upload_file_name("résumé v2.tar.GZ", &now);
        assert!(name.ends_with("-rsumv2tar.GZ"));
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".env"), ("", ".env"));
        assert_eq!(split_extension("a.b.c"), ("a.b", ".c"));
    }

    #[test]
    fn test_sanitize_basename() {
        assert_eq!(sanitize_basename("My Invoice #1"), "MyInvoice1");
        assert_eq!(sanitize_basename("bank-statement_2024"), "bank-statement2024");
    }

    #[test]
    fn test_cache_buster_is_numeric() {
        let nonce = cache_buster();
        assert!(!nonce.is_empty());
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));
        let millis: i64 = nonce.parse().unwrap();
        assert!((Utc::now().timestamp_millis() - millis).abs() < 60_000);
    }
}
