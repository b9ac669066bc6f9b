use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Metadata keys that may carry the capture time, most specific first.
pub const DATE_TAGS: [&str; 4] = [
    "DateTimeOriginal",
    "DateTimeDigitized",
    "DateTime",
    "creation_time",
];

/// Calendar day a photo was taken. Ordered chronologically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaptureDate(NaiveDate);

impl CaptureDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses EXIF (`2023:03:14 09:30:00`) and ISO-8601
    /// (`2023-03-14T09:30:00.000000Z`) timestamps. Only the date part is kept.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().trim_end_matches('\0');
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y:%m:%d %H:%M:%S") {
            return Some(Self(dt.date()));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.date_naive()));
        }
        // Bare dates and timestamps without a zone: take the leading date.
        let head = value.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(head, "%Y:%m:%d"))
            .ok()
            .map(Self)
    }

    /// First parseable date among [`DATE_TAGS`].
    pub fn from_tags(tags: &BTreeMap<String, String>) -> Option<Self> {
        DATE_TAGS
            .iter()
            .filter_map(|key| tags.get(*key))
            .find_map(|value| Self::parse(value))
    }

    /// Date of a filesystem timestamp in the local time zone.
    pub fn from_system_time(time: SystemTime) -> Self {
        Self(DateTime::<Local>::from(time).date_naive())
    }

    /// Modification date of `path`.
    pub fn from_modified_time(path: &Path) -> std::io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self::from_system_time(modified))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.0.month0() as usize]
    }

    /// Label burned into frames, e.g. `"2023 March"`.
    pub fn period_label(&self) -> String {
        format!("{:04} {}", self.year(), self.month_name())
    }

    /// Noon local time on this date, used when stamping converted files.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let noon = self.0.and_hms_opt(12, 0, 0)?;
        noon.and_local_timezone(Local)
            .earliest()
            .map(SystemTime::from)
    }

    /// Noon on this date as an EXIF timestamp, e.g. `2023:03:14 12:00:00`.
    pub fn exif_timestamp(&self) -> String {
        self.0.format("%Y:%m:%d 12:00:00").to_string()
    }
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::exif("2023:03:14 09:30:00", 2023, 3, 14)]
    #[case::exif_nul_terminated("2021:06:01 00:00:00\0", 2021, 6, 1)]
    #[case::rfc3339("2022-01-05T18:12:00.000000Z", 2022, 1, 5)]
    #[case::bare_date("2020-12-31", 2020, 12, 31)]
    #[case::naive_iso("2019-07-04 10:00:00", 2019, 7, 4)]
    fn test_parse_accepts_metadata_formats(
        #[case] input: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
    ) {
        let date = CaptureDate::parse(input).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (year, month, day));
    }

    #[rstest]
    #[case::empty("")]
    #[case::garbage("not a date")]
    #[case::zeroed_exif("0000:00:00 00:00:00")]
    fn test_parse_rejects_invalid(#[case] input: &str) {
        assert!(CaptureDate::parse(input).is_none());
    }

    #[rstest]
    #[case(2023, 3, "2023 March")]
    #[case(2021, 6, "2021 June")]
    #[case(2022, 1, "2022 January")]
    #[case(999, 12, "0999 December")]
    fn test_period_label(#[case] year: i32, #[case] month: u32, #[case] expected: &str) {
        let date = CaptureDate::from_ymd(year, month, 1).unwrap();
        assert_eq!(date.period_label(), expected);
    }

    fn tags(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_tags_prefers_original_over_container_time() {
        let t = tags(&[
            ("creation_time", "2024-05-01T10:00:00.000000Z"),
            ("DateTime", "2023:02:02 00:00:00"),
            ("DateTimeOriginal", "2021:06:15 12:00:00"),
        ]);
        assert_eq!(CaptureDate::from_tags(&t), CaptureDate::from_ymd(2021, 6, 15));
    }

    #[test]
    fn test_from_tags_skips_unparseable_values() {
        let t = tags(&[
            ("DateTimeOriginal", "    :  :     :  :  "),
            ("creation_time", "2022-01-09T08:00:00Z"),
        ]);
        assert_eq!(CaptureDate::from_tags(&t), CaptureDate::from_ymd(2022, 1, 9));
    }

    #[test]
    fn test_from_tags_without_dates() {
        let t = tags(&[("Make", "Apple"), ("encoder", "Lavf")]);
        assert_eq!(CaptureDate::from_tags(&t), None);
    }

    #[test]
    fn test_ordering_is_chronological_across_years() {
        let dec = CaptureDate::from_ymd(2021, 12, 31).unwrap();
        let jan = CaptureDate::from_ymd(2022, 1, 1).unwrap();
        let feb_2021 = CaptureDate::from_ymd(2021, 2, 1).unwrap();
        assert!(dec < jan);
        assert!(feb_2021 < dec);
    }

    #[test]
    fn test_system_time_roundtrip_keeps_date() {
        let date = CaptureDate::from_ymd(2020, 2, 29).unwrap();
        let time = date.to_system_time().unwrap();
        assert_eq!(CaptureDate::from_system_time(time), date);
    }

    #[test]
    fn test_from_modified_time_of_missing_file_fails() {
        assert!(CaptureDate::from_modified_time(Path::new("/nonexistent/a.jpg")).is_err());
    }

    #[test]
    fn test_display_is_iso() {
        let date = CaptureDate::from_ymd(2023, 3, 4).unwrap();
        assert_eq!(date.to_string(), "2023-03-04");
    }

    #[test]
    fn test_exif_timestamp_is_noon() {
        let date = CaptureDate::from_ymd(2023, 3, 4).unwrap();
        assert_eq!(date.exif_timestamp(), "2023:03:04 12:00:00");
        assert_eq!(CaptureDate::parse(&date.exif_timestamp()), Some(date));
    }
}
