//! Calendar-date parsing shared by the CSV, workbook and cache layers.

use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Duration,
};

/// `YYYY-MM-DD`, the only ship-date format accepted in batch files.
pub const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses an ISO calendar date. A trailing time component (`2024-01-05 00:00:00`,
/// `2024-01-05T00:00:00Z`) is ignored since spreadsheet exports often carry one.
/// Anything else after the date is an error.
pub fn parse_iso_date(raw: &str) -> Result<Date, time::error::Parse> {
    let trimmed = raw.trim();
    let date_part = match (trimmed.get(..10), trimmed.get(10..)) {
        (Some(date), Some(rest)) if rest.starts_with([' ', 'T']) => date,
        _ => trimmed,
    };
    Date::parse(date_part, ISO_DATE)
}

/// Converts an Excel 1900-system serial day number into a date.
pub fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Serial 1 is 1900-01-01, shifted by Excel's phantom 1900-02-29.
    let epoch = time::macros::date!(1899 - 12 - 30);
    epoch.checked_add(Duration::days(serial.floor() as i64))
}

/// Serde adapter for `Date` fields stored as `YYYY-MM-DD` strings.
pub mod iso_date {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(date)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw)
            .map_err(|err| D::Error::custom(format!("invalid date `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_plain_and_timestamped_dates() {
        assert_eq!(parse_iso_date("2024-02-10").unwrap(), date!(2024 - 02 - 10));
        assert_eq!(
            parse_iso_date(" 2024-02-10 00:00:00 ").unwrap(),
            date!(2024 - 02 - 10)
        );
        assert_eq!(
            parse_iso_date("2024-02-10T08:30:00Z").unwrap(),
            date!(2024 - 02 - 10)
        );
        assert!(parse_iso_date("10/02/2024").is_err());
        assert!(parse_iso_date("").is_err());
    }

    #[test]
    fn trailing_characters_are_rejected() {
        assert!(parse_iso_date("2024-02-101").is_err());
        assert!(parse_iso_date("2024-02-10garbage").is_err());
        assert!(parse_iso_date("2024-02-10-").is_err());
    }

    #[test]
    fn excel_serials_map_to_calendar_dates() {
        assert_eq!(excel_serial_to_date(45292.0), Some(date!(2024 - 01 - 01)));
        assert_eq!(excel_serial_to_date(45292.75), Some(date!(2024 - 01 - 01)));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
    }
}
