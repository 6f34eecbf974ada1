use chrono::{Datelike, NaiveDate};

/// `YYYY-MM` key used to bucket billing rows by calendar month.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a `YYYY-MM` key back into the first day of that month.
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_pads_single_digit_months() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(month_key(date), "2024-03");
    }

    #[test]
    fn parse_month_key_round_trips() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        assert_eq!(parse_month_key(&month_key(date)), Some(date));
        assert_eq!(parse_month_key("not-a-month"), None);
        assert_eq!(parse_month_key("2024"), None);
    }
}
