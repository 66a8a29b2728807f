use chrono::{Datelike, Days, Months, NaiveDate, ParseResult};

pub const DATE_FORMAT: &str = "%d-%m-%Y";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(text: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
}

/// Full English month name, as used for the invoice directories.
pub fn month_name(date: NaiveDate) -> String {
    date.format("%B").to_string()
}

pub trait DateBoundaries {
    fn start_of_month(&self) -> Option<Self>
    where
        Self: Sized;

    /// Same day one month back, clamped to the end of a shorter month.
    fn previous_month(&self) -> Option<Self>
    where
        Self: Sized;

    /// Day `n` counted from the start of the month. Out of range days roll
    /// over into the neighbouring months, day 0 being the last day of the
    /// previous month.
    fn with_day_of_month(&self, day: i64) -> Option<Self>
    where
        Self: Sized;
}

impl DateBoundaries for NaiveDate {
    fn start_of_month(&self) -> Option<Self> {
        self.with_day(1)
    }

    fn previous_month(&self) -> Option<Self> {
        self.checked_sub_months(Months::new(1))
    }

    fn with_day_of_month(&self, day: i64) -> Option<Self> {
        let start = self.start_of_month()?;
        let offset = day - 1;
        if offset >= 0 {
            start.checked_add_days(Days::new(offset.unsigned_abs()))
        } else {
            start.checked_sub_days(Days::new(offset.unsigned_abs()))
        }
    }
}
