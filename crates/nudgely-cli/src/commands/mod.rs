pub mod category;
pub mod config;
pub mod habit;
pub mod schedule;

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local calendar day of a stored timestamp.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}
