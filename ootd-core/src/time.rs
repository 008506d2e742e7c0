//! Time utilities: timezone-aware "today" and completed-years age.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// IANA tz name like "America/Chicago".
pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar date at `now` in `tz`.
pub fn date_in_tz(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz = parse_tz(tz)?;
    Ok(now.with_timezone(&tz).date_naive())
}

/// Today's calendar date in `tz`.
pub fn today_in_tz(tz: &str) -> Result<NaiveDate> {
    date_in_tz(Utc::now(), tz)
}

/// Age in completed years: a birthday not yet reached this year does not
/// count. `None` when `dob` is after `today`.
pub fn completed_years(dob: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}
