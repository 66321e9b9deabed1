use chrono::{Datelike, NaiveDate};

use super::error::{Error, Result};


pub static REPORT_DATE_FORMAT: &'static str = "%d/%m/%Y";


pub fn parse_report_date(s: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(s.trim(), REPORT_DATE_FORMAT).map_err(|err| Error::Date{
		value: s.into(),
		err,
	})
}

/// Week of the year with weeks starting on Sunday.
///
/// Week 1 starts on the first Sunday of the year; days before it are in
/// week 0. The result is always in `0..=53`.
pub fn week_number(date: NaiveDate) -> u32 {
	let yday = date.ordinal0();
	let wday = date.weekday().num_days_from_sunday();
	(yday + 7 - wday) / 7
}
