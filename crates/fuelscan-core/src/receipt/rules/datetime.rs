//! Transaction date/time extraction.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::{DATETIME_DMY_DASH, DATETIME_DMY_SLASH, DATETIME_YMD_DASH};
use super::{Cascade, ExtractionMatch, FieldExtractor, PatternMatcher};

lazy_static! {
    static ref DATETIME: Cascade<NaiveDateTime> = Cascade::new(
        "transaction_datetime",
        vec![
            PatternMatcher::new("dmy_slash", &DATETIME_DMY_SLASH, dmy_slash),
            PatternMatcher::new("dmy_dash", &DATETIME_DMY_DASH, dmy_dash),
            PatternMatcher::new("ymd_dash", &DATETIME_YMD_DASH, ymd_dash),
        ],
    );
}

fn dmy_slash(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    combine(caps, "%d/%m/%Y")
}

fn dmy_dash(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    combine(caps, "%d-%m-%Y")
}

fn ymd_dash(caps: &Captures<'_>) -> Option<NaiveDateTime> {
    combine(caps, "%Y-%m-%d")
}

fn combine(caps: &Captures<'_>, date_format: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(caps.get(1)?.as_str(), date_format).ok()?;
    let time = parse_time(caps.get(2)?.as_str())?;
    Some(date.and_time(time))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let format = if s.matches(':').count() == 2 {
        "%H:%M:%S"
    } else {
        "%H:%M"
    };
    NaiveTime::parse_from_str(s, format).ok()
}

/// Extract the first date immediately followed by a time.
pub fn extract_datetime(text: &str) -> Option<ExtractionMatch<NaiveDateTime>> {
    DATETIME.extract(text)
}
