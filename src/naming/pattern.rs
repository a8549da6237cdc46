//! Filename pattern matching
//!
//! Two structural templates are recognised:
//! - `prefix-number-corrected.extension`, the output of lens correction,
//!   used for identifier-based pairing
//! - an 8-digit date and a 6-digit time embedded anywhere in the name,
//!   used to stamp capture time onto aligned outputs
//!
//! A name that doesn't fit a template is a non-match (`None`), never an error.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

/// Default date/time template: YYYYMMDD-HHmmss or YYYYMMDD_HHmmss
pub const DEFAULT_DATE_PATTERN: &str = r"(\d{8})[-_](\d{6})";

/// Timestamp format understood by the metadata tool
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

static CORRECTED_NAME: OnceLock<Regex> = OnceLock::new();
static TRAILING_NUMBER: OnceLock<Regex> = OnceLock::new();

fn corrected_name_regex() -> &'static Regex {
    // Greedy prefix: the identifier is the last digit run before `-corrected`
    CORRECTED_NAME.get_or_init(|| {
        Regex::new(r"^(.+)-(\d+)-corrected\.(.+)$").expect("corrected-name pattern is valid")
    })
}

fn trailing_number_regex() -> &'static Regex {
    TRAILING_NUMBER.get_or_init(|| Regex::new(r"(\d+)\D*$").expect("trailing-number pattern is valid"))
}

/// Components of a `prefix-number-corrected.extension` filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectedName {
    pub prefix: String,
    pub number: String,
    pub extension: String,
}

impl CorrectedName {
    /// Parse a filename, `None` when it doesn't follow the template
    pub fn parse(filename: &str) -> Option<Self> {
        let caps = corrected_name_regex().captures(filename)?;
        trace!(filename, "Matched corrected-name pattern");
        Some(Self {
            prefix: caps.get(1)?.as_str().to_string(),
            number: caps.get(2)?.as_str().to_string(),
            extension: caps.get(3)?.as_str().to_string(),
        })
    }

    /// Same identifier and extension under another prefix
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            number: self.number.clone(),
            extension: self.extension.clone(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}-corrected.{}", self.prefix, self.number, self.extension)
    }
}

/// Last run of digits in a name, e.g. `0007` in `GOPR-0007`
pub fn trailing_number(name: &str) -> Option<&str> {
    trailing_number_regex()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Raw date and time digit runs pulled out of a filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeDigits {
    pub date: String,
    pub time: String,
}

impl DateTimeDigits {
    /// Validate against the calendar
    ///
    /// Fails for digit runs of the wrong length or values such as month 13
    /// or 25 o'clock.
    pub fn to_timestamp(&self, filename: &str) -> Result<NaiveDateTime> {
        let invalid = || Error::InvalidTimestamp {
            file: filename.to_string(),
            value: format!("{} {}", self.date, self.time),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if self.date.len() != 8 || self.time.len() != 6 || !all_digits(&self.date) || !all_digits(&self.time) {
            return Err(invalid());
        }

        let year: i32 = self.date[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = self.date[4..6].parse().map_err(|_| invalid())?;
        let day: u32 = self.date[6..8].parse().map_err(|_| invalid())?;
        let hour: u32 = self.time[0..2].parse().map_err(|_| invalid())?;
        let minute: u32 = self.time[2..4].parse().map_err(|_| invalid())?;
        let second: u32 = self.time[4..6].parse().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .ok_or_else(invalid)
    }
}

/// Date/time template with two capture groups (date digits, time digits)
#[derive(Debug, Clone)]
pub struct DateTimePattern {
    regex: Regex,
}

impl DateTimePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 3 {
            return Err(Error::Config(format!(
                "date pattern '{}' needs two capture groups (date, time)",
                pattern
            )));
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find the date and time runs, `None` when the name doesn't match
    pub fn find(&self, filename: &str) -> Option<DateTimeDigits> {
        let caps = self.regex.captures(filename)?;
        Some(DateTimeDigits {
            date: caps.get(1)?.as_str().to_string(),
            time: caps.get(2)?.as_str().to_string(),
        })
    }
}

impl Default for DateTimePattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_DATE_PATTERN).expect("default date pattern is valid"),
        }
    }
}

/// Render a timestamp the way the metadata tool expects it
pub fn exif_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(EXIF_DATETIME_FORMAT).to_string()
}
