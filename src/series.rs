use std::collections::BTreeMap;
use std::num::ParseFloatError;
use std::str::FromStr;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Daily values keyed by date.  Dates without an entry count as zero.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Series(BTreeMap<Date, f64>);

impl Series {
    pub(crate) fn new() -> Series {
        Series::default()
    }

    /// Set the value for `date`, returning the value it replaced, if any
    pub(crate) fn insert(&mut self, date: Date, value: f64) -> Option<f64> {
        self.0.insert(date, value)
    }

    pub(crate) fn value_on(&self, date: Date) -> f64 {
        self.0.get(&date).copied().unwrap_or(0.0)
    }

    pub(crate) fn first_date(&self) -> Option<Date> {
        self.0.keys().next().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The color scale shared by every panel.  The lower bound is the
    /// smallest value when that is negative and zero otherwise; the upper
    /// bound is the largest value (zero for an empty series).
    pub(crate) fn value_range(&self) -> ValueRange {
        let min = self.0.values().copied().fold(f64::INFINITY, f64::min);
        let max = self.0.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = if min < 0.0 { min } else { 0.0 };
        let max = if max > f64::NEG_INFINITY { max } else { 0.0 };
        ValueRange { min, max }
    }
}

impl FromIterator<(Date, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Series(iter.into_iter().collect())
    }
}

impl FromStr for Series {
    type Err = ParseSeriesError;

    /// Parse lines of the form `YYYY-MM-DD VALUE`, with the fields separated
    /// by whitespace or a comma.  Blank lines and `#` comments are skipped.
    fn from_str(s: &str) -> Result<Series, ParseSeriesError> {
        let mut series = Series::new();
        for (i, line) in s.lines().enumerate() {
            let line = line.split_once('#').map_or(line, |(pre, _)| pre).trim();
            if line.is_empty() {
                continue;
            }
            let (date, value) =
                parse_line(line).map_err(|kind| ParseSeriesError { line: i + 1, kind })?;
            series.insert(date, value);
        }
        Ok(series)
    }
}

fn parse_line(line: &str) -> Result<(Date, f64), ParseLineError> {
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty());
    let date = fields.next().ok_or(ParseLineError::MissingField("date"))?;
    let value = fields.next().ok_or(ParseLineError::MissingField("value"))?;
    if let Some(extra) = fields.next() {
        return Err(ParseLineError::TrailingField(extra.to_owned()));
    }
    let date = Date::parse(date, &YMD_FMT)?;
    let value = value.parse::<f64>()?;
    Ok((date, value))
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("invalid series data on line {line}")]
pub(crate) struct ParseSeriesError {
    pub(crate) line: usize,
    #[source]
    pub(crate) kind: ParseLineError,
}

#[derive(Debug, Eq, Error, PartialEq)]
pub(crate) enum ParseLineError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unexpected extra field {0:?}")]
    TrailingField(String),
    #[error("invalid date")]
    Date(#[from] time::error::Parse),
    #[error("invalid value")]
    Value(#[from] ParseFloatError),
}

/// Inclusive bounds of the color scale
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ValueRange {
    min: f64,
    max: f64,
}

impl ValueRange {
    pub(crate) fn min(&self) -> f64 {
        self.min
    }

    pub(crate) fn max(&self) -> f64 {
        self.max
    }

    /// Map `value` onto `0.0..=1.0`, clamping values outside the range.  A
    /// degenerate range maps everything to `0.0`.  NaN stays NaN.
    pub(crate) fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if value.is_nan() {
            value
        } else if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
impl ValueRange {
    pub(crate) fn new(min: f64, max: f64) -> ValueRange {
        ValueRange { min, max }
    }
}
