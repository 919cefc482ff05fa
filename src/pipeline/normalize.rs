//! Cleaning of scraped forecast rows into typed, metric records.
//!
//! Each step is a per-column transform: strip `%` from humidity and precipitation,
//! split the "hi/low" temperature text, keep the numeric part of the wind text,
//! resolve "MMM DD" into a calendar date, convert units, then mean-fill missing
//! temperatures.

use crate::constants::{MISSING_TEMP_PLACEHOLDER, MONTH_ABBREVIATIONS, MPH_PER_KMH};
use crate::error::{Result, ScraperError};
use crate::types::{DayRecord, NormalizedDayRecord};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, instrument};

static TEMP_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--|-?\d+").expect("temperature token regex is valid"));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number regex is valid"));

/// Parse a percentage cell such as "65%".
pub fn strip_percent(field: &'static str, text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    digits
        .parse()
        .map_err(|e| ScraperError::invalid_field(field, text, format!("{}", e)))
}

/// Split "72°/54°" into its high and low readings, in °F.
///
/// The `--` placeholder in either slot becomes `None`.
pub fn parse_temperature_range(text: &str) -> Result<(Option<f64>, Option<f64>)> {
    let tokens: Vec<&str> = TEMP_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    if tokens.len() < 2 {
        return Err(ScraperError::invalid_field(
            "temp",
            text,
            format!("expected two readings, found {}", tokens.len()),
        ));
    }

    let reading = |token: &str| -> Result<Option<f64>> {
        if token == MISSING_TEMP_PLACEHOLDER {
            return Ok(None);
        }
        token
            .parse::<f64>()
            .map(Some)
            .map_err(|e| ScraperError::invalid_field("temp", text, e.to_string()))
    };

    Ok((reading(tokens[0])?, reading(tokens[1])?))
}

/// First number in the wind text, e.g. 10 for "WSW 10 mph".
pub fn extract_wind_mph(text: &str) -> Result<u32> {
    let token = NUMBER
        .find(text)
        .ok_or_else(|| ScraperError::invalid_field("wind", text, "no wind speed"))?;
    token
        .as_str()
        .parse()
        .map_err(|e| ScraperError::invalid_field("wind", text, format!("{}", e)))
}

/// Month number for a three-letter abbreviation, case-insensitive ("mar" -> 3).
pub fn month_to_number(abbreviation: &str) -> Option<u32> {
    let upper = abbreviation.to_uppercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == upper)
        .map(|i| i as u32 + 1)
}

/// Resolve "MAR 28" against `year`.
pub fn convert_date(text: &str, year: i32) -> Result<NaiveDate> {
    let trimmed = text.trim();
    let abbreviation: String = trimmed.chars().take(3).collect();
    let month =
        month_to_number(&abbreviation).ok_or_else(|| ScraperError::UnknownMonth(abbreviation))?;

    let day: u32 = NUMBER
        .find(trimmed)
        .ok_or_else(|| ScraperError::invalid_field("date", text, "no day of month"))?
        .as_str()
        .parse()
        .map_err(|e| ScraperError::invalid_field("date", text, format!("{}", e)))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(ScraperError::InvalidDate { year, month, day })
}

/// Whole degrees Celsius, rounded down.
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    ((fahrenheit - 32.0) / 1.8).floor()
}

/// km/h rounded to one decimal place.
pub fn mph_to_kmh(mph: f64) -> f64 {
    (mph / MPH_PER_KMH * 10.0).round() / 10.0
}

/// Arithmetic mean of the present values, `None` when there are none.
pub fn column_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Replace missing temperatures with their column mean.
pub fn mean_fill(records: &mut [NormalizedDayRecord]) {
    let hi_mean = column_mean(records.iter().map(|r| r.temp_hi));
    let low_mean = column_mean(records.iter().map(|r| r.temp_low));

    for record in records.iter_mut() {
        if record.temp_hi.is_none() {
            record.temp_hi = hi_mean;
        }
        if record.temp_low.is_none() {
            record.temp_low = low_mean;
        }
    }
}

pub struct Normalizer {
    year: i32,
}

impl Normalizer {
    pub fn new(year: i32) -> Self {
        Self { year }
    }

    pub fn normalize_record(&self, record: &DayRecord) -> Result<NormalizedDayRecord> {
        let (hi_f, low_f) = parse_temperature_range(&record.temp)?;
        let wind_mph = extract_wind_mph(&record.wind)?;

        Ok(NormalizedDayRecord {
            day: record.day.clone(),
            date: convert_date(&record.date, self.year)?,
            desc: record.desc.clone(),
            precip: strip_percent("precip", &record.precip)?,
            wind: mph_to_kmh(f64::from(wind_mph)),
            humidity: strip_percent("humidity", &record.humidity)?,
            temp_hi: hi_f.map(fahrenheit_to_celsius),
            temp_low: low_f.map(fahrenheit_to_celsius),
        })
    }

    /// Normalize every row in page order, then mean-fill the temperature columns.
    #[instrument(skip(self, records), fields(rows = records.len(), year = self.year))]
    pub fn normalize(&self, records: &[DayRecord]) -> Result<Vec<NormalizedDayRecord>> {
        let mut normalized = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            match self.normalize_record(record) {
                Ok(row) => normalized.push(row),
                Err(e) => {
                    error!("Normalization failed for row {} ({}): {}", i, record.day, e);
                    return Err(e);
                }
            }
        }

        let missing = normalized
            .iter()
            .filter(|r| r.temp_hi.is_none() || r.temp_low.is_none())
            .count();
        mean_fill(&mut normalized);
        debug!("Mean-filled {} rows with missing temperatures", missing);

        Ok(normalized)
    }
}
