use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day exactly as scraped from the page, all fields still text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: String,
    /// Month/day text such as "MAR 28".
    pub date: String,
    pub desc: String,
    /// Composite range such as "72°/54°" or "--/54°".
    pub temp: String,
    pub precip: String,
    pub wind: String,
    pub humidity: String,
}

/// A forecast day after cleaning: metric units, typed columns, calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDayRecord {
    pub day: String,
    pub date: NaiveDate,
    pub desc: String,
    /// Chance of precipitation, percent.
    pub precip: u32,
    /// Wind speed, km/h rounded to one decimal.
    pub wind: f64,
    /// Relative humidity, percent.
    pub humidity: u32,
    /// Daily high, °C.
    pub temp_hi: Option<f64>,
    /// Daily low, °C.
    pub temp_low: Option<f64>,
}

/// A page that publishes a multi-day forecast table.
pub trait ForecastSource {
    /// Unique identifier for this source
    fn source_name(&self) -> &'static str;

    /// Fetch the raw page body
    fn fetch_page(&self) -> Result<String>;

    /// Extract the per-day rows from a page body
    fn parse_forecast(&self, html: &str) -> Result<Vec<DayRecord>>;

    fn get_forecast(&self) -> Result<Vec<DayRecord>> {
        let html = self.fetch_page()?;
        self.parse_forecast(&html)
    }
}
