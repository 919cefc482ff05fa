use crate::config::SourceConfig;
use crate::constants::{
    DATE_SELECTOR, DAY_SELECTOR, DESCRIPTION_SELECTOR, FORECAST_TABLE_SELECTOR,
    HUMIDITY_SELECTOR, PRECIP_SELECTOR, ROW_SELECTOR, TEMP_SELECTOR, WEATHER_COM_SOURCE,
    WIND_SELECTOR,
};
use crate::error::{Result, ScraperError};
use crate::types::{DayRecord, ForecastSource};
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, warn};

/// Scrapes the weather.com ten-day forecast table.
pub struct WeatherComCrawler {
    client: Client,
    url: String,
}

impl WeatherComCrawler {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(ScraperError::from_request)?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScraperError::Config(format!("invalid selector '{}': {:?}", css, e)))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// All elements matching one field selector inside a table, in document order.
struct FieldColumn<'a> {
    css: &'static str,
    elements: Vec<ElementRef<'a>>,
}

impl<'a> FieldColumn<'a> {
    fn collect(table: &ElementRef<'a>, css: &'static str) -> Result<Self> {
        let sel = selector(css)?;
        Ok(Self {
            css,
            elements: table.select(&sel).collect(),
        })
    }

    fn text_at(&self, index: usize) -> Result<String> {
        self.elements
            .get(index)
            .map(element_text)
            .ok_or_else(|| ScraperError::MissingElement {
                selector: self.css.to_string(),
                index,
            })
    }
}

/// Extract one `DayRecord` per table row, skipping the trailing footer row.
///
/// A page without a forecast table, or whose tables hold no day rows, is an error.
pub fn parse_forecast_table(html: &str) -> Result<Vec<DayRecord>> {
    let document = Html::parse_document(html);
    let table_selector = selector(FORECAST_TABLE_SELECTOR)?;
    let row_selector = selector(ROW_SELECTOR)?;
    let mut records = Vec::new();
    let mut tables = 0;

    for table in document.select(&table_selector) {
        tables += 1;
        let row_count = table.select(&row_selector).count();
        let day_rows = row_count.saturating_sub(1);
        debug!("Forecast table has {} rows, reading {}", row_count, day_rows);

        let days = FieldColumn::collect(&table, DAY_SELECTOR)?;
        let dates = FieldColumn::collect(&table, DATE_SELECTOR)?;
        let descs = FieldColumn::collect(&table, DESCRIPTION_SELECTOR)?;
        let temps = FieldColumn::collect(&table, TEMP_SELECTOR)?;
        let precips = FieldColumn::collect(&table, PRECIP_SELECTOR)?;
        let winds = FieldColumn::collect(&table, WIND_SELECTOR)?;
        let humidities = FieldColumn::collect(&table, HUMIDITY_SELECTOR)?;

        for i in 0..day_rows {
            records.push(DayRecord {
                day: days.text_at(i)?,
                date: dates.text_at(i)?,
                desc: descs.text_at(i)?,
                temp: temps.text_at(i)?,
                precip: precips.text_at(i)?,
                wind: winds.text_at(i)?,
                humidity: humidities.text_at(i)?,
            });
        }
    }

    if tables == 0 {
        warn!("No forecast table found - the page structure may have changed");
        return Err(ScraperError::MissingElement {
            selector: FORECAST_TABLE_SELECTOR.to_string(),
            index: 0,
        });
    }
    if records.is_empty() {
        warn!("Forecast table has no day rows");
        return Err(ScraperError::MissingElement {
            selector: format!("{} {}", FORECAST_TABLE_SELECTOR, ROW_SELECTOR),
            index: 0,
        });
    }

    Ok(records)
}

impl ForecastSource for WeatherComCrawler {
    fn source_name(&self) -> &'static str {
        WEATHER_COM_SOURCE
    }

    #[instrument(skip(self), fields(url = %self.url))]
    fn fetch_page(&self) -> Result<String> {
        let url = Url::parse(&self.url)
            .map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", self.url, e)))?;

        info!("Requesting url...");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(ScraperError::from_request)?;

        if !response.status().is_success() {
            return Err(ScraperError::Status(response.status().as_u16()));
        }

        let body = response.text().map_err(ScraperError::from_request)?;
        debug!("Received {} bytes", body.len());
        Ok(body)
    }

    fn parse_forecast(&self, html: &str) -> Result<Vec<DayRecord>> {
        let records = parse_forecast_table(html)?;
        info!("Parsed {} forecast days from weather.com", records.len());
        Ok(records)
    }
}
