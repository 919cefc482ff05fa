// Forecast pipeline: fetch -> normalize -> plot

pub mod normalize;

use crate::apis::WeatherComCrawler;
use crate::charts::{self, ChartKind};
use crate::config::Config;
use crate::error::Result;
use crate::storage;
use crate::types::{DayRecord, ForecastSource, NormalizedDayRecord};
use normalize::Normalizer;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, instrument};

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub source: String,
    pub fetched_days: usize,
    pub normalized_days: usize,
    pub data_file: PathBuf,
    pub normalized_file: PathBuf,
    pub charts: Vec<PathBuf>,
}

pub struct Pipeline {
    source: Box<dyn ForecastSource>,
    config: Config,
}

impl Pipeline {
    pub fn new(source: Box<dyn ForecastSource>, config: Config) -> Self {
        Self { source, config }
    }

    /// Pipeline over the configured weather.com page.
    pub fn from_config(config: Config) -> Result<Self> {
        let crawler = WeatherComCrawler::new(&config.source)?;
        Ok(Self::new(Box::new(crawler), config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scrape the forecast and write the raw data file.
    ///
    /// A timeout or unusable URL is logged and yields `Ok(None)` without touching the
    /// data file; every other failure is returned.
    #[instrument(skip(self), fields(source = %self.source.source_name()))]
    pub fn fetch(&self) -> Result<Option<Vec<DayRecord>>> {
        println!("Requesting url...");
        let records = match self.source.get_forecast() {
            Ok(records) => records,
            Err(e) if e.is_recoverable_fetch_error() => {
                error!("Fetch abandoned: {}", e);
                println!("❌ {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        info!("✅ Scraped {} forecast days", records.len());

        let data_file = &self.config.output.data_file;
        println!("Saving data to '{}'...", data_file.display());
        storage::write_raw_records(data_file, &records)?;
        info!("💾 Saved raw forecast to {}", data_file.display());
        println!("Success!");

        Ok(Some(records))
    }

    /// Load the raw data file, clean it, and write the normalized file.
    #[instrument(skip(self))]
    pub fn normalize(&self) -> Result<Vec<NormalizedDayRecord>> {
        let raw = storage::read_raw_records(&self.config.output.data_file)?;
        let normalizer = Normalizer::new(self.config.normalize.effective_year());
        let records = normalizer.normalize(&raw)?;

        let normalized_file = &self.config.output.normalized_file;
        storage::write_normalized_records(normalized_file, &records)?;
        info!(
            "🔧 Normalized {} days into {}",
            records.len(),
            normalized_file.display()
        );
        Ok(records)
    }

    pub fn plot(&self, records: &[NormalizedDayRecord], kind: ChartKind) -> Result<PathBuf> {
        let path = charts::render_chart(records, kind, &self.config.output.charts_dir)?;
        println!("📊 Chart saved to {}", path.display());
        Ok(path)
    }

    pub fn plot_all(&self, records: &[NormalizedDayRecord]) -> Result<Vec<PathBuf>> {
        let paths = charts::render_all(records, &self.config.output.charts_dir)?;
        for path in &paths {
            println!("📊 Chart saved to {}", path.display());
        }
        Ok(paths)
    }

    /// Normalize the existing data file and chart the temperatures.
    pub fn visualize(&self) -> Result<Vec<NormalizedDayRecord>> {
        let records = self.normalize()?;
        self.plot(&records, ChartKind::Temperature)?;
        Ok(records)
    }

    /// Fetch, normalize and chart everything. `Ok(None)` when the fetch was abandoned.
    #[instrument(skip(self), fields(source = %self.source.source_name()))]
    pub fn run(&self) -> Result<Option<PipelineResult>> {
        info!("🚀 Starting pipeline for {}", self.source.source_name());

        let Some(raw) = self.fetch()? else {
            return Ok(None);
        };
        let records = self.normalize()?;
        let charts = self.plot_all(&records)?;

        Ok(Some(PipelineResult {
            source: self.source.source_name().to_string(),
            fetched_days: raw.len(),
            normalized_days: records.len(),
            data_file: self.config.output.data_file.clone(),
            normalized_file: self.config.output.normalized_file.clone(),
            charts,
        }))
    }
}

/// Plain-text table of normalized rows, one line per day.
pub fn format_table(records: &[NormalizedDayRecord]) -> String {
    let fmt_temp = |t: Option<f64>| t.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".into());
    let mut out = format!(
        "{:<10} {:<10} {:<28} {:>6} {:>6} {:>8} {:>7} {:>8}\n",
        "day", "date", "desc", "precip", "wind", "humidity", "temp_hi", "temp_low"
    );
    for r in records {
        out.push_str(&format!(
            "{:<10} {:<10} {:<28} {:>6} {:>6.1} {:>8} {:>7} {:>8}\n",
            r.day,
            r.date.format("%Y-%m-%d"),
            r.desc,
            r.precip,
            r.wind,
            r.humidity,
            fmt_temp(r.temp_hi),
            fmt_temp(r.temp_low)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScraperError;
    use tempfile::tempdir;

    struct FailingSource(fn() -> ScraperError);

    impl ForecastSource for FailingSource {
        fn source_name(&self) -> &'static str {
            "failing"
        }

        fn fetch_page(&self) -> Result<String> {
            Err((self.0)())
        }

        fn parse_forecast(&self, _html: &str) -> Result<Vec<DayRecord>> {
            Ok(Vec::new())
        }
    }

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.output.data_file = dir.join("weather.csv");
        config.output.normalized_file = dir.join("weather_clean.csv");
        config.output.charts_dir = dir.join("charts");
        config
    }

    #[test]
    fn test_timeout_abandons_fetch_without_output() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(FailingSource(|| ScraperError::Timeout("deadline".into()))),
            config_in(dir.path()),
        );

        assert!(pipeline.run().unwrap().is_none());
        assert!(!dir.path().join("weather.csv").exists());
    }

    #[test]
    fn test_other_fetch_errors_propagate() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(
            Box::new(FailingSource(|| ScraperError::Status(503))),
            config_in(dir.path()),
        );

        assert!(matches!(pipeline.fetch(), Err(ScraperError::Status(503))));
    }

    #[test]
    fn test_format_table_marks_missing_temps() {
        let record = NormalizedDayRecord {
            day: "Sun".into(),
            date: chrono::NaiveDate::from_ymd_opt(2019, 3, 31).unwrap(),
            desc: "Clear".into(),
            precip: 0,
            wind: 8.0,
            humidity: 40,
            temp_hi: None,
            temp_low: Some(-2.0),
        };
        let table = format_table(&[record]);
        let line = table.lines().nth(1).unwrap();
        assert!(line.starts_with("Sun"));
        assert!(line.contains("2019-03-31"));
        assert!(line.ends_with("-2.0"));
        assert!(line.contains(" - "));
    }
}
