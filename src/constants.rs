/// Source and file name constants shared across the fetcher, normalizer and CLI.

/// Ten-day forecast page for Warsaw, Poland.
pub const DEFAULT_SOURCE_URL: &str = "https://weather.com/weather/tenday/l/PLXX0029:1:PL";

pub const WEATHER_COM_SOURCE: &str = "weather_com";

// Output files
pub const DEFAULT_DATA_FILE: &str = "weather.csv";
pub const DEFAULT_NORMALIZED_FILE: &str = "weather_clean.csv";
pub const DEFAULT_CHARTS_DIR: &str = "charts";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) forecast_scraper/0.1";

// Selectors for the forecast table markup
pub const FORECAST_TABLE_SELECTOR: &str = "table.twc-table";
pub const ROW_SELECTOR: &str = "tr";
pub const DAY_SELECTOR: &str = "span.date-time";
pub const DATE_SELECTOR: &str = "span.day-detail.clearfix";
pub const DESCRIPTION_SELECTOR: &str = "td.description";
pub const TEMP_SELECTOR: &str = "td.temp";
pub const PRECIP_SELECTOR: &str = "td.precip";
pub const WIND_SELECTOR: &str = "td.wind";
pub const HUMIDITY_SELECTOR: &str = "td.humidity";

/// Placeholder the page uses when a temperature is not forecast yet.
pub const MISSING_TEMP_PLACEHOLDER: &str = "--";

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Miles per kilometre.
pub const MPH_PER_KMH: f64 = 0.62137119;
