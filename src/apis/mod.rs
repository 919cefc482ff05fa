pub mod weather_com;

pub use weather_com::WeatherComCrawler;
