//! Bar charts of the normalized forecast, one SVG per chart kind.

use crate::error::{Result, ScraperError};
use crate::types::NormalizedDayRecord;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const HIGH_RED: RGBColor = RGBColor(229, 0, 0);
const LOW_LIGHT_BLUE: RGBColor = RGBColor(123, 200, 246);
const HUMIDITY_CYAN: RGBColor = RGBColor(0, 255, 255);
const PRECIP_BLUE: RGBColor = RGBColor(0, 143, 213);
const WIND_MAGENTA: RGBColor = RGBColor(194, 0, 120);

const SINGLE_SIZE: (u32, u32) = (1200, 600);
const GRID_SIZE: (u32, u32) = (1200, 900);

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartKind {
    Temperature,
    Humidity,
    Precipitation,
    Wind,
    /// All four metrics in a 2x2 grid
    All,
}

impl ChartKind {
    pub const EVERY: [ChartKind; 5] = [
        ChartKind::Temperature,
        ChartKind::Humidity,
        ChartKind::Precipitation,
        ChartKind::Wind,
        ChartKind::All,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Temperature => "temperature.svg",
            ChartKind::Humidity => "humidity.svg",
            ChartKind::Precipitation => "precipitation.svg",
            ChartKind::Wind => "wind.svg",
            ChartKind::All => "weather.svg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BarSeries {
    pub label: &'static str,
    pub color: RGBColor,
    pub values: Vec<Option<f64>>,
}

/// One set of axes: a title, its labels, and the bars drawn on it.
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: &'static str,
    pub x_label: Option<&'static str>,
    pub y_label: &'static str,
    pub day_names: Vec<String>,
    pub series: Vec<BarSeries>,
}

fn day_names(records: &[NormalizedDayRecord]) -> Vec<String> {
    records.iter().map(|r| r.day.clone()).collect()
}

fn temperature_panel(records: &[NormalizedDayRecord], x_label: Option<&'static str>) -> Panel {
    Panel {
        title: "Temperature through the week",
        x_label,
        y_label: "Temperature [*C]",
        day_names: day_names(records),
        series: vec![
            BarSeries {
                label: "Highest possible",
                color: HIGH_RED,
                values: records.iter().map(|r| r.temp_hi).collect(),
            },
            BarSeries {
                label: "Lowest possible",
                color: LOW_LIGHT_BLUE,
                values: records.iter().map(|r| r.temp_low).collect(),
            },
        ],
    }
}

fn humidity_panel(records: &[NormalizedDayRecord], x_label: Option<&'static str>) -> Panel {
    Panel {
        title: "Humidity through the week",
        x_label,
        y_label: "Humidity percentage",
        day_names: day_names(records),
        series: vec![BarSeries {
            label: "Humidity",
            color: HUMIDITY_CYAN,
            values: records.iter().map(|r| Some(f64::from(r.humidity))).collect(),
        }],
    }
}

fn precipitation_panel(records: &[NormalizedDayRecord]) -> Panel {
    Panel {
        title: "Precipitation through the week",
        x_label: Some("Weekdays"),
        y_label: "Precipitation percentage",
        day_names: day_names(records),
        series: vec![BarSeries {
            label: "Precipitation",
            color: PRECIP_BLUE,
            values: records.iter().map(|r| Some(f64::from(r.precip))).collect(),
        }],
    }
}

fn wind_panel(records: &[NormalizedDayRecord]) -> Panel {
    Panel {
        title: "Wind velocity through the week",
        x_label: Some("Weekdays"),
        y_label: "Wind velocity [km/h]",
        day_names: day_names(records),
        series: vec![BarSeries {
            label: "Wind velocity",
            color: WIND_MAGENTA,
            values: records.iter().map(|r| Some(r.wind)).collect(),
        }],
    }
}

/// Select the columns a chart kind shows. `All` yields the four grid panels in
/// reading order: temperature, humidity, precipitation, wind.
pub fn panels_for(records: &[NormalizedDayRecord], kind: ChartKind) -> Vec<Panel> {
    match kind {
        ChartKind::Temperature => vec![temperature_panel(records, Some("Weekday"))],
        ChartKind::Humidity => vec![humidity_panel(records, Some("Weekdays"))],
        ChartKind::Precipitation => vec![precipitation_panel(records)],
        ChartKind::Wind => vec![wind_panel(records)],
        ChartKind::All => vec![
            temperature_panel(records, None),
            humidity_panel(records, None),
            precipitation_panel(records),
            wind_panel(records),
        ],
    }
}

fn chart_error<E: std::fmt::Display>(err: E) -> ScraperError {
    ScraperError::Chart(err.to_string())
}

/// Y axis bounds covering every bar and the zero baseline, with headroom.
fn value_range(panel: &Panel) -> (f64, f64) {
    let (lo, hi) = panel
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let pad = ((hi - lo) * 0.1).max(1.0);
    let lo = if lo < 0.0 { lo - pad } else { 0.0 };
    (lo, hi + pad)
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    show_legend: bool,
) -> Result<()> {
    let days = panel.day_names.len();
    let (y_start, y_end) = value_range(panel);
    let labels = &panel.day_names;
    let formatter = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            labels.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d((0..days).into_segmented(), y_start..y_end)
        .map_err(chart_error)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(days)
            .x_label_formatter(&formatter)
            .y_desc(panel.y_label);
        if let Some(x_label) = panel.x_label {
            mesh.x_desc(x_label);
        }
        mesh.draw().map_err(chart_error)?;
    }

    // Later series are drawn over earlier ones, so lows sit inside highs.
    for series in &panel.series {
        let color = series.color;
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(8)
                    .data(
                        series
                            .values
                            .iter()
                            .enumerate()
                            .filter_map(|(i, v)| v.map(|v| (i, v))),
                    ),
            )
            .map_err(chart_error)?
            .label(series.label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if show_legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;
    }

    Ok(())
}

/// Render one chart kind into `out_dir`, returning the written file.
#[instrument(skip(records, out_dir), fields(rows = records.len()))]
pub fn render_chart(
    records: &[NormalizedDayRecord],
    kind: ChartKind,
    out_dir: &Path,
) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(ScraperError::NoData);
    }
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(kind.file_name());
    let panels = panels_for(records, kind);

    let size = if kind == ChartKind::All { GRID_SIZE } else { SINGLE_SIZE };
    let root = SVGBackend::new(&path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    if kind == ChartKind::All {
        let areas = root.split_evenly((2, 2));
        for (area, panel) in areas.iter().zip(&panels) {
            draw_panel(area, panel, false)?;
        }
    } else {
        for panel in &panels {
            draw_panel(&root, panel, true)?;
        }
    }

    root.present().map_err(chart_error)?;
    drop(root);
    debug!("Rendered {:?} chart to {}", kind, path.display());
    Ok(path)
}

/// Render every chart kind.
pub fn render_all(records: &[NormalizedDayRecord], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for kind in ChartKind::EVERY {
        written.push(render_chart(records, kind, out_dir)?);
    }
    info!("Rendered {} charts into {}", written.len(), out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(day: &str, hi: Option<f64>, low: Option<f64>) -> NormalizedDayRecord {
        NormalizedDayRecord {
            day: day.into(),
            date: NaiveDate::from_ymd_opt(2019, 3, 28).unwrap(),
            desc: "Cloudy".into(),
            precip: 20,
            wind: 16.1,
            humidity: 65,
            temp_hi: hi,
            temp_low: low,
        }
    }

    #[test]
    fn test_panels_for_all_is_two_by_two() {
        let records = vec![record("Thu", Some(10.0), Some(2.0))];
        let panels = panels_for(&records, ChartKind::All);
        let titles: Vec<_> = panels.iter().map(|p| p.title).collect();
        assert_eq!(
            titles,
            vec![
                "Temperature through the week",
                "Humidity through the week",
                "Precipitation through the week",
                "Wind velocity through the week",
            ]
        );
    }

    #[test]
    fn test_temperature_panel_has_high_and_low() {
        let records = vec![record("Thu", Some(10.0), Some(2.0)), record("Fri", None, Some(1.0))];
        let panels = panels_for(&records, ChartKind::Temperature);
        assert_eq!(panels.len(), 1);
        let series = &panels[0].series;
        assert_eq!(series[0].label, "Highest possible");
        assert_eq!(series[0].values, vec![Some(10.0), None]);
        assert_eq!(series[1].values, vec![Some(2.0), Some(1.0)]);
        assert_eq!(panels[0].day_names, vec!["Thu", "Fri"]);
    }

    #[test]
    fn test_value_range_includes_negative_values() {
        let records = vec![record("Thu", Some(4.0), Some(-6.0))];
        let panel = &panels_for(&records, ChartKind::Temperature)[0];
        let (lo, hi) = value_range(panel);
        assert!(lo < -6.0);
        assert!(hi > 4.0);
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = tempdir().unwrap();
        let records = vec![record("Thu", Some(10.0), Some(2.0)), record("Fri", Some(12.0), Some(3.0))];
        let path = render_chart(&records, ChartKind::Wind, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("wind.svg"));
        let svg = fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_empty_is_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            render_chart(&[], ChartKind::Temperature, dir.path()),
            Err(ScraperError::NoData)
        ));
    }
}
