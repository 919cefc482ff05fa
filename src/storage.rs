use crate::error::Result;
use crate::types::{DayRecord, NormalizedDayRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// On-disk shape of a raw row: the record plus a leading, unnamed positional index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexedDayRecord {
    #[serde(rename = "")]
    index: usize,
    day: String,
    date: String,
    desc: String,
    temp: String,
    precip: String,
    wind: String,
    humidity: String,
}

impl IndexedDayRecord {
    fn new(index: usize, record: &DayRecord) -> Self {
        Self {
            index,
            day: record.day.clone(),
            date: record.date.clone(),
            desc: record.desc.clone(),
            temp: record.temp.clone(),
            precip: record.precip.clone(),
            wind: record.wind.clone(),
            humidity: record.humidity.clone(),
        }
    }
}

impl From<IndexedDayRecord> for DayRecord {
    fn from(row: IndexedDayRecord) -> Self {
        Self {
            day: row.day,
            date: row.date,
            desc: row.desc,
            temp: row.temp,
            precip: row.precip,
            wind: row.wind,
            humidity: row.humidity,
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write scraped rows with a positional index column, in page order.
pub fn write_raw_records(path: &Path, records: &[DayRecord]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for (index, record) in records.iter().enumerate() {
        writer.serialize(IndexedDayRecord::new(index, record))?;
    }
    writer.flush()?;
    debug!("Wrote {} raw rows to {}", records.len(), path.display());
    Ok(())
}

/// Read scraped rows back, dropping the positional index column.
pub fn read_raw_records(path: &Path) -> Result<Vec<DayRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<IndexedDayRecord>() {
        records.push(row?.into());
    }
    debug!("Read {} raw rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn write_normalized_records(path: &Path, records: &[NormalizedDayRecord]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!("Wrote {} normalized rows to {}", records.len(), path.display());
    Ok(())
}

pub fn read_normalized_records(path: &Path) -> Result<Vec<NormalizedDayRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<NormalizedDayRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> DayRecord {
        DayRecord {
            day: "Fri".into(),
            date: "MAR 29".into(),
            desc: "Rain, possibly mixed".into(),
            temp: "55°/39°".into(),
            precip: "80%".into(),
            wind: "W 12 mph".into(),
            humidity: "71%".into(),
        }
    }

    #[test]
    fn test_raw_file_has_index_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("weather.csv");
        write_raw_records(&path, &[sample(), sample()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some(",day,date,desc,temp,precip,wind,humidity"));
        assert!(lines.next().unwrap().starts_with("0,Fri,MAR 29,"));
        assert!(lines.next().unwrap().starts_with("1,Fri,"));

        let back = read_raw_records(&path).unwrap();
        assert_eq!(back, vec![sample(), sample()]);
    }

    #[test]
    fn test_normalized_file_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("weather_clean.csv");
        let record = NormalizedDayRecord {
            day: "Fri".into(),
            date: NaiveDate::from_ymd_opt(2019, 3, 29).unwrap(),
            desc: "Rain".into(),
            precip: 80,
            wind: 19.3,
            humidity: 71,
            temp_hi: Some(12.0),
            temp_low: None,
        };
        write_normalized_records(&path, &[record.clone()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("day,date,desc,precip,wind,humidity,temp_hi,temp_low\n"));
        assert!(content.contains("Fri,2019-03-29,Rain,80,19.3,71,12.0,\n"));

        let back = read_normalized_records(&path).unwrap();
        assert_eq!(back, vec![record]);
    }
}
