use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::domain::AnnotatedObservation;
use crate::ports::{ChartError, ChartFormat, ChartSink};

/// Flat row, one per computed point
#[derive(Debug, Serialize)]
struct ChartRow {
    date: NaiveDate,
    close: f64,
    moving_average: f64,
    upper: f64,
    lower: f64,
}

impl ChartRow {
    fn from_point(point: &AnnotatedObservation) -> Option<Self> {
        point.bands.map(|b| Self {
            date: point.date,
            close: point.close,
            moving_average: b.moving_average,
            upper: b.upper,
            lower: b.lower,
        })
    }
}

/// Writes `<dir>/<SYMBOL>.<ext>` files, skipping points without bands
#[derive(Debug, Clone)]
pub struct FileChartWriter {
    dir: PathBuf,
    format: ChartFormat,
}

impl FileChartWriter {
    pub fn new(dir: impl Into<PathBuf>, format: ChartFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> ChartFormat {
        self.format
    }

    fn write_csv(path: &Path, rows: &[ChartRow]) -> Result<(), ChartError> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_json(path: &Path, rows: &[ChartRow]) -> Result<(), ChartError> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(file, rows)?;
        Ok(())
    }
}

impl ChartSink for FileChartWriter {
    fn export(&self, symbol: &str, points: &[AnnotatedObservation]) -> Result<PathBuf, ChartError> {
        fs::create_dir_all(&self.dir)?;

        let rows: Vec<ChartRow> = points.iter().filter_map(ChartRow::from_point).collect();
        let path = self.dir.join(format!("{}.{}", symbol, self.format.extension()));

        match self.format {
            ChartFormat::Csv => Self::write_csv(&path, &rows)?,
            ChartFormat::Json => Self::write_json(&path, &rows)?,
        }

        tracing::info!("Wrote {} chart rows for {} to {}", rows.len(), symbol, path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::strategy::compute_bands;
    use tempfile::tempdir;

    fn points() -> Vec<AnnotatedObservation> {
        let observations: Vec<Observation> = [10.0, 12.0, 14.0, 13.0]
            .iter()
            .enumerate()
            .map(|(i, &c)| Observation::new(NaiveDate::from_ymd_opt(2024, 4, 1 + i as u32).unwrap(), c))
            .collect();
        compute_bands(&observations, 3, 2.0).unwrap()
    }

    #[test]
    fn test_csv_skips_uncomputed_points() {
        let dir = tempdir().unwrap();
        let writer = FileChartWriter::new(dir.path().join("charts"), ChartFormat::Csv);

        let path = writer.export("IBM", &points()).unwrap();
        assert_eq!(path, dir.path().join("charts").join("IBM.csv"));

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "date,close,moving_average,upper,lower");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024-04-03,14.0,12.0,"));
    }

    #[test]
    fn test_json_rows() {
        let dir = tempdir().unwrap();
        let writer = FileChartWriter::new(dir.path(), ChartFormat::Json);
        assert_eq!(writer.dir(), dir.path());
        assert_eq!(writer.format(), ChartFormat::Json);

        let path = writer.export("IBM", &points()).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["date"], "2024-04-04");
        assert_eq!(rows[1]["close"], 13.0);
        assert!(rows[1]["upper"].as_f64().unwrap() > rows[1]["lower"].as_f64().unwrap());
    }
}
