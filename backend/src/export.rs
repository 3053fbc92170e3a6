//! Tabular and CSV projections of prediction results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{CoreError, CoreResult, ErrorContext};
use crate::models::{PredictionSeries, RiskLevel, SafeWindow};

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionExportRow {
    pub date: NaiveDate,
    pub demand: f64,
    pub risk: f64,
    pub risk_level: String,
    pub in_safe_window: bool,
}

/// Flatten a prediction series, marking days inside `window`.
pub fn prediction_rows(
    series: &PredictionSeries,
    window: Option<&SafeWindow>,
) -> Vec<PredictionExportRow> {
    series
        .rows()
        .enumerate()
        .map(|(i, row)| PredictionExportRow {
            date: row.date,
            demand: row.demand,
            risk: row.risk,
            risk_level: RiskLevel::from_probability(row.risk).label().to_string(),
            in_safe_window: window.is_some_and(|w| w.contains_index(i)),
        })
        .collect()
}

/// Write rows as CSV with a header line.
pub fn write_predictions_csv<W: io::Write>(
    writer: W,
    rows: &[PredictionExportRow],
) -> CoreResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(|e| {
        CoreError::Export {
            message: e.to_string(),
            context: ErrorContext::new("write_predictions_csv"),
        }
    })
}

/// Render rows as a CSV string.
pub fn predictions_csv_string(rows: &[PredictionExportRow]) -> CoreResult<String> {
    let mut buf = Vec::new();
    write_predictions_csv(&mut buf, rows)?;
    String::from_utf8(buf).map_err(|e| CoreError::export(e.to_string()))
}

/// Write rows to a CSV file, creating or truncating it.
pub fn write_predictions_csv_file<P: AsRef<Path>>(
    path: P,
    rows: &[PredictionExportRow],
) -> CoreResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| CoreError::Export {
        message: format!("Failed to create {}: {}", path.display(), e),
        context: ErrorContext::new("write_predictions_csv_file"),
    })?;
    write_predictions_csv(file, rows)
}
