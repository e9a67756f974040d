//! Shape, schema and summary statistics for a loaded dataset.

use crate::loader::Dataset;
use crate::records::{ColumnType, NumericColumn, Record};
use rust_decimal::prelude::*;

pub const HEAD_ROWS: usize = 5;

/// Descriptive statistics of one numeric column.
///
/// `std` is the sample standard deviation and is absent for fewer than two
/// values. Quantiles use linear interpolation between closest ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn from_values(values: &[f64]) -> Option<Describe> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Some(Describe {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetProfile<'a, T> {
    pub name: String,
    pub rows: usize,
    pub columns: Vec<(String, ColumnType)>,
    pub head: &'a [T],
    pub stats: Vec<(NumericColumn, Describe)>,
}

pub fn profile<T: Record>(dataset: &Dataset<T>) -> DatasetProfile<'_, T> {
    let columns = dataset
        .headers
        .iter()
        .map(|h| (h.clone(), dataset.column_type(h)))
        .collect();

    let stats = NumericColumn::ALL
        .iter()
        .filter_map(|&col| {
            let values: Vec<f64> = dataset
                .records
                .iter()
                .map(|r| r.numeric(col).to_f64().unwrap_or_default())
                .collect();
            Describe::from_values(&values).map(|d| (col, d))
        })
        .collect();

    DatasetProfile {
        name: dataset.name.clone(),
        rows: dataset.records.len(),
        columns,
        head: &dataset.records[..dataset.records.len().min(HEAD_ROWS)],
        stats,
    }
}
