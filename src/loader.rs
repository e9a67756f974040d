use crate::records::{
    ColumnType, ExpenseRecord, ExpenseRow, InvoiceRecord, InvoiceRow, Record, parse_date,
    parse_decimal, parse_month, parse_year,
};
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort the run before any report is printed
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{} is missing required columns: {}", .path.display(), .missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("{} line {line}: column {column} has invalid value {value:?}", .path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
}

type Result<T> = core::result::Result<T, DataLoadError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    pub name: String,
    pub headers: Vec<String>,
    pub records: Vec<T>,
}

impl<T: Record> Dataset<T> {
    pub fn new(name: &str, records: Vec<T>) -> Self {
        Dataset {
            name: name.to_string(),
            headers: T::SCHEMA.iter().map(|(h, _)| h.to_string()).collect(),
            records,
        }
    }

    /// Column type for any header, extra columns being text.
    pub fn column_type(&self, header: &str) -> ColumnType {
        T::SCHEMA
            .iter()
            .find(|(h, _)| *h == header)
            .map(|(_, t)| *t)
            .unwrap_or(ColumnType::Text)
    }
}

struct BadCell {
    column: &'static str,
    value: String,
}

fn cell<V>(parsed: Option<V>, column: &'static str, raw: &str) -> core::result::Result<V, BadCell> {
    parsed.ok_or_else(|| BadCell {
        column,
        value: raw.to_string(),
    })
}

fn expense_from_row(row: ExpenseRow) -> core::result::Result<ExpenseRecord, BadCell> {
    Ok(ExpenseRecord {
        date: cell(parse_date(&row.date), "Date", &row.date)?,
        amount: cell(parse_decimal(&row.amount), "Amount", &row.amount)?,
        year: cell(parse_year(&row.year), "Year", &row.year)?,
        month: cell(parse_month(&row.month), "Month", &row.month)?,
        description: row.description,
        category: row.category,
        vendor: row.vendor,
    })
}

fn invoice_from_row(row: InvoiceRow) -> core::result::Result<InvoiceRecord, BadCell> {
    Ok(InvoiceRecord {
        date: cell(parse_date(&row.date), "Date", &row.date)?,
        amount: cell(parse_decimal(&row.amount), "Amount", &row.amount)?,
        year: cell(parse_year(&row.year), "Year", &row.year)?,
        month: cell(parse_month(&row.month), "Month", &row.month)?,
        description: row.description,
        customer: row.customer,
        sales_rep: row.sales_rep,
    })
}

pub fn load_expenses(path: &Path) -> Result<Dataset<ExpenseRecord>> {
    load_dataset(path, "expense", expense_from_row)
}

pub fn load_invoices(path: &Path) -> Result<Dataset<InvoiceRecord>> {
    load_dataset(path, "invoice", invoice_from_row)
}

fn load_dataset<R, T, F>(path: &Path, name: &str, convert: F) -> Result<Dataset<T>>
where
    R: DeserializeOwned,
    T: Record,
    F: Fn(R) -> core::result::Result<T, BadCell>,
{
    let csv_err = |source: csv::Error| DataLoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let f = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(f);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let missing: Vec<String> = T::SCHEMA
        .iter()
        .filter(|(h, _)| !headers.iter().any(|found| found == *h))
        .map(|(h, _)| h.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(csv_err)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let raw: R = row.deserialize(Some(&headers)).map_err(csv_err)?;
        let record = convert(raw).map_err(|bad| DataLoadError::InvalidValue {
            path: path.to_path_buf(),
            line,
            column: bad.column,
            value: bad.value,
        })?;
        records.push(record);
    }

    info!(
        "loaded {} {} rows from {}",
        records.len(),
        name,
        path.display()
    );
    debug!("{} headers: {:?}", name, headers);

    Ok(Dataset {
        headers: headers.iter().map(str::to_string).collect(),
        ..Dataset::new(name, records)
    })
}
