use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Decimal,
    Integer,
    Text,
}

impl ColumnType {
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Decimal => "decimal",
            ColumnType::Integer => "int",
            ColumnType::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Amount,
    Year,
    Month,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::Amount,
        NumericColumn::Year,
        NumericColumn::Month,
    ];

    pub fn header(self) -> &'static str {
        match self {
            NumericColumn::Amount => "Amount",
            NumericColumn::Year => "Year",
            NumericColumn::Month => "Month",
        }
    }
}

/// A typed row of one of the two input files.
///
/// `SCHEMA` lists the required headers in file order. `party_headers` and
/// `parties` name the two free-text columns that differ between datasets
/// (Category/Vendor for expenses, Customer/Sales_Rep for invoices).
pub trait Record {
    const SCHEMA: &'static [(&'static str, ColumnType)];

    fn date(&self) -> NaiveDate;
    fn amount(&self) -> Decimal;
    fn description(&self) -> &str;
    fn year(&self) -> i32;
    fn month(&self) -> u32;
    fn party_headers() -> [&'static str; 2];
    fn parties(&self) -> [&str; 2];

    fn numeric(&self, column: NumericColumn) -> Decimal {
        match column {
            NumericColumn::Amount => self.amount(),
            NumericColumn::Year => Decimal::from(self.year()),
            NumericColumn::Month => Decimal::from(self.month()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub vendor: String,
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceRecord {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub customer: String,
    pub sales_rep: String,
    pub year: i32,
    pub month: u32,
}

impl Record for ExpenseRecord {
    const SCHEMA: &'static [(&'static str, ColumnType)] = &[
        ("Date", ColumnType::Date),
        ("Amount", ColumnType::Decimal),
        ("description", ColumnType::Text),
        ("Category", ColumnType::Text),
        ("Vendor", ColumnType::Text),
        ("Year", ColumnType::Integer),
        ("Month", ColumnType::Integer),
    ];

    fn date(&self) -> NaiveDate {
        self.date
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn year(&self) -> i32 {
        self.year
    }
    fn month(&self) -> u32 {
        self.month
    }
    fn party_headers() -> [&'static str; 2] {
        ["Category", "Vendor"]
    }
    fn parties(&self) -> [&str; 2] {
        [&self.category, &self.vendor]
    }
}

impl Record for InvoiceRecord {
    const SCHEMA: &'static [(&'static str, ColumnType)] = &[
        ("Date", ColumnType::Date),
        ("Amount", ColumnType::Decimal),
        ("description", ColumnType::Text),
        ("Customer", ColumnType::Text),
        ("Sales_Rep", ColumnType::Text),
        ("Year", ColumnType::Integer),
        ("Month", ColumnType::Integer),
    ];

    fn date(&self) -> NaiveDate {
        self.date
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn year(&self) -> i32 {
        self.year
    }
    fn month(&self) -> u32 {
        self.month
    }
    fn party_headers() -> [&'static str; 2] {
        ["Customer", "Sales_Rep"]
    }
    fn parties(&self) -> [&str; 2] {
        [&self.customer, &self.sales_rep]
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpenseRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Vendor")]
    pub vendor: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Month")]
    pub month: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InvoiceRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "Customer")]
    pub customer: String,
    #[serde(rename = "Sales_Rep")]
    pub sales_rep: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Month")]
    pub month: String,
}

pub fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim().replace([',', '$'], "");
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(t.date());
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

pub fn parse_year(s: &str) -> Option<i32> {
    s.trim().parse().ok()
}

pub fn parse_month(s: &str) -> Option<u32> {
    s.trim().parse().ok().filter(|m| (1..=12).contains(m))
}

pub fn q2(x: Decimal) -> Decimal {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
