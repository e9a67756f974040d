use crate::config::ReportConfig;
use crate::records::{ExpenseRecord, InvoiceRecord, Record};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

pub fn total_where<T, P>(rows: &[T], pred: P) -> Decimal
where
    T: Record,
    P: Fn(&T) -> bool,
{
    rows.iter().filter(|r| pred(*r)).map(|r| r.amount()).sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearComparison {
    pub label: String,
    pub base_year: i32,
    pub base: Decimal,
    pub current_year: i32,
    pub current: Decimal,
}

impl YearComparison {
    pub fn change(&self) -> Decimal {
        self.current - self.base
    }

    /// Relative change in percent; `None` when the base is zero.
    pub fn change_pct(&self) -> Option<Decimal> {
        if self.base.is_zero() {
            None
        } else {
            Some(self.change() / self.base.abs() * dec!(100))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendReport {
    pub revenue: YearComparison,
    pub expenses: YearComparison,
    pub customer: YearComparison,
    pub sales_rep: YearComparison,
}

fn compare<T, P>(rows: &[T], label: String, config: &ReportConfig, pred: P) -> YearComparison
where
    T: Record,
    P: Fn(&T) -> bool,
{
    YearComparison {
        label,
        base_year: config.base_year,
        base: total_where(rows, |r| r.year() == config.base_year && pred(r)),
        current_year: config.comparison_year,
        current: total_where(rows, |r| r.year() == config.comparison_year && pred(r)),
    }
}

pub fn compare_years(
    expenses: &[ExpenseRecord],
    invoices: &[InvoiceRecord],
    config: &ReportConfig,
) -> TrendReport {
    TrendReport {
        revenue: compare(invoices, "Revenue".to_string(), config, |_| true),
        expenses: compare(expenses, "Expenses".to_string(), config, |_| true),
        customer: compare(invoices, config.focus_customer.clone(), config, |r| {
            r.customer == config.focus_customer
        }),
        sales_rep: compare(invoices, config.focus_sales_rep.clone(), config, |r| {
            r.sales_rep == config.focus_sales_rep
        }),
    }
}
