//! Console report sections
//!
//! Each function renders one section as a [`String`]; `main` prints them in
//! pipeline order. Tables are laid out with the [`tabled`] crate and every
//! amount is rounded to cents here, never earlier.

use crate::aggregate::{Aggregate, MonthlyProfit};
use crate::loader::Dataset;
use crate::profile::{DatasetProfile, Describe};
use crate::records::{Record, q2};
use crate::summary::ExecutiveSummary;
use crate::trend::{TrendReport, YearComparison};
use rust_decimal::prelude::*;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// `$1,234.56`, negatives as `-$1,234.56`.
pub fn money(d: Decimal) -> String {
    let d = q2(d);
    let sign = if d.is_sign_negative() && !d.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.2}", d.abs());
    let (int, frac) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{frac}")
}

/// Signed percentage with one decimal, or `n/a` when undefined.
pub fn pct(p: Option<Decimal>) -> String {
    match p {
        Some(p) => {
            let p = p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
            let sign = if p.is_sign_negative() && !p.is_zero() {
                ""
            } else {
                "+"
            };
            format!("{sign}{p:.1}%")
        }
        None => "n/a".to_string(),
    }
}

pub fn heading(title: &str) -> String {
    format!("=== {title} ===")
}

fn table(header: Vec<String>, rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder.build().to_string()
}

pub fn format_overview<E: Record, I: Record>(
    expenses: &Dataset<E>,
    invoices: &Dataset<I>,
) -> String {
    format!(
        "Data loaded successfully!\nExpense data shape: ({}, {})\nInvoice data shape: ({}, {})",
        expenses.records.len(),
        expenses.headers.len(),
        invoices.records.len(),
        invoices.headers.len()
    )
}

fn fixed(v: f64) -> String {
    format!("{v:.2}")
}

#[derive(Debug, Clone, Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    name: String,
    #[tabled(rename = "Type")]
    dtype: &'static str,
}

fn record_cells<T: Record>(r: &T) -> Vec<String> {
    let [a, b] = r.parties();
    vec![
        r.date().to_string(),
        money(r.amount()),
        r.description().to_string(),
        a.to_string(),
        b.to_string(),
    ]
}

fn record_header<T: Record>() -> Vec<String> {
    let [a, b] = T::party_headers();
    ["Date", "Amount", "description", a, b]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn format_columns<T>(profile: &DatasetProfile<'_, T>) -> String {
    let columns: Vec<ColumnRow> = profile
        .columns
        .iter()
        .map(|(name, t)| ColumnRow {
            name: name.clone(),
            dtype: t.name(),
        })
        .collect();
    format!(
        "{}\nShape: ({}, {})\n{}",
        heading(&format!("{} DATA OVERVIEW", profile.name.to_uppercase())),
        profile.rows,
        profile.columns.len(),
        Table::new(columns)
    )
}

pub fn format_head<T: Record>(profile: &DatasetProfile<'_, T>) -> String {
    let mut header = record_header::<T>();
    header.extend(["Year".to_string(), "Month".to_string()]);
    let rows = profile.head.iter().map(|r| {
        let mut cells = record_cells(r);
        cells.extend([r.year().to_string(), r.month().to_string()]);
        cells
    });
    format!(
        "{}\n{}",
        heading(&format!(
            "{} DATA - First {} rows",
            profile.name.to_uppercase(),
            profile.head.len()
        )),
        table(header, rows)
    )
}

pub fn format_describe<T>(profile: &DatasetProfile<'_, T>) -> String {
    let title = heading(&format!("{} DATA - Basic Statistics", profile.name.to_uppercase()));
    if profile.stats.is_empty() {
        return format!("{title}\nNo numeric data");
    }

    let mut header = vec![String::new()];
    header.extend(profile.stats.iter().map(|(c, _)| c.header().to_string()));
    let stat_rows: [(&str, fn(&Describe) -> String); 8] = [
        ("count", |d| d.count.to_string()),
        ("mean", |d| fixed(d.mean)),
        ("std", |d| d.std.map_or_else(|| "NaN".to_string(), fixed)),
        ("min", |d| fixed(d.min)),
        ("25%", |d| fixed(d.q25)),
        ("50%", |d| fixed(d.q50)),
        ("75%", |d| fixed(d.q75)),
        ("max", |d| fixed(d.max)),
    ];
    let rows = stat_rows.iter().map(|(label, stat)| {
        let mut cells = vec![label.to_string()];
        cells.extend(profile.stats.iter().map(|(_, d)| stat(d)));
        cells
    });
    format!("{title}\n{}", table(header, rows))
}

pub fn format_extremes<T: Record>(title: &str, rows: &[&T]) -> String {
    format!(
        "\n--- {title} ---\n{}",
        table(record_header::<T>(), rows.iter().map(|r| record_cells(*r)))
    )
}

pub fn format_groups(title: &str, key_header: &str, groups: &[(String, Aggregate)]) -> String {
    let header = [key_header, "sum", "count", "mean"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows = groups.iter().map(|(k, a)| {
        vec![
            k.clone(),
            format!("{:.2}", q2(a.sum)),
            a.count.to_string(),
            format!("{:.2}", q2(a.mean())),
        ]
    });
    format!("\n--- {title} ---\n{}", table(header, rows))
}

#[derive(Debug, Clone, Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Profit")]
    profit: String,
}

pub fn format_monthly(monthly: &[MonthlyProfit]) -> String {
    if monthly.is_empty() {
        return "No monthly data".to_string();
    }
    let rows: Vec<MonthRow> = monthly
        .iter()
        .map(|m| MonthRow {
            month: m.key.to_string(),
            revenue: money(m.revenue),
            expenses: money(m.expenses),
            profit: money(m.profit()),
        })
        .collect();
    format!("Monthly Profit Analysis:\n{}", Table::new(rows))
}

fn comparison_lines(c: &YearComparison, what: &str) -> String {
    format!(
        "{} {}{}: {}\n{} {}{} YTD: {}",
        c.label,
        c.base_year,
        what,
        money(c.base),
        c.label,
        c.current_year,
        what,
        money(c.current)
    )
}

pub fn format_trends(trends: &TrendReport) -> String {
    let r = &trends.revenue;
    [
        heading(&format!("{} vs {} COMPARISON", r.base_year, r.current_year)),
        "\n--- REVENUE COMPARISON ---".to_string(),
        comparison_lines(&trends.revenue, " Total"),
        "\n--- EXPENSE COMPARISON ---".to_string(),
        comparison_lines(&trends.expenses, " Total"),
        format!(
            "\n--- {} ACTIVITY ---",
            trends.customer.label.to_uppercase()
        ),
        comparison_lines(&trends.customer, ""),
        format!("\n--- {} SALES REP PERFORMANCE ---", trends.sales_rep.label),
        comparison_lines(&trends.sales_rep, ""),
    ]
    .join("\n")
}

pub fn format_summary(summary: &ExecutiveSummary, trends: &TrendReport) -> String {
    let years = format!(
        "{} YTD vs {}",
        trends.revenue.current_year, trends.revenue.base_year
    );
    let mut out = vec![
        heading("EXECUTIVE SUMMARY - KEY METRICS"),
        format!("BUSINESS HEALTH: {}", summary.health),
        format!(
            "Revenue Growth Rate: {} ({years})",
            pct(summary.revenue_change_pct)
        ),
        format!(
            "Expense Change: {} ({years})",
            pct(summary.expense_change_pct)
        ),
        format!(
            "Focus Customer Growth: {} ({})",
            pct(summary.customer_change_pct),
            trends.customer.label
        ),
        format!(
            "Focus Sales Rep Growth: {} ({})",
            pct(summary.sales_rep_change_pct),
            trends.sales_rep.label
        ),
    ];

    let concentration = summary.concentration.as_ref().map(|c| {
        let share = pct(Some(c.share_pct)).trim_start_matches('+').to_string();
        (share, c.customer.clone())
    });
    match &concentration {
        Some((share, customer)) => out.push(format!(
            "Customer Concentration Risk: {share} from one customer ({customer})"
        )),
        None => out.push("Customer Concentration Risk: n/a (no positive revenue)".to_string()),
    }

    out.push(format!(
        "{} YTD Profit: {} vs {}: {}",
        trends.revenue.current_year,
        money(summary.current_profit),
        trends.revenue.base_year,
        money(summary.base_profit)
    ));
    if let Some(q) = &summary.weakest_quarter {
        out.push(format!(
            "Weakest Quarter: Q{} (mean monthly profit {})",
            q.quarter,
            money(q.mean_profit)
        ));
    }

    out.push(String::new());
    out.push(heading("TOP 3 PRIORITIES"));
    out.push(match &concentration {
        Some((share, customer)) => {
            format!("1. CUSTOMER DIVERSIFICATION - Reduce {share} dependency on {customer}")
        }
        None => "1. CUSTOMER DIVERSIFICATION - Broaden the customer base".to_string(),
    });
    out.push(format!(
        "2. SALES REP DEVELOPMENT - Replicate {}'s {} growth",
        trends.sales_rep.label,
        pct(summary.sales_rep_change_pct)
    ));
    out.push(match &summary.weakest_quarter {
        Some(q) => format!("3. SEASONAL CASH FLOW - Plan for Q{} weakness", q.quarter),
        None => "3. SEASONAL CASH FLOW - Not enough monthly data".to_string(),
    });

    out.join("\n")
}
