//! Executive summary figures, all derived from the aggregates and trends.

use crate::aggregate::{Aggregate, MonthlyProfit, group_reduce};
use crate::trend::{TrendReport, YearComparison};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// Comparison year profitable and revenue did not shrink.
    Strong,
    /// Comparison year profitable.
    Stable,
    Weak,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Health::Strong => "STRONG",
            Health::Stable => "STABLE",
            Health::Weak => "WEAK",
        };
        f.write_str(s)
    }
}

/// Largest customer and its share of total revenue in percent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concentration {
    pub customer: String,
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeakQuarter {
    pub quarter: u32,
    pub mean_profit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutiveSummary {
    pub health: Health,
    pub revenue_change_pct: Option<Decimal>,
    pub expense_change_pct: Option<Decimal>,
    pub customer_change_pct: Option<Decimal>,
    pub sales_rep_change_pct: Option<Decimal>,
    pub concentration: Option<Concentration>,
    pub base_profit: Decimal,
    pub current_profit: Decimal,
    pub weakest_quarter: Option<WeakQuarter>,
}

fn profit(revenue: &YearComparison, expenses: &YearComparison) -> (Decimal, Decimal) {
    (
        revenue.base - expenses.base,
        revenue.current - expenses.current,
    )
}

/// `customers` must be sorted by descending revenue.
fn concentration(customers: &[(String, Aggregate)]) -> Option<Concentration> {
    let total: Decimal = customers.iter().map(|(_, a)| a.sum).sum();
    let (name, top) = customers.first()?;
    if total <= Decimal::ZERO {
        return None;
    }
    Some(Concentration {
        customer: name.clone(),
        share_pct: top.sum / total * dec!(100),
    })
}

fn weakest_quarter(monthly: &[MonthlyProfit]) -> Option<WeakQuarter> {
    let mut quarters = group_reduce(monthly, |m| m.key.quarter(), MonthlyProfit::profit);
    quarters.sort_by_key(|(q, _)| *q);
    quarters
        .into_iter()
        .map(|(quarter, agg)| WeakQuarter {
            quarter,
            mean_profit: agg.mean(),
        })
        .reduce(|weakest, q| {
            if q.mean_profit < weakest.mean_profit {
                q
            } else {
                weakest
            }
        })
}

pub fn summarize(
    trends: &TrendReport,
    customers: &[(String, Aggregate)],
    monthly: &[MonthlyProfit],
) -> ExecutiveSummary {
    let (base_profit, current_profit) = profit(&trends.revenue, &trends.expenses);

    let health = if current_profit > Decimal::ZERO && trends.revenue.change() >= Decimal::ZERO {
        Health::Strong
    } else if current_profit > Decimal::ZERO {
        Health::Stable
    } else {
        Health::Weak
    };

    ExecutiveSummary {
        health,
        revenue_change_pct: trends.revenue.change_pct(),
        expense_change_pct: trends.expenses.change_pct(),
        customer_change_pct: trends.customer.change_pct(),
        sales_rep_change_pct: trends.sales_rep.change_pct(),
        concentration: concentration(customers),
        base_profit,
        current_profit,
        weakest_quarter: weakest_quarter(monthly),
    }
}
