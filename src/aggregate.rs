//! Group-by reductions and the monthly profit series.
//!
//! Sums are exact decimals. Rounding to cents happens only when a value is
//! displayed, so anything derived from a sum (profit, deltas, shares) uses
//! the unrounded figure.

use crate::extremes::SortOrder;
use crate::records::Record;
use log::warn;
use rust_decimal::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AggregateError {
    #[error(
        "monthly revenue and expense keys differ (revenue only: [{}], expenses only: [{}])",
        join_keys(.revenue_only),
        join_keys(.expense_only)
    )]
    MonthlyProfitKeyMismatch {
        revenue_only: Vec<MonthKey>,
        expense_only: Vec<MonthKey>,
    },
}

fn join_keys(keys: &[MonthKey]) -> String {
    keys.iter()
        .map(MonthKey::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

type Result<T> = core::result::Result<T, AggregateError>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    pub sum: Decimal,
    pub count: usize,
}

impl Aggregate {
    pub fn add(&mut self, value: Decimal) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.sum / Decimal::from(self.count)
        }
    }
}

/// Groups `rows` by `key` and reduces `value` into an [`Aggregate`] per
/// group. Groups come back in the order their key was first seen.
pub fn group_reduce<T, K, FK, FV>(rows: &[T], key: FK, value: FV) -> Vec<(K, Aggregate)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> Decimal,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Aggregate)> = Vec::new();

    for row in rows {
        let k = key(row);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Aggregate::default()));
            groups.len() - 1
        });
        groups[slot].1.add(value(row));
    }

    groups
}

pub fn sorted_by_sum<K>(mut groups: Vec<(K, Aggregate)>, order: SortOrder) -> Vec<(K, Aggregate)> {
    match order {
        SortOrder::Ascending => groups.sort_by(|a, b| a.1.sum.cmp(&b.1.sum)),
        SortOrder::Descending => groups.sort_by(|a, b| b.1.sum.cmp(&a.1.sum)),
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        MonthKey { year, month }
    }

    /// Calendar quarter, 1 to 4.
    pub fn quarter(&self) -> u32 {
        (self.month - 1) / 3 + 1
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Amount summed per (Year, Month), using the stored Year/Month columns.
pub fn monthly_sums<T: Record>(rows: &[T]) -> BTreeMap<MonthKey, Decimal> {
    let mut out = BTreeMap::new();
    for r in rows {
        *out.entry(MonthKey::new(r.year(), r.month()))
            .or_insert(Decimal::ZERO) += r.amount();
    }
    out
}

/// How to treat a month present in only one of the two series.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProfitKeyPolicy {
    /// The missing side counts as zero.
    #[default]
    ZeroFill,
    /// Differing key sets are an error.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyProfit {
    pub key: MonthKey,
    pub revenue: Decimal,
    pub expenses: Decimal,
}

impl MonthlyProfit {
    pub fn profit(&self) -> Decimal {
        self.revenue - self.expenses
    }
}

/// Revenue minus expenses for every month in the union of both key sets,
/// ascending by month.
pub fn monthly_profit(
    revenue: &BTreeMap<MonthKey, Decimal>,
    expenses: &BTreeMap<MonthKey, Decimal>,
    policy: ProfitKeyPolicy,
) -> Result<Vec<MonthlyProfit>> {
    let revenue_only: Vec<MonthKey> = revenue
        .keys()
        .filter(|k| !expenses.contains_key(k))
        .copied()
        .collect();
    let expense_only: Vec<MonthKey> = expenses
        .keys()
        .filter(|k| !revenue.contains_key(k))
        .copied()
        .collect();

    if !revenue_only.is_empty() || !expense_only.is_empty() {
        match policy {
            ProfitKeyPolicy::Strict => {
                return Err(AggregateError::MonthlyProfitKeyMismatch {
                    revenue_only,
                    expense_only,
                });
            }
            ProfitKeyPolicy::ZeroFill => warn!(
                "zero-filling {} month(s) without expenses and {} month(s) without revenue",
                revenue_only.len(),
                expense_only.len()
            ),
        }
    }

    let keys: BTreeSet<MonthKey> = revenue.keys().chain(expenses.keys()).copied().collect();
    Ok(keys
        .into_iter()
        .map(|key| MonthlyProfit {
            key,
            revenue: revenue.get(&key).copied().unwrap_or_default(),
            expenses: expenses.get(&key).copied().unwrap_or_default(),
        })
        .collect())
}

pub fn tail<T>(series: &[T], n: usize) -> &[T] {
    &series[series.len().saturating_sub(n)..]
}
