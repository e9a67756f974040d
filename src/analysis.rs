use crate::aggregate::{
    Aggregate, AggregateError, MonthlyProfit, group_reduce, monthly_profit, monthly_sums,
    sorted_by_sum,
};
use crate::config::ReportConfig;
use crate::extremes::SortOrder;
use crate::records::{ExpenseRecord, InvoiceRecord};
use crate::summary::{ExecutiveSummary, summarize};
use crate::trend::{TrendReport, compare_years};

/// Everything the report and the charts need, derived once from the rows.
///
/// Group lists hold every group, sorted by descending sum; callers take
/// the top N they display.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub expense_by_category: Vec<(String, Aggregate)>,
    pub revenue_by_customer: Vec<(String, Aggregate)>,
    pub sales_reps: Vec<(String, Aggregate)>,
    pub monthly: Vec<MonthlyProfit>,
    pub trends: TrendReport,
    pub summary: ExecutiveSummary,
}

impl Analysis {
    pub fn compute(
        expenses: &[ExpenseRecord],
        invoices: &[InvoiceRecord],
        config: &ReportConfig,
    ) -> Result<Analysis, AggregateError> {
        let desc = SortOrder::Descending;
        let categories = group_reduce(expenses, |r| r.category.clone(), |r| r.amount);
        let customers = group_reduce(invoices, |r| r.customer.clone(), |r| r.amount);
        let reps = group_reduce(invoices, |r| r.sales_rep.clone(), |r| r.amount);
        let revenue_by_customer = sorted_by_sum(customers, desc);

        let monthly = monthly_profit(
            &monthly_sums(invoices),
            &monthly_sums(expenses),
            config.profit_key_policy,
        )?;

        let trends = compare_years(expenses, invoices, config);
        let summary = summarize(&trends, &revenue_by_customer, &monthly);

        Ok(Analysis {
            expense_by_category: sorted_by_sum(categories, desc),
            revenue_by_customer,
            sales_reps: sorted_by_sum(reps, desc),
            monthly,
            trends,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{MonthKey, ProfitKeyPolicy};
    use crate::records::parse_date;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expense(category: &str, amount: Decimal, year: i32, month: u32) -> ExpenseRecord {
        ExpenseRecord {
            date: parse_date(&format!("{year}-{month:02}-10")).unwrap(),
            amount,
            description: String::new(),
            category: category.to_string(),
            vendor: "V".to_string(),
            year,
            month,
        }
    }

    fn invoice(customer: &str, rep: &str, amount: Decimal, year: i32, month: u32) -> InvoiceRecord {
        InvoiceRecord {
            date: parse_date(&format!("{year}-{month:02}-20")).unwrap(),
            amount,
            description: String::new(),
            customer: customer.to_string(),
            sales_rep: rep.to_string(),
            year,
            month,
        }
    }

    fn fixture() -> (Vec<ExpenseRecord>, Vec<InvoiceRecord>) {
        let expenses = vec![
            expense("Rent", dec!(1000), 2024, 1),
            expense("Travel", dec!(200), 2024, 2),
            expense("Rent", dec!(500), 2024, 3),
            expense("Labor", dec!(900), 2025, 1),
        ];
        let invoices = vec![
            invoice("Steven W. Quintin", "SL", dec!(2500), 2024, 1),
            invoice("Acme", "JD", dec!(400), 2024, 3),
            invoice("Acme", "SL", dec!(-50), 2025, 1),
            invoice("Steven W. Quintin", "SL", dec!(3000), 2025, 1),
        ];
        (expenses, invoices)
    }

    #[test]
    fn groups_are_sorted_by_descending_sum() {
        let (expenses, invoices) = fixture();
        let a = Analysis::compute(&expenses, &invoices, &ReportConfig::default()).unwrap();

        let categories: Vec<_> = a
            .expense_by_category
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(categories, vec!["Rent", "Labor", "Travel"]);
        assert_eq!(a.expense_by_category[0].1.sum, dec!(1500));
        assert_eq!(a.sales_reps[0].0, "SL");
        assert_eq!(a.sales_reps[0].1.sum, dec!(5450));
        assert_eq!(a.revenue_by_customer[1].1.sum, dec!(350));
    }

    #[test]
    fn expense_only_month_has_negative_profit() {
        let (expenses, invoices) = fixture();
        let a = Analysis::compute(&expenses, &invoices, &ReportConfig::default()).unwrap();

        let feb = a
            .monthly
            .iter()
            .find(|m| m.key == MonthKey::new(2024, 2))
            .unwrap();
        assert_eq!(feb.revenue, Decimal::ZERO);
        assert_eq!(feb.profit(), dec!(-200));
        assert_eq!(a.monthly.len(), 4);
    }

    #[test]
    fn strict_policy_fails_on_mismatched_months() {
        let (expenses, invoices) = fixture();
        let config = ReportConfig {
            profit_key_policy: ProfitKeyPolicy::Strict,
            ..ReportConfig::default()
        };
        assert!(matches!(
            Analysis::compute(&expenses, &invoices, &config),
            Err(AggregateError::MonthlyProfitKeyMismatch { .. })
        ));
    }

    #[test]
    fn computing_twice_gives_identical_results() {
        let (expenses, invoices) = fixture();
        let config = ReportConfig::default();
        let first = Analysis::compute(&expenses, &invoices, &config).unwrap();
        let second = Analysis::compute(&expenses, &invoices, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn summary_reflects_trends() {
        let (expenses, invoices) = fixture();
        let a = Analysis::compute(&expenses, &invoices, &ReportConfig::default()).unwrap();
        assert_eq!(a.trends.revenue.base, dec!(2900));
        assert_eq!(a.trends.revenue.current, dec!(2950));
        assert_eq!(a.summary.base_profit, dec!(1200));
        assert_eq!(a.summary.current_profit, dec!(2050));
        let c = a.summary.concentration.as_ref().unwrap();
        assert_eq!(c.customer, "Steven W. Quintin");
    }
}
