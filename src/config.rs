use crate::aggregate::ProfitKeyPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub base_year: i32,
    pub comparison_year: i32,
    pub focus_customer: String,
    pub focus_sales_rep: String,
    pub extremes_n: usize,
    pub table_n: usize,
    pub monthly_tail: usize,
    pub chart_customers_n: usize,
    pub chart_categories_n: usize,
    pub profit_key_policy: ProfitKeyPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            base_year: 2024,
            comparison_year: 2025,
            focus_customer: "Steven W. Quintin".to_string(),
            focus_sales_rep: "SL".to_string(),
            extremes_n: 10,
            table_n: 10,
            monthly_tail: 12,
            chart_customers_n: 10,
            chart_categories_n: 8,
            profit_key_policy: ProfitKeyPolicy::ZeroFill,
        }
    }
}
