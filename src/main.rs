mod aggregate;
mod analysis;
mod charts;
mod config;
mod error;
mod extremes;
mod loader;
mod profile;
mod records;
mod report;
mod summary;
mod trend;

use crate::aggregate::{ProfitKeyPolicy, tail};
use crate::analysis::Analysis;
use crate::charts::{ChartRenderer, ChartSeries, ChartTheme};
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::extremes::{SortOrder, top_n};
use crate::loader::{Dataset, load_expenses, load_invoices};
use crate::profile::profile;
use crate::records::Record;
use crate::report::{
    format_columns, format_describe, format_extremes, format_groups, format_head, format_monthly,
    format_overview, format_summary, format_trends, heading,
};
use log::{LevelFilter, error};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, PartialEq)]
struct Args {
    expenses: PathBuf,
    invoices: PathBuf,
    output: PathBuf,
    verbose: bool,
    strict_months: bool,
}

const FLAGS: [&str; 3] = ["-v", "--verbose", "--strict-months"];

fn parse_args_from<I: IntoIterator<Item = String>>(raw: I) -> Args {
    let (flags, positional): (Vec<String>, Vec<String>) = raw
        .into_iter()
        .partition(|a| FLAGS.contains(&a.as_str()));
    let has_flag = |names: &[&str]| flags.iter().any(|f| names.contains(&f.as_str()));
    let mut positional = positional.into_iter();

    let expenses = positional
        .next()
        .unwrap_or_else(|| "expense_data.csv".to_string());
    let invoices = positional
        .next()
        .unwrap_or_else(|| "invoice_data.csv".to_string());
    let output = positional
        .next()
        .unwrap_or_else(|| "fintech_analysis_summary.png".to_string());

    Args {
        expenses: PathBuf::from(expenses),
        invoices: PathBuf::from(invoices),
        output: PathBuf::from(output),
        verbose: has_flag(&["-v", "--verbose"]),
        strict_months: has_flag(&["--strict-months"]),
    }
}

fn parse_args() -> Args {
    parse_args_from(std::env::args().skip(1))
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn report_config(args: &Args) -> ReportConfig {
    let profit_key_policy = if args.strict_months {
        ProfitKeyPolicy::Strict
    } else {
        ProfitKeyPolicy::ZeroFill
    };
    ReportConfig {
        profit_key_policy,
        ..ReportConfig::default()
    }
}

fn write_extremes<T: Record>(
    out: &mut impl Write,
    dataset: &Dataset<T>,
    n: usize,
    titles: [&str; 2],
) -> io::Result<()> {
    let largest = top_n(&dataset.records, n, SortOrder::Descending, |r| r.amount());
    let smallest = top_n(&dataset.records, n, SortOrder::Ascending, |r| r.amount());
    writeln!(out, "{}", format_extremes(titles[0], &largest))?;
    writeln!(out, "{}", format_extremes(titles[1], &smallest))
}

fn run(args: &Args, out: &mut impl Write) -> Result<(), ReportError> {
    let config = report_config(args);

    let expenses = load_expenses(&args.expenses)?;
    let invoices = load_invoices(&args.invoices)?;
    writeln!(out, "{}", format_overview(&expenses, &invoices))?;

    let expense_profile = profile(&expenses);
    let invoice_profile = profile(&invoices);
    writeln!(out, "\n{}", format_columns(&expense_profile))?;
    writeln!(out, "\n{}", format_columns(&invoice_profile))?;
    writeln!(out, "\n{}", format_head(&expense_profile))?;
    writeln!(out, "\n{}", format_head(&invoice_profile))?;
    writeln!(out, "\n{}", format_describe(&expense_profile))?;
    writeln!(out, "\n{}", format_describe(&invoice_profile))?;

    writeln!(out, "\n{}", heading("EXTREME VALUES ANALYSIS"))?;
    write_extremes(
        out,
        &expenses,
        config.extremes_n,
        ["TOP 10 LARGEST EXPENSES", "TOP 10 LARGEST REFUNDS/CREDITS"],
    )?;
    write_extremes(
        out,
        &invoices,
        config.extremes_n,
        [
            "TOP 10 LARGEST INVOICES",
            "LARGEST NEGATIVE INVOICES (Biggest Refunds)",
        ],
    )?;

    let analysis = Analysis::compute(&expenses.records, &invoices.records, &config)?;

    writeln!(out, "\n{}", heading("PROFIT IMPACT ANALYSIS"))?;
    let categories = &analysis.expense_by_category;
    let customers = &analysis.revenue_by_customer;
    writeln!(
        out,
        "{}",
        format_groups(
            "EXPENSE CATEGORIES (Total Spend)",
            "Category",
            &categories[..categories.len().min(config.table_n)]
        )
    )?;
    writeln!(
        out,
        "{}",
        format_groups(
            "REVENUE BY CUSTOMER (TOP 10)",
            "Customer",
            &customers[..customers.len().min(config.table_n)]
        )
    )?;
    writeln!(
        out,
        "{}",
        format_groups("SALES REP PERFORMANCE", "Sales_Rep", &analysis.sales_reps)
    )?;

    writeln!(out, "\n{}", heading("MONTHLY PROFIT TRENDS"))?;
    writeln!(
        out,
        "{}",
        format_monthly(tail(&analysis.monthly, config.monthly_tail))
    )?;

    writeln!(out, "\n{}", format_trends(&analysis.trends))?;
    writeln!(
        out,
        "\n{}",
        format_summary(&analysis.summary, &analysis.trends)
    )?;

    let series = ChartSeries::from_analysis(&analysis, &config);
    let omitted = series.omitted_categories();
    if !omitted.is_empty() {
        writeln!(
            out,
            "\nExpense categories left out of the pie (non-positive totals): {}",
            omitted.join(", ")
        )?;
    }

    let renderer = ChartRenderer::new(ChartTheme::default());
    match renderer.render(&series, &args.output) {
        Ok(()) => {
            writeln!(
                out,
                "\nVisualizations created and saved as '{}'",
                args.output.display()
            )?;
            writeln!(
                out,
                "Charts show: Profit trends, Customer concentration, \
                 Sales performance, Expense breakdown"
            )?;
            Ok(())
        }
        Err(e) => {
            writeln!(
                out,
                "\nChart rendering failed for '{}': {e}",
                args.output.display()
            )?;
            Err(e.into())
        }
    }
}

fn main() -> ExitCode {
    let args = parse_args();
    init_logging(args.verbose);

    match run(&args, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        // already written below the report text
        Err(ReportError::ChartRender(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    const EXPENSES: &str = "Date,Amount,description,Category,Vendor,Year,Month\n\
        2024-01-05,1000,Office,Rent,Landlord,2024,1\n\
        2024-02-05,200,Flight,Travel,Airline,2024,2\n\
        2025-01-05,900,Office,Rent,Landlord,2025,1\n";

    const INVOICES: &str = "Date,Amount,description,Customer,Sales_Rep,Year,Month\n\
        2024-01-10,2500,Job,Steven W. Quintin,SL,2024,1\n\
        2025-01-10,3000,Job,Steven W. Quintin,SL,2025,1\n\
        2025-01-12,-50,Refund,Acme,JD,2025,1\n";

    fn args(raw: &[&str]) -> Args {
        parse_args_from(raw.iter().map(|s| s.to_string()))
    }

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    fn fixture_args(expenses: &NamedTempFile, invoices: &NamedTempFile, output: PathBuf) -> Args {
        Args {
            expenses: expenses.path().to_path_buf(),
            invoices: invoices.path().to_path_buf(),
            output,
            verbose: false,
            strict_months: false,
        }
    }

    fn position(text: &str, needle: &str) -> usize {
        text.find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not in report"))
    }

    #[test]
    fn defaults_when_no_arguments() {
        let a = args(&[]);
        assert_eq!(a.expenses, PathBuf::from("expense_data.csv"));
        assert_eq!(a.invoices, PathBuf::from("invoice_data.csv"));
        assert_eq!(a.output, PathBuf::from("fintech_analysis_summary.png"));
        assert!(!a.verbose);
        assert!(!a.strict_months);
        assert_eq!(
            report_config(&a).profit_key_policy,
            ProfitKeyPolicy::ZeroFill
        );
    }

    #[test]
    fn flags_anywhere() {
        let a = args(&["exp.csv", "--verbose", "inv.csv", "--strict-months"]);
        assert_eq!(a.expenses, PathBuf::from("exp.csv"));
        assert_eq!(a.invoices, PathBuf::from("inv.csv"));
        assert_eq!(a.output, PathBuf::from("fintech_analysis_summary.png"));
        assert!(a.verbose);
        assert!(a.strict_months);
        assert_eq!(report_config(&a).profit_key_policy, ProfitKeyPolicy::Strict);
        assert!(args(&["-v"]).verbose);
    }

    #[test]
    fn missing_expense_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let a = Args {
            expenses: dir.path().join("nope.csv"),
            invoices: dir.path().join("nope_either.csv"),
            output: dir.path().join("out.png"),
            verbose: false,
            strict_months: false,
        };
        let mut out = Vec::new();
        assert!(matches!(run(&a, &mut out), Err(ReportError::DataLoad(_))));
        assert!(out.is_empty());
        assert!(!a.output.exists());
    }

    #[test]
    fn strict_months_fails_on_unmatched_month() {
        let (expenses, invoices) = (csv_file(EXPENSES), csv_file(INVOICES));
        let dir = TempDir::new().unwrap();
        let a = Args {
            strict_months: true,
            ..fixture_args(&expenses, &invoices, dir.path().join("out.png"))
        };

        let mut out = Vec::new();
        let err = run(&a, &mut out).unwrap_err();
        assert!(matches!(err, ReportError::Aggregate(_)));
        assert!(err.to_string().contains("2024-02"));
        assert!(!a.output.exists());
    }

    #[test]
    fn chart_failure_comes_after_full_report() {
        let (expenses, invoices) = (csv_file(EXPENSES), csv_file(INVOICES));
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("missing").join("summary.png");
        let a = fixture_args(&expenses, &invoices, output);

        let mut out = Vec::new();
        let result = run(&a, &mut out);
        assert!(matches!(result, Err(ReportError::ChartRender(_))));

        let text = String::from_utf8(out).unwrap();
        let order = [
            "Data loaded successfully!",
            "EXPENSE DATA OVERVIEW",
            "INVOICE DATA OVERVIEW",
            "EXPENSE DATA - First",
            "INVOICE DATA - First",
            "EXPENSE DATA - Basic Statistics",
            "INVOICE DATA - Basic Statistics",
            "EXTREME VALUES ANALYSIS",
            "PROFIT IMPACT ANALYSIS",
            "MONTHLY PROFIT TRENDS",
            "2024 vs 2025 COMPARISON",
            "EXECUTIVE SUMMARY",
            "TOP 3 PRIORITIES",
            "Chart rendering failed",
        ];
        let positions: Vec<usize> = order.iter().map(|h| position(&text, h)).collect();
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "sections out of order: {positions:?}"
        );
        assert_eq!(text.matches("Chart rendering failed").count(), 1);
        assert!(!text.contains("Visualizations created"));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn full_run_writes_chart() {
        let (expenses, invoices) = (csv_file(EXPENSES), csv_file(INVOICES));
        let dir = TempDir::new().unwrap();
        let a = fixture_args(&expenses, &invoices, dir.path().join("summary.png"));

        let mut out = Vec::new();
        run(&a, &mut out).unwrap();
        assert!(a.output.exists());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Visualizations created and saved as"));
    }
}
