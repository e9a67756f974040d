//! Summary chart rendering
//!
//! Draws the four presentation charts into a single 2x2 PNG using the
//! [`plotters`] bitmap backend:
//! - monthly profit (vertical bars)
//! - top customers by revenue (horizontal bars)
//! - sales rep revenue, ascending (horizontal bars)
//! - top expense categories (pie)

use crate::aggregate::{Aggregate, sorted_by_sum, tail};
use crate::analysis::Analysis;
use crate::config::ReportConfig;
use crate::extremes::SortOrder;
use log::{info, warn};
use plotters::coord::Shift;
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use rust_decimal::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid chart data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, ChartError>;

pub type Bar = (String, f64);

pub const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
pub const FOREST: RGBColor = RGBColor(0, 128, 0);
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Evenly spaced hues at fixed saturation and lightness.
pub fn husl_palette(n: usize) -> Vec<RGBColor> {
    (0..n)
        .map(|i| {
            let (r, g, b) = HSLColor(0.01 + i as f64 / n as f64, 0.65, 0.55)
                .to_backend_color()
                .rgb;
            RGBColor(r, g, b)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ChartTheme {
    pub size: (u32, u32),
    pub font_family: &'static str,
    pub title_size: f64,
    pub label_size: f64,
    pub profit_color: RGBColor,
    pub customer_color: RGBColor,
    pub sales_rep_color: RGBColor,
    pub palette: Vec<RGBColor>,
}

impl Default for ChartTheme {
    fn default() -> Self {
        ChartTheme {
            size: (1800, 1440),
            font_family: "sans-serif",
            title_size: 28.0,
            label_size: 16.0,
            profit_color: STEELBLUE,
            customer_color: FOREST,
            sales_rep_color: ORANGE,
            palette: husl_palette(8),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub monthly_profit: Vec<Bar>,
    pub top_customers: Vec<Bar>,
    pub sales_reps: Vec<Bar>,
    pub top_categories: Vec<Bar>,
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

impl ChartSeries {
    pub fn from_analysis(analysis: &Analysis, config: &ReportConfig) -> ChartSeries {
        let bars = |groups: &[(String, Aggregate)], n: usize| -> Vec<Bar> {
            groups
                .iter()
                .take(n)
                .map(|(k, a)| (k.clone(), to_f64(a.sum)))
                .collect()
        };

        let reps_ascending = sorted_by_sum(analysis.sales_reps.clone(), SortOrder::Ascending);

        ChartSeries {
            monthly_profit: tail(&analysis.monthly, config.monthly_tail)
                .iter()
                .map(|m| (m.key.to_string(), to_f64(m.profit())))
                .collect(),
            top_customers: bars(&analysis.revenue_by_customer, config.chart_customers_n),
            sales_reps: bars(&reps_ascending, usize::MAX),
            top_categories: bars(&analysis.expense_by_category, config.chart_categories_n),
        }
    }

    /// Categories that cannot form a pie slice (non-positive totals).
    pub fn omitted_categories(&self) -> Vec<&str> {
        self.top_categories
            .iter()
            .filter(|(_, v)| *v <= 0.0)
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

/// Axis range covering every value and zero, padded by 10%.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.1).max(1.0);
    let lo = if lo < 0.0 { lo - pad } else { 0.0 };
    lo..hi + pad
}

fn segment_label(v: &SegmentValue<i32>, labels: &[&str]) -> String {
    match v {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Short money label for axes, e.g. `$1.2M`.
fn compact_money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let a = v.abs();
    if a >= 1_000_000.0 {
        format!("{sign}${:.1}M", a / 1_000_000.0)
    } else if a >= 1_000.0 {
        format!("{sign}${:.1}k", a / 1_000.0)
    } else {
        format!("{sign}${a:.0}")
    }
}

pub struct ChartRenderer {
    theme: ChartTheme,
}

impl ChartRenderer {
    pub fn new(theme: ChartTheme) -> Self {
        ChartRenderer { theme }
    }

    /// Draws the 2x2 summary grid and writes it to `output_path`,
    /// replacing any existing file.
    pub fn render(&self, series: &ChartSeries, output_path: &Path) -> Result<()> {
        let (w, h) = self.theme.size;
        if w == 0 || h == 0 {
            let msg = format!("canvas size {w}x{h} has no area");
            return Err(ChartError::InvalidData(msg));
        }
        if self.theme.palette.is_empty() {
            return Err(ChartError::InvalidData("palette is empty".to_string()));
        }

        let root = BitMapBackend::new(output_path, self.theme.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| ChartError::DrawingArea(e.to_string()))?;

        let panels = root.split_evenly((2, 2));
        self.draw_columns(
            &panels[0],
            "Monthly Profit Trends",
            "Profit ($)",
            &series.monthly_profit,
            self.theme.profit_color,
        )?;
        self.draw_rows(
            &panels[1],
            "Top Customers by Revenue",
            "Revenue ($)",
            &series.top_customers,
            self.theme.customer_color,
        )?;
        self.draw_rows(
            &panels[2],
            "Sales Rep Performance",
            "Revenue ($)",
            &series.sales_reps,
            self.theme.sales_rep_color,
        )?;
        self.draw_pie(&panels[3], "Top Expense Categories", &series.top_categories)?;

        root.present().map_err(|e| ChartError::Drawing(e.to_string()))?;

        info!("wrote summary charts to {}", output_path.display());
        Ok(())
    }

    fn draw_columns<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        title: &str,
        y_desc: &str,
        bars: &[Bar],
        color: RGBColor,
    ) -> Result<()> {
        if bars.is_empty() {
            return self.draw_empty(area, title);
        }

        let labels: Vec<&str> = bars.iter().map(|(k, _)| k.as_str()).collect();
        let n = bars.len() as i32;
        let font = self.theme.font_family;

        let mut chart = ChartBuilder::on(area)
            .caption(title, (font, self.theme.title_size))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(
                (0..n).into_segmented(),
                value_range(bars.iter().map(|b| b.1)),
            )
            .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|v| segment_label(v, &labels))
            .y_desc(y_desc)
            .y_label_formatter(&|v| compact_money(*v))
            .label_style((font, self.theme.label_size))
            .draw()
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(6)
                    .data(bars.iter().enumerate().map(|(i, b)| (i as i32, b.1))),
            )
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        Ok(())
    }

    fn draw_rows<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        title: &str,
        x_desc: &str,
        bars: &[Bar],
        color: RGBColor,
    ) -> Result<()> {
        if bars.is_empty() {
            return self.draw_empty(area, title);
        }

        let labels: Vec<&str> = bars.iter().map(|(k, _)| k.as_str()).collect();
        let n = bars.len() as i32;
        let font = self.theme.font_family;

        let mut chart = ChartBuilder::on(area)
            .caption(title, (font, self.theme.title_size))
            .margin(15)
            .x_label_area_size(50)
            .y_label_area_size(170)
            .build_cartesian_2d(
                value_range(bars.iter().map(|b| b.1)),
                (0..n).into_segmented(),
            )
            .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(bars.len())
            .y_label_formatter(&|v| segment_label(v, &labels))
            .x_desc(x_desc)
            .x_label_formatter(&|v| compact_money(*v))
            .label_style((font, self.theme.label_size))
            .draw()
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        chart
            .draw_series(
                Histogram::horizontal(&chart)
                    .style(color.filled())
                    .margin(4)
                    .data(bars.iter().enumerate().map(|(i, b)| (i as i32, b.1))),
            )
            .map_err(|e| ChartError::Drawing(e.to_string()))?;

        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        title: &str,
        slices: &[Bar],
    ) -> Result<()> {
        let (labels, sizes): (Vec<String>, Vec<f64>) =
            slices.iter().filter(|(_, v)| *v > 0.0).cloned().unzip();
        if sizes.len() < slices.len() {
            warn!(
                "{} non-positive categories left out of the pie",
                slices.len() - sizes.len()
            );
        }
        if sizes.is_empty() {
            return self.draw_empty(area, title);
        }

        let font = self.theme.font_family;
        let area = area
            .titled(title, (font, self.theme.title_size))
            .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = f64::from(w.min(h)) * 0.32;
        let colors: Vec<RGBColor> = self
            .theme
            .palette
            .iter()
            .cycle()
            .take(sizes.len())
            .copied()
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style((font, self.theme.label_size));
        pie.percentages((font, self.theme.label_size));

        area.draw(&pie).map_err(|e| ChartError::Drawing(e.to_string()))?;
        Ok(())
    }

    fn draw_empty<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        title: &str,
    ) -> Result<()> {
        let font = self.theme.font_family;
        let area = area
            .titled(title, (font, self.theme.title_size))
            .map_err(|e| ChartError::DrawingArea(e.to_string()))?;
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            "No data",
            (w as i32 / 2 - 30, h as i32 / 2),
            (font, self.theme.label_size),
        ))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ExpenseRecord, InvoiceRecord, parse_date};
    use rust_decimal_macros::dec;
    use std::fs;

    fn analysis() -> Analysis {
        let mut expenses = Vec::new();
        let mut invoices = Vec::new();
        for i in 0..14u32 {
            let (year, month) = (2024 + (i / 12) as i32, i % 12 + 1);
            let date = parse_date(&format!("{year}-{month:02}-01")).unwrap();
            expenses.push(ExpenseRecord {
                date,
                amount: Decimal::from(100 + i),
                description: String::new(),
                category: format!("Cat{}", i % 10),
                vendor: "V".to_string(),
                year,
                month,
            });
            invoices.push(InvoiceRecord {
                date,
                amount: Decimal::from(1000 * (i + 1)),
                description: String::new(),
                customer: format!("Customer {i}"),
                sales_rep: ["SL", "JD", "AB"][(i % 3) as usize].to_string(),
                year,
                month,
            });
        }
        expenses.push(ExpenseRecord {
            date: parse_date("2025-02-02").unwrap(),
            amount: dec!(-5000),
            description: "credit".to_string(),
            category: "Cat3".to_string(),
            vendor: "V".to_string(),
            year: 2025,
            month: 2,
        });
        Analysis::compute(&expenses, &invoices, &ReportConfig::default()).unwrap()
    }

    #[test]
    fn series_follow_configured_sizes() {
        let series = ChartSeries::from_analysis(&analysis(), &ReportConfig::default());

        assert_eq!(series.monthly_profit.len(), 12);
        assert_eq!(series.monthly_profit[0].0, "2024-03");
        assert_eq!(series.monthly_profit[11].0, "2025-02");
        assert_eq!(series.top_customers.len(), 10);
        assert_eq!(
            series.top_customers[0],
            ("Customer 13".to_string(), 14000.0)
        );
        assert_eq!(series.sales_reps.len(), 3);
        assert!(series.sales_reps.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(series.top_categories.len(), 8);
    }

    #[test]
    fn negative_categories_are_omitted_from_pie() {
        let series = ChartSeries::from_analysis(&analysis(), &ReportConfig::default());
        assert!(series.top_categories.iter().all(|(k, _)| k != "Cat3"));

        let series = ChartSeries {
            top_categories: vec![("Rent".to_string(), 10.0), ("Refunds".to_string(), -4.0)],
            ..series
        };
        assert_eq!(series.omitted_categories(), vec!["Refunds"]);
    }

    #[test]
    fn value_range_always_includes_zero() {
        let r = value_range([5.0, 20.0].into_iter());
        assert_eq!(r.start, 0.0);
        assert!(r.end > 20.0);

        let r = value_range([-50.0, 10.0].into_iter());
        assert!(r.start < -50.0);
        assert!(r.end > 10.0);

        let r = value_range(std::iter::empty());
        assert_eq!(r, 0.0..1.0);
    }

    #[test]
    fn labels_and_money_ticks() {
        let labels = ["a", "b"];
        assert_eq!(segment_label(&SegmentValue::CenterOf(1), &labels), "b");
        assert_eq!(segment_label(&SegmentValue::CenterOf(5), &labels), "");
        assert_eq!(segment_label(&SegmentValue::Exact(0), &labels), "");
        assert_eq!(compact_money(1_240_000.0), "$1.2M");
        assert_eq!(compact_money(-2_500.0), "-$2.5k");
        assert_eq!(compact_money(42.0), "$42");
    }

    #[test]
    fn palette_has_distinct_colors() {
        let palette = husl_palette(8);
        assert_eq!(palette.len(), 8);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let renderer = ChartRenderer::new(ChartTheme {
            size: (0, 600),
            ..ChartTheme::default()
        });
        let series = ChartSeries::from_analysis(&analysis(), &ReportConfig::default());
        let out = std::env::temp_dir().join("never_written.png");
        assert!(matches!(
            renderer.render(&series, &out),
            Err(ChartError::InvalidData(_))
        ));
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn renders_summary_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.png");
        let series = ChartSeries::from_analysis(&analysis(), &ReportConfig::default());

        ChartRenderer::new(ChartTheme::default())
            .render(&series, &out)
            .unwrap();
        assert!(fs::metadata(&out).unwrap().len() > 0);
    }

    #[test]
    fn missing_output_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("summary.png");
        let series = ChartSeries::from_analysis(&analysis(), &ReportConfig::default());

        let renderer = ChartRenderer::new(ChartTheme::default());
        assert!(renderer.render(&series, &out).is_err());
        assert!(!out.exists());
    }
}
