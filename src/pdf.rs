use std::io::BufWriter;

use printpdf::*;

use crate::error::{AppError, Result};
use crate::fmt::{money, percent, ratio};
use crate::models::{Company, LedgerEntry, MarketRisk};
use crate::reports::*;
use crate::trading::SaleAnalysis;

// A4 dimensions (mm)
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_BOTTOM: f32 = 20.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 15.0;
const CONTENT_W: f32 = PAGE_W - MARGIN_LEFT - MARGIN_RIGHT;
const ROW_H: f32 = 5.0;
const FONT_SIZE: f32 = 9.0;
const TITLE_SIZE: f32 = 16.0;
const SUBTITLE_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 12.0;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn chars_that_fit(width: f32, size: f32) -> usize {
    ((width - 1.5) / (size * 0.18)).max(1.0) as usize
}

fn pdf_err(e: impl std::fmt::Debug) -> AppError {
    AppError::Pdf(format!("{e:?}"))
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Col {
    width: f32,
    align: Align,
}

const fn left(width: f32) -> Col {
    Col { width, align: Align::Left }
}

const fn right(width: f32) -> Col {
    Col { width, align: Align::Right }
}

struct PdfWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    current_page: PdfPageIndex,
    current_layer: PdfLayerIndex,
    y: f32,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let font_bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
        Ok(Self {
            doc,
            font,
            font_bold,
            current_page: page,
            current_layer: layer,
            y: MARGIN_TOP,
        })
    }

    fn pdf_y(&self) -> f32 {
        PAGE_H - self.y
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer");
        self.current_page = page;
        self.current_layer = layer;
        self.y = MARGIN_TOP;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y + needed > PAGE_H - MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn text(&self, s: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        let layer = self.doc.get_page(self.current_page).get_layer(self.current_layer);
        layer.use_text(s, size, Mm(x), Mm(self.pdf_y()), font);
    }

    fn hline(&self, x1: f32, x2: f32) {
        let layer = self.doc.get_page(self.current_page).get_layer(self.current_layer);
        layer.set_outline_thickness(0.5);
        let line = Line {
            points: vec![
                (Point::new(Mm(x1), Mm(self.pdf_y())), false),
                (Point::new(Mm(x2), Mm(self.pdf_y())), false),
            ],
            is_closed: false,
        };
        layer.add_line(line);
    }

    fn header(&mut self, title: &str, company: &str, period: &str) {
        self.text(title, MARGIN_LEFT, TITLE_SIZE, true);
        self.y += 7.0;
        if !company.is_empty() {
            self.text(company, MARGIN_LEFT, SUBTITLE_SIZE, false);
            self.y += 5.0;
        }
        self.text(period, MARGIN_LEFT, SUBTITLE_SIZE, false);
        self.y += 5.0;
        let ts = chrono::Local::now().format("Generated %Y-%m-%d %H:%M").to_string();
        self.text(&ts, MARGIN_LEFT, 8.0, false);
        self.y += 5.0;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 6.0;
    }

    fn heading(&mut self, label: &str) {
        self.ensure_space(ROW_H * 4.0);
        self.y += 2.0;
        self.text(label, MARGIN_LEFT, HEADING_SIZE, true);
        self.y += ROW_H + 1.0;
    }

    fn cells(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        let wrapped: Vec<Vec<String>> = cols
            .iter()
            .zip(values)
            .map(|(col, v)| {
                textwrap::wrap(v, chars_that_fit(col.width, FONT_SIZE))
                    .into_iter()
                    .map(|l| l.into_owned())
                    .collect()
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        self.ensure_space(ROW_H * lines as f32);
        for line in 0..lines {
            let mut x = MARGIN_LEFT;
            for (col, cell) in cols.iter().zip(&wrapped) {
                if let Some(s) = cell.get(line) {
                    match col.align {
                        Align::Left => self.text(s, x, FONT_SIZE, bold),
                        Align::Right => {
                            let tw = approx_text_width(s, FONT_SIZE);
                            self.text(s, x + col.width - tw - 1.0, FONT_SIZE, bold);
                        }
                    }
                }
                x += col.width;
            }
            self.y += ROW_H;
        }
    }

    fn table_header(&mut self, cols: &[Col], headers: &[&str]) {
        self.ensure_space(ROW_H * 3.0);
        self.cells(cols, headers, true);
        self.y -= 3.5;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 3.5;
    }

    fn table_row(&mut self, cols: &[Col], values: &[&str], bold: bool) {
        self.cells(cols, values, bold);
    }

    fn paragraph(&mut self, text: &str) {
        for line in textwrap::wrap(text, chars_that_fit(CONTENT_W, FONT_SIZE)) {
            self.ensure_space(ROW_H);
            self.text(&line, MARGIN_LEFT, FONT_SIZE, false);
            self.y += ROW_H;
        }
    }

    fn blank_row(&mut self) {
        self.y += ROW_H;
    }

    fn separator(&mut self) {
        self.y -= 3.5;
        self.hline(MARGIN_LEFT, PAGE_W - MARGIN_RIGHT);
        self.y += 3.5;
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(pdf_err)?;
        buf.into_inner().map_err(|e| AppError::Pdf(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Financial report
// ---------------------------------------------------------------------------

pub fn render_financial_report(input: &ReportInput, period: PeriodType) -> Result<Vec<u8>> {
    let year = input.selected().year;
    let mut pdf = PdfWriter::new("Financial Report")?;
    pdf.header(
        "Financial Report",
        &input.company.name,
        &format!("Fiscal year {year} ({})", period.label()),
    );

    let kv = &[left(110.0), right(CONTENT_W - 110.0)];

    let d = dashboard(input);
    pdf.heading("Summary");
    let growth = d.yoy_growth.map(percent).unwrap_or_else(|| "-".to_string());
    for (label, value) in [
        ("Annual revenue", money(d.annual_revenue)),
        ("Net profit", money(d.net_profit)),
        ("Net profit margin", percent(d.net_margin)),
        ("Net cash flow", money(d.net_cash_flow)),
        ("Revenue growth (YoY)", growth),
    ] {
        pdf.table_row(kv, &[label, &value], false);
    }

    let stmt = income_statement(input, period);
    pdf.heading("Income Statement");
    let icols = &[left(30.0), right(30.0), right(30.0), right(30.0), right(30.0), right(30.0)];
    pdf.table_header(icols, &["Period", "Revenue", "Gross Profit", "Operating", "Tax", "Net Profit"]);
    for r in stmt.rows.iter().chain(std::iter::once(&stmt.total)) {
        let bold = std::ptr::eq(r, &stmt.total);
        if bold {
            pdf.separator();
        }
        let vals = [
            money(r.revenue),
            money(r.gross_profit),
            money(r.operating_profit),
            money(r.tax),
            money(r.net_profit),
        ];
        pdf.table_row(icols, &[&r.label, &vals[0], &vals[1], &vals[2], &vals[3], &vals[4]], bold);
    }

    pdf.heading("Balance Sheet");
    match balance_sheet_summary(input) {
        Some(bs) => {
            let s = &bs.sheet;
            for (label, value, bold) in [
                ("Current assets", s.current_assets, false),
                ("Fixed assets", s.fixed_assets, false),
                ("Total assets", bs.total_assets, true),
                ("Short-term liabilities", s.short_term_liabilities, false),
                ("Long-term liabilities", s.long_term_liabilities, false),
                ("Total liabilities", bs.total_liabilities, true),
                ("Owner equity", s.owner_equity, false),
                ("Retained earnings", s.retained_earnings, false),
                ("Total equity", bs.total_equity, true),
            ] {
                pdf.table_row(kv, &[label, &money(value)], bold);
            }
            pdf.table_row(kv, &["Current ratio", &ratio(bs.current_ratio)], false);
            pdf.table_row(kv, &["Debt to equity", &ratio(bs.debt_to_equity)], false);
            if !bs.is_balanced {
                pdf.paragraph("Warning: assets do not equal liabilities plus equity.");
            }
        }
        None => pdf.paragraph("No balance sheet recorded for this year."),
    }

    let cf = cashflow_statement(input, period);
    pdf.heading("Cash Flow");
    let ccols = &[left(36.0), right(36.0), right(36.0), right(36.0), right(36.0)];
    pdf.table_header(ccols, &["Period", "Operational", "Investment", "Financing", "Net"]);
    for r in cf.rows.iter().chain(std::iter::once(&cf.total)) {
        let bold = std::ptr::eq(r, &cf.total);
        if bold {
            pdf.separator();
        }
        let vals = [money(r.operational), money(r.investment), money(r.financing), money(r.net)];
        pdf.table_row(ccols, &[&r.label, &vals[0], &vals[1], &vals[2], &vals[3]], bold);
    }

    let proj = projections(input);
    pdf.heading("Projections");
    pdf.paragraph(&format!(
        "Revenue growth {} and expense growth {} per year.",
        percent(proj.revenue_growth),
        percent(proj.expense_growth)
    ));
    let pcols = &[left(45.0), right(45.0), right(45.0), right(45.0)];
    pdf.table_header(pcols, &["Year", "Revenue", "Expenses", "Profit"]);
    for r in std::iter::once(&proj.base).chain(proj.rows.iter()) {
        let vals = [r.year.to_string(), money(r.revenue), money(r.expenses), money(r.profit)];
        pdf.table_row(pcols, &[&vals[0], &vals[1], &vals[2], &vals[3]], false);
    }

    let k = kpi_summary(input);
    pdf.heading("Key Performance Indicators");
    let ltv_cac = k.ltv_cac.map(ratio).unwrap_or_else(|| "-".to_string());
    for (label, value) in [
        ("Gross margin", percent(k.gross_margin)),
        ("Net margin", percent(k.net_margin)),
        ("Customer acquisition cost", money(k.cac)),
        ("Customer lifetime value", money(k.ltv)),
        ("LTV:CAC", ltv_cac),
        ("Burn rate", money(k.burn_rate)),
        ("Runway (months)", format!("{:.1}", k.runway_months)),
        ("Return on assets", percent(k.return_on_assets)),
    ] {
        pdf.table_row(kv, &[label, &value], false);
    }

    if let Some(note) = &input.selected().note {
        pdf.heading("Notes and Funding");
        for (label, text) in [
            ("Growth strategy", &note.growth_strategy),
            ("Business risks", &note.business_risks),
            ("Anomalies", &note.anomalies),
            ("Funding allocation", &note.funding_allocation),
        ] {
            if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
                pdf.table_row(&[left(CONTENT_W)], &[label], true);
                pdf.paragraph(text);
                pdf.blank_row();
            }
        }
        pdf.table_row(kv, &["Funding requirements", &money(note.funding_requirements)], true);
    }

    pdf.to_bytes()
}

// ---------------------------------------------------------------------------
// Trading report
// ---------------------------------------------------------------------------

pub struct TradingReport<'a> {
    pub company: &'a Company,
    pub sales: &'a [SaleAnalysis],
    pub risks: &'a [MarketRisk],
    pub ledger: &'a [LedgerEntry],
    pub conclusion: Option<&'a str>,
}

pub fn render_trading_report(report: &TradingReport) -> Result<Vec<u8>> {
    let mut pdf = PdfWriter::new("Rubber Sales Report")?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    pdf.header("Rubber Sales Report", &report.company.name, &format!("As of {today}"));

    if !report.sales.is_empty() {
        pdf.heading("Sales Plan");
        let cols = &[
            left(30.0),
            right(16.0),
            right(22.0),
            right(16.0),
            right(22.0),
            right(20.0),
            right(20.0),
            right(34.0),
        ];
        pdf.table_header(
            cols,
            &["Factory", "Km", "Sell/kg", "Shrink", "Buy/kg", "Weight", "Sold", "Gross Profit"],
        );
        for a in report.sales {
            let s = &a.sale;
            let vals = [
                format!("{:.0}", s.distance_km),
                money(s.sell_price),
                format!("{:.1}%", s.shrinkage_pct),
                money(s.buy_price),
                format!("{:.0} kg", s.initial_weight),
                format!("{:.0} kg", a.sold_weight),
                money(a.gross_profit),
            ];
            pdf.table_row(
                cols,
                &[&s.factory, &vals[0], &vals[1], &vals[2], &vals[3], &vals[4], &vals[5], &vals[6]],
                false,
            );
        }

        pdf.heading("Net Profit Detail");
        let ncols = &[left(45.0), right(40.0), right(45.0), left(50.0)];
        pdf.table_header(ncols, &["Factory", "Shipping", "Net Profit", "Recommendation"]);
        for a in report.sales {
            let ship = money(a.sale.shipping_cost);
            let net = money(a.net_profit);
            pdf.table_row(ncols, &[&a.sale.factory, &ship, &net, a.recommendation.label()], false);
        }
    }

    if !report.risks.is_empty() {
        pdf.heading("Market Strategy and Risks");
        let cols = &[left(10.0), left(40.0), left(60.0), left(70.0)];
        pdf.table_header(cols, &["No", "Aspect", "Risk", "Solution"]);
        for (i, r) in report.risks.iter().enumerate() {
            let no = (i + 1).to_string();
            pdf.table_row(cols, &[&no, &r.aspect, &r.risk, &r.solution], false);
        }
    }

    if !report.ledger.is_empty() {
        pdf.heading("Budget Realization");
        let cols = &[
            left(10.0),
            left(22.0),
            right(28.0),
            right(28.0),
            right(30.0),
            left(22.0),
            left(40.0),
        ];
        pdf.table_header(cols, &["No", "Date", "Debit", "Credit", "Balance", "Volume", "Category"]);
        for (i, e) in report.ledger.iter().enumerate() {
            let vals = [(i + 1).to_string(), money(e.debit), money(e.credit), money(e.balance)];
            pdf.table_row(
                cols,
                &[
                    &vals[0],
                    &e.date,
                    &vals[1],
                    &vals[2],
                    &vals[3],
                    e.volume.as_deref().unwrap_or(""),
                    e.category.as_deref().unwrap_or(""),
                ],
                false,
            );
        }
    }

    if let Some(text) = report.conclusion.filter(|t| !t.trim().is_empty()) {
        pdf.heading("Conclusion and Recommendation");
        pdf.paragraph(text);
    }

    pdf.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BalanceSheet, FinancialNote, RubberSale};
    use crate::trading::analyze_sales;

    fn company() -> Company {
        Company {
            id: 1,
            name: "PT Contoh Indonesia".to_string(),
            industry: Some("Trading".to_string()),
            founded_date: None,
        }
    }

    fn input() -> ReportInput {
        let mut year = YearData::empty(2025, 0.2);
        for (i, m) in year.months.iter_mut().enumerate() {
            m.revenue = 1_000_000.0 * (i + 1) as f64;
            m.cogs = 400_000.0 * (i + 1) as f64;
        }
        year.balance_sheet = Some(BalanceSheet {
            year: 2025,
            current_assets: 5_000_000.0,
            ..Default::default()
        });
        year.note = Some(FinancialNote {
            year: 2025,
            growth_strategy: Some("Expand to new markets across several provinces. ".repeat(6)),
            funding_requirements: 100_000_000.0,
            ..Default::default()
        });
        ReportInput { company: company(), years: vec![year] }
    }

    #[test]
    fn test_render_financial_report_produces_pdf() {
        for period in [PeriodType::Monthly, PeriodType::Quarterly, PeriodType::Yearly] {
            let bytes = render_financial_report(&input(), period).unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }
    }

    #[test]
    fn test_render_financial_report_empty_year() {
        let inp = ReportInput {
            company: company(),
            years: vec![YearData::empty(2025, 0.2)],
        };
        let bytes = render_financial_report(&inp, PeriodType::Quarterly).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_trading_report_produces_pdf() {
        let sales = analyze_sales(&[RubberSale {
            id: Some(1),
            factory: "Pabrik A".to_string(),
            distance_km: 40.0,
            sell_price: 16_000.0,
            shrinkage_pct: 25.0,
            buy_price: 10_000.0,
            initial_weight: 1000.0,
            shipping_cost: 500_000.0,
        }]);
        let risks = vec![MarketRisk {
            id: Some(1),
            aspect: "Price".to_string(),
            risk: "Rubber prices fall sharply during the rainy season".to_string(),
            solution: "Hold stock and sell when prices recover".to_string(),
        }];
        // Enough rows to force a page break.
        let ledger: Vec<LedgerEntry> = (1..=80)
            .map(|i| LedgerEntry {
                id: i,
                company_id: 1,
                date: "2025-01-01".to_string(),
                debit: 1000.0,
                credit: 0.0,
                balance: 1000.0 * i as f64,
                volume: None,
                category: Some("Sales".to_string()),
            })
            .collect();
        let company = company();
        let report = TradingReport {
            company: &company,
            sales: &sales,
            risks: &risks,
            ledger: &ledger,
            conclusion: Some("Sell to Pabrik A."),
        };
        let bytes = render_trading_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
