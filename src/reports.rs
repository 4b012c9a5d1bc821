use rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{BalanceSheet, CashFlow, Company, FinancialNote, Kpi, MonthlyFinancials};
use crate::store;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Revenue and expense growth scenarios for the sensitivity grid.
pub const GROWTH_SCENARIOS: [f64; 7] = [-0.1, -0.05, 0.0, 0.05, 0.1, 0.15, 0.2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    pub fn label(self) -> &'static str {
        match self {
            PeriodType::Monthly => "Monthly",
            PeriodType::Quarterly => "Quarterly",
            PeriodType::Yearly => "Yearly",
        }
    }
}

// ---------------------------------------------------------------------------
// Report input
// ---------------------------------------------------------------------------

/// Everything stored for one company-year, with missing months filled as zero.
#[derive(Debug, Clone)]
pub struct YearData {
    pub year: i32,
    pub months: Vec<MonthlyFinancials>,
    pub cash_flows: Vec<CashFlow>,
    pub balance_sheet: Option<BalanceSheet>,
    pub kpi: Option<Kpi>,
    pub note: Option<FinancialNote>,
}

impl YearData {
    pub fn empty(year: i32, tax_rate: f64) -> Self {
        Self {
            year,
            months: (1..=12)
                .map(|month| MonthlyFinancials { year, month, tax_rate, ..Default::default() })
                .collect(),
            cash_flows: (1..=12).map(|month| CashFlow { year, month, ..Default::default() }).collect(),
            balance_sheet: None,
            kpi: None,
            note: None,
        }
    }

    pub fn revenue(&self) -> f64 {
        self.months.iter().map(|m| m.revenue).sum()
    }

    pub fn cogs(&self) -> f64 {
        self.months.iter().map(|m| m.cogs).sum()
    }

    pub fn operational_expenses(&self) -> f64 {
        self.months.iter().map(|m| m.operational_expenses).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.months.iter().map(|m| m.total_expenses()).sum()
    }

    pub fn net_cash_flow(&self) -> f64 {
        self.cash_flows.iter().map(|c| c.net()).sum()
    }
}

/// Explicit input for every statement: the selected year plus the years
/// before it, oldest first. The selected year is always last.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub company: Company,
    pub years: Vec<YearData>,
}

impl ReportInput {
    pub fn selected(&self) -> &YearData {
        &self.years[self.years.len() - 1]
    }

    pub fn previous(&self) -> Option<&YearData> {
        self.years.len().checked_sub(2).map(|i| &self.years[i])
    }
}

/// Years accepted for reports and fact entry.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;
const MAX_WINDOW: u32 = 50;

fn month_index(month: u32) -> Option<usize> {
    (1..=12).contains(&month).then(|| month as usize - 1)
}

/// Load `window` years ending at `year` for a company.
pub fn load_report_input(
    conn: &Connection,
    company_id: i64,
    year: i32,
    window: u32,
    default_tax_rate: f64,
) -> Result<ReportInput> {
    if !YEAR_RANGE.contains(&year) {
        return Err(AppError::Validation(format!(
            "year must be {}-{}, got {year}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }
    let company = store::get_company(conn, company_id)?;
    let first = year - window.clamp(1, MAX_WINDOW) as i32 + 1;
    let mut years = Vec::new();
    for y in first..=year {
        let mut data = YearData::empty(y, default_tax_rate);
        for row in store::get_financial_data(conn, company_id, Some(y))? {
            match month_index(row.month) {
                Some(idx) => data.months[idx] = row,
                None => log::warn!("company {company_id}: skipping income row with month {}", row.month),
            }
        }
        for row in store::get_cash_flows(conn, company_id, Some(y))? {
            match month_index(row.month) {
                Some(idx) => data.cash_flows[idx] = row,
                None => log::warn!("company {company_id}: skipping cash flow row with month {}", row.month),
            }
        }
        data.balance_sheet = store::get_balance_sheet(conn, company_id, y)?;
        data.kpi = store::get_kpi(conn, company_id, y)?;
        data.note = store::get_financial_note(conn, company_id, y)?;
        years.push(data);
    }
    Ok(ReportInput { company, years })
}

/// Month slices for each period of the selected granularity.
fn month_groups(period: PeriodType) -> Vec<(String, std::ops::Range<usize>)> {
    match period {
        PeriodType::Monthly => MONTH_LABELS
            .iter()
            .enumerate()
            .map(|(i, l)| (l.to_string(), i..i + 1))
            .collect(),
        PeriodType::Quarterly => (0..4).map(|q| (format!("Q{}", q + 1), q * 3..q * 3 + 3)).collect(),
        PeriodType::Yearly => vec![(String::new(), 0..12)],
    }
}

// ---------------------------------------------------------------------------
// Income statement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomeRow {
    pub label: String,
    pub revenue: f64,
    pub cogs: f64,
    pub gross_profit: f64,
    pub operational_expenses: f64,
    pub operating_profit: f64,
    pub other_expenses: f64,
    pub profit_before_tax: f64,
    pub tax: f64,
    pub net_profit: f64,
}

impl IncomeRow {
    fn from_months(label: String, months: &[MonthlyFinancials]) -> Self {
        let mut row = IncomeRow { label, ..Default::default() };
        for m in months {
            let pbt = m.revenue - m.cogs - m.operational_expenses - m.other_expenses;
            row.revenue += m.revenue;
            row.cogs += m.cogs;
            row.operational_expenses += m.operational_expenses;
            row.other_expenses += m.other_expenses;
            row.tax += pbt * m.tax_rate;
        }
        row.gross_profit = row.revenue - row.cogs;
        row.operating_profit = row.gross_profit - row.operational_expenses;
        row.profit_before_tax = row.operating_profit - row.other_expenses;
        row.net_profit = row.profit_before_tax - row.tax;
        row
    }
}

pub struct IncomeStatement {
    pub period: PeriodType,
    pub year: i32,
    pub rows: Vec<IncomeRow>,
    pub total: IncomeRow,
}

pub fn income_statement(input: &ReportInput, period: PeriodType) -> IncomeStatement {
    let selected = input.selected();
    let rows = match period {
        PeriodType::Yearly => input
            .years
            .iter()
            .map(|y| IncomeRow::from_months(y.year.to_string(), &y.months))
            .collect(),
        _ => month_groups(period)
            .into_iter()
            .map(|(label, range)| IncomeRow::from_months(label, &selected.months[range]))
            .collect(),
    };
    IncomeStatement {
        period,
        year: selected.year,
        rows,
        total: IncomeRow::from_months("Total".to_string(), &selected.months),
    }
}

// ---------------------------------------------------------------------------
// Balance sheet
// ---------------------------------------------------------------------------

pub struct BalanceSheetSummary {
    pub sheet: BalanceSheet,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub total_equity: f64,
    pub total_liabilities_and_equity: f64,
    pub working_capital: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub is_balanced: bool,
}

pub fn balance_sheet_summary(input: &ReportInput) -> Option<BalanceSheetSummary> {
    let sheet = input.selected().balance_sheet.clone()?;
    let total_assets = sheet.total_assets();
    let total_liabilities = sheet.total_liabilities();
    let total_equity = sheet.total_equity();
    let total_liabilities_and_equity = total_liabilities + total_equity;
    Some(BalanceSheetSummary {
        total_assets,
        total_liabilities,
        total_equity,
        total_liabilities_and_equity,
        working_capital: metrics::working_capital(sheet.current_assets, sheet.short_term_liabilities),
        current_ratio: metrics::current_ratio(sheet.current_assets, sheet.short_term_liabilities),
        debt_to_equity: metrics::debt_to_equity(total_liabilities, total_equity),
        is_balanced: (total_assets - total_liabilities_and_equity).abs() < 0.01,
        sheet,
    })
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashflowRow {
    pub label: String,
    pub operational: f64,
    pub investment: f64,
    pub financing: f64,
    pub net: f64,
}

impl CashflowRow {
    fn from_flows(label: String, flows: &[CashFlow]) -> Self {
        let operational = flows.iter().map(|c| c.operational).sum();
        let investment = flows.iter().map(|c| c.investment).sum();
        let financing = flows.iter().map(|c| c.financing).sum();
        CashflowRow {
            label,
            operational,
            investment,
            financing,
            net: operational + investment + financing,
        }
    }
}

pub struct CashflowStatement {
    pub period: PeriodType,
    pub year: i32,
    pub rows: Vec<CashflowRow>,
    pub total: CashflowRow,
}

pub fn cashflow_statement(input: &ReportInput, period: PeriodType) -> CashflowStatement {
    let selected = input.selected();
    let rows = match period {
        PeriodType::Yearly => input
            .years
            .iter()
            .map(|y| CashflowRow::from_flows(y.year.to_string(), &y.cash_flows))
            .collect(),
        _ => month_groups(period)
            .into_iter()
            .map(|(label, range)| CashflowRow::from_flows(label, &selected.cash_flows[range]))
            .collect(),
    };
    CashflowStatement {
        period,
        year: selected.year,
        rows,
        total: CashflowRow::from_flows("Total".to_string(), &selected.cash_flows),
    }
}

// ---------------------------------------------------------------------------
// Dashboard summary
// ---------------------------------------------------------------------------

pub struct DashboardSummary {
    pub year: i32,
    pub annual_revenue: f64,
    /// Revenue minus all expenses, before tax.
    pub net_profit: f64,
    pub net_margin: f64,
    pub net_cash_flow: f64,
    pub yoy_growth: Option<f64>,
    pub funding_requirements: f64,
    pub beginning_balance: Option<f64>,
    pub ending_balance: Option<f64>,
}

pub fn dashboard(input: &ReportInput) -> DashboardSummary {
    let selected = input.selected();
    let annual_revenue = selected.revenue();
    let net_profit = annual_revenue - selected.total_expenses();
    let net_cash_flow = selected.net_cash_flow();
    let beginning_balance = selected
        .balance_sheet
        .as_ref()
        .map(|bs| bs.current_assets)
        .filter(|v| *v != 0.0);
    DashboardSummary {
        year: selected.year,
        annual_revenue,
        net_profit,
        net_margin: metrics::net_profit_margin(net_profit, annual_revenue),
        net_cash_flow,
        yoy_growth: input
            .previous()
            .and_then(|p| metrics::yoy_growth(annual_revenue, p.revenue())),
        funding_requirements: selected.note.as_ref().map(|n| n.funding_requirements).unwrap_or(0.0),
        beginning_balance,
        ending_balance: beginning_balance.map(|b| b + net_cash_flow),
    }
}

// ---------------------------------------------------------------------------
// Projections, break-even, sensitivity
// ---------------------------------------------------------------------------

pub struct ProjectionRow {
    pub year: i32,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

pub struct Projection {
    pub base: ProjectionRow,
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub rows: Vec<ProjectionRow>,
}

pub fn projections(input: &ReportInput) -> Projection {
    let selected = input.selected();
    let kpi = selected.kpi.clone().unwrap_or_else(|| Kpi::empty(selected.year));
    let revenue = selected.revenue();
    let expenses = selected.total_expenses();
    let rows = (1..=kpi.projection_years)
        .map(|i| {
            let r = metrics::compound(revenue, kpi.revenue_growth, i);
            let e = metrics::compound(expenses, kpi.expense_growth, i);
            ProjectionRow {
                year: selected.year.saturating_add(i as i32),
                revenue: r,
                expenses: e,
                profit: r - e,
            }
        })
        .collect();
    Projection {
        base: ProjectionRow {
            year: selected.year,
            revenue,
            expenses,
            profit: revenue - expenses,
        },
        revenue_growth: kpi.revenue_growth,
        expense_growth: kpi.expense_growth,
        rows,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BreakEven {
    Reached {
        fixed_costs: f64,
        contribution_margin_ratio: f64,
        revenue: f64,
    },
    NoRevenue,
    NonPositiveMargin { contribution_margin_ratio: f64 },
}

/// Operational expenses are treated as fixed, COGS as variable.
pub fn break_even(input: &ReportInput) -> BreakEven {
    let selected = input.selected();
    let revenue = selected.revenue();
    if revenue <= 0.0 {
        return BreakEven::NoRevenue;
    }
    let fixed_costs = selected.operational_expenses();
    let ratio = (revenue - selected.cogs()) / revenue;
    if ratio <= 0.0 {
        return BreakEven::NonPositiveMargin { contribution_margin_ratio: ratio };
    }
    BreakEven::Reached {
        fixed_costs,
        contribution_margin_ratio: ratio,
        revenue: metrics::break_even_revenue(fixed_costs, ratio),
    }
}

pub struct SensitivityGrid {
    pub scenarios: Vec<f64>,
    /// `cells[r][e]`: one-year profit with revenue growth `scenarios[r]`
    /// and expense growth `scenarios[e]`.
    pub cells: Vec<Vec<f64>>,
}

pub fn sensitivity(input: &ReportInput) -> SensitivityGrid {
    let selected = input.selected();
    let revenue = selected.revenue();
    let expenses = selected.total_expenses();
    let cells = GROWTH_SCENARIOS
        .iter()
        .map(|rg| {
            GROWTH_SCENARIOS
                .iter()
                .map(|eg| revenue * (1.0 + rg) - expenses * (1.0 + eg))
                .collect()
        })
        .collect();
    SensitivityGrid {
        scenarios: GROWTH_SCENARIOS.to_vec(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

pub struct KpiSummary {
    pub year: i32,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub cac: f64,
    pub ltv: f64,
    pub ltv_cac: Option<f64>,
    pub burn_rate: f64,
    pub runway_months: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub return_on_assets: f64,
}

pub fn kpi_summary(input: &ReportInput) -> KpiSummary {
    let selected = input.selected();
    let kpi = selected.kpi.clone().unwrap_or_else(|| Kpi::empty(selected.year));
    let revenue = selected.revenue();
    let expenses = selected.total_expenses();
    let bs = selected.balance_sheet.clone().unwrap_or_default();
    KpiSummary {
        year: selected.year,
        gross_margin: metrics::gross_margin(revenue, selected.cogs()),
        net_margin: metrics::net_profit_margin(revenue - expenses, revenue),
        cac: kpi.cac,
        ltv: kpi.ltv,
        ltv_cac: (kpi.cac > 0.0).then(|| metrics::ltv_cac_ratio(kpi.ltv, kpi.cac)),
        burn_rate: kpi.burn_rate,
        runway_months: metrics::runway_months(bs.current_assets, expenses / 12.0, revenue / 12.0),
        current_ratio: metrics::current_ratio(bs.current_assets, bs.short_term_liabilities),
        debt_to_equity: metrics::debt_to_equity(bs.total_liabilities(), bs.total_equity()),
        return_on_assets: metrics::roi(revenue - expenses, bs.total_assets()),
    }
}

pub struct KpiTrendRow {
    pub year: i32,
    pub gross_margin: f64,
    pub net_margin: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub cac: f64,
    pub ltv: f64,
    pub ltv_cac: Option<f64>,
    pub burn_rate: f64,
}

pub fn kpi_trends(input: &ReportInput) -> Vec<KpiTrendRow> {
    input
        .years
        .iter()
        .map(|y| {
            let revenue = y.revenue();
            let bs = y.balance_sheet.clone().unwrap_or_default();
            let kpi = y.kpi.clone().unwrap_or_else(|| Kpi::empty(y.year));
            KpiTrendRow {
                year: y.year,
                gross_margin: metrics::gross_margin(revenue, y.cogs()),
                net_margin: metrics::net_profit_margin(revenue - y.total_expenses(), revenue),
                current_ratio: metrics::current_ratio(bs.current_assets, bs.short_term_liabilities),
                debt_to_equity: metrics::debt_to_equity(bs.total_liabilities(), bs.total_equity()),
                cac: kpi.cac,
                ltv: kpi.ltv,
                ltv_cac: (kpi.cac > 0.0).then(|| metrics::ltv_cac_ratio(kpi.ltv, kpi.cac)),
                burn_rate: kpi.burn_rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn company() -> Company {
        Company {
            id: 1,
            name: "PT Contoh".to_string(),
            industry: None,
            founded_date: None,
        }
    }

    /// Monthly figures scaled by month number, like the demo company.
    fn year(y: i32, scale: f64) -> YearData {
        let mut data = YearData::empty(y, 0.2);
        for (i, m) in data.months.iter_mut().enumerate() {
            let k = (i + 1) as f64 * scale;
            m.revenue = 1000.0 * k;
            m.cogs = 400.0 * k;
            m.operational_expenses = 200.0 * k;
            m.other_expenses = 50.0 * k;
        }
        for (i, c) in data.cash_flows.iter_mut().enumerate() {
            let k = (i + 1) as f64;
            c.operational = 300.0 * k;
            c.investment = -100.0 * k;
            c.financing = 50.0 * k;
        }
        data
    }

    fn input() -> ReportInput {
        ReportInput {
            company: company(),
            years: vec![year(2024, 0.5), year(2025, 1.0)],
        }
    }

    #[test]
    fn test_monthly_income_statement() {
        let stmt = income_statement(&input(), PeriodType::Monthly);
        assert_eq!(stmt.rows.len(), 12);
        let jan = &stmt.rows[0];
        assert_eq!(jan.label, "Jan");
        assert_eq!(jan.gross_profit, 600.0);
        assert_eq!(jan.operating_profit, 400.0);
        assert_eq!(jan.profit_before_tax, 350.0);
        assert_eq!(jan.tax, 70.0);
        assert_eq!(jan.net_profit, 280.0);
        // 1 + 2 + ... + 12 = 78
        assert_eq!(stmt.total.revenue, 78_000.0);
    }

    #[test]
    fn test_quarterly_sums_three_months() {
        let stmt = income_statement(&input(), PeriodType::Quarterly);
        assert_eq!(stmt.rows.len(), 4);
        assert_eq!(stmt.rows[0].label, "Q1");
        assert_eq!(stmt.rows[0].revenue, 6000.0);
        assert_eq!(stmt.rows[3].revenue, 33_000.0);
        let sum: f64 = stmt.rows.iter().map(|r| r.revenue).sum();
        assert_eq!(sum, stmt.total.revenue);
    }

    #[test]
    fn test_yearly_rows_cover_window() {
        let stmt = income_statement(&input(), PeriodType::Yearly);
        assert_eq!(stmt.rows.len(), 2);
        assert_eq!(stmt.rows[0].label, "2024");
        assert_eq!(stmt.rows[0].revenue, 39_000.0);
        assert_eq!(stmt.rows[1].revenue, 78_000.0);
    }

    #[test]
    fn test_cashflow_statement() {
        let stmt = cashflow_statement(&input(), PeriodType::Quarterly);
        assert_eq!(stmt.rows[0].net, 1500.0);
        assert_eq!(stmt.total.net, 250.0 * 78.0);
    }

    #[test]
    fn test_dashboard_summary() {
        let mut inp = input();
        inp.years[1].balance_sheet = Some(BalanceSheet {
            year: 2025,
            current_assets: 5000.0,
            ..Default::default()
        });
        let d = dashboard(&inp);
        assert_eq!(d.annual_revenue, 78_000.0);
        assert_eq!(d.net_profit, 27_300.0);
        assert_eq!(d.yoy_growth, Some(1.0));
        assert_eq!(d.beginning_balance, Some(5000.0));
        assert_eq!(d.ending_balance, Some(5000.0 + 19_500.0));
    }

    #[test]
    fn test_dashboard_without_history() {
        let inp = ReportInput { company: company(), years: vec![year(2025, 1.0)] };
        let d = dashboard(&inp);
        assert_eq!(d.yoy_growth, None);
        assert_eq!(d.beginning_balance, None);
        assert_eq!(d.funding_requirements, 0.0);
    }

    #[test]
    fn test_balance_sheet_summary() {
        let mut inp = input();
        assert!(balance_sheet_summary(&inp).is_none());
        inp.years[1].balance_sheet = Some(BalanceSheet {
            year: 2025,
            current_assets: 5_000_000.0,
            fixed_assets: 10_000_000.0,
            short_term_liabilities: 2_000_000.0,
            long_term_liabilities: 5_000_000.0,
            owner_equity: 6_000_000.0,
            retained_earnings: 2_000_000.0,
        });
        let s = balance_sheet_summary(&inp).unwrap();
        assert_eq!(s.total_assets, 15_000_000.0);
        assert_eq!(s.total_liabilities_and_equity, 15_000_000.0);
        assert!(s.is_balanced);
        assert_eq!(s.current_ratio, 2.5);
        assert_eq!(s.working_capital, 3_000_000.0);
    }

    #[test]
    fn test_projections_compound() {
        let mut inp = input();
        let mut kpi = Kpi::empty(2025);
        kpi.revenue_growth = 0.5;
        kpi.expense_growth = 0.0;
        kpi.projection_years = 2;
        inp.years[1].kpi = Some(kpi);
        let p = projections(&inp);
        assert_eq!(p.rows.len(), 2);
        assert_eq!(p.rows[0].year, 2026);
        assert_eq!(p.rows[1].revenue, 78_000.0 * 2.25);
        assert_eq!(p.rows[1].expenses, p.base.expenses);
    }

    #[test]
    fn test_break_even() {
        match break_even(&input()) {
            BreakEven::Reached { fixed_costs, contribution_margin_ratio, revenue } => {
                assert_eq!(fixed_costs, 15_600.0);
                assert_eq!(contribution_margin_ratio, 0.6);
                assert!((revenue - 26_000.0).abs() < 1e-6);
            }
            other => panic!("unexpected {other:?}"),
        }
        let empty = ReportInput { company: company(), years: vec![YearData::empty(2025, 0.2)] };
        assert_eq!(break_even(&empty), BreakEven::NoRevenue);
    }

    #[test]
    fn test_sensitivity_grid() {
        let grid = sensitivity(&input());
        assert_eq!(grid.cells.len(), 7);
        assert_eq!(grid.cells[0].len(), 7);
        // No growth on either side: plain profit.
        assert_eq!(grid.cells[2][2], 78_000.0 - 50_700.0);
    }

    #[test]
    fn test_kpi_summary_without_cac() {
        let k = kpi_summary(&input());
        assert_eq!(k.gross_margin, 0.6);
        assert_eq!(k.ltv_cac, None);
        assert_eq!(kpi_trends(&input()).len(), 2);
    }

    #[test]
    fn test_kpi_trends_per_year_ratios() {
        let mut inp = input();
        inp.years[0].balance_sheet = Some(BalanceSheet {
            year: 2024,
            current_assets: 4_000.0,
            short_term_liabilities: 2_000.0,
            long_term_liabilities: 1_000.0,
            owner_equity: 6_000.0,
            ..Default::default()
        });
        inp.years[1].kpi = Some(Kpi {
            cac: 500.0,
            ltv: 2_000.0,
            burn_rate: 3_000.0,
            ..Kpi::empty(2025)
        });

        let trends = kpi_trends(&inp);
        assert_eq!(trends[0].current_ratio, 2.0);
        assert_eq!(trends[0].debt_to_equity, 0.5);
        assert_eq!(trends[0].ltv_cac, None);
        assert_eq!(trends[0].burn_rate, 0.0);
        assert_eq!(trends[1].current_ratio, 0.0);
        assert_eq!(trends[1].ltv_cac, Some(4.0));
        assert_eq!(trends[1].burn_rate, 3_000.0);
    }

    #[test]
    fn test_load_report_input_fills_missing_months() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let id = store::create_company(&conn, "PT Contoh", None, None).unwrap();
        store::save_financial_data(
            &conn,
            id,
            &MonthlyFinancials { year: 2025, month: 3, revenue: 900.0, tax_rate: 0.2, ..Default::default() },
        )
        .unwrap();
        let inp = load_report_input(&conn, id, 2025, 3, 0.2).unwrap();
        assert_eq!(inp.years.len(), 3);
        assert_eq!(inp.years[0].year, 2023);
        assert_eq!(inp.selected().months.len(), 12);
        assert_eq!(inp.selected().months[2].revenue, 900.0);
        assert_eq!(inp.selected().revenue(), 900.0);
    }

    #[test]
    fn test_load_report_input_skips_out_of_range_months() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let id = store::create_company(&conn, "PT Contoh", None, None).unwrap();
        conn.execute(
            "INSERT INTO financial_data (company_id, year, month, revenue) VALUES (?1, 2025, 13, 500)",
            rusqlite::params![id],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO cash_flows (company_id, year, month, operational_cash_flow) VALUES (?1, 2025, 0, 500)",
            rusqlite::params![id],
        )
        .unwrap();
        let inp = load_report_input(&conn, id, 2025, 1, 0.2).unwrap();
        assert_eq!(inp.selected().revenue(), 0.0);
        assert_eq!(inp.selected().net_cash_flow(), 0.0);
    }

    #[test]
    fn test_load_report_input_rejects_extreme_years() {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let id = store::create_company(&conn, "PT Contoh", None, None).unwrap();
        assert!(matches!(
            load_report_input(&conn, id, i32::MIN, 3, 0.2),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load_report_input(&conn, id, i32::MAX, 3, 0.2),
            Err(AppError::Validation(_))
        ));
    }
}
