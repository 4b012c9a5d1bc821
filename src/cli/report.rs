use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::chart::bar_chart;
use crate::cli::{current_year, open_db};
use crate::error::Result;
use crate::fmt::{money, percent, ratio};
use crate::reports::{self, BreakEven, PeriodType, ReportInput};
use crate::settings::resolve_company;

/// Years loaded behind the selected one, for yearly rows and trends.
const HISTORY_YEARS: u32 = 3;
const CHART_WIDTH: usize = 40;

fn load(company: Option<i64>, year: Option<i32>) -> Result<ReportInput> {
    let company_id = resolve_company(company)?;
    let (settings, conn) = open_db()?;
    reports::load_report_input(
        &conn,
        company_id,
        year.unwrap_or_else(current_year),
        HISTORY_YEARS,
        settings.tax_rate,
    )
}

fn amount_cell(val: f64) -> Cell {
    Cell::new(money(val)).set_alignment(CellAlignment::Right)
}

fn signed_cell(val: f64) -> Cell {
    let text = if val < 0.0 {
        money(val).red().to_string()
    } else {
        money(val).green().to_string()
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn title(input: &ReportInput, name: &str, year: i32) -> String {
    format!("{}\n{name} {year}", input.company.name.bold())
}

pub fn dashboard(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let d = reports::dashboard(&input);

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let growth = d.yoy_growth.map(percent).unwrap_or_else(|| "-".to_string());
    table.add_row(vec![Cell::new("Annual revenue"), amount_cell(d.annual_revenue)]);
    table.add_row(vec![Cell::new("Net profit"), signed_cell(d.net_profit)]);
    table.add_row(vec![Cell::new("Net profit margin"), Cell::new(percent(d.net_margin))]);
    table.add_row(vec![Cell::new("Revenue growth (YoY)"), Cell::new(growth)]);
    table.add_row(vec![Cell::new("Net cash flow"), signed_cell(d.net_cash_flow)]);
    table.add_row(vec![Cell::new("Funding requirements"), amount_cell(d.funding_requirements)]);
    if let (Some(begin), Some(end)) = (d.beginning_balance, d.ending_balance) {
        table.add_row(vec![Cell::new("Beginning cash"), amount_cell(begin)]);
        table.add_row(vec![Cell::new("Ending cash"), amount_cell(end)]);
    }
    println!("{}\n{table}", title(&input, "Dashboard", d.year));

    let monthly = reports::income_statement(&input, PeriodType::Monthly);
    let bars: Vec<(String, f64)> = monthly.rows.iter().map(|r| (r.label.clone(), r.revenue)).collect();
    println!("\n{}", bar_chart("Monthly revenue", &bars, CHART_WIDTH));
    let bars: Vec<(String, f64)> = monthly.rows.iter().map(|r| (r.label.clone(), r.net_profit)).collect();
    println!("{}", bar_chart("Monthly net profit", &bars, CHART_WIDTH));
    Ok(())
}

pub fn income(company: Option<i64>, year: Option<i32>, period: PeriodType) -> Result<()> {
    let input = load(company, year)?;
    let stmt = reports::income_statement(&input, period);

    let mut table = Table::new();
    table.set_header(vec![
        "Period", "Revenue", "COGS", "Gross Profit", "Opex", "Operating", "Other", "Before Tax",
        "Tax", "Net Profit",
    ]);
    for r in stmt.rows.iter().chain(std::iter::once(&stmt.total)) {
        let label = if std::ptr::eq(r, &stmt.total) {
            r.label.bold().to_string()
        } else {
            r.label.clone()
        };
        table.add_row(vec![
            Cell::new(label),
            amount_cell(r.revenue),
            amount_cell(r.cogs),
            amount_cell(r.gross_profit),
            amount_cell(r.operational_expenses),
            amount_cell(r.operating_profit),
            amount_cell(r.other_expenses),
            amount_cell(r.profit_before_tax),
            amount_cell(r.tax),
            signed_cell(r.net_profit),
        ]);
    }
    println!(
        "{}\n{table}",
        title(&input, &format!("{} Income Statement", period.label()), stmt.year)
    );
    Ok(())
}

pub fn balance(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let year = input.selected().year;
    let Some(bs) = reports::balance_sheet_summary(&input) else {
        println!("No balance sheet recorded for {year}. Run `ledgerdash set balance --year {year} ...`.");
        return Ok(());
    };
    let s = &bs.sheet;

    let mut table = Table::new();
    table.set_header(vec!["Item", "Amount"]);
    table.add_row(vec![Cell::new("ASSETS".green().bold()), Cell::new("")]);
    table.add_row(vec![Cell::new("  Current assets"), amount_cell(s.current_assets)]);
    table.add_row(vec![Cell::new("  Fixed assets"), amount_cell(s.fixed_assets)]);
    table.add_row(vec![Cell::new("Total assets".bold()), amount_cell(bs.total_assets)]);
    table.add_row(vec![Cell::new("LIABILITIES".red().bold()), Cell::new("")]);
    table.add_row(vec![Cell::new("  Short-term"), amount_cell(s.short_term_liabilities)]);
    table.add_row(vec![Cell::new("  Long-term"), amount_cell(s.long_term_liabilities)]);
    table.add_row(vec![Cell::new("Total liabilities".bold()), amount_cell(bs.total_liabilities)]);
    table.add_row(vec![Cell::new("EQUITY".bold()), Cell::new("")]);
    table.add_row(vec![Cell::new("  Owner equity"), amount_cell(s.owner_equity)]);
    table.add_row(vec![Cell::new("  Retained earnings"), amount_cell(s.retained_earnings)]);
    table.add_row(vec![Cell::new("Total equity".bold()), amount_cell(bs.total_equity)]);
    table.add_row(vec![
        Cell::new("Liabilities + equity".bold()),
        amount_cell(bs.total_liabilities_and_equity),
    ]);
    println!("{}\n{table}", title(&input, "Balance Sheet", year));

    println!("Working capital: {}", money(bs.working_capital));
    println!("Current ratio:   {}", ratio(bs.current_ratio));
    println!("Debt to equity:  {}", ratio(bs.debt_to_equity));
    if bs.is_balanced {
        println!("{}", "Balanced".green());
    } else {
        println!("{}", "Not balanced: assets differ from liabilities plus equity".red());
    }
    Ok(())
}

pub fn cashflow(company: Option<i64>, year: Option<i32>, period: PeriodType) -> Result<()> {
    let input = load(company, year)?;
    let stmt = reports::cashflow_statement(&input, period);

    let mut table = Table::new();
    table.set_header(vec!["Period", "Operational", "Investment", "Financing", "Net"]);
    for r in stmt.rows.iter().chain(std::iter::once(&stmt.total)) {
        table.add_row(vec![
            Cell::new(&r.label),
            amount_cell(r.operational),
            amount_cell(r.investment),
            amount_cell(r.financing),
            signed_cell(r.net),
        ]);
    }
    println!(
        "{}\n{table}",
        title(&input, &format!("{} Cash Flow", period.label()), stmt.year)
    );
    let bars: Vec<(String, f64)> = stmt.rows.iter().map(|r| (r.label.clone(), r.net)).collect();
    println!("\n{}", bar_chart("Net cash flow", &bars, CHART_WIDTH));
    Ok(())
}

pub fn projections(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let p = reports::projections(&input);

    let mut table = Table::new();
    table.set_header(vec!["Year", "Revenue", "Expenses", "Profit"]);
    for (i, r) in std::iter::once(&p.base).chain(p.rows.iter()).enumerate() {
        let label = if i == 0 { format!("{} (actual)", r.year) } else { r.year.to_string() };
        table.add_row(vec![
            Cell::new(label),
            amount_cell(r.revenue),
            amount_cell(r.expenses),
            signed_cell(r.profit),
        ]);
    }
    println!("{}\n{table}", title(&input, "Projections from", p.base.year));
    println!(
        "Revenue growth {} / expense growth {} per year",
        percent(p.revenue_growth),
        percent(p.expense_growth)
    );
    let bars: Vec<(String, f64)> = p.rows.iter().map(|r| (r.year.to_string(), r.profit)).collect();
    println!("\n{}", bar_chart("Projected profit", &bars, CHART_WIDTH));
    Ok(())
}

pub fn break_even(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let year = input.selected().year;
    println!("{}", title(&input, "Break-even", year));
    match reports::break_even(&input) {
        BreakEven::Reached { fixed_costs, contribution_margin_ratio, revenue } => {
            println!("Fixed costs:               {}", money(fixed_costs));
            println!("Contribution margin ratio: {}", percent(contribution_margin_ratio));
            println!("Break-even revenue:        {}", money(revenue).bold());
            let actual = input.selected().revenue();
            if actual >= revenue {
                println!("{}", format!("Revenue is {} above break-even", money(actual - revenue)).green());
            } else {
                println!("{}", format!("Revenue is {} below break-even", money(revenue - actual)).red());
            }
        }
        BreakEven::NoRevenue => println!("No revenue recorded; break-even cannot be computed."),
        BreakEven::NonPositiveMargin { contribution_margin_ratio } => println!(
            "Contribution margin is {}; costs of goods sold exceed revenue, so there is no break-even point.",
            percent(contribution_margin_ratio)
        ),
    }
    Ok(())
}

pub fn sensitivity(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let grid = reports::sensitivity(&input);

    let mut header = vec!["Revenue \\ Expense".to_string()];
    header.extend(grid.scenarios.iter().map(|s| percent(*s)));
    let mut table = Table::new();
    table.set_header(header);
    for (rg, row) in grid.scenarios.iter().zip(&grid.cells) {
        let mut cells = vec![Cell::new(percent(*rg))];
        cells.extend(row.iter().map(|v| signed_cell(*v)));
        table.add_row(cells);
    }
    println!(
        "{}\n{table}",
        title(&input, "One-year profit sensitivity", input.selected().year)
    );
    Ok(())
}

pub fn kpi(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let k = reports::kpi_summary(&input);

    let mut table = Table::new();
    table.set_header(vec!["KPI", "Value"]);
    table.add_row(vec![Cell::new("Gross margin"), Cell::new(percent(k.gross_margin))]);
    table.add_row(vec![Cell::new("Net margin"), Cell::new(percent(k.net_margin))]);
    table.add_row(vec![Cell::new("Customer acquisition cost"), amount_cell(k.cac)]);
    table.add_row(vec![Cell::new("Customer lifetime value"), amount_cell(k.ltv)]);
    table.add_row(vec![
        Cell::new("LTV:CAC"),
        Cell::new(k.ltv_cac.map(ratio).unwrap_or_else(|| "-".to_string())),
    ]);
    table.add_row(vec![Cell::new("Burn rate"), amount_cell(k.burn_rate)]);
    table.add_row(vec![Cell::new("Runway (months)"), Cell::new(format!("{:.1}", k.runway_months))]);
    table.add_row(vec![Cell::new("Current ratio"), Cell::new(ratio(k.current_ratio))]);
    table.add_row(vec![Cell::new("Debt to equity"), Cell::new(ratio(k.debt_to_equity))]);
    table.add_row(vec![Cell::new("Return on assets"), Cell::new(percent(k.return_on_assets))]);
    println!("{}\n{table}", title(&input, "KPIs", k.year));

    let mut trend = Table::new();
    trend.set_header(vec![
        "Year", "Gross Margin", "Net Margin", "Current Ratio", "Debt/Equity", "CAC", "LTV", "LTV:CAC",
        "Burn Rate",
    ]);
    for t in reports::kpi_trends(&input) {
        trend.add_row(vec![
            Cell::new(t.year),
            Cell::new(percent(t.gross_margin)),
            Cell::new(percent(t.net_margin)),
            Cell::new(ratio(t.current_ratio)),
            Cell::new(ratio(t.debt_to_equity)),
            amount_cell(t.cac),
            amount_cell(t.ltv),
            Cell::new(t.ltv_cac.map(ratio).unwrap_or_else(|| "-".to_string())),
            amount_cell(t.burn_rate),
        ]);
    }
    println!("\nTrend\n{trend}");
    Ok(())
}

pub fn notes(company: Option<i64>, year: Option<i32>) -> Result<()> {
    let input = load(company, year)?;
    let year = input.selected().year;
    println!("{}", title(&input, "Notes", year));
    let Some(note) = &input.selected().note else {
        println!("No notes recorded for {year}.");
        return Ok(());
    };
    for (label, text) in [
        ("Growth strategy", &note.growth_strategy),
        ("Business risks", &note.business_risks),
        ("Anomalies", &note.anomalies),
        ("Funding allocation", &note.funding_allocation),
    ] {
        println!("\n{}", label.bold());
        println!("{}", textwrap::fill(text.as_deref().unwrap_or("-"), 80));
    }
    println!("\n{} {}", "Funding requirements:".bold(), money(note.funding_requirements));
    Ok(())
}
