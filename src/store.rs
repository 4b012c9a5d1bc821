//! Company-scoped financial facts: income data, balance sheets, cash flows,
//! KPIs and notes. Each save is a single upsert on the row's natural key.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{require_finite, AppError, Result};
use crate::models::{BalanceSheet, CashFlow, Company, FinancialNote, Kpi, MonthlyFinancials};

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

pub fn create_company(
    conn: &Connection,
    name: &str,
    industry: Option<&str>,
    founded_date: Option<&str>,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("company name is required".to_string()));
    }
    if let Some(d) = founded_date {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
            AppError::Validation(format!("invalid founded date '{d}', expected YYYY-MM-DD"))
        })?;
    }
    conn.execute(
        "INSERT INTO companies (name, industry, founded_date) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, industry, founded_date],
    )?;
    Ok(conn.last_insert_rowid())
}

fn map_company(row: &rusqlite::Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        industry: row.get(2)?,
        founded_date: row.get(3)?,
    })
}

pub fn list_companies(conn: &Connection) -> Result<Vec<Company>> {
    let mut stmt =
        conn.prepare("SELECT id, name, industry, founded_date FROM companies ORDER BY id")?;
    let rows = stmt
        .query_map([], map_company)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_company(conn: &Connection, id: i64) -> Result<Company> {
    conn.query_row(
        "SELECT id, name, industry, founded_date FROM companies WHERE id = ?1",
        [id],
        map_company,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("company {id}")))
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("month must be 1-12, got {month}")))
    }
}

fn check_amounts(fields: &[(&str, f64)]) -> Result<()> {
    for (name, value) in fields {
        require_finite(name, *value)?;
    }
    Ok(())
}

fn check_rate(field: &str, rate: f64) -> Result<()> {
    require_finite(field, rate)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(AppError::Validation(format!("{field} must be between 0 and 1")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Monthly income data
// ---------------------------------------------------------------------------

pub fn save_financial_data(conn: &Connection, company_id: i64, data: &MonthlyFinancials) -> Result<()> {
    check_month(data.month)?;
    check_amounts(&[
        ("revenue", data.revenue),
        ("cogs", data.cogs),
        ("operational expenses", data.operational_expenses),
        ("other expenses", data.other_expenses),
    ])?;
    check_rate("tax rate", data.tax_rate)?;
    conn.execute(
        "INSERT INTO financial_data \
         (company_id, year, month, revenue, cogs, operational_expenses, other_expenses, tax_rate) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT (company_id, year, month) DO UPDATE SET \
         revenue = excluded.revenue, cogs = excluded.cogs, \
         operational_expenses = excluded.operational_expenses, \
         other_expenses = excluded.other_expenses, tax_rate = excluded.tax_rate",
        rusqlite::params![
            company_id,
            data.year,
            data.month,
            data.revenue,
            data.cogs,
            data.operational_expenses,
            data.other_expenses,
            data.tax_rate
        ],
    )?;
    Ok(())
}

pub fn get_financial_data(conn: &Connection, company_id: i64, year: Option<i32>) -> Result<Vec<MonthlyFinancials>> {
    let mut stmt = conn.prepare(
        "SELECT year, month, revenue, cogs, operational_expenses, other_expenses, tax_rate \
         FROM financial_data WHERE company_id = ?1 AND (?2 IS NULL OR year = ?2) \
         ORDER BY year, month",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![company_id, year], |row| {
            Ok(MonthlyFinancials {
                year: row.get(0)?,
                month: row.get(1)?,
                revenue: row.get(2)?,
                cogs: row.get(3)?,
                operational_expenses: row.get(4)?,
                other_expenses: row.get(5)?,
                tax_rate: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Balance sheet
// ---------------------------------------------------------------------------

pub fn save_balance_sheet(conn: &Connection, company_id: i64, bs: &BalanceSheet) -> Result<()> {
    check_amounts(&[
        ("current assets", bs.current_assets),
        ("fixed assets", bs.fixed_assets),
        ("short-term liabilities", bs.short_term_liabilities),
        ("long-term liabilities", bs.long_term_liabilities),
        ("owner equity", bs.owner_equity),
        ("retained earnings", bs.retained_earnings),
    ])?;
    conn.execute(
        "INSERT INTO balance_sheets \
         (company_id, year, current_assets, fixed_assets, short_term_liabilities, \
          long_term_liabilities, owner_equity, retained_earnings) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT (company_id, year) DO UPDATE SET \
         current_assets = excluded.current_assets, fixed_assets = excluded.fixed_assets, \
         short_term_liabilities = excluded.short_term_liabilities, \
         long_term_liabilities = excluded.long_term_liabilities, \
         owner_equity = excluded.owner_equity, retained_earnings = excluded.retained_earnings",
        rusqlite::params![
            company_id,
            bs.year,
            bs.current_assets,
            bs.fixed_assets,
            bs.short_term_liabilities,
            bs.long_term_liabilities,
            bs.owner_equity,
            bs.retained_earnings
        ],
    )?;
    Ok(())
}

pub fn get_balance_sheet(conn: &Connection, company_id: i64, year: i32) -> Result<Option<BalanceSheet>> {
    let bs = conn
        .query_row(
            "SELECT year, current_assets, fixed_assets, short_term_liabilities, \
             long_term_liabilities, owner_equity, retained_earnings \
             FROM balance_sheets WHERE company_id = ?1 AND year = ?2",
            rusqlite::params![company_id, year],
            |row| {
                Ok(BalanceSheet {
                    year: row.get(0)?,
                    current_assets: row.get(1)?,
                    fixed_assets: row.get(2)?,
                    short_term_liabilities: row.get(3)?,
                    long_term_liabilities: row.get(4)?,
                    owner_equity: row.get(5)?,
                    retained_earnings: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(bs)
}

// ---------------------------------------------------------------------------
// Cash flow
// ---------------------------------------------------------------------------

pub fn save_cash_flow(conn: &Connection, company_id: i64, cf: &CashFlow) -> Result<()> {
    check_month(cf.month)?;
    check_amounts(&[
        ("operational cash flow", cf.operational),
        ("investment cash flow", cf.investment),
        ("financing cash flow", cf.financing),
    ])?;
    conn.execute(
        "INSERT INTO cash_flows \
         (company_id, year, month, operational_cash_flow, investment_cash_flow, financing_cash_flow) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
         ON CONFLICT (company_id, year, month) DO UPDATE SET \
         operational_cash_flow = excluded.operational_cash_flow, \
         investment_cash_flow = excluded.investment_cash_flow, \
         financing_cash_flow = excluded.financing_cash_flow",
        rusqlite::params![company_id, cf.year, cf.month, cf.operational, cf.investment, cf.financing],
    )?;
    Ok(())
}

pub fn get_cash_flows(conn: &Connection, company_id: i64, year: Option<i32>) -> Result<Vec<CashFlow>> {
    let mut stmt = conn.prepare(
        "SELECT year, month, operational_cash_flow, investment_cash_flow, financing_cash_flow \
         FROM cash_flows WHERE company_id = ?1 AND (?2 IS NULL OR year = ?2) \
         ORDER BY year, month",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![company_id, year], |row| {
            Ok(CashFlow {
                year: row.get(0)?,
                month: row.get(1)?,
                operational: row.get(2)?,
                investment: row.get(3)?,
                financing: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

pub fn save_kpi(conn: &Connection, company_id: i64, kpi: &Kpi) -> Result<()> {
    check_amounts(&[
        ("CAC", kpi.cac),
        ("LTV", kpi.ltv),
        ("burn rate", kpi.burn_rate),
        ("revenue growth", kpi.revenue_growth),
        ("expense growth", kpi.expense_growth),
    ])?;
    if !(1..=10).contains(&kpi.projection_years) {
        return Err(AppError::Validation(format!(
            "projection years must be 1-10, got {}",
            kpi.projection_years
        )));
    }
    conn.execute(
        "INSERT INTO kpis \
         (company_id, year, cac, ltv, burn_rate, revenue_growth, expense_growth, projection_years) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT (company_id, year) DO UPDATE SET \
         cac = excluded.cac, ltv = excluded.ltv, burn_rate = excluded.burn_rate, \
         revenue_growth = excluded.revenue_growth, expense_growth = excluded.expense_growth, \
         projection_years = excluded.projection_years",
        rusqlite::params![
            company_id,
            kpi.year,
            kpi.cac,
            kpi.ltv,
            kpi.burn_rate,
            kpi.revenue_growth,
            kpi.expense_growth,
            kpi.projection_years
        ],
    )?;
    Ok(())
}

pub fn get_kpi(conn: &Connection, company_id: i64, year: i32) -> Result<Option<Kpi>> {
    let kpi = conn
        .query_row(
            "SELECT year, cac, ltv, burn_rate, revenue_growth, expense_growth, projection_years \
             FROM kpis WHERE company_id = ?1 AND year = ?2",
            rusqlite::params![company_id, year],
            |row| {
                Ok(Kpi {
                    year: row.get(0)?,
                    cac: row.get(1)?,
                    ltv: row.get(2)?,
                    burn_rate: row.get(3)?,
                    revenue_growth: row.get(4)?,
                    expense_growth: row.get(5)?,
                    projection_years: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(kpi)
}

// ---------------------------------------------------------------------------
// Financial notes
// ---------------------------------------------------------------------------

pub fn save_financial_note(conn: &Connection, company_id: i64, note: &FinancialNote) -> Result<()> {
    require_finite("funding requirements", note.funding_requirements)?;
    conn.execute(
        "INSERT INTO financial_notes \
         (company_id, year, growth_strategy, business_risks, anomalies, funding_requirements, funding_allocation) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT (company_id, year) DO UPDATE SET \
         growth_strategy = excluded.growth_strategy, business_risks = excluded.business_risks, \
         anomalies = excluded.anomalies, funding_requirements = excluded.funding_requirements, \
         funding_allocation = excluded.funding_allocation",
        rusqlite::params![
            company_id,
            note.year,
            note.growth_strategy,
            note.business_risks,
            note.anomalies,
            note.funding_requirements,
            note.funding_allocation
        ],
    )?;
    Ok(())
}

pub fn get_financial_note(conn: &Connection, company_id: i64, year: i32) -> Result<Option<FinancialNote>> {
    let note = conn
        .query_row(
            "SELECT year, growth_strategy, business_risks, anomalies, funding_requirements, funding_allocation \
             FROM financial_notes WHERE company_id = ?1 AND year = ?2",
            rusqlite::params![company_id, year],
            |row| {
                Ok(FinancialNote {
                    year: row.get(0)?,
                    growth_strategy: row.get(1)?,
                    business_risks: row.get(2)?,
                    anomalies: row.get(3)?,
                    funding_requirements: row.get(4)?,
                    funding_allocation: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(note)
}
