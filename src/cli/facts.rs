use crate::cli::{open_db, SetCommands};
use crate::error::Result;
use crate::models::{BalanceSheet, CashFlow, FinancialNote, Kpi, MonthlyFinancials};
use crate::settings::resolve_company;
use crate::store;

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn run(company: Option<i64>, command: SetCommands) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (settings, conn) = open_db()?;
    store::get_company(&conn, company_id)?;

    match command {
        SetCommands::Income { year, month, revenue, cogs, opex, other, tax_rate } => {
            store::save_financial_data(
                &conn,
                company_id,
                &MonthlyFinancials {
                    year,
                    month,
                    revenue,
                    cogs,
                    operational_expenses: opex,
                    other_expenses: other,
                    tax_rate: tax_rate.unwrap_or(settings.tax_rate),
                },
            )?;
            println!("Saved income data for {year}-{month:02}");
        }
        SetCommands::Balance {
            year,
            current_assets,
            fixed_assets,
            short_term_liabilities,
            long_term_liabilities,
            owner_equity,
            retained_earnings,
        } => {
            let bs = BalanceSheet {
                year,
                current_assets,
                fixed_assets,
                short_term_liabilities,
                long_term_liabilities,
                owner_equity,
                retained_earnings,
            };
            store::save_balance_sheet(&conn, company_id, &bs)?;
            println!("Saved balance sheet for {year}");
            let gap = bs.total_assets() - bs.total_liabilities() - bs.total_equity();
            if gap.abs() >= 0.01 {
                println!("Warning: assets differ from liabilities plus equity by {}", crate::fmt::money(gap));
            }
        }
        SetCommands::Cashflow { year, month, operational, investment, financing } => {
            store::save_cash_flow(
                &conn,
                company_id,
                &CashFlow { year, month, operational, investment, financing },
            )?;
            println!("Saved cash flow for {year}-{month:02}");
        }
        SetCommands::Kpi {
            year,
            cac,
            ltv,
            burn_rate,
            revenue_growth,
            expense_growth,
            projection_years,
        } => {
            store::save_kpi(
                &conn,
                company_id,
                &Kpi { year, cac, ltv, burn_rate, revenue_growth, expense_growth, projection_years },
            )?;
            println!("Saved KPIs for {year}");
        }
        SetCommands::Notes { year, growth_strategy, risks, anomalies, funding, allocation } => {
            store::save_financial_note(
                &conn,
                company_id,
                &FinancialNote {
                    year,
                    growth_strategy: non_empty(growth_strategy),
                    business_risks: non_empty(risks),
                    anomalies: non_empty(anomalies),
                    funding_requirements: funding,
                    funding_allocation: non_empty(allocation),
                },
            )?;
            println!("Saved notes for {year}");
        }
    }
    Ok(())
}
