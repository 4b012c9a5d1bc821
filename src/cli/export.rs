use std::path::{Path, PathBuf};

use crate::cli::{current_year, open_db};
use crate::error::Result;
use crate::pdf::{self, TradingReport};
use crate::reports::{self, PeriodType};
use crate::settings::{resolve_company, Settings};
use crate::{ledger, store, trading};

fn default_path(settings: &Settings, name: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    PathBuf::from(&settings.data_dir)
        .join("exports")
        .join(format!("{name}-{date}.pdf"))
}

fn write_pdf(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn financial(
    company: Option<i64>,
    year: Option<i32>,
    period: PeriodType,
    output: Option<String>,
) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (settings, conn) = open_db()?;
    let input = reports::load_report_input(
        &conn,
        company_id,
        year.unwrap_or_else(current_year),
        3,
        settings.tax_rate,
    )?;
    let bytes = pdf::render_financial_report(&input, period)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&settings, "financial-report"));
    write_pdf(&bytes, &path)
}

pub fn trading(company: Option<i64>, output: Option<String>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (settings, conn) = open_db()?;
    let company = store::get_company(&conn, company_id)?;
    let sales = trading::analyze_sales(&trading::list_rubber_sales(&conn, company_id)?);
    let risks = trading::list_market_risks(&conn, company_id)?;
    let entries = ledger::list_entries(&conn, company_id, None, None)?;
    let conclusion = trading::get_conclusion(&conn, company_id)?;
    let bytes = pdf::render_trading_report(&TradingReport {
        company: &company,
        sales: &sales,
        risks: &risks,
        ledger: &entries,
        conclusion: conclusion.as_deref(),
    })?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&settings, "trading-report"));
    write_pdf(&bytes, &path)
}
