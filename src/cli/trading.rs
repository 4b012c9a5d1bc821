use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{MarketRisk, RubberSale};
use crate::settings::resolve_company;
use crate::trading::{self, Recommendation};

fn amount_cell(val: f64) -> Cell {
    Cell::new(money(val)).set_alignment(CellAlignment::Right)
}

pub fn add_sale(company: Option<i64>, sale: RubberSale) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let id = trading::add_rubber_sale(&conn, company_id, &sale)?;
    println!("Added sale plan {id}: {}", sale.factory.trim());
    Ok(())
}

pub fn list_sales(company: Option<i64>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let rows = trading::analyze_sales(&trading::list_rubber_sales(&conn, company_id)?);
    if rows.is_empty() {
        println!("No rubber sales planned.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Factory", "Km", "Sell/kg", "Shrink", "Buy/kg", "Weight", "Sold", "Total Sell",
        "Total Buy", "Gross", "Shipping", "Net", "Recommendation",
    ]);
    for r in &rows {
        let s = &r.sale;
        let rec = match r.recommendation {
            Recommendation::Recommended => r.recommendation.label().green().bold(),
            Recommendation::Viable => r.recommendation.label().normal(),
            Recommendation::NotProfitable => r.recommendation.label().red(),
        };
        table.add_row(vec![
            Cell::new(s.id.unwrap_or_default()),
            Cell::new(&s.factory),
            Cell::new(format!("{:.0}", s.distance_km)),
            amount_cell(s.sell_price),
            Cell::new(format!("{:.1}%", s.shrinkage_pct)),
            amount_cell(s.buy_price),
            Cell::new(format!("{:.0} kg", s.initial_weight)),
            Cell::new(format!("{:.0} kg", r.sold_weight)),
            amount_cell(r.total_sell),
            amount_cell(r.total_buy),
            amount_cell(r.gross_profit),
            amount_cell(s.shipping_cost),
            amount_cell(r.net_profit),
            Cell::new(rec),
        ]);
    }
    println!("Rubber Sales Plan\n{table}");
    Ok(())
}

pub fn delete_sale(company: Option<i64>, id: i64) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    trading::delete_rubber_sale(&conn, id, company_id)?;
    println!("Deleted sale plan {id}");
    Ok(())
}

pub fn add_risk(company: Option<i64>, risk: MarketRisk) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let id = trading::add_market_risk(&conn, company_id, &risk)?;
    println!("Added risk {id}: {}", risk.aspect.trim());
    Ok(())
}

pub fn list_risks(company: Option<i64>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let risks = trading::list_market_risks(&conn, company_id)?;
    if risks.is_empty() {
        println!("No market risks recorded.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["No", "ID", "Aspect", "Risk", "Solution"]);
    for (i, r) in risks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(r.id.unwrap_or_default()),
            Cell::new(&r.aspect),
            Cell::new(&r.risk),
            Cell::new(&r.solution),
        ]);
    }
    println!("Market Strategy and Risks\n{table}");
    Ok(())
}

pub fn delete_risk(company: Option<i64>, id: i64) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    trading::delete_market_risk(&conn, id, company_id)?;
    println!("Deleted risk {id}");
    Ok(())
}

pub fn conclusion(company: Option<i64>, text: Option<&str>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    match text {
        Some(t) => {
            trading::set_conclusion(&conn, company_id, t)?;
            println!("Saved conclusion.");
        }
        None => match trading::get_conclusion(&conn, company_id)? {
            Some(c) => println!("{c}"),
            None => println!("No conclusion written yet."),
        },
    }
    Ok(())
}
