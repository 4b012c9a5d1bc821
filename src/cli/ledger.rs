use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::money;
use crate::importer;
use crate::ledger;
use crate::models::NewLedgerEntry;
use crate::settings::resolve_company;

fn amount_cell(val: f64) -> Cell {
    Cell::new(money(val)).set_alignment(CellAlignment::Right)
}

pub fn add(
    company: Option<i64>,
    date: String,
    debit: f64,
    credit: f64,
    volume: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, mut conn) = open_db()?;
    let entry = ledger::insert_entry(
        &mut conn,
        company_id,
        &NewLedgerEntry { date, debit, credit, volume, category },
    )?;
    println!(
        "Added entry {} on {} (balance {})",
        entry.id,
        entry.date,
        money(entry.balance)
    );
    Ok(())
}

pub fn delete(company: Option<i64>, id: i64) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, mut conn) = open_db()?;
    let entry = ledger::get_entry(&conn, id, company_id)?;
    let changed = ledger::delete_entry(&mut conn, id, company_id)?;
    println!(
        "Deleted entry {id} ({}, debit {}, credit {}); {changed} balances updated",
        entry.date,
        money(entry.debit),
        money(entry.credit)
    );
    Ok(())
}

pub fn list(company: Option<i64>, from_date: Option<&str>, to_date: Option<&str>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let entries = ledger::list_entries(&conn, company_id, from_date, to_date)?;
    if entries.is_empty() {
        println!("No ledger entries.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["No", "ID", "Date", "Debit", "Credit", "Balance", "Volume", "Category"]);
    for (i, e) in entries.iter().enumerate() {
        let balance = if e.balance < 0.0 {
            Cell::new(money(e.balance).red()).set_alignment(CellAlignment::Right)
        } else {
            amount_cell(e.balance)
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(e.id),
            Cell::new(&e.date),
            amount_cell(e.debit),
            amount_cell(e.credit),
            balance,
            Cell::new(e.volume.as_deref().unwrap_or("")),
            Cell::new(e.category.as_deref().unwrap_or("")),
        ]);
    }
    let summary = ledger::summarize(&entries);
    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new("Total".bold()),
        amount_cell(summary.total_debit),
        amount_cell(summary.total_credit),
        amount_cell(summary.closing_balance),
        Cell::new(""),
        Cell::new(""),
    ]);
    println!("Budget Realization\n{table}");
    Ok(())
}

pub fn recompute(company: Option<i64>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, mut conn) = open_db()?;
    let changed = ledger::recompute_all(&mut conn, company_id)?;
    if changed == 0 {
        println!("All balances already consistent.");
    } else {
        println!("Repaired {changed} balances.");
    }
    Ok(())
}

pub fn check(company: Option<i64>) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let drift = ledger::find_drift(&conn, company_id)?;
    if drift.is_empty() {
        println!("{}", "Ledger balances are consistent.".green());
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Stored", "Expected"]);
    for d in &drift {
        table.add_row(vec![
            Cell::new(d.id),
            Cell::new(&d.date),
            amount_cell(d.stored),
            amount_cell(d.expected),
        ]);
    }
    println!("{}\n{table}", format!("{} inconsistent balances", drift.len()).red());
    println!("Run `ledgerdash ledger recompute` to repair.");
    Ok(())
}

pub fn import(company: Option<i64>, file: &str) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, mut conn) = open_db()?;
    let result = importer::import_ledger_csv(&mut conn, company_id, Path::new(file))?;
    if result.duplicate_file {
        println!("File already imported, skipped.");
    } else {
        println!("Imported {} entries from {file}", result.imported);
    }
    Ok(())
}

pub fn export(company: Option<i64>, output: &str) -> Result<()> {
    let company_id = resolve_company(company)?;
    let (_, conn) = open_db()?;
    let rows = importer::export_ledger_csv(&conn, company_id, Path::new(output))?;
    println!("Wrote {rows} entries to {output}");
    Ok(())
}
