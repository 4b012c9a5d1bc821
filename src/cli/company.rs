use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::settings::save_settings;
use crate::store;

pub fn add(name: &str, industry: Option<&str>, founded: Option<&str>) -> Result<()> {
    let (mut settings, conn) = open_db()?;
    let id = store::create_company(&conn, name, industry, founded)?;
    println!("Added company {id}: {}", name.trim());
    if settings.default_company.is_none() {
        settings.default_company = Some(id);
        save_settings(&settings)?;
        println!("Using company {id} by default.");
    }
    Ok(())
}

pub fn list() -> Result<()> {
    let (settings, conn) = open_db()?;
    let companies = store::list_companies(&conn)?;
    if companies.is_empty() {
        println!("No companies yet. Run `ledgerdash company add <name>`.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["", "ID", "Name", "Industry", "Founded"]);
    for c in companies {
        let marker = if settings.default_company == Some(c.id) { "*" } else { "" };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(c.id),
            Cell::new(c.name),
            Cell::new(c.industry.unwrap_or_default()),
            Cell::new(c.founded_date.unwrap_or_default()),
        ]);
    }
    println!("Companies\n{table}");
    Ok(())
}

pub fn use_company(id: i64) -> Result<()> {
    let (mut settings, conn) = open_db()?;
    let company = store::get_company(&conn, id)?;
    settings.default_company = Some(id);
    save_settings(&settings)?;
    println!("Using company {id}: {}", company.name);
    Ok(())
}
