use crate::db;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;
use crate::store;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("User:       {}", if settings.user_name.is_empty() { "(not set)" } else { &settings.user_name });
    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `ledgerdash init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = db::open(&settings)?;
    let default = match settings.default_company {
        Some(id) => match store::get_company(&conn, id) {
            Ok(c) => format!("{} ({id})", c.name),
            Err(_) => format!("{id} (missing)"),
        },
        None => "(not set)".to_string(),
    };
    println!("Company:    {default}");

    let count = |table: &str| -> Result<i64> {
        Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
    };
    println!();
    println!("Companies:       {}", count("companies")?);
    println!("Income months:   {}", count("financial_data")?);
    println!("Cash flows:      {}", count("cash_flows")?);
    println!("Ledger entries:  {}", count("ledger_entries")?);
    println!("Rubber plans:    {}", count("rubber_sales")?);
    Ok(())
}
