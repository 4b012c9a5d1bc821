use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::settings::Settings;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    industry TEXT,
    founded_date TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS financial_data (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    revenue REAL NOT NULL DEFAULT 0,
    cogs REAL NOT NULL DEFAULT 0,
    operational_expenses REAL NOT NULL DEFAULT 0,
    other_expenses REAL NOT NULL DEFAULT 0,
    tax_rate REAL NOT NULL DEFAULT 0.2,
    UNIQUE (company_id, year, month),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS balance_sheets (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    current_assets REAL NOT NULL DEFAULT 0,
    fixed_assets REAL NOT NULL DEFAULT 0,
    short_term_liabilities REAL NOT NULL DEFAULT 0,
    long_term_liabilities REAL NOT NULL DEFAULT 0,
    owner_equity REAL NOT NULL DEFAULT 0,
    retained_earnings REAL NOT NULL DEFAULT 0,
    UNIQUE (company_id, year),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS cash_flows (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    operational_cash_flow REAL NOT NULL DEFAULT 0,
    investment_cash_flow REAL NOT NULL DEFAULT 0,
    financing_cash_flow REAL NOT NULL DEFAULT 0,
    UNIQUE (company_id, year, month),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS kpis (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    cac REAL NOT NULL DEFAULT 0,
    ltv REAL NOT NULL DEFAULT 0,
    burn_rate REAL NOT NULL DEFAULT 0,
    revenue_growth REAL NOT NULL DEFAULT 0.1,
    expense_growth REAL NOT NULL DEFAULT 0.08,
    projection_years INTEGER NOT NULL DEFAULT 3,
    UNIQUE (company_id, year),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS financial_notes (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    year INTEGER NOT NULL,
    growth_strategy TEXT,
    business_risks TEXT,
    anomalies TEXT,
    funding_requirements REAL NOT NULL DEFAULT 0,
    funding_allocation TEXT,
    UNIQUE (company_id, year),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS ledger_imports (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT,
    UNIQUE (company_id, checksum),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS ledger_entries (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    debit REAL NOT NULL DEFAULT 0,
    credit REAL NOT NULL DEFAULT 0,
    balance REAL NOT NULL DEFAULT 0,
    volume TEXT,
    category TEXT,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE,
    FOREIGN KEY (import_id) REFERENCES ledger_imports(id)
);

CREATE INDEX IF NOT EXISTS idx_ledger_company_order
    ON ledger_entries (company_id, date, id);

CREATE TABLE IF NOT EXISTS rubber_sales (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    factory TEXT NOT NULL,
    distance_km REAL NOT NULL DEFAULT 0,
    sell_price REAL NOT NULL DEFAULT 0,
    shrinkage_pct REAL NOT NULL DEFAULT 0,
    buy_price REAL NOT NULL DEFAULT 0,
    initial_weight REAL NOT NULL DEFAULT 0,
    shipping_cost REAL NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS market_risks (
    id INTEGER PRIMARY KEY,
    company_id INTEGER NOT NULL,
    aspect TEXT NOT NULL,
    risk TEXT NOT NULL,
    solution TEXT NOT NULL,
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS trading_notes (
    company_id INTEGER PRIMARY KEY,
    conclusion TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
);
";

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Open the store, retrying a bounded number of times with a fixed delay.
/// Exhausting the attempts surfaces a `Persistence` error.
pub fn connect_with_retry(db_path: &Path, attempts: u32, delay: Duration) -> Result<Connection> {
    let attempts = attempts.max(1);
    let mut last_err = String::new();
    for attempt in 1..=attempts {
        match get_connection(db_path) {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                log::warn!(
                    "opening {} failed (attempt {attempt}/{attempts}): {e}",
                    db_path.display()
                );
                last_err = e.to_string();
                if attempt < attempts {
                    std::thread::sleep(delay);
                }
            }
        }
    }
    Err(AppError::Persistence(format!(
        "{} after {attempts} attempts: {last_err}",
        db_path.display()
    )))
}

/// Open the configured database, making sure the schema exists.
pub fn open(settings: &Settings) -> Result<Connection> {
    let conn = connect_with_retry(
        &settings.db_path(),
        settings.db_retry_attempts,
        settings.retry_delay(),
    )?;
    init_db(&conn)?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
