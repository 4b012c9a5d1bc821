use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::ledger;
use crate::models::NewLedgerEntry;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount cell. Accepts an `Rp` prefix, blank cells (zero) and
/// either separator convention: `1,234.56` or Indonesian `1.234,56`. A lone
/// separator followed by exactly three digits is read as thousands, any
/// other lone separator as the decimal point. Anything else is `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace('"', "");
    let s = s.trim();
    let s = s.strip_prefix("Rp").unwrap_or(s).trim();
    if s.is_empty() || s == "-" {
        return Some(0.0);
    }
    let decimal = match (s.rfind(','), s.rfind('.')) {
        (Some(c), Some(d)) => Some(if c > d { ',' } else { '.' }),
        (Some(_), None) => lone_separator(s, ',')?,
        (None, Some(_)) => lone_separator(s, '.')?,
        (None, None) => None,
    };
    let normalized: String = s
        .chars()
        .filter(|ch| Some(*ch) == decimal || (*ch != ',' && *ch != '.'))
        .map(|ch| if Some(ch) == decimal { '.' } else { ch })
        .collect();
    normalized.parse().ok()
}

/// Classify `sep` when it is the only separator kind in `s`: `Some(None)`
/// for thousands grouping, `Some(Some(sep))` for a decimal point, `None`
/// when it is neither.
fn lone_separator(s: &str, sep: char) -> Option<Option<char>> {
    let groups: Vec<&str> = s.split(sep).collect();
    let grouped = groups[1..]
        .iter()
        .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
    if grouped {
        Some(None)
    } else if groups.len() == 2 {
        Some(Some(sep))
    } else {
        None
    }
}

/// Accepts `YYYY-MM-DD` or day-first `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(date) = ledger::normalize_date(raw) {
        return Some(date);
    }
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let d: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let y: i32 = parts[2].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(y, m, d).map(|dt| dt.format("%Y-%m-%d").to_string())
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn optional_text(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

struct Columns {
    date: usize,
    debit: usize,
    credit: usize,
    volume: Option<usize>,
    category: Option<usize>,
}

impl Columns {
    fn from_header(record: &csv::StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|f| names.contains(&f.trim().to_lowercase().as_str()))
        };
        Some(Columns {
            date: find(&["date", "tanggal"])?,
            debit: find(&["debit", "debet"])?,
            credit: find(&["credit", "kredit"])?,
            volume: find(&["volume"]),
            category: find(&["category", "kategori"]),
        })
    }
}

/// Read a ledger CSV. The header row may appear after preamble lines and
/// must name at least date, debit and credit columns. Every data row must
/// parse; the first bad row fails the whole file.
pub fn parse_ledger_csv(file_path: &Path) -> Result<Vec<NewLedgerEntry>> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut columns: Option<Columns> = None;
    let mut rows = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let line = line + 1;
        if columns.is_none() {
            columns = Columns::from_header(&record);
            continue;
        }
        let Some(cols) = columns.as_ref() else { continue };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let field = |i: usize| record.get(i).unwrap_or("");
        let date = parse_date(field(cols.date)).ok_or_else(|| {
            AppError::Validation(format!("line {line}: invalid date '{}'", field(cols.date).trim()))
        })?;
        let debit = parse_amount(field(cols.debit)).ok_or_else(|| {
            AppError::Validation(format!("line {line}: invalid debit '{}'", field(cols.debit).trim()))
        })?;
        let credit = parse_amount(field(cols.credit)).ok_or_else(|| {
            AppError::Validation(format!("line {line}: invalid credit '{}'", field(cols.credit).trim()))
        })?;
        for (name, value) in [("debit", debit), ("credit", credit)] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Validation(format!(
                    "line {line}: {name} must be a non-negative number, got '{value}'"
                )));
            }
        }
        rows.push(NewLedgerEntry {
            date,
            debit,
            credit,
            volume: optional_text(&record, cols.volume),
            category: optional_text(&record, cols.category),
        });
    }

    if columns.is_none() {
        return Err(AppError::Validation(
            "no header row with date, debit and credit columns".to_string(),
        ));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// import / export
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicate_file: bool,
}

/// Import a ledger CSV into a company. All rows land in one IMMEDIATE
/// transaction, each inserted through the ledger so balances stay
/// consistent; any bad row rolls the whole file back. A file whose
/// checksum was already imported for the company is skipped.
pub fn import_ledger_csv(conn: &mut Connection, company_id: i64, file_path: &Path) -> Result<ImportResult> {
    let checksum = compute_checksum(file_path)?;
    let parsed = parse_ledger_csv(file_path)?;

    // Duplicate check runs under the write lock.
    let tx = ledger::begin(conn)?;
    ledger::ensure_company(&tx, company_id)?;
    let seen = tx
        .prepare("SELECT 1 FROM ledger_imports WHERE checksum = ?1 AND company_id = ?2")?
        .exists(rusqlite::params![checksum, company_id])?;
    if seen {
        log::info!("company {company_id}: {} already imported", file_path.display());
        return Ok(ImportResult {
            imported: 0,
            duplicate_file: true,
        });
    }
    tx.execute(
        "INSERT INTO ledger_imports (company_id, filename, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            company_id,
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            parsed.len() as i64,
            checksum,
        ],
    )?;
    let import_id = tx.last_insert_rowid();
    for entry in &parsed {
        ledger::insert_in_tx(&tx, company_id, entry, Some(import_id))?;
    }
    tx.commit()?;

    log::info!(
        "company {company_id}: imported {} ledger rows from {}",
        parsed.len(),
        file_path.display()
    );
    Ok(ImportResult {
        imported: parsed.len(),
        duplicate_file: false,
    })
}

/// Write the company's ledger, balances included, as CSV. Returns the row count.
pub fn export_ledger_csv(conn: &Connection, company_id: i64, output: &Path) -> Result<usize> {
    ledger::ensure_company(conn, company_id)?;
    let entries = ledger::list_entries(conn, company_id, None, None)?;
    let mut wtr = csv::Writer::from_path(output)?;
    wtr.write_record(["date", "debit", "credit", "balance", "volume", "category"])?;
    for e in &entries {
        wtr.write_record([
            e.date.clone(),
            format!("{:.2}", e.debit),
            format!("{:.2}", e.credit),
            format!("{:.2}", e.balance),
            e.volume.clone().unwrap_or_default(),
            e.category.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(entries.len())
}
