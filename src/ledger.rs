//! Budget-realization ledger.
//!
//! Every company's entries carry a running balance. Ordered by
//! `(date, id)`, each row satisfies `balance = previous balance + debit - credit`
//! with the balance before the first row taken as zero. The balance column is
//! only ever written by [`rebalance_from`]; inserts and deletes call it inside
//! the same IMMEDIATE transaction as the row change, so a failure leaves the
//! ledger exactly as it was and concurrent writers are serialized on the
//! database write lock.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{require_finite, AppError, Result};
use crate::models::{LedgerEntry, NewLedgerEntry};

/// Where a partial recompute starts: the first row at or after this key.
#[derive(Debug, Clone, Copy)]
pub struct Position<'a> {
    pub date: &'a str,
    pub id: i64,
}

pub struct LedgerSummary {
    pub entries: usize,
    pub total_debit: f64,
    pub total_credit: f64,
    pub closing_balance: f64,
}

/// A stored balance that disagrees with the running total.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub id: i64,
    pub date: String,
    pub stored: f64,
    pub expected: f64,
}

/// Parse and normalize a `YYYY-MM-DD` date so text ordering matches date ordering.
pub fn normalize_date(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| AppError::Validation(format!("invalid date '{trimmed}', expected YYYY-MM-DD")))
}

fn validate_amount(field: &str, value: f64) -> Result<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(AppError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}

fn validate(entry: &NewLedgerEntry) -> Result<String> {
    let date = normalize_date(&entry.date)?;
    validate_amount("debit", entry.debit)?;
    validate_amount("credit", entry.credit)?;
    Ok(date)
}

pub(crate) fn ensure_company(conn: &Connection, company_id: i64) -> Result<()> {
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM companies WHERE id = ?1", [company_id], |r| r.get(0))
        .optional()?;
    match exists {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("company {company_id}"))),
    }
}

pub(crate) fn begin(conn: &mut Connection) -> Result<Transaction<'_>> {
    Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

/// Recompute balances for `company_id` from `start` (or from the first entry
/// when `None`) to the end of the ledger. Rows whose stored balance already
/// matches are left untouched. Returns the number of rows rewritten.
pub fn rebalance_from(tx: &Transaction, company_id: i64, start: Option<Position>) -> Result<usize> {
    let mut balance = match start {
        Some(pos) => tx
            .query_row(
                "SELECT balance FROM ledger_entries \
                 WHERE company_id = ?1 AND (date < ?2 OR (date = ?2 AND id < ?3)) \
                 ORDER BY date DESC, id DESC LIMIT 1",
                rusqlite::params![company_id, pos.date, pos.id],
                |r| r.get::<_, f64>(0),
            )
            .optional()?
            .unwrap_or(0.0),
        None => 0.0,
    };

    let rows: Vec<(i64, f64, f64, f64)> = match start {
        Some(pos) => {
            let mut stmt = tx.prepare(
                "SELECT id, debit, credit, balance FROM ledger_entries \
                 WHERE company_id = ?1 AND (date > ?2 OR (date = ?2 AND id >= ?3)) \
                 ORDER BY date, id",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![company_id, pos.date, pos.id], |r| {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = tx.prepare(
                "SELECT id, debit, credit, balance FROM ledger_entries \
                 WHERE company_id = ?1 ORDER BY date, id",
            )?;
            let rows = stmt
                .query_map([company_id], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows
        }
    };

    let mut update = tx.prepare("UPDATE ledger_entries SET balance = ?1 WHERE id = ?2")?;
    let mut changed = 0;
    for (id, debit, credit, stored) in rows {
        balance = balance + debit - credit;
        if stored != balance {
            update.execute(rusqlite::params![balance, id])?;
            changed += 1;
        }
    }
    log::debug!("company {company_id}: rebalanced {changed} ledger rows");
    Ok(changed)
}

/// Insert one entry inside an open transaction and rebalance from it onward.
pub(crate) fn insert_in_tx(
    tx: &Transaction,
    company_id: i64,
    entry: &NewLedgerEntry,
    import_id: Option<i64>,
) -> Result<LedgerEntry> {
    let date = validate(entry)?;
    tx.execute(
        "INSERT INTO ledger_entries (company_id, date, debit, credit, balance, volume, category, import_id) \
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)",
        rusqlite::params![
            company_id,
            date,
            entry.debit,
            entry.credit,
            entry.volume,
            entry.category,
            import_id
        ],
    )?;
    let id = tx.last_insert_rowid();
    rebalance_from(tx, company_id, Some(Position { date: &date, id }))?;
    let balance: f64 = tx.query_row(
        "SELECT balance FROM ledger_entries WHERE id = ?1",
        [id],
        |r| r.get(0),
    )?;
    Ok(LedgerEntry {
        id,
        company_id,
        date,
        debit: entry.debit,
        credit: entry.credit,
        balance,
        volume: entry.volume.clone(),
        category: entry.category.clone(),
    })
}

/// Add an entry to a company's ledger. The carry-in is the balance of the
/// latest entry ordered before it; every later entry is rebalanced. Returns
/// the stored entry with its computed balance.
pub fn insert_entry(conn: &mut Connection, company_id: i64, entry: &NewLedgerEntry) -> Result<LedgerEntry> {
    validate(entry)?;
    let tx = begin(conn)?;
    ensure_company(&tx, company_id)?;
    let stored = insert_in_tx(&tx, company_id, entry, None)?;
    tx.commit()?;
    log::info!(
        "company {company_id}: inserted ledger entry {} on {} (balance {})",
        stored.id,
        stored.date,
        stored.balance
    );
    Ok(stored)
}

/// Remove an entry and recompute the company's remaining ledger from zero.
/// Fails with `NotFound` when the entry does not belong to the company.
pub fn delete_entry(conn: &mut Connection, entry_id: i64, company_id: i64) -> Result<usize> {
    let tx = begin(conn)?;
    let removed = tx.execute(
        "DELETE FROM ledger_entries WHERE id = ?1 AND company_id = ?2",
        rusqlite::params![entry_id, company_id],
    )?;
    if removed == 0 {
        return Err(AppError::NotFound(format!(
            "ledger entry {entry_id} for company {company_id}"
        )));
    }
    let changed = rebalance_from(&tx, company_id, None)?;
    tx.commit()?;
    log::info!("company {company_id}: deleted ledger entry {entry_id}, rebalanced {changed} rows");
    Ok(changed)
}

/// Repair: recompute every balance of the company from scratch.
/// Returns the number of rows whose stored balance was wrong.
pub fn recompute_all(conn: &mut Connection, company_id: i64) -> Result<usize> {
    let tx = begin(conn)?;
    ensure_company(&tx, company_id)?;
    let changed = rebalance_from(&tx, company_id, None)?;
    tx.commit()?;
    if changed > 0 {
        log::warn!("company {company_id}: repaired {changed} drifted ledger balances");
    }
    Ok(changed)
}

pub fn get_entry(conn: &Connection, entry_id: i64, company_id: i64) -> Result<LedgerEntry> {
    conn.query_row(
        "SELECT id, company_id, date, debit, credit, balance, volume, category \
         FROM ledger_entries WHERE id = ?1 AND company_id = ?2",
        rusqlite::params![entry_id, company_id],
        map_entry,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("ledger entry {entry_id} for company {company_id}")))
}

fn map_entry(row: &rusqlite::Row) -> rusqlite::Result<LedgerEntry> {
    Ok(LedgerEntry {
        id: row.get(0)?,
        company_id: row.get(1)?,
        date: row.get(2)?,
        debit: row.get(3)?,
        credit: row.get(4)?,
        balance: row.get(5)?,
        volume: row.get(6)?,
        category: row.get(7)?,
    })
}

/// Entries in ledger order, optionally limited to an inclusive date range.
pub fn list_entries(
    conn: &Connection,
    company_id: i64,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<Vec<LedgerEntry>> {
    let from = from_date.map(normalize_date).transpose()?;
    let to = to_date.map(normalize_date).transpose()?;
    let mut stmt = conn.prepare(
        "SELECT id, company_id, date, debit, credit, balance, volume, category \
         FROM ledger_entries \
         WHERE company_id = ?1 \
           AND (?2 IS NULL OR date >= ?2) \
           AND (?3 IS NULL OR date <= ?3) \
         ORDER BY date, id",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![company_id, from, to], map_entry)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn summarize(entries: &[LedgerEntry]) -> LedgerSummary {
    LedgerSummary {
        entries: entries.len(),
        total_debit: entries.iter().map(|e| e.debit).sum(),
        total_credit: entries.iter().map(|e| e.credit).sum(),
        closing_balance: entries.last().map(|e| e.balance).unwrap_or(0.0),
    }
}

/// Read-only consistency check: which stored balances break the running total.
pub fn find_drift(conn: &Connection, company_id: i64) -> Result<Vec<Drift>> {
    let entries = list_entries(conn, company_id, None, None)?;
    let mut running = 0.0;
    let mut drift = Vec::new();
    for e in entries {
        running = running + e.debit - e.credit;
        if e.balance != running {
            drift.push(Drift {
                id: e.id,
                date: e.date,
                stored: e.balance,
                expected: running,
            });
        }
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_company(conn: &Connection, name: &str) -> i64 {
        conn.execute("INSERT INTO companies (name) VALUES (?1)", [name]).unwrap();
        conn.last_insert_rowid()
    }

    fn entry(date: &str, debit: f64, credit: f64) -> NewLedgerEntry {
        NewLedgerEntry {
            date: date.to_string(),
            debit,
            credit,
            volume: None,
            category: None,
        }
    }

    fn balances(conn: &Connection, company: i64) -> Vec<f64> {
        list_entries(conn, company, None, None)
            .unwrap()
            .iter()
            .map(|e| e.balance)
            .collect()
    }

    fn assert_invariant(conn: &Connection, company: i64) {
        let entries = list_entries(conn, company, None, None).unwrap();
        let mut prev = 0.0;
        for e in &entries {
            assert_eq!(e.balance, prev + e.debit - e.credit, "entry {} on {}", e.id, e.date);
            prev = e.balance;
        }
    }

    fn seed_example(conn: &mut Connection, company: i64) -> Vec<LedgerEntry> {
        vec![
            insert_entry(conn, company, &entry("2024-03-01", 1_000_000.0, 0.0)).unwrap(),
            insert_entry(conn, company, &entry("2024-03-05", 0.0, 859_000.0)).unwrap(),
            insert_entry(conn, company, &entry("2024-03-10", 10_000_000.0, 0.0)).unwrap(),
        ]
    }

    #[test]
    fn test_insert_in_date_order() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let inserted = seed_example(&mut conn, company);
        assert_eq!(inserted[0].balance, 1_000_000.0);
        assert_eq!(inserted[1].balance, 141_000.0);
        assert_eq!(inserted[2].balance, 10_141_000.0);
        assert_eq!(balances(&conn, company), vec![1_000_000.0, 141_000.0, 10_141_000.0]);
    }

    #[test]
    fn test_delete_middle_entry() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let inserted = seed_example(&mut conn, company);
        delete_entry(&mut conn, inserted[1].id, company).unwrap();
        assert_eq!(balances(&conn, company), vec![1_000_000.0, 11_000_000.0]);
    }

    #[test]
    fn test_insert_before_existing_shifts_only_balances() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        seed_example(&mut conn, company);
        let before: Vec<(f64, f64)> = list_entries(&conn, company, None, None)
            .unwrap()
            .iter()
            .map(|e| (e.debit, e.credit))
            .collect();

        let early = insert_entry(&mut conn, company, &entry("2024-01-15", 500.0, 0.0)).unwrap();
        assert_eq!(early.balance, 500.0);

        let after = list_entries(&conn, company, None, None).unwrap();
        assert_eq!(after[0].id, early.id);
        let rest: Vec<(f64, f64)> = after[1..].iter().map(|e| (e.debit, e.credit)).collect();
        assert_eq!(rest, before);
        assert_eq!(
            balances(&conn, company),
            vec![500.0, 1_000_500.0, 141_500.0, 10_141_500.0]
        );
    }

    #[test]
    fn test_same_date_ties_follow_insertion_order() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let first = insert_entry(&mut conn, company, &entry("2024-05-01", 100.0, 0.0)).unwrap();
        insert_entry(&mut conn, company, &entry("2024-05-02", 0.0, 30.0)).unwrap();
        let second = insert_entry(&mut conn, company, &entry("2024-05-01", 0.0, 40.0)).unwrap();
        assert_eq!(second.balance, 60.0);
        let entries = list_entries(&conn, company, None, None).unwrap();
        assert_eq!(entries[0].id, first.id);
        assert_eq!(entries[1].id, second.id);
        assert_eq!(balances(&conn, company), vec![100.0, 60.0, 30.0]);
    }

    #[test]
    fn test_delete_only_entry_leaves_empty_ledger() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let only = insert_entry(&mut conn, company, &entry("2024-02-01", 10.0, 0.0)).unwrap();
        assert_eq!(delete_entry(&mut conn, only.id, company).unwrap(), 0);
        assert!(list_entries(&conn, company, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_entry_is_not_found() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let err = delete_entry(&mut conn, 42, company).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "got: {err}");
    }

    #[test]
    fn test_delete_checks_company_ownership() {
        let (_dir, mut conn) = test_db();
        let a = add_company(&conn, "A");
        let b = add_company(&conn, "B");
        let e = insert_entry(&mut conn, a, &entry("2024-02-01", 10.0, 0.0)).unwrap();
        assert!(matches!(delete_entry(&mut conn, e.id, b), Err(AppError::NotFound(_))));
        assert_eq!(list_entries(&conn, a, None, None).unwrap().len(), 1);
    }

    #[test]
    fn test_companies_have_independent_ledgers() {
        let (_dir, mut conn) = test_db();
        let a = add_company(&conn, "A");
        let b = add_company(&conn, "B");
        insert_entry(&mut conn, a, &entry("2024-01-01", 100.0, 0.0)).unwrap();
        insert_entry(&mut conn, b, &entry("2024-01-01", 7.0, 0.0)).unwrap();
        insert_entry(&mut conn, a, &entry("2024-01-02", 0.0, 25.0)).unwrap();
        assert_eq!(balances(&conn, a), vec![100.0, 75.0]);
        assert_eq!(balances(&conn, b), vec![7.0]);
    }

    #[test]
    fn test_recompute_all_is_idempotent() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        seed_example(&mut conn, company);
        assert_eq!(recompute_all(&mut conn, company).unwrap(), 0);
        assert_eq!(recompute_all(&mut conn, company).unwrap(), 0);
        assert_eq!(balances(&conn, company), vec![1_000_000.0, 141_000.0, 10_141_000.0]);
    }

    #[test]
    fn test_recompute_all_repairs_out_of_band_edits() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let inserted = seed_example(&mut conn, company);
        conn.execute(
            "UPDATE ledger_entries SET balance = 1 WHERE id = ?1",
            [inserted[1].id],
        )
        .unwrap();
        assert_eq!(find_drift(&conn, company).unwrap().len(), 1);
        assert_eq!(recompute_all(&mut conn, company).unwrap(), 1);
        assert!(find_drift(&conn, company).unwrap().is_empty());
        assert_invariant(&conn, company);
    }

    #[test]
    fn test_recompute_empty_ledger() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Empty");
        assert_eq!(recompute_all(&mut conn, company).unwrap(), 0);
    }

    #[test]
    fn test_unknown_company_is_not_found() {
        let (_dir, mut conn) = test_db();
        let err = insert_entry(&mut conn, 9, &entry("2024-01-01", 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(recompute_all(&mut conn, 9), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_rejects_negative_amounts_and_bad_dates() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        let err = insert_entry(&mut conn, company, &entry("2024-01-01", -5.0, 0.0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = insert_entry(&mut conn, company, &entry("2024-01-01", 0.0, f64::NAN)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = insert_entry(&mut conn, company, &entry("01/02/2024", 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(list_entries(&conn, company, None, None).unwrap().is_empty());
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        seed_example(&mut conn, company);
        {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).unwrap();
            insert_in_tx(&tx, company, &entry("2024-03-02", 5.0, 0.0), None).unwrap();
            // dropped without commit
        }
        assert_eq!(balances(&conn, company), vec![1_000_000.0, 141_000.0, 10_141_000.0]);
    }

    #[test]
    fn test_list_entries_date_range() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        seed_example(&mut conn, company);
        let march_early = list_entries(&conn, company, Some("2024-03-02"), Some("2024-03-09")).unwrap();
        assert_eq!(march_early.len(), 1);
        assert_eq!(march_early[0].balance, 141_000.0);
    }

    #[test]
    fn test_summarize() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        seed_example(&mut conn, company);
        let s = summarize(&list_entries(&conn, company, None, None).unwrap());
        assert_eq!(s.entries, 3);
        assert_eq!(s.total_debit, 11_000_000.0);
        assert_eq!(s.total_credit, 859_000.0);
        assert_eq!(s.closing_balance, 10_141_000.0);
    }

    #[test]
    fn test_mixed_operations_keep_invariant() {
        let (_dir, mut conn) = test_db();
        let company = add_company(&conn, "Karet Jaya");
        // Deterministic LCG so the sequence is reproducible.
        let mut seed: u64 = 0x2545_f491;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as u32
        };
        let mut ids = Vec::new();
        for _ in 0..60 {
            if ids.is_empty() || next() % 3 != 0 {
                let day = 1 + next() % 28;
                let month = 1 + next() % 12;
                let amount = (next() % 10_000) as f64 * 100.0;
                let e = if next() % 2 == 0 {
                    entry(&format!("2024-{month:02}-{day:02}"), amount, 0.0)
                } else {
                    entry(&format!("2024-{month:02}-{day:02}"), 0.0, amount)
                };
                ids.push(insert_entry(&mut conn, company, &e).unwrap().id);
            } else {
                let idx = next() as usize % ids.len();
                let id = ids.swap_remove(idx);
                delete_entry(&mut conn, id, company).unwrap();
            }
            assert_invariant(&conn, company);
        }
        assert_eq!(recompute_all(&mut conn, company).unwrap(), 0);
    }
}
