use assert_cmd::Command;
use predicates::prelude::*;

/// Isolated home and data directory for one test.
struct Env {
    home: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Env {
            home: tempfile::tempdir().unwrap(),
        };
        let data_dir = env.home.path().join("data");
        env.cmd()
            .args(["init", "--data-dir", data_dir.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized ledgerdash"));
        env
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ledgerdash").unwrap();
        cmd.env("HOME", self.home.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn with_company(&self) -> &Self {
        self.cmd()
            .args(["company", "add", "PT Uji"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Using company 1 by default"));
        self
    }
}

#[test]
fn ledger_balances_follow_inserts_and_deletes() {
    let env = Env::new();
    env.with_company();

    env.cmd()
        .args(["ledger", "add", "2025-01-01", "--debit", "1000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("balance Rp1,000,000"));
    env.cmd()
        .args(["ledger", "add", "2025-01-02", "--credit", "859000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("balance Rp141,000"));
    env.cmd()
        .args(["ledger", "add", "2025-01-03", "--debit", "10000000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("balance Rp10,141,000"));

    env.cmd().args(["ledger", "delete", "2"]).assert().success();

    env.cmd()
        .args(["ledger", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp11,000,000"))
        .stdout(predicate::str::contains("Rp141,000").not());

    env.cmd()
        .args(["ledger", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent"));
}

#[test]
fn ledger_add_before_existing_entry_shifts_later_balances() {
    let env = Env::new();
    env.with_company();
    env.cmd()
        .args(["ledger", "add", "2025-02-01", "--debit", "500"])
        .assert()
        .success();
    env.cmd()
        .args(["ledger", "add", "2025-01-15", "--debit", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("balance Rp200"));
    env.cmd()
        .args(["ledger", "list", "--from", "2025-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rp700"));
}

#[test]
fn deleting_unknown_entry_fails() {
    let env = Env::new();
    env.with_company();
    env.cmd()
        .args(["ledger", "delete", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn negative_amount_is_rejected() {
    let env = Env::new();
    env.with_company();
    env.cmd()
        .args(["ledger", "add", "2025-01-01", "--debit=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn commands_need_a_company() {
    let env = Env::new();
    env.cmd()
        .args(["ledger", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no company selected"));
}

#[test]
fn ledger_csv_import_and_duplicate_skip() {
    let env = Env::new();
    env.with_company();
    let csv = env.home.path().join("ledger.csv");
    std::fs::write(
        &csv,
        "date,debit,credit,category\n2025-01-01,1000000,0,Capital\n2025-01-02,0,859000,Purchase\n",
    )
    .unwrap();
    env.cmd()
        .args(["ledger", "import", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 entries"));
    env.cmd()
        .args(["ledger", "import", csv.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("already imported"));
}

#[test]
fn quarterly_income_statement() {
    let env = Env::new();
    env.with_company();
    for month in ["1", "2", "3"] {
        env.cmd()
            .args([
                "set", "income", "--year", "2025", "--month", month, "--revenue", "1000000",
                "--cogs", "400000",
            ])
            .assert()
            .success();
    }
    env.cmd()
        .args(["report", "income", "--year", "2025", "--period", "quarterly"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Q1"))
        .stdout(predicate::str::contains("Rp3,000,000"));
}

#[test]
fn invalid_month_is_rejected() {
    let env = Env::new();
    env.with_company();
    env.cmd()
        .args(["set", "income", "--year", "2025", "--month", "13", "--revenue", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("month must be 1-12"));
}

#[test]
fn extreme_year_is_rejected() {
    let env = Env::new();
    env.with_company();
    env.cmd()
        .args(["report", "dashboard", "--year", "2147483647"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2147483647"));
}

#[test]
fn demo_then_reports() {
    let env = Env::new();
    env.cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Demo data loaded"));
    env.cmd()
        .args(["report", "dashboard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PT Contoh Indonesia"))
        .stdout(predicate::str::contains("Rp78,000,000"));
    env.cmd()
        .args(["report", "balance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balanced"));
    env.cmd()
        .args(["report", "kpi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Burn Rate"))
        .stdout(predicate::str::contains("4.00"));
    env.cmd()
        .args(["rubber", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommended"));
    env.cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("already loaded"));
}

#[cfg(feature = "pdf")]
#[test]
fn export_trading_report_pdf() {
    let env = Env::new();
    env.cmd().arg("demo").assert().success();
    let out = env.home.path().join("trading.pdf");
    env.cmd()
        .args(["export", "trading", "--output", out.to_str().unwrap()])
        .assert()
        .success();
    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn status_and_completions() {
    let env = Env::new();
    env.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgerdash.db"));
    env.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ledgerdash"));
}
