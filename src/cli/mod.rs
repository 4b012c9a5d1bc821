pub mod backup;
pub mod company;
pub mod demo;
#[cfg(feature = "pdf")]
pub mod export;
pub mod facts;
pub mod init;
pub mod ledger;
pub mod report;
pub mod status;
pub mod trading;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::reports::PeriodType;
use crate::settings::{load_settings, Settings};

/// Load settings and open the configured database.
pub(crate) fn open_db() -> Result<(Settings, Connection)> {
    let settings = load_settings();
    let conn = db::open(&settings)?;
    Ok((settings, conn))
}

fn year_arg() -> clap::builder::RangedI64ValueParser<i32> {
    clap::value_parser!(i32).range(
        i64::from(*crate::reports::YEAR_RANGE.start())..=i64::from(*crate::reports::YEAR_RANGE.end()),
    )
}

pub(crate) fn current_year() -> i32 {
    chrono::Datelike::year(&chrono::Local::now())
}

#[derive(Parser)]
#[command(
    name = "ledgerdash",
    version,
    about = "Financial statements, projections and budget-realization ledgers for small businesses."
)]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Company ID to act on (default: the company chosen with `company use`)
    #[arg(long, global = true)]
    pub company: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for ledgerdash data (default: ~/Documents/ledgerdash)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Your name, shown by `status`
        #[arg(long = "user-name")]
        user_name: Option<String>,
    },
    /// Manage companies.
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },
    /// Record financial facts for a company.
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },
    /// Budget-realization ledger with running balances.
    Ledger {
        #[command(subcommand)]
        command: LedgerCommands,
    },
    /// Rubber sales plan, one row per factory.
    Rubber {
        #[command(subcommand)]
        command: RubberCommands,
    },
    /// Market strategy and risk table.
    Risk {
        #[command(subcommand)]
        command: RiskCommands,
    },
    /// Show or set the trading conclusion.
    Conclusion {
        /// New conclusion text; omit to show the current one
        text: Option<String>,
    },
    /// Print reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export reports to PDF.
    #[cfg(feature = "pdf")]
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Create a sample company with a year of data.
    Demo,
    /// Show current database and summary statistics.
    Status,
    /// Back up the database.
    Backup {
        /// Output path (default: <data_dir>/backups/ledgerdash-YYYYMMDD-HHMMSS.db)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum CompanyCommands {
    /// Add a company and make it the default if none is set.
    Add {
        name: String,
        #[arg(long)]
        industry: Option<String>,
        /// Founding date: YYYY-MM-DD
        #[arg(long)]
        founded: Option<String>,
    },
    /// List companies.
    List,
    /// Make a company the default for later commands.
    Use { id: i64 },
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Monthly income data.
    Income {
        #[arg(long, value_parser = year_arg())]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, default_value = "0")]
        revenue: f64,
        #[arg(long, default_value = "0")]
        cogs: f64,
        /// Operational expenses
        #[arg(long, default_value = "0")]
        opex: f64,
        #[arg(long, default_value = "0")]
        other: f64,
        /// Tax rate as a fraction (default from settings)
        #[arg(long = "tax-rate")]
        tax_rate: Option<f64>,
    },
    /// Year-end balance sheet.
    Balance {
        #[arg(long, value_parser = year_arg())]
        year: i32,
        #[arg(long = "current-assets", default_value = "0")]
        current_assets: f64,
        #[arg(long = "fixed-assets", default_value = "0")]
        fixed_assets: f64,
        #[arg(long = "short-term-liabilities", default_value = "0")]
        short_term_liabilities: f64,
        #[arg(long = "long-term-liabilities", default_value = "0")]
        long_term_liabilities: f64,
        #[arg(long = "owner-equity", default_value = "0")]
        owner_equity: f64,
        #[arg(long = "retained-earnings", default_value = "0")]
        retained_earnings: f64,
    },
    /// Monthly cash flow.
    Cashflow {
        #[arg(long, value_parser = year_arg())]
        year: i32,
        #[arg(long)]
        month: u32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        operational: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        investment: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        financing: f64,
    },
    /// Yearly KPIs and projection assumptions.
    Kpi {
        #[arg(long, value_parser = year_arg())]
        year: i32,
        #[arg(long, default_value = "0")]
        cac: f64,
        #[arg(long, default_value = "0")]
        ltv: f64,
        #[arg(long = "burn-rate", default_value = "0")]
        burn_rate: f64,
        #[arg(long = "revenue-growth", default_value = "0.1", allow_hyphen_values = true)]
        revenue_growth: f64,
        #[arg(long = "expense-growth", default_value = "0.08", allow_hyphen_values = true)]
        expense_growth: f64,
        #[arg(long = "projection-years", default_value = "3")]
        projection_years: u32,
    },
    /// Yearly notes and funding needs.
    Notes {
        #[arg(long, value_parser = year_arg())]
        year: i32,
        #[arg(long = "growth-strategy")]
        growth_strategy: Option<String>,
        #[arg(long)]
        risks: Option<String>,
        #[arg(long)]
        anomalies: Option<String>,
        /// Funding requirement amount
        #[arg(long, default_value = "0")]
        funding: f64,
        #[arg(long)]
        allocation: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LedgerCommands {
    /// Add an entry; its balance and every later balance are computed.
    Add {
        /// Date: YYYY-MM-DD
        date: String,
        #[arg(long, default_value = "0")]
        debit: f64,
        #[arg(long, default_value = "0")]
        credit: f64,
        #[arg(long)]
        volume: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an entry and recompute the remaining balances.
    Delete { id: i64 },
    /// List entries with running balances.
    List {
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Recompute every balance from scratch.
    Recompute,
    /// Report stored balances that disagree with the running total.
    Check,
    /// Import entries from a CSV with date, debit and credit columns.
    Import { file: String },
    /// Export the ledger to CSV.
    Export {
        #[arg(long)]
        output: String,
    },
}

#[derive(Subcommand)]
pub enum RubberCommands {
    /// Add a factory to the sales plan.
    Add {
        factory: String,
        #[arg(long, default_value = "0")]
        distance: f64,
        /// Sell price per kg
        #[arg(long = "sell-price")]
        sell_price: f64,
        /// Weight lost before sale, in percent
        #[arg(long, default_value = "0")]
        shrinkage: f64,
        /// Buy price per kg
        #[arg(long = "buy-price")]
        buy_price: f64,
        /// Initial weight in kg
        #[arg(long)]
        weight: f64,
        #[arg(long, default_value = "0")]
        shipping: f64,
    },
    /// Show the plan with profits and recommendations.
    List,
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum RiskCommands {
    Add {
        aspect: String,
        #[arg(long)]
        risk: String,
        #[arg(long)]
        solution: String,
    },
    List,
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Headline figures for a year.
    Dashboard {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// Income statement.
    Income {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
        #[arg(long, value_enum, default_value = "monthly")]
        period: PeriodType,
    },
    /// Balance sheet with liquidity ratios.
    Balance {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// Cash flow statement.
    Cashflow {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
        #[arg(long, value_enum, default_value = "monthly")]
        period: PeriodType,
    },
    /// Compound-growth projections.
    Projections {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// Break-even revenue.
    BreakEven {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// Profit under revenue and expense growth scenarios.
    Sensitivity {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// KPIs and their trend over recent years.
    Kpi {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
    /// Notes and funding requirements.
    Notes {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
    },
}

#[cfg(feature = "pdf")]
#[derive(Subcommand)]
pub enum ExportCommands {
    /// Full financial report for a year.
    Financial {
        #[arg(long, value_parser = year_arg())]
        year: Option<i32>,
        #[arg(long, value_enum, default_value = "quarterly")]
        period: PeriodType,
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
    /// Rubber sales, risks, ledger and conclusion.
    Trading {
        /// Output file path
        #[arg(long)]
        output: Option<String>,
    },
}
