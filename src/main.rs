mod chart;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod ledger;
mod metrics;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod settings;
mod store;
mod trading;

use clap::{CommandFactory, Parser};

#[cfg(feature = "pdf")]
use cli::ExportCommands;
use cli::{
    Cli, Commands, CompanyCommands, LedgerCommands, ReportCommands, RiskCommands, RubberCommands,
    SetCommands,
};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let company = cli.company;
    let result = match cli.command {
        Commands::Init { data_dir, user_name } => cli::init::run(data_dir, user_name),
        Commands::Company { command } => match command {
            CompanyCommands::Add { name, industry, founded } => {
                cli::company::add(&name, industry.as_deref(), founded.as_deref())
            }
            CompanyCommands::List => cli::company::list(),
            CompanyCommands::Use { id } => cli::company::use_company(id),
        },
        Commands::Set { command } => cli::facts::run(company, command),
        Commands::Ledger { command } => match command {
            LedgerCommands::Add { date, debit, credit, volume, category } => {
                cli::ledger::add(company, date, debit, credit, volume, category)
            }
            LedgerCommands::Delete { id } => cli::ledger::delete(company, id),
            LedgerCommands::List { from_date, to_date } => {
                cli::ledger::list(company, from_date.as_deref(), to_date.as_deref())
            }
            LedgerCommands::Recompute => cli::ledger::recompute(company),
            LedgerCommands::Check => cli::ledger::check(company),
            LedgerCommands::Import { file } => cli::ledger::import(company, &file),
            LedgerCommands::Export { output } => cli::ledger::export(company, &output),
        },
        Commands::Rubber { command } => match command {
            RubberCommands::Add {
                factory,
                distance,
                sell_price,
                shrinkage,
                buy_price,
                weight,
                shipping,
            } => cli::trading::add_sale(
                company,
                models::RubberSale {
                    id: None,
                    factory,
                    distance_km: distance,
                    sell_price,
                    shrinkage_pct: shrinkage,
                    buy_price,
                    initial_weight: weight,
                    shipping_cost: shipping,
                },
            ),
            RubberCommands::List => cli::trading::list_sales(company),
            RubberCommands::Delete { id } => cli::trading::delete_sale(company, id),
        },
        Commands::Risk { command } => match command {
            RiskCommands::Add { aspect, risk, solution } => cli::trading::add_risk(
                company,
                models::MarketRisk { id: None, aspect, risk, solution },
            ),
            RiskCommands::List => cli::trading::list_risks(company),
            RiskCommands::Delete { id } => cli::trading::delete_risk(company, id),
        },
        Commands::Conclusion { text } => cli::trading::conclusion(company, text.as_deref()),
        Commands::Report { command } => match command {
            ReportCommands::Dashboard { year } => cli::report::dashboard(company, year),
            ReportCommands::Income { year, period } => cli::report::income(company, year, period),
            ReportCommands::Balance { year } => cli::report::balance(company, year),
            ReportCommands::Cashflow { year, period } => cli::report::cashflow(company, year, period),
            ReportCommands::Projections { year } => cli::report::projections(company, year),
            ReportCommands::BreakEven { year } => cli::report::break_even(company, year),
            ReportCommands::Sensitivity { year } => cli::report::sensitivity(company, year),
            ReportCommands::Kpi { year } => cli::report::kpi(company, year),
            ReportCommands::Notes { year } => cli::report::notes(company, year),
        },
        #[cfg(feature = "pdf")]
        Commands::Export { command } => match command {
            ExportCommands::Financial { year, period, output } => {
                cli::export::financial(company, year, period, output)
            }
            ExportCommands::Trading { output } => cli::export::trading(company, output),
        },
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
        Commands::Backup { output } => cli::backup::run(output),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ledgerdash", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        log::error!("{e:?}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
