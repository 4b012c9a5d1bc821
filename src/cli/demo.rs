use rusqlite::Connection;

use crate::cli::{current_year, open_db};
use crate::error::Result;
use crate::ledger;
use crate::models::{
    BalanceSheet, CashFlow, FinancialNote, Kpi, MarketRisk, MonthlyFinancials, NewLedgerEntry,
    RubberSale,
};
use crate::settings::save_settings;
use crate::{store, trading};

const COMPANY_NAME: &str = "PT Contoh Indonesia";

struct DemoSale {
    factory: &'static str,
    distance_km: f64,
    sell_price: f64,
    shrinkage_pct: f64,
    buy_price: f64,
    shipping_cost: f64,
}

const SALES: &[DemoSale] = &[
    DemoSale { factory: "Pabrik Karet Jaya", distance_km: 35.0, sell_price: 15_500.0, shrinkage_pct: 30.0, buy_price: 9_800.0, shipping_cost: 450_000.0 },
    DemoSale { factory: "Pabrik Sumber Rejeki", distance_km: 60.0, sell_price: 16_200.0, shrinkage_pct: 28.0, buy_price: 9_800.0, shipping_cost: 800_000.0 },
    DemoSale { factory: "Pabrik Makmur", distance_km: 20.0, sell_price: 13_000.0, shrinkage_pct: 32.0, buy_price: 9_800.0, shipping_cost: 250_000.0 },
];

const INITIAL_WEIGHT: f64 = 1_000.0;

const RISKS: &[(&str, &str, &str)] = &[
    ("Price", "Rubber prices fall before the sale", "Sell in smaller batches and follow factory price updates"),
    ("Quality", "High water content raises shrinkage", "Buy only dried slabs and weigh at collection"),
    ("Logistics", "Roads to distant factories close in the rainy season", "Keep a nearby factory as a fallback buyer"),
];

/// (day offset into January, debit, credit, volume, category)
const LEDGER: &[(u32, f64, f64, &str, &str)] = &[
    (2, 1_000_000.0, 0.0, "", "Opening capital"),
    (3, 0.0, 859_000.0, "100 kg", "Rubber purchase"),
    (5, 10_000_000.0, 0.0, "", "Working capital loan"),
    (8, 0.0, 9_800_000.0, "1000 kg", "Rubber purchase"),
    (12, 11_200_000.0, 0.0, "720 kg", "Sale to Pabrik Karet Jaya"),
    (12, 0.0, 450_000.0, "", "Shipping"),
];

/// Create the demo company with a year of figures and a trading plan.
/// Returns the new company ID.
fn seed(conn: &mut Connection, year: i32, tax_rate: f64) -> Result<i64> {
    let id = store::create_company(conn, COMPANY_NAME, Some("Technology"), Some("2020-01-01"))?;

    for month in 1..=12u32 {
        let m = month as f64;
        store::save_financial_data(
            conn,
            id,
            &MonthlyFinancials {
                year,
                month,
                revenue: 1_000_000.0 * m,
                cogs: 400_000.0 * m,
                operational_expenses: 200_000.0 * m,
                other_expenses: 50_000.0 * m,
                tax_rate,
            },
        )?;
        store::save_cash_flow(
            conn,
            id,
            &CashFlow {
                year,
                month,
                operational: 300_000.0 * m,
                investment: -100_000.0 * m,
                financing: 50_000.0 * m,
            },
        )?;
    }

    store::save_balance_sheet(
        conn,
        id,
        &BalanceSheet {
            year,
            current_assets: 5_000_000.0,
            fixed_assets: 10_000_000.0,
            short_term_liabilities: 2_000_000.0,
            long_term_liabilities: 5_000_000.0,
            owner_equity: 6_000_000.0,
            retained_earnings: 2_000_000.0,
        },
    )?;
    store::save_kpi(
        conn,
        id,
        &Kpi {
            year,
            cac: 500_000.0,
            ltv: 2_000_000.0,
            burn_rate: 3_000_000.0,
            revenue_growth: 0.15,
            expense_growth: 0.1,
            projection_years: 3,
        },
    )?;
    store::save_financial_note(
        conn,
        id,
        &FinancialNote {
            year,
            growth_strategy: Some("Develop new products and expand into Southeast Asian markets".to_string()),
            business_risks: Some("Regulatory risk and competition from large players".to_string()),
            anomalies: Some("Revenue growth slowed in Q3".to_string()),
            funding_requirements: 10_000_000.0,
            funding_allocation: Some(
                "Product development (40%), Marketing (30%), Operations (20%), Reserve (10%)".to_string(),
            ),
        },
    )?;

    for s in SALES {
        trading::add_rubber_sale(
            conn,
            id,
            &RubberSale {
                id: None,
                factory: s.factory.to_string(),
                distance_km: s.distance_km,
                sell_price: s.sell_price,
                shrinkage_pct: s.shrinkage_pct,
                buy_price: s.buy_price,
                initial_weight: INITIAL_WEIGHT,
                shipping_cost: s.shipping_cost,
            },
        )?;
    }
    for (aspect, risk, solution) in RISKS {
        trading::add_market_risk(
            conn,
            id,
            &MarketRisk {
                id: None,
                aspect: aspect.to_string(),
                risk: risk.to_string(),
                solution: solution.to_string(),
            },
        )?;
    }
    for (day, debit, credit, volume, category) in LEDGER {
        ledger::insert_entry(
            conn,
            id,
            &NewLedgerEntry {
                date: format!("{year:04}-01-{day:02}"),
                debit: *debit,
                credit: *credit,
                volume: Some(volume.to_string()).filter(|v| !v.is_empty()),
                category: Some(category.to_string()),
            },
        )?;
    }
    trading::set_conclusion(
        conn,
        id,
        "Pabrik Sumber Rejeki gives the highest net profit despite the longer trip. \
         Keep Pabrik Karet Jaya as the fallback buyer.",
    )?;
    Ok(id)
}

pub fn run() -> Result<()> {
    let (mut settings, mut conn) = open_db()?;

    if let Some(existing) = store::list_companies(&conn)?
        .into_iter()
        .find(|c| c.name == COMPANY_NAME)
    {
        println!("Demo data already loaded (company {} exists).", existing.id);
        return Ok(());
    }

    let year = current_year();
    let id = seed(&mut conn, year, settings.tax_rate)?;
    if settings.default_company.is_none() {
        settings.default_company = Some(id);
        save_settings(&settings)?;
    }

    println!("Demo data loaded!");
    println!("  Company {id}: {COMPANY_NAME}");
    println!("  12 months of income and cash flow for {year}");
    println!("  {} rubber sale plans, {} risks, {} ledger entries", SALES.len(), RISKS.len(), LEDGER.len());
    println!("\nTry `ledgerdash --company {id} report dashboard` or `ledgerdash --company {id} ledger list`.");
    Ok(())
}
