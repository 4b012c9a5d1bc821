//! Rubber trading plans: per-factory sale rows, the market strategy and
//! risk table, and the company's written conclusion.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{require_finite, AppError, Result};
use crate::ledger::ensure_company;
use crate::models::{MarketRisk, RubberSale};

// ---------------------------------------------------------------------------
// Sale analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Recommended,
    Viable,
    NotProfitable,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Recommended => "Recommended",
            Recommendation::Viable => "Viable",
            Recommendation::NotProfitable => "Not profitable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaleAnalysis {
    pub sale: RubberSale,
    pub sold_weight: f64,
    pub total_sell: f64,
    pub total_buy: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub recommendation: Recommendation,
}

/// Derive weights and profits for each plan row. The most profitable row
/// (first on ties) is recommended if its net profit is positive.
pub fn analyze_sales(sales: &[RubberSale]) -> Vec<SaleAnalysis> {
    let mut rows: Vec<SaleAnalysis> = sales
        .iter()
        .map(|s| {
            let sold_weight = s.initial_weight * (1.0 - s.shrinkage_pct / 100.0);
            let total_sell = sold_weight * s.sell_price;
            let total_buy = s.initial_weight * s.buy_price;
            let gross_profit = total_sell - total_buy;
            let net_profit = gross_profit - s.shipping_cost;
            SaleAnalysis {
                sale: s.clone(),
                sold_weight,
                total_sell,
                total_buy,
                gross_profit,
                net_profit,
                recommendation: if net_profit > 0.0 {
                    Recommendation::Viable
                } else {
                    Recommendation::NotProfitable
                },
            }
        })
        .collect();

    let mut best: Option<usize> = None;
    for (i, row) in rows.iter().enumerate() {
        if row.net_profit > 0.0 && best.map_or(true, |b| row.net_profit > rows[b].net_profit) {
            best = Some(i);
        }
    }
    if let Some(i) = best {
        rows[i].recommendation = Recommendation::Recommended;
    }
    rows
}

// ---------------------------------------------------------------------------
// Rubber sales
// ---------------------------------------------------------------------------

fn validate_sale(sale: &RubberSale) -> Result<()> {
    if sale.factory.trim().is_empty() {
        return Err(AppError::Validation("factory name is required".to_string()));
    }
    for (field, value) in [
        ("distance", sale.distance_km),
        ("sell price", sale.sell_price),
        ("buy price", sale.buy_price),
        ("initial weight", sale.initial_weight),
        ("shipping cost", sale.shipping_cost),
    ] {
        require_finite(field, value)?;
        if value < 0.0 {
            return Err(AppError::Validation(format!("{field} must not be negative")));
        }
    }
    require_finite("shrinkage", sale.shrinkage_pct)?;
    if !(0.0..=100.0).contains(&sale.shrinkage_pct) {
        return Err(AppError::Validation("shrinkage must be between 0 and 100 percent".to_string()));
    }
    Ok(())
}

pub fn add_rubber_sale(conn: &Connection, company_id: i64, sale: &RubberSale) -> Result<i64> {
    validate_sale(sale)?;
    ensure_company(conn, company_id)?;
    conn.execute(
        "INSERT INTO rubber_sales \
         (company_id, factory, distance_km, sell_price, shrinkage_pct, buy_price, initial_weight, shipping_cost) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            company_id,
            sale.factory.trim(),
            sale.distance_km,
            sale.sell_price,
            sale.shrinkage_pct,
            sale.buy_price,
            sale.initial_weight,
            sale.shipping_cost,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_rubber_sales(conn: &Connection, company_id: i64) -> Result<Vec<RubberSale>> {
    let mut stmt = conn.prepare(
        "SELECT id, factory, distance_km, sell_price, shrinkage_pct, buy_price, initial_weight, shipping_cost \
         FROM rubber_sales WHERE company_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([company_id], |row| {
            Ok(RubberSale {
                id: Some(row.get(0)?),
                factory: row.get(1)?,
                distance_km: row.get(2)?,
                sell_price: row.get(3)?,
                shrinkage_pct: row.get(4)?,
                buy_price: row.get(5)?,
                initial_weight: row.get(6)?,
                shipping_cost: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_rubber_sale(conn: &Connection, id: i64, company_id: i64) -> Result<()> {
    let removed = conn.execute(
        "DELETE FROM rubber_sales WHERE id = ?1 AND company_id = ?2",
        rusqlite::params![id, company_id],
    )?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("rubber sale {id} for company {company_id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Market strategy and risks
// ---------------------------------------------------------------------------

pub fn add_market_risk(conn: &Connection, company_id: i64, risk: &MarketRisk) -> Result<i64> {
    for (field, value) in [("aspect", &risk.aspect), ("risk", &risk.risk), ("solution", &risk.solution)] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    ensure_company(conn, company_id)?;
    conn.execute(
        "INSERT INTO market_risks (company_id, aspect, risk, solution) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![company_id, risk.aspect.trim(), risk.risk.trim(), risk.solution.trim()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_market_risks(conn: &Connection, company_id: i64) -> Result<Vec<MarketRisk>> {
    let mut stmt = conn.prepare(
        "SELECT id, aspect, risk, solution FROM market_risks WHERE company_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([company_id], |row| {
            Ok(MarketRisk {
                id: Some(row.get(0)?),
                aspect: row.get(1)?,
                risk: row.get(2)?,
                solution: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_market_risk(conn: &Connection, id: i64, company_id: i64) -> Result<()> {
    let removed = conn.execute(
        "DELETE FROM market_risks WHERE id = ?1 AND company_id = ?2",
        rusqlite::params![id, company_id],
    )?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("market risk {id} for company {company_id}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Conclusion
// ---------------------------------------------------------------------------

pub fn set_conclusion(conn: &Connection, company_id: i64, text: &str) -> Result<()> {
    ensure_company(conn, company_id)?;
    conn.execute(
        "INSERT INTO trading_notes (company_id, conclusion) VALUES (?1, ?2) \
         ON CONFLICT(company_id) DO UPDATE SET conclusion = excluded.conclusion, updated_at = datetime('now')",
        rusqlite::params![company_id, text.trim()],
    )?;
    Ok(())
}

pub fn get_conclusion(conn: &Connection, company_id: i64) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT conclusion FROM trading_notes WHERE company_id = ?1",
            [company_id],
            |r| r.get(0),
        )
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::store;

    fn test_db() -> (tempfile::TempDir, Connection, i64) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        let id = store::create_company(&conn, "PT Contoh", None, None).unwrap();
        (dir, conn, id)
    }

    fn sale(factory: &str, sell_price: f64, shipping_cost: f64) -> RubberSale {
        RubberSale {
            id: None,
            factory: factory.to_string(),
            distance_km: 40.0,
            sell_price,
            shrinkage_pct: 25.0,
            buy_price: 10_000.0,
            initial_weight: 1000.0,
            shipping_cost,
        }
    }

    #[test]
    fn test_analysis_math() {
        let rows = analyze_sales(&[sale("Pabrik A", 16_000.0, 500_000.0)]);
        let r = &rows[0];
        assert_eq!(r.sold_weight, 750.0);
        assert_eq!(r.total_sell, 12_000_000.0);
        assert_eq!(r.total_buy, 10_000_000.0);
        assert_eq!(r.gross_profit, 2_000_000.0);
        assert_eq!(r.net_profit, 1_500_000.0);
        assert_eq!(r.recommendation, Recommendation::Recommended);
    }

    #[test]
    fn test_recommendation_ranking() {
        let rows = analyze_sales(&[
            sale("A", 16_000.0, 500_000.0),
            sale("B", 17_000.0, 500_000.0),
            sale("C", 13_000.0, 500_000.0),
        ]);
        assert_eq!(rows[0].recommendation, Recommendation::Viable);
        assert_eq!(rows[1].recommendation, Recommendation::Recommended);
        assert_eq!(rows[2].recommendation, Recommendation::NotProfitable);
    }

    #[test]
    fn test_no_recommendation_when_all_lose() {
        let rows = analyze_sales(&[sale("A", 10_000.0, 0.0), sale("B", 11_000.0, 5_000_000.0)]);
        assert!(rows.iter().all(|r| r.recommendation == Recommendation::NotProfitable));
        assert!(analyze_sales(&[]).is_empty());
    }

    #[test]
    fn test_sale_crud() {
        let (_dir, conn, id) = test_db();
        let sale_id = add_rubber_sale(&conn, id, &sale("Pabrik A", 15_000.0, 0.0)).unwrap();
        let sales = list_rubber_sales(&conn, id).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, Some(sale_id));
        delete_rubber_sale(&conn, sale_id, id).unwrap();
        assert!(matches!(delete_rubber_sale(&conn, sale_id, id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_sale_validation() {
        let (_dir, conn, id) = test_db();
        let mut bad = sale("A", 15_000.0, 0.0);
        bad.shrinkage_pct = 120.0;
        assert!(matches!(add_rubber_sale(&conn, id, &bad), Err(AppError::Validation(_))));
        let bad = sale(" ", 15_000.0, 0.0);
        assert!(matches!(add_rubber_sale(&conn, id, &bad), Err(AppError::Validation(_))));
        assert!(matches!(
            add_rubber_sale(&conn, 99, &sale("A", 1.0, 0.0)),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_market_risks() {
        let (_dir, conn, id) = test_db();
        let risk = MarketRisk {
            id: None,
            aspect: "Price".to_string(),
            risk: "Rubber price drops".to_string(),
            solution: "Sell to the nearest factory".to_string(),
        };
        let risk_id = add_market_risk(&conn, id, &risk).unwrap();
        assert_eq!(list_market_risks(&conn, id).unwrap()[0].aspect, "Price");
        delete_market_risk(&conn, risk_id, id).unwrap();
        assert!(list_market_risks(&conn, id).unwrap().is_empty());
    }

    #[test]
    fn test_conclusion_upsert() {
        let (_dir, conn, id) = test_db();
        assert_eq!(get_conclusion(&conn, id).unwrap(), None);
        set_conclusion(&conn, id, "Sell to Pabrik B").unwrap();
        set_conclusion(&conn, id, "Sell to Pabrik A").unwrap();
        assert_eq!(get_conclusion(&conn, id).unwrap().as_deref(), Some("Sell to Pabrik A"));
    }
}
