//! Derived financial ratios. Division by zero follows fixed conventions
//! instead of producing NaN: ratios that are meaningless return 0, ratios
//! that are unbounded return infinity.

/// (revenue - cogs) / revenue
pub fn gross_margin(revenue: f64, cogs: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    (revenue - cogs) / revenue
}

pub fn net_profit_margin(net_profit: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        return 0.0;
    }
    net_profit / revenue
}

pub fn current_ratio(current_assets: f64, current_liabilities: f64) -> f64 {
    if current_liabilities == 0.0 {
        return if current_assets == 0.0 { 0.0 } else { f64::INFINITY };
    }
    current_assets / current_liabilities
}

pub fn debt_to_equity(total_debt: f64, total_equity: f64) -> f64 {
    if total_equity == 0.0 {
        return if total_debt > 0.0 { f64::INFINITY } else { 0.0 };
    }
    total_debt / total_equity
}

/// Months of cash left at the current net burn. Zero when the company is
/// not burning cash or has none left.
pub fn runway_months(cash_balance: f64, monthly_expenses: f64, monthly_revenue: f64) -> f64 {
    let net_burn = monthly_expenses - monthly_revenue;
    if net_burn <= 0.0 || cash_balance <= 0.0 {
        return 0.0;
    }
    cash_balance / net_burn
}

pub fn ltv_cac_ratio(ltv: f64, cac: f64) -> f64 {
    if cac == 0.0 {
        return 0.0;
    }
    ltv / cac
}

pub fn break_even_revenue(fixed_costs: f64, contribution_margin_ratio: f64) -> f64 {
    if contribution_margin_ratio == 0.0 {
        return f64::INFINITY;
    }
    fixed_costs / contribution_margin_ratio
}

pub fn working_capital(current_assets: f64, current_liabilities: f64) -> f64 {
    current_assets - current_liabilities
}

pub fn roi(net_profit: f64, investment: f64) -> f64 {
    if investment == 0.0 {
        return 0.0;
    }
    net_profit / investment
}

/// Year-over-year growth; `None` when there is no positive base to grow from.
pub fn yoy_growth(current: f64, previous: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((current - previous) / previous)
    } else {
        None
    }
}

/// Value after `years` of compound growth at `rate`.
pub fn compound(value: f64, rate: f64, years: u32) -> f64 {
    value * (1.0 + rate).powi(years as i32)
}
