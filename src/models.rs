#[derive(Debug, Clone)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub founded_date: Option<String>,
}

/// One month of income-statement inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyFinancials {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub cogs: f64,
    pub operational_expenses: f64,
    pub other_expenses: f64,
    pub tax_rate: f64,
}

impl MonthlyFinancials {
    pub fn total_expenses(&self) -> f64 {
        self.cogs + self.operational_expenses + self.other_expenses
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceSheet {
    pub year: i32,
    pub current_assets: f64,
    pub fixed_assets: f64,
    pub short_term_liabilities: f64,
    pub long_term_liabilities: f64,
    pub owner_equity: f64,
    pub retained_earnings: f64,
}

impl BalanceSheet {
    pub fn total_assets(&self) -> f64 {
        self.current_assets + self.fixed_assets
    }

    pub fn total_liabilities(&self) -> f64 {
        self.short_term_liabilities + self.long_term_liabilities
    }

    pub fn total_equity(&self) -> f64 {
        self.owner_equity + self.retained_earnings
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CashFlow {
    pub year: i32,
    pub month: u32,
    pub operational: f64,
    pub investment: f64,
    pub financing: f64,
}

impl CashFlow {
    pub fn net(&self) -> f64 {
        self.operational + self.investment + self.financing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    pub year: i32,
    pub cac: f64,
    pub ltv: f64,
    pub burn_rate: f64,
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub projection_years: u32,
}

impl Kpi {
    /// Row used for years with no stored KPIs.
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            cac: 0.0,
            ltv: 0.0,
            burn_rate: 0.0,
            revenue_growth: 0.1,
            expense_growth: 0.08,
            projection_years: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialNote {
    pub year: i32,
    pub growth_strategy: Option<String>,
    pub business_risks: Option<String>,
    pub anomalies: Option<String>,
    pub funding_requirements: f64,
    pub funding_allocation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: i64,
    pub company_id: i64,
    pub date: String,
    pub debit: f64,
    pub credit: f64,
    pub balance: f64,
    pub volume: Option<String>,
    pub category: Option<String>,
}

/// User input for a new budget-realization entry; the balance is derived.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub date: String,
    pub debit: f64,
    pub credit: f64,
    pub volume: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RubberSale {
    pub id: Option<i64>,
    pub factory: String,
    pub distance_km: f64,
    pub sell_price: f64,
    pub shrinkage_pct: f64,
    pub buy_price: f64,
    pub initial_weight: f64,
    pub shipping_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketRisk {
    pub id: Option<i64>,
    pub aspect: String,
    pub risk: String,
    pub solution: String,
}
