use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage unavailable: {0}")]
    Persistence(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Reject NaN/infinite amounts before they reach the store.
pub fn require_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{field} must be a finite number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_finite() {
        assert!(require_finite("revenue", 10.0).is_ok());
        let err = require_finite("revenue", f64::NAN).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: revenue must be a finite number");
        assert!(require_finite("cogs", f64::INFINITY).is_err());
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("ledger entry 7 for company 1".to_string());
        assert_eq!(err.to_string(), "Not found: ledger entry 7 for company 1");
    }
}
