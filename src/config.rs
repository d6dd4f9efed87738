use crate::error::{LoanSimError, Result};
use crate::in_range::PaymentsInRange;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Initial conditions of the loan.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct LoanConfig {
    pub start_date: NaiveDate,
    pub mortgage_amount: f64,
    /// annual rate as decimal (i.e., 0.03)
    pub interest_rate: f64,
    pub monthly_payment: f64,
    /// monthly overpayments to compare payoff dates for
    #[serde(default = "default_future_overpayments")]
    pub future_overpayments: Vec<f64>,
}

fn default_future_overpayments() -> Vec<f64> {
    vec![0.]
}

impl LoanConfig {
    pub fn from_json(json: &str, path: &str) -> Result<Self> {
        let config: LoanConfig = serde_json::from_str(json).map_err(|e| LoanSimError::Config {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().display().to_string();
        let json = std::fs::read_to_string(&path).map_err(|e| LoanSimError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json, &path)
    }

    /// Regular installments from the start of the loan, with no end date.
    pub fn installments(&self) -> PaymentsInRange {
        PaymentsInRange::unbounded(self.start_date, self.monthly_payment)
    }

    /// Regular installments from the start of the loan up to and including `date`.
    pub fn installments_until(&self, date: NaiveDate) -> PaymentsInRange {
        PaymentsInRange::new(self.start_date, Some(date), self.monthly_payment)
    }

    fn validate(&self, path: &str) -> Result<()> {
        let reason = if self.mortgage_amount <= 0. {
            "mortgage_amount must be positive"
        } else if self.interest_rate < 0. {
            "interest_rate must not be negative"
        } else if self.monthly_payment < 0. {
            "monthly_payment must not be negative"
        } else if self.future_overpayments.iter().any(|&amount| amount < 0.) {
            "future_overpayments must not be negative"
        } else {
            return Ok(());
        };
        Err(LoanSimError::Config {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    }
}
