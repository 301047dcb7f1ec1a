//! Single-asset lognormal model.
//!
//! This is the one-dimensional view of a [`crate::models::StockUniverseModel`]:
//! extracting one asset yields its spot, its volatility `sqrt(Sigma_ii)`, its
//! drift, and the universe's risk-free rate and valuation date.

use crate::core::PricingError;

/// Black-Scholes model of a single stock.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlackScholesModel {
    /// Current stock price.
    pub stock_price: f64,
    /// Annualised volatility.
    pub volatility: f64,
    /// Real-world drift.
    pub drift: f64,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: f64,
    /// Valuation date in years.
    pub date: f64,
}

impl BlackScholesModel {
    /// Model with zero drift, zero rate and valuation date zero.
    pub fn new(stock_price: f64, volatility: f64) -> Self {
        Self {
            stock_price,
            volatility,
            drift: 0.0,
            risk_free_rate: 0.0,
            date: 0.0,
        }
    }

    /// Sets the real-world drift.
    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    /// Sets the risk-free rate.
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Sets the valuation date.
    pub fn with_date(mut self, date: f64) -> Self {
        self.date = date;
        self
    }

    /// Validates model fields.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !(self.stock_price.is_finite() && self.stock_price > 0.0) {
            return Err(PricingError::InvalidInput(
                "stock price must be finite and > 0".to_string(),
            ));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(PricingError::InvalidInput(
                "volatility must be finite and >= 0".to_string(),
            ));
        }
        if !(self.drift.is_finite() && self.risk_free_rate.is_finite() && self.date.is_finite()) {
            return Err(PricingError::InvalidInput(
                "drift, risk-free rate and date must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Mean and standard deviation of `ln S_T` under the risk-neutral measure.
    pub fn risk_neutral_log_moments(&self, maturity: f64) -> (f64, f64) {
        let tau = (maturity - self.date).max(0.0);
        let mean = self.stock_price.ln()
            + (self.risk_free_rate - 0.5 * self.volatility * self.volatility) * tau;
        (mean, self.volatility * tau.sqrt())
    }
}
