//! Contract definitions.
//!
//! Every priceable product implements [`Contract`]: it names its maturity and
//! underlying stocks, maps a [`MarketSimulation`] to one payoff per scenario,
//! and says whether that payoff depends on the whole price path or only on
//! terminal prices.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::{PricingEngine, PricingError};
use crate::engines::monte_carlo::MonteCarloPricer;
use crate::market::MarketSimulation;
use crate::models::StockUniverseModel;

pub mod barrier;
pub mod spread;
pub mod vanilla;

pub use barrier::{KnockoutOption, KnockoutOptionBuilder};
pub use spread::MargrabeOption;
pub use vanilla::VanillaOption;

/// Marker trait for all instruments.
pub trait Instrument: std::fmt::Debug {
    /// Returns a short type identifier for diagnostics and serialization.
    fn instrument_type(&self) -> &str;
}

/// A contract whose value is the discounted expectation of a payoff at maturity.
pub trait Contract: Instrument + fmt::Display + Send + Sync {
    /// Maturity date in years, on the same clock as the model's valuation date.
    fn maturity(&self) -> f64;

    /// Identifiers of the stocks the payoff depends on.
    fn underlyings(&self) -> BTreeSet<String>;

    /// Payoff for every scenario of `simulation`, in scenario order.
    ///
    /// The simulation must end at [`Self::maturity`] and contain every stock
    /// in [`Self::underlyings`].
    fn payoff(&self, simulation: &MarketSimulation) -> Result<Vec<f64>, PricingError>;

    /// Whether the payoff reads intermediate prices rather than only the last column.
    fn is_path_dependent(&self) -> bool;

    /// Checks the contract's own terms. Every pricing route calls this before
    /// touching the model.
    fn validate(&self) -> Result<(), PricingError> {
        Ok(())
    }

    /// Closed-form price, when one exists for this contract.
    fn analytic_price(&self, _model: &StockUniverseModel) -> Option<Result<f64, PricingError>> {
        None
    }

    /// Present value under `model`.
    ///
    /// Uses [`Self::analytic_price`] when available and a default
    /// [`MonteCarloPricer`] otherwise.
    fn price(&self, model: &StockUniverseModel) -> Result<f64, PricingError> {
        match self.analytic_price(model) {
            Some(price) => price,
            None => MonteCarloPricer::default().price(self, model),
        }
    }
}

pub(crate) fn validate_maturity(maturity: f64) -> Result<(), PricingError> {
    if !(maturity.is_finite() && maturity >= 0.0) {
        return Err(PricingError::InvalidInput(format!(
            "maturity must be finite and >= 0, got {maturity}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_stock_id(stock: &str) -> Result<(), PricingError> {
    if stock.trim().is_empty() {
        return Err(PricingError::InvalidInput(
            "stock identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}
