//! Two-asset exchange (Margrabe) option.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::PricingError;
use crate::engines::analytic::margrabe_exchange_price;
use crate::instruments::{Contract, Instrument, validate_maturity, validate_stock_id};
use crate::market::MarketSimulation;
use crate::models::StockUniverseModel;

/// Option to receive `stock_1` in exchange for `stock_2` at maturity,
/// paying `max(S1_T - S2_T, 0)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MargrabeOption {
    /// Asset received.
    pub stock_1: String,
    /// Asset delivered.
    pub stock_2: String,
    /// Maturity date in years.
    pub maturity: f64,
}

impl MargrabeOption {
    pub fn new(stock_1: impl Into<String>, stock_2: impl Into<String>, maturity: f64) -> Self {
        Self {
            stock_1: stock_1.into(),
            stock_2: stock_2.into(),
            maturity,
        }
    }
}

impl Instrument for MargrabeOption {
    fn instrument_type(&self) -> &str {
        "MargrabeOption"
    }
}

impl Contract for MargrabeOption {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn underlyings(&self) -> BTreeSet<String> {
        BTreeSet::from([self.stock_1.clone(), self.stock_2.clone()])
    }

    fn payoff(&self, simulation: &MarketSimulation) -> Result<Vec<f64>, PricingError> {
        let s1 = simulation.terminal_prices(&self.stock_1)?;
        let s2 = simulation.terminal_prices(&self.stock_2)?;
        Ok(s1.iter().zip(s2.iter()).map(|(a, b)| (a - b).max(0.0)).collect())
    }

    fn is_path_dependent(&self) -> bool {
        false
    }

    /// Both identifiers must be non-empty and distinct, so the payoff always
    /// reads exactly two stocks.
    fn validate(&self) -> Result<(), PricingError> {
        validate_stock_id(&self.stock_1)?;
        validate_stock_id(&self.stock_2)?;
        if self.stock_1 == self.stock_2 {
            return Err(PricingError::InvalidInput(format!(
                "exchange option legs must differ, both are `{}`",
                self.stock_1
            )));
        }
        validate_maturity(self.maturity)
    }

    fn analytic_price(&self, model: &StockUniverseModel) -> Option<Result<f64, PricingError>> {
        Some(self.validate().and_then(|()| {
            let spot_1 = model.stock_price(&self.stock_1)?;
            let spot_2 = model.stock_price(&self.stock_2)?;
            Ok(margrabe_exchange_price(
                spot_1,
                spot_2,
                model.covariance(&self.stock_1, &self.stock_1)?,
                model.covariance(&self.stock_2, &self.stock_2)?,
                model.covariance(&self.stock_1, &self.stock_2)?,
                self.maturity - model.date(),
            ))
        }))
    }
}

impl fmt::Display for MargrabeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Margrabe {} for {} (maturity {})",
            self.stock_1, self.stock_2, self.maturity
        )
    }
}
