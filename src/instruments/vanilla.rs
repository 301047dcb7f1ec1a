//! European call and put on a single stock.
//!
//! The payoff reads only the terminal price column of a simulation, and the
//! closed-form Black-Scholes price is available from the stock's
//! one-dimensional projection of the model.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::{OptionType, PricingError};
use crate::engines::analytic::bs_price;
use crate::instruments::{Contract, Instrument, validate_maturity, validate_stock_id};
use crate::market::MarketSimulation;
use crate::models::StockUniverseModel;

/// European vanilla option.
///
/// # Examples
/// ```
/// use ferric_portfolio::instruments::{Contract, VanillaOption};
/// use ferric_portfolio::models::StockUniverseModel;
///
/// let model = StockUniverseModel::create_test_model();
/// let call = VanillaOption::european_call("Acme", 100.0, 1.0);
/// let put = VanillaOption::european_put("Acme", 100.0, 1.0);
///
/// let parity = call.price(&model).unwrap() - put.price(&model).unwrap();
/// let forward = 100.0 - 100.0 * (-0.05_f64).exp();
/// assert!((parity - forward).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VanillaOption {
    /// Underlying stock identifier.
    pub stock: String,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
    /// Maturity date in years.
    pub maturity: f64,
}

impl VanillaOption {
    /// Builds a European call option.
    pub fn european_call(stock: impl Into<String>, strike: f64, maturity: f64) -> Self {
        Self {
            stock: stock.into(),
            option_type: OptionType::Call,
            strike,
            maturity,
        }
    }

    /// Builds a European put option.
    pub fn european_put(stock: impl Into<String>, strike: f64, maturity: f64) -> Self {
        Self {
            stock: stock.into(),
            option_type: OptionType::Put,
            strike,
            maturity,
        }
    }
}

impl Instrument for VanillaOption {
    fn instrument_type(&self) -> &str {
        "VanillaOption"
    }
}

impl Contract for VanillaOption {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn underlyings(&self) -> BTreeSet<String> {
        BTreeSet::from([self.stock.clone()])
    }

    fn payoff(&self, simulation: &MarketSimulation) -> Result<Vec<f64>, PricingError> {
        let terminal = simulation.terminal_prices(&self.stock)?;
        Ok(terminal
            .iter()
            .map(|&s| self.option_type.intrinsic(s, self.strike))
            .collect())
    }

    fn is_path_dependent(&self) -> bool {
        false
    }

    /// Rejects an empty stock identifier, `strike <= 0`, and a negative or
    /// non-finite maturity.
    fn validate(&self) -> Result<(), PricingError> {
        validate_stock_id(&self.stock)?;
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(PricingError::InvalidInput(
                "vanilla strike must be > 0".to_string(),
            ));
        }
        validate_maturity(self.maturity)
    }

    fn analytic_price(&self, model: &StockUniverseModel) -> Option<Result<f64, PricingError>> {
        Some(self.validate().and_then(|()| {
            let bsm = model.black_scholes_model(&self.stock)?;
            Ok(bs_price(
                self.option_type,
                bsm.stock_price,
                self.strike,
                bsm.risk_free_rate,
                bsm.volatility,
                self.maturity - bsm.date,
            ))
        }))
    }
}

impl fmt::Display for VanillaOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "European {} on {} (strike {}, maturity {})",
            self.option_type, self.stock, self.strike, self.maturity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlackScholesModel;
    use approx::assert_relative_eq;

    #[test]
    fn payoff_reads_terminal_column_only() {
        let sim = MarketSimulation::terminal_snapshot("Acme", 0.0, 1.0, vec![80.0, 100.0, 130.0])
            .unwrap();
        let call = VanillaOption::european_call("Acme", 100.0, 1.0);
        let put = VanillaOption::european_put("Acme", 100.0, 1.0);
        assert_eq!(call.payoff(&sim).unwrap(), vec![0.0, 0.0, 30.0]);
        assert_eq!(put.payoff(&sim).unwrap(), vec![20.0, 0.0, 0.0]);
        assert!(!call.is_path_dependent());
        assert_eq!(call.underlyings(), BTreeSet::from(["Acme".to_string()]));
    }

    #[test]
    fn payoff_on_missing_stock_is_unknown_asset() {
        let sim = MarketSimulation::terminal_snapshot("Acme", 0.0, 1.0, vec![100.0]).unwrap();
        let call = VanillaOption::european_call("Zeta", 100.0, 1.0);
        assert_eq!(
            call.payoff(&sim).unwrap_err(),
            PricingError::UnknownAsset("Zeta".to_string())
        );
    }

    #[test]
    fn closed_form_uses_time_to_maturity() {
        let bsm = BlackScholesModel::new(100.0, 0.1)
            .with_risk_free_rate(0.1)
            .with_date(1.0);
        let model = StockUniverseModel::from_black_scholes(&bsm).unwrap();
        let call = VanillaOption::european_call(StockUniverseModel::DEFAULT_STOCK, 100.0, 2.0);
        let expected = bs_price(OptionType::Call, 100.0, 100.0, 0.1, 0.1, 1.0);
        assert_relative_eq!(call.price(&model).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn expired_option_is_worth_intrinsic() {
        let model = StockUniverseModel::create_test_model().with_date(1.0);
        let call = VanillaOption::european_call("Bigbank", 100.0, 1.0);
        assert_eq!(call.price(&model).unwrap(), 20.0);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let model = StockUniverseModel::create_test_model();
        assert!(VanillaOption::european_call("Acme", 0.0, 1.0).price(&model).is_err());
        assert!(VanillaOption::european_call("Acme", 100.0, -1.0).price(&model).is_err());
        assert!(VanillaOption::european_call("", 100.0, 1.0).validate().is_err());
        assert_eq!(
            VanillaOption::european_call("Zeta", 100.0, 1.0)
                .price(&model)
                .unwrap_err(),
            PricingError::UnknownAsset("Zeta".to_string())
        );
    }

    #[test]
    fn display_names_side_and_terms() {
        let put = VanillaOption::european_put("Chumhum", 75.0, 0.5);
        assert_eq!(put.to_string(), "European Put on Chumhum (strike 75, maturity 0.5)");
    }
}
