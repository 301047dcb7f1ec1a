//! Knock-out options on a single stock.
//!
//! Monitoring is discrete on the simulation grid: a path is knocked out when
//! any simulated price, including the initial one, touches or crosses the
//! barrier. Finer time grids approach continuous monitoring from above.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::{BarrierDirection, OptionType, PricingError};
use crate::instruments::{Contract, Instrument, validate_maturity, validate_stock_id};
use crate::market::MarketSimulation;

/// Up-and-out or down-and-out European option.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KnockoutOption {
    /// Underlying stock identifier.
    pub stock: String,
    /// Call or put.
    pub option_type: OptionType,
    /// Strike level.
    pub strike: f64,
    /// Maturity date in years.
    pub maturity: f64,
    /// Barrier side.
    pub direction: BarrierDirection,
    /// Barrier level.
    pub barrier: f64,
}

impl KnockoutOption {
    /// Starts a knock-out option builder.
    ///
    /// ```
    /// use ferric_portfolio::instruments::KnockoutOption;
    ///
    /// let option = KnockoutOption::builder()
    ///     .stock("Acme")
    ///     .call()
    ///     .strike(100.0)
    ///     .maturity(1.0)
    ///     .up_and_out(130.0)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(option.barrier, 130.0);
    /// ```
    pub fn builder() -> KnockoutOptionBuilder {
        KnockoutOptionBuilder::default()
    }

    #[inline]
    fn is_knocked_out<'a>(&self, mut path: impl Iterator<Item = &'a f64>) -> bool {
        match self.direction {
            BarrierDirection::Up => path.any(|&s| s >= self.barrier),
            BarrierDirection::Down => path.any(|&s| s <= self.barrier),
        }
    }
}

impl Instrument for KnockoutOption {
    fn instrument_type(&self) -> &str {
        "KnockoutOption"
    }
}

impl Contract for KnockoutOption {
    fn maturity(&self) -> f64 {
        self.maturity
    }

    fn underlyings(&self) -> BTreeSet<String> {
        BTreeSet::from([self.stock.clone()])
    }

    fn payoff(&self, simulation: &MarketSimulation) -> Result<Vec<f64>, PricingError> {
        let paths = simulation.stock_paths(&self.stock)?;
        let last = paths.ncols() - 1;
        Ok(paths
            .row_iter()
            .map(|row| {
                if self.is_knocked_out(row.iter()) {
                    0.0
                } else {
                    self.option_type.intrinsic(row[last], self.strike)
                }
            })
            .collect())
    }

    fn is_path_dependent(&self) -> bool {
        true
    }

    fn validate(&self) -> Result<(), PricingError> {
        validate_stock_id(&self.stock)?;
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(PricingError::InvalidInput(
                "knock-out strike must be > 0".to_string(),
            ));
        }
        validate_maturity(self.maturity)?;
        if !(self.barrier.is_finite() && self.barrier > 0.0) {
            return Err(PricingError::InvalidInput(
                "knock-out barrier must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for KnockoutOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            BarrierDirection::Up => "Up",
            BarrierDirection::Down => "Down",
        };
        write!(
            f,
            "{direction}-and-Out {} on {} (strike {}, barrier {}, maturity {})",
            self.option_type, self.stock, self.strike, self.barrier, self.maturity
        )
    }
}

/// Builder for [`KnockoutOption`].
#[derive(Debug, Clone, Default)]
pub struct KnockoutOptionBuilder {
    stock: Option<String>,
    option_type: Option<OptionType>,
    strike: Option<f64>,
    maturity: Option<f64>,
    direction: Option<BarrierDirection>,
    barrier: Option<f64>,
}

impl KnockoutOptionBuilder {
    /// Sets the underlying stock.
    pub fn stock(mut self, stock: impl Into<String>) -> Self {
        self.stock = Some(stock.into());
        self
    }

    /// Sets option side to call.
    pub fn call(mut self) -> Self {
        self.option_type = Some(OptionType::Call);
        self
    }

    /// Sets option side to put.
    pub fn put(mut self) -> Self {
        self.option_type = Some(OptionType::Put);
        self
    }

    pub fn strike(mut self, strike: f64) -> Self {
        self.strike = Some(strike);
        self
    }

    /// Sets maturity date in years.
    pub fn maturity(mut self, maturity: f64) -> Self {
        self.maturity = Some(maturity);
        self
    }

    /// Sets an up-and-out barrier.
    pub fn up_and_out(mut self, barrier: f64) -> Self {
        self.direction = Some(BarrierDirection::Up);
        self.barrier = Some(barrier);
        self
    }

    /// Sets a down-and-out barrier.
    pub fn down_and_out(mut self, barrier: f64) -> Self {
        self.direction = Some(BarrierDirection::Down);
        self.barrier = Some(barrier);
        self
    }

    /// Builds and validates a knock-out option.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] when a required field is missing
    /// or the assembled option fails validation.
    pub fn build(self) -> Result<KnockoutOption, PricingError> {
        let missing = |field: &str| PricingError::InvalidInput(format!("knock-out {field} is required"));
        let option = KnockoutOption {
            stock: self.stock.ok_or_else(|| missing("stock"))?,
            option_type: self.option_type.ok_or_else(|| missing("option_type"))?,
            strike: self.strike.ok_or_else(|| missing("strike"))?,
            maturity: self.maturity.ok_or_else(|| missing("maturity"))?,
            direction: self.direction.ok_or_else(|| missing("barrier"))?,
            barrier: self.barrier.ok_or_else(|| missing("barrier"))?,
        };
        option.validate()?;
        Ok(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use std::collections::BTreeMap;

    fn simulation(rows: &[[f64; 4]]) -> MarketSimulation {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let mut paths = BTreeMap::new();
        paths.insert("Acme".to_string(), DMatrix::from_row_slice(rows.len(), 4, &flat));
        MarketSimulation::new(0.0, 1.0, paths).unwrap()
    }

    #[test]
    fn up_and_out_zeroes_paths_touching_barrier() {
        let sim = simulation(&[
            [100.0, 105.0, 110.0, 115.0],
            [100.0, 120.0, 110.0, 115.0],
            [100.0, 119.9, 110.0, 115.0],
        ]);
        let option = KnockoutOption::builder()
            .stock("Acme")
            .call()
            .strike(100.0)
            .maturity(1.0)
            .up_and_out(120.0)
            .build()
            .unwrap();
        assert_eq!(option.payoff(&sim).unwrap(), vec![15.0, 0.0, 15.0]);
        assert!(option.is_path_dependent());
    }

    #[test]
    fn down_and_out_uses_path_minimum() {
        let sim = simulation(&[
            [100.0, 95.0, 85.0, 90.0],
            [100.0, 79.0, 85.0, 90.0],
            [100.0, 80.0, 85.0, 90.0],
        ]);
        let option = KnockoutOption::builder()
            .stock("Acme")
            .put()
            .strike(100.0)
            .maturity(1.0)
            .down_and_out(80.0)
            .build()
            .unwrap();
        assert_eq!(option.payoff(&sim).unwrap(), vec![10.0, 0.0, 0.0]);
    }

    #[test]
    fn builder_requires_every_field() {
        let err = KnockoutOption::builder()
            .stock("Acme")
            .call()
            .strike(100.0)
            .maturity(1.0)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidInput("knock-out barrier is required".to_string())
        );
        assert!(
            KnockoutOption::builder()
                .stock("Acme")
                .call()
                .strike(100.0)
                .maturity(1.0)
                .up_and_out(-5.0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn display_mentions_barrier() {
        let option = KnockoutOption::builder()
            .stock("Acme")
            .call()
            .strike(100.0)
            .maturity(2.0)
            .up_and_out(150.0)
            .build()
            .unwrap();
        assert_eq!(
            option.to_string(),
            "Up-and-Out Call on Acme (strike 100, barrier 150, maturity 2)"
        );
    }
}
