//! Weighted collections of contracts.
//!
//! A [`Portfolio`] is an ordered list of `(quantity, contract)` positions. It
//! can be valued position by position, or with one Monte Carlo simulation per
//! distinct maturity: positions maturing together are folded into a single
//! weighted composite contract whose expected payoff equals the weighted sum
//! of the constituents' expected payoffs.

mod grouping;

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::core::{PricingEngine, PricingError, PricingResult};
use crate::engines::monte_carlo::MonteCarloPricer;
use crate::instruments::Contract;
use crate::models::StockUniverseModel;

use grouping::group_by_maturity;

/// A held quantity of a contract.
#[derive(Debug, Clone)]
pub struct Position {
    /// Signed number of contracts held.
    pub quantity: f64,
    /// Shared, immutable contract.
    pub contract: Arc<dyn Contract>,
}

/// Ordered, index-addressable collection of positions.
///
/// # Examples
/// ```
/// use ferric_portfolio::engines::MonteCarloPricer;
/// use ferric_portfolio::instruments::VanillaOption;
/// use ferric_portfolio::models::StockUniverseModel;
/// use ferric_portfolio::portfolio::Portfolio;
///
/// let model = StockUniverseModel::create_test_model();
/// let mut portfolio = Portfolio::new();
/// let call = portfolio.add(1.0, VanillaOption::european_call("Acme", 110.0, 1.0));
/// portfolio.add(-1.0, VanillaOption::european_put("Acme", 110.0, 1.0));
/// portfolio.set_quantity(call, 2.0).unwrap();
///
/// let analytic = portfolio.price(&model).unwrap();
/// let simulated = portfolio
///     .price_by_monte_carlo(&model, &MonteCarloPricer::new(20_000, 1).with_seed(7))
///     .unwrap();
/// assert!((analytic - simulated).abs() < 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    positions: Vec<Position>,
    fallback_pricer: MonteCarloPricer,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pricer used by [`Self::price`] for contracts without a closed form.
    pub fn with_fallback_pricer(mut self, pricer: MonteCarloPricer) -> Self {
        self.fallback_pricer = pricer;
        self
    }

    pub fn fallback_pricer(&self) -> &MonteCarloPricer {
        &self.fallback_pricer
    }

    /// Appends a position and returns its zero-based index.
    pub fn add<C: Contract + 'static>(&mut self, quantity: f64, contract: C) -> usize {
        self.add_shared(quantity, Arc::new(contract))
    }

    /// Appends a position on an already shared contract and returns its index.
    pub fn add_shared(&mut self, quantity: f64, contract: Arc<dyn Contract>) -> usize {
        self.positions.push(Position { quantity, contract });
        self.positions.len() - 1
    }

    /// Replaces the quantity held at `index`.
    ///
    /// # Errors
    /// Returns [`PricingError::OutOfRange`] when `index >= self.len()`.
    pub fn set_quantity(&mut self, index: usize, quantity: f64) -> Result<(), PricingError> {
        let len = self.positions.len();
        let position = self
            .positions
            .get_mut(index)
            .ok_or(PricingError::OutOfRange { index, len })?;
        position.quantity = quantity;
        Ok(())
    }

    pub fn quantity(&self, index: usize) -> Result<f64, PricingError> {
        Ok(self.position(index)?.quantity)
    }

    pub fn contract(&self, index: usize) -> Result<&Arc<dyn Contract>, PricingError> {
        Ok(&self.position(index)?.contract)
    }

    fn position(&self, index: usize) -> Result<&Position, PricingError> {
        self.positions.get(index).ok_or(PricingError::OutOfRange {
            index,
            len: self.positions.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// Sum of `quantity * price` over positions.
    ///
    /// Each contract is valued with its closed form when it has one and with
    /// the fallback Monte Carlo pricer otherwise; the `i`-th position uses the
    /// `i`-th random stream of that pricer.
    pub fn price(&self, model: &StockUniverseModel) -> Result<f64, PricingError> {
        let mut total = 0.0;
        for (index, position) in self.positions.iter().enumerate() {
            let contract = position.contract.as_ref();
            let value = match contract.analytic_price(model) {
                Some(price) => price?,
                None => self.fallback_pricer.for_stream(index).price(contract, model)?,
            };
            total += position.quantity * value;
        }
        Ok(total)
    }

    /// Monte Carlo value with one simulation per distinct maturity.
    pub fn price_by_monte_carlo(
        &self,
        model: &StockUniverseModel,
        pricer: &MonteCarloPricer,
    ) -> Result<f64, PricingError> {
        Ok(self.estimate_by_monte_carlo(model, pricer)?.price)
    }

    /// Grouped Monte Carlo value with its standard error.
    ///
    /// Positions are partitioned by exact maturity and each group is priced
    /// once as a weighted composite, on the `g`-th random stream of `pricer`
    /// for the `g`-th group in ascending maturity order. Group estimates are
    /// independent, so their variances add. With the `parallel` feature the
    /// groups are priced concurrently; the result is identical either way.
    pub fn estimate_by_monte_carlo(
        &self,
        model: &StockUniverseModel,
        pricer: &MonteCarloPricer,
    ) -> Result<PricingResult, PricingError> {
        let groups = group_by_maturity(&self.positions);
        debug!(
            positions = self.positions.len(),
            groups = groups.len(),
            "pricing portfolio by maturity group"
        );

        let price_group = |(index, group): (usize, &grouping::MaturityGroupingComposite)| {
            pricer.for_stream(index).estimate(group, model)
        };

        #[cfg(feature = "parallel")]
        let results = groups
            .par_iter()
            .enumerate()
            .map(price_group)
            .collect::<Vec<_>>();
        #[cfg(not(feature = "parallel"))]
        let results = groups
            .iter()
            .enumerate()
            .map(price_group)
            .collect::<Vec<_>>();

        let mut price = 0.0;
        let mut variance = 0.0;
        for (group, result) in groups.iter().zip(results) {
            let result = result?;
            let stderr = result.stderr.unwrap_or(0.0);
            trace!(
                maturity = group.maturity(),
                constituents = group.len(),
                price = result.price,
                stderr,
                "maturity group priced"
            );
            price += result.price;
            variance += stderr * stderr;
        }

        let mut diagnostics = std::collections::BTreeMap::new();
        diagnostics.insert("num_groups".to_string(), groups.len() as f64);
        diagnostics.insert("num_positions".to_string(), self.positions.len() as f64);

        Ok(PricingResult {
            price,
            stderr: Some(variance.sqrt()),
            diagnostics,
        })
    }
}
