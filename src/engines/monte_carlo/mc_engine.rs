//! Monte Carlo pricing of arbitrary contracts by discounted sample-mean payoff.
//!
//! References: Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, Ch. 1.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::debug;

use crate::core::{PricingEngine, PricingError, PricingResult};
use crate::instruments::Contract;
use crate::math::{fresh_seed, seeded_rng, stream_seed};
use crate::models::StockUniverseModel;

/// Monte Carlo engine pricing any [`Contract`] as the discounted sample mean
/// of its payoff over risk-neutral scenarios.
///
/// Each call restricts the model to the contract's underlyings, simulates
/// `n_scenarios` paths of `n_steps` steps from the valuation date to the
/// contract's maturity, and discounts the average payoff at the risk-free
/// rate. With `seed` set the result is reproducible bit for bit; without it
/// every call draws a fresh seed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MonteCarloPricer {
    /// Number of simulated scenarios.
    pub n_scenarios: usize,
    /// Number of time steps per scenario.
    pub n_steps: usize,
    /// RNG seed; `None` draws a fresh seed on every call.
    pub seed: Option<u64>,
    /// Emit a `debug` event for every estimate.
    pub log_estimates: bool,
}

impl Default for MonteCarloPricer {
    fn default() -> Self {
        Self {
            n_scenarios: 10_000,
            n_steps: 10,
            seed: None,
            log_estimates: false,
        }
    }
}

impl MonteCarloPricer {
    /// Creates a pricer with explicit scenario and step counts and no fixed seed.
    pub fn new(n_scenarios: usize, n_steps: usize) -> Self {
        Self {
            n_scenarios,
            n_steps,
            ..Self::default()
        }
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Turns per-estimate `debug` logging on or off.
    pub fn with_estimate_logging(mut self, enabled: bool) -> Self {
        self.log_estimates = enabled;
        self
    }

    /// Pricer for the `stream_index`-th independent unit of work.
    ///
    /// A seeded pricer yields a distinct deterministic seed per stream, so
    /// concurrent units never share a generator and still reproduce exactly.
    pub fn for_stream(&self, stream_index: usize) -> Self {
        Self {
            seed: self.seed.map(|seed| stream_seed(seed, stream_index)),
            ..self.clone()
        }
    }

    /// Prices with a caller-supplied random source instead of the configured seed.
    pub fn estimate_with_rng<C, R>(
        &self,
        contract: &C,
        model: &StockUniverseModel,
        rng: &mut R,
    ) -> Result<PricingResult, PricingError>
    where
        C: Contract + ?Sized,
        R: Rng + ?Sized,
    {
        if self.n_scenarios == 0 {
            return Err(PricingError::InvalidInput(
                "n_scenarios must be > 0".to_string(),
            ));
        }
        if self.n_steps == 0 {
            return Err(PricingError::InvalidInput("n_steps must be > 0".to_string()));
        }
        contract.validate()?;

        let maturity = contract.maturity();
        let underlyings = contract.underlyings();
        if underlyings.is_empty() {
            return Err(PricingError::InvalidInput(format!(
                "{} has no underlying stocks",
                contract.instrument_type()
            )));
        }

        let submodel = model.submodel(&underlyings)?;
        let simulation = submodel.generate_risk_neutral_price_paths(
            maturity,
            self.n_scenarios,
            self.n_steps,
            rng,
        )?;

        let payoffs = contract.payoff(&simulation)?;
        if payoffs.len() != self.n_scenarios {
            return Err(PricingError::dimension(
                "payoff vector",
                self.n_scenarios,
                payoffs.len(),
            ));
        }

        let discount_factor = (-model.risk_free_rate() * (maturity - model.date())).exp();
        let n = payoffs.len() as f64;
        let mean = payoffs.iter().sum::<f64>() / n;
        let variance = if payoffs.len() > 1 {
            payoffs.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        let price = discount_factor * mean;
        let stderr = discount_factor * (variance / n).sqrt();

        if !price.is_finite() {
            return Err(PricingError::NumericalError(format!(
                "{} Monte Carlo estimate is not finite",
                contract.instrument_type()
            )));
        }

        if self.log_estimates {
            debug!(
                instrument = contract.instrument_type(),
                maturity,
                price,
                stderr,
                n_scenarios = self.n_scenarios,
                n_steps = self.n_steps,
                discount_factor,
                "monte carlo estimate"
            );
        }

        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("num_paths".to_string(), self.n_scenarios as f64);
        diagnostics.insert("num_steps".to_string(), self.n_steps as f64);
        diagnostics.insert("discount_factor".to_string(), discount_factor);

        Ok(PricingResult {
            price,
            stderr: Some(stderr),
            diagnostics,
        })
    }
}

impl PricingEngine for MonteCarloPricer {
    fn estimate<C: Contract + ?Sized>(
        &self,
        contract: &C,
        model: &StockUniverseModel,
    ) -> Result<PricingResult, PricingError> {
        let seed = self.seed.unwrap_or_else(fresh_seed);
        let mut rng = seeded_rng(seed);
        self.estimate_with_rng(contract, model, &mut rng)
    }
}
