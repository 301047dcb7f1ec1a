//! Deterministic quadrature pricer for terminal payoffs on one stock.
//!
//! Under the risk-neutral measure `ln S_T ~ N(m, s^2)` with
//! `m = ln S_0 + (r - sigma^2 / 2) tau` and `s = sigma sqrt(tau)`. Writing
//! `S_T = exp(m + s z)` turns the expectation into
//! `E[f(S_T)] = integral f(exp(m + s z)) phi(z) dz`, which is evaluated with
//! the midpoint rule on [`real_line_nodes`]. Integration points where the
//! weighted payoff is not finite contribute zero.

use std::collections::BTreeMap;

use crate::core::{PricingEngine, PricingError, PricingResult};
use crate::instruments::Contract;
use crate::market::MarketSimulation;
use crate::math::{finite_weighted_sum, integral_over_r, normal_pdf, real_line_nodes};
use crate::models::{BlackScholesModel, StockUniverseModel};

/// Rectangle-rule integration against the lognormal terminal density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RectangleRulePricer {
    /// Number of integration points.
    pub n_steps: usize,
}

impl Default for RectangleRulePricer {
    fn default() -> Self {
        Self { n_steps: 1_000 }
    }
}

impl RectangleRulePricer {
    pub fn new(n_steps: usize) -> Self {
        Self { n_steps }
    }

    /// Discounted risk-neutral expectation of `payoff(S_T)` for a stock
    /// following `bsm`, with `S_T` observed at `maturity`.
    ///
    /// ```
    /// use ferric_portfolio::engines::numerical::RectangleRulePricer;
    /// use ferric_portfolio::models::BlackScholesModel;
    ///
    /// let bsm = BlackScholesModel::new(100.0, 0.2).with_risk_free_rate(0.05);
    /// let forward = RectangleRulePricer::default()
    ///     .price_function(|s| s, 1.0, &bsm)
    ///     .unwrap();
    /// assert!((forward - 100.0).abs() < 1e-4);
    /// ```
    pub fn price_function<F>(
        &self,
        payoff: F,
        maturity: f64,
        bsm: &BlackScholesModel,
    ) -> Result<f64, PricingError>
    where
        F: Fn(f64) -> f64,
    {
        let (mean, sd, discount_factor) = self.log_moments(maturity, bsm)?;
        let expectation = if sd > 0.0 {
            integral_over_r(
                |z| payoff((mean + sd * z).exp()) * normal_pdf(z),
                self.n_steps,
            )
        } else {
            finite_weighted_sum([(payoff(mean.exp()), 1.0)])
        };
        Ok(discount_factor * expectation)
    }

    /// Mean and standard deviation of `ln S_T`, plus the discount factor.
    fn log_moments(
        &self,
        maturity: f64,
        bsm: &BlackScholesModel,
    ) -> Result<(f64, f64, f64), PricingError> {
        bsm.validate()?;
        if self.n_steps == 0 {
            return Err(PricingError::InvalidInput("n_steps must be > 0".to_string()));
        }
        if !maturity.is_finite() || maturity < bsm.date {
            return Err(PricingError::InvalidInput(format!(
                "maturity {maturity} must be finite and >= valuation date {}",
                bsm.date
            )));
        }

        let discount_factor = (-bsm.risk_free_rate * (maturity - bsm.date)).exp();
        let (mean, sd) = bsm.risk_neutral_log_moments(maturity);
        Ok((mean, sd, discount_factor))
    }

    /// Terminal prices and their probability weights, plus the discount factor.
    fn terminal_grid(
        &self,
        maturity: f64,
        bsm: &BlackScholesModel,
    ) -> Result<(Vec<(f64, f64)>, f64), PricingError> {
        let (mean, sd, discount_factor) = self.log_moments(maturity, bsm)?;
        if sd <= 0.0 {
            return Ok((vec![(mean.exp(), 1.0)], discount_factor));
        }

        let nodes = real_line_nodes(self.n_steps)
            .into_iter()
            .map(|(z, w)| ((mean + sd * z).exp(), w * normal_pdf(z)))
            .collect();
        Ok((nodes, discount_factor))
    }
}

impl PricingEngine for RectangleRulePricer {
    /// Prices a path-independent contract on a single stock.
    ///
    /// # Errors
    /// Returns [`PricingError::InvalidInput`] for path-dependent contracts and
    /// for contracts on more than one stock.
    fn estimate<C: Contract + ?Sized>(
        &self,
        contract: &C,
        model: &StockUniverseModel,
    ) -> Result<PricingResult, PricingError> {
        contract.validate()?;
        if contract.is_path_dependent() {
            return Err(PricingError::InvalidInput(format!(
                "{} is path dependent; quadrature needs a terminal payoff",
                contract.instrument_type()
            )));
        }
        let underlyings = contract.underlyings();
        let stock = match (underlyings.len(), underlyings.iter().next()) {
            (1, Some(stock)) => stock,
            (n, _) => {
                return Err(PricingError::InvalidInput(format!(
                    "{} depends on {n} stocks; quadrature supports exactly one",
                    contract.instrument_type()
                )));
            }
        };

        let bsm = model.black_scholes_model(stock)?;
        let maturity = contract.maturity();
        let (nodes, discount_factor) = self.terminal_grid(maturity, &bsm)?;

        let (prices, weights): (Vec<f64>, Vec<f64>) = nodes.into_iter().unzip();
        let simulation =
            MarketSimulation::terminal_snapshot(stock.clone(), bsm.date, maturity, prices)?;
        let payoffs = contract.payoff(&simulation)?;
        if payoffs.len() != weights.len() {
            return Err(PricingError::dimension(
                "payoff vector",
                weights.len(),
                payoffs.len(),
            ));
        }

        let expectation =
            finite_weighted_sum(payoffs.into_iter().zip(weights.iter().copied()));

        let mut diagnostics = BTreeMap::new();
        diagnostics.insert("num_nodes".to_string(), weights.len() as f64);
        diagnostics.insert("discount_factor".to_string(), discount_factor);

        Ok(PricingResult {
            price: discount_factor * expectation,
            stderr: None,
            diagnostics,
        })
    }
}
