//! Multi-asset geometric Brownian motion.
//!
//! A [`StockUniverseModel`] holds spot prices, drifts and a covariance matrix for
//! a set of named stocks. Price paths are generated with the exact log-Euler
//! scheme
//!
//! `ln S_i(t + dt) = ln S_i(t) + (mu_i - 0.5 * Sigma_ii) dt + sqrt(dt) (L Z)_i`
//!
//! where `L L^T = Sigma` and `Z` is a vector of independent standard normals.
//! `mu_i` is the asset drift under the physical measure and the risk-free rate
//! under the risk-neutral measure.

use std::collections::{BTreeMap, HashMap, HashSet};

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::core::{Measure, PricingError};
use crate::market::MarketSimulation;
use crate::math::cholesky_factor;
use crate::models::BlackScholesModel;

const SYMMETRY_TOL: f64 = 1.0e-12;

/// Correlated lognormal model of a collection of stocks.
#[derive(Debug, Clone, PartialEq)]
pub struct StockUniverseModel {
    stock_to_index: HashMap<String, usize>,
    stock_names: Vec<String>,
    stock_prices: DVector<f64>,
    drifts: DVector<f64>,
    covariance: DMatrix<f64>,
    risk_free_rate: f64,
    date: f64,
}

impl StockUniverseModel {
    /// Identifier given to the single stock of a model built from a [`BlackScholesModel`].
    pub const DEFAULT_STOCK: &'static str = "DEFAULT";

    /// Builds a universe from identifiers, spot prices, drifts and covariance.
    ///
    /// The risk-free rate and valuation date start at zero; see
    /// [`Self::with_risk_free_rate`] and [`Self::with_date`].
    ///
    /// # Errors
    /// - [`PricingError::DimensionMismatch`] when vector lengths or the matrix
    ///   shape disagree with the number of identifiers.
    /// - [`PricingError::InvalidInput`] for duplicate identifiers, non-positive
    ///   prices, non-finite entries, an asymmetric covariance matrix or a
    ///   negative variance.
    pub fn new(
        stocks: Vec<String>,
        stock_prices: DVector<f64>,
        drifts: DVector<f64>,
        covariance: DMatrix<f64>,
    ) -> Result<Self, PricingError> {
        let n = stocks.len();
        if n == 0 {
            return Err(PricingError::InvalidInput(
                "stock universe must contain at least one stock".to_string(),
            ));
        }
        if stock_prices.len() != n {
            return Err(PricingError::dimension("stock price vector", n, stock_prices.len()));
        }
        if drifts.len() != n {
            return Err(PricingError::dimension("drift vector", n, drifts.len()));
        }
        if covariance.nrows() != n {
            return Err(PricingError::dimension("covariance rows", n, covariance.nrows()));
        }
        if covariance.ncols() != n {
            return Err(PricingError::dimension("covariance columns", n, covariance.ncols()));
        }

        let mut stock_to_index = HashMap::with_capacity(n);
        for (idx, stock) in stocks.iter().enumerate() {
            if stock_to_index.insert(stock.clone(), idx).is_some() {
                return Err(PricingError::InvalidInput(format!(
                    "duplicate stock identifier `{stock}`"
                )));
            }
        }

        if stock_prices.iter().any(|&s| !(s.is_finite() && s > 0.0)) {
            return Err(PricingError::InvalidInput(
                "stock prices must be finite and > 0".to_string(),
            ));
        }
        if drifts.iter().any(|d| !d.is_finite()) {
            return Err(PricingError::InvalidInput("drifts must be finite".to_string()));
        }
        if covariance.iter().any(|c| !c.is_finite()) {
            return Err(PricingError::InvalidInput(
                "covariance entries must be finite".to_string(),
            ));
        }
        for i in 0..n {
            if covariance[(i, i)] < 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "variance of `{}` must be >= 0",
                    stocks[i]
                )));
            }
            for j in 0..i {
                let (a, b) = (covariance[(i, j)], covariance[(j, i)]);
                if (a - b).abs() > SYMMETRY_TOL * a.abs().max(b.abs()).max(1.0) {
                    return Err(PricingError::InvalidInput(
                        "covariance matrix must be symmetric".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            stock_to_index,
            stock_names: stocks,
            stock_prices,
            drifts,
            covariance,
            risk_free_rate: 0.0,
            date: 0.0,
        })
    }

    /// One-stock universe named [`Self::DEFAULT_STOCK`] with variance `volatility^2`.
    pub fn from_black_scholes(bsm: &BlackScholesModel) -> Result<Self, PricingError> {
        bsm.validate()?;
        let model = Self::new(
            vec![Self::DEFAULT_STOCK.to_string()],
            DVector::from_element(1, bsm.stock_price),
            DVector::from_element(1, bsm.drift),
            DMatrix::from_element(1, 1, bsm.volatility * bsm.volatility),
        )?;
        Ok(model
            .with_risk_free_rate(bsm.risk_free_rate)
            .with_date(bsm.date))
    }

    /// Reference three-stock universe (`Acme`, `Bigbank`, `Chumhum`) used by
    /// tests, benchmarks and the demo binary.
    pub fn create_test_model() -> Self {
        let stocks = ["Acme", "Bigbank", "Chumhum"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let prices = DVector::from_vec(vec![100.0, 120.0, 80.0]);
        let drifts = DVector::from_vec(vec![0.08, 0.10, 0.06]);
        // vols 20%, 25%, 15%; correlations 0.3 (A,B), 0.2 (A,C), 0.5 (B,C)
        let covariance = DMatrix::from_row_slice(
            3,
            3,
            &[
                0.04, 0.015, 0.006, //
                0.015, 0.0625, 0.018_75, //
                0.006, 0.018_75, 0.0225,
            ],
        );
        Self {
            stock_to_index: [("Acme", 0), ("Bigbank", 1), ("Chumhum", 2)]
                .into_iter()
                .map(|(s, i)| (s.to_string(), i))
                .collect(),
            stock_names: stocks,
            stock_prices: prices,
            drifts,
            covariance,
            risk_free_rate: 0.05,
            date: 0.0,
        }
    }

    /// Sets the risk-free rate.
    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    /// Sets the valuation date in years.
    pub fn with_date(mut self, date: f64) -> Self {
        self.date = date;
        self
    }

    /// Continuously compounded risk-free rate.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn set_risk_free_rate(&mut self, risk_free_rate: f64) {
        self.risk_free_rate = risk_free_rate;
    }

    /// Valuation date in years.
    pub fn date(&self) -> f64 {
        self.date
    }

    pub fn set_date(&mut self, date: f64) {
        self.date = date;
    }

    /// Stock identifiers in matrix order.
    pub fn stocks(&self) -> &[String] {
        &self.stock_names
    }

    pub fn n_stocks(&self) -> usize {
        self.stock_names.len()
    }

    pub fn contains(&self, stock: &str) -> bool {
        self.stock_to_index.contains_key(stock)
    }

    /// Matrix index of a stock.
    pub fn index_of(&self, stock: &str) -> Result<usize, PricingError> {
        self.stock_to_index
            .get(stock)
            .copied()
            .ok_or_else(|| PricingError::UnknownAsset(stock.to_string()))
    }

    pub fn stock_price(&self, stock: &str) -> Result<f64, PricingError> {
        Ok(self.stock_prices[self.index_of(stock)?])
    }

    pub fn stock_prices(&self) -> &DVector<f64> {
        &self.stock_prices
    }

    pub fn drifts(&self) -> &DVector<f64> {
        &self.drifts
    }

    pub fn covariance_matrix(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Covariance between two named stocks.
    pub fn covariance(&self, stock_1: &str, stock_2: &str) -> Result<f64, PricingError> {
        let i = self.index_of(stock_1)?;
        let j = self.index_of(stock_2)?;
        Ok(self.covariance[(i, j)])
    }

    /// Volatility `sqrt(Sigma_ii)` of a named stock.
    pub fn volatility(&self, stock: &str) -> Result<f64, PricingError> {
        let i = self.index_of(stock)?;
        Ok(self.covariance[(i, i)].sqrt())
    }

    /// One-dimensional model for a single stock.
    pub fn black_scholes_model(&self, stock: &str) -> Result<BlackScholesModel, PricingError> {
        let i = self.index_of(stock)?;
        Ok(BlackScholesModel {
            stock_price: self.stock_prices[i],
            volatility: self.covariance[(i, i)].sqrt(),
            drift: self.drifts[i],
            risk_free_rate: self.risk_free_rate,
            date: self.date,
        })
    }

    /// Universe restricted to the requested stocks.
    ///
    /// The restricted model keeps this model's ordering, rate and date.
    /// Repeated identifiers in the request are ignored.
    pub fn submodel<I, S>(&self, stocks: I) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = HashSet::new();
        for stock in stocks {
            wanted.insert(self.index_of(stock.as_ref())?);
        }
        if wanted.is_empty() {
            return Err(PricingError::InvalidInput(
                "submodel requires at least one stock".to_string(),
            ));
        }

        let mut indices: Vec<usize> = wanted.into_iter().collect();
        indices.sort_unstable();
        if indices.len() == self.n_stocks() {
            return Ok(self.clone());
        }

        let k = indices.len();
        let stock_names: Vec<String> = indices.iter().map(|&i| self.stock_names[i].clone()).collect();
        let stock_to_index = stock_names
            .iter()
            .enumerate()
            .map(|(pos, name)| (name.clone(), pos))
            .collect();

        Ok(Self {
            stock_to_index,
            stock_names,
            stock_prices: DVector::from_fn(k, |r, _| self.stock_prices[indices[r]]),
            drifts: DVector::from_fn(k, |r, _| self.drifts[indices[r]]),
            covariance: DMatrix::from_fn(k, k, |r, c| self.covariance[(indices[r], indices[c])]),
            risk_free_rate: self.risk_free_rate,
            date: self.date,
        })
    }

    /// Simulates prices up to `to_date` under the physical measure.
    pub fn generate_price_paths<R: Rng + ?Sized>(
        &self,
        to_date: f64,
        n_paths: usize,
        n_steps: usize,
        rng: &mut R,
    ) -> Result<MarketSimulation, PricingError> {
        self.simulate(Measure::Physical, to_date, n_paths, n_steps, rng)
    }

    /// Simulates prices up to `to_date` under the risk-neutral measure.
    pub fn generate_risk_neutral_price_paths<R: Rng + ?Sized>(
        &self,
        to_date: f64,
        n_paths: usize,
        n_steps: usize,
        rng: &mut R,
    ) -> Result<MarketSimulation, PricingError> {
        self.simulate(Measure::RiskNeutral, to_date, n_paths, n_steps, rng)
    }

    /// Simulates `n_paths` price paths of `n_steps` steps to `to_date`.
    ///
    /// Each stock receives an `n_paths x (n_steps + 1)` matrix whose first
    /// column is the current price. Normals are drawn path by path, step by
    /// step, one vector per step, so a fixed generator state reproduces the
    /// simulation exactly.
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        measure: Measure,
        to_date: f64,
        n_paths: usize,
        n_steps: usize,
        rng: &mut R,
    ) -> Result<MarketSimulation, PricingError> {
        if n_paths == 0 {
            return Err(PricingError::InvalidInput("n_paths must be > 0".to_string()));
        }
        if n_steps == 0 {
            return Err(PricingError::InvalidInput("n_steps must be > 0".to_string()));
        }
        if !to_date.is_finite() || to_date < self.date {
            return Err(PricingError::InvalidInput(format!(
                "simulation end date {to_date} must be finite and >= valuation date {}",
                self.date
            )));
        }

        let n = self.n_stocks();
        let chol = cholesky_factor(&self.covariance)?;
        let dt = (to_date - self.date) / n_steps as f64;
        let sqrt_dt = dt.sqrt();

        let log_drift = DVector::from_fn(n, |i, _| {
            let mu = match measure {
                Measure::Physical => self.drifts[i],
                Measure::RiskNeutral => self.risk_free_rate,
            };
            (mu - 0.5 * self.covariance[(i, i)]) * dt
        });
        let log_spot = self.stock_prices.map(f64::ln);

        let mut paths: Vec<DMatrix<f64>> = (0..n)
            .map(|_| DMatrix::zeros(n_paths, n_steps + 1))
            .collect();
        let mut z = DVector::<f64>::zeros(n);
        let mut shock = DVector::<f64>::zeros(n);
        let mut log_s = DVector::<f64>::zeros(n);

        for p in 0..n_paths {
            log_s.copy_from(&log_spot);
            for (i, stock_paths) in paths.iter_mut().enumerate() {
                stock_paths[(p, 0)] = self.stock_prices[i];
            }

            for step in 1..=n_steps {
                for zi in z.iter_mut() {
                    *zi = StandardNormal.sample(&mut *rng);
                }
                shock.gemv(sqrt_dt, &chol, &z, 0.0);

                for (i, stock_paths) in paths.iter_mut().enumerate() {
                    log_s[i] += log_drift[i] + shock[i];
                    stock_paths[(p, step)] = log_s[i].exp();
                }
            }
        }

        let by_stock: BTreeMap<String, DMatrix<f64>> =
            self.stock_names.iter().cloned().zip(paths).collect();
        MarketSimulation::new(self.date, to_date, by_stock)
    }
}
