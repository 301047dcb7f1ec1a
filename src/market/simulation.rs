//! Container for simulated price paths.
//!
//! A [`MarketSimulation`] stores, for every simulated stock, a matrix with one
//! row per scenario and one column per time point. Column `0` is the price at
//! `start_date` and the last column is the price at `end_date`; intermediate
//! columns are evenly spaced.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVectorView};

use crate::core::PricingError;

/// Simulated price paths for a set of stocks over a common time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSimulation {
    start_date: f64,
    end_date: f64,
    n_paths: usize,
    n_times: usize,
    paths: BTreeMap<String, DMatrix<f64>>,
}

impl MarketSimulation {
    /// Wraps per-stock path matrices.
    ///
    /// # Errors
    /// Returns [`PricingError::DimensionMismatch`] when path matrices disagree
    /// in shape, and [`PricingError::InvalidInput`] when no stock is given, a
    /// matrix has no time column, or `end_date < start_date`.
    pub fn new(
        start_date: f64,
        end_date: f64,
        paths: BTreeMap<String, DMatrix<f64>>,
    ) -> Result<Self, PricingError> {
        if !(start_date.is_finite() && end_date.is_finite()) || end_date < start_date {
            return Err(PricingError::InvalidInput(format!(
                "simulation window [{start_date}, {end_date}] is not valid"
            )));
        }

        let mut shapes = paths.values().map(|m| m.shape());
        let (n_paths, n_times) = shapes.next().ok_or_else(|| {
            PricingError::InvalidInput("simulation must contain at least one stock".to_string())
        })?;
        if n_times == 0 {
            return Err(PricingError::InvalidInput(
                "simulation must contain at least one time point".to_string(),
            ));
        }
        for (rows, cols) in shapes {
            if rows != n_paths {
                return Err(PricingError::dimension("simulated path count", n_paths, rows));
            }
            if cols != n_times {
                return Err(PricingError::dimension("simulated time points", n_times, cols));
            }
        }

        Ok(Self {
            start_date,
            end_date,
            n_paths,
            n_times,
            paths,
        })
    }

    /// Single-time-point simulation holding only the prices of one stock at `end_date`.
    ///
    /// ```
    /// use ferric_portfolio::market::MarketSimulation;
    ///
    /// let sim = MarketSimulation::terminal_snapshot("Acme", 0.0, 1.0, vec![90.0, 110.0]).unwrap();
    /// assert_eq!(sim.n_paths(), 2);
    /// assert_eq!(sim.terminal_prices("Acme").unwrap()[1], 110.0);
    /// ```
    pub fn terminal_snapshot(
        stock: impl Into<String>,
        start_date: f64,
        end_date: f64,
        prices: Vec<f64>,
    ) -> Result<Self, PricingError> {
        let n = prices.len();
        let mut paths = BTreeMap::new();
        paths.insert(stock.into(), DMatrix::from_vec(n, 1, prices));
        Self::new(start_date, end_date, paths)
    }

    pub fn start_date(&self) -> f64 {
        self.start_date
    }

    pub fn end_date(&self) -> f64 {
        self.end_date
    }

    /// Number of scenarios (matrix rows).
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of time steps; one less than the number of stored time points.
    pub fn n_steps(&self) -> usize {
        self.n_times - 1
    }

    /// Time of column `step` in years.
    pub fn time_at(&self, step: usize) -> f64 {
        if self.n_times == 1 {
            return self.end_date;
        }
        self.start_date + (self.end_date - self.start_date) * step as f64 / (self.n_times - 1) as f64
    }

    /// Identifiers of the simulated stocks, sorted.
    pub fn stocks(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn contains(&self, stock: &str) -> bool {
        self.paths.contains_key(stock)
    }

    /// Full `n_paths x (n_steps + 1)` path matrix for a stock.
    pub fn stock_paths(&self, stock: &str) -> Result<&DMatrix<f64>, PricingError> {
        self.paths
            .get(stock)
            .ok_or_else(|| PricingError::UnknownAsset(stock.to_string()))
    }

    /// Prices of a stock at `end_date`, one per scenario.
    pub fn terminal_prices(&self, stock: &str) -> Result<DVectorView<'_, f64>, PricingError> {
        let paths = self.stock_paths(stock)?;
        Ok(paths.column(self.n_times - 1))
    }
}
