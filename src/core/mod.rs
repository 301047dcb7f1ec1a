//! Core traits, common domain types, and library-wide result/error structures.

use std::collections::BTreeMap;

use crate::instruments::Contract;
use crate::models::StockUniverseModel;

pub mod serialization;
pub mod types;

pub use serialization::*;
pub use types::*;

/// Pricing engine abstraction over any [`Contract`].
///
/// Engines are immutable configuration; every call allocates its own
/// simulation or quadrature state, so one engine may be shared freely.
pub trait PricingEngine {
    /// Prices a contract under the provided model and reports engine diagnostics.
    fn estimate<C: Contract + ?Sized>(
        &self,
        contract: &C,
        model: &StockUniverseModel,
    ) -> Result<PricingResult, PricingError>;

    /// Prices a contract and returns only the present value.
    fn price<C: Contract + ?Sized>(
        &self,
        contract: &C,
        model: &StockUniverseModel,
    ) -> Result<f64, PricingError> {
        Ok(self.estimate(contract, model)?.price)
    }
}

/// Unified engine result payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PricingResult {
    /// Present value.
    pub price: f64,
    /// Standard error (Monte Carlo only).
    pub stderr: Option<f64>,
    /// Engine-specific scalar diagnostics.
    pub diagnostics: BTreeMap<String, f64>,
}

impl PricingResult {
    /// Result without sampling error or diagnostics.
    pub fn exact(price: f64) -> Self {
        Self {
            price,
            stderr: None,
            diagnostics: BTreeMap::new(),
        }
    }
}

/// Engine and model errors surfaced by the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Identifier not present in the model.
    #[error("unknown asset: {0}")]
    UnknownAsset(String),
    /// Vector/matrix sizes disagree.
    #[error("dimension mismatch: {context} expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },
    /// Invalid portfolio position index.
    #[error("index out of range: {index} (portfolio size {len})")]
    OutOfRange { index: usize, len: usize },
    /// Input validation error.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Numerical issue (non-factorisable matrix, etc.).
    #[error("numerical error: {0}")]
    NumericalError(String),
}

impl PricingError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_category_and_detail() {
        assert_eq!(
            PricingError::UnknownAsset("Acme".to_string()).to_string(),
            "unknown asset: Acme"
        );
        assert_eq!(
            PricingError::dimension("drift vector", 3, 2).to_string(),
            "dimension mismatch: drift vector expected 3, got 2"
        );
        assert_eq!(
            PricingError::OutOfRange { index: 4, len: 2 }.to_string(),
            "index out of range: 4 (portfolio size 2)"
        );
    }
}
