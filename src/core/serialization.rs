//! Declarative portfolio and model payloads.
//!
//! These types describe positions and stock universes as plain serde data so
//! they can be stored as JSON or MessagePack and turned into live
//! [`Portfolio`] and [`StockUniverseModel`] values.
//!
//! # Examples
//! ```rust
//! use ferric_portfolio::core::{
//!     from_json, from_msgpack, to_json_pretty, to_msgpack, ContractSpec, PortfolioSpec,
//!     PositionSpec,
//! };
//! use ferric_portfolio::instruments::{MargrabeOption, VanillaOption};
//!
//! let spec = PortfolioSpec {
//!     portfolio_id: "PF-001".to_string(),
//!     fallback_pricer: None,
//!     positions: vec![
//!         PositionSpec {
//!             quantity: 2.0,
//!             contract: ContractSpec::VanillaOption(VanillaOption::european_call("Acme", 100.0, 1.0)),
//!         },
//!         PositionSpec {
//!             quantity: -1.0,
//!             contract: ContractSpec::MargrabeOption(MargrabeOption::new("Bigbank", "Acme", 2.0)),
//!         },
//!     ],
//! };
//!
//! let json = to_json_pretty(&spec).expect("json serialization");
//! let decoded: PortfolioSpec = from_json(&json).expect("json deserialization");
//! assert_eq!(decoded, spec);
//!
//! let bytes = to_msgpack(&spec).expect("msgpack serialization");
//! let decoded_msgpack: PortfolioSpec = from_msgpack(&bytes).expect("msgpack deserialization");
//! assert_eq!(decoded_msgpack, spec);
//!
//! let portfolio = spec.into_portfolio().expect("valid portfolio");
//! assert_eq!(portfolio.len(), 2);
//! ```

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::de::DeserializeOwned;

use crate::core::PricingError;
use crate::engines::monte_carlo::MonteCarloPricer;
use crate::instruments::{Contract, KnockoutOption, MargrabeOption, VanillaOption};
use crate::models::StockUniverseModel;
use crate::portfolio::Portfolio;

/// Contract payload tagged by `product_type` in JSON.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "product_type", content = "payload", rename_all = "snake_case")]
pub enum ContractSpec {
    VanillaOption(VanillaOption),
    KnockoutOption(KnockoutOption),
    MargrabeOption(MargrabeOption),
}

impl ContractSpec {
    /// Validates the payload and wraps it as a shared contract.
    pub fn into_contract(self) -> Result<Arc<dyn Contract>, PricingError> {
        let contract: Arc<dyn Contract> = match self {
            Self::VanillaOption(option) => {
                option.validate()?;
                Arc::new(option)
            }
            Self::KnockoutOption(option) => {
                option.validate()?;
                Arc::new(option)
            }
            Self::MargrabeOption(option) => {
                option.validate()?;
                Arc::new(option)
            }
        };
        Ok(contract)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PositionSpec {
    pub quantity: f64,
    pub contract: ContractSpec,
}

/// Portfolio payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortfolioSpec {
    pub portfolio_id: String,
    /// Pricer for contracts without a closed form; the default pricer when absent.
    #[serde(default)]
    pub fallback_pricer: Option<MonteCarloPricer>,
    pub positions: Vec<PositionSpec>,
}

impl PortfolioSpec {
    /// Builds a [`Portfolio`] with positions in payload order.
    ///
    /// # Errors
    /// Returns the first validation error among the contracts, or
    /// [`PricingError::InvalidInput`] for a non-finite quantity.
    pub fn into_portfolio(self) -> Result<Portfolio, PricingError> {
        let mut portfolio = Portfolio::new();
        if let Some(pricer) = self.fallback_pricer {
            portfolio = portfolio.with_fallback_pricer(pricer);
        }
        for (index, position) in self.positions.into_iter().enumerate() {
            if !position.quantity.is_finite() {
                return Err(PricingError::InvalidInput(format!(
                    "position {index} quantity must be finite"
                )));
            }
            portfolio.add_shared(position.quantity, position.contract.into_contract()?);
        }
        Ok(portfolio)
    }
}

/// One stock of a [`ModelSpec`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StockSpec {
    pub id: String,
    pub price: f64,
    pub drift: f64,
}

/// Stock universe payload; `covariance` is row-major, one row per stock.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelSpec {
    pub stocks: Vec<StockSpec>,
    pub covariance: Vec<Vec<f64>>,
    #[serde(default)]
    pub risk_free_rate: f64,
    #[serde(default)]
    pub date: f64,
}

impl ModelSpec {
    /// Builds and validates a [`StockUniverseModel`].
    pub fn into_model(self) -> Result<StockUniverseModel, PricingError> {
        let n = self.stocks.len();
        if self.covariance.len() != n {
            return Err(PricingError::dimension("covariance rows", n, self.covariance.len()));
        }
        let mut entries = Vec::with_capacity(n * n);
        for row in &self.covariance {
            if row.len() != n {
                return Err(PricingError::dimension("covariance columns", n, row.len()));
            }
            entries.extend_from_slice(row);
        }

        let prices = DVector::from_iterator(n, self.stocks.iter().map(|s| s.price));
        let drifts = DVector::from_iterator(n, self.stocks.iter().map(|s| s.drift));
        let ids = self.stocks.into_iter().map(|s| s.id).collect();
        let model = StockUniverseModel::new(ids, prices, drifts, DMatrix::from_row_slice(n, n, &entries))?;
        Ok(model
            .with_risk_free_rate(self.risk_free_rate)
            .with_date(self.date))
    }
}

/// Serialize a value to pretty JSON.
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Deserialize a value from JSON.
pub fn from_json<T: DeserializeOwned>(payload: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Serialize a value to MessagePack bytes.
pub fn to_msgpack<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(value)
}

/// Deserialize a value from MessagePack bytes.
pub fn from_msgpack<T: DeserializeOwned>(payload: &[u8]) -> Result<T, rmp_serde::decode::Error> {
    rmp_serde::from_slice(payload)
}
