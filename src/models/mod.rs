//! Stochastic models of stock prices.
//!
//! [`StockUniverseModel`] is the multi-asset correlated GBM that drives Monte
//! Carlo simulation; [`BlackScholesModel`] is its one-stock projection used by
//! closed-form and quadrature pricing.

pub mod black_scholes;
pub mod universe;

pub use black_scholes::BlackScholesModel;
pub use universe::StockUniverseModel;
