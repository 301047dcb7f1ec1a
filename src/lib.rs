//! `ferric_portfolio` prices portfolios of equity options on a universe of
//! correlated stocks.
//!
//! The stocks follow a multi-asset geometric Brownian motion
//! ([`models::StockUniverseModel`]). Contracts ([`instruments::Contract`])
//! map simulated price paths to payoffs, and are valued either in closed form,
//! by Monte Carlo simulation ([`engines::MonteCarloPricer`]) or, for terminal
//! payoffs on one stock, by quadrature against the lognormal density
//! ([`engines::RectangleRulePricer`]). A [`portfolio::Portfolio`] aggregates
//! weighted contracts and can price them with one simulation per distinct
//! maturity.
//!
//! References:
//! - Hull, *Options, Futures, and Other Derivatives*, Ch. 15 and 26.
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*, Ch. 2-3.
//! - Margrabe (1978), *The Value of an Option to Exchange One Asset for Another*.
//!
//! # Feature Flags
//! - `parallel`: prices maturity groups concurrently with Rayon.
//! - `cli`: builds the `price_portfolio` demo binary.
//!
//! # Quick Start
//! Closed-form and simulated prices of a call:
//! ```rust
//! use ferric_portfolio::prelude::*;
//!
//! let model = StockUniverseModel::create_test_model();
//! let call = VanillaOption::european_call("Acme", 100.0, 1.0);
//!
//! let exact = call.price(&model).unwrap();
//! let mc = MonteCarloPricer::new(50_000, 1)
//!     .with_seed(42)
//!     .estimate(&call, &model)
//!     .unwrap();
//! assert!((mc.price - exact).abs() < 4.0 * mc.stderr.unwrap());
//! ```
//!
//! Price a portfolio with one simulation per maturity:
//! ```rust
//! use ferric_portfolio::prelude::*;
//!
//! let model = StockUniverseModel::create_test_model();
//! let mut portfolio = Portfolio::new();
//! portfolio.add(1.0, MargrabeOption::new("Bigbank", "Acme", 1.0));
//! portfolio.add(-2.0, VanillaOption::european_put("Chumhum", 80.0, 1.0));
//!
//! let grouped = portfolio
//!     .estimate_by_monte_carlo(&model, &MonteCarloPricer::new(20_000, 1).with_seed(1))
//!     .unwrap();
//! let exact = portfolio.price(&model).unwrap();
//! assert!((grouped.price - exact).abs() < 4.0 * grouped.stderr.unwrap());
//! ```

pub mod core;
pub mod engines;
pub mod instruments;
pub mod market;
pub mod math;
pub mod models;
pub mod portfolio;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{
        BarrierDirection, Measure, OptionType, PricingEngine, PricingError, PricingResult,
    };
    pub use crate::engines::{MonteCarloPricer, RectangleRulePricer};
    pub use crate::instruments::{
        Contract, Instrument, KnockoutOption, KnockoutOptionBuilder, MargrabeOption,
        VanillaOption,
    };
    pub use crate::market::MarketSimulation;
    pub use crate::models::{BlackScholesModel, StockUniverseModel};
    pub use crate::portfolio::{Portfolio, Position};
}
