//! Pricing engines: closed forms, Monte Carlo simulation and quadrature.

pub mod analytic;
pub mod monte_carlo;
pub mod numerical;

pub use monte_carlo::MonteCarloPricer;
pub use numerical::RectangleRulePricer;
