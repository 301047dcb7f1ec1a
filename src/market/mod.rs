//! Simulated market scenarios.

pub mod simulation;

pub use simulation::MarketSimulation;
