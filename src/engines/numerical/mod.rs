//! Numerical-integration pricing engines.

pub mod rectangle_rule;

pub use rectangle_rule::RectangleRulePricer;
