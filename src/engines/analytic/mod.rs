//! Closed-form pricing formulas.

pub mod black_scholes;
pub mod spread;

pub use black_scholes::bs_price;
pub use spread::margrabe_exchange_price;
