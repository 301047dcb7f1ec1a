//! Closed-form Black-Scholes prices for European vanilla payoffs.
//!
//! References: Hull (2018), Ch. 15.

use crate::core::OptionType;
use crate::math::normal_cdf;

#[inline]
fn d1_d2(spot: f64, strike: f64, rate: f64, vol: f64, expiry: f64) -> (f64, f64) {
    let sig_sqrt_t = vol * expiry.sqrt();
    let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * expiry) / sig_sqrt_t;
    (d1, d1 - sig_sqrt_t)
}

/// Black-Scholes price of a European call or put on a non-dividend-paying stock.
///
/// `expiry` is the time to maturity in years. Non-positive `expiry` returns the
/// intrinsic value and non-positive `vol` the discounted forward intrinsic, so
/// neither case reaches the `d1`/`d2` division.
///
/// ```
/// use ferric_portfolio::core::OptionType;
/// use ferric_portfolio::engines::analytic::bs_price;
///
/// let call = bs_price(OptionType::Call, 100.0, 100.0, 0.0, 0.1, 1.0);
/// let put = bs_price(OptionType::Put, 100.0, 100.0, 0.0, 0.1, 1.0);
/// assert!((call - put).abs() < 1e-10);
/// ```
pub fn bs_price(
    option_type: OptionType,
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    expiry: f64,
) -> f64 {
    if expiry <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }
    let df = (-rate * expiry).exp();
    if vol <= 0.0 {
        return option_type.intrinsic(spot, strike * df);
    }
    if strike <= 0.0 {
        // the option is certain to be exercised
        return match option_type {
            OptionType::Call => spot - strike * df,
            OptionType::Put => 0.0,
        };
    }

    let (d1, d2) = d1_d2(spot, strike, rate, vol, expiry);
    match option_type {
        OptionType::Call => spot * normal_cdf(d1) - strike * df * normal_cdf(d2),
        OptionType::Put => strike * df * normal_cdf(-d2) - spot * normal_cdf(-d1),
    }
}
