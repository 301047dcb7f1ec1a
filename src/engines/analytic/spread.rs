use crate::math::{correlation_from_covariance, normal_cdf};

/// Margrabe (1978) price of the option to exchange asset 2 for asset 1,
/// paying `max(S1_T - S2_T, 0)`.
///
/// `variance_1`, `variance_2` and `covariance` are annualised entries of the
/// covariance matrix of log returns; the correlation is
/// `covariance / (vol_1 * vol_2)`. The risk-free rate cancels because the
/// option is priced in units of asset 2.
///
/// Non-positive `expiry` or a vanishing spread volatility returns
/// `max(S1 - S2, 0)`.
pub fn margrabe_exchange_price(
    spot_1: f64,
    spot_2: f64,
    variance_1: f64,
    variance_2: f64,
    covariance: f64,
    expiry: f64,
) -> f64 {
    if expiry <= 0.0 {
        return (spot_1 - spot_2).max(0.0);
    }

    let vol_1 = variance_1.max(0.0).sqrt();
    let vol_2 = variance_2.max(0.0).sqrt();
    let rho = correlation_from_covariance(covariance, variance_1, variance_2);
    let sigma = (vol_1 * vol_1 - 2.0 * rho * vol_1 * vol_2 + vol_2 * vol_2)
        .max(0.0)
        .sqrt();
    if sigma <= 0.0 {
        return (spot_1 - spot_2).max(0.0);
    }

    let sig_sqrt_t = sigma * expiry.sqrt();
    let d1 = ((spot_1 / spot_2).ln() + 0.5 * sigma * sigma * expiry) / sig_sqrt_t;
    let d2 = d1 - sig_sqrt_t;

    spot_1.mul_add(normal_cdf(d1), -(spot_2 * normal_cdf(d2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionType;
    use crate::engines::analytic::bs_price;
    use approx::assert_relative_eq;

    #[test]
    fn margrabe_matches_ratio_call_representation() {
        // Exchange option = S2 * call(S1/S2, strike 1, r = 0, vol = sigma)
        let (s1, s2, v1, v2, rho, t): (f64, f64, f64, f64, f64, f64) =
            (100.0, 105.0, 0.20, 0.15, 0.5, 1.3);
        let sigma = (v1 * v1 - 2.0 * rho * v1 * v2 + v2 * v2).sqrt();
        let expected = s2 * bs_price(OptionType::Call, s1 / s2, 1.0, 0.0, sigma, t);
        let price = margrabe_exchange_price(s1, s2, v1 * v1, v2 * v2, rho * v1 * v2, t);
        assert_relative_eq!(price, expected, epsilon = 1e-10);
    }

    #[test]
    fn degenerate_inputs_return_intrinsic() {
        assert_eq!(margrabe_exchange_price(110.0, 100.0, 0.04, 0.04, 0.01, 0.0), 10.0);
        // perfectly correlated equal vols: spread never moves
        assert_eq!(margrabe_exchange_price(90.0, 100.0, 0.04, 0.04, 0.04, 2.0), 0.0);
        assert_eq!(margrabe_exchange_price(100.0, 90.0, 0.0, 0.0, 0.0, 2.0), 10.0);
    }

    #[test]
    fn price_is_bounded_by_spot_of_long_leg() {
        let price = margrabe_exchange_price(100.0, 120.0, 0.04, 0.0625, 0.015, 3.0);
        assert!(price > 0.0 && price < 100.0);
        assert!(price >= (100.0_f64 - 120.0).max(0.0));
    }
}
