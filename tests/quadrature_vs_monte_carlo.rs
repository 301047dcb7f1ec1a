//! The rectangle-rule pricer cross-checks closed forms and Monte Carlo on
//! terminal payoffs.

use approx::assert_abs_diff_eq;
use ferric_portfolio::math::normal_cdf;
use ferric_portfolio::prelude::*;

fn dated_model() -> StockUniverseModel {
    let bsm = BlackScholesModel::new(100.0, 0.1)
        .with_risk_free_rate(0.1)
        .with_date(1.0);
    StockUniverseModel::from_black_scholes(&bsm).expect("valid model")
}

#[test]
fn rectangle_rule_matches_closed_form_within_a_cent() {
    let model = dated_model();
    let call = VanillaOption::european_call(StockUniverseModel::DEFAULT_STOCK, 100.0, 2.0);
    let numeric = RectangleRulePricer::default().price(&call, &model).unwrap();
    let exact = call.price(&model).unwrap();
    assert_abs_diff_eq!(numeric, exact, epsilon = 0.01);
    assert_abs_diff_eq!(exact, 10.308_150_925_634_408, epsilon = 1e-4);
}

#[test]
fn rectangle_rule_agrees_with_monte_carlo() {
    let model = dated_model();
    let call = VanillaOption::european_call(StockUniverseModel::DEFAULT_STOCK, 100.0, 2.0);
    let numeric = RectangleRulePricer::default().price(&call, &model).unwrap();
    let mc = MonteCarloPricer::new(400_000, 1)
        .with_seed(31)
        .estimate(&call, &model)
        .unwrap();
    let stderr = mc.stderr.unwrap();
    assert!(
        (numeric - mc.price).abs() < 4.0 * stderr,
        "quadrature={numeric} mc={} stderr={stderr}",
        mc.price
    );
    assert!(stderr < 0.02);
}

#[test]
fn rectangle_rule_prices_puts_on_universe_stocks() {
    let model = StockUniverseModel::create_test_model().with_date(0.5);
    let pricer = RectangleRulePricer::new(2_000);
    for (stock, strike) in [("Acme", 95.0), ("Bigbank", 130.0), ("Chumhum", 80.0)] {
        let put = VanillaOption::european_put(stock, strike, 2.0);
        let result = pricer.estimate(&put, &model).unwrap();
        assert_abs_diff_eq!(result.price, put.price(&model).unwrap(), epsilon = 1e-3);
        assert!(result.stderr.is_none());
        assert_eq!(result.diagnostics["num_nodes"], 2_000.0);
    }
}

#[test]
fn digital_payoff_closure_matches_discounted_probability() {
    let bsm = BlackScholesModel::new(100.0, 0.25).with_risk_free_rate(0.03);
    let (strike, t) = (110.0_f64, 1.5_f64);
    let value = RectangleRulePricer::default()
        .price_function(|s| if s > strike { 1.0 } else { 0.0 }, t, &bsm)
        .unwrap();

    let d2 = ((100.0 / strike).ln() + (0.03 - 0.5 * 0.25 * 0.25) * t) / (0.25 * t.sqrt());
    let expected = (-0.03 * t).exp() * normal_cdf(d2);
    assert_abs_diff_eq!(value, expected, epsilon = 2e-3);
}
