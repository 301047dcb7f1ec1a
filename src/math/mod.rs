//! Numerical kernels shared by the pricing engines: the standard normal
//! distribution, quadrature over the real line, covariance factorisation and
//! random-stream seeding.

pub mod correlation;
pub mod random;

pub use correlation::{cholesky_factor, cholesky_lower_psd, correlation_from_covariance};
pub use random::{fresh_seed, seeded_rng, stream_seed};

pub fn normal_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

pub fn normal_cdf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.231_641_9 * z);
    let poly = t
        * (0.319_381_530
            + t * (-0.356_563_782
                + t * (1.781_477_937 + t * (-1.821_255_978 + t * 1.330_274_429))));
    let approx = 1.0 - normal_pdf(z) * poly;
    if x >= 0.0 { approx } else { 1.0 - approx }
}

/// Midpoint-rule nodes `(x, weight)` covering the whole real line.
///
/// Uses the substitution `x = t / (1 - t^2)` on `t in (-1, 1)`, which maps the
/// interval onto `R` with Jacobian `(1 + t^2) / (1 - t^2)^2`. Midpoints never
/// touch `t = +-1`, so every abscissa is finite. Weights already include the
/// step width and the Jacobian.
///
/// The grid is densest around `x = 0`; callers should centre and scale the
/// integrand so its mass lies within a few units of the origin.
pub fn real_line_nodes(n_steps: usize) -> Vec<(f64, f64)> {
    if n_steps == 0 {
        return Vec::new();
    }

    let h = 2.0 / n_steps as f64;
    (0..n_steps)
        .map(|i| {
            let t = -1.0 + (i as f64 + 0.5) * h;
            let one_minus_t2 = 1.0 - t * t;
            let jacobian = (1.0 + t * t) / (one_minus_t2 * one_minus_t2);
            (t / one_minus_t2, h * jacobian)
        })
        .collect()
}

/// Sum of `value * weight` over `samples`, where a non-finite product
/// contributes zero.
pub fn finite_weighted_sum<I>(samples: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    samples
        .into_iter()
        .map(|(value, weight)| {
            let term = value * weight;
            if term.is_finite() { term } else { 0.0 }
        })
        .sum()
}

/// Midpoint-rule integral of `f` over the whole real line on the
/// [`real_line_nodes`] grid. Samples where the weighted integrand is not
/// finite contribute zero.
pub fn integral_over_r<F>(f: F, n_steps: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    finite_weighted_sum(real_line_nodes(n_steps).into_iter().map(|(x, w)| (f(x), w)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_pdf_and_cdf_sanity() {
        assert_relative_eq!(normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-12);
        assert_relative_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(normal_cdf(1.0), 0.841_344_746, epsilon = 2e-5);
        assert_relative_eq!(normal_cdf(-1.0), 1.0 - normal_cdf(1.0), epsilon = 1e-12);
    }

    #[test]
    fn integral_over_r_recovers_gaussian_moments() {
        let mass = integral_over_r(normal_pdf, 1_000);
        assert_relative_eq!(mass, 1.0, epsilon = 1e-7);

        let second_moment = integral_over_r(|x| x * x * normal_pdf(x), 1_000);
        assert_relative_eq!(second_moment, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn integral_over_r_drops_non_finite_samples() {
        let value = integral_over_r(
            |x| {
                if x > 50.0 {
                    f64::INFINITY
                } else {
                    normal_pdf(x)
                }
            },
            1_000,
        );
        assert!(value.is_finite());
        assert_relative_eq!(value, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn weighted_sum_skips_non_finite_terms() {
        let total = finite_weighted_sum([
            (2.0, 0.5),
            (f64::NAN, 1.0),
            (f64::INFINITY, 0.0),
            (3.0, 2.0),
        ]);
        assert_eq!(total, 7.0);
    }

    #[test]
    fn integral_over_r_with_no_steps_is_zero() {
        assert_eq!(integral_over_r(normal_pdf, 0), 0.0);
    }

    #[test]
    fn nodes_are_symmetric_and_finite() {
        let nodes = real_line_nodes(10);
        assert_eq!(nodes.len(), 10);
        for (a, b) in nodes.iter().zip(nodes.iter().rev()) {
            assert_relative_eq!(a.0, -b.0, epsilon = 1e-12);
            assert_relative_eq!(a.1, b.1, epsilon = 1e-12);
        }
        assert!(nodes.iter().all(|(x, w)| x.is_finite() && *w > 0.0));
    }
}
