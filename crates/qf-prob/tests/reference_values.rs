//! Weighted chi-square CDFs against closed forms, statrs and published values.

use approx::assert_abs_diff_eq;
use qf_core::{ChiSquareTerm, Error};
use qf_prob::WeightedChiSquare;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

fn weighted(terms: &[(f64, f64, f64)], c: f64, accuracy: f64) -> WeightedChiSquare {
    let terms = terms.iter().map(|&(l, df, nc)| ChiSquareTerm::new(l, df, nc)).collect();
    WeightedChiSquare::new(terms, c, accuracy).unwrap()
}

#[test]
fn central_chi_square_matches_statrs() {
    for df in [1.0, 2.0, 3.0, 4.0, 7.0] {
        let engine = weighted(&[(1.0, df, 0.0)], 0.0, 1e-6);
        let reference = ChiSquared::new(df).unwrap();
        for x in [0.1, 0.5, 1.0, 2.0, 3.841459, 5.0, 8.0, 15.0] {
            let p = engine.cdf(x).unwrap();
            assert_abs_diff_eq!(p, reference.cdf(x), epsilon = 1e-5);
        }
    }
}

#[test]
fn textbook_95_percent_quantiles() {
    let k1 = weighted(&[(1.0, 1.0, 0.0)], 0.0, 1e-6);
    assert_abs_diff_eq!(k1.cdf(3.841459).unwrap(), 0.95, epsilon = 1e-3);
    let k2 = weighted(&[(1.0, 2.0, 0.0)], 0.0, 1e-6);
    assert_abs_diff_eq!(k2.cdf(5.991465).unwrap(), 0.95, epsilon = 1e-3);
}

#[test]
fn scaled_chi_square_matches_statrs() {
    // 2.5·χ²(3) <= x  <=>  χ²(3) <= x / 2.5
    let engine = weighted(&[(2.5, 3.0, 0.0)], 0.0, 1e-6);
    let reference = ChiSquared::new(3.0).unwrap();
    for x in [1.0, 5.0, 12.0, 30.0] {
        assert_abs_diff_eq!(engine.cdf(x).unwrap(), reference.cdf(x / 2.5), epsilon = 1e-5);
    }
}

#[test]
fn negated_chi_square_is_reflected() {
    // -χ²(2) <= x  <=>  χ²(2) >= -x
    let engine = weighted(&[(-1.0, 2.0, 0.0)], 0.0, 1e-6);
    for x in [-6.0, -2.0, -0.5] {
        assert_abs_diff_eq!(engine.cdf(x).unwrap(), (0.5 * x).exp(), epsilon = 1e-5);
    }
    assert_eq!(engine.cdf(1.0).unwrap(), 1.0);
}

#[test]
fn difference_of_exponentials_is_laplace() {
    // χ²(2) - χ²(2) is Laplace with scale 2.
    let engine = weighted(&[(1.0, 2.0, 0.0), (-1.0, 2.0, 0.0)], 0.0, 1e-6);
    for x in [-10.0_f64, -3.0, -1.0, -0.2, 0.2, 1.0, 3.0, 10.0] {
        let expected = if x >= 0.0 { 1.0 - 0.5 * (-0.5 * x).exp() } else { 0.5 * (0.5 * x).exp() };
        assert_abs_diff_eq!(engine.cdf(x).unwrap(), expected, epsilon = 1e-5);
    }
}

#[test]
fn folded_convergence_factor_keeps_coarse_accuracy() {
    // χ²(1) decays slowly in the frequency domain, so at coarse accuracy the
    // truncation point is only short enough once the convergence factor's
    // damping is part of the integrand.
    let reference = ChiSquared::new(1.0).unwrap();
    for accuracy in [1e-3, 1e-4] {
        let engine = weighted(&[(1.0, 1.0, 0.0)], 0.0, accuracy);
        for x in [0.01, 0.1, 0.5, 1.0, 2.0] {
            let eval = engine.cdf_with_trace(x).unwrap();
            assert!(eval.trace.convergence_sd > 0.0, "no damping at x = {}", x);
            assert_abs_diff_eq!(eval.probability, reference.cdf(x), epsilon = accuracy);
        }
    }
}

#[test]
fn normal_term_alone_matches_statrs() {
    for sigma in [1.0, 2.5] {
        let engine = weighted(&[(0.0, 1.0, 0.0)], sigma, 1e-6);
        let reference = Normal::new(0.0, sigma).unwrap();
        for x in [-5.0, -1.96, -0.3, 0.0, 1.0, 1.645, 4.0] {
            assert_abs_diff_eq!(engine.cdf(x).unwrap(), reference.cdf(x), epsilon = 1e-5);
        }
    }
}

/// Davies (1980), Table 1 (probabilities to 4 decimals).
#[test]
fn published_davies_table() {
    let cases: &[(&[(f64, f64, f64)], &[(f64, f64)])] = &[
        (&[(6.0, 1.0, 0.0), (3.0, 1.0, 0.0), (1.0, 1.0, 0.0)], &[(1.0, 0.0542), (7.0, 0.4936), (20.0, 0.8760)]),
        (&[(6.0, 2.0, 0.0), (3.0, 2.0, 0.0), (1.0, 2.0, 0.0)], &[(2.0, 0.0064), (20.0, 0.6002), (60.0, 0.9839)]),
        (&[(6.0, 6.0, 0.0), (3.0, 4.0, 0.0), (1.0, 2.0, 0.0)], &[(10.0, 0.0027), (50.0, 0.5648), (120.0, 0.9912)]),
        (&[(7.0, 6.0, 6.0), (3.0, 2.0, 2.0)], &[(20.0, 0.0061), (100.0, 0.5913), (200.0, 0.9779)]),
        (&[(7.0, 1.0, 6.0), (3.0, 1.0, 2.0)], &[(10.0, 0.0451), (60.0, 0.5924), (150.0, 0.9776)]),
    ];
    for (terms, points) in cases {
        let engine = weighted(terms, 0.0, 1e-6);
        for &(q, expected) in points.iter() {
            let p = engine.cdf(q).unwrap();
            assert!((p - expected).abs() < 2e-4, "terms={:?} q={}: {} vs {}", terms, q, p, expected);
        }
    }
}

#[test]
fn mixed_signs_with_normal_term_are_ordered() {
    let engine = weighted(&[(7.0, 1.0, 6.0), (-3.0, 1.0, 2.0)], 2.0, 1e-6);
    let lo = engine.cdf(-40.0).unwrap();
    let mid = engine.cdf(40.0).unwrap();
    let hi = engine.cdf(140.0).unwrap();
    assert!(lo < 0.01 && lo >= 0.0);
    assert!(mid > 0.5 && mid < 0.65);
    assert!(hi > 0.98 && hi <= 1.0);
}

#[test]
fn accuracy_sensitivity_is_bounded() {
    for (terms, q) in [
        (vec![(1.0, 10.0, 0.0)], 12.0),
        (vec![(6.0, 2.0, 0.0), (3.0, 2.0, 0.0), (1.0, 2.0, 0.0)], 20.0),
    ] {
        let coarse = weighted(&terms, 0.0, 1e-6).cdf(q).unwrap();
        let fine = weighted(&terms, 0.0, 1e-10).cdf(q).unwrap();
        assert!((coarse - fine).abs() <= 1e-4, "{} vs {}", coarse, fine);
    }
}

#[test]
fn calls_do_not_leak_state() {
    let engine = weighted(&[(6.0, 1.0, 0.0), (3.0, 1.0, 0.0), (1.0, 1.0, 0.0)], 0.0, 1e-6);
    let forward: Vec<f64> = [1.0, 7.0, 20.0].iter().map(|&q| engine.cdf(q).unwrap()).collect();
    let backward: Vec<f64> = [20.0, 7.0, 1.0].iter().map(|&q| engine.cdf(q).unwrap()).collect();
    assert_eq!(forward, backward.into_iter().rev().collect::<Vec<_>>());
    assert_eq!(engine.accuracy(), 1e-6);
}

#[test]
fn exhausted_budget_is_reported_not_hidden() {
    let engine = weighted(&[(1.0, 5.0, 0.0)], 0.0, 1e-6).with_max_steps(10);
    match engine.cdf(3.0) {
        Err(Error::Computation(msg)) => assert!(msg.contains("10"), "message: {}", msg),
        other => panic!("expected a computation error, got {:?}", other),
    }
}

#[test]
fn zero_variance_distribution_is_rejected() {
    let err = WeightedChiSquare::new(vec![ChiSquareTerm::new(0.0, 0.0, 0.0)], 0.0, 1e-6).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
