//! Property tests for the weighted chi-square CDF.

use proptest::prelude::*;
use qf_core::ChiSquareTerm;
use qf_prob::WeightedChiSquare;

const ACCURACY: f64 = 1e-6;

fn engine() -> WeightedChiSquare {
    WeightedChiSquare::from_terms(
        vec![
            ChiSquareTerm::central(6.0, 2.0),
            ChiSquareTerm::central(3.0, 2.0),
            ChiSquareTerm::central(1.0, 2.0),
        ],
        ACCURACY,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn cdf_is_monotone(x in 0.0f64..100.0, dx in 0.5f64..20.0) {
        let d = engine();
        let lo = d.cdf(x).unwrap();
        let hi = d.cdf(x + dx).unwrap();
        prop_assert!(lo <= hi + 2.0 * ACCURACY, "cdf({}) = {} > cdf({}) = {}", x, lo, x + dx, hi);
    }

    #[test]
    fn cdf_stays_in_unit_interval(x in -20.0f64..300.0) {
        let p = engine().cdf(x).unwrap();
        prop_assert!((-ACCURACY..=1.0 + ACCURACY).contains(&p), "cdf({}) = {}", x, p);
    }

    #[test]
    fn repeated_calls_agree(x in 0.0f64..80.0, y in 0.0f64..80.0) {
        let d = engine();
        let first = d.cdf(x).unwrap();
        let _ = d.cdf(y).unwrap();
        prop_assert_eq!(first, d.cdf(x).unwrap());
    }
}
