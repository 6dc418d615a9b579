//! Small numerically-stable math utilities used by the characteristic-function code.

/// Below this exponent [`exp_floored`] returns exactly zero.
const EXP_FLOOR: f64 = -50.0;

/// Switch-over point between `ln_1p` and the series expansion.
const SERIES_THRESHOLD: f64 = 0.1;

/// `exp(x)` with an underflow floor: returns `0` for `x < -50`.
///
/// The quadrature and the error bounds treat anything below `e^-50` as
/// negligible; flushing it to zero keeps the sums free of denormals.
#[inline]
pub fn exp_floored(x: f64) -> f64 {
    if x < EXP_FLOOR { 0.0 } else { x.exp() }
}

/// `ln(1 + x)`.
///
/// For `|x| <= 0.1` this uses the series
/// `ln(1+x) = 2·Σ y^(2k+1)/(2k+1)`, `y = x/(2+x)`, summed until it stops changing.
#[inline]
pub fn ln_1p(x: f64) -> f64 {
    if x.abs() > SERIES_THRESHOLD { x.ln_1p() } else { ln_1p_series(x, false) }
}

/// `ln(1 + x) - x`, accurate near zero where the subtraction would cancel.
#[inline]
pub fn ln_1p_minus_x(x: f64) -> f64 {
    if x.abs() > SERIES_THRESHOLD { x.ln_1p() - x } else { ln_1p_series(x, true) }
}

fn ln_1p_series(x: f64, minus_x: bool) -> f64 {
    let mut y = x / (2.0 + x);
    let mut term = 2.0 * y * y * y;
    let mut ak = 3.0;
    let mut s = if minus_x { -x } else { 2.0 };
    s *= y;
    y *= y;
    let mut s1 = s + term / ak;
    while s1 != s {
        ak += 2.0;
        term *= y;
        s = s1;
        s1 = s + term / ak;
    }
    s
}
