use std::f64::consts::PI;

use crate::util::float_ext::FloatExt;

pub const fn bpm_to_milliseconds(bpm: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / i32_unwrap_or(delimiter, 4) as f64 / bpm
}

pub const fn milliseconds_to_bpm(ms: f64, delimiter: Option<i32>) -> f64 {
    60_000.0 / (ms * i32_unwrap_or(delimiter, 4) as f64)
}

// `Option::unwrap_or` is not const
const fn i32_unwrap_or(option: Option<i32>, default: i32) -> i32 {
    match option {
        Some(value) => value,
        None => default,
    }
}

pub fn logistic(x: f64, midpoint_offset: f64, multiplier: f64, max_value: Option<f64>) -> f64 {
    max_value.unwrap_or(1.0) / (1.0 + f64::exp(multiplier * (midpoint_offset - x)))
}

pub fn norm<const N: usize>(p: f64, values: [f64; N]) -> f64 {
    values
        .into_iter()
        .map(|x| f64::powf(x, p))
        .sum::<f64>()
        .powf(p.recip())
}

pub fn smoothstep_bell_curve(x: f64, mean: f64, width: f64) -> f64 {
    let mut new_x = x - mean;

    new_x = if new_x > 0.0 {
        width - new_x
    } else {
        width + new_x
    };

    smoothstep(new_x, 0.0, width)
}

pub const fn smoothstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * (3.0 - 2.0 * x)
}

pub const fn smootherstep(x: f64, start: f64, end: f64) -> f64 {
    let x = reverse_lerp(x, start, end);

    x * x * x * (x * (6.0 * x - 15.0) + 10.0)
}

/// `start + (end - start) * amount`.
///
/// The amount is not clamped, so `lerp(2.0, 5.0, 2.0)` extrapolates to `8.0`.
pub const fn lerp(start: f64, end: f64, amount: f64) -> f64 {
    start + (end - start) * amount
}

/// Inverse of [`lerp`], clamped to `[0, 1]`.
///
/// If `start == end` the interval is empty and the result is a step:
/// `1.0` if `x >= start`, otherwise `0.0`.
#[allow(clippy::float_cmp)]
pub const fn reverse_lerp(x: f64, start: f64, end: f64) -> f64 {
    if start == end {
        return if x >= start { 1.0 } else { 0.0 };
    }

    f64::clamp((x - start) / (end - start), 0.0, 1.0)
}

pub fn erf(x: f64) -> f64 {
    #![allow(clippy::unreadable_literal)]

    if FloatExt::eq(x, 0.0) {
        return 0.0;
    }

    if x.is_infinite() {
        return if x.is_sign_positive() { 1.0 } else { -1.0 };
    }

    if x.is_nan() {
        return f64::NAN;
    }

    // Abramowitz and Stegun formula 7.1.26
    let t = 1.0 / (1.0 + 0.3275911 * f64::abs(x));

    let tau = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));

    let erf = 1.0 - tau * f64::exp(-x * x);

    if x >= 0.0 {
        erf
    } else {
        -erf
    }
}

pub fn erf_inv(mut x: f64) -> f64 {
    const A: f64 = 0.147;

    if x <= -1.0 {
        return f64::NEG_INFINITY;
    }

    if x >= 1.0 {
        return f64::INFINITY;
    }

    if FloatExt::eq(x, 0.0) {
        return 0.0;
    }

    let sgn = f64::signum(x);
    x = f64::abs(x);

    let ln = f64::ln(1.0 - x * x);
    let t1 = 2.0 / (PI * A) + ln / 2.0;
    let t2 = ln / A;
    let base_approx = f64::sqrt(t1 * t1 - t2) - t1;

    // Reduces the max error from -0.005 to -0.00045
    let c = if x >= 0.85 {
        f64::powf((x - 0.85) / 0.293, 8.0)
    } else {
        0.0
    };

    sgn * (f64::sqrt(base_approx) + c)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lerp_extrapolates() {
        assert!(FloatExt::eq(lerp(4.0, 5.0, 2.0), 6.0));
        assert!(FloatExt::eq(lerp(2.0, 5.0, 2.0), 8.0));
        assert!(FloatExt::eq(lerp(-1.0, 7.0, 2.0), 15.0));
    }

    #[test]
    fn reverse_lerp_empty_interval_is_step() {
        assert!(FloatExt::eq(reverse_lerp(3.0, 3.0, 3.0), 1.0));
        assert!(FloatExt::eq(reverse_lerp(4.0, 3.0, 3.0), 1.0));
        assert!(FloatExt::eq(reverse_lerp(2.0, 3.0, 3.0), 0.0));
    }

    #[test]
    fn reverse_lerp_descending_interval() {
        assert!(FloatExt::eq(reverse_lerp(11.5, 11.5, 9.0), 0.0));
        assert!(FloatExt::eq(reverse_lerp(9.0, 11.5, 9.0), 1.0));
        assert!((reverse_lerp(10.25, 11.5, 9.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn erf_inv_inverts_erf() {
        for x in [0.1, 0.5, 1.0, 1.7] {
            let y = erf_inv(erf(x));
            assert!((y - x).abs() < 1e-2, "x={x} y={y}");
        }

        assert!(erf_inv(1.0).is_infinite());
        assert!(FloatExt::eq(erf(0.0), 0.0));
    }

    proptest! {
        #[test]
        fn reverse_lerp_inverts_lerp(start in -100.0..100.0_f64, len in 0.5..100.0_f64, t in 0.0..1.0_f64) {
            let end = start + len;
            let value = lerp(start, end, t);

            prop_assert!((reverse_lerp(value, start, end) - t).abs() < 1e-9);
        }

        #[test]
        fn smoothstep_stays_in_unit_interval(x in -1000.0..1000.0_f64) {
            let y = smoothstep(x, -10.0, 10.0);

            prop_assert!((0.0..=1.0).contains(&y));
        }
    }
}
