use crate::util::float_ext::FloatExt;

/// Error when searching for the root of a function.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum RootFindingError {
    #[error("no sign change in [{lower}, {upper}] after {expansions} expansions")]
    ExpansionExhausted {
        lower: f64,
        upper: f64,
        expansions: usize,
    },
}

/// Settings for [`RootFinder::find_root_expand`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RootFinder {
    /// Factor by which the upper bound grows per expansion.
    pub expansion_factor: f64,
    /// How often the upper bound may grow before giving up.
    pub max_expansions: usize,
    /// Iterations of the bracketed search per interval.
    pub max_iterations: usize,
    /// Target width of the final bracket.
    pub accuracy: f64,
}

impl Default for RootFinder {
    fn default() -> Self {
        Self {
            expansion_factor: 2.0,
            max_expansions: 32,
            max_iterations: 25,
            accuracy: 1e-6,
        }
    }
}

/// Shorthand for [`RootFinder::find_root_expand`] with default settings.
pub fn find_root_expand<F>(f: F, lower: f64, upper: f64) -> Result<f64, RootFindingError>
where
    F: FnMut(f64) -> f64,
{
    RootFinder::default().find_root_expand(f, lower, upper)
}

impl RootFinder {
    /// Find a root of `f` that lies above `lower`.
    ///
    /// As long as `f(lower)` and `f(upper)` share a sign, `upper` is
    /// multiplied by the expansion factor. Once a sign change is bracketed,
    /// inverse quadratic interpolation narrows it down, stepping back to
    /// bisection whenever the interpolated point leaves the bracket.
    ///
    /// Running out of iterations is not an error; the midpoint of the last
    /// bracket is returned.
    pub fn find_root_expand<F>(
        &self,
        mut f: F,
        lower: f64,
        mut upper: f64,
    ) -> Result<f64, RootFindingError>
    where
        F: FnMut(f64) -> f64,
    {
        let f_lower = f(lower);

        for expansion in 0..=self.max_expansions {
            if expansion > 0 {
                upper *= self.expansion_factor;
            }

            let f_upper = f(upper);

            if brackets(f_lower, f_upper) {
                return Ok(self.find_root(&mut f, lower, upper, f_lower, f_upper));
            }
        }

        // `upper` is the last bound that was evaluated

        Err(RootFindingError::ExpansionExhausted {
            lower,
            upper,
            expansions: self.max_expansions,
        })
    }

    fn find_root<F>(&self, f: &mut F, lower: f64, upper: f64, f_lower: f64, f_upper: f64) -> f64
    where
        F: FnMut(f64) -> f64,
    {
        if FloatExt::eq(f_lower, 0.0) {
            return lower;
        }

        if FloatExt::eq(f_upper, 0.0) {
            return upper;
        }

        // `b` is the best estimate, `c` the opposite end of the bracket,
        // `a` the previous value of `b`.
        let (mut a, mut b, mut c) = (lower, upper, upper);
        let (mut fa, mut fb, mut fc) = (f_lower, f_upper, f_upper);
        let mut step = b - a;
        let mut prev_step = step;

        for _ in 0..self.max_iterations {
            if !brackets(fb, fc) {
                c = a;
                fc = fa;
                step = b - a;
                prev_step = step;
            }

            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tolerance = 2.0 * f64::EPSILON * b.abs() + 0.5 * self.accuracy;
            let half_width = 0.5 * (c - b);

            if half_width.abs() <= tolerance || FloatExt::eq(fb, 0.0) {
                return b;
            }

            if prev_step.abs() >= tolerance && fa.abs() > fb.abs() {
                let s = fb / fa;

                let (mut p, mut q) = if FloatExt::eq(a, c) {
                    // Secant
                    (2.0 * half_width * s, 1.0 - s)
                } else {
                    // Inverse quadratic interpolation
                    let q = fa / fc;
                    let r = fb / fc;

                    (
                        s * (2.0 * half_width * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };

                if p > 0.0 {
                    q = -q;
                }

                p = p.abs();

                let max_interpolated = f64::min(
                    3.0 * half_width * q - (tolerance * q).abs(),
                    (prev_step * q).abs(),
                );

                if 2.0 * p < max_interpolated {
                    prev_step = step;
                    step = p / q;
                } else {
                    step = half_width;
                    prev_step = step;
                }
            } else {
                step = half_width;
                prev_step = step;
            }

            a = b;
            fa = fb;

            if step.abs() > tolerance {
                b += step;
            } else {
                b += tolerance.copysign(half_width);
            }

            fb = f(b);
        }

        let midpoint = 0.5 * (b + c);

        log::warn!(
            "Root finding ran out of iterations; returning bracket midpoint {midpoint} (width {})",
            (c - b).abs()
        );

        midpoint
    }
}

fn brackets(a: f64, b: f64) -> bool {
    (a <= 0.0 && b >= 0.0) || (a >= 0.0 && b <= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_two() {
        let root = find_root_expand(|x| x * x - 2.0, 0.0, 1.0).unwrap();

        assert!((root - std::f64::consts::SQRT_2).abs() < 1e-6, "{root}");
    }

    #[test]
    fn root_inside_initial_bracket() {
        let root = find_root_expand(|x| x.powi(3) - 0.125, 0.0, 1.0).unwrap();

        assert!((root - 0.5).abs() < 1e-6, "{root}");
    }

    #[test]
    fn decreasing_function() {
        let root = find_root_expand(|x| 10.0 - x, 0.0, 1.0).unwrap();

        assert!((root - 10.0).abs() < 1e-6, "{root}");
    }

    #[test]
    fn no_root_exhausts_expansions() {
        let err = find_root_expand(|x| x * x + 1.0, 0.0, 1.0).unwrap_err();

        assert!(matches!(
            err,
            RootFindingError::ExpansionExhausted { expansions: 32, .. }
        ));
    }

    #[test]
    fn exhaustion_reports_last_evaluated_bound() {
        let finder = RootFinder {
            max_expansions: 3,
            ..Default::default()
        };

        let mut evaluated = Vec::new();

        let err = finder
            .find_root_expand(
                |x| {
                    evaluated.push(x);

                    x * x + 1.0
                },
                0.0,
                1.0,
            )
            .unwrap_err();

        let RootFindingError::ExpansionExhausted { upper, .. } = err;

        assert!((upper - 8.0).abs() < f64::EPSILON);
        assert_eq!(evaluated.last().copied(), Some(upper));
    }

    #[test]
    fn custom_expansion_budget() {
        let finder = RootFinder {
            max_expansions: 2,
            ..Default::default()
        };

        // Root at 100 needs more than two doublings of 1
        assert!(finder.find_root_expand(|x| x - 100.0, 0.0, 1.0).is_err());
        assert!(finder.find_root_expand(|x| x - 3.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn iteration_exhaustion_returns_estimate() {
        let finder = RootFinder {
            max_iterations: 1,
            ..Default::default()
        };

        let root = finder.find_root_expand(|x| x - 0.3, 0.0, 1.0).unwrap();

        assert!((0.0..=1.0).contains(&root));
    }
}
