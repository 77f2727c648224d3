use std::cmp;

use super::HitResultPriority;

/// Aggregation for a score's current state.
///
/// Both rulesets judge objects as 300, 100, 50 or miss.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreState {
    /// Maximum combo that the score has had so far. **Not** the maximum
    /// possible combo of the map so far.
    pub max_combo: u32,
    /// Amount of current 300s.
    pub n300: u32,
    /// Amount of current 100s.
    pub n100: u32,
    /// Amount of current 50s.
    pub n50: u32,
    /// Amount of current misses.
    pub misses: u32,
}

impl ScoreState {
    /// Create a new empty score state.
    pub const fn new() -> Self {
        Self {
            max_combo: 0,
            n300: 0,
            n100: 0,
            n50: 0,
            misses: 0,
        }
    }

    /// Return the total amount of hits by adding everything up.
    pub const fn total_hits(&self) -> u32 {
        self.n300 + self.n100 + self.n50 + self.misses
    }

    /// Calculate the accuracy between `0.0` and `1.0` for this state.
    pub fn accuracy(&self) -> f64 {
        accuracy(self.n300, self.n100, self.n50, self.misses)
    }
}

/// User-provided score input, before missing hitresults are filled in.
pub(crate) struct ScoreInput {
    pub n_objects: u32,
    pub max_combo: u32,
    pub acc: Option<f64>,
    pub combo: Option<u32>,
    pub n300: Option<u32>,
    pub n100: Option<u32>,
    pub n50: Option<u32>,
    pub misses: Option<u32>,
    pub priority: HitResultPriority,
}

impl ScoreInput {
    /// Fill in whatever hitresults were not specified so that they add up
    /// to the object count and, if given, match the accuracy.
    #[allow(clippy::too_many_lines)]
    pub fn generate_state(&self) -> ScoreState {
        let n_objects = self.n_objects;
        let priority = self.priority;

        let misses = self.misses.map_or(0, |n| cmp::min(n, n_objects));
        let n_remaining = n_objects - misses;

        let mut n300 = self.n300.map_or(0, |n| cmp::min(n, n_remaining));
        let mut n100 = self.n100.map_or(0, |n| cmp::min(n, n_remaining));
        let mut n50 = self.n50.map_or(0, |n| cmp::min(n, n_remaining));

        if let Some(acc) = self.acc {
            let target_total = acc * f64::from(6 * n_objects);

            match (self.n300, self.n100, self.n50) {
                (Some(_), Some(_), Some(_)) => {
                    let remaining = n_objects.saturating_sub(n300 + n100 + n50 + misses);

                    match priority {
                        HitResultPriority::BestCase => n300 += remaining,
                        HitResultPriority::WorstCase => n50 += remaining,
                    }
                }
                (Some(_), Some(_), None) => n50 = n_objects.saturating_sub(n300 + n100 + misses),
                (Some(_), None, Some(_)) => n100 = n_objects.saturating_sub(n300 + n50 + misses),
                (None, Some(_), Some(_)) => n300 = n_objects.saturating_sub(n100 + n50 + misses),
                (Some(_), None, None) => {
                    let mut best_dist = f64::MAX;
                    let n_remaining = n_remaining - n300;

                    let raw_n100 = target_total - f64::from(n_remaining + 6 * n300);
                    let min_n100 = cmp::min(n_remaining, raw_n100.floor().max(0.0) as u32);
                    let max_n100 = cmp::min(n_remaining, raw_n100.ceil().max(0.0) as u32);

                    for new100 in min_n100..=max_n100 {
                        let new50 = n_remaining - new100;
                        let dist = (acc - accuracy(n300, new100, new50, misses)).abs();

                        if dist < best_dist {
                            best_dist = dist;
                            n100 = new100;
                            n50 = new50;
                        }
                    }
                }
                (None, Some(_), None) => {
                    let mut best_dist = f64::MAX;
                    let n_remaining = n_remaining - n100;

                    let raw_n300 = (target_total - f64::from(n_remaining + 2 * n100)) / 5.0;
                    let min_n300 = cmp::min(n_remaining, raw_n300.floor().max(0.0) as u32);
                    let max_n300 = cmp::min(n_remaining, raw_n300.ceil().max(0.0) as u32);

                    for new300 in min_n300..=max_n300 {
                        let new50 = n_remaining - new300;
                        let dist = (acc - accuracy(new300, n100, new50, misses)).abs();

                        if dist < best_dist {
                            best_dist = dist;
                            n300 = new300;
                            n50 = new50;
                        }
                    }
                }
                (None, None, Some(_)) => {
                    let mut best_dist = f64::MAX;
                    let n_remaining = n_remaining - n50;

                    let raw_n300 = (target_total + f64::from(2 * misses + n50)
                        - f64::from(2 * n_objects))
                        / 4.0;

                    let min_n300 = cmp::min(n_remaining, raw_n300.floor().max(0.0) as u32);
                    let max_n300 = cmp::min(n_remaining, raw_n300.ceil().max(0.0) as u32);

                    for new300 in min_n300..=max_n300 {
                        let new100 = n_remaining - new300;
                        let dist = (acc - accuracy(new300, new100, n50, misses)).abs();

                        if dist < best_dist {
                            best_dist = dist;
                            n300 = new300;
                            n100 = new100;
                        }
                    }
                }
                (None, None, None) => match priority {
                    HitResultPriority::BestCase => {
                        (n300, n100, n50) = fill_100s_first(acc, n_remaining, misses);
                    }
                    HitResultPriority::WorstCase => {
                        let mut best_dist = f64::MAX;

                        let raw_n300 = (target_total - f64::from(n_remaining)) / 5.0;
                        let min_n300 = cmp::min(n_remaining, raw_n300.floor().max(0.0) as u32);
                        let max_n300 = cmp::min(n_remaining, raw_n300.ceil().max(0.0) as u32);

                        for new300 in min_n300..=max_n300 {
                            let raw_n100 = target_total - f64::from(n_remaining + 5 * new300);
                            let min_n100 =
                                cmp::min(raw_n100.floor().max(0.0) as u32, n_remaining - new300);
                            let max_n100 =
                                cmp::min(raw_n100.ceil().max(0.0) as u32, n_remaining - new300);

                            for new100 in min_n100..=max_n100 {
                                let new50 = n_remaining - new300 - new100;
                                let dist = (acc - accuracy(new300, new100, new50, misses)).abs();

                                if dist < best_dist {
                                    best_dist = dist;
                                    n300 = new300;
                                    n100 = new100;
                                    n50 = new50;
                                }
                            }
                        }

                        // Shift n100 to n50 by gaining n300
                        let n = n100 / 5;
                        n300 += n;
                        n100 -= 5 * n;
                        n50 += 4 * n;
                    }
                },
            }
        } else {
            let remaining = n_objects.saturating_sub(n300 + n100 + n50 + misses);

            match priority {
                HitResultPriority::BestCase => match (self.n300, self.n100, self.n50) {
                    (None, ..) => n300 = remaining,
                    (_, None, _) => n100 = remaining,
                    (.., None) => n50 = remaining,
                    _ => n300 += remaining,
                },
                HitResultPriority::WorstCase => match (self.n50, self.n100, self.n300) {
                    (None, ..) => n50 = remaining,
                    (_, None, _) => n100 = remaining,
                    (.., None) => n300 = remaining,
                    _ => n50 += remaining,
                },
            }
        }

        let max_possible_combo = self.max_combo.saturating_sub(misses);

        let max_combo = self
            .combo
            .map_or(max_possible_combo, |combo| cmp::min(combo, max_possible_combo));

        ScoreState {
            max_combo,
            n300,
            n100,
            n50,
            misses,
        }
    }
}

/// Closest distribution to `acc` that only turns to 50s once 100s alone
/// can no longer go low enough, so lower accuracy never trades 100s for
/// fewer but worse 50s.
fn fill_100s_first(acc: f64, n_remaining: u32, misses: u32) -> (u32, u32, u32) {
    let target_total = acc * f64::from(6 * (n_remaining + misses));

    // 300s and 100s only: 6·n300 + 2·n100 with n300 + n100 = n_remaining
    let raw_n300 = (target_total - f64::from(2 * n_remaining)) / 4.0;

    if raw_n300 >= 0.0 {
        let n300 = cmp::min(n_remaining, raw_n300.round() as u32);

        return (n300, n_remaining - n300, 0);
    }

    // 100s and 50s only: 2·n100 + n50 with n100 + n50 = n_remaining
    let raw_n100 = (target_total - f64::from(n_remaining)).round().max(0.0) as u32;
    let n100 = cmp::min(n_remaining, raw_n100);

    (0, n100, n_remaining - n100)
}

fn accuracy(n300: u32, n100: u32, n50: u32, misses: u32) -> f64 {
    if n300 + n100 + n50 + misses == 0 {
        return 0.0;
    }

    let numerator = 6 * n300 + 2 * n100 + n50;
    let denominator = 6 * (n300 + n100 + n50 + misses);

    f64::from(numerator) / f64::from(denominator)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn input(n_objects: u32) -> ScoreInput {
        ScoreInput {
            n_objects,
            max_combo: n_objects,
            acc: None,
            combo: None,
            n300: None,
            n100: None,
            n50: None,
            misses: None,
            priority: HitResultPriority::BestCase,
        }
    }

    #[test]
    fn fills_remaining_with_300s() {
        let state = ScoreInput {
            n100: Some(20),
            misses: Some(2),
            combo: Some(500),
            ..input(601)
        }
        .generate_state();

        assert_eq!(state.n300, 579);
        assert_eq!(state.n100, 20);
        assert_eq!(state.n50, 0);
        assert_eq!(state.max_combo, 500);
        assert_eq!(state.total_hits(), 601);
    }

    #[test]
    fn worst_case_fills_50s() {
        let state = ScoreInput {
            n300: Some(300),
            n100: Some(50),
            misses: Some(2),
            priority: HitResultPriority::WorstCase,
            ..input(601)
        }
        .generate_state();

        assert_eq!(state.n50, 249);
    }

    #[test]
    fn combo_capped_by_misses() {
        let state = ScoreInput {
            misses: Some(3),
            ..input(100)
        }
        .generate_state();

        assert_eq!(state.max_combo, 97);
    }

    #[test]
    fn empty_state_has_zero_accuracy() {
        assert!(ScoreState::new().accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn best_case_prefers_100s_over_50s() {
        let state = ScoreInput {
            acc: Some(0.98),
            ..input(145)
        }
        .generate_state();

        assert_eq!(state.n50, 0);
        assert_eq!(state.n300 + state.n100, 145);
    }

    #[test]
    fn best_case_uses_50s_below_100s_only() {
        let state = ScoreInput {
            acc: Some(0.25),
            ..input(100)
        }
        .generate_state();

        assert_eq!(state.n300, 0);
        assert!(state.n50 > 0);
        assert!((state.accuracy() - 0.25).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn lower_accuracy_never_improves_hits(acc in 0.0..=1.0_f64, step in 0.0..0.05_f64, n_objects in 1..2000_u32) {
            let generate = |acc: f64| {
                ScoreInput {
                    acc: Some(acc),
                    ..input(n_objects)
                }
                .generate_state()
            };

            let higher = generate(acc);
            let lower = generate((acc - step).max(0.0));

            prop_assert!(lower.n300 <= higher.n300);
            prop_assert!(lower.n50 >= higher.n50);
        }

        #[test]
        fn accuracy_is_matched(acc in 0.0..=1.0_f64, n_objects in 1..2000_u32, misses in 0..50_u32) {
            let state = ScoreInput {
                acc: Some(acc),
                misses: Some(misses),
                ..input(n_objects)
            }
            .generate_state();

            prop_assert_eq!(state.total_hits(), n_objects);

            // Accuracy steps are 1 / (6 * n_objects) apart
            let max_acc = accuracy(n_objects - state.misses, 0, 0, state.misses);
            let min_acc = accuracy(0, 0, n_objects - state.misses, state.misses);

            if (min_acc..=max_acc).contains(&acc) {
                prop_assert!((state.accuracy() - acc).abs() <= 1.0 / f64::from(n_objects));
            }
        }
    }
}
