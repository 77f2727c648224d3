use std::f64::consts::{PI, SQRT_2};

use crate::{
    any::{difficulty::skills::difficulty_to_performance, ScoreState},
    model::{beatmap::HitWindows, mods::GameMods},
    osu::{
        attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
        difficulty::{rating::length_bonus, skills::Flashlight},
    },
    util::{
        difficulty::{erf, erf_inv, norm, reverse_lerp},
        float_ext::FloatExt,
    },
};

/// Keeps the final pp value around its historical scale.
pub const PERFORMANCE_BASE_MULTIPLIER: f64 = 1.15;

pub(super) struct OsuPerformanceCalculator<'mods> {
    attrs: OsuDifficultyAttributes,
    mods: &'mods GameMods,
    acc: f64,
    state: ScoreState,
    effective_miss_count: f64,
}

impl<'a> OsuPerformanceCalculator<'a> {
    pub const fn new(
        attrs: OsuDifficultyAttributes,
        mods: &'a GameMods,
        acc: f64,
        state: ScoreState,
        effective_miss_count: f64,
    ) -> Self {
        Self {
            attrs,
            mods,
            acc,
            state,
            effective_miss_count,
        }
    }
}

impl OsuPerformanceCalculator<'_> {
    pub fn calculate(mut self) -> OsuPerformanceAttributes {
        let total_hits = self.state.total_hits();

        if total_hits == 0 {
            return OsuPerformanceAttributes {
                difficulty: self.attrs,
                ..Default::default()
            };
        }

        let total_hits = f64::from(total_hits);

        let mut multiplier = PERFORMANCE_BASE_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.mods.so() {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / total_hits).powf(0.85);
        }

        if self.mods.rx() {
            let od = self.attrs.od;

            // The great window closes at OD 13.33
            let (n100_mult, n50_mult) = if od > 0.0 {
                (
                    (1.0 - (od / 13.33).powf(1.8)).max(0.0),
                    (1.0 - (od / 13.33).powf(5.0)).max(0.0),
                )
            } else {
                (1.0, 1.0)
            };

            self.effective_miss_count = (self.effective_miss_count
                + f64::from(self.state.n100) * n100_mult
                + f64::from(self.state.n50) * n50_mult)
                .min(total_hits);
        }

        let speed_deviation = self.calculate_speed_deviation();

        let aim_value = self.compute_aim_value();
        let speed_value = self.compute_speed_value(speed_deviation);
        let acc_value = self.compute_accuracy_value();
        let flashlight_value = self.compute_flashlight_value();

        let pp = norm(1.1, [aim_value, speed_value, acc_value, flashlight_value]) * multiplier;

        log::debug!(
            "osu! performance: aim={aim_value} speed={speed_value} acc={acc_value} flashlight={flashlight_value} pp={pp}"
        );

        OsuPerformanceAttributes {
            difficulty: self.attrs,
            pp,
            pp_acc: acc_value,
            pp_aim: aim_value,
            pp_flashlight: flashlight_value,
            pp_speed: speed_value,
            effective_miss_count: self.effective_miss_count,
            speed_deviation,
        }
    }

    fn compute_aim_value(&self) -> f64 {
        if self.mods.ap() {
            return 0.0;
        }

        let mut aim_difficulty = self.attrs.aim;

        if self.attrs.n_sliders > 0 && self.attrs.aim_difficult_slider_count > 0.0 {
            // Missing combo is assumed to come from dropped difficult sliders
            let dropped_sliders = f64::min(
                total_imperfect_hits(&self.state),
                f64::from(self.attrs.max_combo.saturating_sub(self.state.max_combo)),
            )
            .clamp(0.0, self.attrs.aim_difficult_slider_count);

            let slider_nerf_factor = (1.0 - self.attrs.slider_factor)
                * (1.0 - dropped_sliders / self.attrs.aim_difficult_slider_count).powf(3.0)
                + self.attrs.slider_factor;

            aim_difficulty *= slider_nerf_factor;
        }

        let mut aim_value = difficulty_to_performance(aim_difficulty);
        aim_value *= length_bonus(self.state.total_hits());

        if self.effective_miss_count > 0.0 {
            aim_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.aim_difficult_strain_count,
            );
        }

        aim_value * self.acc
    }

    fn compute_speed_value(&self, speed_deviation: Option<f64>) -> f64 {
        let Some(speed_deviation) = speed_deviation.filter(|_| !self.mods.rx()) else {
            return 0.0;
        };

        let mut speed_value = difficulty_to_performance(self.attrs.speed);
        speed_value *= length_bonus(self.state.total_hits());

        if self.effective_miss_count > 0.0 {
            speed_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.speed_difficult_strain_count,
            );
        }

        speed_value *= self.calculate_speed_high_deviation_nerf(speed_deviation);

        // Worst case: every non-300 landed on a speed note
        let total_hits = f64::from(self.state.total_hits());
        let relevant_total_diff = (total_hits - self.attrs.speed_note_count).max(0.0);
        let relevant_n300 = (f64::from(self.state.n300) - relevant_total_diff).max(0.0);
        let relevant_n100 = (f64::from(self.state.n100)
            - (relevant_total_diff - f64::from(self.state.n300)).max(0.0))
        .max(0.0);
        let relevant_n50 = (f64::from(self.state.n50)
            - (relevant_total_diff - f64::from(self.state.n300 + self.state.n100)).max(0.0))
        .max(0.0);

        let relevant_acc = if self.attrs.speed_note_count.eq(0.0) {
            0.0
        } else {
            (relevant_n300 * 6.0 + relevant_n100 * 2.0 + relevant_n50)
                / (self.attrs.speed_note_count * 6.0)
        };

        speed_value * ((self.acc + relevant_acc) / 2.0).powf((14.5 - self.attrs.od) / 2.0)
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        // Slider heads do not award accuracy in stable scores
        let n_acc_objects = self.attrs.n_circles;

        if n_acc_objects == 0 {
            return 0.0;
        }

        let n300 = self.state.n300 as i32;
        let non_acc_hits = (self.state.total_hits() as i32 - n_acc_objects as i32).max(0);

        // Can become negative, capped at zero
        let better_acc_percentage = (f64::from(
            (n300 - non_acc_hits) * 6 + self.state.n100 as i32 * 2 + self.state.n50 as i32,
        ) / f64::from(n_acc_objects * 6))
        .max(0.0);

        let mut acc_value =
            1.52163_f64.powf(self.attrs.od) * better_acc_percentage.powf(24.0) * 2.83;

        // Keeping accuracy up is harder the more circles there are
        acc_value *= (f64::from(n_acc_objects) / 1000.0).powf(0.3).min(1.15);

        if self.mods.hd() || self.mods.tc() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn compute_flashlight_value(&self) -> f64 {
        if !self.mods.fl() {
            return 0.0;
        }

        let mut flashlight_value = Flashlight::difficulty_to_performance(self.attrs.flashlight);

        let total_hits = f64::from(self.state.total_hits());

        if self.effective_miss_count > 0.0 {
            flashlight_value *= 0.97
                * (1.0 - (self.effective_miss_count / total_hits).powf(0.775))
                    .powf(self.effective_miss_count.powf(0.875));
        }

        flashlight_value *= self.combo_scaling_factor();

        flashlight_value * (0.5 + self.acc / 2.0)
    }

    fn calculate_speed_deviation(&self) -> Option<f64> {
        if total_successful_hits(&self.state) == 0 {
            return None;
        }

        let mut speed_note_count = self.attrs.speed_note_count;
        speed_note_count +=
            (f64::from(self.state.total_hits()) - self.attrs.speed_note_count) * 0.1;

        // Worst case: all mistakes were on speed notes
        let relevant_misses = f64::min(f64::from(self.state.misses), speed_note_count);
        let relevant_n50 = f64::min(f64::from(self.state.n50), speed_note_count - relevant_misses);
        let relevant_n100 = f64::min(
            f64::from(self.state.n100),
            speed_note_count - relevant_misses - relevant_n50,
        );
        let relevant_n300 =
            (speed_note_count - relevant_misses - relevant_n50 - relevant_n100).max(0.0);

        calculate_deviation(
            &self.attrs,
            relevant_n300,
            relevant_n100,
            relevant_n50,
            relevant_misses,
        )
    }

    /// Speed pp above a deviation dependent cutoff is assumed to come from
    /// improper tapping and only grows logarithmically.
    fn calculate_speed_high_deviation_nerf(&self, speed_deviation: f64) -> f64 {
        const SCALE: f64 = 50.0;

        let speed_value = difficulty_to_performance(self.attrs.speed);

        let excess_speed_difficulty_cutoff = 100.0 + 220.0 * (22.0 / speed_deviation).powf(6.5);

        if speed_value <= excess_speed_difficulty_cutoff {
            return 1.0;
        }

        let adjusted_speed_value = SCALE
            * (((speed_value - excess_speed_difficulty_cutoff) / SCALE + 1.0).ln()
                + excess_speed_difficulty_cutoff / SCALE);

        // Up to 220 UR counts as tapped correctly
        let lerp = 1.0 - reverse_lerp(speed_deviation, 22.0, 27.0);
        let adjusted_speed_value = f64::lerp(adjusted_speed_value, speed_value, lerp);

        adjusted_speed_value / speed_value
    }

    fn combo_scaling_factor(&self) -> f64 {
        if self.attrs.max_combo == 0 {
            1.0
        } else {
            (f64::from(self.state.max_combo).powf(0.8) / f64::from(self.attrs.max_combo).powf(0.8))
                .min(1.0)
        }
    }
}

/// Estimated hit error deviation, assuming 300s and 100s are normally
/// distributed and 50s uniformly.
///
/// Returns `None` if nothing was hit.
fn calculate_deviation(
    attrs: &OsuDifficultyAttributes,
    n300: f64,
    n100: f64,
    n50: f64,
    misses: f64,
) -> Option<f64> {
    let hit_windows = HitWindows {
        ar: 0.0,
        od_great: attrs.great_hit_window,
        od_ok: attrs.ok_hit_window,
        od_meh: attrs.meh_hit_window,
    };

    estimate_deviation(&hit_windows, n300, n100, n50, misses)
}

/// One-tailed 99% critical value of the normal distribution
#[allow(clippy::unreadable_literal)]
const Z: f64 = 2.32634787404;

/// 99% confidence lower bound for the probability to hit a 300 when
/// `n300` out of `n` judgements were 300s.
pub(crate) fn great_probability_lower_bound(n300: f64, n: f64) -> f64 {
    let p = n300 / n;

    (n * p + Z * Z / 2.0) / (n + Z * Z) - Z / (n + Z * Z) * (n * p * (1.0 - p) + Z * Z / 4.0).sqrt()
}

/// Deviation estimate for the given osu!standard hit windows.
pub(crate) fn estimate_deviation(
    hit_windows: &HitWindows,
    n300: f64,
    n100: f64,
    n50: f64,
    misses: f64,
) -> Option<f64> {
    if n300 + n100 + n50 <= 0.0 {
        return None;
    }

    let object_count = n300 + n100 + n50 + misses;

    // Bias corrected estimate for the probability to hit a 300
    let n = f64::max(1.0, object_count - misses - n50);
    let p_lower_bound = great_probability_lower_bound(n300, n);

    let great_hit_window = hit_windows.od_great;
    let ok_hit_window = hit_windows.od_ok;
    let meh_hit_window = hit_windows.od_meh;

    let mut deviation = great_hit_window / (SQRT_2 * erf_inv(p_lower_bound));

    let random_value = (2.0 / PI).sqrt()
        * ok_hit_window
        * (-0.5 * (ok_hit_window / deviation).powf(2.0)).exp()
        / (deviation * erf(ok_hit_window / (SQRT_2 * deviation)));

    deviation *= (1.0 - random_value).sqrt();

    // Deviation as the number of 300s approaches 0
    let limit_value = ok_hit_window / 3.0_f64.sqrt();

    if p_lower_bound.eq(0.0) || random_value >= 1.0 || deviation > limit_value {
        deviation = limit_value;
    }

    let meh_variance = (meh_hit_window * meh_hit_window
        + ok_hit_window * meh_hit_window
        + ok_hit_window * ok_hit_window)
        / 3.0;

    let deviation =
        (((n300 + n100) * deviation.powf(2.0) + n50 * meh_variance) / (n300 + n100 + n50)).sqrt();

    Some(deviation)
}

/// Misses are assumed to happen on the hardest parts of a map so maps with
/// few difficult sections are penalized harder.
pub(crate) fn calculate_miss_penalty(miss_count: f64, difficult_strain_count: f64) -> f64 {
    0.96 / ((miss_count / (4.0 * difficult_strain_count.ln().powf(0.94))) + 1.0)
}

fn total_imperfect_hits(state: &ScoreState) -> f64 {
    f64::from(state.n100 + state.n50 + state.misses)
}

const fn total_successful_hits(state: &ScoreState) -> u32 {
    state.n300 + state.n100 + state.n50
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            aim: 3.0,
            speed: 2.5,
            flashlight: 2.0,
            slider_factor: 0.95,
            speed_note_count: 200.0,
            aim_difficult_strain_count: 100.0,
            speed_difficult_strain_count: 80.0,
            aim_difficult_slider_count: 40.0,
            ar: 9.0,
            od: 8.0,
            hp: 5.0,
            great_hit_window: 32.0,
            ok_hit_window: 72.0,
            meh_hit_window: 112.0,
            n_circles: 300,
            n_sliders: 150,
            n_spinners: 2,
            max_combo: 700,
            stars: 4.5,
            ..Default::default()
        }
    }

    fn state(n100: u32, misses: u32, combo: u32) -> ScoreState {
        ScoreState {
            max_combo: combo,
            n300: 452 - n100 - misses,
            n100,
            n50: 0,
            misses,
        }
    }

    fn calculate(mods: u32, state: ScoreState, effective_miss_count: f64) -> OsuPerformanceAttributes {
        let mods = GameMods::from(mods);

        OsuPerformanceCalculator::new(attrs(), &mods, state.accuracy(), state, effective_miss_count)
            .calculate()
    }

    #[test]
    fn empty_state_has_no_pp() {
        let perf = calculate(0, ScoreState::new(), 0.0);

        assert!(perf.pp.eq(0.0));
        assert!((perf.stars() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn misses_reduce_pp() {
        let fc = calculate(0, state(10, 0, 700), 0.0);
        let missed = calculate(0, state(10, 5, 500), 5.0);

        assert!(fc.pp > missed.pp);
        assert!(fc.pp_aim > missed.pp_aim);
        assert!(fc.pp_speed > missed.pp_speed);
    }

    #[test]
    fn flashlight_needs_mod() {
        assert!(calculate(0, state(0, 0, 700), 0.0).pp_flashlight.eq(0.0));
        assert!(calculate(1024, state(0, 0, 700), 0.0).pp_flashlight > 0.0);
    }

    #[test]
    fn relax_drops_speed_and_acc() {
        let perf = calculate(128, state(10, 0, 700), 0.0);

        assert!(perf.pp_speed.eq(0.0));
        assert!(perf.pp_acc.eq(0.0));
        assert!(perf.effective_miss_count > 0.0);
    }

    #[test]
    fn deviation_grows_with_worse_hits() {
        let attrs = attrs();

        let good = calculate_deviation(&attrs, 190.0, 10.0, 0.0, 0.0).unwrap();
        let bad = calculate_deviation(&attrs, 120.0, 70.0, 10.0, 0.0).unwrap();

        assert!(bad > good);
        assert!(calculate_deviation(&attrs, 0.0, 0.0, 0.0, 5.0).is_none());
    }
}
