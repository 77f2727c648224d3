use std::f64::consts::SQRT_2;

use crate::{
    any::{difficulty::skills::difficulty_to_performance, ScoreState},
    droid::{
        attributes::{DroidDifficultyAttributes, DroidPerformanceAttributes},
        difficulty::skills::{DroidFlashlight, Visual},
    },
    model::{
        beatmap::{BeatmapAttributesBuilder, HitWindows},
        mods::GameMods,
    },
    osu::{
        difficulty::rating::length_bonus,
        performance::{calculate_miss_penalty, estimate_deviation, great_probability_lower_bound},
    },
    util::{
        difficulty::{erf, norm},
        root_finding::find_root_expand,
    },
};

use super::DroidPenalties;

pub const FINAL_MULTIPLIER: f64 = 1.24;

const AIM_DEVIATION_SCALE: f64 = 30.0;
const TAP_DEVIATION_SCALE: f64 = 25.0;
const COGNITIVE_DEVIATION_SCALE: f64 = 50.0;

pub(super) struct DroidPerformanceCalculator<'mods> {
    attrs: DroidDifficultyAttributes,
    mods: &'mods GameMods,
    acc: f64,
    state: ScoreState,
    effective_miss_count: f64,
    penalties: DroidPenalties,
}

impl<'a> DroidPerformanceCalculator<'a> {
    pub const fn new(
        attrs: DroidDifficultyAttributes,
        mods: &'a GameMods,
        acc: f64,
        state: ScoreState,
        effective_miss_count: f64,
        penalties: DroidPenalties,
    ) -> Self {
        Self {
            attrs,
            mods,
            acc,
            state,
            effective_miss_count,
            penalties,
        }
    }
}

impl DroidPerformanceCalculator<'_> {
    pub fn calculate(mut self) -> DroidPerformanceAttributes {
        let total_hits = self.state.total_hits();

        if total_hits == 0 {
            return DroidPerformanceAttributes {
                difficulty: self.attrs,
                ..Default::default()
            };
        }

        let total_hits = f64::from(total_hits);

        let mut multiplier = FINAL_MULTIPLIER;

        if self.mods.nf() {
            multiplier *= (1.0 - 0.02 * self.effective_miss_count).max(0.9);
        }

        if self.mods.so() {
            multiplier *= 1.0 - (f64::from(self.attrs.n_spinners) / total_hits).powf(0.85);
        }

        if self.mods.rx() {
            let od = self.attrs.od;

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

        // The standard OD has the same great window as the droid one
        let hit_windows = BeatmapAttributesBuilder::new()
            .od(self.attrs.od as f32, true)
            .hit_windows();

        let deviation = self.calculate_deviation(&hit_windows);
        let tap_deviation = self.calculate_tap_deviation(&hit_windows);

        let aim_value = self.compute_aim_value(deviation);
        let tap_value = self.compute_tap_value(tap_deviation);
        let acc_value = self.compute_accuracy_value();
        let flashlight_value = self.compute_flashlight_value(deviation);
        let visual_value = self.compute_visual_value(deviation);

        let pp = norm(
            1.1,
            [aim_value, tap_value, acc_value, flashlight_value, visual_value],
        ) * multiplier;

        log::debug!(
            "osu!droid performance: aim={aim_value} tap={tap_value} acc={acc_value} flashlight={flashlight_value} visual={visual_value} pp={pp}"
        );

        DroidPerformanceAttributes {
            difficulty: self.attrs,
            pp,
            pp_aim: aim_value,
            pp_tap: tap_value,
            pp_accuracy: acc_value,
            pp_flashlight: flashlight_value,
            pp_visual: visual_value,
            effective_miss_count: self.effective_miss_count,
            deviation,
            tap_deviation,
        }
    }

    fn compute_aim_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| !self.mods.ap()) else {
            return 0.0;
        };

        let mut aim_difficulty = self.attrs.aim;

        if self.attrs.n_sliders > 0 && self.attrs.aim_difficult_slider_count > 0.0 {
            let dropped_sliders = f64::min(
                f64::from(self.state.n100 + self.state.n50 + self.state.misses),
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

        aim_value *= erf(AIM_DEVIATION_SCALE / (SQRT_2 * deviation));

        aim_value / self.penalties.aim_slider_cheese.max(1.0)
    }

    fn compute_tap_value(&self, tap_deviation: Option<f64>) -> f64 {
        let Some(tap_deviation) = tap_deviation.filter(|_| !self.mods.rx()) else {
            return 0.0;
        };

        let mut tap_value = difficulty_to_performance(self.attrs.tap);
        tap_value *= length_bonus(self.state.total_hits());

        if self.effective_miss_count > 0.0 {
            tap_value *= calculate_miss_penalty(
                self.effective_miss_count,
                self.attrs.tap_difficult_strain_count,
            );
        }

        tap_value *= erf(TAP_DEVIATION_SCALE / (SQRT_2 * tap_deviation));

        tap_value / self.penalties.tap.max(1.0)
    }

    fn compute_accuracy_value(&self) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let n_acc_objects = self.attrs.n_circles;

        if n_acc_objects == 0 {
            return 0.0;
        }

        let n300 = self.state.n300 as i32;
        let non_acc_hits = (self.state.total_hits() as i32 - n_acc_objects as i32).max(0);

        let better_acc_percentage = (f64::from(
            (n300 - non_acc_hits) * 6 + self.state.n100 as i32 * 2 + self.state.n50 as i32,
        ) / f64::from(n_acc_objects * 6))
        .max(0.0);

        let mut acc_value =
            1.52163_f64.powf(self.attrs.od) * better_acc_percentage.powf(24.0) * 2.83;

        acc_value *= (f64::from(n_acc_objects) / 1000.0).powf(0.3).min(1.15);

        if self.mods.hd() {
            acc_value *= 1.08;
        }

        if self.mods.fl() {
            acc_value *= 1.02;
        }

        acc_value
    }

    fn compute_flashlight_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation.filter(|_| self.mods.fl()) else {
            return 0.0;
        };

        let mut flashlight_value =
            DroidFlashlight::difficulty_to_performance(self.attrs.flashlight);

        flashlight_value *= self.cognitive_miss_penalty();
        flashlight_value *= self.combo_scaling_factor();
        flashlight_value *= erf(COGNITIVE_DEVIATION_SCALE / (SQRT_2 * deviation));
        flashlight_value *= 0.5 + self.acc / 2.0;

        flashlight_value / self.penalties.flashlight_slider_cheese.max(1.0)
    }

    fn compute_visual_value(&self, deviation: Option<f64>) -> f64 {
        let Some(deviation) = deviation else {
            return 0.0;
        };

        let mut visual_value = Visual::difficulty_to_performance(self.attrs.visual);

        visual_value *= self.cognitive_miss_penalty();
        visual_value *= self.combo_scaling_factor();
        visual_value *= erf(COGNITIVE_DEVIATION_SCALE / (SQRT_2 * deviation));
        visual_value *= 0.5 + self.acc / 2.0;

        visual_value / self.penalties.visual_slider_cheese.max(1.0)
    }

    /// Misses hurt reading skills regardless of where they happened.
    fn cognitive_miss_penalty(&self) -> f64 {
        if self.effective_miss_count <= 0.0 {
            return 1.0;
        }

        let total_hits = f64::from(self.state.total_hits());

        0.97 * (1.0 - (self.effective_miss_count / total_hits).powf(0.775))
            .powf(self.effective_miss_count.powf(0.875))
    }

    fn combo_scaling_factor(&self) -> f64 {
        if self.attrs.max_combo == 0 {
            1.0
        } else {
            (f64::from(self.state.max_combo).powf(0.8) / f64::from(self.attrs.max_combo).powf(0.8))
                .min(1.0)
        }
    }

    /// Deviation over all circles, assuming that sliders were hit
    /// perfectly.
    fn calculate_deviation(&self, hit_windows: &HitWindows) -> Option<f64> {
        let n_circles = f64::from(self.attrs.n_circles);

        if n_circles <= 0.0 {
            return estimate_deviation(
                hit_windows,
                f64::from(self.state.n300),
                f64::from(self.state.n100),
                f64::from(self.state.n50),
                f64::from(self.state.misses),
            );
        }

        let misses = f64::min(f64::from(self.state.misses), n_circles);
        let n50 = f64::min(f64::from(self.state.n50), n_circles - misses);
        let n100 = f64::min(f64::from(self.state.n100), n_circles - misses - n50);
        let n300 = (n_circles - misses - n50 - n100).max(0.0);

        estimate_deviation(hit_windows, n300, n100, n50, misses)
    }

    /// Deviation over the notes that are relevant for tapping.
    ///
    /// Only the great window is considered so the deviation is solved for
    /// numerically instead of in closed form.
    fn calculate_tap_deviation(&self, hit_windows: &HitWindows) -> Option<f64> {
        if self.state.n300 + self.state.n100 + self.state.n50 == 0 {
            return None;
        }

        let mut note_count = self.attrs.speed_note_count;
        note_count += (f64::from(self.state.total_hits()) - self.attrs.speed_note_count) * 0.1;
        let note_count = note_count.max(1.0);

        // Worst case: all mistakes were on tapped notes
        let misses = f64::min(f64::from(self.state.misses), note_count);
        let n50 = f64::min(f64::from(self.state.n50), note_count - misses);
        let n300 = (note_count - misses - n50 - f64::from(self.state.n100)).max(0.0);

        let n = f64::max(1.0, note_count - misses - n50);
        let p_lower_bound = great_probability_lower_bound(n300, n);

        let great = hit_windows.od_great;
        let limit_value = hit_windows.od_ok / 3.0_f64.sqrt();

        let deviation = find_root_expand(
            |deviation| erf(great / (SQRT_2 * deviation)) - p_lower_bound,
            0.0,
            great,
        );

        match deviation {
            Ok(deviation) => Some(deviation.min(limit_value)),
            Err(err) => {
                log::warn!("tap deviation fell back to its limit: {err}");

                Some(limit_value)
            }
        }
    }
}
