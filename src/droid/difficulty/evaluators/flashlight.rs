use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::{difficulty::object::HiddenFade, object::OsuObjectKind},
};

/// Memorisation difficulty while only a small area around the finger is
/// visible.
pub struct DroidFlashlightEvaluator {
    scaling_factor: f64,
    hidden: Option<HiddenFade>,
}

impl DroidFlashlightEvaluator {
    const MAX_OPACITY_BONUS: f64 = 0.4;
    const HIDDEN_BONUS: f64 = 0.2;

    const MIN_VELOCITY: f64 = 0.5;
    const SLIDER_MULTIPLIER: f64 = 1.3;

    const HISTORY_LEN: usize = 10;

    pub fn new(radius: f64, hidden: Option<HiddenFade>) -> Self {
        Self {
            scaling_factor: 52.0 / radius,
            hidden,
        }
    }

    pub fn evaluate_diff_of(
        &self,
        curr: &DroidDifficultyObject<'_>,
        diff_objects: &[DroidDifficultyObject<'_>],
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let mut small_dist_nerf = 1.0;
        let mut cumulative_strain_time = 0.0;
        let mut result = 0.0;

        let mut last_obj = curr;

        for i in 0..cmp::min(curr.idx, Self::HISTORY_LEN) {
            let Some(prev) = curr.previous(i, diff_objects) else {
                break;
            };

            cumulative_strain_time += last_obj.strain_time;

            if !prev.base.is_spinner() {
                let jump_dist =
                    f64::from((curr.base.stacked_pos() - prev.base.stacked_end_pos()).length());

                if i == 0 {
                    small_dist_nerf = (jump_dist / 75.0).min(1.0);
                }

                let stack_nerf = ((prev.lazy_jump_dist / self.scaling_factor) / 25.0).min(1.0);

                let opacity = curr.opacity_at(prev.base.start_time, self.hidden);
                let opacity_bonus = 1.0 + Self::MAX_OPACITY_BONUS * (1.0 - opacity);

                result += stack_nerf * opacity_bonus * self.scaling_factor * jump_dist
                    / cumulative_strain_time;
            }

            last_obj = prev;
        }

        result = (small_dist_nerf * result).powf(2.0);

        if self.hidden.is_some() {
            result *= 1.0 + Self::HIDDEN_BONUS;
        }

        result + self.slider_bonus(curr) * Self::SLIDER_MULTIPLIER
    }

    fn slider_bonus(&self, curr: &DroidDifficultyObject<'_>) -> f64 {
        let OsuObjectKind::Slider(ref slider) = curr.base.kind else {
            return 0.0;
        };

        let pixel_travel_dist = curr.lazy_travel_dist / self.scaling_factor;

        let velocity_bonus =
            (pixel_travel_dist / curr.travel_time - Self::MIN_VELOCITY).max(0.0).sqrt();

        velocity_bonus * pixel_travel_dist / (slider.repeat_count() + 1) as f64
    }
}
