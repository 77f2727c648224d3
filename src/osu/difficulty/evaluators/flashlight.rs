use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    osu::{
        difficulty::object::{HiddenFade, OsuDifficultyObject},
        object::OsuObjectKind,
    },
};

/// Memorisation difficulty while only a small area around the cursor is
/// visible.
pub struct FlashlightEvaluator {
    scaling_factor: f64,
    time_preempt: f64,
    time_fade_in: f64,
    hidden: Option<HiddenFade>,
}

impl FlashlightEvaluator {
    const MAX_OPACITY_BONUS: f64 = 0.4;
    const HIDDEN_BONUS: f64 = 0.2;

    const MIN_VELOCITY: f64 = 0.5;
    const SLIDER_MULTIPLIER: f64 = 1.3;

    const MIN_ANGLE_MULTIPLIER: f64 = 0.2;

    /// Objects this many positions back still influence the current one.
    const HISTORY_LEN: usize = 10;

    pub fn new(
        radius: f64,
        time_preempt: f64,
        time_fade_in: f64,
        hidden: Option<HiddenFade>,
    ) -> Self {
        Self {
            scaling_factor: 52.0 / radius,
            time_preempt,
            time_fade_in,
            hidden,
        }
    }

    pub fn evaluate_diff_of(
        &self,
        curr: &OsuDifficultyObject<'_>,
        diff_objects: &[OsuDifficultyObject<'_>],
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let mut small_dist_nerf = 1.0;
        let mut cumulative_strain_time = 0.0;
        let mut angle_repeat_count = 0.0;
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

                // Objects within the flashlight radius are easy to see
                if i == 0 {
                    small_dist_nerf = (jump_dist / 75.0).min(1.0);
                }

                // Only the first object of a stack counts
                let stack_nerf = ((prev.lazy_jump_dist / self.scaling_factor) / 25.0).min(1.0);

                let opacity = curr.opacity_at(
                    prev.base.start_time,
                    self.hidden,
                    self.time_preempt,
                    self.time_fade_in,
                );
                let opacity_bonus = 1.0 + Self::MAX_OPACITY_BONUS * (1.0 - opacity);

                result += stack_nerf * opacity_bonus * self.scaling_factor * jump_dist
                    / cumulative_strain_time;

                if let Some((prev_angle, curr_angle)) = prev.angle.zip(curr.angle) {
                    if (prev_angle - curr_angle).abs() < 0.02 {
                        angle_repeat_count += (1.0 - 0.1 * i as f64).max(0.0);
                    }
                }
            }

            last_obj = prev;
        }

        result = (small_dist_nerf * result).powf(2.0);

        // No approach circles
        if self.hidden.is_some() {
            result *= 1.0 + Self::HIDDEN_BONUS;
        }

        result *= Self::MIN_ANGLE_MULTIPLIER
            + (1.0 - Self::MIN_ANGLE_MULTIPLIER) / (angle_repeat_count + 1.0);

        result + self.slider_bonus(curr) * Self::SLIDER_MULTIPLIER
    }

    fn slider_bonus(&self, curr: &OsuDifficultyObject<'_>) -> f64 {
        let OsuObjectKind::Slider(ref slider) = curr.base.kind else {
            return 0.0;
        };

        // Travel distance in osu!pixels, independent of circle size
        let pixel_travel_dist = curr.lazy_travel_dist / self.scaling_factor;

        let velocity_bonus =
            (pixel_travel_dist / curr.travel_time - Self::MIN_VELOCITY).max(0.0).sqrt();

        // Repeats require less memorisation
        velocity_bonus * pixel_travel_dist / (slider.repeat_count() + 1) as f64
    }
}
