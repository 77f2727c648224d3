use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    util::difficulty::bpm_to_milliseconds,
};

pub struct TapEvaluator;

impl TapEvaluator {
    /// 1/4 at 200 BPM
    const MIN_SPEED_BONUS: f64 = 200.0;
    const SPEED_BALANCING_FACTOR: f64 = 40.0;

    /// Tapping difficulty of `curr`, only depending on timing.
    pub fn evaluate_diff_of(
        curr: &DroidDifficultyObject<'_>,
        diff_objects: &[DroidDifficultyObject<'_>],
        great_window: f64,
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let doubletapness =
            1.0 - curr.get_doubletapness(curr.next(0, diff_objects), great_window);

        // Streams faster than the great window are capped
        let strain_time =
            curr.strain_time / ((curr.strain_time / great_window) / 0.93).clamp(0.92, 1.0);

        let min_speed_bonus_time = bpm_to_milliseconds(Self::MIN_SPEED_BONUS, None);

        let speed_bonus = if strain_time < min_speed_bonus_time {
            0.75 * ((min_speed_bonus_time - strain_time) / Self::SPEED_BALANCING_FACTOR).powf(2.0)
        } else {
            0.0
        };

        (1.0 + speed_bonus) * 1000.0 / strain_time * doubletapness
    }
}
