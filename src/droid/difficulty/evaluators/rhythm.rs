use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
};

pub struct DroidRhythmEvaluator;

impl DroidRhythmEvaluator {
    const HISTORY_TIME_MAX: f64 = 5000.0;
    const HISTORY_OBJECTS_MAX: usize = 32;
    const RHYTHM_MULTIPLIER: f64 = 0.75;

    /// Rhythm complexity multiplier for `curr`.
    ///
    /// Sums the difficulty of recent rhythm changes, weighted by how long
    /// ago they happened. Changes within the hit window tolerance are not
    /// distinguishable and don't count. Spinners are neutral.
    pub fn evaluate_diff_of(
        curr: &DroidDifficultyObject<'_>,
        diff_objects: &[DroidDifficultyObject<'_>],
        great_window: f64,
    ) -> f64 {
        if curr.base.is_spinner() {
            return 1.0;
        }

        let delta_eps = great_window * 0.6;
        let history_len = cmp::min(curr.idx, Self::HISTORY_OBJECTS_MAX);

        let mut complexity_sum = 0.0;
        let mut later = curr;

        for i in 0..history_len {
            let Some(obj) = curr.previous(i, diff_objects) else {
                break;
            };

            let elapsed = curr.start_time - obj.start_time;

            if elapsed >= Self::HISTORY_TIME_MAX {
                break;
            }

            let time_decay = (Self::HISTORY_TIME_MAX - elapsed) / Self::HISTORY_TIME_MAX;
            let note_decay = (history_len - i) as f64 / history_len as f64;

            let window_penalty =
                (((later.delta_time - obj.delta_time).abs() - delta_eps).max(0.0) / delta_eps)
                    .min(1.0);

            complexity_sum +=
                later.rhythm.difficulty * window_penalty * time_decay.min(note_decay);

            later = obj;
        }

        let multiplier = (4.0 + complexity_sum * Self::RHYTHM_MULTIPLIER).sqrt() / 2.0;

        multiplier * (1.0 - curr.get_doubletapness(curr.next(0, diff_objects), great_window))
    }
}
