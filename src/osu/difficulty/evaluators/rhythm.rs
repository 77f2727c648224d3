use std::cmp;

use crate::{
    any::difficulty::object::IDifficultyObject,
    osu::difficulty::object::OsuDifficultyObject,
    util::difficulty::{logistic, smoothstep_bell_curve},
};

pub struct RhythmEvaluator;

impl RhythmEvaluator {
    const HISTORY_TIME_MAX: f64 = 5000.0;
    const HISTORY_OBJECTS_MAX: usize = 32;
    const RHYTHM_OVERALL_MULTIPLIER: f64 = 1.0;
    const RHYTHM_RATIO_MULTIPLIER: f64 = 15.0;

    /// Rhythm complexity multiplier for `curr`, at least `1.0` unless the
    /// object can be doubletapped.
    ///
    /// Looks back up to five seconds or 32 objects and rewards changes
    /// between groups ("islands") of evenly spaced objects.
    #[allow(clippy::too_many_lines)]
    pub fn evaluate_diff_of(
        curr: &OsuDifficultyObject<'_>,
        diff_objects: &[OsuDifficultyObject<'_>],
        hit_window: f64,
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let delta_eps = hit_window * 0.3;

        let mut complexity_sum = 0.0;
        let mut island = RhythmIsland::new(delta_eps);
        let mut prev_island = RhythmIsland::new(delta_eps);

        // Islands compare with a tolerance so no map can be used
        let mut island_counts: Vec<(RhythmIsland, usize)> = Vec::new();

        let mut start_ratio = 0.0;
        let mut speeding_up = false;

        let history_len = cmp::min(curr.idx, Self::HISTORY_OBJECTS_MAX);

        let mut rhythm_start = 0;

        while curr
            .previous(rhythm_start, diff_objects)
            .filter(|prev| {
                rhythm_start + 2 < history_len
                    && curr.start_time - prev.start_time < Self::HISTORY_TIME_MAX
            })
            .is_some()
        {
            rhythm_start += 1;
        }

        let Some((mut prev_obj, mut last_obj)) = curr
            .previous(rhythm_start, diff_objects)
            .zip(curr.previous(rhythm_start + 1, diff_objects))
        else {
            return Self::finish(curr, diff_objects, complexity_sum, hit_window);
        };

        // Oldest object first
        for i in (1..=rhythm_start).rev() {
            let Some(obj) = curr.previous(i - 1, diff_objects) else {
                break;
            };

            let time_decay =
                (Self::HISTORY_TIME_MAX - (curr.start_time - obj.start_time)) / Self::HISTORY_TIME_MAX;
            let note_decay = (history_len - i) as f64 / history_len as f64;
            let decay = note_decay.min(time_decay);

            let curr_delta = obj.delta_time.max(1e-7);
            let prev_delta = prev_obj.delta_time.max(1e-7);
            let last_delta = last_obj.delta_time.max(1e-7);

            // Deltas that are multiples of each other are not complex
            let delta_ratio = prev_delta.max(curr_delta) / prev_delta.min(curr_delta);
            let delta_fraction = delta_ratio.fract();

            let curr_ratio = 1.0
                + Self::RHYTHM_RATIO_MULTIPLIER
                    * smoothstep_bell_curve(delta_fraction, 0.5, 0.5).min(0.5);

            let ratio_penalty = (2.0 - delta_ratio / 8.0).clamp(0.0, 1.0);

            let window_penalty =
                (((prev_delta - curr_delta).abs() - delta_eps).max(0.0) / delta_eps).min(1.0);

            let mut effective_ratio = window_penalty * curr_ratio * ratio_penalty;

            if speeding_up {
                if (prev_delta - curr_delta).abs() < delta_eps {
                    island.add_delta();
                } else {
                    if obj.base.is_slider() {
                        effective_ratio *= 0.125;
                    }

                    if prev_obj.base.is_slider() {
                        effective_ratio *= 0.3;
                    }

                    if island.delta_count % 2 == prev_island.delta_count % 2 {
                        effective_ratio *= 0.5;
                    }

                    // Speed increase already started one object earlier
                    if last_delta > prev_delta + delta_eps && prev_delta > curr_delta + delta_eps {
                        effective_ratio *= 0.125;
                    }

                    if prev_island.delta_count == island.delta_count {
                        effective_ratio *= 0.5;
                    }

                    if let Some((_, count)) =
                        island_counts.iter_mut().find(|(other, _)| *other == island)
                    {
                        // Only consecutive repeats are counted
                        if prev_island == island {
                            *count += 1;
                        }

                        let n = *count as f64;
                        let power = logistic(f64::from(island.delta), 58.33, 0.24, Some(2.75));
                        effective_ratio *= (3.0 / n).min(n.recip().powf(power));
                    } else {
                        island_counts.push((island, 1));
                    }

                    let doubletapness = prev_obj.get_doubletapness(Some(obj), hit_window);
                    effective_ratio *= 1.0 - doubletapness * 0.75;

                    complexity_sum += (effective_ratio * start_ratio).sqrt() * decay;

                    start_ratio = effective_ratio;
                    prev_island = island;

                    if prev_delta + delta_eps < curr_delta {
                        speeding_up = false;
                    }

                    island = RhythmIsland::with_delta(curr_delta as i32, delta_eps);
                }
            } else if prev_delta > curr_delta + delta_eps {
                speeding_up = true;

                if obj.base.is_slider() {
                    effective_ratio *= 0.6;
                }

                if prev_obj.base.is_slider() {
                    effective_ratio *= 0.6;
                }

                start_ratio = effective_ratio;
                island = RhythmIsland::with_delta(curr_delta as i32, delta_eps);
            }

            last_obj = prev_obj;
            prev_obj = obj;
        }

        Self::finish(curr, diff_objects, complexity_sum, hit_window)
    }

    fn finish(
        curr: &OsuDifficultyObject<'_>,
        diff_objects: &[OsuDifficultyObject<'_>],
        complexity_sum: f64,
        hit_window: f64,
    ) -> f64 {
        let multiplier = (4.0 + complexity_sum * Self::RHYTHM_OVERALL_MULTIPLIER).sqrt() / 2.0;

        multiplier * (1.0 - curr.get_doubletapness(curr.next(0, diff_objects), hit_window))
    }
}

/// Group of objects with roughly equal delta times.
#[derive(Copy, Clone, Debug)]
struct RhythmIsland {
    delta_eps: f64,
    delta: i32,
    delta_count: i32,
}

const MIN_DELTA_TIME: i32 = OsuDifficultyObject::MIN_DELTA_TIME as i32;

impl RhythmIsland {
    const fn new(delta_eps: f64) -> Self {
        Self {
            delta_eps,
            delta: 0,
            delta_count: 0,
        }
    }

    fn with_delta(delta: i32, delta_eps: f64) -> Self {
        Self {
            delta_eps,
            delta: delta.max(MIN_DELTA_TIME),
            delta_count: 1,
        }
    }

    fn add_delta(&mut self) {
        self.delta_count += 1;
    }
}

impl PartialEq for RhythmIsland {
    fn eq(&self, other: &Self) -> bool {
        f64::from((self.delta - other.delta).abs()) < self.delta_eps
            && self.delta_count == other.delta_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn islands_compare_with_tolerance() {
        let a = RhythmIsland::with_delta(100, 15.0);
        let b = RhythmIsland::with_delta(110, 15.0);
        let c = RhythmIsland::with_delta(130, 15.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn island_delta_is_floored() {
        let island = RhythmIsland::with_delta(3, 15.0);

        assert_eq!(island.delta, MIN_DELTA_TIME);
    }
}
