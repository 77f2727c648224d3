use crate::{
    any::difficulty::object::IDifficultyObject,
    osu::difficulty::object::OsuDifficultyObject,
    util::difficulty::{bpm_to_milliseconds, milliseconds_to_bpm},
};

pub struct SpeedEvaluator;

impl SpeedEvaluator {
    /// 1.25 circles distance between centers
    const SINGLE_SPACING_THRESHOLD: f64 = OsuDifficultyObject::NORMALIZED_DIAMETER as f64 * 1.25;
    /// 1/4 at 200 BPM
    const MIN_SPEED_BONUS: f64 = 200.0;
    const SPEED_BALANCING_FACTOR: f64 = 40.0;
    const DIST_MULTIPLIER: f64 = 0.8;

    pub fn evaluate_diff_of(
        curr: &OsuDifficultyObject<'_>,
        diff_objects: &[OsuDifficultyObject<'_>],
        hit_window: f64,
        autopilot: bool,
    ) -> f64 {
        if curr.base.is_spinner() {
            return 0.0;
        }

        let prev = curr.previous(0, diff_objects);
        let next = curr.next(0, diff_objects);

        let doubletapness = 1.0 - curr.get_doubletapness(next, hit_window);

        // Cap the delta time to the 300 hit window. The numbers keep
        // 260 BPM OD8 streams intact while limiting the cap's effect.
        let strain_time = curr.strain_time / ((curr.strain_time / hit_window) / 0.93).clamp(0.92, 1.0);

        let speed_bonus = if milliseconds_to_bpm(strain_time, None) > Self::MIN_SPEED_BONUS {
            let base = (bpm_to_milliseconds(Self::MIN_SPEED_BONUS, None) - strain_time)
                / Self::SPEED_BALANCING_FACTOR;

            0.75 * base.powf(2.0)
        } else {
            0.0
        };

        let travel_dist = prev.map_or(0.0, |prev| prev.travel_dist);
        let dist = (travel_dist + curr.min_jump_dist).min(Self::SINGLE_SPACING_THRESHOLD);

        let dist_bonus = if autopilot {
            0.0
        } else {
            (dist / Self::SINGLE_SPACING_THRESHOLD).powf(3.95)
                * Self::DIST_MULTIPLIER
                * curr.small_circle_bonus.sqrt()
        };

        let difficulty = (1.0 + speed_bonus + dist_bonus) * 1000.0 / strain_time;

        difficulty * doubletapness
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            beatmap::Beatmap,
            hit_object::{HitObject, HitObjectKind, Pos},
            mods::Reflection,
        },
        osu::{
            convert::convert_objects,
            difficulty::{object::LazyTravel, scaling_factor::ScalingFactor},
            object::OsuObject,
        },
    };

    use super::*;

    fn stream(delta: f64, spacing: f32) -> Box<[OsuObject]> {
        let map = Beatmap {
            hit_objects: (0..8)
                .map(|i| HitObject {
                    pos: Pos::new(50.0 + spacing * i as f32, 100.0),
                    start_time: delta * f64::from(i),
                    kind: HitObjectKind::Circle,
                })
                .collect(),
            ..Default::default()
        };

        let scaling_factor = ScalingFactor::new(4.0);

        convert_objects(&map, &scaling_factor, Reflection::None, 1200.0, usize::MAX).0
    }

    fn evaluate(objects: &[OsuObject], autopilot: bool) -> f64 {
        let scaling_factor = ScalingFactor::new(4.0);
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff_objects: Vec<_> = (1..objects.len())
            .map(|i| OsuDifficultyObject::new(objects, &travels, i, 1.0, &scaling_factor))
            .collect();

        SpeedEvaluator::evaluate_diff_of(&diff_objects[3], &diff_objects, 50.0, autopilot)
    }

    #[test]
    fn faster_streams_are_harder() {
        let slow = evaluate(&stream(150.0, 60.0), false);
        let fast = evaluate(&stream(75.0, 60.0), false);

        assert!(fast > slow, "{fast} <= {slow}");
    }

    #[test]
    fn autopilot_ignores_spacing() {
        let spaced = evaluate(&stream(100.0, 100.0), true);
        let stacked = evaluate(&stream(100.0, 20.0), true);

        assert!((spaced - stacked).abs() < 1e-9);
        assert!(evaluate(&stream(100.0, 100.0), false) > spaced);
    }
}
