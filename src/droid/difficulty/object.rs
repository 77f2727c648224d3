use crate::{
    any::difficulty::object::{HasStartTime, IDifficultyObject},
    osu::{
        difficulty::{
            object::{doubletapness, opacity_at, HiddenFade, LazyTravel, Movement},
            scaling_factor::ScalingFactor,
        },
        object::OsuObject,
    },
};

/// Derived data of a hit object for osu!droid skills.
///
/// Unlike osu!standard, every object gets a difficulty object, including
/// the first one.
pub struct DroidDifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a OsuObject,
    pub start_time: f64,
    pub end_time: f64,
    pub delta_time: f64,
    /// `delta_time` but at least [`Self::MIN_DELTA_TIME`].
    pub strain_time: f64,

    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub lazy_travel_dist: f64,
    pub angle: Option<f64>,

    /// Change of the strain time relative to the previous object.
    pub rhythm: RhythmRatio,

    time_preempt: f64,
    time_fade_in: f64,
}

impl<'a> DroidDifficultyObject<'a> {
    pub const MIN_DELTA_TIME: f64 = 25.0;

    pub fn new(
        objects: &'a [OsuObject],
        travels: &[LazyTravel],
        i: usize,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
        time_preempt: f64,
        time_fade_in: f64,
    ) -> Self {
        let base = &objects[i];

        let delta = delta_time(objects, i, clock_rate);
        let strain_time = delta.max(Self::MIN_DELTA_TIME);

        let rhythm = match i.checked_sub(1) {
            Some(prev) if prev > 0 => {
                let prev_strain_time =
                    delta_time(objects, prev, clock_rate).max(Self::MIN_DELTA_TIME);

                RhythmRatio::closest(strain_time / prev_strain_time)
            }
            _ => RhythmRatio::EVEN,
        };

        let Movement {
            lazy_jump_dist,
            min_jump_dist,
            min_jump_time,
            travel_dist,
            travel_time,
            lazy_travel_dist,
            angle,
        } = Movement::new(objects, travels, i, strain_time, clock_rate, scaling_factor);

        Self {
            idx: i,
            base,
            start_time: base.start_time / clock_rate,
            end_time: base.end_time() / clock_rate,
            delta_time: delta,
            strain_time,
            lazy_jump_dist,
            min_jump_dist,
            min_jump_time,
            travel_dist,
            travel_time,
            lazy_travel_dist,
            angle,
            rhythm,
            time_preempt,
            time_fade_in,
        }
    }

    /// Opacity of this object at `time`, given in map time.
    pub fn opacity_at(&self, time: f64, hidden: Option<HiddenFade>) -> f64 {
        opacity_at(
            time,
            self.base.start_time,
            self.time_preempt,
            self.time_fade_in,
            hidden,
        )
    }

    pub fn get_doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        doubletapness(
            self.delta_time,
            next.delta_time,
            self.base.is_spinner(),
            hit_window,
        )
    }
}

impl IDifficultyObject for DroidDifficultyObject<'_> {
    fn idx(&self) -> usize {
        self.idx
    }
}

impl HasStartTime for DroidDifficultyObject<'_> {
    fn start_time(&self) -> f64 {
        self.start_time
    }
}

fn delta_time(objects: &[OsuObject], i: usize, clock_rate: f64) -> f64 {
    match i.checked_sub(1) {
        Some(prev) => (objects[i].start_time - objects[prev].start_time) / clock_rate,
        None => 0.0,
    }
}

/// A musically meaningful ratio between consecutive strain times.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RhythmRatio {
    pub ratio: f64,
    /// How hard it is to switch into this rhythm.
    pub difficulty: f64,
}

impl RhythmRatio {
    pub const EVEN: Self = Self::new(1.0, 1.0, 0.0);

    /// Simpler ratios come first so they win ties.
    const TABLE: [Self; 9] = [
        Self::EVEN,
        Self::new(2.0, 1.0, 0.3),
        Self::new(1.0, 2.0, 0.5),
        Self::new(3.0, 1.0, 0.3),
        Self::new(1.0, 3.0, 0.35),
        Self::new(3.0, 2.0, 0.6),
        Self::new(2.0, 3.0, 0.4),
        Self::new(5.0, 4.0, 0.5),
        Self::new(4.0, 5.0, 0.7),
    ];

    const fn new(numerator: f64, denominator: f64, difficulty: f64) -> Self {
        Self {
            ratio: numerator / denominator,
            difficulty,
        }
    }

    /// The table entry nearest to `ratio`.
    pub fn closest(ratio: f64) -> Self {
        Self::TABLE
            .into_iter()
            .min_by(|a, b| (a.ratio - ratio).abs().total_cmp(&(b.ratio - ratio).abs()))
            .unwrap_or(Self::EVEN)
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
        osu::convert::convert_objects,
    };

    use super::*;

    #[test]
    fn snaps_to_nearest_ratio() {
        assert_eq!(RhythmRatio::closest(1.05), RhythmRatio::EVEN);
        assert!((RhythmRatio::closest(0.49).ratio - 0.5).abs() < 1e-9);
        assert!((RhythmRatio::closest(1.3).ratio - 1.25).abs() < 1e-9);
        assert!((RhythmRatio::closest(100.0).ratio - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ties_prefer_simpler_ratio() {
        // Exactly between 1/1 and 5/4
        assert_eq!(RhythmRatio::closest(1.125), RhythmRatio::EVEN);
    }

    #[test]
    fn every_object_is_navigable() {
        let map = Beatmap {
            hit_objects: [0.0, 200.0, 300.0]
                .into_iter()
                .map(|start_time| HitObject {
                    pos: Pos::new(100.0, 100.0),
                    start_time,
                    kind: HitObjectKind::Circle,
                })
                .collect(),
            ..Default::default()
        };

        let scaling_factor = ScalingFactor::new(4.0);
        let (objects, _) =
            convert_objects(&map, &scaling_factor, Reflection::None, 1200.0, usize::MAX);
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff_objects: Vec<_> = (0..objects.len())
            .map(|i| {
                DroidDifficultyObject::new(
                    &objects,
                    &travels,
                    i,
                    1.0,
                    &scaling_factor,
                    1200.0,
                    800.0,
                )
            })
            .collect();

        let first = &diff_objects[0];
        assert!(first.delta_time.abs() < f64::EPSILON);
        assert!((first.strain_time - DroidDifficultyObject::MIN_DELTA_TIME).abs() < f64::EPSILON);
        assert!(first.previous(0, &diff_objects).is_none());

        let last = &diff_objects[2];
        assert!(last.next(0, &diff_objects).is_none());
        assert_eq!(last.previous(0, &diff_objects).map(|h| h.idx), Some(1));
        assert!((last.rhythm.ratio - 0.5).abs() < 1e-9);
    }
}
