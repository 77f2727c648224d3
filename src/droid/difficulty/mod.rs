use std::cmp;

use crate::{
    any::difficulty::{
        skills::{difficult_strain_count, difficulty_to_performance, Strain},
        Difficulty,
    },
    droid::{attributes::DroidDifficultyAttributes, hit_window::DroidHitWindow},
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    osu::{
        convert::convert_objects,
        difficulty::{
            object::{HiddenFade, LazyTravel},
            scaling_factor::ScalingFactor,
        },
        object::OsuObject,
    },
    util::difficulty::norm,
};

use self::{
    evaluators::{DroidFlashlightEvaluator, VisualEvaluator},
    object::DroidDifficultyObject,
    rating::DroidRatingCalculator,
    skills::{DroidAim, DroidFlashlight, Rhythm, Tap, Visual},
};

pub mod evaluators;
pub mod object;
pub mod rating;
pub mod skills;

const STAR_RATING_MULTIPLIER: f64 = 0.027;

const HD_FADE_IN_DURATION_MULTIPLIER: f64 = 0.4;
const HD_FADE_OUT_DURATION_MULTIPLIER: f64 = 0.35;
const PARTIAL_VISIBILITY_MIN_OPACITY: f64 = 0.4;

/// Difficulty calculation of a map played on osu!droid.
///
/// Like its osu!standard counterpart, the map is converted once so that
/// single skills can be recalculated cheaply.
pub struct DroidDifficultyCalculator {
    mods: GameMods,
    clock_rate: f64,
    take: usize,
    objects: Box<[OsuObject]>,
    travels: Box<[LazyTravel]>,
    scaling_factor: ScalingFactor,
    time_preempt: f64,
    time_fade_in: f64,
    hidden: Option<HiddenFade>,
    hit_window: f64,
    attrs: DroidDifficultyAttributes,
}

impl DroidDifficultyCalculator {
    pub fn new(difficulty: &Difficulty, map: &Beatmap) -> Result<Self, ConvertError> {
        map.check_mode()?;

        let mods = difficulty.get_mods().clone();
        let clock_rate = difficulty.get_clock_rate();
        let take = difficulty.get_passed_objects();

        let builder = map.attributes().difficulty(difficulty);
        let map_attrs = builder.build();
        let scaling_factor = ScalingFactor::new(map_attrs.cs);

        let time_preempt = f64::from((map_attrs.hit_windows.ar * clock_rate) as f32);

        let time_fade_in = if mods.hd() {
            time_preempt * HD_FADE_IN_DURATION_MULTIPLIER
        } else {
            400.0 * (time_preempt / OsuObject::PREEMPT_MIN).min(1.0)
        };

        let hidden = HiddenFade::from_mods(
            &mods,
            HD_FADE_OUT_DURATION_MULTIPLIER,
            PARTIAL_VISIBILITY_MIN_OPACITY,
        );

        let od_clock_rate = match difficulty.get_od() {
            Some(od) if od.fixed => 1.0,
            _ => clock_rate,
        };

        let hit_window = DroidHitWindow::new(builder.mod_adjusted_od(), od_clock_rate);

        let (objects, counts) = convert_objects(
            map,
            &scaling_factor,
            mods.reflection(),
            time_preempt,
            take,
        );

        let travels = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let attrs = DroidDifficultyAttributes {
            ar: map_attrs.ar,
            od: hit_window.standard_od(),
            great_hit_window: hit_window.great,
            ok_hit_window: hit_window.ok,
            meh_hit_window: hit_window.meh,
            n_circles: counts.n_circles,
            n_sliders: counts.n_sliders,
            n_spinners: counts.n_spinners,
            max_combo: counts.max_combo,
            ..Default::default()
        };

        Ok(Self {
            mods,
            clock_rate,
            take,
            objects,
            travels,
            scaling_factor,
            time_preempt,
            time_fade_in,
            hidden,
            hit_window: 2.0 * hit_window.great,
            attrs,
        })
    }

    /// Calculate all skills and the star rating.
    pub fn calculate(&self) -> DroidDifficultyAttributes {
        let diff_objects = self.difficulty_objects();
        let rating = self.rating_calculator();

        let aim = self.aim_values(&diff_objects);
        let tap = self.tap_values(&diff_objects);

        let mut attrs = self.attrs.clone();

        attrs.aim = rating.compute_aim_rating(aim.difficulty_value);
        attrs.tap = rating.compute_tap_rating(tap.difficulty_value);
        attrs.rhythm = rating.compute_rhythm_rating(self.rhythm_value(&diff_objects));
        attrs.flashlight = if self.mods.fl() {
            rating.compute_flashlight_rating(self.flashlight_value(&diff_objects))
        } else {
            0.0
        };
        attrs.visual = rating.compute_visual_rating(self.visual_value(&diff_objects));

        aim.store(&mut attrs);
        tap.store(&mut attrs);

        attrs.stars = star_rating(&attrs);

        log::debug!(
            "osu!droid difficulty: aim={} tap={} rhythm={} flashlight={} visual={} stars={}",
            attrs.aim,
            attrs.tap,
            attrs.rhythm,
            attrs.flashlight,
            attrs.visual,
            attrs.stars
        );

        attrs
    }

    pub fn recompute_aim(&self, attrs: &mut DroidDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();
        let aim = self.aim_values(&diff_objects);

        attrs.aim = self
            .rating_calculator()
            .compute_aim_rating(aim.difficulty_value);
        aim.store(attrs);
        attrs.stars = star_rating(attrs);
    }

    pub fn recompute_tap(&self, attrs: &mut DroidDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();
        let tap = self.tap_values(&diff_objects);

        attrs.tap = self
            .rating_calculator()
            .compute_tap_rating(tap.difficulty_value);
        tap.store(attrs);
        attrs.stars = star_rating(attrs);
    }

    /// Rhythm does not take part in the star rating but the stars are
    /// refreshed anyway to reflect any other replaced value.
    pub fn recompute_rhythm(&self, attrs: &mut DroidDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();

        attrs.rhythm = self
            .rating_calculator()
            .compute_rhythm_rating(self.rhythm_value(&diff_objects));
        attrs.stars = star_rating(attrs);
    }

    pub fn recompute_flashlight(&self, attrs: &mut DroidDifficultyAttributes) {
        attrs.flashlight = if self.mods.fl() {
            let diff_objects = self.difficulty_objects();

            self.rating_calculator()
                .compute_flashlight_rating(self.flashlight_value(&diff_objects))
        } else {
            0.0
        };

        attrs.stars = star_rating(attrs);
    }

    pub fn recompute_visual(&self, attrs: &mut DroidDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();

        attrs.visual = self
            .rating_calculator()
            .compute_visual_rating(self.visual_value(&diff_objects));
        attrs.stars = star_rating(attrs);
    }

    fn difficulty_objects(&self) -> Vec<DroidDifficultyObject<'_>> {
        (0..self.n_processed())
            .map(|i| {
                DroidDifficultyObject::new(
                    &self.objects,
                    &self.travels,
                    i,
                    self.clock_rate,
                    &self.scaling_factor,
                    self.time_preempt,
                    self.time_fade_in,
                )
            })
            .collect()
    }

    fn n_processed(&self) -> usize {
        cmp::min(self.objects.len(), self.take)
    }

    fn rating_calculator(&self) -> DroidRatingCalculator<'_> {
        DroidRatingCalculator::new(
            &self.mods,
            self.attrs.n_objects(),
            self.attrs.ar,
            self.attrs.od,
        )
    }

    fn aim_values(&self, diff_objects: &[DroidDifficultyObject<'_>]) -> AimValues {
        let mut aim = Strain::new(DroidAim::new(true), DroidAim::CONFIG);
        let mut aim_no_sliders = Strain::new(DroidAim::new(false), DroidAim::CONFIG);

        aim.process_first(diff_objects, diff_objects.len());
        aim_no_sliders.process_first(diff_objects, diff_objects.len());

        let difficulty_value = aim.difficulty_value();
        let no_sliders_difficulty_value = aim_no_sliders.difficulty_value();

        let slider_factor = if difficulty_value > 0.0 {
            DroidRatingCalculator::calculate_mechanical_difficulty_rating(
                no_sliders_difficulty_value,
            ) / DroidRatingCalculator::calculate_mechanical_difficulty_rating(difficulty_value)
        } else {
            1.0
        };

        log::trace!("droid aim difficulty value {difficulty_value}, without sliders {no_sliders_difficulty_value}");

        AimValues {
            difficulty_value,
            difficult_strain_count: aim.count_top_weighted_strains(difficulty_value),
            difficult_slider_count: aim.inner().difficult_sliders(),
            slider_factor,
        }
    }

    fn tap_values(&self, diff_objects: &[DroidDifficultyObject<'_>]) -> TapValues {
        let mut tap = Strain::new(Tap::new(self.hit_window), Tap::CONFIG);
        tap.process_first(diff_objects, diff_objects.len());

        let difficulty_value = tap.difficulty_value();

        log::trace!("droid tap difficulty value {difficulty_value}");

        TapValues {
            difficulty_value,
            difficult_strain_count: tap.count_top_weighted_strains(difficulty_value),
            note_count: difficult_strain_count(tap.object_strains()),
            average_speed_delta_time: average_speed_delta_time(
                tap.object_strains(),
                tap.inner().delta_times(),
            ),
        }
    }

    fn rhythm_value(&self, diff_objects: &[DroidDifficultyObject<'_>]) -> f64 {
        let mut rhythm = Strain::new(Rhythm::new(self.hit_window), Rhythm::CONFIG);
        rhythm.process_first(diff_objects, diff_objects.len());

        let difficulty_value = rhythm.difficulty_value();
        log::trace!("droid rhythm difficulty value {difficulty_value}");

        difficulty_value
    }

    fn flashlight_value(&self, diff_objects: &[DroidDifficultyObject<'_>]) -> f64 {
        let evaluator = DroidFlashlightEvaluator::new(self.scaling_factor.radius, self.hidden);

        let mut flashlight =
            Strain::new(DroidFlashlight::new(evaluator), DroidFlashlight::CONFIG);
        flashlight.process_first(diff_objects, diff_objects.len());

        let difficulty_value = flashlight.difficulty_value();
        log::trace!("droid flashlight difficulty value {difficulty_value}");

        difficulty_value
    }

    fn visual_value(&self, diff_objects: &[DroidDifficultyObject<'_>]) -> f64 {
        let evaluator = VisualEvaluator::new(self.hidden, self.time_preempt, self.clock_rate);

        let mut visual = Strain::new(Visual::new(evaluator), Visual::CONFIG);
        visual.process_first(diff_objects, diff_objects.len());

        let difficulty_value = visual.difficulty_value();
        log::trace!("droid visual difficulty value {difficulty_value}");

        difficulty_value
    }
}

struct AimValues {
    difficulty_value: f64,
    difficult_strain_count: f64,
    difficult_slider_count: f64,
    slider_factor: f64,
}

impl AimValues {
    fn store(&self, attrs: &mut DroidDifficultyAttributes) {
        attrs.slider_factor = self.slider_factor;
        attrs.aim_difficult_strain_count = self.difficult_strain_count;
        attrs.aim_difficult_slider_count = self.difficult_slider_count;
    }
}

struct TapValues {
    difficulty_value: f64,
    difficult_strain_count: f64,
    note_count: f64,
    average_speed_delta_time: f64,
}

impl TapValues {
    fn store(&self, attrs: &mut DroidDifficultyAttributes) {
        attrs.speed_note_count = self.note_count;
        attrs.tap_difficult_strain_count = self.difficult_strain_count;
        attrs.average_speed_delta_time = self.average_speed_delta_time;
    }
}

/// Delta time averaged over the objects, weighted the same way as the
/// speed note count so that the hardest streams dominate.
fn average_speed_delta_time(strains: &[f64], delta_times: &[f64]) -> f64 {
    let max_strain = strains.iter().copied().fold(0.0, f64::max);

    if max_strain <= 0.0 {
        return 0.0;
    }

    let (weighted_sum, total_weight) = strains.iter().zip(delta_times).fold(
        (0.0, 0.0),
        |(sum, total), (strain, delta_time)| {
            let weight = (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip();

            (sum + delta_time * weight, total + weight)
        },
    );

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

fn star_rating(attrs: &DroidDifficultyAttributes) -> f64 {
    if attrs.n_objects() == 0 {
        return 0.0;
    }

    let base_performance = norm(
        1.1,
        [
            difficulty_to_performance(attrs.aim),
            difficulty_to_performance(attrs.tap),
            DroidFlashlight::difficulty_to_performance(attrs.flashlight),
            Visual::difficulty_to_performance(attrs.visual),
        ],
    );

    calculate_star_rating(base_performance)
}

/// Maps the combined base performance of all components onto the star
/// scale.
pub fn calculate_star_rating(base_performance: f64) -> f64 {
    if base_performance <= 0.00001 {
        return 0.0;
    }

    STAR_RATING_MULTIPLIER
        * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_rating_is_monotonic() {
        assert!(calculate_star_rating(0.0).eq(&0.0));
        assert!(calculate_star_rating(10.0) < calculate_star_rating(20.0));
    }

    #[test]
    fn average_delta_time_of_uniform_strains() {
        let average = average_speed_delta_time(&[2.0, 2.0, 2.0], &[100.0, 100.0, 100.0]);

        assert!((average - 100.0).abs() < 1e-9);
        assert!(average_speed_delta_time(&[], &[]).eq(&0.0));
    }

    #[test]
    fn hardest_strains_dominate_average() {
        let average = average_speed_delta_time(&[10.0, 1.0], &[80.0, 300.0]);

        assert!(average < 90.0);
    }
}
