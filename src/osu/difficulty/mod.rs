use std::cmp;

use crate::{
    any::difficulty::{
        skills::{difficult_strain_count, difficulty_to_performance, Strain},
        Difficulty,
    },
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    osu::{
        attributes::OsuDifficultyAttributes,
        convert::convert_objects,
        object::OsuObject,
        performance::PERFORMANCE_BASE_MULTIPLIER,
    },
    util::difficulty::norm,
};

use self::{
    evaluators::FlashlightEvaluator,
    object::{HiddenFade, LazyTravel, OsuDifficultyObject},
    rating::OsuRatingCalculator,
    scaling_factor::ScalingFactor,
    skills::{count_top_weighted_sliders, Aim, Flashlight, Speed},
};

pub mod evaluators;
pub mod object;
pub mod rating;
pub mod scaling_factor;
pub mod skills;

const STAR_RATING_MULTIPLIER: f64 = 0.0265;

const HD_FADE_IN_DURATION_MULTIPLIER: f64 = 0.4;
const HD_FADE_OUT_DURATION_MULTIPLIER: f64 = 0.3;
const PARTIAL_VISIBILITY_MIN_OPACITY: f64 = 0.5;

/// Difficulty calculation of an osu!standard map.
///
/// Converting the map happens once in [`OsuDifficultyCalculator::new`] so
/// that single skills can be recalculated without redoing it.
pub struct OsuDifficultyCalculator {
    mods: GameMods,
    clock_rate: f64,
    take: usize,
    objects: Box<[OsuObject]>,
    travels: Box<[LazyTravel]>,
    scaling_factor: ScalingFactor,
    time_preempt: f64,
    hit_window: f64,
    attrs: OsuDifficultyAttributes,
}

impl OsuDifficultyCalculator {
    pub fn new(difficulty: &Difficulty, map: &Beatmap) -> Result<Self, ConvertError> {
        map.check_mode()?;

        let mods = difficulty.get_mods().clone();
        let clock_rate = difficulty.get_clock_rate();
        let take = difficulty.get_passed_objects();

        let map_attrs = map.attributes().difficulty(difficulty).build();
        let scaling_factor = ScalingFactor::new(map_attrs.cs);

        // Preempt in map time, stacking and opacity do not use the clock rate
        let time_preempt = f64::from((map_attrs.hit_windows.ar * clock_rate) as f32);

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

        let attrs = OsuDifficultyAttributes {
            ar: map_attrs.ar,
            od: map_attrs.od,
            hp: map_attrs.hp,
            great_hit_window: map_attrs.hit_windows.od_great,
            ok_hit_window: map_attrs.hit_windows.od_ok,
            meh_hit_window: map_attrs.hit_windows.od_meh,
            n_circles: counts.n_circles,
            n_sliders: counts.n_sliders,
            n_large_ticks: counts.n_large_ticks,
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
            hit_window: 2.0 * map_attrs.hit_windows.od_great,
            attrs,
        })
    }

    /// Calculate all skills and the star rating.
    pub fn calculate(&self) -> OsuDifficultyAttributes {
        let diff_objects = self.difficulty_objects();

        let aim = self.aim_values(&diff_objects);
        let speed = self.speed_values(&diff_objects);

        let mut attrs = self.attrs.clone();

        let rating = self.rating_calculator(&aim, &speed);

        attrs.aim = rating.compute_aim_rating(aim.difficulty_value);
        attrs.speed = rating.compute_speed_rating(speed.difficulty_value);
        attrs.flashlight = if self.mods.fl() {
            rating.compute_flashlight_rating(self.flashlight_value(&diff_objects))
        } else {
            0.0
        };

        aim.store(&mut attrs);
        speed.store(&mut attrs);

        attrs.stars = star_rating(&attrs);

        log::debug!(
            "osu! difficulty: aim={} speed={} flashlight={} stars={}",
            attrs.aim,
            attrs.speed,
            attrs.flashlight,
            attrs.stars
        );

        attrs
    }

    /// Recalculate the aim rating and everything derived from the aim
    /// strains.
    ///
    /// Speed strains are still required because the mechanical rating
    /// scales the reading bonus.
    pub fn recompute_aim(&self, attrs: &mut OsuDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();

        let aim = self.aim_values(&diff_objects);
        let speed = self.speed_values(&diff_objects);

        attrs.aim = self
            .rating_calculator(&aim, &speed)
            .compute_aim_rating(aim.difficulty_value);
        aim.store(attrs);
        attrs.stars = star_rating(attrs);
    }

    /// Recalculate the speed rating and everything derived from the speed
    /// strains.
    pub fn recompute_speed(&self, attrs: &mut OsuDifficultyAttributes) {
        let diff_objects = self.difficulty_objects();

        let aim = self.aim_values(&diff_objects);
        let speed = self.speed_values(&diff_objects);

        attrs.speed = self
            .rating_calculator(&aim, &speed)
            .compute_speed_rating(speed.difficulty_value);
        speed.store(attrs);
        attrs.stars = star_rating(attrs);
    }

    pub fn recompute_flashlight(&self, attrs: &mut OsuDifficultyAttributes) {
        attrs.flashlight = if self.mods.fl() {
            let diff_objects = self.difficulty_objects();
            let value = self.flashlight_value(&diff_objects);

            // Neither the mechanical rating nor the slider factor matter here
            OsuRatingCalculator::new(
                &self.mods,
                self.attrs.n_objects(),
                self.attrs.ar,
                self.attrs.od,
                0.0,
                1.0,
            )
            .compute_flashlight_rating(value)
        } else {
            0.0
        };

        attrs.stars = star_rating(attrs);
    }

    fn difficulty_objects(&self) -> Vec<OsuDifficultyObject<'_>> {
        if self.take == 0 {
            return Vec::new();
        }

        (1..self.objects.len())
            .map(|i| {
                OsuDifficultyObject::new(
                    &self.objects,
                    &self.travels,
                    i,
                    self.clock_rate,
                    &self.scaling_factor,
                )
            })
            .collect()
    }

    /// The first object has no difficulty object so one less is processed.
    fn n_processed(&self) -> usize {
        cmp::min(self.objects.len(), self.take).saturating_sub(1)
    }

    fn aim_values(&self, diff_objects: &[OsuDifficultyObject<'_>]) -> AimValues {
        let mut aim = Strain::new(Aim::new(true), Aim::CONFIG);
        let mut aim_no_sliders = Strain::new(Aim::new(false), Aim::CONFIG);

        aim.process_first(diff_objects, self.n_processed());
        aim_no_sliders.process_first(diff_objects, self.n_processed());

        let difficulty_value = aim.difficulty_value();
        let no_sliders_difficulty_value = aim_no_sliders.difficulty_value();

        let no_sliders_strain_count =
            aim_no_sliders.count_top_weighted_strains(no_sliders_difficulty_value);
        let no_sliders_slider_count = count_top_weighted_sliders(
            aim_no_sliders.inner().slider_strains(),
            no_sliders_difficulty_value,
        );

        let slider_factor = if difficulty_value > 0.0 {
            OsuRatingCalculator::calculate_difficulty_rating(no_sliders_difficulty_value)
                / OsuRatingCalculator::calculate_difficulty_rating(difficulty_value)
        } else {
            1.0
        };

        log::trace!("aim difficulty value {difficulty_value}, without sliders {no_sliders_difficulty_value}");

        AimValues {
            difficulty_value,
            difficult_strain_count: aim.count_top_weighted_strains(difficulty_value),
            difficult_slider_count: aim.inner().difficult_sliders(),
            top_weighted_slider_factor: no_sliders_slider_count
                / (no_sliders_strain_count - no_sliders_slider_count).max(1.0),
            slider_factor,
        }
    }

    fn speed_values(&self, diff_objects: &[OsuDifficultyObject<'_>]) -> SpeedValues {
        let mut speed = Strain::new(Speed::new(self.hit_window, self.mods.ap()), Speed::CONFIG);
        speed.process_first(diff_objects, self.n_processed());

        let difficulty_value = speed.difficulty_value();
        let top_weighted_count = speed.count_top_weighted_strains(difficulty_value);
        let slider_count =
            count_top_weighted_sliders(speed.inner().slider_strains(), difficulty_value);

        log::trace!("speed difficulty value {difficulty_value}");

        SpeedValues {
            difficulty_value,
            difficult_strain_count: top_weighted_count,
            top_weighted_slider_factor: slider_count
                / (top_weighted_count - slider_count).max(1.0),
            note_count: difficult_strain_count(speed.object_strains()),
        }
    }

    fn flashlight_value(&self, diff_objects: &[OsuDifficultyObject<'_>]) -> f64 {
        let time_fade_in = if self.mods.hd() {
            self.time_preempt * HD_FADE_IN_DURATION_MULTIPLIER
        } else {
            // Keeps AR above 10 from shortening the fade-in
            400.0 * (self.time_preempt / OsuObject::PREEMPT_MIN).min(1.0)
        };

        let hidden = HiddenFade::from_mods(
            &self.mods,
            HD_FADE_OUT_DURATION_MULTIPLIER,
            PARTIAL_VISIBILITY_MIN_OPACITY,
        );

        let evaluator = FlashlightEvaluator::new(
            self.scaling_factor.radius,
            self.time_preempt,
            time_fade_in,
            hidden,
        );

        let mut flashlight = Strain::new(Flashlight::new(evaluator), Flashlight::CONFIG);
        flashlight.process_first(diff_objects, self.n_processed());

        let difficulty_value = flashlight.difficulty_value();
        log::trace!("flashlight difficulty value {difficulty_value}");

        difficulty_value
    }

    fn rating_calculator(&self, aim: &AimValues, speed: &SpeedValues) -> OsuRatingCalculator<'_> {
        OsuRatingCalculator::new(
            &self.mods,
            self.attrs.n_objects(),
            self.attrs.ar,
            self.attrs.od,
            mechanical_difficulty_rating(aim.difficulty_value, speed.difficulty_value),
            aim.slider_factor,
        )
    }
}

struct AimValues {
    difficulty_value: f64,
    difficult_strain_count: f64,
    difficult_slider_count: f64,
    top_weighted_slider_factor: f64,
    slider_factor: f64,
}

impl AimValues {
    fn store(&self, attrs: &mut OsuDifficultyAttributes) {
        attrs.slider_factor = self.slider_factor;
        attrs.aim_difficult_strain_count = self.difficult_strain_count;
        attrs.aim_difficult_slider_count = self.difficult_slider_count;
        attrs.aim_top_weighted_slider_factor = self.top_weighted_slider_factor;
    }
}

struct SpeedValues {
    difficulty_value: f64,
    difficult_strain_count: f64,
    top_weighted_slider_factor: f64,
    note_count: f64,
}

impl SpeedValues {
    fn store(&self, attrs: &mut OsuDifficultyAttributes) {
        attrs.speed_note_count = self.note_count;
        attrs.speed_difficult_strain_count = self.difficult_strain_count;
        attrs.speed_top_weighted_slider_factor = self.top_weighted_slider_factor;
    }
}

/// Star rating of aim and speed alone, computed from unmodified ratings.
fn mechanical_difficulty_rating(aim_difficulty_value: f64, speed_difficulty_value: f64) -> f64 {
    let aim = difficulty_to_performance(OsuRatingCalculator::calculate_difficulty_rating(
        aim_difficulty_value,
    ));
    let speed = difficulty_to_performance(OsuRatingCalculator::calculate_difficulty_rating(
        speed_difficulty_value,
    ));

    calculate_star_rating(norm(1.1, [aim, speed]))
}

fn star_rating(attrs: &OsuDifficultyAttributes) -> f64 {
    if attrs.n_objects() == 0 {
        return 0.0;
    }

    let base_performance = norm(
        1.1,
        [
            difficulty_to_performance(attrs.aim),
            difficulty_to_performance(attrs.speed),
            Flashlight::difficulty_to_performance(attrs.flashlight),
        ],
    );

    calculate_star_rating(base_performance)
}

/// Maps the combined base performance onto the star scale.
pub fn calculate_star_rating(base_performance: f64) -> f64 {
    if base_performance <= 0.00001 {
        return 0.0;
    }

    PERFORMANCE_BASE_MULTIPLIER.cbrt()
        * STAR_RATING_MULTIPLIER
        * ((100_000.0 / 2.0_f64.powf(1.0 / 1.1) * base_performance).cbrt() + 4.0)
}
