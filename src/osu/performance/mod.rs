use std::cmp;

use self::calculator::OsuPerformanceCalculator;
pub use self::calculator::PERFORMANCE_BASE_MULTIPLIER;
pub(crate) use self::calculator::{
    calculate_miss_penalty, estimate_deviation, great_probability_lower_bound,
};

use crate::{
    any::{score_state::ScoreInput, Difficulty, HitResultPriority, ScoreState},
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    util::map_or_attrs::MapOrAttrs,
};

use super::attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes};

mod calculator;

/// Performance calculator on osu!standard maps.
///
/// # Example
///
/// ```
/// use rosu_droid_pp::{osu::OsuPerformance, Beatmap};
///
/// let map = Beatmap::default();
///
/// let attrs = OsuPerformance::new(&map)
///     .mods(8 + 64) // HDDT
///     .accuracy(98.5)
///     .misses(1)
///     .calculate()
///     .unwrap();
///
/// assert_eq!(attrs.pp, 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct OsuPerformance<'map> {
    pub(crate) map_or_attrs: MapOrAttrs<'map, OsuDifficultyAttributes>,
    pub(crate) difficulty: Difficulty,
    pub(crate) acc: Option<f64>,
    pub(crate) combo: Option<u32>,
    pub(crate) n300: Option<u32>,
    pub(crate) n100: Option<u32>,
    pub(crate) n50: Option<u32>,
    pub(crate) misses: Option<u32>,
    pub(crate) hitresult_priority: HitResultPriority,
}

impl<'map> OsuPerformance<'map> {
    /// Create a new performance calculator for osu! maps.
    ///
    /// The argument `map_or_attrs` must be either
    /// - previously calculated attributes ([`OsuDifficultyAttributes`]
    ///   or [`OsuPerformanceAttributes`])
    /// - a [`Beatmap`] (by reference or value)
    ///
    /// If a map is given, difficulty attributes will need to be calculated
    /// internally which is a costly operation. Hence, passing attributes
    /// should be prefered.
    ///
    /// However, when passing previously calculated attributes, make sure they
    /// have been calculated for the same map and [`Difficulty`] settings.
    /// Otherwise, the final attributes will be incorrect.
    pub fn new(map_or_attrs: impl Into<MapOrAttrs<'map, OsuDifficultyAttributes>>) -> Self {
        Self::from_map_or_attrs(map_or_attrs.into())
    }

    /// Specify mods.
    ///
    /// Accepted types are
    /// - `u32`
    /// - [`rosu_mods::GameModsLegacy`]
    /// - [`rosu_mods::GameMods`]
    /// - [`rosu_mods::GameModsIntermode`]
    /// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
    pub fn mods(mut self, mods: impl Into<GameMods>) -> Self {
        self.difficulty = self.difficulty.mods(mods);

        self
    }

    /// Use the specified settings of the given [`Difficulty`].
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;

        self
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.difficulty = self.difficulty.passed_objects(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.difficulty = self.difficulty.clock_rate(clock_rate);

        self
    }

    /// Override a beatmap's set AR.
    ///
    /// `fixed` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    pub fn ar(mut self, ar: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.ar(ar, fixed);

        self
    }

    /// Override a beatmap's set CS.
    pub fn cs(mut self, cs: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.cs(cs, fixed);

        self
    }

    /// Override a beatmap's set HP.
    pub fn hp(mut self, hp: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.hp(hp, fixed);

        self
    }

    /// Override a beatmap's set OD.
    pub fn od(mut self, od: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.od(od, fixed);

        self
    }

    /// Specify the max combo of the play.
    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    /// Specify the priority of hitresults.
    ///
    /// `HitResultPriority::BestCase` sacrifices 300s and n100s to reduce n50s.
    /// `HitResultPriority::WorstCase` does the opposite.
    pub const fn hitresult_priority(mut self, priority: HitResultPriority) -> Self {
        self.hitresult_priority = priority;

        self
    }

    /// Specify the amount of 300s of a play.
    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    /// Specify the amount of 100s of a play.
    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    /// Specify the amount of 50s of a play.
    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

    /// Specify the amount of misses of a play.
    pub const fn misses(mut self, n_misses: u32) -> Self {
        self.misses = Some(n_misses);

        self
    }

    /// Provide parameters through a [`ScoreState`].
    pub const fn state(mut self, state: ScoreState) -> Self {
        let ScoreState {
            max_combo,
            n300,
            n100,
            n50,
            misses,
        } = state;

        self.combo = Some(max_combo);
        self.n300 = Some(n300);
        self.n100 = Some(n100);
        self.n50 = Some(n50);
        self.misses = Some(misses);

        self
    }

    /// Specify the accuracy of a play between `0.0` and `100.0`.
    /// This will be used to generate matching hitresults.
    pub fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc.clamp(0.0, 100.0) / 100.0);

        self
    }

    /// Create the [`ScoreState`] that will be used for performance calculation.
    ///
    /// If a beatmap was given, its difficulty attributes are calculated and
    /// kept for later.
    pub fn generate_state(&mut self) -> Result<ScoreState, ConvertError> {
        let attrs = match self.map_or_attrs {
            MapOrAttrs::Map(ref map) => {
                let attrs = self.difficulty.calculate_osu(map)?;

                self.map_or_attrs.insert_attrs(attrs)
            }
            MapOrAttrs::Attrs(ref attrs) => attrs,
        };

        let passed_objects = u32::try_from(self.difficulty.get_passed_objects()).unwrap_or(u32::MAX);

        let state = ScoreInput {
            n_objects: cmp::min(passed_objects, attrs.n_objects()),
            max_combo: attrs.max_combo,
            acc: self.acc,
            combo: self.combo,
            n300: self.n300,
            n100: self.n100,
            n50: self.n50,
            misses: self.misses,
            priority: self.hitresult_priority,
        }
        .generate_state();

        self.combo = Some(state.max_combo);
        self.n300 = Some(state.n300);
        self.n100 = Some(state.n100);
        self.n50 = Some(state.n50);
        self.misses = Some(state.misses);

        Ok(state)
    }

    /// Calculate all performance related values, including pp and stars.
    pub fn calculate(mut self) -> Result<OsuPerformanceAttributes, ConvertError> {
        let state = self.generate_state()?;

        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(attrs) => attrs,
            MapOrAttrs::Map(ref map) => self.difficulty.calculate_osu(map)?,
        };

        let effective_miss_count = effective_miss_count(&attrs, &state);
        let acc = state.accuracy();

        let inner = OsuPerformanceCalculator::new(
            attrs,
            self.difficulty.get_mods(),
            acc,
            state,
            effective_miss_count,
        );

        Ok(inner.calculate())
    }

    pub(crate) const fn from_map_or_attrs(
        map_or_attrs: MapOrAttrs<'map, OsuDifficultyAttributes>,
    ) -> Self {
        Self {
            map_or_attrs,
            difficulty: Difficulty::new(),
            acc: None,
            combo: None,
            n300: None,
            n100: None,
            n50: None,
            misses: None,
            hitresult_priority: HitResultPriority::DEFAULT,
        }
    }
}

impl<'map> From<&'map Beatmap> for OsuPerformance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<Beatmap> for OsuPerformance<'_> {
    fn from(map: Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<OsuDifficultyAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuDifficultyAttributes) -> Self {
        Self::new(attrs)
    }
}

impl From<OsuPerformanceAttributes> for OsuPerformance<'_> {
    fn from(attrs: OsuPerformanceAttributes) -> Self {
        Self::new(attrs)
    }
}

/// Misses plus an estimate of slider breaks based on the combo.
///
/// Slider tails neither give nor break combo so a tenth of all sliders is
/// assumed to have been dropped even on a full combo.
fn effective_miss_count(attrs: &OsuDifficultyAttributes, state: &ScoreState) -> f64 {
    let mut effective_miss_count = f64::from(state.misses);

    if attrs.n_sliders > 0 {
        let full_combo_threshold = f64::from(attrs.max_combo) - 0.1 * f64::from(attrs.n_sliders);

        if f64::from(state.max_combo) < full_combo_threshold {
            effective_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
        }

        // Can't be more misses than imperfect judgements
        effective_miss_count =
            effective_miss_count.min(f64::from(state.n100 + state.n50 + state.misses));
    }

    effective_miss_count
        .max(f64::from(state.misses))
        .min(f64::from(state.total_hits()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs() -> OsuDifficultyAttributes {
        OsuDifficultyAttributes {
            n_circles: 307,
            n_sliders: 293,
            n_spinners: 1,
            max_combo: 909,
            ..Default::default()
        }
    }

    #[test]
    fn hitresults_n300_n100_misses_best() {
        let state = OsuPerformance::from(attrs())
            .combo(500)
            .n300(300)
            .n100(20)
            .misses(2)
            .hitresult_priority(HitResultPriority::BestCase)
            .generate_state()
            .unwrap();

        let expected = ScoreState {
            max_combo: 500,
            n300: 300,
            n100: 20,
            n50: 279,
            misses: 2,
        };

        assert_eq!(state, expected);
    }

    #[test]
    fn hitresults_n50_misses_worst() {
        let state = OsuPerformance::from(attrs())
            .combo(500)
            .n50(10)
            .misses(2)
            .hitresult_priority(HitResultPriority::WorstCase)
            .generate_state()
            .unwrap();

        assert_eq!(state.n300, 0);
        assert_eq!(state.n100, 589);
        assert_eq!(state.n50, 10);
    }

    #[test]
    fn passed_objects_limit_hits() {
        let state = OsuPerformance::from(attrs())
            .passed_objects(100)
            .generate_state()
            .unwrap();

        assert_eq!(state.total_hits(), 100);
    }

    #[test]
    fn effective_misses_from_combo() {
        let attrs = attrs();

        let fc = ScoreState {
            max_combo: 909,
            n300: 601,
            ..ScoreState::new()
        };

        let broken = ScoreState {
            max_combo: 300,
            n300: 590,
            n100: 11,
            ..ScoreState::new()
        };

        assert!(effective_miss_count(&attrs, &fc).abs() < f64::EPSILON);

        let estimate = effective_miss_count(&attrs, &broken);
        assert!(estimate > 0.0 && estimate <= 11.0);
    }

    #[test]
    fn create() {
        let map = Beatmap::default();

        let _ = OsuPerformance::new(OsuDifficultyAttributes::default());
        let _ = OsuPerformance::new(OsuPerformanceAttributes::default());
        let _ = OsuPerformance::new(&map);
        let _ = OsuPerformance::new(map.clone());

        let _ = OsuPerformance::from(OsuDifficultyAttributes::default());
        let _ = OsuPerformance::from(&map);

        let _ = OsuDifficultyAttributes::default().performance();
        let _ = OsuPerformanceAttributes::default().performance();
    }
}
