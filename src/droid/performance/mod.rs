use std::cmp;

use self::calculator::DroidPerformanceCalculator;
pub use self::calculator::FINAL_MULTIPLIER;

use crate::{
    any::{score_state::ScoreInput, Difficulty, HitResultPriority, ScoreState},
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    util::map_or_attrs::MapOrAttrs,
};

use super::attributes::{DroidDifficultyAttributes, DroidPerformanceAttributes};

mod calculator;

/// Penalties from analyzing the replay of a play.
///
/// Each penalty divides its component's pp once that value has been
/// computed. Values below `1.0` are treated as `1.0`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DroidPenalties {
    /// Penalty for tapping a stream with more than one finger per note.
    pub tap: f64,
    /// Penalty for sliders that were cheesed in the aim skill.
    pub aim_slider_cheese: f64,
    /// Penalty for sliders that were cheesed in the flashlight skill.
    pub flashlight_slider_cheese: f64,
    /// Penalty for sliders that were cheesed in the visual skill.
    pub visual_slider_cheese: f64,
}

impl DroidPenalties {
    pub const NONE: Self = Self {
        tap: 1.0,
        aim_slider_cheese: 1.0,
        flashlight_slider_cheese: 1.0,
        visual_slider_cheese: 1.0,
    };

    pub const fn tap(self, tap: f64) -> Self {
        Self { tap, ..self }
    }

    pub const fn aim_slider_cheese(self, aim_slider_cheese: f64) -> Self {
        Self {
            aim_slider_cheese,
            ..self
        }
    }

    pub const fn flashlight_slider_cheese(self, flashlight_slider_cheese: f64) -> Self {
        Self {
            flashlight_slider_cheese,
            ..self
        }
    }

    pub const fn visual_slider_cheese(self, visual_slider_cheese: f64) -> Self {
        Self {
            visual_slider_cheese,
            ..self
        }
    }
}

impl Default for DroidPenalties {
    fn default() -> Self {
        Self::NONE
    }
}

/// Performance calculator for osu!droid.
///
/// # Example
///
/// ```
/// use rosu_droid_pp::{droid::{DroidPenalties, DroidPerformance}, Beatmap};
///
/// let map = Beatmap::default();
///
/// let attrs = DroidPerformance::new(&map)
///     .mods(8) // HD
///     .accuracy(97.3)
///     .misses(2)
///     .penalties(DroidPenalties::NONE.tap(1.2))
///     .calculate()
///     .unwrap();
///
/// assert_eq!(attrs.pp, 0.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct DroidPerformance<'map> {
    pub(crate) map_or_attrs: MapOrAttrs<'map, DroidDifficultyAttributes>,
    pub(crate) difficulty: Difficulty,
    pub(crate) acc: Option<f64>,
    pub(crate) combo: Option<u32>,
    pub(crate) n300: Option<u32>,
    pub(crate) n100: Option<u32>,
    pub(crate) n50: Option<u32>,
    pub(crate) misses: Option<u32>,
    pub(crate) hitresult_priority: HitResultPriority,
    pub(crate) penalties: DroidPenalties,
}

impl<'map> DroidPerformance<'map> {
    /// Create a new performance calculator for osu!droid.
    ///
    /// The argument `map_or_attrs` must be either
    /// - previously calculated attributes ([`DroidDifficultyAttributes`]
    ///   or [`DroidPerformanceAttributes`])
    /// - a [`Beatmap`] (by reference or value)
    ///
    /// Attributes must stem from the same map and [`Difficulty`] settings,
    /// they are not validated.
    pub fn new(map_or_attrs: impl Into<MapOrAttrs<'map, DroidDifficultyAttributes>>) -> Self {
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

    pub fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.difficulty = self.difficulty.passed_objects(passed_objects);

        self
    }

    pub fn clock_rate(mut self, clock_rate: f64) -> Self {
        self.difficulty = self.difficulty.clock_rate(clock_rate);

        self
    }

    /// Override a beatmap's set AR.
    ///
    /// With `fixed` the value is used as is, otherwise mods still adjust
    /// it.
    pub fn ar(mut self, ar: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.ar(ar, fixed);

        self
    }

    pub fn cs(mut self, cs: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.cs(cs, fixed);

        self
    }

    pub fn hp(mut self, hp: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.hp(hp, fixed);

        self
    }

    /// Override a beatmap's set OD.
    ///
    /// A fixed OD also ignores the clock rate for the hit windows.
    pub fn od(mut self, od: f32, fixed: bool) -> Self {
        self.difficulty = self.difficulty.od(od, fixed);

        self
    }

    pub const fn combo(mut self, combo: u32) -> Self {
        self.combo = Some(combo);

        self
    }

    pub const fn hitresult_priority(mut self, priority: HitResultPriority) -> Self {
        self.hitresult_priority = priority;

        self
    }

    pub const fn n300(mut self, n300: u32) -> Self {
        self.n300 = Some(n300);

        self
    }

    pub const fn n100(mut self, n100: u32) -> Self {
        self.n100 = Some(n100);

        self
    }

    pub const fn n50(mut self, n50: u32) -> Self {
        self.n50 = Some(n50);

        self
    }

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
    pub fn accuracy(mut self, acc: f64) -> Self {
        self.acc = Some(acc.clamp(0.0, 100.0) / 100.0);

        self
    }

    /// Penalties of a replay analysis.
    pub const fn penalties(mut self, penalties: DroidPenalties) -> Self {
        self.penalties = penalties;

        self
    }

    /// Create the [`ScoreState`] that will be used for performance calculation.
    pub fn generate_state(&mut self) -> Result<ScoreState, ConvertError> {
        let attrs = match self.map_or_attrs {
            MapOrAttrs::Map(ref map) => {
                let attrs = self.difficulty.calculate_droid(map)?;

                self.map_or_attrs.insert_attrs(attrs)
            }
            MapOrAttrs::Attrs(ref attrs) => attrs,
        };

        let passed_objects =
            u32::try_from(self.difficulty.get_passed_objects()).unwrap_or(u32::MAX);

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
    pub fn calculate(mut self) -> Result<DroidPerformanceAttributes, ConvertError> {
        let state = self.generate_state()?;

        let attrs = match self.map_or_attrs {
            MapOrAttrs::Attrs(attrs) => attrs,
            MapOrAttrs::Map(ref map) => self.difficulty.calculate_droid(map)?,
        };

        let effective_miss_count = effective_miss_count(&attrs, &state);

        let inner = DroidPerformanceCalculator::new(
            attrs,
            self.difficulty.get_mods(),
            state.accuracy(),
            state,
            effective_miss_count,
            self.penalties,
        );

        Ok(inner.calculate())
    }

    pub(crate) const fn from_map_or_attrs(
        map_or_attrs: MapOrAttrs<'map, DroidDifficultyAttributes>,
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
            penalties: DroidPenalties::NONE,
        }
    }
}

impl<'map> From<&'map Beatmap> for DroidPerformance<'map> {
    fn from(map: &'map Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<Beatmap> for DroidPerformance<'_> {
    fn from(map: Beatmap) -> Self {
        Self::new(map)
    }
}

impl From<DroidDifficultyAttributes> for DroidPerformance<'_> {
    fn from(attrs: DroidDifficultyAttributes) -> Self {
        Self::new(attrs)
    }
}

impl From<DroidPerformanceAttributes> for DroidPerformance<'_> {
    fn from(attrs: DroidPerformanceAttributes) -> Self {
        Self::new(attrs)
    }
}

/// Misses plus slider breaks estimated from the combo.
fn effective_miss_count(attrs: &DroidDifficultyAttributes, state: &ScoreState) -> f64 {
    let mut effective_miss_count = f64::from(state.misses);

    if attrs.n_sliders > 0 {
        let full_combo_threshold = f64::from(attrs.max_combo) - 0.1 * f64::from(attrs.n_sliders);

        if f64::from(state.max_combo) < full_combo_threshold {
            effective_miss_count = full_combo_threshold / f64::from(state.max_combo).max(1.0);
        }

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

    fn attrs() -> DroidDifficultyAttributes {
        DroidDifficultyAttributes {
            aim: 2.5,
            tap: 2.0,
            visual: 1.0,
            od: 5.0,
            speed_note_count: 100.0,
            aim_difficult_strain_count: 50.0,
            tap_difficult_strain_count: 40.0,
            n_circles: 200,
            n_sliders: 100,
            n_spinners: 1,
            max_combo: 450,
            ..Default::default()
        }
    }

    #[test]
    fn accuracy_generates_hitresults() {
        let state = DroidPerformance::from(attrs())
            .accuracy(95.0)
            .misses(1)
            .generate_state()
            .unwrap();

        assert_eq!(state.total_hits(), 301);
        assert_eq!(state.misses, 1);
        assert!((state.accuracy() - 0.95).abs() < 0.01);
    }

    #[test]
    fn combo_shortfall_counts_as_misses() {
        let attrs = attrs();

        let state = ScoreState {
            max_combo: 100,
            n300: 290,
            n100: 11,
            ..ScoreState::new()
        };

        let estimate = effective_miss_count(&attrs, &state);

        assert!(estimate > 0.0);
        assert!(estimate <= 11.0);
        assert!(estimate.is_finite());
    }

    #[test]
    fn zero_combo_stays_finite() {
        let attrs = attrs();

        let state = ScoreState {
            max_combo: 0,
            n300: 0,
            n100: 0,
            n50: 300,
            misses: 1,
        };

        let estimate = effective_miss_count(&attrs, &state);

        assert!(estimate.is_finite());
        assert!(estimate >= 1.0);
    }

    #[test]
    fn penalties_are_passed_on() {
        let perf = DroidPerformance::from(attrs())
            .penalties(DroidPenalties::NONE.tap(2.0))
            .calculate()
            .unwrap();

        let plain = DroidPerformance::from(attrs()).calculate().unwrap();

        assert!(perf.pp_tap < plain.pp_tap);
        assert_eq!(perf.pp_aim.to_bits(), plain.pp_aim.to_bits());
    }

    #[test]
    fn lower_od_gives_less_pp() {
        let high = DroidPerformance::from(DroidDifficultyAttributes { od: 1.0, ..attrs() })
            .calculate()
            .unwrap();
        let low = DroidPerformance::from(DroidDifficultyAttributes { od: -1.0, ..attrs() })
            .calculate()
            .unwrap();

        assert!(low.pp_aim < high.pp_aim);
        assert!(low.pp_tap < high.pp_tap);
    }
}
