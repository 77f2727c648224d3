use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{
    any::difficulty::Difficulty,
    droid::{difficulty::DroidDifficultyCalculator, performance::DroidPerformance},
    model::{beatmap::Beatmap, mode::ConvertError},
};

/// The result of a difficulty calculation for osu!droid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DroidDifficultyAttributes {
    /// The difficulty of the aim skill.
    pub aim: f64,
    /// The number of sliders weighted by difficulty.
    pub aim_difficult_slider_count: f64,
    /// The difficulty of the tap skill.
    pub tap: f64,
    /// The difficulty of the rhythm skill.
    pub rhythm: f64,
    /// The difficulty of the flashlight skill.
    pub flashlight: f64,
    /// The difficulty of the visual skill.
    pub visual: f64,
    /// The ratio of the aim strain with and without considering sliders
    pub slider_factor: f64,
    /// The number of tappable objects weighted by difficulty.
    pub speed_note_count: f64,
    /// Delta time between objects, weighted towards the hardest streams.
    pub average_speed_delta_time: f64,
    /// Weighted sum of aim strains.
    pub aim_difficult_strain_count: f64,
    /// Weighted sum of tap strains.
    pub tap_difficult_strain_count: f64,
    /// The approach rate.
    pub ar: f64,
    /// The osu!standard overall difficulty with the same great hit window.
    pub od: f64,
    /// The osu!droid hit window for a 300 inclusive of rate-adjusting mods.
    pub great_hit_window: f64,
    /// The osu!droid hit window for a 100 inclusive of rate-adjusting mods.
    pub ok_hit_window: f64,
    /// The osu!droid hit window for a 50 inclusive of rate-adjusting mods.
    pub meh_hit_window: f64,
    /// The amount of circles.
    pub n_circles: u32,
    /// The amount of sliders.
    pub n_sliders: u32,
    /// The amount of spinners.
    pub n_spinners: u32,
    /// The final star rating.
    pub stars: f64,
    /// The maximum combo.
    pub max_combo: u32,
}

impl DroidDifficultyAttributes {
    /// Return the maximum combo.
    pub const fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.n_circles + self.n_sliders + self.n_spinners
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> DroidPerformance<'a> {
        self.into()
    }

    /// Recalculate the aim rating for the given settings.
    ///
    /// Only aim related fields and the star rating are replaced.
    pub fn recompute_aim(
        &mut self,
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<(), ConvertError> {
        DroidDifficultyCalculator::new(difficulty, map)?.recompute_aim(self);

        Ok(())
    }

    /// Recalculate the tap rating for the given settings.
    ///
    /// Only tap related fields and the star rating are replaced.
    pub fn recompute_tap(
        &mut self,
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<(), ConvertError> {
        DroidDifficultyCalculator::new(difficulty, map)?.recompute_tap(self);

        Ok(())
    }

    pub fn recompute_rhythm(
        &mut self,
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<(), ConvertError> {
        DroidDifficultyCalculator::new(difficulty, map)?.recompute_rhythm(self);

        Ok(())
    }

    pub fn recompute_flashlight(
        &mut self,
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<(), ConvertError> {
        DroidDifficultyCalculator::new(difficulty, map)?.recompute_flashlight(self);

        Ok(())
    }

    pub fn recompute_visual(
        &mut self,
        difficulty: &Difficulty,
        map: &Beatmap,
    ) -> Result<(), ConvertError> {
        DroidDifficultyCalculator::new(difficulty, map)?.recompute_visual(self);

        Ok(())
    }
}

/// The result of a performance calculation for osu!droid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DroidPerformanceAttributes {
    /// The difficulty attributes that were used for the performance calculation
    pub difficulty: DroidDifficultyAttributes,
    /// The final performance points.
    pub pp: f64,
    /// The aim portion of the final pp.
    pub pp_aim: f64,
    /// The tap portion of the final pp.
    pub pp_tap: f64,
    /// The accuracy portion of the final pp.
    pub pp_accuracy: f64,
    /// The flashlight portion of the final pp.
    pub pp_flashlight: f64,
    /// The visual portion of the final pp.
    pub pp_visual: f64,
    /// Misses including an approximated amount of slider breaks
    pub effective_miss_count: f64,
    /// Estimated hit error deviation over all circles.
    pub deviation: Option<f64>,
    /// Estimated hit error deviation over the tapped notes.
    pub tap_deviation: Option<f64>,
}

impl DroidPerformanceAttributes {
    /// Return the star value.
    pub const fn stars(&self) -> f64 {
        self.difficulty.stars
    }

    /// Return the performance point value.
    pub const fn pp(&self) -> f64 {
        self.pp
    }

    /// Return the maximum combo of the map.
    pub const fn max_combo(&self) -> u32 {
        self.difficulty.max_combo
    }

    /// Return the amount of hitobjects.
    pub const fn n_objects(&self) -> u32 {
        self.difficulty.n_objects()
    }

    /// Returns a builder for performance calculation.
    pub fn performance<'a>(self) -> DroidPerformance<'a> {
        self.difficulty.into()
    }
}

impl From<DroidPerformanceAttributes> for DroidDifficultyAttributes {
    fn from(attributes: DroidPerformanceAttributes) -> Self {
        attributes.difficulty
    }
}

impl Display for DroidPerformanceAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{:.2} pp ({:.2} aim, {:.2} tap, {:.2} acc, {:.2} flashlight, {:.2} visual)",
            self.pp, self.pp_aim, self.pp_tap, self.pp_accuracy, self.pp_flashlight, self.pp_visual
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_has_two_decimals() {
        let attrs = DroidPerformanceAttributes {
            pp: 123.456,
            pp_aim: 50.0,
            pp_tap: 40.126,
            pp_accuracy: 20.0,
            pp_flashlight: 0.0,
            pp_visual: 9.999,
            ..Default::default()
        };

        assert_eq!(
            attrs.to_string(),
            "123.46 pp (50.00 aim, 40.13 tap, 20.00 acc, 0.00 flashlight, 10.00 visual)"
        );
    }
}
