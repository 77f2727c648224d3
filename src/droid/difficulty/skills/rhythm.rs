use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{strain_decay, StrainSkill, StrainSkillConfig},
    },
    droid::difficulty::{evaluators::DroidRhythmEvaluator, object::DroidDifficultyObject},
};

/// Difficulty of reading and keeping up with rhythm changes.
///
/// Only the part of the rhythm multiplier above `1.0` is accumulated so
/// that constant rhythms are worth nothing.
#[derive(Clone, Debug)]
pub struct Rhythm {
    great_window: f64,
    current_strain: f64,
}

impl Rhythm {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig::DEFAULT;

    const STRAIN_DECAY_BASE: f64 = 0.3;

    pub const fn new(great_window: f64) -> Self {
        Self {
            great_window,
            current_strain: 0.0,
        }
    }
}

impl StrainSkill for Rhythm {
    type DifficultyObject<'a> = DroidDifficultyObject<'a>;

    fn calculate_initial_strain<'a>(
        &mut self,
        time: f64,
        curr: &DroidDifficultyObject<'a>,
        objects: &[DroidDifficultyObject<'a>],
    ) -> f64 {
        let prev_start_time = curr
            .previous(0, objects)
            .map_or(0.0, HasStartTime::start_time);

        self.current_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &DroidDifficultyObject<'a>,
        objects: &[DroidDifficultyObject<'a>],
    ) -> f64 {
        let multiplier = DroidRhythmEvaluator::evaluate_diff_of(curr, objects, self.great_window);

        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += (multiplier - 1.0).max(0.0);

        self.current_strain
    }
}
