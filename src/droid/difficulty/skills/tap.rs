use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{strain_decay, StrainSkill, StrainSkillConfig},
    },
    droid::difficulty::{
        evaluators::{DroidRhythmEvaluator, TapEvaluator},
        object::DroidDifficultyObject,
    },
};

/// Tapping speed, scaled by rhythm complexity.
#[derive(Clone, Debug)]
pub struct Tap {
    great_window: f64,
    current_strain: f64,
    current_rhythm: f64,
    delta_times: Vec<f64>,
}

impl Tap {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig::reduced(5);

    const SKILL_MULTIPLIER: f64 = 0.21;
    const STRAIN_DECAY_BASE: f64 = 0.3;

    pub fn new(great_window: f64) -> Self {
        Self {
            great_window,
            current_strain: 0.0,
            current_rhythm: 0.0,
            delta_times: Vec::with_capacity(256),
        }
    }

    /// Delta time of each processed object, aligned with the object
    /// strains.
    pub fn delta_times(&self) -> &[f64] {
        &self.delta_times
    }
}

impl StrainSkill for Tap {
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

        self.current_strain
            * self.current_rhythm
            * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &DroidDifficultyObject<'a>,
        objects: &[DroidDifficultyObject<'a>],
    ) -> f64 {
        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += TapEvaluator::evaluate_diff_of(curr, objects, self.great_window)
            * Self::SKILL_MULTIPLIER;
        self.current_rhythm =
            DroidRhythmEvaluator::evaluate_diff_of(curr, objects, self.great_window);

        self.delta_times.push(curr.delta_time);

        self.current_strain * self.current_rhythm
    }
}
