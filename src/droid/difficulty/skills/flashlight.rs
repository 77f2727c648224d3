use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{strain_decay, StrainSkill, StrainSkillConfig},
    },
    droid::difficulty::{evaluators::DroidFlashlightEvaluator, object::DroidDifficultyObject},
};

pub struct DroidFlashlight {
    current_strain: f64,
    evaluator: DroidFlashlightEvaluator,
}

impl DroidFlashlight {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig {
        decay_weight: 1.0,
        ..StrainSkillConfig::DEFAULT
    };

    const SKILL_MULTIPLIER: f64 = 0.05512;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub const fn new(evaluator: DroidFlashlightEvaluator) -> Self {
        Self {
            current_strain: 0.0,
            evaluator,
        }
    }

    pub fn difficulty_to_performance(difficulty: f64) -> f64 {
        25.0 * difficulty.powf(1.6)
    }
}

impl StrainSkill for DroidFlashlight {
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
        self.current_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.current_strain +=
            self.evaluator.evaluate_diff_of(curr, objects) * Self::SKILL_MULTIPLIER;

        self.current_strain
    }
}
