use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{difficult_strain_count, strain_decay, StrainSkill, StrainSkillConfig},
    },
    droid::difficulty::{evaluators::DroidAimEvaluator, object::DroidDifficultyObject},
};

#[derive(Clone, Debug)]
pub struct DroidAim {
    with_sliders: bool,
    current_strain: f64,
    slider_strains: Vec<f64>,
}

impl DroidAim {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig::reduced(10);

    const SKILL_MULTIPLIER: f64 = 3.65;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(with_sliders: bool) -> Self {
        Self {
            with_sliders,
            current_strain: 0.0,
            slider_strains: Vec::with_capacity(64),
        }
    }

    pub fn difficult_sliders(&self) -> f64 {
        difficult_strain_count(&self.slider_strains)
    }
}

impl StrainSkill for DroidAim {
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
            DroidAimEvaluator::evaluate_diff_of(curr, objects, self.with_sliders)
                * Self::SKILL_MULTIPLIER;

        if curr.base.is_slider() {
            self.slider_strains.push(self.current_strain);
        }

        self.current_strain
    }
}
