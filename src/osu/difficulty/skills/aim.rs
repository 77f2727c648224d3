use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{difficult_strain_count, strain_decay, StrainSkill, StrainSkillConfig},
    },
    osu::difficulty::{evaluators::AimEvaluator, object::OsuDifficultyObject},
};

#[derive(Clone, Debug)]
pub struct Aim {
    include_sliders: bool,
    current_strain: f64,
    slider_strains: Vec<f64>,
}

impl Aim {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig::reduced(10);

    const SKILL_MULTIPLIER: f64 = 26.0;
    const STRAIN_DECAY_BASE: f64 = 0.15;

    pub fn new(include_sliders: bool) -> Self {
        Self {
            include_sliders,
            current_strain: 0.0,
            slider_strains: Vec::with_capacity(64),
        }
    }

    /// Strains after each slider.
    pub fn slider_strains(&self) -> &[f64] {
        &self.slider_strains
    }

    pub fn difficult_sliders(&self) -> f64 {
        difficult_strain_count(&self.slider_strains)
    }
}

impl StrainSkill for Aim {
    type DifficultyObject<'a> = OsuDifficultyObject<'a>;

    fn calculate_initial_strain<'a>(
        &mut self,
        time: f64,
        curr: &OsuDifficultyObject<'a>,
        objects: &[OsuDifficultyObject<'a>],
    ) -> f64 {
        let prev_start_time = curr
            .previous(0, objects)
            .map_or(0.0, HasStartTime::start_time);

        self.current_strain * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &OsuDifficultyObject<'a>,
        objects: &[OsuDifficultyObject<'a>],
    ) -> f64 {
        self.current_strain *= strain_decay(curr.delta_time, Self::STRAIN_DECAY_BASE);
        self.current_strain += AimEvaluator::evaluate_diff_of(curr, objects, self.include_sliders)
            * Self::SKILL_MULTIPLIER;

        if curr.base.is_slider() {
            self.slider_strains.push(self.current_strain);
        }

        self.current_strain
    }
}
