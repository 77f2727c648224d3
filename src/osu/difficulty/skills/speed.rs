use crate::{
    any::difficulty::{
        object::{HasStartTime, IDifficultyObject},
        skills::{strain_decay, StrainSkill, StrainSkillConfig},
    },
    osu::difficulty::{
        evaluators::{RhythmEvaluator, SpeedEvaluator},
        object::OsuDifficultyObject,
    },
};

/// Tapping speed, scaled by rhythm complexity.
#[derive(Clone, Debug)]
pub struct Speed {
    hit_window: f64,
    autopilot: bool,
    current_strain: f64,
    current_rhythm: f64,
    slider_strains: Vec<f64>,
}

impl Speed {
    pub const CONFIG: StrainSkillConfig = StrainSkillConfig::reduced(5);

    const SKILL_MULTIPLIER: f64 = 1.47;
    const STRAIN_DECAY_BASE: f64 = 0.3;

    pub fn new(hit_window: f64, autopilot: bool) -> Self {
        Self {
            hit_window,
            autopilot,
            current_strain: 0.0,
            current_rhythm: 0.0,
            slider_strains: Vec::with_capacity(64),
        }
    }

    pub fn slider_strains(&self) -> &[f64] {
        &self.slider_strains
    }
}

impl StrainSkill for Speed {
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

        self.current_strain
            * self.current_rhythm
            * strain_decay(time - prev_start_time, Self::STRAIN_DECAY_BASE)
    }

    fn strain_value_at<'a>(
        &mut self,
        curr: &OsuDifficultyObject<'a>,
        objects: &[OsuDifficultyObject<'a>],
    ) -> f64 {
        self.current_strain *= strain_decay(curr.strain_time, Self::STRAIN_DECAY_BASE);
        self.current_strain +=
            SpeedEvaluator::evaluate_diff_of(curr, objects, self.hit_window, self.autopilot)
                * Self::SKILL_MULTIPLIER;
        self.current_rhythm = RhythmEvaluator::evaluate_diff_of(curr, objects, self.hit_window);

        let total_strain = self.current_strain * self.current_rhythm;

        if curr.base.is_slider() {
            self.slider_strains.push(total_strain);
        }

        total_strain
    }
}
