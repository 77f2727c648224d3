use crate::{
    model::mods::GameMods,
    osu::difficulty::rating::{ar_factor, flashlight_length_bonus, length_bonus},
    util::difficulty::reverse_lerp,
};

/// Multiplier of the skills that depend on finger control.
pub const MECHANICAL_DIFFICULTY_MULTIPLIER: f64 = 0.18;
/// Multiplier of the skills that depend on reading and memory.
pub const COGNITIVE_DIFFICULTY_MULTIPLIER: f64 = 0.0675;

/// Turns raw osu!droid skill difficulty values into ratings.
///
/// Aim keeps the osu!standard approach rate factor. Touch input makes low
/// approach rates comparatively easy to tap, so tapping only rewards high
/// approach rates. `Hidden` gets no aim bonus.
pub struct DroidRatingCalculator<'mods> {
    mods: &'mods GameMods,
    total_hits: u32,
    approach_rate: f64,
    overall_difficulty: f64,
}

impl<'mods> DroidRatingCalculator<'mods> {
    pub const fn new(
        mods: &'mods GameMods,
        total_hits: u32,
        approach_rate: f64,
        overall_difficulty: f64,
    ) -> Self {
        Self {
            mods,
            total_hits,
            approach_rate,
            overall_difficulty,
        }
    }

    pub fn compute_aim_rating(&self, aim_difficulty_value: f64) -> f64 {
        if self.mods.ap() {
            return 0.0;
        }

        let mut aim_rating = Self::calculate_mechanical_difficulty_rating(aim_difficulty_value);

        if self.mods.td() {
            aim_rating = aim_rating.powf(0.8);
        }

        if let Some(strength) = self.mods.attraction_strength() {
            aim_rating *= 1.0 - strength;
        }

        let ar_factor = if self.mods.rx() {
            0.0
        } else {
            ar_factor(self.approach_rate)
        };

        let mut rating_multiplier = 1.0 + ar_factor * length_bonus(self.total_hits);
        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powf(2.0) / 2500.0;

        aim_rating * rating_multiplier.cbrt()
    }

    pub fn compute_tap_rating(&self, tap_difficulty_value: f64) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let mut tap_rating = Self::calculate_mechanical_difficulty_rating(tap_difficulty_value);

        if let Some(strength) = self.mods.attraction_strength() {
            tap_rating *= 1.0 - strength * 0.3;
        }

        // Low approach rates are not harder to tap on a touch screen
        let high_ar_factor = if self.mods.ap() || self.approach_rate <= 10.33 {
            0.0
        } else {
            0.3 * (self.approach_rate - 10.33)
        };

        let mut rating_multiplier = 1.0 + high_ar_factor * length_bonus(self.total_hits);
        rating_multiplier *= 0.95 + self.overall_difficulty.max(0.0).powf(2.0) / 750.0;

        tap_rating * rating_multiplier.cbrt()
    }

    pub fn compute_rhythm_rating(&self, rhythm_difficulty_value: f64) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        Self::calculate_cognitive_difficulty_rating(rhythm_difficulty_value)
    }

    pub fn compute_flashlight_rating(&self, flashlight_difficulty_value: f64) -> f64 {
        if !self.mods.fl() {
            return 0.0;
        }

        let mut flashlight_rating =
            Self::calculate_cognitive_difficulty_rating(flashlight_difficulty_value);

        if self.mods.td() {
            flashlight_rating = flashlight_rating.powf(0.8);
        }

        if self.mods.rx() {
            flashlight_rating *= 0.7;
        } else if self.mods.ap() {
            flashlight_rating *= 0.4;
        }

        if let Some(strength) = self.mods.attraction_strength() {
            flashlight_rating *= 1.0 - strength;
        }

        // Objects start out large and shrink toward their regular size
        if let Some(start_scale) = self.mods.deflate_start_scale() {
            flashlight_rating *= reverse_lerp(start_scale, 11.0, 1.0).clamp(0.1, 1.0);
        }

        let mut rating_multiplier = flashlight_length_bonus(self.total_hits);
        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powf(2.0) / 2500.0;

        flashlight_rating * rating_multiplier.sqrt()
    }

    pub fn compute_visual_rating(&self, visual_difficulty_value: f64) -> f64 {
        let mut visual_rating = Self::calculate_cognitive_difficulty_rating(visual_difficulty_value);

        if self.mods.td() {
            visual_rating = visual_rating.powf(0.8);
        }

        visual_rating * length_bonus(self.total_hits).sqrt()
    }

    pub fn calculate_mechanical_difficulty_rating(difficulty_value: f64) -> f64 {
        difficulty_value.sqrt() * MECHANICAL_DIFFICULTY_MULTIPLIER
    }

    pub fn calculate_cognitive_difficulty_rating(difficulty_value: f64) -> f64 {
        difficulty_value.sqrt() * COGNITIVE_DIFFICULTY_MULTIPLIER
    }
}
