use crate::{
    model::mods::GameMods,
    util::difficulty::{lerp, reverse_lerp},
};

/// Turns raw skill difficulty values into ratings, applying the mod and
/// map dependent bonuses.
pub struct OsuRatingCalculator<'mods> {
    mods: &'mods GameMods,
    total_hits: u32,
    approach_rate: f64,
    overall_difficulty: f64,
    mechanical_difficulty_rating: f64,
    slider_factor: f64,
}

const DIFFICULTY_MULTIPLIER: f64 = 0.0675;

impl<'mods> OsuRatingCalculator<'mods> {
    pub const fn new(
        mods: &'mods GameMods,
        total_hits: u32,
        approach_rate: f64,
        overall_difficulty: f64,
        mechanical_difficulty_rating: f64,
        slider_factor: f64,
    ) -> Self {
        Self {
            mods,
            total_hits,
            approach_rate,
            overall_difficulty,
            mechanical_difficulty_rating,
            slider_factor,
        }
    }

    pub fn compute_aim_rating(&self, aim_difficulty_value: f64) -> f64 {
        if self.mods.ap() {
            return 0.0;
        }

        let mut aim_rating = Self::calculate_difficulty_rating(aim_difficulty_value);

        if self.mods.td() {
            aim_rating = aim_rating.powf(0.8);
        }

        if self.mods.rx() {
            aim_rating *= 0.9;
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

        if self.mods.hd() {
            let visibility_factor = visibility_factor(
                self.mechanical_difficulty_rating,
                self.approach_rate,
                9.0,
            );

            rating_multiplier += visibility_bonus(
                self.mods,
                self.approach_rate,
                visibility_factor,
                self.slider_factor,
            );
        }

        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powf(2.0) / 2500.0;

        aim_rating * rating_multiplier.cbrt()
    }

    pub fn compute_speed_rating(&self, speed_difficulty_value: f64) -> f64 {
        if self.mods.rx() {
            return 0.0;
        }

        let mut speed_rating = Self::calculate_difficulty_rating(speed_difficulty_value);

        if self.mods.ap() {
            speed_rating *= 0.5;
        }

        if let Some(strength) = self.mods.attraction_strength() {
            // Spacing still matters, at most a 0.7x reduction
            speed_rating *= 1.0 - strength * 0.3;
        }

        let ar_factor = if self.mods.ap() {
            0.0
        } else {
            ar_factor(self.approach_rate)
        };

        let mut rating_multiplier = 1.0 + ar_factor * length_bonus(self.total_hits);

        if self.mods.hd() {
            let visibility_factor = visibility_factor(
                self.mechanical_difficulty_rating,
                self.approach_rate,
                10.0,
            );

            rating_multiplier +=
                visibility_bonus(self.mods, self.approach_rate, visibility_factor, 1.0);
        }

        rating_multiplier *= 0.95 + self.overall_difficulty.max(0.0).powf(2.0) / 750.0;

        speed_rating * rating_multiplier.cbrt()
    }

    pub fn compute_flashlight_rating(&self, flashlight_difficulty_value: f64) -> f64 {
        if !self.mods.fl() {
            return 0.0;
        }

        let mut flashlight_rating = Self::calculate_difficulty_rating(flashlight_difficulty_value);

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

        if let Some(start_scale) = self.mods.deflate_start_scale() {
            flashlight_rating *= reverse_lerp(start_scale, 11.0, 1.0).clamp(0.1, 1.0);
        }

        let mut rating_multiplier = flashlight_length_bonus(self.total_hits);
        rating_multiplier *= 0.98 + self.overall_difficulty.max(0.0).powf(2.0) / 2500.0;

        flashlight_rating * rating_multiplier.sqrt()
    }

    pub fn calculate_difficulty_rating(difficulty_value: f64) -> f64 {
        difficulty_value.sqrt() * DIFFICULTY_MULTIPLIER
    }
}

/// Bonus for long maps, used to scale AR dependent bonuses.
pub fn length_bonus(total_hits: u32) -> f64 {
    let hits = f64::from(total_hits);
    let long_map_bonus = if total_hits > 2000 {
        (hits / 2000.0).log10() * 0.5
    } else {
        0.0
    };

    0.95 + 0.4 * (hits / 2000.0).min(1.0) + long_map_bonus
}

/// Short maps have a larger share of objects under the initial, larger
/// flashlight radius.
pub fn flashlight_length_bonus(total_hits: u32) -> f64 {
    let hits = f64::from(total_hits);

    let beyond_200 = if total_hits > 200 {
        0.2 * (f64::from(total_hits.saturating_sub(200)) / 200.0).min(1.0)
    } else {
        0.0
    };

    0.7 + 0.1 * (hits / 200.0).min(1.0) + beyond_200
}

/// Reward for reading very high or very low approach rates.
pub fn ar_factor(approach_rate: f64) -> f64 {
    if approach_rate > 10.33 {
        0.3 * (approach_rate - 10.33)
    } else if approach_rate < 8.0 {
        0.05 * (8.0 - approach_rate)
    } else {
        0.0
    }
}

/// How much reading matters at the given AR, `1.0` at or below the
/// starting point and `0.0` at AR 11.5.
///
/// The starting point moves from `min_starting_point` towards AR 10.33 the
/// more mechanically difficult the map is.
pub fn visibility_factor(
    mechanical_difficulty_rating: f64,
    approach_rate: f64,
    min_starting_point: f64,
) -> f64 {
    const AR_FACTOR_END_POINT: f64 = 11.5;

    let mechanical_factor = reverse_lerp(mechanical_difficulty_rating, 5.0, 10.0);
    let starting_point = lerp(min_starting_point, 10.33, mechanical_factor);

    reverse_lerp(approach_rate, AR_FACTOR_END_POINT, starting_point)
}

/// Bonus for playing with reduced visibility.
pub fn visibility_bonus(
    mods: &GameMods,
    approach_rate: f64,
    visibility_factor: f64,
    slider_factor: f64,
) -> f64 {
    let partially_visible = mods.always_partially_visible();

    let mut bonus = 0.04 * (12.0 - approach_rate.max(7.0)) * visibility_factor;

    // Slider aim is less affected by low AR
    let slider_visibility_factor = slider_factor.powf(3.0);

    if approach_rate < 7.0 {
        let factor = if partially_visible { 0.03 } else { 0.045 };

        bonus += factor * (7.0 - approach_rate.max(0.0)) * slider_visibility_factor;
    }

    // Bounded for negative AR
    if approach_rate < 0.0 {
        let factor = if partially_visible { 0.075 } else { 0.1 };

        bonus += factor * (1.0 - 1.5_f64.powf(approach_rate)) * slider_visibility_factor;
    }

    bonus
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn length_bonus_curves() {
        assert!((length_bonus(1000) - 1.15).abs() < 1e-12);
        assert!((length_bonus(4000) - (1.35 + 2.0_f64.log10() * 0.5)).abs() < 1e-12);
        assert!((flashlight_length_bonus(100) - 0.75).abs() < 1e-12);
        assert!((flashlight_length_bonus(300) - 0.9).abs() < 1e-12);
        assert!((flashlight_length_bonus(1000) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ar_factor_thresholds() {
        assert!(ar_factor(9.0).eq(0.0));
        assert!((ar_factor(11.0) - 0.3 * 0.67).abs() < 1e-12);
        assert!((ar_factor(6.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn visibility_bonus_stays_bounded() {
        let mods = GameMods::from(8);

        let at_zero = visibility_bonus(&mods, 0.0, 1.0, 1.0);
        let very_low = visibility_bonus(&mods, -20.0, 1.0, 1.0);

        assert!(very_low > at_zero);
        assert!(very_low - at_zero < 0.1 + 1e-9);
    }

    #[test]
    fn gated_ratings() {
        let autopilot = GameMods::from(8192);
        let relax = GameMods::from(128);
        let nomod = GameMods::from(0);

        let calc = |mods| OsuRatingCalculator::new(mods, 500, 9.0, 8.0, 5.0, 1.0);

        assert!(calc(&autopilot).compute_aim_rating(1000.0).eq(0.0));
        assert!(calc(&relax).compute_speed_rating(1000.0).eq(0.0));
        assert!(calc(&nomod).compute_flashlight_rating(1000.0).eq(0.0));
        assert!(calc(&nomod).compute_aim_rating(1000.0) > 0.0);
    }
}
