use crate::{model::hit_object::Pos, osu::object::OsuObject};

use super::object::OsuDifficultyObject;

const BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE: f32 = 1.00041;

/// Fields around the scaling of hit objects.
///
/// All objects of a map share the same scale, so it is stored only once.
pub struct ScalingFactor {
    /// `NORMALIZED_RADIUS / radius`, adjusted if `radius < 30`
    pub factor: f32,
    pub radius: f64,
    pub scale: f32,
}

impl ScalingFactor {
    pub fn new(cs: f64) -> Self {
        let scale = (f64::from(1.0_f32) - f64::from(0.7_f32) * ((cs - 5.0) / 5.0)) as f32 / 2.0
            * BROKEN_GAMEFIELD_ROUNDING_ALLOWANCE;

        let radius = f64::from(OsuObject::OBJECT_RADIUS * scale);
        let factor = OsuDifficultyObject::NORMALIZED_RADIUS as f32 / radius as f32;

        let factor_with_small_circle_bonus = if radius < 30.0 {
            factor * (1.0 + (30.0 - radius as f32).min(5.0) / 50.0)
        } else {
            factor
        };

        Self {
            factor: factor_with_small_circle_bonus,
            radius,
            scale,
        }
    }

    pub fn stack_offset(&self, stack_height: i32) -> Pos {
        let stack_offset = stack_height as f32 * self.scale * -6.4;

        Pos::new(stack_offset, stack_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_circles_get_bonus() {
        let regular = ScalingFactor::new(4.0);
        let tiny = ScalingFactor::new(9.0);

        assert!(regular.radius > 30.0);
        assert!(tiny.radius < 30.0);

        let plain_tiny = OsuDifficultyObject::NORMALIZED_RADIUS as f32 / tiny.radius as f32;

        assert!(tiny.factor > plain_tiny);
    }

    #[test]
    fn stacks_move_up_left() {
        let offset = ScalingFactor::new(5.0).stack_offset(2);

        assert!(offset.x < 0.0 && offset.y < 0.0);
    }
}
