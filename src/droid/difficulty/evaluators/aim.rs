use std::f64::consts::FRAC_PI_2;

use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::difficulty::object::OsuDifficultyObject,
    util::difficulty::{milliseconds_to_bpm, smootherstep, smoothstep},
};

const DIAMETER: f64 = OsuDifficultyObject::NORMALIZED_DIAMETER as f64;

pub struct DroidAimEvaluator;

impl DroidAimEvaluator {
    const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
    const ACUTE_ANGLE_MULTIPLIER: f64 = 2.35;
    const SLIDER_MULTIPLIER: f64 = 1.5;
    const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;

    /// Aim difficulty of moving onto `curr`.
    ///
    /// Touch players tap with either hand so only the movement itself and
    /// the angle between jumps count, not how a single cursor gets there.
    pub fn evaluate_diff_of(
        curr: &DroidDifficultyObject<'_>,
        diff_objects: &[DroidDifficultyObject<'_>],
        with_sliders: bool,
    ) -> f64 {
        let Some((last_last, last)) = curr
            .previous(1, diff_objects)
            .zip(curr.previous(0, diff_objects))
            .filter(|(_, last)| !(curr.base.is_spinner() || last.base.is_spinner()))
        else {
            return 0.0;
        };

        let curr_vel = Self::velocity(curr, last, with_sliders);
        let prev_vel = Self::velocity(last, last_last, with_sliders);

        let mut aim_strain = curr_vel;

        let mut wide_angle_bonus = 0.0;
        let mut acute_angle_bonus = 0.0;
        let mut vel_change_bonus = 0.0;

        let same_rhythm = curr.strain_time.max(last.strain_time)
            < 1.25 * curr.strain_time.min(last.strain_time);

        if let Some((curr_angle, last_angle)) =
            curr.angle.zip(last.angle).filter(|_| same_rhythm)
        {
            let angle_bonus = curr_vel.min(prev_vel);

            wide_angle_bonus = Self::wide_angle_bonus(curr_angle);
            acute_angle_bonus = Self::acute_angle_bonus(curr_angle);

            // Alternating between the same angles is easier
            wide_angle_bonus *= 1.0 - wide_angle_bonus.min(Self::wide_angle_bonus(last_angle));
            acute_angle_bonus *=
                0.1 + 0.9 * (1.0 - acute_angle_bonus.min(Self::acute_angle_bonus(last_angle)));

            wide_angle_bonus *= angle_bonus * smootherstep(curr.lazy_jump_dist, 0.0, DIAMETER);

            acute_angle_bonus *= angle_bonus
                * smootherstep(milliseconds_to_bpm(curr.strain_time, Some(2)), 300.0, 400.0)
                * smootherstep(curr.lazy_jump_dist, DIAMETER, DIAMETER * 2.0);
        }

        if prev_vel.max(curr_vel) > 0.0 {
            let prev_vel = (last.lazy_jump_dist + last_last.travel_dist) / last.strain_time;
            let curr_vel = (curr.lazy_jump_dist + last.travel_dist) / curr.strain_time;

            let dist_ratio =
                (FRAC_PI_2 * (prev_vel - curr_vel).abs() / prev_vel.max(curr_vel)).sin().powf(2.0);

            let overlap_vel_buff = (DIAMETER * 1.25 / curr.strain_time.min(last.strain_time))
                .min((prev_vel - curr_vel).abs());

            let rhythm_ratio = curr.strain_time.min(last.strain_time)
                / curr.strain_time.max(last.strain_time);

            vel_change_bonus = overlap_vel_buff * dist_ratio * rhythm_ratio.powf(2.0);
        }

        aim_strain += (acute_angle_bonus * Self::ACUTE_ANGLE_MULTIPLIER).max(
            wide_angle_bonus * Self::WIDE_ANGLE_MULTIPLIER
                + vel_change_bonus * Self::VELOCITY_CHANGE_MULTIPLIER,
        );

        if with_sliders && last.base.is_slider() {
            aim_strain += last.travel_dist / last.travel_time * Self::SLIDER_MULTIPLIER;
        }

        aim_strain
    }

    fn velocity(
        obj: &DroidDifficultyObject<'_>,
        prev: &DroidDifficultyObject<'_>,
        with_sliders: bool,
    ) -> f64 {
        let jump_vel = obj.lazy_jump_dist / obj.strain_time;

        if prev.base.is_slider() && with_sliders {
            let travel_vel = prev.travel_dist / prev.travel_time;
            let movement_vel = obj.min_jump_dist / obj.min_jump_time;

            jump_vel.max(movement_vel + travel_vel)
        } else {
            jump_vel
        }
    }

    fn wide_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(40.0), f64::to_radians(140.0))
    }

    fn acute_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(140.0), f64::to_radians(40.0))
    }
}
