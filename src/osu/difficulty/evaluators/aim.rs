use std::f64::consts::FRAC_PI_2;

use crate::{
    any::difficulty::object::IDifficultyObject,
    osu::difficulty::object::OsuDifficultyObject,
    util::{
        difficulty::{milliseconds_to_bpm, reverse_lerp, smootherstep, smoothstep},
        float_ext::FloatExt,
    },
};

const RADIUS: f64 = OsuDifficultyObject::NORMALIZED_RADIUS as f64;
const DIAMETER: f64 = OsuDifficultyObject::NORMALIZED_DIAMETER as f64;

pub struct AimEvaluator;

impl AimEvaluator {
    const WIDE_ANGLE_MULTIPLIER: f64 = 1.5;
    const ACUTE_ANGLE_MULTIPLIER: f64 = 2.6;
    const SLIDER_MULTIPLIER: f64 = 1.35;
    const VELOCITY_CHANGE_MULTIPLIER: f64 = 0.75;
    const WIGGLE_MULTIPLIER: f64 = 1.02;

    /// Aim difficulty of moving onto `curr`, based on distance, velocity
    /// changes and the angles between consecutive jumps.
    pub fn evaluate_diff_of(
        curr: &OsuDifficultyObject<'_>,
        diff_objects: &[OsuDifficultyObject<'_>],
        with_slider_travel_dist: bool,
    ) -> f64 {
        let Some((last_last, last)) = curr
            .previous(1, diff_objects)
            .zip(curr.previous(0, diff_objects))
            .filter(|(_, last)| !(curr.base.is_spinner() || last.base.is_spinner()))
        else {
            return 0.0;
        };

        let mut curr_vel = Self::velocity(curr, last, with_slider_travel_dist);
        let mut prev_vel = Self::velocity(last, last_last, with_slider_travel_dist);

        let mut wide_angle_bonus = 0.0;
        let mut acute_angle_bonus = 0.0;
        let mut slider_bonus = 0.0;
        let mut vel_change_bonus = 0.0;
        let mut wiggle_bonus = 0.0;

        let mut aim_strain = curr_vel;

        // Angle bonuses only apply if the rhythm stays roughly the same
        let same_rhythm = curr.strain_time.max(last.strain_time)
            < 1.25 * curr.strain_time.min(last.strain_time);

        if let Some((curr_angle, last_angle)) =
            curr.angle.zip(last.angle).filter(|_| same_rhythm)
        {
            let angle_bonus = curr_vel.min(prev_vel);

            wide_angle_bonus = Self::calc_wide_angle_bonus(curr_angle);
            acute_angle_bonus = Self::calc_acute_angle_bonus(curr_angle);

            // Repeating the same angle is easier
            wide_angle_bonus *=
                1.0 - wide_angle_bonus.min(Self::calc_wide_angle_bonus(last_angle).powf(3.0));
            acute_angle_bonus *= 0.08
                + 0.92
                    * (1.0
                        - acute_angle_bonus
                            .min(Self::calc_acute_angle_bonus(last_angle).powf(3.0)));

            wide_angle_bonus *= angle_bonus * smootherstep(curr.lazy_jump_dist, 0.0, DIAMETER);

            // Acute angles only matter for fast jumps of at least one diameter
            acute_angle_bonus *= angle_bonus
                * smootherstep(milliseconds_to_bpm(curr.strain_time, Some(2)), 300.0, 400.0)
                * smootherstep(curr.lazy_jump_dist, DIAMETER, DIAMETER * 2.0);

            // Short jumps with sharp angles between radius and three diameters
            let wiggle_factor = |obj: &OsuDifficultyObject<'_>, angle: f64| {
                smootherstep(obj.lazy_jump_dist, RADIUS, DIAMETER)
                    * reverse_lerp(obj.lazy_jump_dist, DIAMETER * 3.0, DIAMETER).powf(1.8)
                    * smootherstep(angle, f64::to_radians(110.0), f64::to_radians(60.0))
            };

            wiggle_bonus =
                angle_bonus * wiggle_factor(curr, curr_angle) * wiggle_factor(last, last_angle);
        }

        if prev_vel.max(curr_vel).not_eq(0.0) {
            // Average velocities over whole objects, including slider paths
            prev_vel = (last.lazy_jump_dist + last_last.travel_dist) / last.strain_time;
            curr_vel = (curr.lazy_jump_dist + last.travel_dist) / curr.strain_time;

            let dist_ratio =
                (FRAC_PI_2 * (prev_vel - curr_vel).abs() / prev_vel.max(curr_vel)).sin().powf(2.0);

            // Overlapping objects still count if the velocity changes
            let overlap_vel_buff = (DIAMETER * 1.25 / curr.strain_time.min(last.strain_time))
                .min((prev_vel - curr_vel).abs());

            vel_change_bonus = overlap_vel_buff * dist_ratio;

            let rhythm_ratio = curr.strain_time.min(last.strain_time)
                / curr.strain_time.max(last.strain_time);
            vel_change_bonus *= rhythm_ratio.powf(2.0);
        }

        if last.base.is_slider() {
            slider_bonus = last.travel_dist / last.travel_time;
        }

        aim_strain += wiggle_bonus * Self::WIGGLE_MULTIPLIER;

        aim_strain += (acute_angle_bonus * Self::ACUTE_ANGLE_MULTIPLIER).max(
            wide_angle_bonus * Self::WIDE_ANGLE_MULTIPLIER
                + vel_change_bonus * Self::VELOCITY_CHANGE_MULTIPLIER,
        );

        if with_slider_travel_dist {
            aim_strain += slider_bonus * Self::SLIDER_MULTIPLIER;
        }

        aim_strain
    }

    /// Velocity onto `obj`. If `prev` is a slider, the movement through its
    /// path may be faster than the plain jump.
    fn velocity(
        obj: &OsuDifficultyObject<'_>,
        prev: &OsuDifficultyObject<'_>,
        with_slider_travel_dist: bool,
    ) -> f64 {
        let jump_vel = obj.lazy_jump_dist / obj.strain_time;

        if prev.base.is_slider() && with_slider_travel_dist {
            let travel_vel = prev.travel_dist / prev.travel_time;
            let movement_vel = obj.min_jump_dist / obj.min_jump_time;

            jump_vel.max(movement_vel + travel_vel)
        } else {
            jump_vel
        }
    }

    fn calc_wide_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(40.0), f64::to_radians(140.0))
    }

    fn calc_acute_angle_bonus(angle: f64) -> f64 {
        smoothstep(angle, f64::to_radians(140.0), f64::to_radians(40.0))
    }
}
