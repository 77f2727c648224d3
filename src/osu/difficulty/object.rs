use std::borrow::Cow;

use crate::{
    any::difficulty::object::{HasStartTime, IDifficultyObject},
    model::{hit_object::Pos, mods::GameMods},
    osu::object::{OsuObject, OsuObjectKind},
};

use super::scaling_factor::ScalingFactor;

pub struct OsuDifficultyObject<'a> {
    pub idx: usize,
    pub base: &'a OsuObject,
    pub start_time: f64,
    pub delta_time: f64,
    /// `delta_time` but at least [`Self::MIN_DELTA_TIME`].
    pub strain_time: f64,

    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub lazy_travel_dist: f64,
    pub angle: Option<f64>,

    pub small_circle_bonus: f64,
}

impl<'a> OsuDifficultyObject<'a> {
    pub const NORMALIZED_RADIUS: i32 = 50;
    pub const NORMALIZED_DIAMETER: i32 = Self::NORMALIZED_RADIUS * 2;

    pub const MIN_DELTA_TIME: f64 = 25.0;
    pub const MAX_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 2.4;
    pub const ASSUMED_SLIDER_RADIUS: f32 = Self::NORMALIZED_RADIUS as f32 * 1.8;

    /// Difficulty object for `objects[i]` which must have a predecessor.
    pub fn new(
        objects: &'a [OsuObject],
        travels: &[LazyTravel],
        i: usize,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        let base = &objects[i];
        let last = &objects[i - 1];

        let delta_time = (base.start_time - last.start_time) / clock_rate;
        let strain_time = delta_time.max(Self::MIN_DELTA_TIME);

        let Movement {
            lazy_jump_dist,
            min_jump_dist,
            min_jump_time,
            travel_dist,
            travel_time,
            lazy_travel_dist,
            angle,
        } = Movement::new(objects, travels, i, strain_time, clock_rate, scaling_factor);

        Self {
            idx: i - 1,
            base,
            start_time: base.start_time / clock_rate,
            delta_time,
            strain_time,
            lazy_jump_dist,
            min_jump_dist,
            min_jump_time,
            travel_dist,
            travel_time,
            lazy_travel_dist,
            angle,
            small_circle_bonus: small_circle_bonus(scaling_factor.radius),
        }
    }

    pub fn opacity_at(
        &self,
        time: f64,
        hidden: Option<HiddenFade>,
        time_preempt: f64,
        time_fade_in: f64,
    ) -> f64 {
        opacity_at(
            time,
            self.base.start_time,
            time_preempt,
            time_fade_in,
            hidden,
        )
    }

    pub fn get_doubletapness(&self, next: Option<&Self>, hit_window: f64) -> f64 {
        let Some(next) = next else { return 0.0 };

        doubletapness(
            self.delta_time,
            next.delta_time,
            self.base.is_spinner(),
            hit_window,
        )
    }
}

impl IDifficultyObject for OsuDifficultyObject<'_> {
    fn idx(&self) -> usize {
        self.idx
    }
}

impl HasStartTime for OsuDifficultyObject<'_> {
    fn start_time(&self) -> f64 {
        self.start_time
    }
}

pub fn small_circle_bonus(radius: f64) -> f64 {
    (1.0 + (30.0 - radius) / 40.0).max(1.0)
}

/// How likely it is that two consecutive objects are hit with one press.
///
/// `0.0` means not at all, `1.0` means certainly.
pub fn doubletapness(
    curr_delta_time: f64,
    next_delta_time: f64,
    is_spinner: bool,
    hit_window: f64,
) -> f64 {
    let hit_window = if is_spinner { 0.0 } else { hit_window };

    let curr_delta_time = curr_delta_time.max(1.0);
    let next_delta_time = next_delta_time.max(1.0);
    let delta_diff = (next_delta_time - curr_delta_time).abs();
    let speed_ratio = curr_delta_time / curr_delta_time.max(delta_diff);
    let window_ratio = (curr_delta_time / hit_window).min(1.0).powf(2.0);

    1.0 - speed_ratio.powf(1.0 - window_ratio)
}

/// Fade-out of objects while `Hidden` is active.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HiddenFade {
    /// Length of the fade-out as fraction of the preempt.
    pub duration_multiplier: f64,
    /// Opacity that objects fade out to.
    pub min_opacity: f64,
}

impl HiddenFade {
    /// `None` if neither `Hidden` nor `Traceable` is enabled.
    ///
    /// Objects that stay partially visible fade out to `partial_opacity`
    /// instead of to zero.
    pub fn from_mods(
        mods: &GameMods,
        duration_multiplier: f64,
        partial_opacity: f64,
    ) -> Option<Self> {
        if !(mods.hd() || mods.tc()) {
            return None;
        }

        let min_opacity = if mods.always_partially_visible() {
            partial_opacity
        } else {
            0.0
        };

        Some(Self {
            duration_multiplier,
            min_opacity,
        })
    }
}

/// Opacity of an object at `time`.
///
/// Objects are invisible until `start_time - time_preempt`, fade in
/// linearly over `time_fade_in` and are considered gone once `start_time`
/// has passed.
pub fn opacity_at(
    time: f64,
    start_time: f64,
    time_preempt: f64,
    time_fade_in: f64,
    hidden: Option<HiddenFade>,
) -> f64 {
    if time > start_time {
        return 0.0;
    }

    let fade_in_start_time = start_time - time_preempt;
    let fade_in = ((time - fade_in_start_time) / time_fade_in).clamp(0.0, 1.0);

    let Some(hidden) = hidden else {
        return fade_in;
    };

    let fade_out_start_time = fade_in_start_time + time_fade_in;
    let fade_out_duration = time_preempt * hidden.duration_multiplier;
    let fade_out = 1.0 - ((time - fade_out_start_time) / fade_out_duration).clamp(0.0, 1.0);

    fade_in.min(hidden.min_opacity + (1.0 - hidden.min_opacity) * fade_out)
}

/// Where the cursor ends up when following a slider as lazily as possible.
///
/// For circles and spinners the cursor just stays on the object.
#[derive(Clone, Debug, PartialEq)]
pub struct LazyTravel {
    pub end_pos: Pos,
    /// Normalized distance the cursor has to move.
    pub dist: f64,
    /// Time the slider needs to be tracked, not yet adjusted to the clock
    /// rate.
    pub time: f64,
}

impl LazyTravel {
    const TAIL_LENIENCY: f64 = -36.0;

    pub fn new(h: &OsuObject, radius: f64) -> Self {
        let OsuObjectKind::Slider(ref slider) = h.kind else {
            return Self {
                end_pos: h.stacked_pos(),
                dist: 0.0,
                time: 0.0,
            };
        };

        let stack_offset = h.stack_offset;
        let start_time = h.start_time;
        let duration = slider.end_time - start_time;

        let mut nested_objects = Cow::Borrowed(slider.nested_objects.as_slice());

        let mut tracking_end_time =
            (start_time + duration + Self::TAIL_LENIENCY).max(start_time + duration / 2.0);

        let last_real_tick = nested_objects
            .iter()
            .enumerate()
            .rfind(|(_, nested)| nested.is_tick());

        if let Some((idx, last_real_tick)) =
            last_real_tick.filter(|(_, tick)| tick.start_time > tracking_end_time)
        {
            tracking_end_time = last_real_tick.start_time;

            // The tick is tracked last so it moves to the end
            nested_objects.to_mut()[idx..].rotate_left(1);
        }

        let time = tracking_end_time - start_time;
        let span_duration = duration / slider.span_count;

        // Path progress at which tracking ends, accounting for repeats
        let mut end_progress = time / span_duration;

        if end_progress % 2.0 >= 1.0 {
            end_progress = 1.0 - end_progress % 1.0;
        } else {
            end_progress %= 1.0;
        }

        let mut end_pos = h.stacked_pos() + slider.path.position_at(end_progress);

        let mut cursor_pos = h.stacked_pos();
        let scaling_factor = f64::from(OsuDifficultyObject::NORMALIZED_RADIUS) / radius;
        let mut dist = 0.0;

        let n_nested = nested_objects.len();

        for (i, nested) in nested_objects.iter().enumerate() {
            let is_last = i + 1 == n_nested;

            let mut movement = nested.pos + stack_offset - cursor_pos;
            let mut required_movement = f64::from(OsuDifficultyObject::ASSUMED_SLIDER_RADIUS);

            if is_last {
                let lazy_movement = end_pos - cursor_pos;

                if lazy_movement.length() < movement.length() {
                    movement = lazy_movement;
                }
            } else if nested.is_repeat() {
                required_movement = f64::from(OsuDifficultyObject::NORMALIZED_RADIUS);
            }

            let movement_len = scaling_factor * f64::from(movement.length());

            if movement_len > required_movement {
                let ratio = (movement_len - required_movement) / movement_len;
                cursor_pos += movement * ratio as f32;
                dist += movement_len * ratio;
            }

            if is_last {
                end_pos = cursor_pos;
            }
        }

        Self {
            end_pos,
            dist,
            time,
        }
    }
}

/// Distances and timings of the cursor movement onto an object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Movement {
    pub lazy_jump_dist: f64,
    pub min_jump_dist: f64,
    pub min_jump_time: f64,
    pub travel_dist: f64,
    pub travel_time: f64,
    pub lazy_travel_dist: f64,
    pub angle: Option<f64>,
}

impl Movement {
    /// `travels[i]` must be the [`LazyTravel`] of `objects[i]`.
    pub fn new(
        objects: &[OsuObject],
        travels: &[LazyTravel],
        i: usize,
        strain_time: f64,
        clock_rate: f64,
        scaling_factor: &ScalingFactor,
    ) -> Self {
        const MIN_DELTA_TIME: f64 = OsuDifficultyObject::MIN_DELTA_TIME;

        let curr = &objects[i];
        let mut this = Self::default();

        if let OsuObjectKind::Slider(ref slider) = curr.kind {
            this.lazy_travel_dist = travels[i].dist;
            this.travel_dist =
                travels[i].dist * (1.0 + slider.repeat_count() as f64 / 2.5).powf(1.0 / 2.5);
            this.travel_time = (travels[i].time / clock_rate).max(MIN_DELTA_TIME);
        }

        let Some(last_idx) = i.checked_sub(1) else {
            return this;
        };

        let last = &objects[last_idx];

        if curr.is_spinner() || last.is_spinner() {
            return this;
        }

        let factor = scaling_factor.factor;
        let last_cursor_pos = travels[last_idx].end_pos;

        this.lazy_jump_dist =
            f64::from((curr.stacked_pos() * factor - last_cursor_pos * factor).length());
        this.min_jump_time = strain_time;
        this.min_jump_dist = this.lazy_jump_dist;

        if last.is_slider() {
            let last_travel_time = (travels[last_idx].time / clock_rate).max(MIN_DELTA_TIME);
            this.min_jump_time = (strain_time - last_travel_time).max(MIN_DELTA_TIME);

            // The cursor may only have to reach the edge of the follow circle
            let tail_jump_dist = (last.stacked_end_pos() - curr.stacked_pos()).length() * factor;

            let radius_diff = f64::from(
                OsuDifficultyObject::MAX_SLIDER_RADIUS - OsuDifficultyObject::ASSUMED_SLIDER_RADIUS,
            );
            let tail_dist = f64::from(tail_jump_dist - OsuDifficultyObject::MAX_SLIDER_RADIUS);

            this.min_jump_dist = (this.lazy_jump_dist - radius_diff).min(tail_dist).max(0.0);
        }

        let Some(last_last_idx) = last_idx.checked_sub(1) else {
            return this;
        };

        if !objects[last_last_idx].is_spinner() {
            let v1 = travels[last_last_idx].end_pos - last.stacked_pos();
            let v2 = curr.stacked_pos() - last_cursor_pos;

            let dot = v1.dot(v2);
            let det = v1.x * v2.y - v1.y * v2.x;

            this.angle = Some(f64::from(det).atan2(f64::from(dot)).abs());
        }

        this
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            beatmap::Beatmap,
            hit_object::{HitObject, HitObjectKind},
            mods::Reflection,
        },
        osu::convert::convert_objects,
        util::float_ext::FloatExt,
    };

    use super::*;

    fn circles(positions: &[(f64, f32, f32)]) -> Box<[OsuObject]> {
        let map = Beatmap {
            hit_objects: positions
                .iter()
                .map(|&(start_time, x, y)| HitObject {
                    pos: Pos::new(x, y),
                    start_time,
                    kind: HitObjectKind::Circle,
                })
                .collect(),
            ..Default::default()
        };

        convert_objects(
            &map,
            &ScalingFactor::new(4.0),
            Reflection::None,
            1200.0,
            usize::MAX,
        )
        .0
    }

    #[test]
    fn opacity_bounds() {
        let preempt = 1200.0;
        let fade_in = 480.0;

        assert!(FloatExt::eq(opacity_at(0.0, 2000.0, preempt, fade_in, None), 0.0));
        assert!(FloatExt::eq(opacity_at(1800.0, 2000.0, preempt, fade_in, None), 1.0));
        assert!(FloatExt::eq(opacity_at(2001.0, 2000.0, preempt, fade_in, None), 0.0));

        let halfway = opacity_at(800.0 + 240.0, 2000.0, preempt, fade_in, None);
        assert!((halfway - 0.5).abs() < 1e-9);
    }

    #[test]
    fn hidden_fades_out() {
        let hidden = HiddenFade {
            duration_multiplier: 0.3,
            min_opacity: 0.0,
        };

        let partial = HiddenFade {
            min_opacity: 0.5,
            ..hidden
        };

        // Fade-out ends 480 + 360 ms after the fade-in started
        let faded = opacity_at(1700.0, 2000.0, 1200.0, 480.0, Some(hidden));
        let partially = opacity_at(1700.0, 2000.0, 1200.0, 480.0, Some(partial));

        assert!(FloatExt::eq(faded, 0.0));
        assert!(FloatExt::eq(partially, 0.5));
        assert!(FloatExt::eq(
            opacity_at(700.0, 2000.0, 1200.0, 480.0, Some(hidden)),
            0.0
        ));
    }

    #[test]
    fn jump_distance_is_normalized() {
        let objects = circles(&[(0.0, 0.0, 0.0), (300.0, 100.0, 0.0)]);
        let scaling_factor = ScalingFactor::new(4.0);
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff = OsuDifficultyObject::new(&objects, &travels, 1, 1.0, &scaling_factor);

        assert_eq!(diff.idx, 0);
        assert!(FloatExt::eq(diff.strain_time, 300.0));
        assert!((diff.lazy_jump_dist - 100.0 * f64::from(scaling_factor.factor)).abs() < 1e-2);
        assert!(diff.angle.is_none());
    }

    #[test]
    fn angle_of_straight_line_is_pi() {
        let objects = circles(&[(0.0, 0.0, 0.0), (300.0, 100.0, 0.0), (600.0, 200.0, 0.0)]);
        let scaling_factor = ScalingFactor::new(4.0);
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff = OsuDifficultyObject::new(&objects, &travels, 2, 1.0, &scaling_factor);
        let angle = diff.angle.unwrap();

        assert!((angle - std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn strain_time_is_floored() {
        let objects = circles(&[(0.0, 0.0, 0.0), (5.0, 300.0, 0.0)]);
        let scaling_factor = ScalingFactor::new(4.0);
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff = OsuDifficultyObject::new(&objects, &travels, 1, 1.0, &scaling_factor);

        assert!(FloatExt::eq(diff.delta_time, 5.0));
        assert!(FloatExt::eq(diff.strain_time, OsuDifficultyObject::MIN_DELTA_TIME));
    }

    #[test]
    fn spaced_doubles_are_not_doubletappable() {
        assert!(FloatExt::eq(doubletapness(100.0, 100.0, false, 50.0), 0.0));
        assert!(doubletapness(20.0, 200.0, false, 50.0) > 0.5);
    }
}
