use rosu_map::section::hit_objects::{SliderEvent, SliderEventType, SliderEventsIter};

use crate::{
    curve::Curve,
    model::{
        beatmap::Beatmap,
        control_point::{DifficultyPoint, TimingPoint},
        hit_object::{HitObject, HitObjectKind, Pos, Slider, Spinner},
        mods::Reflection,
    },
};

use super::PLAYFIELD_BASE_SIZE;

/// A hit object as seen by the difficulty calculation of both rulesets.
pub struct OsuObject {
    pub pos: Pos,
    pub start_time: f64,
    pub stack_height: i32,
    pub stack_offset: Pos,
    pub kind: OsuObjectKind,
}

impl OsuObject {
    pub const OBJECT_RADIUS: f32 = 64.0;
    pub const PREEMPT_MIN: f64 = 450.0;

    const BASE_SCORING_DIST: f32 = 100.0;

    pub fn new(
        h: &HitObject,
        map: &Beatmap,
        reflection: Reflection,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let kind = match h.kind {
            HitObjectKind::Circle => OsuObjectKind::Circle,
            HitObjectKind::Slider(ref slider) => {
                OsuObjectKind::Slider(OsuSlider::new(h, slider, map, reflection, ticks_buf))
            }
            HitObjectKind::Spinner(spinner) => OsuObjectKind::Spinner(spinner),
        };

        let mut this = Self {
            pos: h.pos,
            start_time: h.start_time,
            stack_height: 0,
            stack_offset: Pos::default(),
            kind,
        };

        match reflection {
            Reflection::None => {}
            Reflection::Vertical => this.pos.y = PLAYFIELD_BASE_SIZE.y - this.pos.y,
            Reflection::Horizontal => this.pos.x = PLAYFIELD_BASE_SIZE.x - this.pos.x,
            Reflection::Both => {
                this.pos.x = PLAYFIELD_BASE_SIZE.x - this.pos.x;
                this.pos.y = PLAYFIELD_BASE_SIZE.y - this.pos.y;
            }
        }

        // Nested positions are relative to the head until now
        if let OsuObjectKind::Slider(ref mut slider) = this.kind {
            for nested in slider.nested_objects.iter_mut() {
                nested.pos = this.pos + nested.pos;
            }
        }

        this
    }

    pub fn end_time(&self) -> f64 {
        match self.kind {
            OsuObjectKind::Circle => self.start_time,
            OsuObjectKind::Slider(ref slider) => slider.end_time,
            OsuObjectKind::Spinner(ref spinner) => self.start_time + spinner.duration,
        }
    }

    pub fn stacked_pos(&self) -> Pos {
        self.pos + self.stack_offset
    }

    pub fn end_pos(&self) -> Pos {
        match self.kind {
            OsuObjectKind::Circle | OsuObjectKind::Spinner(_) => self.pos,
            OsuObjectKind::Slider(ref slider) => slider.tail().map_or(self.pos, |nested| nested.pos),
        }
    }

    pub fn stacked_end_pos(&self) -> Pos {
        self.end_pos() + self.stack_offset
    }

    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Circle)
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Slider { .. })
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, OsuObjectKind::Spinner(_))
    }
}

pub enum OsuObjectKind {
    Circle,
    Slider(OsuSlider),
    Spinner(Spinner),
}

pub struct OsuSlider {
    pub end_time: f64,
    pub span_count: f64,
    pub path: Curve,
    /// Ticks, repeats and the tail, sorted by time. Positions are absolute
    /// but do not include the stack offset.
    pub nested_objects: Vec<NestedSliderObject>,
}

impl OsuSlider {
    fn new(
        h: &HitObject,
        slider: &Slider,
        map: &Beatmap,
        reflection: Reflection,
        ticks_buf: &mut Vec<SliderEvent>,
    ) -> Self {
        let start_time = h.start_time;

        let beat_len = map
            .timing_point_at(start_time)
            .map_or(TimingPoint::DEFAULT_BEAT_LEN, |point| point.beat_len);

        let (slider_velocity, generate_ticks) = map.difficulty_point_at(start_time).map_or(
            (DifficultyPoint::DEFAULT_SLIDER_VELOCITY, true),
            |point| (point.slider_velocity, point.generate_ticks),
        );

        let path = slider.curve(reflection);

        let span_count = slider.span_count() as f64;

        let velocity = f64::from(OsuObject::BASE_SCORING_DIST) * map.slider_multiplier
            / precision_adjusted_beat_len(slider_velocity, beat_len);
        let scoring_dist = velocity * beat_len;

        let end_time = start_time + span_count * path.dist() / velocity;

        let duration = end_time - start_time;
        let span_duration = duration / span_count;

        let tick_dist_multiplier = if map.version < 8 {
            slider_velocity.recip()
        } else {
            1.0
        };

        let tick_dist = if generate_ticks {
            scoring_dist / map.slider_tick_rate * tick_dist_multiplier
        } else {
            f64::INFINITY
        };

        let events = SliderEventsIter::new(
            start_time,
            span_duration,
            velocity,
            tick_dist,
            path.dist(),
            slider.span_count() as i32,
            ticks_buf,
        );

        let span_at = |progress: f64| (progress * span_count) as i32;

        let obj_progress_at = |progress: f64| {
            let p = progress * span_count % 1.0;

            if span_at(progress) % 2 == 1 {
                1.0 - p
            } else {
                p
            }
        };

        let end_path_pos = path.position_at(obj_progress_at(1.0));

        let mut nested_objects: Vec<_> = events
            .filter_map(|e| {
                let obj = match e.kind {
                    SliderEventType::Tick => NestedSliderObject {
                        pos: path.position_at(e.path_progress),
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tick,
                    },
                    SliderEventType::Repeat => NestedSliderObject {
                        pos: path.position_at(e.path_progress),
                        start_time: start_time + f64::from(e.span_idx + 1) * span_duration,
                        kind: NestedSliderObjectKind::Repeat,
                    },
                    SliderEventType::Tail => NestedSliderObject {
                        pos: end_path_pos,
                        start_time: e.time,
                        kind: NestedSliderObjectKind::Tail,
                    },
                    SliderEventType::Head | SliderEventType::LastTick => return None,
                };

                Some(obj)
            })
            .collect();

        // Stable sort keeps the event order for equal times
        nested_objects.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        Self {
            end_time,
            span_count,
            path,
            nested_objects,
        }
    }

    pub fn repeat_count(&self) -> usize {
        self.nested_objects
            .iter()
            .filter(|nested| nested.is_repeat())
            .count()
    }

    /// Counts both ticks and repeats
    pub fn large_tick_count(&self) -> usize {
        self.nested_objects
            .iter()
            .filter(|nested| nested.is_repeat() || nested.is_tick())
            .count()
    }

    pub fn tail(&self) -> Option<&NestedSliderObject> {
        self.nested_objects
            .iter()
            // Very short and fast sliders may put ticks after the tail
            .rfind(|nested| matches!(nested.kind, NestedSliderObjectKind::Tail))
    }
}

#[derive(Clone, Debug)]
pub struct NestedSliderObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: NestedSliderObjectKind,
}

impl NestedSliderObject {
    pub const fn is_repeat(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Repeat)
    }

    pub const fn is_tick(&self) -> bool {
        matches!(self.kind, NestedSliderObjectKind::Tick)
    }
}

#[derive(Copy, Clone, Debug)]
pub enum NestedSliderObjectKind {
    Repeat,
    Tail,
    Tick,
}

/// Beat length adjusted for the slider velocity of a difficulty point,
/// with the same precision loss as the game client.
fn precision_adjusted_beat_len(slider_velocity_multiplier: f64, beat_len: f64) -> f64 {
    let slider_velocity_as_beat_len = -100.0 / slider_velocity_multiplier;

    let bpm_multiplier = if slider_velocity_as_beat_len < 0.0 {
        f64::from(((-slider_velocity_as_beat_len) as f32).clamp(10.0, 10_000.0)) / 100.0
    } else {
        1.0
    };

    beat_len * bpm_multiplier
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::{PathControlPoint, PathType};

    use super::*;

    fn linear_slider(repeats: usize) -> HitObject {
        let control_points = vec![
            PathControlPoint {
                pos: Pos::new(0.0, 0.0),
                path_type: Some(PathType::LINEAR),
            },
            PathControlPoint {
                pos: Pos::new(140.0, 0.0),
                path_type: None,
            },
        ];

        HitObject {
            pos: Pos::new(100.0, 100.0),
            start_time: 1000.0,
            kind: HitObjectKind::Slider(Slider {
                expected_dist: Some(140.0),
                repeats,
                control_points: control_points.into_boxed_slice(),
            }),
        }
    }

    fn map_with(h: HitObject) -> Beatmap {
        Beatmap {
            timing_points: vec![TimingPoint::new(0.0, 500.0)],
            hit_objects: vec![h],
            ..Default::default()
        }
    }

    #[test]
    fn slider_duration_and_nested() {
        let h = linear_slider(1);
        let map = map_with(h.clone());
        let obj = OsuObject::new(&h, &map, Reflection::None, &mut Vec::new());

        let OsuObjectKind::Slider(ref slider) = obj.kind else {
            panic!("expected slider");
        };

        // 140px at 140px per beat for two spans
        assert!((slider.end_time - 2000.0).abs() < 1e-6, "{}", slider.end_time);
        assert_eq!(slider.repeat_count(), 1);

        let tail = slider.tail().unwrap();

        // Two spans end back at the head
        assert!((tail.pos - obj.pos).length() < 1e-3);
    }

    #[test]
    fn vertical_reflection() {
        let h = HitObject {
            pos: Pos::new(100.0, 100.0),
            start_time: 0.0,
            kind: HitObjectKind::Circle,
        };

        let obj = OsuObject::new(&h, &Beatmap::default(), Reflection::Vertical, &mut Vec::new());

        assert_eq!(obj.pos, Pos::new(100.0, 284.0));
        assert_eq!(obj.end_pos(), obj.pos);
    }

    #[test]
    fn precision_adjusted() {
        assert!((precision_adjusted_beat_len(1.0, 500.0) - 500.0).abs() < 1e-9);
        assert!((precision_adjusted_beat_len(2.0, 500.0) - 250.0).abs() < 1e-9);
    }
}
