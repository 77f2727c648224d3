use std::borrow::Cow;

pub use rosu_map::{
    section::hit_objects::{PathControlPoint, PathType},
    util::Pos,
};

use crate::{curve::Curve, model::mods::Reflection};

/// A circle, slider, or spinner as stored in the `.osu` file.
#[derive(Clone, Debug, PartialEq)]
pub struct HitObject {
    pub pos: Pos,
    pub start_time: f64,
    pub kind: HitObjectKind,
}

impl HitObject {
    pub const fn is_circle(&self) -> bool {
        matches!(self.kind, HitObjectKind::Circle)
    }

    pub const fn is_slider(&self) -> bool {
        matches!(self.kind, HitObjectKind::Slider(_))
    }

    pub const fn is_spinner(&self) -> bool {
        matches!(self.kind, HitObjectKind::Spinner(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum HitObjectKind {
    Circle,
    Slider(Slider),
    Spinner(Spinner),
}

/// Path data of a slider. Timing only becomes known once the
/// slider is placed on the map's control points.
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    /// Length in osu!pixels the path is cut or extended to.
    pub expected_dist: Option<f64>,
    pub repeats: usize,
    pub control_points: Box<[PathControlPoint]>,
}

impl Slider {
    /// How often the path is traversed.
    pub const fn span_count(&self) -> usize {
        self.repeats + 1
    }

    /// Builds the path, mirroring control points first if the mods ask for
    /// it.
    pub(crate) fn curve(&self, reflection: Reflection) -> Curve {
        let mirror: fn(Pos) -> Pos = match reflection {
            Reflection::None => {
                return Curve::new(&self.control_points, self.expected_dist);
            }
            Reflection::Vertical => |pos| Pos::new(pos.x, -pos.y),
            Reflection::Horizontal => |pos| Pos::new(-pos.x, pos.y),
            Reflection::Both => |pos| Pos::new(-pos.x, -pos.y),
        };

        let mut points = Cow::Borrowed(self.control_points.as_ref());

        for point in points.to_mut().iter_mut() {
            point.pos = mirror(point.pos);
        }

        Curve::new(&points, self.expected_dist)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spinner {
    pub duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_slider() -> Slider {
        Slider {
            expected_dist: Some(100.0),
            repeats: 1,
            control_points: Box::new([
                PathControlPoint {
                    pos: Pos::new(0.0, 0.0),
                    path_type: Some(PathType::LINEAR),
                },
                PathControlPoint {
                    pos: Pos::new(0.0, 100.0),
                    path_type: None,
                },
            ]),
        }
    }

    #[test]
    fn repeats_add_spans() {
        assert_eq!(straight_slider().span_count(), 2);
    }

    #[test]
    fn reflection_mirrors_path() {
        let slider = straight_slider();

        let plain = slider.curve(Reflection::None).position_at(1.0);
        let flipped = slider.curve(Reflection::Vertical).position_at(1.0);

        assert!((plain.y - 100.0).abs() < 1e-3);
        assert!((flipped.y + 100.0).abs() < 1e-3);
        assert!((plain.x - flipped.x).abs() < 1e-3);
    }
}
