use crate::model::{beatmap::Beatmap, hit_object::Pos, mods::Reflection};

use super::{
    difficulty::scaling_factor::ScalingFactor,
    object::{NestedSliderObjectKind, OsuObject, OsuObjectKind},
};

/// Object counts gathered while converting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectCounts {
    pub n_circles: u32,
    pub n_sliders: u32,
    pub n_spinners: u32,
    pub n_large_ticks: u32,
    pub max_combo: u32,
}

/// Turn the map's hit objects into [`OsuObject`]s, apply stacking and
/// count the first `take` objects.
pub fn convert_objects(
    map: &Beatmap,
    scaling_factor: &ScalingFactor,
    reflection: Reflection,
    time_preempt: f64,
    mut take: usize,
) -> (Box<[OsuObject]>, ObjectCounts) {
    let mut ticks_buf = Vec::new();
    let mut counts = ObjectCounts::default();

    let mut osu_objects: Box<[_]> = map
        .hit_objects
        .iter()
        .map(|h| OsuObject::new(h, map, reflection, &mut ticks_buf))
        .inspect(|h| {
            if take == 0 {
                return;
            }

            take -= 1;
            counts.max_combo += 1;

            match h.kind {
                OsuObjectKind::Circle => counts.n_circles += 1,
                OsuObjectKind::Slider(ref slider) => {
                    counts.n_sliders += 1;
                    counts.n_large_ticks += slider.large_tick_count() as u32;
                    counts.max_combo += slider.nested_objects.len() as u32;
                }
                OsuObjectKind::Spinner(_) => counts.n_spinners += 1,
            }
        })
        .collect();

    let stack_threshold = time_preempt * f64::from(map.stack_leniency);

    if map.version >= 6 {
        stacking(&mut osu_objects, stack_threshold);
    } else {
        old_stacking(&mut osu_objects, stack_threshold);
    }

    for h in osu_objects.iter_mut() {
        h.stack_offset = scaling_factor.stack_offset(h.stack_height);
    }

    log::trace!(
        "Converted {} circles, {} sliders, {} spinners",
        counts.n_circles,
        counts.n_sliders,
        counts.n_spinners
    );

    (osu_objects, counts)
}

const STACK_DISTANCE: f32 = 3.0;

fn distance(a: Pos, b: Pos) -> f32 {
    (a - b).length()
}

fn stacking(hit_objects: &mut [OsuObject], stack_threshold: f64) {
    let mut extended_start_idx = 0;

    let Some(extended_end_idx) = hit_objects.len().checked_sub(1) else {
        return;
    };

    for i in (1..=extended_end_idx).rev() {
        let mut n = i;
        let mut obj_i_idx = i;

        // Objects that already received a stack height belong to a stack
        // that was handled from a later object.
        if hit_objects[obj_i_idx].stack_height != 0 || hit_objects[obj_i_idx].is_spinner() {
            continue;
        }

        if hit_objects[obj_i_idx].is_circle() {
            // Either a stack of circles only or circles beneath a slider
            loop {
                n = match n.checked_sub(1) {
                    Some(n) => n,
                    None => break,
                };

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].end_time() > stack_threshold {
                    break;
                }

                if n < extended_start_idx {
                    hit_objects[n].stack_height = 0;
                    extended_start_idx = n;
                }

                // Circles under the end of a slider stack downwards
                if hit_objects[n].is_slider()
                    && distance(hit_objects[n].end_pos(), hit_objects[obj_i_idx].pos)
                        < STACK_DISTANCE
                {
                    let offset =
                        hit_objects[obj_i_idx].stack_height - hit_objects[n].stack_height + 1;

                    for j in n + 1..=i {
                        if distance(hit_objects[n].end_pos(), hit_objects[j].pos) < STACK_DISTANCE {
                            hit_objects[j].stack_height -= offset;
                        }
                    }

                    break;
                }

                if distance(hit_objects[n].pos, hit_objects[obj_i_idx].pos) < STACK_DISTANCE {
                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        } else if hit_objects[obj_i_idx].is_slider() {
            // From the first slider of a stack on, stacking is always upwards
            loop {
                n = match n.checked_sub(1) {
                    Some(n) => n,
                    None => break,
                };

                if hit_objects[n].is_spinner() {
                    continue;
                }

                if hit_objects[obj_i_idx].start_time - hit_objects[n].start_time > stack_threshold {
                    break;
                }

                if distance(hit_objects[n].end_pos(), hit_objects[obj_i_idx].pos) < STACK_DISTANCE
                {
                    hit_objects[n].stack_height = hit_objects[obj_i_idx].stack_height + 1;
                    obj_i_idx = n;
                }
            }
        }
    }
}

/// Stacking for maps before format version 6.
fn old_stacking(hit_objects: &mut [OsuObject], stack_threshold: f64) {
    for i in 0..hit_objects.len() {
        if hit_objects[i].stack_height != 0 && !hit_objects[i].is_slider() {
            continue;
        }

        let mut start_time = hit_objects[i].end_time();

        let pos2 = {
            let h = &hit_objects[i];

            match h.kind {
                OsuObjectKind::Circle | OsuObjectKind::Spinner(_) => h.pos,
                OsuObjectKind::Slider(ref slider) => {
                    // End of the path rather than the end of the slider
                    let nested = if slider.repeat_count() % 2 == 0 {
                        slider.tail()
                    } else {
                        slider
                            .nested_objects
                            .iter()
                            .find(|nested| matches!(nested.kind, NestedSliderObjectKind::Repeat))
                    };

                    nested.map_or(h.pos, |nested| nested.pos)
                }
            }
        };

        let mut slider_stack = 0;

        for j in i + 1..hit_objects.len() {
            if hit_objects[j].start_time - stack_threshold > start_time {
                break;
            }

            // Uses the start time of `j` on purpose, matching old clients
            if distance(hit_objects[j].pos, hit_objects[i].pos) < STACK_DISTANCE {
                hit_objects[i].stack_height += 1;
                start_time = hit_objects[j].start_time;
            } else if distance(hit_objects[j].pos, pos2) < STACK_DISTANCE {
                slider_stack += 1;
                hit_objects[j].stack_height -= slider_stack;
                start_time = hit_objects[j].start_time;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::hit_object::{HitObject, HitObjectKind};

    use super::*;

    fn circle(time: f64, x: f32, y: f32) -> HitObject {
        HitObject {
            pos: Pos::new(x, y),
            start_time: time,
            kind: HitObjectKind::Circle,
        }
    }

    fn convert(map: &Beatmap) -> (Box<[OsuObject]>, ObjectCounts) {
        convert_objects(
            map,
            &ScalingFactor::new(4.0),
            Reflection::None,
            1200.0,
            usize::MAX,
        )
    }

    #[test]
    fn stacks_close_circles() {
        let map = Beatmap {
            hit_objects: vec![
                circle(0.0, 100.0, 100.0),
                circle(100.0, 100.0, 100.0),
                circle(200.0, 100.0, 100.0),
            ],
            ..Default::default()
        };

        let (objects, counts) = convert(&map);

        let heights: Vec<_> = objects.iter().map(|h| h.stack_height).collect();

        assert_eq!(heights, [2, 1, 0]);
        assert_eq!(counts.n_circles, 3);
        assert_eq!(counts.max_combo, 3);
        assert!(objects[0].stacked_pos().x < objects[2].stacked_pos().x);
    }

    #[test]
    fn distant_circles_do_not_stack() {
        let map = Beatmap {
            hit_objects: vec![circle(0.0, 100.0, 100.0), circle(100.0, 300.0, 100.0)],
            ..Default::default()
        };

        let (objects, _) = convert(&map);

        assert!(objects.iter().all(|h| h.stack_height == 0));
    }

    #[test]
    fn old_format_stacking() {
        let map = Beatmap {
            version: 5,
            hit_objects: vec![circle(0.0, 100.0, 100.0), circle(100.0, 100.0, 100.0)],
            ..Default::default()
        };

        let (objects, _) = convert(&map);

        assert_eq!(objects[0].stack_height, 1);
    }

    #[test]
    fn take_limits_counts() {
        let map = Beatmap {
            hit_objects: vec![circle(0.0, 0.0, 0.0), circle(500.0, 200.0, 0.0)],
            ..Default::default()
        };

        let (objects, counts) = convert_objects(
            &map,
            &ScalingFactor::new(4.0),
            Reflection::None,
            1200.0,
            1,
        );

        assert_eq!(objects.len(), 2);
        assert_eq!(counts.max_combo, 1);
    }
}
