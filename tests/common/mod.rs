#![allow(dead_code)]

use rosu_droid_pp::{
    model::{
        control_point::TimingPoint,
        hit_object::{HitObject, HitObjectKind, PathControlPoint, PathType, Pos, Slider, Spinner},
    },
    Beatmap,
};

/// 180 BPM
pub const BEAT_LEN: f64 = 333.3333;

/// Jumps across the playfield in 1/2 with a short stream and some sliders
/// in between.
pub fn jump_map() -> Beatmap {
    let mut hit_objects = Vec::new();
    let mut time = 1000.0;

    for i in 0..96 {
        let pos = match i % 4 {
            0 => Pos::new(64.0, 64.0),
            1 => Pos::new(448.0, 320.0),
            2 => Pos::new(448.0, 64.0),
            _ => Pos::new(64.0, 320.0),
        };

        hit_objects.push(HitObject {
            pos,
            start_time: time,
            kind: HitObjectKind::Circle,
        });

        time += BEAT_LEN / 2.0;
    }

    for i in 0..32 {
        let x = 200.0 + 20.0 * (i % 4) as f32;

        hit_objects.push(HitObject {
            pos: Pos::new(x, 192.0),
            start_time: time,
            kind: HitObjectKind::Circle,
        });

        time += BEAT_LEN / 4.0;
    }

    for i in 0..16 {
        let y = if i % 2 == 0 { 100.0 } else { 280.0 };

        hit_objects.push(HitObject {
            pos: Pos::new(100.0, y),
            start_time: time,
            kind: HitObjectKind::Slider(linear_slider()),
        });

        time += BEAT_LEN * 2.0;
    }

    hit_objects.push(HitObject {
        pos: Pos::new(256.0, 192.0),
        start_time: time,
        kind: HitObjectKind::Spinner(Spinner {
            duration: 2000.0,
        }),
    });

    Beatmap {
        ar: 9.0,
        cs: 4.0,
        od: 8.0,
        hp: 5.0,
        timing_points: vec![TimingPoint::new(0.0, BEAT_LEN)],
        hit_objects,
        ..Default::default()
    }
}

/// Nothing but spinners.
pub fn spinner_map() -> Beatmap {
    let hit_objects = (0..3)
        .map(|i| HitObject {
            pos: Pos::new(256.0, 192.0),
            start_time: 1000.0 + 4000.0 * f64::from(i),
            kind: HitObjectKind::Spinner(Spinner {
                duration: 3000.0,
            }),
        })
        .collect();

    Beatmap {
        timing_points: vec![TimingPoint::new(0.0, BEAT_LEN)],
        hit_objects,
        ..Default::default()
    }
}

fn linear_slider() -> Slider {
    let control_points = vec![
        PathControlPoint {
            pos: Pos::new(0.0, 0.0),
            path_type: Some(PathType::LINEAR),
        },
        PathControlPoint {
            pos: Pos::new(200.0, 0.0),
            path_type: None,
        },
    ];

    Slider {
        expected_dist: Some(200.0),
        repeats: 0,
        control_points: control_points.into_boxed_slice(),
    }
}
