use rosu_droid_pp::{
    model::mode::{ConvertError, GameMode},
    Beatmap, Difficulty,
};

use self::common::*;

mod common;

const HD: u32 = 8;
const DT: u32 = 64;
const RX: u32 = 128;
const FL: u32 = 1024;
const AP: u32 = 8192;

#[test]
fn droid_nomod_components() {
    let attrs = Difficulty::new().calculate_droid(&jump_map()).unwrap();

    assert!(attrs.aim > 0.0);
    assert!(attrs.tap > 0.0);
    assert!(attrs.rhythm >= 0.0);
    assert!(attrs.visual > 0.0);
    assert_eq!(attrs.flashlight, 0.0);
    assert!(attrs.stars > 0.0);
    assert!(attrs.stars.is_finite());
    assert_eq!(attrs.n_circles, 128);
    assert_eq!(attrs.n_sliders, 16);
    assert_eq!(attrs.n_spinners, 1);
}

#[test]
fn droid_calculation_is_deterministic() {
    let map = jump_map();

    let a = Difficulty::new().mods(HD + FL).calculate_droid(&map).unwrap();
    let b = Difficulty::new().mods(HD + FL).calculate_droid(&map).unwrap();

    assert_eq!(a, b);
}

#[test]
fn flashlight_needs_mod() {
    let map = jump_map();

    let nomod = Difficulty::new().calculate_droid(&map).unwrap();
    let fl = Difficulty::new().mods(FL).calculate_droid(&map).unwrap();

    assert_eq!(nomod.flashlight, 0.0);
    assert!(fl.flashlight > 0.0);
    assert!(fl.stars > nomod.stars);
}

#[test]
fn double_time_raises_mechanical_skills() {
    let map = jump_map();

    let nomod = Difficulty::new().mods(FL).calculate_droid(&map).unwrap();
    let dt = Difficulty::new().mods(FL + DT).calculate_droid(&map).unwrap();

    assert!(dt.aim > nomod.aim);
    assert!(dt.tap > nomod.tap);
    assert!(dt.flashlight > nomod.flashlight);
    assert!(dt.stars > nomod.stars);
    assert!(dt.rhythm.is_finite());
}

#[test]
fn relax_zeroes_tap_and_rhythm_in_any_order() {
    let map = jump_map();
    let relax = Difficulty::new().mods(RX);

    let mut attrs = Difficulty::new().calculate_droid(&map).unwrap();
    assert!(attrs.tap > 0.0);

    attrs.recompute_rhythm(&relax, &map).unwrap();
    attrs.recompute_tap(&relax, &map).unwrap();

    assert_eq!(attrs.tap, 0.0);
    assert_eq!(attrs.rhythm, 0.0);

    let mut attrs = relax.calculate_droid(&map).unwrap();
    attrs.recompute_tap(&relax, &map).unwrap();
    attrs.recompute_rhythm(&relax, &map).unwrap();

    assert_eq!(attrs.tap, 0.0);
    assert_eq!(attrs.rhythm, 0.0);
}

#[test]
fn autopilot_zeroes_aim() {
    let map = jump_map();
    let autopilot = Difficulty::new().mods(AP);

    let mut attrs = Difficulty::new().calculate_droid(&map).unwrap();
    attrs.recompute_aim(&autopilot, &map).unwrap();

    assert_eq!(attrs.aim, 0.0);
    assert_eq!(autopilot.calculate_droid(&map).unwrap().aim, 0.0);
}

#[test]
fn recompute_replaces_only_its_component() {
    let map = jump_map();

    let nomod = Difficulty::new().calculate_droid(&map).unwrap();

    let mut attrs = nomod.clone();
    attrs.recompute_visual(&Difficulty::new().mods(HD), &map).unwrap();

    assert!(attrs.visual > nomod.visual);
    assert_eq!(attrs.aim, nomod.aim);
    assert_eq!(attrs.tap, nomod.tap);
    assert_eq!(attrs.rhythm, nomod.rhythm);
    assert!(attrs.stars > nomod.stars);
}

#[test]
fn recompute_matches_full_calculation() {
    let map = jump_map();
    let difficulty = Difficulty::new().mods(DT);

    let full = difficulty.calculate_droid(&map).unwrap();

    let mut attrs = Difficulty::new().calculate_droid(&map).unwrap();
    attrs.recompute_tap(&difficulty, &map).unwrap();

    assert_eq!(attrs.tap, full.tap);
    assert_eq!(attrs.speed_note_count, full.speed_note_count);
}

#[test]
fn passed_objects_limit_the_calculation() {
    let map = jump_map();

    let full = Difficulty::new().calculate_droid(&map).unwrap();
    let partial = Difficulty::new()
        .passed_objects(50)
        .calculate_droid(&map)
        .unwrap();

    assert_eq!(partial.n_objects(), 50);
    assert!(partial.stars <= full.stars);
}

#[test]
fn empty_map_has_no_stars() {
    let map = Beatmap::default();

    assert_eq!(Difficulty::new().calculate_droid(&map).unwrap().stars, 0.0);
    assert_eq!(Difficulty::new().calculate_osu(&map).unwrap().stars, 0.0);
}

#[test]
fn other_modes_are_rejected() {
    let map = Beatmap {
        mode: GameMode::Taiko,
        ..jump_map()
    };

    assert_eq!(
        Difficulty::new().calculate_droid(&map).unwrap_err(),
        ConvertError::IncompatibleMode(GameMode::Taiko)
    );
    assert!(Difficulty::new().calculate_osu(&map).is_err());
}

#[test]
fn osu_double_time_raises_skills() {
    let map = jump_map();

    let nomod = Difficulty::new().calculate_osu(&map).unwrap();
    let dt = Difficulty::new().mods(DT).calculate_osu(&map).unwrap();

    assert!(nomod.aim > 0.0);
    assert!(nomod.speed > 0.0);
    assert!(dt.aim > nomod.aim);
    assert!(dt.speed > nomod.speed);
    assert!(dt.stars > nomod.stars);
}

#[test]
fn osu_recompute_flashlight() {
    let map = jump_map();

    let mut attrs = Difficulty::new().calculate_osu(&map).unwrap();
    let aim = attrs.aim;

    attrs
        .recompute_flashlight(&Difficulty::new().mods(FL), &map)
        .unwrap();

    assert!(attrs.flashlight > 0.0);
    assert_eq!(attrs.aim, aim);
}
