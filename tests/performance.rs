use proptest::prelude::*;
use rosu_droid_pp::{
    droid::{DroidDifficultyAttributes, DroidPenalties, DroidPerformance},
    osu::OsuPerformance,
    Difficulty,
};

use self::common::*;

mod common;

const HD: u32 = 8;
const FL: u32 = 1024;

fn droid_attrs(mods: u32) -> DroidDifficultyAttributes {
    Difficulty::new()
        .mods(mods)
        .calculate_droid(&jump_map())
        .unwrap()
}

#[test]
fn perfect_play_is_the_maximum() {
    let attrs = droid_attrs(0);
    let max_combo = attrs.max_combo;

    let perfect = DroidPerformance::new(attrs.clone()).calculate().unwrap();
    let missed = DroidPerformance::new(attrs.clone())
        .misses(3)
        .calculate()
        .unwrap();
    let broken = DroidPerformance::new(attrs.clone())
        .combo(max_combo / 2)
        .calculate()
        .unwrap();
    let inaccurate = DroidPerformance::new(attrs)
        .accuracy(90.0)
        .calculate()
        .unwrap();

    assert!(perfect.pp > 0.0);
    assert!(missed.pp < perfect.pp);
    assert!(broken.pp < perfect.pp);
    assert!(inaccurate.pp < perfect.pp);
}

#[test]
fn lowering_accuracy_never_raises_pp() {
    let attrs = droid_attrs(HD + FL);

    let mut prev = f64::MAX;

    for step in 0..=200 {
        let acc = 100.0 - f64::from(step) * 0.1;

        let pp = DroidPerformance::new(attrs.clone())
            .mods(HD + FL)
            .accuracy(acc)
            .calculate()
            .unwrap()
            .pp;

        assert!(pp <= prev, "{acc}% gave {pp}pp after {prev}pp");
        prev = pp;
    }
}

#[test]
fn spinner_only_map_has_no_accuracy_pp() {
    let map = spinner_map();

    for acc in [100.0, 95.0, 60.0] {
        let attrs = DroidPerformance::new(&map)
            .accuracy(acc)
            .combo(2)
            .calculate()
            .unwrap();

        assert_eq!(attrs.pp_accuracy, 0.0);
        assert!(attrs.pp.is_finite());
    }
}

#[test]
fn tap_penalty_is_neutral_at_one() {
    let attrs = droid_attrs(0);

    let plain = DroidPerformance::new(attrs.clone()).calculate().unwrap();
    let neutral = DroidPerformance::new(attrs.clone())
        .penalties(DroidPenalties::NONE.tap(1.0))
        .calculate()
        .unwrap();
    let penalized = DroidPerformance::new(attrs)
        .penalties(DroidPenalties::NONE.tap(1.5))
        .calculate()
        .unwrap();

    assert_eq!(plain, neutral);
    assert!(penalized.pp_tap < plain.pp_tap);
    assert_eq!(penalized.pp_aim, plain.pp_aim);
}

#[test]
fn slider_cheese_penalties_hit_their_component() {
    let attrs = droid_attrs(FL);

    let plain = DroidPerformance::new(attrs.clone())
        .mods(FL)
        .calculate()
        .unwrap();
    let penalized = DroidPerformance::new(attrs)
        .mods(FL)
        .penalties(
            DroidPenalties::NONE
                .aim_slider_cheese(1.2)
                .flashlight_slider_cheese(1.1)
                .visual_slider_cheese(1.3),
        )
        .calculate()
        .unwrap();

    assert!(penalized.pp_aim < plain.pp_aim);
    assert!(penalized.pp_flashlight < plain.pp_flashlight);
    assert!(penalized.pp_visual < plain.pp_visual);
    assert_eq!(penalized.pp_tap, plain.pp_tap);
}

#[test]
fn flashlight_pp_needs_mod() {
    let nomod = DroidPerformance::new(droid_attrs(0)).calculate().unwrap();
    let fl = DroidPerformance::new(droid_attrs(FL))
        .mods(FL)
        .calculate()
        .unwrap();

    assert_eq!(nomod.pp_flashlight, 0.0);
    assert!(fl.pp_flashlight > 0.0);
}

#[test]
fn lower_od_lowers_mechanical_pp() {
    let attrs = droid_attrs(FL);

    let calculate = |od: f64| {
        DroidPerformance::new(DroidDifficultyAttributes { od, ..attrs.clone() })
            .mods(FL)
            .combo(attrs.max_combo)
            .accuracy(97.0)
            .calculate()
            .unwrap()
    };

    let high = calculate(1.0);
    let low = calculate(-1.0);

    assert!(low.pp_aim < high.pp_aim);
    assert!(low.pp_tap < high.pp_tap);
    assert!(low.pp_flashlight < high.pp_flashlight);
    assert!(low.pp.is_finite());
}

#[test]
fn summary_uses_two_decimals() {
    let attrs = DroidPerformance::new(droid_attrs(0)).calculate().unwrap();
    let summary = attrs.to_string();

    assert!(summary.starts_with(&format!("{:.2} pp (", attrs.pp)));
    assert!(summary.contains(&format!("{:.2} tap", attrs.pp_tap)));
}

#[test]
fn osu_perfect_play_is_the_maximum() {
    let map = jump_map();

    let perfect = OsuPerformance::new(&map).calculate().unwrap();
    let missed = OsuPerformance::new(perfect.clone())
        .misses(2)
        .calculate()
        .unwrap();

    assert!(perfect.pp > 0.0);
    assert!(missed.pp < perfect.pp);
    assert_eq!(OsuPerformance::new(&spinner_map()).calculate().unwrap().pp_acc, 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn droid_pp_is_finite(
        acc in 0.0..100.0_f64,
        misses in 0..20_u32,
        combo_share in 0.0..1.0_f64,
        tap_penalty in 0.0..3.0_f64,
    ) {
        let attrs = droid_attrs(0);
        let combo = (f64::from(attrs.max_combo) * combo_share) as u32;

        let perf = DroidPerformance::new(attrs)
            .accuracy(acc)
            .misses(misses)
            .combo(combo)
            .penalties(DroidPenalties::NONE.tap(tap_penalty))
            .calculate()
            .unwrap();

        prop_assert!(perf.pp.is_finite());
        prop_assert!(perf.pp >= 0.0);
        prop_assert!(perf.effective_miss_count >= 0.0);
        prop_assert!(perf.effective_miss_count.is_finite());
    }
}
