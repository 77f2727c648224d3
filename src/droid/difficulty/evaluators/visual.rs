use crate::{
    any::difficulty::object::IDifficultyObject,
    droid::difficulty::object::DroidDifficultyObject,
    osu::difficulty::object::HiddenFade,
    util::difficulty::reverse_lerp,
};

/// Reading difficulty: how many objects are on screen at once and how
/// hard they are to see.
pub struct VisualEvaluator {
    hidden: Option<HiddenFade>,
    /// Preempt as experienced by the player.
    real_preempt: f64,
}

impl VisualEvaluator {
    const DENSITY_MULTIPLIER: f64 = 0.25;
    const HIDDEN_MULTIPLIER: f64 = 0.5;
    const LOW_AR_MULTIPLIER: f64 = 0.3;
    const SLIDER_MULTIPLIER: f64 = 0.5;
    const MIN_VELOCITY: f64 = 0.5;

    pub fn new(hidden: Option<HiddenFade>, time_preempt: f64, clock_rate: f64) -> Self {
        Self {
            hidden,
            real_preempt: time_preempt / clock_rate,
        }
    }

    pub fn evaluate_diff_of(
        &self,
        curr: &DroidDifficultyObject<'_>,
        diff_objects: &[DroidDifficultyObject<'_>],
    ) -> f64 {
        if curr.idx == 0 || curr.base.is_spinner() {
            return 0.0;
        }

        // Opacity of upcoming objects while `curr` is being hit
        let mut note_density = 0.0;
        // Opacity lost to `Hidden`
        let mut faded = 0.0;

        for next in (0..).map_while(|i| curr.next(i, diff_objects)) {
            if next.start_time - curr.start_time > self.real_preempt {
                break;
            }

            if next.base.is_spinner() {
                continue;
            }

            let opacity = next.opacity_at(curr.base.start_time, self.hidden);
            note_density += opacity;

            if self.hidden.is_some() {
                faded += (next.opacity_at(curr.base.start_time, None) - opacity).max(0.0);
            }
        }

        let mut strain =
            note_density * Self::DENSITY_MULTIPLIER + faded * Self::HIDDEN_MULTIPLIER;

        strain *= 1.0 + Self::LOW_AR_MULTIPLIER * reverse_lerp(self.real_preempt, 1200.0, 1800.0);

        if curr.base.is_slider() {
            let velocity = curr.lazy_travel_dist / curr.travel_time;
            strain += (velocity - Self::MIN_VELOCITY).max(0.0).sqrt() * Self::SLIDER_MULTIPLIER;
        }

        strain * 1000.0 / curr.strain_time
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        model::{
            beatmap::Beatmap,
            hit_object::{HitObject, HitObjectKind, Pos},
            mods::Reflection,
        },
        osu::{
            convert::convert_objects,
            difficulty::{object::LazyTravel, scaling_factor::ScalingFactor},
        },
    };

    use super::*;

    fn evaluate(time_preempt: f64, hidden: Option<HiddenFade>) -> f64 {
        let map = Beatmap {
            hit_objects: (0..12)
                .map(|i| HitObject {
                    pos: Pos::new(100.0 + 30.0 * i as f32, 200.0),
                    start_time: 150.0 * f64::from(i),
                    kind: HitObjectKind::Circle,
                })
                .collect(),
            ..Default::default()
        };

        let scaling_factor = ScalingFactor::new(4.0);
        let (objects, _) = convert_objects(
            &map,
            &scaling_factor,
            Reflection::None,
            time_preempt,
            usize::MAX,
        );
        let travels: Vec<_> = objects
            .iter()
            .map(|h| LazyTravel::new(h, scaling_factor.radius))
            .collect();

        let diff_objects: Vec<_> = (0..objects.len())
            .map(|i| {
                DroidDifficultyObject::new(
                    &objects,
                    &travels,
                    i,
                    1.0,
                    &scaling_factor,
                    time_preempt,
                    time_preempt * 0.4,
                )
            })
            .collect();

        VisualEvaluator::new(hidden, time_preempt, 1.0).evaluate_diff_of(&diff_objects[4], &diff_objects)
    }

    #[test]
    fn lower_ar_is_harder_to_read() {
        assert!(evaluate(1800.0, None) > evaluate(600.0, None));
    }

    #[test]
    fn hidden_adds_difficulty() {
        let hidden = HiddenFade {
            duration_multiplier: 0.35,
            min_opacity: 0.0,
        };

        assert!(evaluate(1200.0, Some(hidden)) > evaluate(1200.0, None));
    }
}
