use crate::util::{difficulty::lerp, float_ext::FloatExt};

use super::object::{HasStartTime, IDifficultyObject};

/// Tuning of the strain aggregation shared by all skills.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StrainSkillConfig {
    /// Width of a strain section in milliseconds.
    pub section_length: f64,
    /// Weight factor between consecutive sorted peaks.
    pub decay_weight: f64,
    /// Amount of top peaks that are scaled down before weighting.
    ///
    /// `0` disables the reduction.
    pub reduced_section_count: usize,
    /// Scale applied to the highest peak when reducing.
    pub reduced_strain_baseline: f64,
}

impl StrainSkillConfig {
    pub const DEFAULT: Self = Self {
        section_length: 400.0,
        decay_weight: 0.9,
        reduced_section_count: 0,
        reduced_strain_baseline: 0.75,
    };

    /// Reduce the `count` highest peaks, as done for the mechanical skills.
    pub const fn reduced(count: usize) -> Self {
        Self {
            reduced_section_count: count,
            ..Self::DEFAULT
        }
    }
}

impl Default for StrainSkillConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-object strain formula of a skill.
///
/// Implementors only describe how strain evolves; sectioning and
/// aggregation are handled by [`Strain`].
pub trait StrainSkill {
    type DifficultyObject<'a>: IDifficultyObject + HasStartTime;

    /// Strain carried over to the start of a new section at `time`.
    fn calculate_initial_strain<'a>(
        &mut self,
        time: f64,
        curr: &Self::DifficultyObject<'a>,
        objects: &[Self::DifficultyObject<'a>],
    ) -> f64;

    /// Strain after processing `curr`.
    fn strain_value_at<'a>(
        &mut self,
        curr: &Self::DifficultyObject<'a>,
        objects: &[Self::DifficultyObject<'a>],
    ) -> f64;
}

/// Sectioned strain state of a single skill.
#[derive(Clone, Debug)]
pub struct Strain<S> {
    config: StrainSkillConfig,
    current_section_peak: f64,
    current_section_end: f64,
    strain_peaks: Vec<f64>,
    object_strains: Vec<f64>,
    inner: S,
}

impl<S: StrainSkill> Strain<S> {
    pub fn new(inner: S, config: StrainSkillConfig) -> Self {
        Self {
            config,
            current_section_peak: 0.0,
            current_section_end: 0.0,
            strain_peaks: Vec::with_capacity(256),
            object_strains: Vec::with_capacity(256),
            inner,
        }
    }

    pub fn process<'a>(
        &mut self,
        curr: &S::DifficultyObject<'a>,
        objects: &[S::DifficultyObject<'a>],
    ) {
        let section_length = self.config.section_length;

        if curr.idx() == 0 {
            self.current_section_end =
                (curr.start_time() / section_length).ceil() * section_length;
        }

        while curr.start_time() > self.current_section_end {
            self.strain_peaks.push(self.current_section_peak);
            self.current_section_peak =
                self.inner
                    .calculate_initial_strain(self.current_section_end, curr, objects);
            self.current_section_end += section_length;
        }

        let strain = self.inner.strain_value_at(curr, objects);
        self.current_section_peak = self.current_section_peak.max(strain);
        self.object_strains.push(strain);
    }

    /// Process the first `count` objects of `objects`.
    pub fn process_first<'a>(&mut self, objects: &[S::DifficultyObject<'a>], count: usize) {
        for curr in objects.iter().take(count) {
            self.process(curr, objects);
        }
    }

    /// Peaks of all sections in time order, including the one currently in
    /// progress.
    pub fn section_peaks(&self) -> Vec<f64> {
        let mut peaks = self.strain_peaks.clone();
        peaks.push(self.current_section_peak);

        peaks
    }

    /// Peaks of all sections, hardest first.
    pub fn peaks(&self) -> Vec<f64> {
        let mut peaks = self.section_peaks();
        peaks.sort_by(|a, b| b.total_cmp(a));

        peaks
    }

    /// Strain of each processed object in processing order.
    pub fn object_strains(&self) -> &[f64] {
        &self.object_strains
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Weighted sum of the sorted section peaks.
    pub fn difficulty_value(&self) -> f64 {
        difficulty_value(self.peaks(), &self.config)
    }

    /// Amount of objects whose strain is close to the top strain.
    pub fn count_top_weighted_strains(&self, difficulty_value: f64) -> f64 {
        count_top_weighted_strains(&self.object_strains, difficulty_value)
    }
}

/// Sums `peaks` in descending order, each weighted by the config's decay
/// weight to the power of its rank. Zero peaks are ignored.
pub fn difficulty_value(mut peaks: Vec<f64>, config: &StrainSkillConfig) -> f64 {
    peaks.retain(|&peak| peak > 0.0);
    peaks.sort_by(|a, b| b.total_cmp(a));

    let reduced_count = config.reduced_section_count;

    if reduced_count > 0 {
        for (i, strain) in peaks.iter_mut().take(reduced_count).enumerate() {
            let clamped = (i as f64 / reduced_count as f64).clamp(0.0, 1.0);
            let scale = f64::log10(lerp(1.0, 10.0, clamped));
            *strain *= lerp(config.reduced_strain_baseline, 1.0, scale);
        }

        peaks.sort_by(|a, b| b.total_cmp(a));
    }

    let mut difficulty = 0.0;
    let mut weight = 1.0;

    for strain in peaks {
        difficulty += strain * weight;
        weight *= config.decay_weight;
    }

    difficulty
}

pub fn count_top_weighted_strains(object_strains: &[f64], difficulty_value: f64) -> f64 {
    if object_strains.is_empty() {
        return 0.0;
    }

    // What the top strain would be if all strain values were identical
    let consistent_top_strain = difficulty_value / 10.0;

    if FloatExt::eq(consistent_top_strain, 0.0) {
        return object_strains.len() as f64;
    }

    object_strains
        .iter()
        .map(|s| 1.1 / (1.0 + f64::exp(-10.0 * (s / consistent_top_strain - 0.88))))
        .sum()
}

pub fn strain_decay(ms: f64, strain_decay_base: f64) -> f64 {
    f64::powf(strain_decay_base, ms / 1000.0)
}

/// Soft count of strains close to the highest one.
///
/// Each strain contributes a logistic weight of its ratio to the maximum,
/// so the count is continuous rather than a hard threshold.
pub fn difficult_strain_count(strains: &[f64]) -> f64 {
    let max_strain = strains.iter().copied().fold(0.0, f64::max);

    if max_strain <= 0.0 {
        return 0.0;
    }

    strains
        .iter()
        .map(|strain| (1.0 + f64::exp(-(strain / max_strain * 12.0 - 6.0))).recip())
        .sum()
}

/// Performance of a mechanical skill given its rating.
pub fn difficulty_to_performance(difficulty: f64) -> f64 {
    f64::powf(5.0 * f64::max(1.0, difficulty / 0.0675) - 4.0, 3.0) / 100_000.0
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    struct Obj {
        idx: usize,
        time: f64,
        value: f64,
    }

    impl IDifficultyObject for Obj {
        fn idx(&self) -> usize {
            self.idx
        }
    }

    impl HasStartTime for Obj {
        fn start_time(&self) -> f64 {
            self.time
        }
    }

    struct Decaying {
        current: f64,
    }

    impl StrainSkill for Decaying {
        type DifficultyObject<'a> = Obj;

        fn calculate_initial_strain<'a>(
            &mut self,
            time: f64,
            curr: &Obj,
            objects: &[Obj],
        ) -> f64 {
            let prev_time = curr.previous(0, objects).map_or(0.0, HasStartTime::start_time);

            self.current * strain_decay(time - prev_time, 0.15)
        }

        fn strain_value_at<'a>(&mut self, curr: &Obj, objects: &[Obj]) -> f64 {
            let delta = curr
                .previous(0, objects)
                .map_or(0.0, |prev| curr.time - prev.time);

            self.current *= strain_decay(delta, 0.15);
            self.current += curr.value;

            self.current
        }
    }

    fn objects(times_values: &[(f64, f64)]) -> Vec<Obj> {
        times_values
            .iter()
            .enumerate()
            .map(|(idx, &(time, value))| Obj { idx, time, value })
            .collect()
    }

    fn run(objects: &[Obj], config: StrainSkillConfig) -> Strain<Decaying> {
        let mut skill = Strain::new(Decaying { current: 0.0 }, config);

        for obj in objects {
            skill.process(obj, objects);
        }

        skill
    }

    #[test]
    fn weighted_sum_of_sorted_peaks() {
        let config = StrainSkillConfig::DEFAULT;
        let value = difficulty_value(vec![1.0, 0.0, 3.0, 2.0], &config);

        assert!((value - (3.0 + 2.0 * 0.9 + 1.0 * 0.81)).abs() < 1e-12);
    }

    #[test]
    fn one_peak_per_section() {
        let objects = objects(&[(100.0, 1.0), (900.0, 1.0), (1700.0, 1.0)]);
        let skill = run(&objects, StrainSkillConfig::DEFAULT);

        // Sections end at 400, 800, 1200, 1600 and the open one at 2000
        assert_eq!(skill.peaks().len(), 5);
        assert_eq!(skill.object_strains().len(), 3);
    }

    #[test]
    fn peaks_are_sorted_descending() {
        let objects = objects(&[(100.0, 1.0), (900.0, 8.0), (1700.0, 3.0)]);
        let skill = run(&objects, StrainSkillConfig::DEFAULT);

        let peaks = skill.peaks();
        assert!(peaks.windows(2).all(|w| w[0] >= w[1]));

        let mut section_peaks = skill.section_peaks();
        section_peaks.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(peaks, section_peaks);
    }

    #[test]
    fn empty_skill_is_zero() {
        let skill = run(&[], StrainSkillConfig::DEFAULT);

        assert!(skill.difficulty_value().eq(0.0));
        assert!(skill.count_top_weighted_strains(0.0).eq(0.0));
    }

    #[test]
    fn reduction_lowers_value() {
        let objects = objects(&[(100.0, 5.0), (500.0, 4.0), (900.0, 3.0), (1300.0, 2.0)]);

        let plain = run(&objects, StrainSkillConfig::DEFAULT).difficulty_value();
        let reduced = run(&objects, StrainSkillConfig::reduced(10)).difficulty_value();

        assert!(reduced < plain);
        assert!(reduced > 0.0);
    }

    #[test]
    fn difficult_strain_count_of_equal_strains() {
        let count = difficult_strain_count(&[2.0, 2.0, 2.0]);
        let single = (1.0 + f64::exp(-6.0)).recip();

        assert!((count - 3.0 * single).abs() < 1e-12);
        assert!(difficult_strain_count(&[]).eq(0.0));
        assert!(difficult_strain_count(&[0.0, 0.0]).eq(0.0));
    }

    #[test]
    fn performance_of_trivial_difficulty() {
        // Ratings below the threshold all map onto the same minimum
        assert!((difficulty_to_performance(0.0) - 1e-5).abs() < 1e-15);
        assert!(difficulty_to_performance(1.0) > difficulty_to_performance(0.5));
    }

    proptest! {
        #[test]
        fn deterministic_and_finite(values in prop::collection::vec((1.0..500.0_f64, 0.0..10.0_f64), 1..64)) {
            let mut time = 0.0;
            let pairs: Vec<_> = values
                .into_iter()
                .map(|(delta, value)| {
                    time += delta;

                    (time, value)
                })
                .collect();

            let objects = objects(&pairs);
            let a = run(&objects, StrainSkillConfig::reduced(10)).difficulty_value();
            let b = run(&objects, StrainSkillConfig::reduced(10)).difficulty_value();

            prop_assert!(a.is_finite());
            prop_assert!(a >= 0.0);
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }

        #[test]
        fn bounded_by_geometric_series(peaks in prop::collection::vec(0.0..100.0_f64, 0..128)) {
            let max = peaks.iter().copied().fold(0.0, f64::max);
            let value = difficulty_value(peaks, &StrainSkillConfig::DEFAULT);

            prop_assert!(value <= max * 10.0 + 1e-9);
        }
    }
}
