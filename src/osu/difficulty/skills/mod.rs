use crate::util::{difficulty::logistic, float_ext::FloatExt};

pub use self::{aim::Aim, flashlight::Flashlight, speed::Speed};

mod aim;
mod flashlight;
mod speed;

/// Soft count of slider strains that are close to the top strain.
pub fn count_top_weighted_sliders(slider_strains: &[f64], difficulty_value: f64) -> f64 {
    if slider_strains.is_empty() {
        return 0.0;
    }

    // Top strain if all strains were identical
    let consistent_top_strain = difficulty_value / 10.0;

    if FloatExt::eq(consistent_top_strain, 0.0) {
        return 0.0;
    }

    slider_strains
        .iter()
        .map(|strain| logistic(strain / consistent_top_strain, 0.88, 10.0, Some(1.1)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sliders_no_count() {
        assert!(count_top_weighted_sliders(&[], 100.0).eq(0.0));
        assert!(count_top_weighted_sliders(&[1.0, 2.0], 0.0).eq(0.0));
    }

    #[test]
    fn top_sliders_count_most() {
        let strong = count_top_weighted_sliders(&[20.0], 100.0);
        let top = count_top_weighted_sliders(&[10.0], 100.0);
        let weak = count_top_weighted_sliders(&[1.0], 100.0);

        assert!(strong > 1.0);
        assert!((top - 1.1 / (1.0 + (-1.2_f64).exp())).abs() < 1e-12);
        assert!(weak < 0.01);
    }
}
