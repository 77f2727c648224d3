/// Hit windows of osu!droid in milliseconds.
///
/// Windows are narrower the higher the overall difficulty and shrink with
/// the clock rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DroidHitWindow {
    pub great: f64,
    pub ok: f64,
    pub meh: f64,
}

impl DroidHitWindow {
    pub fn new(od: f64, clock_rate: f64) -> Self {
        Self {
            great: (100.0 - 5.0 * od) / clock_rate,
            ok: (200.0 - 10.0 * od) / clock_rate,
            meh: (300.0 - 10.0 * od) / clock_rate,
        }
    }

    /// The osu!standard overall difficulty with the same great window.
    pub fn standard_od(&self) -> f64 {
        (80.0 - self.great) / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_narrow_with_od() {
        let od5 = DroidHitWindow::new(5.0, 1.0);
        let od10 = DroidHitWindow::new(10.0, 1.0);

        assert!((od5.great - 75.0).abs() < 1e-9);
        assert!((od5.ok - 150.0).abs() < 1e-9);
        assert!((od5.meh - 250.0).abs() < 1e-9);
        assert!(od10.great < od5.great);
    }

    #[test]
    fn clock_rate_raises_standard_od() {
        let nomod = DroidHitWindow::new(8.0, 1.0);
        let dt = DroidHitWindow::new(8.0, 1.5);

        assert!((dt.great - nomod.great / 1.5).abs() < 1e-9);
        assert!(dt.standard_od() > nomod.standard_od());
    }
}
