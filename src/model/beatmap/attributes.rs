use crate::{
    any::difficulty::{Difficulty, ModsDependent},
    model::mods::GameMods,
};

use super::Beatmap;

/// Summary struct for a [`Beatmap`]'s attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatmapAttributes {
    /// The approach rate.
    pub ar: f64,
    /// The overall difficulty.
    pub od: f64,
    /// The circle size.
    pub cs: f64,
    /// The health drain rate
    pub hp: f64,
    /// The clock rate with respect to mods.
    pub clock_rate: f64,
    /// The hit windows for approach rate and overall difficulty.
    pub hit_windows: HitWindows,
}

/// AR and OD hit windows
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitWindows {
    /// Hit window for approach rate i.e. `TimePreempt` in milliseconds.
    pub ar: f64,
    /// Hit window for overall difficulty i.e. time to hit a 300 ("Great") in milliseconds.
    pub od_great: f64,
    /// Hit window for a 100 ("Ok") in milliseconds.
    pub od_ok: f64,
    /// Hit window for a 50 ("Meh") in milliseconds.
    pub od_meh: f64,
}

/// A builder for [`BeatmapAttributes`] and [`HitWindows`].
#[derive(Clone, Debug, PartialEq)]
#[must_use]
pub struct BeatmapAttributesBuilder {
    ar: ModsDependent,
    od: ModsDependent,
    cs: ModsDependent,
    hp: ModsDependent,
    mods: GameMods,
    clock_rate: Option<f64>,
}

impl BeatmapAttributesBuilder {
    const GREAT_MIN: f64 = 80.0;
    const GREAT_MID: f64 = 50.0;
    const GREAT_MAX: f64 = 20.0;

    const OK_MIN: f64 = 140.0;
    const OK_MID: f64 = 100.0;
    const OK_MAX: f64 = 60.0;

    const MEH_MIN: f64 = 200.0;
    const MEH_MID: f64 = 150.0;
    const MEH_MAX: f64 = 100.0;

    /// Create a new [`BeatmapAttributesBuilder`].
    ///
    /// All attributes are set to `5.0`.
    pub const fn new() -> Self {
        Self {
            ar: ModsDependent::new(5.0),
            od: ModsDependent::new(5.0),
            cs: ModsDependent::new(5.0),
            hp: ModsDependent::new(5.0),
            mods: GameMods::DEFAULT,
            clock_rate: None,
        }
    }

    /// Use the given [`Beatmap`]'s attributes.
    pub fn map(self, map: &Beatmap) -> Self {
        Self {
            ar: ModsDependent::new(map.ar),
            od: ModsDependent::new(map.od),
            cs: ModsDependent::new(map.cs),
            hp: ModsDependent::new(map.hp),
            ..self
        }
    }

    /// Specify the approach rate.
    ///
    /// If `fixed` is `true`, the value will be used as is, otherwise it will
    /// be adjusted by mods.
    pub fn ar(self, ar: f32, fixed: bool) -> Self {
        Self {
            ar: ModsDependent { value: ar, fixed },
            ..self
        }
    }

    /// Specify the overall difficulty.
    ///
    /// If `fixed` is `true`, the value will be used as is, otherwise it will
    /// be adjusted by mods.
    pub fn od(self, od: f32, fixed: bool) -> Self {
        Self {
            od: ModsDependent { value: od, fixed },
            ..self
        }
    }

    /// Specify the circle size.
    ///
    /// If `fixed` is `true`, the value will be used as is, otherwise it will
    /// be adjusted by mods.
    pub fn cs(self, cs: f32, fixed: bool) -> Self {
        Self {
            cs: ModsDependent { value: cs, fixed },
            ..self
        }
    }

    /// Specify the drain rate.
    ///
    /// If `fixed` is `true`, the value will be used as is, otherwise it will
    /// be adjusted by mods.
    pub fn hp(self, hp: f32, fixed: bool) -> Self {
        Self {
            hp: ModsDependent { value: hp, fixed },
            ..self
        }
    }

    /// Specify the mods.
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Specify a custom clock rate.
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        Self {
            clock_rate: Some(clock_rate),
            ..self
        }
    }

    /// Specify all settings through [`Difficulty`].
    pub fn difficulty(self, difficulty: &Difficulty) -> Self {
        Self {
            ar: difficulty.get_ar().unwrap_or(self.ar),
            od: difficulty.get_od().unwrap_or(self.od),
            cs: difficulty.get_cs().unwrap_or(self.cs),
            hp: difficulty.get_hp().unwrap_or(self.hp),
            mods: difficulty.get_mods().clone(),
            clock_rate: Some(difficulty.get_clock_rate()),
        }
    }

    fn clock_rate_or_mods(&self) -> f64 {
        self.clock_rate.unwrap_or_else(|| self.mods.clock_rate())
    }

    /// The overall difficulty after applying `HardRock` or `Easy` but
    /// before the clock rate is accounted for.
    pub fn mod_adjusted_od(&self) -> f64 {
        self.adjust(self.od)
    }

    /// The approach rate after applying `HardRock` or `Easy` but before the
    /// clock rate is accounted for.
    pub fn mod_adjusted_ar(&self) -> f64 {
        self.adjust(self.ar)
    }

    fn adjust(&self, attr: ModsDependent) -> f64 {
        let value = f64::from(attr.value);

        if attr.fixed {
            value
        } else if self.mods.hr() {
            (value * 1.4).min(10.0)
        } else if self.mods.ez() {
            value * 0.5
        } else {
            value
        }
    }

    /// Calculate the AR and OD hit windows.
    pub fn hit_windows(&self) -> HitWindows {
        let clock_rate = self.clock_rate_or_mods();
        let ar_clock_rate = if self.ar.fixed { 1.0 } else { clock_rate };
        let od_clock_rate = if self.od.fixed { 1.0 } else { clock_rate };

        let preempt =
            difficulty_range(self.mod_adjusted_ar(), 1800.0, 1200.0, 450.0) / ar_clock_rate;

        let od = self.mod_adjusted_od();

        let window = |min, mid, max| difficulty_range(od, min, mid, max) / od_clock_rate;

        HitWindows {
            ar: preempt,
            od_great: window(Self::GREAT_MIN, Self::GREAT_MID, Self::GREAT_MAX),
            od_ok: window(Self::OK_MIN, Self::OK_MID, Self::OK_MAX),
            od_meh: window(Self::MEH_MIN, Self::MEH_MID, Self::MEH_MAX),
        }
    }

    /// Calculate the [`BeatmapAttributes`].
    pub fn build(&self) -> BeatmapAttributes {
        let clock_rate = self.clock_rate_or_mods();

        // HP
        let mut hp = f64::from(self.hp.value);

        if !self.hp.fixed {
            hp *= self.mods.od_ar_hp_multiplier();
        }

        hp = hp.min(10.0);

        // CS
        let mut cs = f64::from(self.cs.value);

        if !self.cs.fixed {
            if self.mods.hr() {
                cs = (cs * 1.3).min(10.0);
            } else if self.mods.ez() {
                cs *= 0.5;
            }
        }

        let hit_windows = self.hit_windows();

        // AR
        let ar = if hit_windows.ar > 1200.0 {
            (1800.0 - hit_windows.ar) / 120.0
        } else {
            (1200.0 - hit_windows.ar) / 150.0 + 5.0
        };

        // OD
        let od = (Self::GREAT_MIN - hit_windows.od_great) / 6.0;

        BeatmapAttributes {
            ar,
            od,
            cs,
            hp,
            clock_rate,
            hit_windows,
        }
    }
}

impl From<&Beatmap> for BeatmapAttributesBuilder {
    fn from(map: &Beatmap) -> Self {
        Self::new().map(map)
    }
}

impl Default for BeatmapAttributesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a difficulty value in `[0, 10]` onto `[min, max]` with `mid` at `5`.
pub fn difficulty_range(difficulty: f64, min: f64, mid: f64, max: f64) -> f64 {
    if difficulty > 5.0 {
        mid + (max - mid) * (difficulty - 5.0) / 5.0
    } else if difficulty < 5.0 {
        mid - (mid - min) * (5.0 - difficulty) / 5.0
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use crate::util::float_ext::FloatExt;

    use super::*;

    #[test]
    fn consider_mods() {
        let attrs = BeatmapAttributesBuilder::new()
            .ar(8.5, false)
            .mods(64)
            .build();

        let expected = 10.0;

        assert!(attrs.ar.eq(expected), "{} != {expected}", attrs.ar);
    }

    #[test]
    fn skip_mods() {
        let attrs = BeatmapAttributesBuilder::new()
            .ar(8.5, true)
            .mods(64)
            .build();

        let expected = 8.5;

        assert!(attrs.ar.eq(expected), "{} != {expected}", attrs.ar);
    }

    #[test]
    fn hard_rock_caps_at_ten() {
        let builder = BeatmapAttributesBuilder::new().od(9.0, false).mods(16);

        assert!(builder.mod_adjusted_od().eq(10.0));
        assert!((builder.build().od - 10.0).abs() < 1e-9);
    }

    #[test]
    fn windows_shrink_with_clock_rate() {
        let nomod = BeatmapAttributesBuilder::new().od(5.0, false).hit_windows();
        let dt = BeatmapAttributesBuilder::new()
            .od(5.0, false)
            .mods(64)
            .hit_windows();

        assert!(nomod.od_great.eq(50.0));
        assert!(nomod.od_ok.eq(100.0));
        assert!(nomod.od_meh.eq(150.0));
        assert!((dt.od_great - 50.0 / 1.5).abs() < 1e-9);
    }
}
