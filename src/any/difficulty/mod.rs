use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{
    droid::{DroidDifficultyAttributes, DroidDifficultyCalculator},
    model::{beatmap::Beatmap, mode::ConvertError, mods::GameMods},
    osu::{OsuDifficultyAttributes, OsuDifficultyCalculator},
};

pub mod object;
pub mod skills;

/// Difficulty calculator on osu!standard maps, for either ruleset.
///
/// # Example
///
/// ```
/// use rosu_droid_pp::{Beatmap, Difficulty};
///
/// let map = Beatmap::default();
///
/// let attrs = Difficulty::new()
///     .mods(8 + 1024) // HDFL
///     .od(9.0, false)
///     .calculate_droid(&map)
///     .unwrap();
///
/// assert_eq!(attrs.n_objects(), 0);
/// ```
#[derive(Clone, PartialEq)]
#[must_use]
pub struct Difficulty {
    mods: GameMods,
    passed_objects: Option<u32>,
    clock_rate: Option<f32>,
    ar: Option<ModsDependent>,
    cs: Option<ModsDependent>,
    hp: Option<ModsDependent>,
    od: Option<ModsDependent>,
}

/// Wrapper for beatmap attributes in [`Difficulty`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModsDependent {
    /// Value of the beatmap attribute.
    pub value: f32,
    /// Whether `value` should be used as is or modified based on mods.
    ///
    /// `true` means "use as is", `false` means "modify based on mods".
    pub fixed: bool,
}

impl ModsDependent {
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            fixed: false,
        }
    }
}

impl Difficulty {
    /// Create a new difficulty calculator.
    pub const fn new() -> Self {
        Self {
            mods: GameMods::DEFAULT,
            passed_objects: None,
            clock_rate: None,
            ar: None,
            cs: None,
            hp: None,
            od: None,
        }
    }

    /// Specify mods.
    ///
    /// Accepted types are
    /// - `u32`
    /// - [`rosu_mods::GameModsLegacy`]
    /// - [`rosu_mods::GameMods`]
    /// - [`rosu_mods::GameModsIntermode`]
    /// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
    ///
    /// See <https://github.com/ppy/osu-api/wiki#mods>
    pub fn mods(self, mods: impl Into<GameMods>) -> Self {
        Self {
            mods: mods.into(),
            ..self
        }
    }

    /// Amount of passed objects for partial plays, e.g. a fail.
    pub const fn passed_objects(mut self, passed_objects: u32) -> Self {
        self.passed_objects = Some(passed_objects);

        self
    }

    /// Adjust the clock rate used in the calculation.
    ///
    /// If none is specified, it will take the clock rate based on the mods
    /// i.e. 1.5 for DT, 0.75 for HT and 1.0 otherwise.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | 0.01    | 100     |
    pub fn clock_rate(self, clock_rate: f64) -> Self {
        let clock_rate = clock_rate.clamp(0.01, 100.0) as f32;

        Self {
            clock_rate: Some(clock_rate),
            ..self
        }
    }

    /// Override a beatmap's set AR.
    ///
    /// `fixed` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn ar(self, ar: f32, fixed: bool) -> Self {
        Self {
            ar: Some(ModsDependent {
                value: ar.clamp(-20.0, 20.0),
                fixed,
            }),
            ..self
        }
    }

    /// Override a beatmap's set CS.
    ///
    /// `fixed` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn cs(self, cs: f32, fixed: bool) -> Self {
        Self {
            cs: Some(ModsDependent {
                value: cs.clamp(-20.0, 20.0),
                fixed,
            }),
            ..self
        }
    }

    /// Override a beatmap's set HP.
    ///
    /// `fixed` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn hp(self, hp: f32, fixed: bool) -> Self {
        Self {
            hp: Some(ModsDependent {
                value: hp.clamp(-20.0, 20.0),
                fixed,
            }),
            ..self
        }
    }

    /// Override a beatmap's set OD.
    ///
    /// `fixed` determines if the given value should be used before
    /// or after accounting for mods, e.g. on `true` the value will be
    /// used as is and on `false` it will be modified based on the mods.
    ///
    /// | Minimum | Maximum |
    /// | :-----: | :-----: |
    /// | -20     | 20      |
    pub fn od(self, od: f32, fixed: bool) -> Self {
        Self {
            od: Some(ModsDependent {
                value: od.clamp(-20.0, 20.0),
                fixed,
            }),
            ..self
        }
    }

    /// Perform the osu!standard difficulty calculation.
    pub fn calculate_osu(&self, map: &Beatmap) -> Result<OsuDifficultyAttributes, ConvertError> {
        OsuDifficultyCalculator::new(self, map).map(|calc| calc.calculate())
    }

    /// Perform the osu!droid difficulty calculation.
    pub fn calculate_droid(&self, map: &Beatmap) -> Result<DroidDifficultyAttributes, ConvertError> {
        DroidDifficultyCalculator::new(self, map).map(|calc| calc.calculate())
    }

    pub const fn get_mods(&self) -> &GameMods {
        &self.mods
    }

    pub fn get_clock_rate(&self) -> f64 {
        self.clock_rate
            .map_or_else(|| self.mods.clock_rate(), f64::from)
    }

    pub fn get_passed_objects(&self) -> usize {
        self.passed_objects.map_or(usize::MAX, |n| n as usize)
    }

    pub fn get_ar(&self) -> Option<ModsDependent> {
        self.ar.or_else(|| self.mods.ar().map(mods_override))
    }

    pub fn get_cs(&self) -> Option<ModsDependent> {
        self.cs.or_else(|| self.mods.cs().map(mods_override))
    }

    pub fn get_hp(&self) -> Option<ModsDependent> {
        self.hp.or_else(|| self.mods.hp().map(mods_override))
    }

    pub fn get_od(&self) -> Option<ModsDependent> {
        self.od.or_else(|| self.mods.od().map(mods_override))
    }
}

// Values set through `DifficultyAdjust` are final.
fn mods_override(value: f64) -> ModsDependent {
    ModsDependent {
        value: value as f32,
        fixed: true,
    }
}

impl Debug for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let Self {
            mods,
            passed_objects,
            clock_rate,
            ar,
            cs,
            hp,
            od,
        } = self;

        f.debug_struct("Difficulty")
            .field("mods", mods)
            .field("passed_objects", passed_objects)
            .field("clock_rate", clock_rate)
            .field("ar", ar)
            .field("cs", cs)
            .field("hp", hp)
            .field("od", od)
            .finish()
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_rate_defaults_to_mods() {
        assert!((Difficulty::new().mods(64).get_clock_rate() - 1.5).abs() < 1e-9);
        assert!((Difficulty::new().mods(256).get_clock_rate() - 0.75).abs() < 1e-9);

        let custom = Difficulty::new().mods(64).clock_rate(1.2);

        assert!((custom.get_clock_rate() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn overrides_are_clamped() {
        let diff = Difficulty::new().ar(50.0, true).od(-50.0, false);

        assert_eq!(
            diff.get_ar(),
            Some(ModsDependent {
                value: 20.0,
                fixed: true
            })
        );
        assert_eq!(
            diff.get_od(),
            Some(ModsDependent {
                value: -20.0,
                fixed: false
            })
        );
        assert_eq!(diff.get_cs(), None);
    }

    #[test]
    fn unlimited_passed_objects() {
        assert_eq!(Difficulty::new().get_passed_objects(), usize::MAX);
        assert_eq!(Difficulty::new().passed_objects(3).get_passed_objects(), 3);
    }
}
