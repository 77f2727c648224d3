use std::fmt::{Debug, Formatter, Result as FmtResult};

use rosu_mods::{
    generated_mods::DifficultyAdjustOsu, GameMod, GameModIntermode, GameMods as GameModsLazer,
    GameModsIntermode, GameModsLegacy,
};

/// Collection of game mods.
///
/// This type can be created through its `From<T>` implementations where `T`
/// can be
/// - `u32`
/// - [`rosu_mods::GameModsLegacy`]
/// - [`rosu_mods::GameMods`]
/// - [`rosu_mods::GameModsIntermode`]
/// - [`&rosu_mods::GameModsIntermode`](rosu_mods::GameModsIntermode)
///
/// Mod combinations are expected to be valid already; mutually exclusive
/// mods are not rejected here.
///
/// # Example
///
/// ```
/// use rosu_droid_pp::GameMods;
/// use rosu_mods::{GameModsIntermode, GameModsLegacy, GameMods as GameModsLazer};
///
/// let int = GameMods::from(64 + 8);
/// let legacy = GameMods::from(GameModsLegacy::Hidden | GameModsLegacy::Easy);
/// let lazer = GameMods::from(GameModsLazer::new());
/// let intermode = GameMods::from(GameModsIntermode::new());
/// ```
#[derive(Clone, PartialEq)]
pub struct GameMods {
    inner: GameModsInner,
}

impl Debug for GameMods {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.inner {
            GameModsInner::Lazer(ref mods) => Debug::fmt(mods, f),
            GameModsInner::Intermode(ref mods) => Debug::fmt(mods, f),
            GameModsInner::Legacy(ref mods) => Debug::fmt(mods, f),
        }
    }
}

/// Inner type of [`GameMods`] so that remote types contained in variants don't
/// need to be re-exported.
#[derive(Clone, PartialEq)]
enum GameModsInner {
    Lazer(GameModsLazer),
    Intermode(GameModsIntermode),
    Legacy(GameModsLegacy),
}

impl GameMods {
    pub(crate) const DEFAULT: Self = Self {
        inner: GameModsInner::Legacy(GameModsLegacy::NoMod),
    };

    /// Returns the mods' clock rate.
    ///
    /// In case of variable clock rates like for `WindUp`, this will return
    /// `1.0`.
    pub(crate) fn clock_rate(&self) -> f64 {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.clock_rate().unwrap_or(1.0),
            GameModsInner::Intermode(ref mods) => mods.legacy_clock_rate(),
            GameModsInner::Legacy(mods) => mods.clock_rate(),
        }
    }

    pub(crate) fn od_ar_hp_multiplier(&self) -> f64 {
        if self.hr() {
            1.4
        } else if self.ez() {
            0.5
        } else {
            1.0
        }
    }

    pub(crate) fn reflection(&self) -> Reflection {
        match self.inner {
            GameModsInner::Lazer(ref mods) => {
                if mods.contains_intermode(GameModIntermode::HardRock) {
                    return Reflection::Vertical;
                }

                mods.iter()
                    .find_map(|m| match m {
                        GameMod::MirrorOsu(mr) => match mr.reflection.as_deref() {
                            None => Some(Reflection::Horizontal),
                            Some("1") => Some(Reflection::Vertical),
                            Some("2") => Some(Reflection::Both),
                            Some(_) => Some(Reflection::None),
                        },
                        _ => None,
                    })
                    .unwrap_or(Reflection::None)
            }
            GameModsInner::Intermode(ref mods) => {
                if mods.contains(GameModIntermode::HardRock) {
                    Reflection::Vertical
                } else {
                    Reflection::None
                }
            }
            GameModsInner::Legacy(mods) => {
                if mods.contains(GameModsLegacy::HardRock) {
                    Reflection::Vertical
                } else {
                    Reflection::None
                }
            }
        }
    }

    /// Attraction strength of `Magnetised` if the mod is enabled.
    pub(crate) fn attraction_strength(&self) -> Option<f64> {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.iter().find_map(|m| match m {
                GameMod::MagnetisedOsu(mg) => {
                    Some(mg.attraction_strength.map_or(0.5, f64::from))
                }
                _ => None,
            }),
            GameModsInner::Intermode(ref mods) => mods
                .contains(GameModIntermode::Magnetised)
                .then_some(0.5),
            GameModsInner::Legacy(_) => None,
        }
    }

    /// Starting scale of `Deflate` if the mod is enabled.
    pub(crate) fn deflate_start_scale(&self) -> Option<f64> {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.iter().find_map(|m| match m {
                GameMod::DeflateOsu(df) => Some(df.start_scale.map_or(2.0, f64::from)),
                _ => None,
            }),
            GameModsInner::Intermode(ref mods) => {
                mods.contains(GameModIntermode::Deflate).then_some(2.0)
            }
            GameModsInner::Legacy(_) => None,
        }
    }

    /// Whether `Hidden` only fades approach circles.
    ///
    /// `None` if `Hidden` is not enabled or the setting is not specified.
    pub(crate) fn hd_only_fade_approach_circles(&self) -> Option<bool> {
        match self.inner {
            GameModsInner::Lazer(ref mods) => mods.iter().find_map(|m| match m {
                GameMod::HiddenOsu(hd) => hd.only_fade_approach_circles,
                _ => None,
            }),
            GameModsInner::Intermode(_) | GameModsInner::Legacy(_) => None,
        }
    }

    /// Whether objects are never fully hidden, i.e. `Hidden` with only
    /// approach circles fading or `Traceable`.
    pub(crate) fn always_partially_visible(&self) -> bool {
        self.hd_only_fade_approach_circles().unwrap_or(false) || self.tc()
    }
}

macro_rules! impl_map_attr {
    ( $( $fn:ident: $field:ident [$s:literal] ;)* ) => {
        impl GameMods {
            $(
                #[doc = "Check whether the mods specify a custom "]
                #[doc = $s]
                #[doc = "value."]
                pub(crate) fn $fn(&self) -> Option<f64> {
                    match self.inner {
                        GameModsInner::Lazer(ref mods) => mods.iter().find_map(|gamemod| match gamemod {
                            GameMod::DifficultyAdjustOsu(DifficultyAdjustOsu { $field, .. }) => {
                                $field.map(f64::from)
                            }
                            _ => None,
                        }),
                        GameModsInner::Intermode(_) | GameModsInner::Legacy(_) => None,
                    }
                }
            )*
        }
    };
}

impl_map_attr! {
    ar: approach_rate ["ar"];
    cs: circle_size ["cs"];
    hp: drain_rate ["hp"];
    od: overall_difficulty ["od"];
}

macro_rules! impl_has_mod {
    ( $( $fn:ident: $sign:tt $name:ident [ $s:literal ], )* ) => {
        impl GameMods {
            $(
                #[doc = "Check whether [`GameMods`] contain `"]
                #[doc = $s]
                #[doc = "`."]
                pub(crate) fn $fn(&self) -> bool {
                    match self.inner {
                        GameModsInner::Lazer(ref mods) => {
                            mods.contains_intermode(GameModIntermode::$name)
                        },
                        GameModsInner::Intermode(ref mods) => {
                            mods.contains(GameModIntermode::$name)
                        },
                        GameModsInner::Legacy(_mods) => {
                            impl_has_mod!(LEGACY $sign $name _mods)
                        },
                    }
                }
            )*
        }
    };

    ( LEGACY + $name:ident $mods:ident ) => {
        $mods.contains(GameModsLegacy::$name)
    };

    ( LEGACY - $name:ident $mods:ident ) => {
        false
    };
}

impl_has_mod! {
    nf: + NoFail ["NoFail"],
    ez: + Easy ["Easy"],
    td: + TouchDevice ["TouchDevice"],
    hd: + Hidden ["Hidden"],
    hr: + HardRock ["HardRock"],
    rx: + Relax ["Relax"],
    fl: + Flashlight ["Flashlight"],
    so: + SpunOut ["SpunOut"],
    dt: + DoubleTime ["DoubleTime"],
    nc: + Nightcore ["Nightcore"],
    ht: + HalfTime ["HalfTime"],
    ap: + Autopilot ["Autopilot"],
    tc: - Traceable ["Traceable"],
}

impl Default for GameMods {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<GameModsLazer> for GameMods {
    fn from(mods: GameModsLazer) -> Self {
        Self {
            inner: GameModsInner::Lazer(mods),
        }
    }
}

impl From<GameModsIntermode> for GameMods {
    fn from(mods: GameModsIntermode) -> Self {
        Self {
            inner: GameModsInner::Intermode(mods),
        }
    }
}

impl From<&GameModsIntermode> for GameMods {
    fn from(mods: &GameModsIntermode) -> Self {
        // Prefer the allocation-free legacy representation when possible
        match mods.checked_bits() {
            Some(bits) => bits.into(),
            None => mods.to_owned().into(),
        }
    }
}

impl From<GameModsLegacy> for GameMods {
    fn from(mods: GameModsLegacy) -> Self {
        Self {
            inner: GameModsInner::Legacy(mods),
        }
    }
}

impl From<u32> for GameMods {
    fn from(bits: u32) -> Self {
        GameModsLegacy::from_bits(bits).into()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reflection {
    None,
    Vertical,
    Horizontal,
    Both,
}
