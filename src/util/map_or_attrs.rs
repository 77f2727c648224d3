use std::borrow::Cow;

use crate::model::beatmap::Beatmap;

/// Either a beatmap that still needs a difficulty calculation or the
/// attributes of one that was already done.
#[derive(Clone, Debug, PartialEq)]
pub enum MapOrAttrs<'map, A> {
    Map(Cow<'map, Beatmap>),
    Attrs(A),
}

impl<A> MapOrAttrs<'_, A> {
    /// Store `attrs` and return a reference to them.
    ///
    /// If `self` already holds attributes, those are kept instead.
    pub fn insert_attrs(&mut self, attrs: A) -> &A {
        if let Self::Map(_) = self {
            *self = Self::Attrs(attrs);
        }

        match self {
            Self::Attrs(attrs) => attrs,
            Self::Map(_) => unreachable!("attributes were just inserted"),
        }
    }
}

impl<'map, A> From<&'map Beatmap> for MapOrAttrs<'map, A> {
    fn from(map: &'map Beatmap) -> Self {
        Self::Map(Cow::Borrowed(map))
    }
}

impl<A> From<Beatmap> for MapOrAttrs<'_, A> {
    fn from(map: Beatmap) -> Self {
        Self::Map(Cow::Owned(map))
    }
}

macro_rules! from_attrs {
    ( $( $module:ident { $diff:ident, $perf:ident } ,)* ) => {
        $(
            impl From<crate::$module::$diff> for MapOrAttrs<'_, crate::$module::$diff> {
                fn from(attrs: crate::$module::$diff) -> Self {
                    Self::Attrs(attrs)
                }
            }

            impl From<crate::$module::$perf> for MapOrAttrs<'_, crate::$module::$diff> {
                fn from(attrs: crate::$module::$perf) -> Self {
                    Self::Attrs(attrs.difficulty)
                }
            }
        )*
    };
}

from_attrs!(
    osu {
        OsuDifficultyAttributes,
        OsuPerformanceAttributes
    },
    droid {
        DroidDifficultyAttributes,
        DroidPerformanceAttributes
    },
);
