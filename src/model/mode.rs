pub use rosu_map::section::general::GameMode;

/// Error when a [`Beatmap`] can't be used for calculation.
///
/// [`Beatmap`]: crate::Beatmap
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("cannot calculate {0:?} beatmaps, only osu!standard is supported")]
    IncompatibleMode(GameMode),
}
