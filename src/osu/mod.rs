use crate::model::hit_object::Pos;

pub use self::{
    attributes::{OsuDifficultyAttributes, OsuPerformanceAttributes},
    difficulty::OsuDifficultyCalculator,
    performance::OsuPerformance,
};

pub mod attributes;
pub mod convert;
pub mod difficulty;
pub mod object;
pub mod performance;

/// Size of the playfield in osu!pixels.
pub const PLAYFIELD_BASE_SIZE: Pos = Pos::new(512.0, 384.0);
