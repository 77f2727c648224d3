//! osu!droid, the touch screen port of osu!standard.
//!
//! Maps are plain osu!standard maps; only the difficulty and performance
//! models differ.

pub use self::{
    attributes::{DroidDifficultyAttributes, DroidPerformanceAttributes},
    difficulty::DroidDifficultyCalculator,
    hit_window::DroidHitWindow,
    performance::{DroidPenalties, DroidPerformance},
};

pub mod attributes;
pub mod difficulty;
pub mod hit_window;
pub mod performance;
