//! Difficulty and performance calculation for osu!standard and osu!droid.
//!
//! ## Usage
//!
//! ```no_run
//! use rosu_droid_pp::{droid::DroidPerformance, Beatmap, Difficulty};
//!
//! let map = Beatmap::from_path("./resources/map.osu").unwrap();
//!
//! // Difficulty attributes for osu!droid with HD
//! let diff_attrs = Difficulty::new().mods(8).calculate_droid(&map).unwrap();
//!
//! let stars = diff_attrs.stars;
//!
//! // Re-using the attributes avoids calculating them again. They must have
//! // been calculated on the same map with the same settings.
//! let perf_attrs = DroidPerformance::new(diff_attrs)
//!     .mods(8)
//!     .combo(789)
//!     .accuracy(99.2)
//!     .misses(2)
//!     .calculate()
//!     .unwrap();
//!
//! println!("Stars: {stars} | {perf_attrs}");
//! ```
//!
//! ## Recalculating single skills
//!
//! Difficulty attributes can be updated one skill at a time, e.g. after
//! changing mods, through `recompute_*` methods such as
//! [`DroidDifficultyAttributes::recompute_tap`]. Only the given skill's
//! values and the star rating are replaced.
//!
//! ## Features
//!
//! | Flag | Description | Dependencies
//! | - | - | -
//! | `default` | No features |
//! | `tracing` | Errors encountered while decoding a beatmap are logged through `tracing`. | [`tracing`]
//!
//! Diagnostics of the calculation itself go through the [`log`] facade.
//!
//! [`tracing`]: https://docs.rs/tracing
//! [`DroidDifficultyAttributes::recompute_tap`]: droid::DroidDifficultyAttributes::recompute_tap

#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::missing_const_for_fn, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::struct_excessive_bools,
    clippy::match_same_arms,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::explicit_iter_loop,
    clippy::similar_names,
    clippy::cast_possible_wrap,
    clippy::too_many_lines
)]

#[doc(inline)]
pub use self::{
    any::{Difficulty, HitResultPriority, ScoreState},
    model::{beatmap::Beatmap, mods::GameMods},
    util::{
        difficulty::{lerp, reverse_lerp},
        root_finding::{find_root_expand, RootFinder, RootFindingError},
    },
};

/// Types for calculations of either ruleset.
pub mod any;

/// Slider paths.
pub mod curve;

/// Types for osu!droid calculations.
pub mod droid;

/// Types used in and around this crate.
pub mod model;

/// Types for osu!standard calculations.
pub mod osu;

mod util;
