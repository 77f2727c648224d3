use std::{io, path::Path, str::FromStr};

use rosu_map::section::hit_objects::HitObjectKind as RawHitObjectKind;

pub use self::attributes::{difficulty_range, BeatmapAttributes, BeatmapAttributesBuilder, HitWindows};

use super::{
    control_point::{difficulty_point_at, timing_point_at, DifficultyPoint, TimingPoint},
    hit_object::{HitObject, HitObjectKind, Slider, Spinner},
    mode::{ConvertError, GameMode},
};

mod attributes;

/// All beatmap data that is relevant for difficulty and performance
/// calculation.
///
/// Parsing `.osu` content is done by [`rosu_map`]; this type only keeps
/// what the calculations need.
#[derive(Clone, Debug, PartialEq)]
pub struct Beatmap {
    pub version: i32,
    pub mode: GameMode,

    // General
    pub stack_leniency: f32,

    // Difficulty
    pub ar: f32,
    pub cs: f32,
    pub hp: f32,
    pub od: f32,
    pub slider_multiplier: f64,
    pub slider_tick_rate: f64,

    // TimingPoints
    pub timing_points: Vec<TimingPoint>,
    pub difficulty_points: Vec<DifficultyPoint>,

    // HitObjects
    pub hit_objects: Vec<HitObject>,
}

/// Error when decoding a [`Beatmap`].
#[derive(Debug, thiserror::Error)]
pub enum ParseBeatmapError {
    #[error("failed to decode beatmap")]
    Io(#[from] io::Error),
    #[error("slider repeat count {0} is negative")]
    NegativeRepeatCount(i32),
}

impl Beatmap {
    const DEFAULT_STACK_LENIENCY: f32 = 0.7;

    /// Parse a [`Beatmap`] by providing a path to a `.osu` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseBeatmapError> {
        let map: rosu_map::Beatmap = rosu_map::from_path(path)?;

        Self::try_from(map)
    }

    /// Parse a [`Beatmap`] by providing the content of a `.osu` file as a
    /// slice of bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseBeatmapError> {
        let map: rosu_map::Beatmap = rosu_map::from_bytes(bytes)?;

        Self::try_from(map)
    }

    /// Returns a [`BeatmapAttributesBuilder`] to calculate modified beatmap
    /// attributes.
    pub fn attributes(&self) -> BeatmapAttributesBuilder {
        BeatmapAttributesBuilder::new().map(self)
    }

    /// Ensure the beatmap is an osu!standard map.
    pub const fn check_mode(&self) -> Result<(), ConvertError> {
        match self.mode {
            GameMode::Osu => Ok(()),
            mode => Err(ConvertError::IncompatibleMode(mode)),
        }
    }

    /// Finds the [`TimingPoint`] that is active at the given time.
    pub(crate) fn timing_point_at(&self, time: f64) -> Option<&TimingPoint> {
        timing_point_at(&self.timing_points, time)
    }

    /// Finds the [`DifficultyPoint`] that is active at the given time.
    pub(crate) fn difficulty_point_at(&self, time: f64) -> Option<&DifficultyPoint> {
        difficulty_point_at(&self.difficulty_points, time)
    }
}

impl Default for Beatmap {
    fn default() -> Self {
        Self {
            version: rosu_map::LATEST_FORMAT_VERSION,
            mode: GameMode::Osu,
            stack_leniency: Self::DEFAULT_STACK_LENIENCY,
            ar: 5.0,
            cs: 5.0,
            hp: 5.0,
            od: 5.0,
            slider_multiplier: 1.4,
            slider_tick_rate: 1.0,
            timing_points: Vec::new(),
            difficulty_points: Vec::new(),
            hit_objects: Vec::new(),
        }
    }
}

impl FromStr for Beatmap {
    type Err = ParseBeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes())
    }
}

impl TryFrom<rosu_map::Beatmap> for Beatmap {
    type Error = ParseBeatmapError;

    fn try_from(map: rosu_map::Beatmap) -> Result<Self, Self::Error> {
        let timing_points = map
            .control_points
            .timing_points
            .iter()
            .map(|point| TimingPoint::new(point.time, point.beat_len))
            .collect();

        let difficulty_points = map
            .control_points
            .difficulty_points
            .iter()
            .map(|point| DifficultyPoint {
                generate_ticks: point.generate_ticks,
                ..DifficultyPoint::new(point.time, point.slider_velocity)
            })
            .collect();

        let hit_objects = map
            .hit_objects
            .into_iter()
            .map(|h| -> Result<HitObject, ParseBeatmapError> {
                let (pos, kind) = match h.kind {
                    RawHitObjectKind::Circle(circle) => (circle.pos, HitObjectKind::Circle),
                    RawHitObjectKind::Slider(slider) => {
                        let repeats = usize::try_from(slider.repeat_count).map_err(|_| {
                            ParseBeatmapError::NegativeRepeatCount(slider.repeat_count)
                        })?;

                        let kind = HitObjectKind::Slider(Slider {
                            expected_dist: slider.path.expected_dist(),
                            repeats,
                            control_points: slider.path.control_points().into(),
                        });

                        (slider.pos, kind)
                    }
                    RawHitObjectKind::Spinner(spinner) => (
                        spinner.pos,
                        HitObjectKind::Spinner(Spinner {
                            duration: spinner.duration,
                        }),
                    ),
                    // Only reachable for mania maps which are rejected later on
                    RawHitObjectKind::Hold(hold) => (
                        rosu_map::util::Pos::new(hold.pos_x, 192.0),
                        HitObjectKind::Spinner(Spinner {
                            duration: hold.duration,
                        }),
                    ),
                };

                Ok(HitObject {
                    pos,
                    start_time: h.start_time,
                    kind,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            version: map.format_version,
            mode: map.mode,
            stack_leniency: map.stack_leniency,
            ar: map.approach_rate,
            cs: map.circle_size,
            hp: map.hp_drain_rate,
            od: map.overall_difficulty,
            slider_multiplier: map.slider_multiplier,
            slider_tick_rate: map.slider_tick_rate,
            timing_points,
            difficulty_points,
            hit_objects,
        })
    }
}
