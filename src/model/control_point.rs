/// Timing-related info about this control point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimingPoint {
    pub time: f64,
    pub beat_len: f64,
}

impl TimingPoint {
    pub const DEFAULT_BEAT_LEN: f64 =
        rosu_map::section::timing_points::TimingPoint::DEFAULT_BEAT_LEN;

    pub const fn new(time: f64, beat_len: f64) -> Self {
        Self {
            time,
            beat_len: beat_len.clamp(6.0, 60_000.0),
        }
    }
}

impl Default for TimingPoint {
    fn default() -> Self {
        Self {
            time: 0.0,
            beat_len: Self::DEFAULT_BEAT_LEN,
        }
    }
}

/// Slider velocity info about this control point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DifficultyPoint {
    pub time: f64,
    pub slider_velocity: f64,
    pub generate_ticks: bool,
}

impl DifficultyPoint {
    pub const DEFAULT_SLIDER_VELOCITY: f64 = 1.0;

    pub const fn new(time: f64, slider_velocity: f64) -> Self {
        Self {
            time,
            slider_velocity: slider_velocity.clamp(0.1, 10.0),
            generate_ticks: true,
        }
    }
}

impl Default for DifficultyPoint {
    fn default() -> Self {
        Self::new(0.0, Self::DEFAULT_SLIDER_VELOCITY)
    }
}

pub fn timing_point_at(points: &[TimingPoint], time: f64) -> Option<&TimingPoint> {
    let i = points
        .binary_search_by(|probe| probe.time.total_cmp(&time))
        .unwrap_or_else(|i| i.saturating_sub(1));

    points.get(i)
}

pub fn difficulty_point_at(points: &[DifficultyPoint], time: f64) -> Option<&DifficultyPoint> {
    points
        .binary_search_by(|probe| probe.time.total_cmp(&time))
        .map_or_else(|i| i.checked_sub(1), Some)
        .map(|i| &points[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_point_lookup_uses_first_before_start() {
        let points = [TimingPoint::new(1000.0, 500.0), TimingPoint::new(2000.0, 250.0)];

        assert_eq!(timing_point_at(&points, 0.0), Some(&points[0]));
        assert_eq!(timing_point_at(&points, 1500.0), Some(&points[0]));
        assert_eq!(timing_point_at(&points, 2000.0), Some(&points[1]));
        assert_eq!(timing_point_at(&[], 2000.0), None);
    }

    #[test]
    fn difficulty_point_lookup_is_none_before_start() {
        let points = [DifficultyPoint::new(1000.0, 1.5)];

        assert_eq!(difficulty_point_at(&points, 500.0), None);
        assert_eq!(difficulty_point_at(&points, 1500.0), Some(&points[0]));
    }
}
