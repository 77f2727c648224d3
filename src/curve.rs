use std::f64::consts::{PI, TAU};

use rosu_map::section::hit_objects::{PathControlPoint, PathType};

use crate::{model::hit_object::Pos, util::float_ext::FloatExt};

const BEZIER_TOLERANCE: f64 = 0.25;
const CATMULL_DETAIL: usize = 50;
const CIRCULAR_ARC_TOLERANCE: f64 = 0.1;
const MAX_ARC_POINTS: usize = 1000;

/// A slider path, flattened into line segments and parameterized by
/// arc length.
///
/// Control points are split into segments at every point that carries a
/// [`PathType`]; each segment is approximated according to its type and
/// the results are joined in order.
///
/// [`PathType`]: rosu_map::section::hit_objects::PathType
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Curve {
    path: Vec<Pos>,
    cumulative_length: Vec<f64>,
}

impl Curve {
    /// Flatten the control points and fit the resulting length to
    /// `expected_dist` if one is given.
    pub fn new(control_points: &[PathControlPoint], expected_dist: Option<f64>) -> Self {
        let mut curve = Self {
            path: calculate_path(control_points),
            cumulative_length: Vec::new(),
        };

        curve.calculate_length(expected_dist);

        curve
    }

    /// Total length of the path.
    pub fn dist(&self) -> f64 {
        self.cumulative_length.last().copied().unwrap_or(0.0)
    }

    /// The flattened path.
    pub fn path(&self) -> &[Pos] {
        &self.path
    }

    /// Position at `progress` along the path where `0.0` is the head and
    /// `1.0` the end.
    pub fn position_at(&self, progress: f64) -> Pos {
        self.point_at_distance(progress.clamp(0.0, 1.0) * self.dist())
    }

    /// Position at the given distance along the path, clamped to
    /// `[0, dist]`.
    pub fn point_at_distance(&self, dist: f64) -> Pos {
        let dist = dist.clamp(0.0, self.dist());

        let idx = self.cumulative_length.partition_point(|&len| len < dist);

        self.interpolate_vertices(idx, dist)
    }

    fn interpolate_vertices(&self, idx: usize, dist: f64) -> Pos {
        let Some(first) = self.path.first() else {
            return Pos::default();
        };

        if idx == 0 {
            return *first;
        }

        let Some(&p1) = self.path.get(idx) else {
            return self.path.last().copied().unwrap_or(*first);
        };

        let p0 = self.path[idx - 1];
        let d0 = self.cumulative_length[idx - 1];
        let d1 = self.cumulative_length[idx];

        if FloatExt::eq(d0, d1) {
            return p0;
        }

        let w = (dist - d0) / (d1 - d0);

        p0 + (p1 - p0) * w as f32
    }

    fn calculate_length(&mut self, expected_dist: Option<f64>) {
        let mut calculated_len = 0.0;
        self.cumulative_length.clear();
        self.cumulative_length.reserve(self.path.len());
        self.cumulative_length.push(0.0);

        for window in self.path.windows(2) {
            calculated_len += f64::from((window[1] - window[0]).length());
            self.cumulative_length.push(calculated_len);
        }

        let Some(expected_dist) = expected_dist.filter(|dist| dist.not_eq(calculated_len)) else {
            return;
        };

        let n = self.path.len();

        // The last segment has no direction to extend along
        if n >= 2 && self.path[n - 1] == self.path[n - 2] && expected_dist > calculated_len {
            return;
        }

        self.cumulative_length.pop();
        let mut path_end_idx = n.saturating_sub(1);

        if calculated_len > expected_dist {
            while self
                .cumulative_length
                .last()
                .is_some_and(|&len| len >= expected_dist)
            {
                self.cumulative_length.pop();
                self.path.truncate(path_end_idx);
                path_end_idx = path_end_idx.saturating_sub(1);
            }
        }

        if path_end_idx == 0 {
            self.path.truncate(1);
            self.cumulative_length.clear();
            self.cumulative_length.push(0.0);

            return;
        }

        let end = self.path[path_end_idx];
        let prev = self.path[path_end_idx - 1];
        let segment_len = (end - prev).length();

        let dir = if segment_len > 0.0 {
            (end - prev) * segment_len.recip()
        } else {
            Pos::default()
        };

        let last_len = self.cumulative_length.last().copied().unwrap_or(0.0);
        self.path[path_end_idx] = prev + dir * (expected_dist - last_len) as f32;
        self.cumulative_length.push(expected_dist);
    }
}

fn calculate_path(control_points: &[PathControlPoint]) -> Vec<Pos> {
    let mut path = Vec::new();

    let Some(first) = control_points.first() else {
        return path;
    };

    let mut segment_kind = first.path_type.unwrap_or(PathType::LINEAR);
    let mut start = 0;

    for i in 1..control_points.len() {
        let is_last = i == control_points.len() - 1;

        let Some(next_kind) = control_points[i].path_type else {
            if !is_last {
                continue;
            }

            push_segment(&mut path, segment_kind, &control_points[start..=i]);

            break;
        };

        push_segment(&mut path, segment_kind, &control_points[start..=i]);

        segment_kind = next_kind;
        start = i;
    }

    if control_points.len() == 1 {
        path.push(first.pos);
    }

    path
}

fn push_segment(path: &mut Vec<Pos>, kind: PathType, points: &[PathControlPoint]) {
    let vertices: Vec<Pos> = points.iter().map(|point| point.pos).collect();

    // B-splines of any degree are approximated as beziers
    let subpath = if kind == PathType::LINEAR {
        vertices
    } else if kind == PathType::PERFECT_CURVE {
        approximate_circular_arc(&vertices).unwrap_or_else(|| approximate_bezier(&vertices))
    } else if kind == PathType::CATMULL {
        approximate_catmull(&vertices)
    } else {
        approximate_bezier(&vertices)
    };

    for point in subpath {
        if path.last() != Some(&point) {
            path.push(point);
        }
    }
}

fn approximate_bezier(points: &[Pos]) -> Vec<Pos> {
    let mut result = Vec::new();
    let mut start = 0;

    // Consecutive duplicate points split the curve into separate beziers
    for end in 1..points.len() {
        if end - start > 1 && points[end] == points[end - 1] {
            bezier_segment(&mut result, &points[start..end]);
            start = end;
        }
    }

    bezier_segment(&mut result, &points[start..]);

    result
}

fn bezier_segment(result: &mut Vec<Pos>, points: &[Pos]) {
    match points {
        [] => {}
        [single] => result.push(*single),
        _ => {
            let n = points.len() as i32 - 1;
            let step = (BEZIER_TOLERANCE / points.len() as f64).max(0.01);
            let steps = (1.0 / step).ceil() as usize;

            for i in 0..=steps {
                let t = (i as f64 * step).min(1.0);

                let (x, y) = (0..).zip(points).fold((0.0, 0.0), |(x, y), (p, curr)| {
                    let factor = binomial(n, p) * (1.0 - t).powi(n - p) * t.powi(p);

                    (
                        x + f64::from(curr.x) * factor,
                        y + f64::from(curr.y) * factor,
                    )
                });

                result.push(Pos::new(x as f32, y as f32));
            }
        }
    }
}

fn binomial(n: i32, k: i32) -> f64 {
    if k < 0 || k > n {
        return 0.0;
    }

    let k = k.min(n - k);

    (1..=k).fold(1.0, |acc, i| acc * f64::from(n - k + i) / f64::from(i))
}

fn approximate_catmull(points: &[Pos]) -> Vec<Pos> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let n = points.len();
    let mut result = Vec::with_capacity((n - 1) * CATMULL_DETAIL * 2);

    for i in 0..n - 1 {
        let v1 = if i > 0 { points[i - 1] } else { points[i] };
        let v2 = points[i];
        let v3 = points[i + 1];

        let v4 = if i < n - 2 {
            points[i + 2]
        } else {
            v3 * 2.0 - v2
        };

        for c in 0..CATMULL_DETAIL {
            let t0 = c as f64 / CATMULL_DETAIL as f64;
            let t1 = (c + 1) as f64 / CATMULL_DETAIL as f64;

            result.push(catmull_point(v1, v2, v3, v4, t0));
            result.push(catmull_point(v1, v2, v3, v4, t1));
        }
    }

    result
}

fn catmull_point(v1: Pos, v2: Pos, v3: Pos, v4: Pos, t: f64) -> Pos {
    fn catmull(p0: f32, p1: f32, p2: f32, p3: f32, t: f64) -> f32 {
        let (p0, p1, p2, p3) = (
            f64::from(p0),
            f64::from(p1),
            f64::from(p2),
            f64::from(p3),
        );

        let t2 = t * t;
        let t3 = t2 * t;

        (0.5 * (2.0 * p1
            + (-p0 + p2) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)) as f32
    }

    Pos::new(
        catmull(v1.x, v2.x, v3.x, v4.x, t),
        catmull(v1.y, v2.y, v3.y, v4.y, t),
    )
}

/// Approximates the arc through three points or returns `None` if they
/// don't describe a usable circle.
fn approximate_circular_arc(points: &[Pos]) -> Option<Vec<Pos>> {
    let &[a, b, c] = points else {
        return None;
    };

    let arc = CircularArc::new(a, b, c)?;

    let amount_points = if 2.0 * arc.radius <= CIRCULAR_ARC_TOLERANCE {
        2
    } else {
        let angle_step = 2.0 * (1.0 - CIRCULAR_ARC_TOLERANCE / arc.radius).acos();

        ((arc.theta_range / angle_step).ceil() as usize).max(2)
    };

    if amount_points >= MAX_ARC_POINTS {
        return None;
    }

    let points = (0..amount_points)
        .map(|i| {
            let fract = i as f64 / (amount_points - 1) as f64;
            let theta = arc.theta_start + arc.direction * fract * arc.theta_range;

            Pos::new(
                (arc.center_x + theta.cos() * arc.radius) as f32,
                (arc.center_y + theta.sin() * arc.radius) as f32,
            )
        })
        .collect();

    Some(points)
}

struct CircularArc {
    center_x: f64,
    center_y: f64,
    radius: f64,
    theta_start: f64,
    theta_range: f64,
    direction: f64,
}

impl CircularArc {
    fn new(a: Pos, b: Pos, c: Pos) -> Option<Self> {
        let (ax, ay) = (f64::from(a.x), f64::from(a.y));
        let (bx, by) = (f64::from(b.x), f64::from(b.y));
        let (cx, cy) = (f64::from(c.x), f64::from(c.y));

        let a_sq = (bx - cx).powi(2) + (by - cy).powi(2);
        let b_sq = (ax - cx).powi(2) + (ay - cy).powi(2);
        let c_sq = (ax - bx).powi(2) + (ay - by).powi(2);

        if FloatExt::eq(a_sq, 0.0) || FloatExt::eq(b_sq, 0.0) || FloatExt::eq(c_sq, 0.0) {
            return None;
        }

        let s = a_sq * (b_sq + c_sq - a_sq);
        let t = b_sq * (a_sq + c_sq - b_sq);
        let u = c_sq * (a_sq + b_sq - c_sq);
        let sum = s + t + u;

        // Collinear
        if FloatExt::eq(sum, 0.0) {
            return None;
        }

        let center_x = (s * ax + t * bx + u * cx) / sum;
        let center_y = (s * ay + t * by + u * cy) / sum;

        let (da_x, da_y) = (ax - center_x, ay - center_y);
        let (dc_x, dc_y) = (cx - center_x, cy - center_y);

        let radius = da_x.hypot(da_y);
        let theta_start = da_y.atan2(da_x);
        let mut theta_end = dc_y.atan2(dc_x);

        while theta_end < theta_start {
            theta_end += TAU;
        }

        let mut direction = 1.0;
        let mut theta_range = theta_end - theta_start;

        // Orthogonal of `c - a` decides on which side `b` lies
        let (ortho_x, ortho_y) = (cy - ay, -(cx - ax));

        if ortho_x * (bx - ax) + ortho_y * (by - ay) < 0.0 {
            direction = -1.0;
            theta_range = 2.0 * PI - theta_range;
        }

        Some(Self {
            center_x,
            center_y,
            radius,
            theta_start,
            theta_range,
            direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32, path_type: Option<PathType>) -> PathControlPoint {
        PathControlPoint {
            pos: Pos::new(x, y),
            path_type,
        }
    }

    fn assert_pos(actual: Pos, x: f32, y: f32) {
        assert!(
            (actual.x - x).abs() < 0.01 && (actual.y - y).abs() < 0.01,
            "expected ({x}, {y}), got ({}, {})",
            actual.x,
            actual.y
        );
    }

    #[test]
    fn linear_truncated_to_expected_dist() {
        let points = [
            point(0.0, 0.0, Some(PathType::LINEAR)),
            point(100.0, 0.0, None),
        ];

        let curve = Curve::new(&points, Some(50.0));

        assert!((curve.dist() - 50.0).abs() < 1e-9);
        assert_pos(curve.point_at_distance(25.0), 25.0, 0.0);
        assert_pos(curve.position_at(1.0), 50.0, 0.0);
    }

    #[test]
    fn linear_extended_to_expected_dist() {
        let points = [
            point(0.0, 0.0, Some(PathType::LINEAR)),
            point(100.0, 0.0, None),
        ];

        let curve = Curve::new(&points, Some(150.0));

        assert!((curve.dist() - 150.0).abs() < 1e-9);
        assert_pos(curve.position_at(1.0), 150.0, 0.0);
    }

    #[test]
    fn distance_is_clamped() {
        let points = [
            point(0.0, 0.0, Some(PathType::LINEAR)),
            point(0.0, 80.0, None),
        ];

        let curve = Curve::new(&points, None);

        assert_pos(curve.point_at_distance(-10.0), 0.0, 0.0);
        assert_pos(curve.point_at_distance(1000.0), 0.0, 80.0);
    }

    #[test]
    fn perfect_curve_half_circle() {
        let points = [
            point(0.0, 0.0, Some(PathType::PERFECT_CURVE)),
            point(50.0, 50.0, None),
            point(100.0, 0.0, None),
        ];

        let curve = Curve::new(&points, None);

        assert!((curve.dist() - 50.0 * PI).abs() < 0.5, "{}", curve.dist());
        assert_pos(curve.position_at(0.5), 50.0, 50.0);
    }

    #[test]
    fn collinear_perfect_curve_falls_back() {
        let points = [
            point(0.0, 0.0, Some(PathType::PERFECT_CURVE)),
            point(50.0, 0.0, None),
            point(100.0, 0.0, None),
        ];

        let curve = Curve::new(&points, None);

        assert!((curve.dist() - 100.0).abs() < 0.01);
    }

    #[test]
    fn multi_segment_path() {
        let points = [
            point(0.0, 0.0, Some(PathType::LINEAR)),
            point(100.0, 0.0, Some(PathType::LINEAR)),
            point(100.0, 100.0, None),
        ];

        let curve = Curve::new(&points, None);

        assert!((curve.dist() - 200.0).abs() < 1e-9);
        assert_pos(curve.point_at_distance(150.0), 100.0, 50.0);
    }

    #[test]
    fn bezier_ends_at_last_point() {
        let points = [
            point(0.0, 0.0, Some(PathType::BEZIER)),
            point(50.0, 100.0, None),
            point(100.0, 0.0, None),
        ];

        let curve = Curve::new(&points, None);

        assert_pos(curve.position_at(1.0), 100.0, 0.0);
        assert!(curve.dist() > 100.0);
    }

    #[test]
    fn degenerate_paths() {
        let single = Curve::new(&[point(5.0, 5.0, Some(PathType::BEZIER))], Some(100.0));
        assert!(FloatExt::eq(single.dist(), 0.0));
        assert_pos(single.point_at_distance(40.0), 5.0, 5.0);

        let points = [
            point(5.0, 5.0, Some(PathType::LINEAR)),
            point(5.0, 5.0, None),
        ];

        let same = Curve::new(&points, Some(100.0));
        assert!(FloatExt::eq(same.dist(), 0.0));
        assert_pos(same.position_at(0.5), 5.0, 5.0);

        let empty = Curve::new(&[], None);
        assert!(FloatExt::eq(empty.dist(), 0.0));
        assert_pos(empty.position_at(0.5), 0.0, 0.0);
    }
}
