use bevy::prelude::*;
use constants::particles::{CURVE_ARC_DIVISIONS, CURVE_HEIGHT_CAP, CURVE_HEIGHT_FACTOR};

/// Centripetal Catmull-Rom spline through a set of control points, sampled
/// uniformly by arc length.
#[derive(Debug, Clone)]
pub struct CatmullRomCurve {
    points: Vec<Vec3>,
    /// Cumulative arc length at each of the evenly spaced parameter samples.
    arc_lengths: Vec<f32>,
}

impl CatmullRomCurve {
    pub fn new(points: Vec<Vec3>) -> Self {
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
        };
        curve.arc_lengths = curve.compute_arc_lengths(CURVE_ARC_DIVISIONS);
        curve
    }

    /// Three-point arc between two endpoints, lifted at the midpoint by a
    /// height proportional to their distance, capped.
    pub fn arc(start: Vec3, end: Vec3) -> Self {
        let lift = (start.distance(end) * CURVE_HEIGHT_FACTOR).min(CURVE_HEIGHT_CAP);
        let mid = (start + end) * 0.5 + Vec3::Y * lift;
        Self::new(vec![start, mid, end])
    }

    pub fn start(&self) -> Vec3 {
        self.points.first().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn end(&self) -> Vec3 {
        self.points.last().copied().unwrap_or(Vec3::ZERO)
    }

    pub fn length(&self) -> f32 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at curve parameter `t` in [0, 1].
    pub fn point(&self, t: f32) -> Vec3 {
        let count = self.points.len();
        match count {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let p = (count - 1) as f32 * t.clamp(0.0, 1.0);
        let mut segment = p.floor() as usize;
        let mut weight = p - segment as f32;
        if segment >= count - 1 {
            segment = count - 2;
            weight = 1.0;
        }

        let p1 = self.points[segment];
        let p2 = self.points[segment + 1];
        // End segments extrapolate a phantom control point.
        let p0 = if segment > 0 {
            self.points[segment - 1]
        } else {
            p1 * 2.0 - p2
        };
        let p3 = if segment + 2 < count {
            self.points[segment + 2]
        } else {
            p2 * 2.0 - p1
        };

        centripetal_segment(p0, p1, p2, p3, weight)
    }

    /// Point at fraction `u` of the total arc length.
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.arc_parameter(u))
    }

    fn compute_arc_lengths(&self, divisions: usize) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut total = 0.0;
        let mut previous = self.point(0.0);
        lengths.push(0.0);

        for step in 1..=divisions {
            let current = self.point(step as f32 / divisions as f32);
            total += current.distance(previous);
            lengths.push(total);
            previous = current;
        }
        lengths
    }

    fn arc_parameter(&self, u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        let total = self.length();
        let divisions = self.arc_lengths.len().saturating_sub(1);
        if total <= f32::EPSILON || divisions == 0 {
            return u;
        }

        let target = u * total;
        // Last sample whose cumulative length is <= target.
        let upper = self.arc_lengths.partition_point(|&len| len <= target);
        let index = upper.saturating_sub(1).min(divisions - 1);

        let before = self.arc_lengths[index];
        let after = self.arc_lengths[index + 1];
        let segment = after - before;
        let fraction = if segment > 0.0 {
            ((target - before) / segment).clamp(0.0, 1.0)
        } else {
            0.0
        };

        (index as f32 + fraction) / divisions as f32
    }
}

fn centripetal_segment(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);

    // Coincident points would divide by zero.
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let tangent1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let tangent2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let c0 = p1;
    let c1 = tangent1;
    let c2 = p1 * -3.0 + p2 * 3.0 - tangent1 * 2.0 - tangent2;
    let c3 = p1 * 2.0 - p2 * 2.0 + tangent1 + tangent2;

    let t2 = t * t;
    c0 + c1 * t + c2 * t2 + c3 * t2 * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_passes_through_control_points() {
        let curve = CatmullRomCurve::new(vec![
            Vec3::ZERO,
            Vec3::new(5.0, 2.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
        ]);
        assert!(curve.point(0.0).distance(Vec3::ZERO) < 1e-5);
        assert!(curve.point(0.5).distance(Vec3::new(5.0, 2.0, 0.0)) < 1e-4);
        assert!(curve.point(1.0).distance(Vec3::new(10.0, 0.0, 0.0)) < 1e-4);
    }

    #[test]
    fn arc_lift_is_capped() {
        let near = CatmullRomCurve::arc(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        assert!((near.point(0.5).y - 0.6).abs() < 1e-4);

        let far = CatmullRomCurve::arc(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!((far.point(0.5).y - CURVE_HEIGHT_CAP).abs() < 1e-4);
    }

    #[test]
    fn arc_length_sampling_hits_endpoints() {
        let curve = CatmullRomCurve::arc(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        assert!(curve.point_at(0.0).distance(curve.start()) < 1e-4);
        assert!(curve.point_at(1.0).distance(curve.end()) < 1e-3);
        assert!(curve.length() > 10.0);
    }

    #[test]
    fn arc_length_sampling_is_uniform() {
        let curve = CatmullRomCurve::arc(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        let samples: Vec<Vec3> = (0..=10).map(|i| curve.point_at(i as f32 / 10.0)).collect();
        let steps: Vec<f32> = samples.windows(2).map(|w| w[0].distance(w[1])).collect();
        let expected = curve.length() / 10.0;
        for step in steps {
            assert!((step - expected).abs() < expected * 0.05);
        }
    }

    #[test]
    fn degenerate_curve_stays_finite() {
        let curve = CatmullRomCurve::arc(Vec3::ONE, Vec3::ONE);
        assert_eq!(curve.length(), 0.0);
        assert!(curve.point_at(0.3).is_finite());
        assert!(curve.point_at(0.3).distance(Vec3::ONE) < 1e-5);
    }
}
