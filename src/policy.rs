//! Clamping and snapping policy.
//!
//! Pure functions, applied by the manipulators: scale and translation are
//! clamped on every frame, rotation is snapped only when a gesture ends so
//! live manipulation feels unconstrained.

use slotframe_gesture::{Point, Rect, Vector};

/// Clamp a scale into `[min, max]`.
///
/// A NaN scale maps to `min`. A reversed range is treated as its swap.
pub fn clamp_scale(scale: f32, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if scale.is_nan() {
        return lo;
    }
    scale.max(lo).min(hi)
}

/// Half extents of the axis-aligned box around an element rotated by
/// `rotation_degrees`.
pub fn rotated_half_extents(half_extents: Vector, rotation_degrees: f32) -> Vector {
    let radians = rotation_degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    Vector::new(
        half_extents.dx * cos + half_extents.dy * sin,
        half_extents.dx * sin + half_extents.dy * cos,
    )
}

fn clamp_axis(center: f32, half: f32, start: f32, length: f32, margin: f32) -> f32 {
    let lo = start - margin + half;
    let hi = start + length + margin - half;
    // Element wider than the allowed area: keep it covering the area instead.
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if center.is_nan() {
        return (lo + hi) / 2.0;
    }
    center.max(lo).min(hi)
}

/// Bound an element center so its box stays inside `bounds` grown by `margin`.
///
/// `half_extents` are the unscaled half width/height of the element (use
/// [`rotated_half_extents`] first for rotated elements).
pub fn clamp_translation(
    center: Point,
    scale: f32,
    half_extents: Vector,
    bounds: Rect,
    margin: f32,
) -> Point {
    let half = half_extents * scale.max(0.0);
    Point::new(
        clamp_axis(center.x, half.dx, bounds.x, bounds.width, margin),
        clamp_axis(center.y, half.dy, bounds.y, bounds.height, margin),
    )
}

/// Snap `angle` (degrees) to the nearest target within `tolerance`.
///
/// Targets are compared on the circle, so 358 is 2 degrees from 0. The
/// result keeps the input's winding: 447 snaps to 450, not to 90. Outside
/// tolerance the input is returned unchanged.
pub fn snap_rotation(angle: f32, targets: &[f32], tolerance: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    let base = (angle / 360.0).floor() * 360.0;
    let within_turn = angle - base;

    let mut best: Option<(f32, f32)> = None;
    for &target in targets {
        let target = crate::transform::normalize_degrees(target);
        for candidate in [target - 360.0, target, target + 360.0] {
            let distance = (within_turn - candidate).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }
    }

    match best {
        Some((candidate, distance)) if distance <= tolerance => base + candidate,
        _ => angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_SNAP_TARGETS, DEFAULT_SNAP_TOLERANCE};

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn snap(angle: f32) -> f32 {
        snap_rotation(angle, &DEFAULT_SNAP_TARGETS, DEFAULT_SNAP_TOLERANCE)
    }

    #[test]
    fn test_clamp_scale_basic() {
        assert_eq!(clamp_scale(0.1, 0.5, 3.0), 0.5);
        assert_eq!(clamp_scale(4.0, 0.5, 3.0), 3.0);
        assert_eq!(clamp_scale(1.2, 0.5, 3.0), 1.2);
        assert_eq!(clamp_scale(f32::NAN, 0.5, 3.0), 0.5);
        assert_eq!(clamp_scale(9.0, 3.0, 0.5), 3.0);
    }

    #[test]
    fn test_clamp_scale_idempotent() {
        let samples = [-10.0, 0.0, 0.49, 0.5, 1.0, 2.99, 3.0, 3.01, 1e9, f32::NAN, f32::INFINITY];
        for s in samples {
            let once = clamp_scale(s, 0.5, 3.0);
            assert_eq!(clamp_scale(once, 0.5, 3.0), once);
        }
    }

    #[test]
    fn test_snap_rotation() {
        assert_eq!(snap(87.0), 90.0);
        assert_eq!(snap(80.0), 80.0);
        assert_eq!(snap(270.5), 270.0);
        assert_eq!(snap(-3.0), 0.0);
        assert_eq!(snap(358.0), 360.0);
        assert_eq!(snap(447.0), 450.0);
        assert_eq!(snap(45.0), 45.0);
    }

    #[test]
    fn test_snap_custom_targets() {
        assert_eq!(snap_rotation(44.0, &[45.0], 2.0), 45.0);
        assert_eq!(snap_rotation(40.0, &[45.0], 2.0), 40.0);
        assert_eq!(snap_rotation(40.0, &[], 2.0), 40.0);
    }

    #[test]
    fn test_clamp_translation_inside_margin() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
        let half = Vector::new(50.0, 25.0);
        // Inside: untouched.
        let p = clamp_translation(Point::new(200.0, 200.0), 1.0, half, bounds, 50.0);
        assert_eq!(p, Point::new(200.0, 200.0));
        // Far left: box edge stops at -margin.
        let p = clamp_translation(Point::new(-500.0, 200.0), 1.0, half, bounds, 50.0);
        assert!(approx_eq(p.x, 0.0));
        // Scale doubles the half width.
        let p = clamp_translation(Point::new(1000.0, 200.0), 2.0, half, bounds, 0.0);
        assert!(approx_eq(p.x, 300.0));
    }

    #[test]
    fn test_clamp_translation_oversized_element() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let half = Vector::new(150.0, 10.0);
        // Allowed interval is swapped: [-50, 150].
        let p = clamp_translation(Point::new(500.0, 50.0), 1.0, half, bounds, 0.0);
        assert!(approx_eq(p.x, 150.0));
        let p = clamp_translation(Point::new(20.0, 50.0), 1.0, half, bounds, 0.0);
        assert!(approx_eq(p.x, 20.0));
    }

    #[test]
    fn test_rotated_half_extents() {
        let half = Vector::new(100.0, 10.0);
        let quarter = rotated_half_extents(half, 90.0);
        assert!((quarter.dx - 10.0).abs() < 0.01);
        assert!((quarter.dy - 100.0).abs() < 0.01);
        let none = rotated_half_extents(half, 0.0);
        assert!(approx_eq(none.dx, 100.0));
    }
}
