use macroquad::math::Vec2;

/// Linear interpolation between two f32 values
pub fn lerp(start: f32, end: f32, alpha: f32) -> f32 {
    start + (end - start) * alpha
}

/// Normalize a vector, falling back to `default` when the length is too
/// small to divide safely.
pub fn normalize_or(v: Vec2, default: Vec2) -> Vec2 {
    let length = v.length();
    if length > 0.01 { v / length } else { default }
}

/// Quadratic bezier point: B(t) = (1-t)^2*P0 + 2(1-t)t*P1 + t^2*P2
pub fn bezier_point(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Quadratic bezier tangent, normalized: B'(t) = 2(1-t)(P1-P0) + 2t(P2-P1)
pub fn bezier_tangent(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let tangent = (p1 - p0) * (2.0 * u) + (p2 - p1) * (2.0 * t);
    normalize_or(tangent, Vec2::new(1.0, 0.0))
}
