//! Tolerance-aware comparisons on probability vectors.

/// Absolute per-component tolerance under which two vertices are the same point.
pub const VERTEX_TOLERANCE: f64 = 1e-6;

/// True when both slices have the same length and every component differs by
/// strictly less than `tol`.
pub fn approx_eq_slice(a: &[f64], b: &[f64], tol: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
}

/// True when `point` touches at least one face of the box `[lower, upper]`.
///
/// A point that touches no face lies strictly inside the box on every
/// component.
pub fn is_on_face(point: &[f64], lower: &[f64], upper: &[f64], tol: f64) -> bool {
    point
        .iter()
        .zip(lower.iter().zip(upper))
        .any(|(&v, (&lo, &hi))| (v - lo).abs() < tol || (v - hi).abs() < tol)
}

/// Largest absolute component-wise difference; 0 for empty input.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}
