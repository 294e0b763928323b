//! Euclidean geometry helpers shared by the clustering predicates.

use statrs::function::beta::beta_reg;

/// Returns the squared Euclidean distance between two points.
///
/// Both slices must have the same dimensionality; a mismatch is a
/// precondition violation.
///
/// # Examples
/// ```rust
/// use mdcluster_clustering::geometry::squared_distance;
/// let d2 = squared_distance(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]);
/// assert!((d2 - 12.0).abs() < 1e-6);
/// ```
pub fn squared_distance(u: &[f32], v: &[f32]) -> f32 {
    debug_assert_eq!(u.len(), v.len());

    let mut dist: f32 = 0.0;
    for k in 0..u.len() {
        let d = u[k] - v[k];
        dist += d * d;
    }
    dist
}

/// Returns the Euclidean distance between two points.
pub fn distance(u: &[f32], v: &[f32]) -> f32 { squared_distance(u, v).sqrt() }

/// Volume of the intersection of two n-balls of radius `cut` whose centers
/// are `dist` apart, normalized by the volume of a single ball.
///
/// Evaluates the regularized incomplete beta function `I_x(½(n+1), ½)` at
/// `x = 1 − d²/(4R²)`; the argument is clamped to `[0, 1]` so the function
/// is total: it returns 1 for coinciding centers and 0 once the balls no
/// longer overlap (`dist >= 2 * cut`).
///
/// # Arguments
/// * `dist` - distance between the two ball centers
/// * `cut` - radius of both balls
/// * `n` - dimensionality of the space
///
/// # Examples
/// ```rust
/// use mdcluster_clustering::geometry::regularized_intersection_volume;
/// assert!((regularized_intersection_volume(0.0, 1.0, 3) - 1.0).abs() < 1e-10);
/// assert!(regularized_intersection_volume(2.5, 1.0, 3) < 1e-10);
/// ```
pub fn regularized_intersection_volume(dist: f64, cut: f64, n: usize) -> f64 {
    let a = 0.5 * (n as f64 + 1.0);
    let x = (1.0 - 0.25 * dist * dist / (cut * cut)).clamp(0.0, 1.0);

    beta_reg(a, 0.5, x)
}
