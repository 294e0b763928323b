//! Similarity predicates deciding whether two points belong to the same
//! density cluster.

use crate::geometry::{distance, regularized_intersection_volume};
use crate::neighbors::NeighborMap;

/// Intersects two ascending neighbor lists by a linear merge.
///
/// Both inputs must be strictly ascending; the output is ascending as well.
///
/// # Examples
/// ```rust
/// use mdcluster_clustering::similarity::shared_neighbors;
/// assert_eq!(shared_neighbors(&[0, 1, 2, 3], &[2, 3, 4, 5]), vec![2, 3]);
/// assert!(shared_neighbors(&[0, 1, 2, 3], &[4, 5, 6, 7]).is_empty());
/// ```
pub fn shared_neighbors(list1: &[usize], list2: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    let (mut a, mut b) = (0, 0);
    while a < list1.len() && b < list2.len() {
        if list1[a] < list2[b] {
            a += 1;
        } else if list2[b] < list1[a] {
            b += 1;
        } else {
            out.push(list1[a]);
            a += 1;
            b += 1;
        }
    }
    out
}

/// Counts the members shared by two ascending neighbor lists.
///
/// Allocation-free variant of [`shared_neighbors()`](shared_neighbors);
/// this is the hot inner loop of the clustering engine.
pub fn shared_neighbor_count(list1: &[usize], list2: &[usize]) -> usize {
    let mut count = 0;
    let (mut a, mut b) = (0, 0);
    while a < list1.len() && b < list2.len() {
        if list1[a] < list2[b] {
            a += 1;
        } else if list2[b] < list1[a] {
            b += 1;
        } else {
            count += 1;
            a += 1;
            b += 1;
        }
    }
    count
}

/// The cluster-connectivity predicate used by the engine.
///
/// Two variants share the common-nearest-neighbor count of the reference
/// point and the candidate; they differ in how the count is thresholded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Similarity {
    /// Plain CNN: the shared-neighbor count itself must reach `sim`.
    CommonNeighbors,
    /// Volume-scaled CNN: the shared-neighbor count is turned into a
    /// density by dividing through the intersection volume of the two
    /// cutoff balls; the density must reach `sim`.
    ScaledDensity,
}

impl Similarity {
    /// Decides whether `point` is similar to `refpoint`.
    ///
    /// Both points must have an entry in `neighbors_ij`; the engine
    /// guarantees this for every candidate it evaluates. The call is pure
    /// and safe to run concurrently.
    ///
    /// # Arguments
    /// * `data` - the point set
    /// * `neighbors_ij` - primary neighborhood map
    /// * `refpoint`, `point` - the pair under test
    /// * `cut` - neighborhood radius (used by the density variant)
    /// * `sim` - similarity threshold
    pub fn evaluate(&self, data: &[Vec<f32>], neighbors_ij: &NeighborMap,
                    refpoint: usize, point: usize, cut: f32, sim: usize) -> bool {
        let shared = shared_neighbor_count(&neighbors_ij[&refpoint], &neighbors_ij[&point]);
        match self {
            Similarity::CommonNeighbors => shared >= sim,
            Similarity::ScaledDensity => {
                let dist = distance(&data[refpoint], &data[point]) as f64;
                let ivolume = regularized_intersection_volume(dist, cut as f64, data[refpoint].len());
                // plus two for the reference points themselves, which are
                // absent from each other's neighbor list
                let density = (shared + 2) as f64 / ivolume;
                density >= sim as f64
            }
        }
    }
}
