//! The seed-and-expand clustering engine.
//!
//! Reference points are visited in order of decreasing neighbor count. An
//! unassigned reference point tries to seed a new cluster from its neighbor
//! list; a successful seed is then saturated by repeatedly expanding from
//! the cluster's growing frontier until no more points join. Assignment is
//! first-writer-wins: once a point belongs to a cluster, later similarity
//! wins for it are ignored.

use std::collections::HashMap;
use std::sync::Mutex;

use log::warn;
use rayon::prelude::*;

use crate::neighbors::NeighborMap;
use crate::similarity::Similarity;

/// The shared partition state mutated during one engine run: the
/// point-to-cluster assignment and the member lists themselves.
///
/// Workers touch it only through a mutex; every read-modify-write re-checks
/// the assignment before inserting, so the first writer always wins.
#[derive(Debug, Default)]
pub struct Partition {
    assigned: HashMap<usize, usize>,
    clusters: Vec<Vec<usize>>,
}

impl Partition {
    /// Read-only access to the clusters collected so far.
    pub fn clusters(&self) -> &[Vec<usize>] { &self.clusters }

    /// Consumes the partition, yielding the cluster member lists.
    pub fn into_clusters(self) -> Vec<Vec<usize>> { self.clusters }

    /// The cluster index a point was assigned to, if any.
    pub fn cluster_of(&self, point: usize) -> Option<usize> { self.assigned.get(&point).copied() }
}

/// Tries to seed a new cluster on the unassigned reference point.
///
/// Every candidate from `input` that is unassigned, carries a primary
/// neighbor list and satisfies the similarity predicate joins the
/// provisional cluster. The cluster is committed only if at least one
/// candidate joined (so it holds the reference point plus one more);
/// otherwise the attempt leaves the partition untouched.
///
/// Similarity evaluation is pure and runs outside the lock, in parallel
/// over the candidates. Returns whether a new cluster was committed.
pub fn expand_unclustered(similarity: Similarity, data: &[Vec<f32>],
                          partition: &Mutex<Partition>, neighbors_ij: &NeighborMap,
                          input: &[usize], refpoint: usize, cut: f32, sim: usize) -> bool {
    let cluster_idx;
    {
        let mut state = partition.lock().unwrap();
        if state.assigned.contains_key(&refpoint) {
            warn!("unclustered expansion started on assigned point {}; if you read this message please report", refpoint);
            return false;
        }
        cluster_idx = state.clusters.len();
        state.clusters.push(vec![refpoint]);
    }

    input.par_iter().for_each(|&point| {
        if point == refpoint || !neighbors_ij.contains_key(&point) { return; }
        if partition.lock().unwrap().assigned.contains_key(&point) { return; }

        let similar = similarity.evaluate(data, neighbors_ij, refpoint, point, cut, sim);
        if similar {
            let mut state = partition.lock().unwrap();
            if !state.assigned.contains_key(&point) {
                state.assigned.insert(point, cluster_idx);
                state.clusters[cluster_idx].push(point);
            }
        }
    });

    // Only keep this cluster if at least two points ended up in it
    let mut state = partition.lock().unwrap();
    if state.clusters[cluster_idx].len() > 1 {
        state.assigned.insert(refpoint, cluster_idx);
        true
    } else {
        state.clusters.pop();
        false
    }
}

/// Grows the cluster of an already assigned reference point.
///
/// Candidates from `input` that are unassigned, carry a primary neighbor
/// list and are similar to `refpoint` are appended to the reference
/// point's cluster. The caller parallelizes over reference points, so the
/// candidate loop itself stays serial.
pub fn expand_clustered(similarity: Similarity, data: &[Vec<f32>],
                        partition: &Mutex<Partition>, neighbors_ij: &NeighborMap,
                        input: &[usize], refpoint: usize, cut: f32, sim: usize) {
    let cluster_idx = match partition.lock().unwrap().assigned.get(&refpoint) {
        Some(&idx) => idx,
        None => {
            warn!("clustered expansion started on unassigned point {}; if you read this message please report", refpoint);
            return;
        }
    };

    for &point in input {
        if point == refpoint || !neighbors_ij.contains_key(&point) { continue; }
        if partition.lock().unwrap().assigned.contains_key(&point) { continue; }

        let similar = similarity.evaluate(data, neighbors_ij, refpoint, point, cut, sim);
        if similar {
            let mut state = partition.lock().unwrap();
            if !state.assigned.contains_key(&point) {
                state.assigned.insert(point, cluster_idx);
                state.clusters[cluster_idx].push(point);
            }
        }
    }
}

/// Elements of the ascending list `a` that are absent from the ascending
/// list `b`.
fn sorted_difference(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    let mut j = 0;
    for &x in a {
        while j < b.len() && b[j] < x { j += 1; }
        if j >= b.len() || b[j] != x { out.push(x); }
    }
    out
}

/// Saturates the newest cluster: expands from every member of the current
/// frontier until a full pass adds no new points.
fn saturate(similarity: Similarity, data: &[Vec<f32>], partition: &Mutex<Partition>,
            neighbors_ij: &NeighborMap, second_neighbors_ij: &NeighborMap,
            cut: f32, sim: usize, mutual: bool) {
    let cluster_idx = partition.lock().unwrap().clusters.len() - 1;

    let mut to_consider: Vec<usize> = partition.lock().unwrap().clusters[cluster_idx].clone();
    to_consider.sort_unstable();

    while !to_consider.is_empty() {
        let mut prev_cluster: Vec<usize> = partition.lock().unwrap().clusters[cluster_idx].clone();
        prev_cluster.sort_unstable();

        to_consider.par_iter().for_each(|&clpoint| {
            if let Some(neighbors_i) = neighbors_ij.get(&clpoint) {
                expand_clustered(similarity, data, partition, neighbors_ij,
                                 neighbors_i, clpoint, cut, sim);
            }
            if !mutual {
                if let Some(second_neighbors_i) = second_neighbors_ij.get(&clpoint) {
                    expand_clustered(similarity, data, partition, neighbors_ij,
                                     second_neighbors_i, clpoint, cut, sim);
                }
            }
        });

        let mut current_cluster: Vec<usize> = partition.lock().unwrap().clusters[cluster_idx].clone();
        current_cluster.sort_unstable();
        to_consider = sorted_difference(&current_cluster, &prev_cluster);
    }
}

/// Sorts clusters by decreasing size and drops every cluster whose size
/// does not exceed `nkeep`.
pub fn sort_and_prune(clusters: &mut Vec<Vec<usize>>, nkeep: usize) {
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));
    clusters.retain(|cluster| cluster.len() > nkeep);
    clusters.shrink_to_fit();
}

/// Runs the full seed-and-expand algorithm over a prepared neighborhood.
///
/// Reference points are taken in order of decreasing neighbor count (ties
/// broken by ascending id, which keeps the output deterministic for a
/// given input). When `mutual` is false, a failed seed is retried on the
/// reference point's second-shell list, a successful seed is additionally
/// extended from it, and saturation walks both shells.
///
/// An empty neighborhood map yields the empty cluster list.
///
/// # Arguments
/// * `similarity` - the connectivity predicate
/// * `data` - the point set
/// * `neighbors_ij` - primary neighborhood map at `(cut, sim)`
/// * `second_neighbors_ij` - second-shell map; may be empty
/// * `cut` - neighborhood radius
/// * `sim` - similarity threshold
/// * `nkeep` - minimum retained cluster size (smaller clusters are noise)
/// * `mutual` - when false, second-shell lists extend the cluster reach
pub fn cluster(similarity: Similarity, data: &[Vec<f32>], neighbors_ij: &NeighborMap,
               second_neighbors_ij: &NeighborMap, cut: f32, sim: usize,
               nkeep: usize, mutual: bool) -> Vec<Vec<usize>> {
    // order reference points by the size of their neighbor lists
    let mut order: Vec<(usize, usize)> = neighbors_ij
        .iter()
        .map(|(&refpoint, neighbors_i)| {
            let mut count = neighbors_i.len();
            if !mutual {
                if let Some(second_neighbors_i) = second_neighbors_ij.get(&refpoint) {
                    count += second_neighbors_i.len();
                }
            }
            (refpoint, count)
        })
        .collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let partition = Mutex::new(Partition::default());

    for (refpoint, _) in order {
        if partition.lock().unwrap().assigned.contains_key(&refpoint) { continue; }

        let mut seeded = expand_unclustered(similarity, data, &partition, neighbors_ij,
                                            &neighbors_ij[&refpoint], refpoint, cut, sim);
        if !mutual {
            if let Some(second_neighbors_i) = second_neighbors_ij.get(&refpoint) {
                if seeded {
                    expand_clustered(similarity, data, &partition, neighbors_ij,
                                     second_neighbors_i, refpoint, cut, sim);
                } else {
                    seeded = expand_unclustered(similarity, data, &partition, neighbors_ij,
                                                second_neighbors_i, refpoint, cut, sim);
                }
            }
        }

        if seeded {
            saturate(similarity, data, &partition, neighbors_ij, second_neighbors_ij,
                     cut, sim, mutual);
        }
    }

    let mut clusters = partition.into_inner().unwrap().into_clusters();
    sort_and_prune(&mut clusters, nkeep);
    clusters
}
