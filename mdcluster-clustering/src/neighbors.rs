//! Construction and maintenance of ε-neighborhoods over a fixed point set.
//!
//! A neighborhood map associates a point id with the ascending list of ids
//! within the cutoff radius. A point never lists itself, and an entry is
//! kept only if the list holds at least `sim + 1` members; shorter lists
//! mark the point as pre-filtered noise.

use std::collections::BTreeMap;
use std::ops::Range;

use rayon::prelude::*;

use crate::geometry::squared_distance;

/// Neighbor lists keyed by point id; lists are strictly ascending and never
/// contain the key itself.
pub type NeighborMap = BTreeMap<usize, Vec<usize>>;

/// Collects all `j` in `range` with `|data[j] - refpoint|² <= cutsquare`.
///
/// Callers pass the ranges `0..i` and `i+1..n` to keep point `i` out of its
/// own list.
fn scan_range(neighbors: &mut Vec<usize>, data: &[Vec<f32>], refpoint: &[f32],
              range: Range<usize>, cutsquare: f32) {
    for j in range {
        if squared_distance(refpoint, &data[j]) <= cutsquare {
            neighbors.push(j);
        }
    }
}

/// Like [`scan_range()`](scan_range), but also records second-shell points
/// with squared distance in `(cut², 4·cut²]` when `mutual` is off.
fn scan_range_dual(neighbors: &mut Vec<usize>, second_neighbors: &mut Vec<usize>,
                   data: &[Vec<f32>], refpoint: &[f32], range: Range<usize>,
                   cutsquare: f32, mutual: bool) {
    let fourcutsquare = 4.0 * cutsquare;
    for j in range {
        let dist = squared_distance(refpoint, &data[j]);
        if dist <= cutsquare {
            neighbors.push(j);
        } else if !mutual && dist <= fourcutsquare {
            second_neighbors.push(j);
        }
    }
}

/// Builds the neighborhood map of `data` for the cutoff radius `cut`.
///
/// Runs the range queries for all points in parallel. A list enters the map
/// only if it has at least `sim + 1` members.
///
/// # Arguments
/// * `data` - the point set, one row per point
/// * `cut` - neighborhood radius
/// * `sim` - similarity threshold used for the retention pre-filter
pub fn build_neighbor_map(data: &[Vec<f32>], cut: f32, sim: usize) -> NeighborMap {
    let cutsquare = cut * cut;

    let lists: Vec<(usize, Vec<usize>)> = (0..data.len())
        .into_par_iter()
        .map(|i| {
            let mut neighbors_i: Vec<usize> = Vec::new();
            scan_range(&mut neighbors_i, data, &data[i], 0..i, cutsquare);
            scan_range(&mut neighbors_i, data, &data[i], i + 1..data.len(), cutsquare);
            (i, neighbors_i)
        })
        .collect();

    let mut neighbors_ij = NeighborMap::new();
    for (i, neighbors_i) in lists {
        if neighbors_i.len() >= sim + 1 { neighbors_ij.insert(i, neighbors_i); }
    }
    neighbors_ij
}

/// Builds the primary neighborhood map together with the second-shell map.
///
/// The second shell holds points with squared distance in `(cut², 4·cut²]`
/// and is populated only when `mutual` is false; a second-shell list is
/// recorded only for points whose primary list was retained.
pub fn build_dual_neighbor_maps(data: &[Vec<f32>], cut: f32, sim: usize,
                                mutual: bool) -> (NeighborMap, NeighborMap) {
    let cutsquare = cut * cut;

    let lists: Vec<(usize, Vec<usize>, Vec<usize>)> = (0..data.len())
        .into_par_iter()
        .map(|i| {
            let mut neighbors_i: Vec<usize> = Vec::new();
            let mut second_neighbors_i: Vec<usize> = Vec::new();
            scan_range_dual(&mut neighbors_i, &mut second_neighbors_i,
                            data, &data[i], 0..i, cutsquare, mutual);
            scan_range_dual(&mut neighbors_i, &mut second_neighbors_i,
                            data, &data[i], i + 1..data.len(), cutsquare, mutual);
            (i, neighbors_i, second_neighbors_i)
        })
        .collect();

    let mut neighbors_ij = NeighborMap::new();
    let mut second_neighbors_ij = NeighborMap::new();
    for (i, neighbors_i, second_neighbors_i) in lists {
        if neighbors_i.len() >= sim + 1 {
            neighbors_ij.insert(i, neighbors_i);
            if !mutual && !second_neighbors_i.is_empty() {
                second_neighbors_ij.insert(i, second_neighbors_i);
            }
        }
    }
    (neighbors_ij, second_neighbors_ij)
}

/// Extends every list of an existing map to a larger cutoff radius.
///
/// Points already listed stay in place; points that newly fall within `cut`
/// are merged in, keeping each list strictly ascending.
pub fn extend_neighbor_map(neighbors_ij: &mut NeighborMap, data: &[Vec<f32>], cut: f32) {
    let cutsquare = cut * cut;

    let additions: Vec<(usize, Vec<usize>)> = neighbors_ij
        .par_iter()
        .map(|(&i, neighbors_i)| {
            let mut added: Vec<usize> = Vec::new();
            let mut cursor = 0;
            for j in 0..data.len() {
                // advance past ids that are already neighbors
                while cursor < neighbors_i.len() && neighbors_i[cursor] < j { cursor += 1; }
                if cursor < neighbors_i.len() && neighbors_i[cursor] == j { continue; }
                if j == i { continue; }
                if squared_distance(&data[i], &data[j]) <= cutsquare { added.push(j); }
            }
            (i, added)
        })
        .collect();

    for (i, added) in additions {
        if added.is_empty() { continue; }
        let old = neighbors_ij.get_mut(&i).unwrap();
        let mut merged: Vec<usize> = Vec::with_capacity(old.len() + added.len());
        let (mut a, mut b) = (0, 0);
        while a < old.len() && b < added.len() {
            if old[a] < added[b] {
                merged.push(old[a]);
                a += 1;
            } else {
                merged.push(added[b]);
                b += 1;
            }
        }
        merged.extend_from_slice(&old[a..]);
        merged.extend_from_slice(&added[b..]);
        *old = merged;
    }
}

/// Prunes an existing map down to a smaller cutoff radius.
///
/// Neighbors that moved out of range are dropped, and any list falling
/// below `sim + 1` members is removed from the map altogether.
pub fn prune_neighbor_map(neighbors_ij: &mut NeighborMap, data: &[Vec<f32>], cut: f32, sim: usize) {
    let cutsquare = cut * cut;

    let trimmed: Vec<(usize, Vec<usize>)> = neighbors_ij
        .par_iter()
        .map(|(&i, neighbors_i)| {
            let kept: Vec<usize> = neighbors_i.iter().copied()
                .filter(|&j| squared_distance(&data[i], &data[j]) <= cutsquare)
                .collect();
            (i, kept)
        })
        .collect();

    for (i, kept) in trimmed {
        if kept.len() >= sim + 1 {
            neighbors_ij.insert(i, kept);
        } else {
            neighbors_ij.remove(&i);
        }
    }
}

/// Computes the neighbor list of a free-standing vector against `data`.
///
/// Returns `None` if fewer than `sim + 1` points fall within the cutoff;
/// the reference vector is not part of the point set, so there is no self
/// to exclude.
pub fn frame_neighbors(refpoint: &[f32], data: &[Vec<f32>], cut: f32, sim: usize) -> Option<Vec<usize>> {
    let cutsquare = cut * cut;

    let mut neighbors_i: Vec<usize> = Vec::new();
    scan_range(&mut neighbors_i, data, refpoint, 0..data.len(), cutsquare);

    if neighbors_i.len() >= sim + 1 { Some(neighbors_i) } else { None }
}

/// Builds a neighborhood map whose keys range over the members of one
/// cluster while the neighbors are still drawn from the full point set.
///
/// Hierarchical refinement uses this to re-discover density inside a
/// cluster at a smaller radius without losing the surrounding context.
pub fn cluster_neighbor_map(cluster: &[usize], data: &[Vec<f32>], cut: f32, sim: usize) -> NeighborMap {
    let cutsquare = cut * cut;

    let lists: Vec<(usize, Vec<usize>)> = cluster
        .par_iter()
        .map(|&refpoint| {
            let mut neighbors_i: Vec<usize> = Vec::new();
            scan_range(&mut neighbors_i, data, &data[refpoint], 0..refpoint, cutsquare);
            scan_range(&mut neighbors_i, data, &data[refpoint], refpoint + 1..data.len(), cutsquare);
            (refpoint, neighbors_i)
        })
        .collect();

    let mut neighbors_ij = NeighborMap::new();
    for (refpoint, neighbors_i) in lists {
        if neighbors_i.len() >= sim + 1 { neighbors_ij.insert(refpoint, neighbors_i); }
    }
    neighbors_ij
}
