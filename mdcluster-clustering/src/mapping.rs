//! Projection of held-out frames onto an existing clustering.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;

use crate::hierarchy::ClusteringStep;
use crate::neighbors::frame_neighbors;
use crate::similarity::shared_neighbors;

/// Assigns frames that took no part in the clustering to the produced
/// clusters, by a shared-neighbor vote at each cluster's leaf parameters.
///
/// `clusters` arrives in the reduced (sliced) id space; `frames` maps each
/// reduced id to its full-data id. Every full frame outside the image of
/// that map is scored against every cluster: its neighborhood in the
/// reduced data at the leaf's `(cut, sim)` is intersected with the cluster
/// members, and a qualifying overlap (`>= sim`) scores
/// `|overlap| / |cluster|`. The frame joins the best-scoring cluster, ties
/// going to the lowest cluster index; frames with no qualifying cluster
/// stay noise.
///
/// On return `clusters` is expressed in full-data ids, with the mapped
/// frames appended in ascending frame order.
pub fn map_onto_clusters(clusters: &mut Vec<Vec<usize>>, full_data: &[Vec<f32>],
                         reduced_data: &[Vec<f32>], frames: &BTreeMap<usize, usize>,
                         leaves: &[ClusteringStep]) {
    let sliced_in: HashSet<usize> = frames.values().copied().collect();
    let mut similarity_maps: Vec<BTreeMap<usize, f32>> = vec![BTreeMap::new(); full_data.len()];

    for (cluster_idx, cluster_i) in clusters.iter().enumerate() {
        let leaf = leaves[cluster_idx];

        // the linear-merge intersection needs ascending input
        let mut members = cluster_i.clone();
        members.sort_unstable();

        let scores: Vec<(usize, f32)> = (0..full_data.len())
            .into_par_iter()
            .filter_map(|frame| {
                if sliced_in.contains(&frame) { return None; }

                let neighbors_i = frame_neighbors(&full_data[frame], reduced_data,
                                                  leaf.cut, leaf.sim)?;
                let shared = shared_neighbors(&members, &neighbors_i);
                if shared.len() >= leaf.sim {
                    Some((frame, shared.len() as f32 / cluster_i.len() as f32))
                } else {
                    None
                }
            })
            .collect();

        for (frame, score) in scores {
            similarity_maps[frame].insert(cluster_idx, score);
        }
    }

    // best-scoring cluster per frame; the first maximum wins so ties go to
    // the lowest cluster index
    let mut mapped: BTreeMap<usize, usize> = BTreeMap::new();
    for (frame, cluster_scores) in similarity_maps.iter().enumerate() {
        let mut best: Option<(usize, f32)> = None;
        for (&cluster_idx, &score) in cluster_scores {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((cluster_idx, score)),
            }
        }
        if let Some((cluster_idx, _)) = best { mapped.insert(frame, cluster_idx); }
    }

    // lift the existing members from reduced ids to full-data ids
    for cluster_i in clusters.iter_mut() {
        for point in cluster_i.iter_mut() {
            *point = *frames.get(point).expect("cluster member missing from the frame map");
        }
    }

    for (frame, cluster_idx) in mapped {
        clusters[cluster_idx].push(frame);
    }
}
