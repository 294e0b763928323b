use std::collections::HashSet;

use mdcluster_clustering::{clustering, refine_hierarchically, ClusteringStep, Similarity};

/// Two chains of points along the space diagonal, seven points each; the
/// nearest cross-chain pair is 84 * sqrt(3) apart.
fn shrt() -> Vec<Vec<f32>> {
    let mut data: Vec<Vec<f32>> = Vec::new();
    for i in 1..=7 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    for i in 91..=97 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    data
}

#[test]
fn refinement_splits_the_chains() {
    let data = shrt();

    // at this radius everything is one cluster
    let mut clusters = clustering(Similarity::CommonNeighbors, &data, 200.0, 2, 0, true);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 14);

    let init_step = ClusteringStep::new(0, 200.0, 2);
    let leaves = refine_hierarchically(Similarity::CommonNeighbors, &mut clusters, &data,
                                       init_step, 0.25, 3, 0, 2, true);

    // the cluster splits into the two chains once the shrinking radius
    // drops below the cross-chain distance, after four decay steps
    assert_eq!(clusters.len(), 2);
    assert_eq!(leaves.len(), clusters.len());
    assert_eq!(clusters[0].len(), 7);
    assert_eq!(clusters[1].len(), 7);

    assert_eq!(leaves[0], leaves[1]);
    assert_eq!(leaves[0].step, 4);
    assert_eq!(leaves[0].sim, 2);
    let bfactor = (-0.25f32 / 3.0).exp();
    let expected_cut = 200.0 * bfactor * bfactor * bfactor * bfactor;
    assert!((leaves[0].cut - expected_cut).abs() < 0.01);
    assert!(leaves[0].cut < init_step.cut);

    // membership is preserved through refinement
    let members: HashSet<usize> = clusters.iter().flatten().copied().collect();
    assert_eq!(members, (0..14).collect::<HashSet<usize>>());
}

#[test]
fn small_clusters_are_carried_forward() {
    let data = shrt();

    let mut clusters = clustering(Similarity::CommonNeighbors, &data, 200.0, 2, 0, true);
    let before = clusters.clone();

    // nothing exceeds the split threshold, so the first level leaves the
    // clusters alone and the loop stops right away
    let init_step = ClusteringStep::new(0, 200.0, 2);
    let leaves = refine_hierarchically(Similarity::CommonNeighbors, &mut clusters, &data,
                                       init_step, 0.25, 3, 0, 100, true);

    assert_eq!(clusters, before);
    assert_eq!(leaves, vec![init_step]);
}
