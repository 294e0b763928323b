use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use mdcluster_clustering::engine::{cluster, expand_clustered, expand_unclustered,
                                   sort_and_prune, Partition};
use mdcluster_clustering::neighbors::{build_neighbor_map, NeighborMap};
use mdcluster_clustering::similarity::{shared_neighbors, Similarity};
use mdcluster_clustering::{clustering, validate_input};

/// Two chains of points along the space diagonal, seven points each.
fn shrt() -> Vec<Vec<f32>> {
    let mut data: Vec<Vec<f32>> = Vec::new();
    for i in 1..=7 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    for i in 91..=97 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    data
}

/// The chains of `shrt` extended by one point each, plus an isolated point
/// between them: ids 0..=7 and 9..=15 form the chains, id 8 is alone.
fn mdm() -> Vec<Vec<f32>> {
    let mut data: Vec<Vec<f32>> = Vec::new();
    for i in 0..=7 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    data.push(vec![10.0, 11.0, 12.0]);
    for i in 91..=97 { data.push(vec![i as f32, (i + 1) as f32, (i + 2) as f32]); }
    data
}

/// Neighborhoods kept without the similarity pre-filter, covering two chain
/// steps; the fixture the expansion scenarios run on.
fn chain_neighbors(data: &[Vec<f32>]) -> NeighborMap {
    build_neighbor_map(data, 3.5, 0)
}

fn sorted(mut cluster: Vec<usize>) -> Vec<usize> {
    cluster.sort_unstable();
    cluster
}

#[test]
fn list_intersection() {
    assert_eq!(shared_neighbors(&[0, 1, 2, 3], &[2, 3, 4, 5]), vec![2, 3]);
    assert!(shared_neighbors(&[0, 1, 2, 3], &[4, 5, 6, 7]).is_empty());
}

#[test]
fn cnn_similarity() {
    let data = shrt();
    let neighbors_ij = chain_neighbors(&data);

    // the chain end shares a single neighbor with its successor
    assert!(!Similarity::CommonNeighbors.evaluate(&data, &neighbors_ij, 0, 1, 3.5, 2));
    assert!(Similarity::CommonNeighbors.evaluate(&data, &neighbors_ij, 2, 1, 3.5, 2));
}

#[test]
fn cnn_similarity_is_symmetric() {
    let data = shrt();
    let neighbors_ij = chain_neighbors(&data);

    for (refpoint, point) in [(0, 1), (1, 2), (2, 4), (3, 5)] {
        let forward = Similarity::CommonNeighbors.evaluate(&data, &neighbors_ij, refpoint, point, 3.5, 2);
        let backward = Similarity::CommonNeighbors.evaluate(&data, &neighbors_ij, point, refpoint, 3.5, 2);
        assert_eq!(forward, backward);
    }
}

#[test]
fn vscnn_similarity() {
    let data = shrt();
    let neighbors_ij = chain_neighbors(&data);

    // the density division turns the single shared neighbor of the pair
    // (0, 1) into a win; this is what makes vs-CNN crisper than CNN
    assert!(Similarity::ScaledDensity.evaluate(&data, &neighbors_ij, 0, 1, 3.5, 2));
    assert!(Similarity::ScaledDensity.evaluate(&data, &neighbors_ij, 2, 1, 3.5, 2));
}

#[test]
fn seed_expansion() {
    let data = shrt();
    let neighbors_ij = chain_neighbors(&data);
    let partition = Mutex::new(Partition::default());

    // seeding on one reference point per chain
    let seeded = expand_unclustered(Similarity::CommonNeighbors, &data, &partition,
                                    &neighbors_ij, &neighbors_ij[&2], 2, 3.5, 2);
    assert!(seeded);
    let seeded = expand_unclustered(Similarity::CommonNeighbors, &data, &partition,
                                    &neighbors_ij, &neighbors_ij[&11], 11, 3.5, 2);
    assert!(seeded);

    {
        let state = partition.lock().unwrap();
        assert_eq!(state.clusters().len(), 2);
        assert_eq!(sorted(state.clusters()[0].clone()), vec![1, 2, 3]);
        assert_eq!(sorted(state.clusters()[1].clone()), vec![10, 11, 12]);
        assert_eq!(state.cluster_of(2), Some(0));
        assert_eq!(state.cluster_of(11), Some(1));
        assert_eq!(state.cluster_of(4), None);
    }

    // clustered expansion pulls in one more point on each side
    expand_clustered(Similarity::CommonNeighbors, &data, &partition,
                     &neighbors_ij, &neighbors_ij[&3], 3, 3.5, 2);
    expand_clustered(Similarity::CommonNeighbors, &data, &partition,
                     &neighbors_ij, &neighbors_ij[&10], 10, 3.5, 2);

    let state = partition.lock().unwrap();
    assert_eq!(sorted(state.clusters()[0].clone()), vec![1, 2, 3, 4]);
    assert_eq!(sorted(state.clusters()[1].clone()), vec![9, 10, 11, 12]);
}

#[test]
fn failed_seed_leaves_no_trace() {
    let data = shrt();
    let neighbors_ij = chain_neighbors(&data);
    let partition = Mutex::new(Partition::default());

    // the chain end is not similar to anything at sim = 2
    let seeded = expand_unclustered(Similarity::CommonNeighbors, &data, &partition,
                                    &neighbors_ij, &neighbors_ij[&0], 0, 3.5, 2);
    assert!(!seeded);

    let state = partition.lock().unwrap();
    assert!(state.clusters().is_empty());
    assert_eq!(state.cluster_of(0), None);
}

#[test]
fn cnn_algorithm() {
    let data = mdm();
    let neighbors_ij = chain_neighbors(&data);
    let second_neighbors_ij = NeighborMap::new();

    let clusters = cluster(Similarity::CommonNeighbors, &data, &neighbors_ij,
                           &second_neighbors_ij, 5.0, 2, 0, true);

    assert_eq!(clusters.len(), 2);
    assert_eq!(sorted(clusters[0].clone()), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(sorted(clusters[1].clone()), vec![10, 11, 12, 13, 14]);
}

#[test]
fn vscnn_algorithm() {
    let data = mdm();
    let neighbors_ij = chain_neighbors(&data);
    let second_neighbors_ij = NeighborMap::new();

    let clusters = cluster(Similarity::ScaledDensity, &data, &neighbors_ij,
                           &second_neighbors_ij, 5.0, 2, 0, true);

    // the chain ends join too; vs-CNN resolves the full chains
    assert_eq!(clusters.len(), 2);
    assert_eq!(sorted(clusters[0].clone()), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(sorted(clusters[1].clone()), vec![9, 10, 11, 12, 13, 14, 15]);
}

#[test]
fn clustering_cnn_end_to_end() {
    let data = mdm();

    // neighborhoods and engine in one call; the pre-filter removes the
    // chain ends and the isolated point 8 before any expansion
    let clusters = clustering(Similarity::CommonNeighbors, &data, 5.0, 2, 0, true);

    assert_eq!(clusters.len(), 2);
    assert_eq!(sorted(clusters[0].clone()), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(sorted(clusters[1].clone()), vec![10, 11, 12, 13, 14]);
}

#[test]
fn clusters_are_disjoint() {
    let data = mdm();
    let clusters = clustering(Similarity::CommonNeighbors, &data, 5.0, 2, 0, true);

    let mut seen: HashSet<usize> = HashSet::new();
    for cluster_i in &clusters {
        for &point in cluster_i {
            assert!(seen.insert(point), "point {} appears twice", point);
        }
    }
}

#[test]
fn empty_input_yields_no_clusters() {
    let data: Vec<Vec<f32>> = Vec::new();
    let clusters = clustering(Similarity::CommonNeighbors, &data, 1.0, 2, 0, true);
    assert!(clusters.is_empty());
}

#[test]
fn sort_and_prune_orders_and_drops() {
    let mut clusters = vec![vec![1], vec![2, 3], vec![4, 5, 6], vec![7, 8]];
    sort_and_prune(&mut clusters, 1);

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters[0].len(), 3);
    for pair in clusters.windows(2) {
        assert!(pair[0].len() >= pair[1].len());
    }
    for cluster_i in &clusters {
        assert!(cluster_i.len() > 1);
    }
}

#[test]
fn non_mutual_second_shell_reaches_further() {
    let data = mdm();

    // with the second shell enabled no point may be lost compared to the
    // mutual run, for either predicate
    for similarity in [Similarity::CommonNeighbors, Similarity::ScaledDensity] {
        let mutual: usize = clustering(similarity, &data, 5.0, 2, 0, true)
            .iter().map(|cluster_i| cluster_i.len()).sum();
        let relaxed: usize = clustering(similarity, &data, 5.0, 2, 0, false)
            .iter().map(|cluster_i| cluster_i.len()).sum();
        assert!(relaxed >= mutual);
    }
}

#[test]
fn random_clumps_stay_separated() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut data: Vec<Vec<f32>> = Vec::new();
    for _ in 0..60 { data.push(vec![rng.gen::<f32>(), rng.gen::<f32>()]); }
    for _ in 0..60 { data.push(vec![rng.gen::<f32>() + 5.0, rng.gen::<f32>() + 5.0]); }

    let clusters = clustering(Similarity::CommonNeighbors, &data, 0.5, 5, 10, true);

    assert!(!clusters.is_empty());
    let clustered: usize = clusters.iter().map(|cluster_i| cluster_i.len()).sum();
    assert!(clustered >= 80, "only {} of 120 points clustered", clustered);
    // no cluster may mix the two squares
    for cluster_i in &clusters {
        let low = cluster_i.iter().filter(|&&point| point < 60).count();
        assert!(low == 0 || low == cluster_i.len());
    }
}

#[test]
fn parameter_validation() {
    let data = shrt();

    assert!(validate_input(&data, 3.5, 2, 2).is_ok());
    assert!(validate_input(&[], 3.5, 2, 2).is_err());
    assert!(validate_input(&[vec![]], 3.5, 2, 2).is_err());
    assert!(validate_input(&data, 0.0, 2, 2).is_err());
    assert!(validate_input(&data, 3.5, 1, 2).is_err());
    assert!(validate_input(&data, 3.5, 2, 0).is_err());
    assert!(validate_input(&data, 3.5, 2, 15).is_err());
}
