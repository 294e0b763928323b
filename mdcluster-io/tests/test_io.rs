use std::fs;

use mdcluster_clustering::ClusteringStep;
use mdcluster_io::clusters::{read_clusters, write_clusters, write_dtrajs};
use mdcluster_io::dataset::load_frames;
use mdcluster_io::errors::ArrayIoError;
use mdcluster_io::npy::{load_f32, load_integers, save_f32, save_f32_shaped, save_i32, save_u32};
use mdcluster_io::paths::{derived_path, resolve_output};

/// A scratch file name under the system temp directory, unique per test.
fn scratch(name: &str) -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("mdcluster-{}", name));
    path.to_str().unwrap().to_string()
}

#[test]
fn f32_roundtrip() {
    let path = scratch("roundtrip-f32.npy");
    let values = vec![0.5f32, -1.25, 3.0, 42.0];
    save_f32(&path, &values).unwrap();

    let (shape, loaded) = load_f32(&path).unwrap();
    assert_eq!(shape, vec![4]);
    assert_eq!(loaded, values);
    fs::remove_file(&path).unwrap();
}

#[test]
fn integer_roundtrips() {
    let upath = scratch("roundtrip-u32.npy");
    save_u32(&upath, &[1, 2, 3, 500_000]).unwrap();
    let (shape, loaded) = load_integers(&upath).unwrap();
    assert_eq!(shape, vec![4]);
    assert_eq!(loaded, vec![1, 2, 3, 500_000]);
    fs::remove_file(&upath).unwrap();

    let ipath = scratch("roundtrip-i32.npy");
    save_i32(&ipath, &[-1, 0, 7]).unwrap();
    let (_, loaded) = load_integers(&ipath).unwrap();
    assert_eq!(loaded, vec![-1, 0, 7]);
    fs::remove_file(&ipath).unwrap();
}

#[test]
fn header_layout() {
    let path = scratch("header.npy");
    save_f32(&path, &[1.0; 10]).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..6], b"\x93NUMPY");
    assert_eq!((bytes[6], bytes[7]), (1, 0));
    // the payload starts on a 64-byte boundary
    assert_eq!((bytes.len() - 10 * 4) % 64, 0);
    fs::remove_file(&path).unwrap();
}

#[test]
fn wrong_dtype_is_rejected() {
    let path = scratch("wrong-dtype.npy");
    save_u32(&path, &[1, 2, 3]).unwrap();

    match load_f32(&path) {
        Err(ArrayIoError::DtypeMismatch { .. }) => {}
        other => panic!("expected a dtype mismatch, got {:?}", other.map(|_| ())),
    }
    fs::remove_file(&path).unwrap();
}

#[test]
fn garbage_is_rejected() {
    let path = scratch("garbage.npy");
    fs::write(&path, b"not an array at all").unwrap();

    assert!(load_f32(&path).is_err());
    fs::remove_file(&path).unwrap();
}

#[test]
fn derived_paths() {
    assert_eq!(derived_path("clusters.npy", "-shape"), "clusters-shape.npy");
    assert_eq!(derived_path("out/run.2/clusters.npy", "-leaves"), "out/run.2/clusters-leaves.npy");
    assert_eq!(derived_path("clusters", "-shape"), "clusters-shape");
}

#[test]
fn backups_count_upward() {
    let path = scratch("backup.npy");
    let first = scratch("backup.0.npy");

    assert_eq!(resolve_output(&path, false), path);
    save_f32(&path, &[1.0]).unwrap();
    assert_eq!(resolve_output(&path, true), path);
    assert_eq!(resolve_output(&path, false), first);
    save_f32(&first, &[1.0]).unwrap();
    assert_eq!(resolve_output(&path, false), scratch("backup.1.npy"));

    fs::remove_file(&path).unwrap();
    fs::remove_file(&first).unwrap();
}

#[test]
fn cluster_files_roundtrip() {
    let path = scratch("clusters.npy");
    let clusters = vec![vec![1, 2, 3, 5, 8], vec![13, 21, 34], vec![55, 89]];
    let leaves = vec![
        ClusteringStep::new(0, 1.5, 2),
        ClusteringStep::new(1, 1.25, 2),
        ClusteringStep::new(2, 1.0, 3),
    ];
    write_clusters(&path, &clusters, &leaves).unwrap();

    let (read_back, leaves_back) = read_clusters(&path).unwrap();
    assert_eq!(read_back, clusters);
    assert_eq!(leaves_back, leaves);

    for suffix in ["", "-shape", "-leaves", "-leaves-cut", "-leaves-sim"] {
        fs::remove_file(derived_path(&path, suffix)).unwrap();
    }
}

#[test]
fn truncated_cluster_files_are_an_error() {
    let path = scratch("truncated.npy");
    let clusters = vec![vec![1, 2, 3], vec![4, 5]];
    let leaves = vec![ClusteringStep::new(0, 1.0, 2); 2];
    write_clusters(&path, &clusters, &leaves).unwrap();

    // break the shape companion so the files no longer agree
    save_u32(&derived_path(&path, "-shape"), &[3]).unwrap();
    assert!(read_clusters(&path).is_err());

    for suffix in ["", "-shape", "-leaves", "-leaves-cut", "-leaves-sim"] {
        fs::remove_file(derived_path(&path, suffix)).unwrap();
    }
}

#[test]
fn dtraj_files() {
    let path = scratch("dtrajs.npy");
    let dtrajs = vec![vec![0, 0, -1, 1], vec![1, -1]];
    write_dtrajs(&path, &dtrajs).unwrap();

    let (_, labels) = load_integers(&path).unwrap();
    assert_eq!(labels, vec![0, 0, -1, 1, 1, -1]);
    let (_, shapes) = load_integers(&derived_path(&path, "-shape")).unwrap();
    assert_eq!(shapes, vec![4, 2]);

    fs::remove_file(&path).unwrap();
    fs::remove_file(derived_path(&path, "-shape")).unwrap();
}

#[test]
fn frames_from_a_uniform_tensor() {
    let path = scratch("uniform.npy");
    // 2 trajectories X 4 frames X 3 dims
    let flat: Vec<f32> = (0..24).map(|v| v as f32).collect();
    save_f32_shaped(&path, &[2, 4, 3], &flat).unwrap();

    let frames = load_frames(&path, usize::MAX, usize::MAX, 1).unwrap();
    assert_eq!(frames.total_frames, 8);
    assert_eq!(frames.shapes, vec![4, 4]);
    assert_eq!(frames.ndims, 3);
    assert_eq!(frames.points[0], vec![0.0, 1.0, 2.0]);
    assert_eq!(frames.points[7], vec![21.0, 22.0, 23.0]);
    assert_eq!(frames.frame_map[&5], 5);

    // dimension truncation applies per frame
    let narrow = load_frames(&path, usize::MAX, 2, 1).unwrap();
    assert_eq!(narrow.ndims, 2);
    assert_eq!(narrow.points[1], vec![3.0, 4.0]);

    fs::remove_file(&path).unwrap();
}

#[test]
fn frames_from_concatenated_trajectories() {
    let path = scratch("concat.npy");
    // 8 frames of 3 dims, concatenated as one tensor row
    let flat: Vec<f32> = (0..24).map(|v| v as f32).collect();
    save_f32_shaped(&path, &[1, 8, 3], &flat).unwrap();
    save_u32(&derived_path(&path, "-shape"), &[5, 3]).unwrap();

    let frames = load_frames(&path, usize::MAX, usize::MAX, 1).unwrap();
    assert_eq!(frames.total_frames, 8);
    assert_eq!(frames.shapes, vec![5, 3]);
    assert_eq!(frames.points[5], vec![15.0, 16.0, 17.0]);

    // slicing halves each trajectory and keeps the stride mapping
    let sliced = load_frames(&path, usize::MAX, usize::MAX, 2).unwrap();
    assert_eq!(sliced.shapes, vec![2, 1]);
    assert_eq!(sliced.total_frames, 3);
    assert_eq!(sliced.points[0], vec![0.0, 1.0, 2.0]);
    assert_eq!(sliced.points[1], vec![6.0, 7.0, 8.0]);
    assert_eq!(sliced.points[2], vec![15.0, 16.0, 17.0]);
    assert_eq!(sliced.frame_map[&0], 0);
    assert_eq!(sliced.frame_map[&1], 2);
    assert_eq!(sliced.frame_map[&2], 5);

    fs::remove_file(&path).unwrap();
    fs::remove_file(derived_path(&path, "-shape")).unwrap();
}

#[test]
fn missing_input_is_fatal() {
    match load_frames(&scratch("does-not-exist.npy"), usize::MAX, usize::MAX, 1) {
        Err(ArrayIoError::MissingInput { .. }) => {}
        other => panic!("expected a missing-input error, got {:?}", other.map(|_| ())),
    }
}