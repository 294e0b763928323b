use std::env;
use std::error::Error;
use std::process;
use std::time::Instant;

use clap::Parser;
use log::info;

use mdcluster_clustering::discretize::discretize;
use mdcluster_clustering::mapping::map_onto_clusters;
use mdcluster_clustering::scan::{scan_clustering, scan_schedule};
use mdcluster_clustering::{clustering, refine_hierarchically, validate_input, ClusteringStep, Similarity};
use mdcluster_io::{load_frames, read_clusters, resolve_output, write_clusters, write_dtrajs};

#[derive(Parser, Debug)]
#[clap(name = "mdcluster")]
#[clap(about = "Hierarchical density-based clustering of trajectory frames.", long_about = None)]
struct Args {
    /// cluster the input data once at the given cut and sim
    #[clap(long)]
    clustering: bool,
    /// refine the clustering hierarchically under a shrinking radius
    #[clap(long)]
    hierarchic: bool,
    /// sweep a (cut, sim) schedule until the coverage target is met
    #[clap(long)]
    scan: bool,
    /// map frames left out by slicing onto the produced clusters
    #[clap(long)]
    mapping: bool,
    /// write discretized trajectories for the produced clusters
    #[clap(long)]
    dtrajs: bool,

    /// hyperspherical cutoff radius R
    #[clap(long, default_value_t = f32::MAX)]
    cut: f32,
    /// similarity threshold N (shared neighbors for CNN, density for vs-CNN)
    #[clap(long, default_value_t = 0)]
    sim: usize,
    /// radius step of the scan schedule; negative values grow the radius
    #[clap(long, default_value_t = 0.0, allow_hyphen_values = true)]
    dcut: f32,
    /// similarity step of the scan schedule
    #[clap(long, default_value_t = 0)]
    dsim: usize,
    /// number of scan steps
    #[clap(long, default_value_t = 0)]
    nsteps: usize,
    /// free-energy increment controlling the hierarchical radius decay
    #[clap(long, default_value_t = 0.25)]
    dfe: f32,
    /// minimum cluster size kept; smaller clusters become noise
    #[clap(long, default_value_t = 0)]
    nkeep: i64,
    /// minimum cluster size eligible for hierarchical splitting
    #[clap(long, default_value_t = 0)]
    nsplit: usize,
    /// fraction of frames that stops the scan once clustered
    #[clap(long, default_value_t = 0.0)]
    relmax: f32,
    /// number of trajectories to read
    #[clap(long, default_value_t = usize::MAX)]
    ntrajs: usize,
    /// number of dimensions to read per frame
    #[clap(long, default_value_t = usize::MAX)]
    ndims: usize,
    /// subsampling stride applied to the input frames
    #[clap(long, default_value_t = 1)]
    slice: usize,
    /// use the plain CNN predicate (the default is vs-CNN)
    #[clap(long)]
    cnn: bool,
    /// require both points of a pair to list each other as neighbors;
    /// `--mutual false` additionally walks second-shell neighbors
    #[clap(long, default_value_t = true, action = clap::ArgAction::Set)]
    mutual: bool,
    /// overwrite existing output files instead of writing backups
    #[clap(long)]
    overwrite: bool,

    /// input data file: npy tensor of shape trajectories X frames X dims,
    /// with an optional `-shape` companion listing trajectory lengths
    #[clap(long, default_value = "data.npy")]
    dfile: String,
    /// cluster file written (or reused) by the clustering and scan modes
    #[clap(long, default_value = "clusters.npy")]
    cfile: String,
    /// cluster file written (or reused) by the hierarchic mode
    #[clap(long, default_value = "hclusters.npy")]
    hfile: String,
    /// cluster file written (or reused) by the mapping mode
    #[clap(long, default_value = "mclusters.npy")]
    mfile: String,
    /// discretized trajectory output file
    #[clap(long, default_value = "dtrajs.npy")]
    tfile: String,
}

impl Args {
    fn similarity(&self) -> Similarity {
        if self.cnn { Similarity::CommonNeighbors } else { Similarity::ScaledDensity }
    }
}

/// Prints the per-cluster result table the way every mode reports it.
fn report(title: &str, clusters: &[Vec<usize>], leaves: &[ClusteringStep], total_frames: usize) {
    let all = total_frames as f32;
    let mut total = 0.0f32;
    println!(" {} ", title);
    for (idx, cluster) in clusters.iter().enumerate() {
        let clsize = cluster.len() as f32;
        print!("{}\t{}\t{:.2}%", idx, cluster.len(), 100.0 * clsize / all);
        if let Some(leaf) = leaves.get(idx) {
            print!("\tat step {} with cut {:.4} and sim {}", leaf.step, leaf.cut, leaf.sim);
        }
        println!();
        total += clsize;
    }
    println!("Remaining noise is: {:.2}%\n", 100.0 * (1.0 - total / all));
}

fn run_clustering(args: &Args, clusters: &mut Vec<Vec<usize>>,
                  leaves: &mut Vec<ClusteringStep>) -> Result<(), Box<dyn Error>> {
    let frames = load_frames(&args.dfile, args.ntrajs, args.ndims, args.slice)?;

    match read_clusters(&args.cfile) {
        Ok((cached_clusters, cached_leaves)) => {
            info!("reusing clusters from {}", args.cfile);
            *clusters = cached_clusters;
            *leaves = cached_leaves;
        }
        Err(_) => {
            validate_input(&frames.points, args.cut, args.sim, args.nkeep)?;

            let start = Instant::now();
            *clusters = clustering(args.similarity(), &frames.points, args.cut, args.sim,
                                   args.nkeep as usize, args.mutual);
            info!("{} frames clustered in {:?}", frames.total_frames, start.elapsed());

            *leaves = vec![ClusteringStep::new(0, args.cut, args.sim); clusters.len()];
            write_clusters(&resolve_output(&args.cfile, args.overwrite), clusters, leaves)?;
        }
    }

    report("CLUSTERING RESULTS", clusters, leaves, frames.total_frames);
    Ok(())
}

fn run_hierarchic(args: &Args, clusters: &mut Vec<Vec<usize>>,
                  leaves: &mut Vec<ClusteringStep>) -> Result<(), Box<dyn Error>> {
    let frames = load_frames(&args.dfile, args.ntrajs, args.ndims, args.slice)?;

    match read_clusters(&args.hfile) {
        Ok((cached_clusters, cached_leaves)) => {
            info!("reusing hierarchical clusters from {}", args.hfile);
            *clusters = cached_clusters;
            *leaves = cached_leaves;
        }
        Err(_) => {
            let init_step = ClusteringStep::new(0, args.cut, args.sim);
            *leaves = refine_hierarchically(args.similarity(), clusters, &frames.points,
                                            init_step, args.dfe, frames.ndims,
                                            args.nkeep.max(0) as usize, args.nsplit, args.mutual);
            write_clusters(&resolve_output(&args.hfile, args.overwrite), clusters, leaves)?;
        }
    }

    report("HIERARCHICAL CLUSTERING RESULTS", clusters, leaves, frames.total_frames);
    Ok(())
}

fn run_mapping(args: &Args, clusters: &mut Vec<Vec<usize>>,
               leaves: &mut Vec<ClusteringStep>) -> Result<(), Box<dyn Error>> {
    let full = load_frames(&args.dfile, args.ntrajs, args.ndims, 1)?;

    match read_clusters(&args.mfile) {
        Ok((cached_clusters, cached_leaves)) => {
            info!("reusing mapped clusters from {}", args.mfile);
            *clusters = cached_clusters;
            *leaves = cached_leaves;
        }
        Err(_) => {
            let reduced = load_frames(&args.dfile, args.ntrajs, args.ndims, args.slice)?;
            map_onto_clusters(clusters, &full.points, &reduced.points, &reduced.frame_map, leaves);
            write_clusters(&resolve_output(&args.mfile, args.overwrite), clusters, leaves)?;
        }
    }

    report("MAPPING RESULTS", clusters, leaves, full.total_frames);
    Ok(())
}

fn run_scan(args: &Args, clusters: &mut Vec<Vec<usize>>,
            leaves: &mut Vec<ClusteringStep>) -> Result<(), Box<dyn Error>> {
    let frames = load_frames(&args.dfile, args.ntrajs, args.ndims, args.slice)?;
    validate_input(&frames.points, args.cut, args.sim, args.nkeep)?;

    let plan = scan_schedule(args.nsteps, args.cut, args.dcut, args.sim, args.dsim);
    let (scan_clusters, scan_leaves) = scan_clustering(args.similarity(), &frames.points, &plan,
                                                       args.nkeep as usize, args.relmax, args.mutual);
    *clusters = scan_clusters;
    *leaves = scan_leaves;

    write_clusters(&resolve_output(&args.cfile, args.overwrite), clusters, leaves)?;
    report("SCAN RESULTS", clusters, leaves, frames.total_frames);
    Ok(())
}

fn run_dtrajs(args: &Args, clusters: &[Vec<usize>]) -> Result<(), Box<dyn Error>> {
    // after mapping the clusters live in the unsliced frame space
    let final_slice = if args.mapping { 1 } else { args.slice };
    let frames = load_frames(&args.dfile, args.ntrajs, args.ndims, final_slice)?;

    let dtrajs = discretize(clusters, &frames.shapes);
    write_dtrajs(&resolve_output(&args.tfile, args.overwrite), &dtrajs)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut leaves: Vec<ClusteringStep> = Vec::new();

    if args.scan {
        run_scan(args, &mut clusters, &mut leaves)?;
    }

    if args.clustering || args.hierarchic {
        run_clustering(args, &mut clusters, &mut leaves)?;
        if args.hierarchic {
            run_hierarchic(args, &mut clusters, &mut leaves)?;
        }
        if args.mapping {
            run_mapping(args, &mut clusters, &mut leaves)?;
        }
    }

    if args.dtrajs && (args.clustering || args.hierarchic || args.mapping) {
        run_dtrajs(args, &clusters)?;
    }

    Ok(())
}

pub fn main() {
    if env::var("RUST_LOG").is_err() { env::set_var("RUST_LOG", "info") }
    env_logger::init();

    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("{}", error);
        process::exit(1);
    }
}
