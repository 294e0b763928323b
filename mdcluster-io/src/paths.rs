//! Naming conventions for output files.

use crate::dataset::file_exists;

/// Inserts a suffix before the file extension:
/// `clusters.npy` + `-shape` gives `clusters-shape.npy`.
///
/// # Examples
/// ```rust
/// use mdcluster_io::paths::derived_path;
/// assert_eq!(derived_path("out/clusters.npy", "-leaves"), "out/clusters-leaves.npy");
/// assert_eq!(derived_path("clusters", "-shape"), "clusters-shape");
/// ```
pub fn derived_path(path: &str, suffix: &str) -> String {
    match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => {
            format!("{}{}{}", &path[..dot], suffix, &path[dot..])
        }
        _ => format!("{}{}", path, suffix),
    }
}

/// Resolves where an output file may actually be written.
///
/// With `overwrite` set the path is returned as-is. Otherwise, if the path
/// is already taken, an ascending integer is inserted before the extension
/// until a free name is found: `clusters.npy`, `clusters.0.npy`,
/// `clusters.1.npy`, ...
pub fn resolve_output(path: &str, overwrite: bool) -> String {
    if overwrite || !file_exists(path) {
        return path.to_string();
    }

    let (stem, ext) = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => (&path[..dot], &path[dot..]),
        _ => (path, ""),
    };
    let mut i = 0;
    loop {
        let candidate = format!("{}.{}{}", stem, i, ext);
        if !file_exists(&candidate) { return candidate; }
        i += 1;
    }
}
