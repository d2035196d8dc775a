//! Recursive workspace file enumeration, honoring a set of glob exclude
//! patterns from `AnalyzerConfig`.
//!
//! A `walkdir`-based recursive scan, parallelizing per-file work with
//! `rayon` once the candidate list is known.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

const CONFIG_FILE_NAME: &str = "nextflow.config";

/// Enumerates every `.nf` script and `nextflow.config`/`*.config` file
/// under `root`, skipping anything matched by `excludes` (glob patterns,
/// matched against the path relative to `root`).
pub fn scan(root: &Path, excludes: &[String]) -> Vec<PathBuf> {
    let patterns: Vec<glob::Pattern> = excludes.iter().filter_map(|p| glob::Pattern::new(p).ok()).collect();

    let candidates: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| is_analyzable(path))
        .collect();

    candidates
        .into_par_iter()
        .filter(|path| {
            let rel = path.strip_prefix(root).unwrap_or(path);
            !patterns.iter().any(|pattern| pattern.matches_path(rel))
        })
        .collect()
}

fn is_analyzable(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if name == CONFIG_FILE_NAME || name.ends_with(".config") => true,
        _ => path.extension().and_then(|e| e.to_str()) == Some("nf"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_scripts_and_configs_but_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.nf"), "workflow {}").unwrap();
        fs::write(dir.path().join("nextflow.config"), "docker.enabled = true").unwrap();
        fs::create_dir(dir.path().join("work")).unwrap();
        fs::write(dir.path().join("work").join("scratch.nf"), "workflow {}").unwrap();
        fs::write(dir.path().join("README.md"), "not analyzed").unwrap();

        let found = scan(dir.path(), &["work/**".to_string()]);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert!(names.contains(&"main.nf".to_string()));
        assert!(names.contains(&"nextflow.config".to_string()));
        assert!(!names.contains(&"scratch.nf".to_string()));
        assert!(!names.contains(&"README.md".to_string()));
    }
}
