//! Merge walls in level files: a single file or every level in a directory

use crate::level::{load_level, save_level};
use crate::merge::{merge_walls, MergeReport};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `<stem><suffix>.json` next to `input`
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("level");
    input.with_file_name(format!("{stem}{suffix}.json"))
}

/// Load `input`, merge its walls and write the result to `output`
pub fn optimize_file(input: &Path, output: &Path) -> Result<MergeReport> {
    tracing::info!("Loading {}", input.display());
    let mut level = load_level(input)?;
    let objects = level
        .objects()
        .with_context(|| format!("Reading objects of {}", input.display()))?;
    tracing::info!("Original object count: {}", objects.len());

    let (merged, report) = merge_walls(&objects)
        .with_context(|| format!("Merging walls in {}", input.display()))?;
    tracing::info!(
        "Merged {} walls into {} walls",
        report.walls_before,
        report.walls_after
    );
    tracing::info!("Reduction: {} fewer objects", report.reduction());
    tracing::info!("New object count: {}", merged.len());

    level.set_objects(merged);
    save_level(&level, output)?;
    tracing::info!("Saved optimized level to {}", output.display());
    Ok(report)
}

/// Level files under `dir`, skipping earlier outputs that carry `suffix`
pub fn find_level_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
        .filter(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map_or(false, |stem| !stem.ends_with(suffix))
        })
        .collect();
    files.sort();
    files
}

/// Totals for a directory run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: Vec<PathBuf>,
    pub walls_before: usize,
    pub walls_after: usize,
}

/// Merge every level file under `dir` in parallel.
///
/// A file that fails is logged and listed in the summary; the other files
/// are still written.
pub fn optimize_dir(dir: &Path, suffix: &str) -> Result<BatchSummary> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let files = find_level_files(dir, suffix);
    tracing::info!("Merging walls in {} level files (parallel)", files.len());

    let results: Vec<(PathBuf, Result<MergeReport>)> = files
        .par_iter()
        .map(|input| {
            let output = default_output_path(input, suffix);
            (input.clone(), optimize_file(input, &output))
        })
        .collect();

    let mut summary = BatchSummary {
        files: results.len(),
        ..Default::default()
    };
    for (path, result) in results {
        match result {
            Ok(report) => {
                summary.walls_before += report.walls_before;
                summary.walls_after += report.walls_after;
            }
            Err(e) => {
                tracing::error!("Failed {}: {:#}", path.display(), e);
                summary.failed.push(path);
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("src/assets/level (13).json"), "_optimized"),
            PathBuf::from("src/assets/level (13)_optimized.json")
        );
        assert_eq!(
            default_output_path(Path::new("level.json"), "_merged"),
            PathBuf::from("level_merged.json")
        );
    }
}
