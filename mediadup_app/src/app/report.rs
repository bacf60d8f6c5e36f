//! Renders a [`RunOutcome`] to stdout and to the files named by
//! `--error`/`--duplicate`/`--debug`, and performs the file moves requested
//! by `--move`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use mediadup_core::{Cluster, DeduplicationResult};

use super::cli::{Cli, OutputFormat};
use super::errors::AppError;
use super::orchestrator::{ErroredFile, RunOutcome};

#[derive(Serialize)]
struct DebugDump<'a> {
    unique_files: &'a std::collections::BTreeSet<PathBuf>,
    duplicate_sets: &'a [Cluster],
    errored_files: Vec<DebugErroredFile<'a>>,
}

#[derive(Serialize)]
struct DebugErroredFile<'a> {
    path: &'a Path,
    reason: &'a str,
}

/// Writes every requested report, prints the stdout summary, and returns
/// whether the run should be considered a full success (no errored files)
/// or a partial one.
pub fn emit(cli: &Cli, outcome: &RunOutcome) -> Result<(), AppError> {
    print_summary(&outcome.result, &outcome.errored_files);

    if let Some(path) = &cli.error {
        write_error_report(path, &outcome.errored_files, cli.format)?;
    }

    if let Some(path) = &cli.duplicate {
        if cli.r#move {
            move_duplicates(path, &outcome.result)?;
        } else {
            write_duplicate_report(path, &outcome.result, cli.format)?;
        }
    }

    if let Some(path) = &cli.debug {
        write_debug_dump(path, outcome)?;
    }

    Ok(())
}

fn print_summary(result: &DeduplicationResult, errored: &[ErroredFile]) {
    println!(
        "{} unique file(s), {} duplicate cluster(s), {} error(s)",
        result.unique_files.len(),
        result.duplicate_sets.len(),
        errored.len()
    );
    for cluster in &result.duplicate_sets {
        println!("  cluster ({} files), best: {}", cluster.len(), cluster.best_file.display());
    }
}

fn write_error_report(path: &Path, errored: &[ErroredFile], format: OutputFormat) -> Result<(), AppError> {
    let contents = match format {
        OutputFormat::Json => {
            let entries: Vec<DebugErroredFile> = errored
                .iter()
                .map(|e| DebugErroredFile { path: &e.path, reason: &e.reason })
                .collect();
            serde_json::to_string_pretty(&entries)
                .map_err(|e| AppError::Unexpected(format!("failed to serialize error report: {e}")))?
        }
        OutputFormat::Text => errored
            .iter()
            .map(|e| format!("{}\t{}", e.path.display(), e.reason))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    fs::write(path, contents).map_err(AppError::from)
}

fn write_duplicate_report(path: &Path, result: &DeduplicationResult, format: OutputFormat) -> Result<(), AppError> {
    let contents = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&result.duplicate_sets)
            .map_err(|e| AppError::Unexpected(format!("failed to serialize duplicate report: {e}")))?,
        OutputFormat::Text => result
            .duplicate_sets
            .iter()
            .map(format_cluster_text)
            .collect::<Vec<_>>()
            .join("\n\n"),
    };
    fs::write(path, contents).map_err(AppError::from)
}

fn format_cluster_text(cluster: &Cluster) -> String {
    let mut lines = vec![format!("best: {}", cluster.best_file.display())];
    for rep in &cluster.representatives {
        if rep != &cluster.best_file {
            lines.push(format!("also kept: {}", rep.display()));
        }
    }
    for dup in &cluster.duplicates {
        lines.push(format!("duplicate: {}", dup.display()));
    }
    lines.join("\n")
}

fn write_debug_dump(path: &Path, outcome: &RunOutcome) -> Result<(), AppError> {
    let dump = DebugDump {
        unique_files: &outcome.result.unique_files,
        duplicate_sets: &outcome.result.duplicate_sets,
        errored_files: outcome
            .errored_files
            .iter()
            .map(|e| DebugErroredFile { path: &e.path, reason: &e.reason })
            .collect(),
    };
    let contents = serde_json::to_string_pretty(&dump)
        .map_err(|e| AppError::Unexpected(format!("failed to serialize debug dump: {e}")))?;
    fs::write(path, contents).map_err(AppError::from)
}

/// Physically moves every duplicate (non-representative) file in every
/// cluster into `dest_dir`, preserving the file name and disambiguating on
/// collision. Representatives are left in place.
fn move_duplicates(dest_dir: &Path, result: &DeduplicationResult) -> Result<(), AppError> {
    fs::create_dir_all(dest_dir).map_err(AppError::from)?;

    for cluster in &result.duplicate_sets {
        for dup in &cluster.duplicates {
            let dest = unique_destination(dest_dir, dup);
            if let Err(e) = fs::rename(dup, &dest) {
                log::warn!(
                    target: "report",
                    "failed to move duplicate {} to {}: {e}",
                    dup.display(),
                    dest.display()
                );
            }
        }
    }

    Ok(())
}

fn unique_destination(dest_dir: &Path, src: &Path) -> PathBuf {
    let file_name = src.file_name().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("file"));
    let mut candidate = dest_dir.join(&file_name);
    let mut n = 1u32;
    while candidate.exists() {
        let stem = file_name.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
        let ext = file_name.extension().and_then(|e| e.to_str());
        let renamed = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        candidate = dest_dir.join(renamed);
        n += 1;
    }
    candidate
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unique_destination_disambiguates_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        let dest = unique_destination(dir.path(), Path::new("/elsewhere/a.jpg"));
        assert_eq!(dest, dir.path().join("a_1.jpg"));
    }

    #[test]
    fn test_format_cluster_text_lists_best_and_duplicates() {
        let cluster = Cluster {
            best_file: PathBuf::from("best.jpg"),
            representatives: vec![PathBuf::from("best.jpg")],
            duplicates: [PathBuf::from("dup.jpg")].into_iter().collect(),
        };
        let text = format_cluster_text(&cluster);
        assert!(text.contains("best: best.jpg"));
        assert!(text.contains("duplicate: dup.jpg"));
    }
}
