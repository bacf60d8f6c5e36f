//! Wires the filesystem-backed providers in `mediadup_providers` and the
//! on-disk cache in `mediadup_cache` behind `mediadup_core`'s pure
//! clustering pipeline. This is the only module allowed to block on I/O or
//! spawn threads; everything it calls into is either a trait call through
//! `mediadup_core::provider` or a direct clustering call into
//! `mediadup_core::pipeline`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use mediadup_core::disjoint_set::DisjointSet;
use mediadup_core::pipeline::{run_clustering, ClusterConfig};
use mediadup_core::provider::{
    CacheKey, ComputeFileStats, DiscoverFiles, ExtractFrames, ExtractMetadata, FileInfoCache as FileInfoCacheTrait,
    FrameExtractionConfig,
};
use mediadup_core::similarity::ThresholdConfig;
use mediadup_core::{Cluster, DeduplicationResult, FileInfo};
use mediadup_providers::{Blake3FileStats, ExifMetadataExtractor, FfmpegFrameExtractor, FsDiscoverer};

use super::cli::Cli;
use super::errors::AppError;

/// The hash size every [`FfmpegFrameExtractor`] built here uses. Fixed
/// because the cache's version sidecar pins against it; exposing it on the
/// CLI would invalidate every cache entry whenever it changed.
const HASH_SIZE: usize = 8;

/// A file that was discovered but could not be processed, plus why.
pub struct ErroredFile {
    pub path: PathBuf,
    pub reason: String,
}

/// The full outcome of one run: the clustering result plus any files that
/// failed processing along the way. A non-empty `errored_files` with a
/// non-empty result is a partial success (exit code 3); an empty
/// `errored_files` is a full success (exit code 0).
pub struct RunOutcome {
    pub result: DeduplicationResult,
    pub errored_files: Vec<ErroredFile>,
}

pub fn run(cli: &Cli) -> Result<RunOutcome, AppError> {
    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        // Best-effort: a second handler can't be installed if the process
        // embeds this as a library elsewhere, and that's fine, cancellation
        // just becomes unavailable rather than fatal.
        let _ = ctrlc::set_handler(move || {
            log::warn!(target: "orchestrator", "interrupt received, finishing in-flight files then stopping");
            cancelled.store(true, Ordering::SeqCst);
        });
    }

    let discoverer = FsDiscoverer::new();
    let by_ext = discoverer.discover(&cli.roots, cli.concurrency)?;
    let paths: Vec<PathBuf> = by_ext.into_values().flatten().collect();
    log::info!(target: "orchestrator", "discovered {} files under {} root(s)", paths.len(), cli.roots.len());

    let cache_path = cli
        .cache
        .clone()
        .unwrap_or_else(|| PathBuf::from(".mediadup-cache.bin"));
    let cache_metadata = mediadup_cache::CacheMetadata::current(cli.resolution, HASH_SIZE);
    let cache = mediadup_cache::FileInfoCache::open(cache_path, cache_metadata)?;

    let frame_cfg = FrameExtractionConfig {
        resolution: cli.resolution,
        target_fps: cli.target_fps,
        min_frames: cli.min_frames,
        max_scene_frames: cli.max_scene_frames,
        scene_change_threshold: cli.scene_change_threshold,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cli.concurrency)
        .build()
        .map_err(|e| AppError::Unexpected(format!("failed to start worker pool: {e}")))?;

    let timeout = Duration::from_secs(cli.timeout_secs);
    let (files, errored_files) = pool.install(|| {
        process_all(&paths, &cache, &frame_cfg, cli.max_chunk_size, timeout, &cancelled)
    });

    if let Err(e) = cache.save() {
        log::warn!(target: "orchestrator", "failed to persist cache to disk: {e}");
    }

    log::info!(
        target: "orchestrator",
        "processed {} files successfully, {} errored",
        files.len(),
        errored_files.len()
    );

    let cluster_cfg = ClusterConfig {
        min_pts: 2,
        thresholds: ThresholdConfig {
            image_similarity_threshold: cli.image_similarity_threshold,
            image_video_similarity_threshold: cli.image_video_similarity_threshold,
            video_similarity_threshold: cli.video_similarity_threshold,
        },
        shard_count: 1,
    };

    let result = cluster_windowed(files, cli.window_size, cli.step_size, &cluster_cfg);

    Ok(RunOutcome { result, errored_files })
}

/// Runs [`process_one`] over every discovered path, bounded by the ambient
/// rayon pool's thread count. Stops launching new work once `cancelled` is
/// set, but lets already-started files finish.
fn process_all(
    paths: &[PathBuf],
    cache: &mediadup_cache::FileInfoCache,
    frame_cfg: &FrameExtractionConfig,
    max_chunk_size: usize,
    timeout: Duration,
    cancelled: &Arc<AtomicBool>,
) -> (Vec<FileInfo>, Vec<ErroredFile>) {
    use rayon::prelude::*;

    let stats_provider = Blake3FileStats::new();
    let metadata_provider = ExifMetadataExtractor::new();
    let frames_provider = FfmpegFrameExtractor::with_hash_size(HASH_SIZE);

    let outcomes: Vec<Result<FileInfo, ErroredFile>> = paths
        .par_iter()
        .map(|path| {
            if cancelled.load(Ordering::SeqCst) {
                return Err(ErroredFile {
                    path: path.clone(),
                    reason: "cancelled before processing started".to_string(),
                });
            }
            process_one(
                path,
                cache,
                &stats_provider,
                &metadata_provider,
                &frames_provider,
                frame_cfg,
                max_chunk_size,
                timeout,
            )
            .map_err(|reason| ErroredFile { path: path.clone(), reason })
        })
        .collect();

    let mut files = Vec::with_capacity(outcomes.len());
    let mut errored = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(f) => files.push(f),
            Err(e) => errored.push(e),
        }
    }
    (files, errored)
}

/// Builds a [`FileInfo`] for one file, serving from `cache` when the file's
/// content hash hasn't changed since it was last seen. Runs the whole
/// extraction (stats, metadata, frames) under `timeout` so a single hung
/// `ffmpeg` subprocess can't stall the run indefinitely.
fn process_one(
    path: &PathBuf,
    cache: &mediadup_cache::FileInfoCache,
    stats_provider: &Blake3FileStats,
    metadata_provider: &ExifMetadataExtractor,
    frames_provider: &FfmpegFrameExtractor,
    frame_cfg: &FrameExtractionConfig,
    max_chunk_size: usize,
    timeout: Duration,
) -> Result<FileInfo, String> {
    with_timeout(timeout, || {
        let file_stats = stats_provider
            .compute_file_stats(path, max_chunk_size)
            .map_err(|e| e.to_string())?;

        let cache_key = CacheKey {
            path: path.clone(),
            size: file_stats.size,
            content_hash: file_stats.content_hash.clone(),
        };

        if let Some(cached) = cache.get(&cache_key) {
            return Ok(cached);
        }

        let metadata = metadata_provider.extract_metadata(path).map_err(|e| e.to_string())?;
        let media = frames_provider
            .extract_frames(path, frame_cfg)
            .map_err(|e| e.to_string())?;

        let info = FileInfo {
            path: path.clone(),
            media,
            metadata,
            file_stats,
        };

        cache.put(cache_key, info.clone());
        Ok(info)
    })
}

/// Runs `work` on the calling thread via a helper thread, giving up (but
/// leaving the helper thread to finish in the background) after `timeout`.
/// `ffmpeg`/EXIF extraction have no native deadline of their own, so this is
/// the only place that one gets enforced.
fn with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(work());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(format!("timed out after {}s", timeout.as_secs())),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err("worker thread panicked".to_string()),
    }
}

/// Clusters `files` a window at a time when there are more of them than
/// `window_size`, so memory stays bounded by one window's VP-tree rather
/// than the whole library's. Successive windows overlap by
/// `window_size - step_size` files so a duplicate pair split across a
/// window boundary still gets seen together at least once; the per-window
/// results are then merged by shared membership and representatives are
/// reselected over each merged cluster's full file set.
fn cluster_windowed(
    files: Vec<FileInfo>,
    window_size: usize,
    step_size: usize,
    cfg: &ClusterConfig,
) -> DeduplicationResult {
    if files.len() <= window_size {
        return run_clustering(files, cfg);
    }

    let files_by_path: BTreeMap<PathBuf, FileInfo> =
        files.iter().map(|f| (f.path.clone(), f.clone())).collect();

    let mut window_results = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + window_size).min(files.len());
        let window: Vec<FileInfo> = files[start..end].to_vec();
        window_results.push(run_clustering(window, cfg));

        if end == files.len() {
            break;
        }
        start += step_size;
    }

    merge_window_results(window_results, &files_by_path, &cfg.thresholds)
}

/// Merges clustering results from independently-processed, overlapping
/// windows: any two clusters sharing a file path are unioned, then
/// representatives are reselected over each merged component's full
/// membership (a file admitted as a video's companion still in one window
/// might not be the best choice once the rest of its duplicates, seen only
/// in another window, are accounted for).
fn merge_window_results(
    window_results: Vec<DeduplicationResult>,
    files_by_path: &BTreeMap<PathBuf, FileInfo>,
    thresholds: &ThresholdConfig,
) -> DeduplicationResult {
    let mut merger: DisjointSet<PathBuf> = DisjointSet::default();
    let mut all_paths: std::collections::BTreeSet<PathBuf> = std::collections::BTreeSet::new();

    for window_result in &window_results {
        all_paths.extend(window_result.unique_files.iter().cloned());

        for cluster in &window_result.duplicate_sets {
            let members: Vec<PathBuf> = cluster
                .representatives
                .iter()
                .chain(cluster.duplicates.iter())
                .cloned()
                .collect();
            all_paths.extend(members.iter().cloned());

            if let Some((first, rest)) = members.split_first() {
                for other in rest {
                    merger.insert(first.clone(), other.clone());
                }
            }
        }
    }

    let merged_components: Vec<Vec<PathBuf>> = merger.all_sets().map(|s| s.cloned().collect()).collect();
    let in_merged: std::collections::BTreeSet<PathBuf> = merged_components.iter().flatten().cloned().collect();

    let mut duplicate_sets: Vec<Cluster> = Vec::new();
    for component in merged_components {
        let members: Vec<FileInfo> = component
            .iter()
            .filter_map(|p| files_by_path.get(p).cloned())
            .collect();
        if members.len() > 1 {
            duplicate_sets.push(mediadup_core::selector::select_representatives(&members, thresholds));
        }
    }

    let unique_files = all_paths.into_iter().filter(|p| !in_merged.contains(p)).collect();

    let mut result = DeduplicationResult { unique_files, duplicate_sets };
    result.sort();
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use mediadup_core::{FileStats, FrameInfo, MediaInfo, Metadata};

    fn file(path: &str, hash: u8) -> FileInfo {
        FileInfo {
            path: PathBuf::from(path),
            media: MediaInfo::new(vec![FrameInfo::new(vec![hash; 8], 0.0)], 0.0),
            metadata: Metadata::default(),
            file_stats: FileStats {
                content_hash: "x".into(),
                size: 100,
                created_at: None,
                modified_at: None,
            },
        }
    }

    #[test]
    fn test_cluster_windowed_below_window_size_matches_direct_clustering() {
        let files = vec![file("a.jpg", 0x00), file("b.jpg", 0x00), file("c.jpg", 0xFF)];
        let cfg = ClusterConfig::default();
        let direct = run_clustering(files.clone(), &cfg);
        let windowed = cluster_windowed(files, 10, 5, &cfg);
        assert_eq!(direct, windowed);
    }

    #[test]
    fn test_cluster_windowed_merges_pair_split_across_windows() {
        // 4 identical files; window_size=2, step_size=1 means windows are
        // [0,1], [1,2], [2,3] - every adjacent pair is seen together at
        // least once, so the merge should unify all four into one cluster.
        let files = vec![
            file("a.jpg", 0x00),
            file("b.jpg", 0x00),
            file("c.jpg", 0x00),
            file("d.jpg", 0x00),
        ];
        let cfg = ClusterConfig::default();
        let result = cluster_windowed(files, 2, 1, &cfg);
        assert_eq!(result.duplicate_sets.len(), 1);
        assert_eq!(result.duplicate_sets[0].len(), 4);
    }
}
