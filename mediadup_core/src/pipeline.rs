//! The pure clustering/selection sequencing shared by every caller: given a
//! set of already-built [`FileInfo`] records, build the VP-tree, run
//! DBSCAN with adaptive per-pair epsilon, select representatives per
//! cluster, and assemble the final result. File discovery, artifact
//! extraction and caching are I/O-bound and live one layer up, in the
//! orchestrator proper (`mediadup_app`), which is the only place allowed to
//! block.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::dbscan::{cluster, merge_shard_clusters, DbscanResult};
#[cfg(feature = "parallel")]
use crate::dbscan::cluster_sharded;
use crate::model::{Cluster, DeduplicationResult, FileInfo};
use crate::selector::select_representatives;
use crate::similarity::{adaptive_threshold, media_similarity, ThresholdConfig};
use crate::vptree::VpTree;

#[derive(Clone, Copy, Debug)]
pub struct ClusterConfig {
    pub min_pts: usize,
    pub thresholds: ThresholdConfig,
    pub shard_count: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_pts: 2,
            thresholds: ThresholdConfig::default(),
            shard_count: 1,
        }
    }
}

fn min_threshold(cfg: &ThresholdConfig) -> f64 {
    cfg.image_similarity_threshold
        .min(cfg.image_video_similarity_threshold)
        .min(cfg.video_similarity_threshold)
}

/// Builds a VP-tree over `files` (distance = 1 - media_similarity), runs
/// DBSCAN with the adaptive per-pair threshold, selects representatives
/// per resulting cluster, and assembles the [`DeduplicationResult`].
pub fn run_clustering(files: Vec<FileInfo>, cfg: &ClusterConfig) -> DeduplicationResult {
    if files.is_empty() {
        return DeduplicationResult::default();
    }

    let indices: Vec<usize> = (0..files.len()).collect();
    let distance = |a: &usize, b: &usize| 1.0 - media_similarity(&files[*a].media, &files[*b].media);
    let tree = VpTree::build(indices.clone(), distance);

    let eps = 1.0 - min_threshold(&cfg.thresholds);

    let neighbors = |p: &usize| -> Result<Vec<usize>, String> {
        let candidates = tree.neighbors_within(p, eps);
        Ok(candidates
            .into_iter()
            .filter(|q| q != p)
            .filter(|q| {
                let threshold = adaptive_threshold(&files[*p].media, &files[*q].media, &cfg.thresholds);
                media_similarity(&files[*p].media, &files[*q].media) >= threshold
            })
            .collect())
    };

    #[cfg(feature = "parallel")]
    let DbscanResult { clusters: idx_clusters, noise: idx_noise } = if cfg.shard_count > 1 {
        cluster_sharded(&indices, cfg.min_pts, neighbors, cfg.shard_count)
    } else {
        cluster(&indices, cfg.min_pts, neighbors)
    };

    #[cfg(not(feature = "parallel"))]
    let DbscanResult { clusters: idx_clusters, noise: idx_noise } = cluster(&indices, cfg.min_pts, neighbors);

    // DBSCAN's per-seed expansion can produce overlapping clusters when a
    // border point is reachable from more than one seed; merge those before
    // selection so every file ends up in exactly one cluster.
    let merged_clusters = merge_shard_clusters(idx_clusters);

    let mut duplicate_sets: Vec<Cluster> = Vec::new();
    let mut in_any_cluster: BTreeSet<PathBuf> = BTreeSet::new();

    for idx_cluster in merged_clusters {
        let members: Vec<FileInfo> = idx_cluster.iter().map(|&i| files[i].clone()).collect();
        for m in &members {
            in_any_cluster.insert(m.path.clone());
        }
        let cluster = select_representatives(&members, &cfg.thresholds);
        duplicate_sets.push(cluster);
    }

    let mut unique_files: BTreeSet<PathBuf> = idx_noise
        .into_iter()
        .map(|i| files[i].path.clone())
        .filter(|p| !in_any_cluster.contains(p))
        .collect();

    // Defensive: any file neither clustered nor marked noise (shouldn't
    // happen, but the partition invariant in the spec's property tests is
    // load-bearing) falls back to unique.
    for f in &files {
        if !in_any_cluster.contains(&f.path) {
            unique_files.insert(f.path.clone());
        }
    }

    let mut result = DeduplicationResult {
        unique_files,
        duplicate_sets,
    };
    result.sort();
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{FileStats, FrameInfo, MediaInfo, Metadata};

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
    fn test_unrelated_files_are_all_unique() {
        let files = vec![file("a.jpg", 0x00), file("b.jpg", 0xFF), file("c.jpg", 0x0F)];
        let result = run_clustering(files, &ClusterConfig::default());
        assert_eq!(result.unique_files.len(), 3);
        assert!(result.duplicate_sets.is_empty());
    }

    #[test]
    fn test_identical_files_form_one_cluster() {
        let files = vec![file("a.jpg", 0x00), file("b.jpg", 0x00)];
        let result = run_clustering(files, &ClusterConfig::default());
        assert_eq!(result.duplicate_sets.len(), 1);
        assert!(result.unique_files.is_empty());
        assert_eq!(result.duplicate_sets[0].len(), 2);
    }

    #[test]
    fn test_partition_invariant() {
        let files = vec![
            file("a.jpg", 0x00),
            file("b.jpg", 0x00),
            file("c.jpg", 0xFF),
        ];
        let total = files.len();
        let result = run_clustering(files, &ClusterConfig::default());
        let covered: usize =
            result.unique_files.len() + result.duplicate_sets.iter().map(Cluster::len).sum::<usize>();
        assert_eq!(covered, total);
    }
}
