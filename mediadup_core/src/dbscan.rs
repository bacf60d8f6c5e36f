//! Density-based clustering over a neighbor oracle (typically backed by a
//! [`crate::vptree::VpTree`]), with adaptive per-pair epsilon and parallel
//! shard processing merged via [`crate::disjoint_set::DisjointSet`].

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::disjoint_set::DisjointSet;

/// Result of one clustering pass: a list of clusters (each a set of point
/// identifiers) and the set of points left as noise.
pub struct DbscanResult<T> {
    pub clusters: Vec<Vec<T>>,
    pub noise: Vec<T>,
}

/// Runs DBSCAN over `points`, using `neighbors(p)` as the neighbor oracle
/// (expected to already apply both the VP-tree's radius query and the
/// pair-specific adaptive threshold filtering). `min_pts` is the minimum
/// neighborhood size (including the point itself is not required by the
/// oracle's contract) for a point to seed cluster expansion.
///
/// Errors from the neighbor oracle downgrade that point to noise rather
/// than aborting the whole run.
pub fn cluster<T, F>(points: &[T], min_pts: usize, neighbors: F) -> DbscanResult<T>
where
    T: Clone + Eq + Hash,
    F: Fn(&T) -> Result<Vec<T>, String>,
{
    let mut visited: HashSet<T> = HashSet::new();
    let mut clustered: HashSet<T> = HashSet::new();
    let mut clusters: Vec<Vec<T>> = Vec::new();

    for p in points {
        if visited.contains(p) {
            continue;
        }

        let p_neighbors = match neighbors(p) {
            Ok(n) => n,
            Err(e) => {
                log::warn!(target: "dbscan", "neighbor fetch failed for a point, treating as noise: {e}");
                visited.insert(p.clone());
                continue;
            }
        };

        if p_neighbors.len() < min_pts.saturating_sub(1) {
            visited.insert(p.clone());
            continue;
        }

        // Expand a new cluster from `p`.
        let mut cluster_members: Vec<T> = vec![p.clone()];
        visited.insert(p.clone());
        clustered.insert(p.clone());

        let mut queue: VecDeque<T> = p_neighbors.into_iter().collect();
        let mut enqueued: HashSet<T> = queue.iter().cloned().collect();
        enqueued.insert(p.clone());

        while let Some(q) = queue.pop_front() {
            let first_visit = visited.insert(q.clone());

            if !clustered.contains(&q) {
                cluster_members.push(q.clone());
                clustered.insert(q.clone());
            }

            if !first_visit {
                continue;
            }

            match neighbors(&q) {
                Ok(q_neighbors) => {
                    if q_neighbors.len() >= min_pts {
                        for n in q_neighbors {
                            if enqueued.insert(n.clone()) {
                                queue.push_back(n);
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!(target: "dbscan", "neighbor fetch failed mid-expansion, point kept as border only: {e}");
                }
            }
        }

        clusters.push(cluster_members);
    }

    let noise = points
        .iter()
        .filter(|p| !clustered.contains(p))
        .cloned()
        .collect();

    DbscanResult { clusters, noise }
}

/// Merges clusters produced independently by parallel shards: any two
/// clusters sharing an element are unioned. Returns the connected
/// components under the "shares an element" relation.
pub fn merge_shard_clusters<T>(shard_clusters: Vec<Vec<T>>) -> Vec<Vec<T>>
where
    T: Clone + Ord + Eq + Hash,
{
    let mut merger: DisjointSet<T> = DisjointSet::default();
    let mut singletons: Vec<T> = Vec::new();

    for cluster in shard_clusters {
        if cluster.len() == 1 {
            singletons.push(cluster[0].clone());
            continue;
        }
        let first = cluster[0].clone();
        for other in &cluster[1..] {
            merger.insert(first.clone(), other.clone());
        }
    }

    let mut merged: Vec<Vec<T>> = merger.all_sets().map(|s| s.cloned().collect()).collect();

    let in_merged: HashSet<T> = merged.iter().flatten().cloned().collect();
    for s in singletons {
        if !in_merged.contains(&s) {
            merged.push(vec![s]);
        }
    }

    merged
}

#[cfg(feature = "parallel")]
pub fn cluster_sharded<T, F>(points: &[T], min_pts: usize, neighbors: F, shard_count: usize) -> DbscanResult<T>
where
    T: Clone + Ord + Eq + Hash + Send + Sync,
    F: Fn(&T) -> Result<Vec<T>, String> + Sync,
{
    use rayon::prelude::*;

    if shard_count <= 1 || points.len() < shard_count {
        return cluster(points, min_pts, neighbors);
    }

    let chunk_size = points.len().div_ceil(shard_count);
    let shard_results: Vec<DbscanResult<T>> = points
        .par_chunks(chunk_size)
        .map(|chunk| cluster(chunk, min_pts, &neighbors))
        .collect();

    let mut all_clusters = Vec::new();
    let mut all_noise = Vec::new();
    for r in shard_results {
        all_clusters.extend(r.clusters);
        all_noise.extend(r.noise);
    }

    let merged = merge_shard_clusters(all_clusters);
    let merged_members: HashSet<T> = merged.iter().flatten().cloned().collect();
    all_noise.retain(|p| !merged_members.contains(p));

    DbscanResult {
        clusters: merged,
        noise: all_noise,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_two_tight_clusters_and_noise() {
        // points 0..=3 are mutually close, 10..=13 are mutually close, 100 is isolated.
        let points: Vec<i32> = vec![0, 1, 2, 3, 10, 11, 12, 13, 100];
        let neighbors = |p: &i32| -> Result<Vec<i32>, String> {
            Ok(points
                .iter()
                .copied()
                .filter(|q| q != p && (q - p).abs() <= 3)
                .collect())
        };

        let result = cluster(&points, 3, neighbors);
        assert_eq!(result.clusters.len(), 2);
        assert_eq!(result.noise, vec![100]);
        for c in &result.clusters {
            assert!(c.len() >= 4);
        }
    }

    #[test]
    fn test_min_pts_of_two_clusters_pairs() {
        let points: Vec<i32> = vec![0, 1, 50, 51];
        let neighbors = |p: &i32| -> Result<Vec<i32>, String> {
            Ok(points
                .iter()
                .copied()
                .filter(|q| q != p && (q - p).abs() <= 2)
                .collect())
        };
        let result = cluster(&points, 2, neighbors);
        assert_eq!(result.clusters.len(), 2);
        assert!(result.noise.is_empty());
    }

    #[test]
    fn test_neighbor_errors_become_noise() {
        let points: Vec<i32> = vec![1, 2, 3];
        let neighbors = |p: &i32| -> Result<Vec<i32>, String> {
            if *p == 2 {
                Err("boom".to_string())
            } else {
                Ok(vec![])
            }
        };
        let result = cluster(&points, 2, neighbors);
        assert!(result.clusters.is_empty());
        assert_eq!(result.noise.len(), 3);
    }

    #[test]
    fn test_merge_shard_clusters_unions_shared_elements() {
        let shard_a = vec![vec![1, 2, 3]];
        let shard_b = vec![vec![3, 4, 5]];
        let merged = merge_shard_clusters(vec![shard_a[0].clone(), shard_b[0].clone()]);
        assert_eq!(merged.len(), 1);
        let mut flat = merged[0].clone();
        flat.sort();
        assert_eq!(flat, vec![1, 2, 3, 4, 5]);
    }
}
