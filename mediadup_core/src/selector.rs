//! Representative selection: picks the best file per cluster and, when a
//! video wins, admits additional still captures that aren't already
//! redundant with each other.

use std::path::PathBuf;

use crate::model::{Cluster, FileInfo};
use crate::similarity::{image_similarity, ThresholdConfig};

/// Selects representatives for one cluster of files. `members` must all
/// belong to the same cluster and `members.len() >= 1`.
pub fn select_representatives(members: &[FileInfo], cfg: &ThresholdConfig) -> Cluster {
    let mut sorted: Vec<&FileInfo> = members.iter().collect();
    sorted.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap());

    let best = sorted[0];

    if !best.media.is_video() {
        let duplicates = sorted[1..].iter().map(|f| f.path.clone()).collect();
        return Cluster {
            best_file: best.path.clone(),
            representatives: vec![best.path.clone()],
            duplicates,
        };
    }

    let video_area = u64::from(best.metadata.width) * u64::from(best.metadata.height);
    let video_has_date = best.metadata.image_date.is_some();

    let mut admitted: Vec<&FileInfo> = Vec::new();
    let mut others: Vec<&FileInfo> = Vec::new();

    for candidate in &sorted[1..] {
        let is_still = !candidate.media.is_video();
        let area = u64::from(candidate.metadata.width) * u64::from(candidate.metadata.height);
        let meets_date = !video_has_date || candidate.metadata.image_date.is_some();
        let has_frame = candidate.media.frames.first().is_some();

        if is_still && area >= video_area && meets_date && has_frame {
            let too_similar = admitted.iter().any(|adm| {
                let (Some(a), Some(b)) = (adm.media.frames.first(), candidate.media.frames.first())
                else {
                    return false;
                };
                image_similarity(a, b) >= cfg.image_similarity_threshold
            });
            if !too_similar {
                admitted.push(candidate);
                continue;
            }
        }
        others.push(candidate);
    }

    let mut representatives: Vec<PathBuf> = vec![best.path.clone()];
    representatives.extend(admitted.iter().map(|f| f.path.clone()));

    let duplicates = others.iter().map(|f| f.path.clone()).collect();

    Cluster {
        best_file: best.path.clone(),
        representatives,
        duplicates,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{FileStats, FrameInfo, MediaInfo, Metadata};

    fn file(path: &str, score_bump_duration: f64, w: u32, h: u32, hash: u8) -> FileInfo {
        FileInfo {
            path: PathBuf::from(path),
            media: MediaInfo::new(vec![FrameInfo::new(vec![hash], 0.0)], score_bump_duration),
            metadata: Metadata {
                width: w,
                height: h,
                ..Default::default()
            },
            file_stats: FileStats {
                content_hash: "x".into(),
                size: 1000,
                created_at: None,
                modified_at: None,
            },
        }
    }

    #[test]
    fn test_image_wins_over_smaller_duplicate() {
        let big = file("big.jpg", 0.0, 1920, 1080, 0x00);
        let small = file("small.jpg", 0.0, 960, 540, 0x00);
        let cluster = select_representatives(&[small, big], &ThresholdConfig::default());
        assert_eq!(cluster.best_file, PathBuf::from("big.jpg"));
        assert_eq!(cluster.representatives, vec![PathBuf::from("big.jpg")]);
        assert_eq!(cluster.duplicates.len(), 1);
    }

    #[test]
    fn test_video_wins_and_admits_distinct_still() {
        let video = file("vid.mp4", 30.0, 1920, 1080, 0x00);
        let still_similar = file("still1.jpg", 0.0, 1920, 1080, 0x00); // identical hash to video's single frame
        let still_distinct = file("still2.jpg", 0.0, 1920, 1080, 0xFF); // maximally different hash

        let cluster = select_representatives(
            &[video, still_similar, still_distinct],
            &ThresholdConfig::default(),
        );
        assert_eq!(cluster.best_file, PathBuf::from("vid.mp4"));
        assert!(cluster.representatives.contains(&PathBuf::from("vid.mp4")));
        assert!(cluster.representatives.contains(&PathBuf::from("still2.jpg")));
        assert!(cluster.duplicates.contains(&PathBuf::from("still1.jpg")));
    }
}
