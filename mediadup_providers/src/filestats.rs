//! Content-addressed [`FileStats`] computation: a chunked BLAKE3 hash of the
//! file's bytes plus size and filesystem timestamps, backing
//! [`mediadup_core::provider::ComputeFileStats`].

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use mediadup_core::provider::ComputeFileStats;
use mediadup_core::error::Error;
use mediadup_core::{FileStats, Result};

#[derive(Default)]
pub struct Blake3FileStats;

impl Blake3FileStats {
    pub fn new() -> Self {
        Self
    }
}

fn to_unix_secs(t: SystemTime) -> Option<i64> {
    t.duration_since(SystemTime::UNIX_EPOCH).ok().map(|d| d.as_secs() as i64)
}

impl ComputeFileStats for Blake3FileStats {
    fn compute_file_stats(&self, path: &Path, max_chunk_size: usize) -> Result<FileStats> {
        if max_chunk_size == 0 {
            return Err(Error::validation(
                "ComputeFileStats::compute_file_stats",
                "max_chunk_size must be > 0",
            ));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| Error::file_system("compute_file_stats", format!("{}: {e}", path.display())))?;

        let mut file = File::open(path)
            .map_err(|e| Error::file_system("compute_file_stats", format!("{}: {e}", path.display())))?;

        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; max_chunk_size];
        loop {
            let read = file
                .read(&mut buf)
                .map_err(|e| Error::file_system("compute_file_stats", format!("{}: {e}", path.display())))?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }

        Ok(FileStats {
            content_hash: hasher.finalize().to_hex().to_string(),
            size: metadata.len(),
            created_at: metadata.created().ok().and_then(to_unix_secs),
            modified_at: metadata.modified().ok().and_then(to_unix_secs),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    fn write_tmp(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("mediadup_filestats_test_{}_{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_hash_stable_across_chunk_sizes() {
        let path = write_tmp("chunking.bin", &[1u8; 5000]);
        let stats = Blake3FileStats::new();
        let big_chunks = stats.compute_file_stats(&path, 8192).unwrap();
        let small_chunks = stats.compute_file_stats(&path, 17).unwrap();
        assert_eq!(big_chunks.content_hash, small_chunks.content_hash);
        assert_eq!(big_chunks.size, 5000);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_different_contents_differ() {
        let a = write_tmp("a.bin", b"hello");
        let b = write_tmp("b.bin", b"world");
        let stats = Blake3FileStats::new();
        let ha = stats.compute_file_stats(&a, 4096).unwrap();
        let hb = stats.compute_file_stats(&b, 4096).unwrap();
        assert_ne!(ha.content_hash, hb.content_hash);
        let _ = std::fs::remove_file(&a);
        let _ = std::fs::remove_file(&b);
    }

    #[test]
    fn test_zero_chunk_size_is_validation_error() {
        let path = write_tmp("zero.bin", b"x");
        let stats = Blake3FileStats::new();
        assert!(matches!(stats.compute_file_stats(&path, 0), Err(Error::Validation(_))));
        let _ = std::fs::remove_file(&path);
    }
}
