//! Recursive directory walk grouping discovered files by lowercase
//! extension, built on `ignore::WalkBuilder` so `.gitignore`-style rules
//! and the `concurrency` knob are honored the way a modern CLI tool would,
//! rather than a bare `walkdir` recursion.

use std::collections::BTreeMap;
use std::path::PathBuf;

use mediadup_core::error::Error;
use mediadup_core::provider::DiscoverFiles;
use mediadup_core::Result;

#[derive(Default)]
pub struct FsDiscoverer;

impl FsDiscoverer {
    pub fn new() -> Self {
        Self
    }
}

impl DiscoverFiles for FsDiscoverer {
    fn discover(&self, roots: &[PathBuf], concurrency: usize) -> Result<BTreeMap<String, Vec<PathBuf>>> {
        let mut by_ext: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for root in roots {
            if !root.exists() {
                return Err(Error::file_system("discover", format!("path does not exist: {}", root.display())));
            }

            let threads = concurrency.max(1);
            let walker = ignore::WalkBuilder::new(root)
                .threads(threads)
                .hidden(false)
                .git_ignore(false)
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        log::warn!(target: "discover", "skipping unreadable entry under {}: {e}", root.display());
                        continue;
                    }
                };

                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }

                let path = entry.into_path();
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();

                by_ext.entry(ext).or_default().push(path);
            }
        }

        for paths in by_ext.values_mut() {
            paths.sort();
        }

        Ok(by_ext)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_discover_groups_by_lowercase_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("c.mp4"), b"x").unwrap();

        let result = FsDiscoverer::new().discover(&[dir.path().to_path_buf()], 1).unwrap();
        assert_eq!(result.get("jpg").map(Vec::len), Some(2));
        assert_eq!(result.get("mp4").map(Vec::len), Some(1));
    }

    #[test]
    fn test_discover_missing_root_is_an_error() {
        let result = FsDiscoverer::new().discover(&[PathBuf::from("/no/such/path/mediadup")], 1);
        assert!(result.is_err());
    }
}
