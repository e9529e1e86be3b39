//! File discovery for Java source trees.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Error;
use crate::source_tree::is_package_segment;

/// A `.java` file found under the source root.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// Path relative to the source root, for display.
    pub relative_path: String,
}

/// Everything found while walking a source root.
#[derive(Debug, Clone, Default)]
pub struct SourceListing {
    pub files: Vec<DiscoveredFile>,
    /// Package names of every directory that can hold a package.
    pub packages: Vec<String>,
}

/// Walk `root` collecting Java files and package directories.
///
/// A missing root yields an empty listing; a root that exists but cannot be
/// read is an error.
pub fn discover_sources(root: &Path) -> Result<SourceListing, Error> {
    let mut listing = SourceListing::default();
    if !root.exists() {
        return Ok(listing);
    }

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(Error::SourceRoot {
                    path: root.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());

        if entry.file_type().is_dir() {
            if let Some(package) = package_name(relative) {
                listing.packages.push(package);
            }
            continue;
        }

        if entry.path().extension().is_some_and(|ext| ext == "java") {
            listing.files.push(DiscoveredFile {
                path: entry.path().to_path_buf(),
                relative_path: relative.to_string_lossy().to_string(),
            });
        }
    }

    Ok(listing)
}

/// Dotted package name for a directory relative to the source root.
fn package_name(relative: &Path) -> Option<String> {
    let segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    if !segments.iter().all(|segment| is_package_segment(segment)) {
        return None;
    }
    Some(segments.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sources() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("com/example/model")).unwrap();
        fs::create_dir_all(root.join(".idea")).unwrap();
        fs::create_dir_all(root.join("com/example/my-assets")).unwrap();
        fs::write(root.join("com/example/model/Order.java"), "").unwrap();
        fs::write(root.join("com/example/model/notes.txt"), "").unwrap();
        fs::write(root.join(".idea/Hidden.java"), "").unwrap();

        let listing = discover_sources(root).unwrap();

        assert_eq!(listing.files.len(), 1);
        assert!(listing.files[0].relative_path.ends_with("Order.java"));
        assert_eq!(listing.packages, vec!["", "com", "com.example", "com.example.model"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let listing = discover_sources(&dir.path().join("absent")).unwrap();
        assert!(listing.files.is_empty());
        assert!(listing.packages.is_empty());
    }
}
