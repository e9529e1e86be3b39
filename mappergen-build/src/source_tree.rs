//! Package discovery over a directory tree that mirrors package names.
//!
//! One package per directory, rooted at a fixed source root. Packages that only
//! exist inside archives or on a classpath are invisible here.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Conventional Java source root, relative to the project root.
pub const DEFAULT_SOURCE_ROOT: &str = "src/main/java";

/// Lists the immediate child packages of a package.
pub trait SourceTree {
    /// Simple names of the child packages; empty when `package` is a leaf or absent.
    fn list_children(&self, package: &str) -> Vec<String>;
}

/// Source tree read from disk.
#[derive(Debug, Clone)]
pub struct FsSourceTree {
    root: PathBuf,
}

impl FsSourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory corresponding to `package`.
    pub fn package_dir(&self, package: &str) -> PathBuf {
        package_dir(&self.root, package)
    }
}

impl SourceTree for FsSourceTree {
    fn list_children(&self, package: &str) -> Vec<String> {
        let dir = self.package_dir(package);
        if !dir.is_dir() {
            return Vec::new();
        }

        let mut children = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("skipping unreadable entry under {}: {err}", dir.display());
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && is_package_segment(name)
            {
                children.push(name.to_string());
            }
        }
        children
    }
}

/// Source tree held in memory; adding a package adds its ancestors too.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceTree {
    packages: BTreeSet<String>,
}

impl MemorySourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, package: &str) -> Self {
        self.add_package(package);
        self
    }

    pub fn add_package(&mut self, package: &str) {
        let mut current = String::new();
        for segment in package.split('.') {
            if !current.is_empty() {
                current.push('.');
            }
            current.push_str(segment);
            self.packages.insert(current.clone());
        }
    }
}

impl SourceTree for MemorySourceTree {
    fn list_children(&self, package: &str) -> Vec<String> {
        self.packages
            .iter()
            .filter_map(|candidate| {
                let rest = if package.is_empty() {
                    candidate.as_str()
                } else {
                    candidate.strip_prefix(package)?.strip_prefix('.')?
                };
                (!rest.contains('.')).then(|| rest.to_string())
            })
            .collect()
    }
}

/// `root` plus every package below it.
pub fn expand<T: SourceTree + ?Sized>(tree: &T, root: &str) -> BTreeSet<String> {
    let mut packages = BTreeSet::new();
    collect(tree, root, &mut packages);
    packages
}

fn collect<T: SourceTree + ?Sized>(tree: &T, package: &str, packages: &mut BTreeSet<String>) {
    if !packages.insert(package.to_string()) {
        return;
    }
    for child in tree.list_children(package) {
        let child = if package.is_empty() {
            child
        } else {
            format!("{package}.{child}")
        };
        collect(tree, &child, packages);
    }
}

/// Map a dotted package name onto a directory under `root`.
pub fn package_dir(root: &Path, package: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        dir.push(segment);
    }
    dir
}

/// Whether a directory name can be a package segment.
pub fn is_package_segment(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
