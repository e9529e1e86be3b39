//! Java source scanning: the type repository backed by a real source tree.
//!
//! This module provides:
//! - Discovery of `.java` files and package directories under a source root
//! - A tree-sitter backed reader for packages, imports, annotations and types
//! - Annotation element values read from the syntax tree

mod discovery;
mod elements;
mod parser;

use std::fs;
use std::path::{Path, PathBuf};

pub use discovery::{DiscoveredFile, SourceListing, discover_sources};
pub use parser::{CompilationUnit, Import, JavaParser, SyntaxError};

use crate::error::{Error, LookupError, ScanError};
use crate::types::{InMemoryTypes, TypeDecl, TypeRepository};

/// Parse one compilation unit. `path` is only used in error reports.
pub fn parse_source(path: &Path, source: &str) -> Result<CompilationUnit, ScanError> {
    parse_with(&mut JavaParser::new()?, path, source)
}

fn parse_with(parser: &mut JavaParser, path: &Path, source: &str) -> Result<CompilationUnit, ScanError> {
    parser.parse(source).map_err(|err| ScanError::Syntax {
        path: path.to_path_buf(),
        line: err.line,
        message: err.message,
    })
}

/// Declared types of every Java file under a source root.
///
/// A package resolves when a file declares it or when its directory exists.
#[derive(Debug, Clone, Default)]
pub struct JavaSources {
    types: InMemoryTypes,
    skipped: Vec<PathBuf>,
}

impl JavaSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every `.java` file under `root`. Files that fail to read or parse
    /// are skipped with a warning.
    pub fn scan(root: &Path) -> Result<Self, Error> {
        let listing = discover_sources(root)?;
        let mut parser = JavaParser::new().map_err(ScanError::from)?;
        let mut sources = Self::new();

        for package in listing.packages {
            sources.types.declare_package(package);
        }

        for file in &listing.files {
            let added = read_source(&file.path)
                .and_then(|content| parse_with(&mut parser, &file.path, &content))
                .map(|unit| sources.add_unit(unit));
            match added {
                Ok(count) => log::debug!("{}: {count} type(s)", file.relative_path),
                Err(err) => {
                    log::warn!("skipping {}: {err}", file.relative_path);
                    sources.skipped.push(file.path.clone());
                }
            }
        }

        log::debug!(
            "scanned {} java file(s) under {}, {} skipped",
            listing.files.len(),
            root.display(),
            sources.skipped.len()
        );
        Ok(sources)
    }

    /// Read and add one file, returning how many top-level types it declares.
    pub fn add_file(&mut self, path: &Path) -> Result<usize, ScanError> {
        let content = read_source(path)?;
        self.add_source(path, &content)
    }

    pub fn add_source(&mut self, path: &Path, source: &str) -> Result<usize, ScanError> {
        let unit = parse_source(path, source)?;
        Ok(self.add_unit(unit))
    }

    fn add_unit(&mut self, unit: CompilationUnit) -> usize {
        let count = unit.types.len();
        self.types.declare_package(unit.package);
        for decl in unit.types {
            self.types.insert(decl);
        }
        count
    }

    /// Files that could not be scanned.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.types.packages()
    }

    pub fn type_count(&self) -> usize {
        self.types.type_count()
    }
}

fn read_source(path: &Path) -> Result<String, ScanError> {
    fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl TypeRepository for JavaSources {
    fn declared_types(&self, package: &str) -> Result<&[TypeDecl], LookupError> {
        self.types.declared_types(package)
    }

    fn annotated_with(&self, annotation: &str) -> Vec<&TypeDecl> {
        self.types.annotated_with(annotation)
    }
}
