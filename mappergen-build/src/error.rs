use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A configuration root that cannot be turned into a valid request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no model packages configured")]
    NoModelPackages,

    #[error("mapper package is empty")]
    EmptyMapperPackage,

    /// The base interface must be `package.SimpleName`.
    #[error("base interface '{0}' is not a fully qualified name")]
    UnqualifiedBaseInterface(String),

    #[error("invalid element '{element}' in {annotation}: {message}")]
    InvalidAnnotation {
        annotation: String,
        element: String,
        message: String,
    },

    #[error("missing required element '{element}' in {annotation}")]
    MissingElement { annotation: String, element: String },
}

/// A package named by the configuration that the type repository does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("package '{package}' cannot be resolved")]
pub struct LookupError {
    pub package: String,
}

impl LookupError {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

/// Failure writing one generated unit.
#[derive(Debug, Error)]
#[error("failed to write {package}.{name}: {source}")]
pub struct EmitError {
    pub package: String,
    pub name: String,
    #[source]
    pub source: io::Error,
}

/// Failure that aborts a whole request (but never the round).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Java source that could not be scanned.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("failed to load the Java grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
}

/// Setup failures surfaced by [`crate::MapperGenerator::run`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to scan source root {}: {source}", path.display())]
    SourceRoot {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),
}
