//! Build-time generator for per-model mapper interfaces.
//!
//! This crate scans a Java source tree for types carrying a persistence marker
//! (`@Table` by default) inside configured model packages, and writes one
//! interface per model extending a configured generic base interface:
//!
//! ```text
//! public interface OrderMapper extends GenericMapper<Order> {
//! }
//! ```
//!
//! Configuration roots come from `[[mapper]]` tables in `mappergen.toml` and
//! from Java types annotated with `@EnableAutoGenMapper`.
//!
//! Sub-packages are found by following the directory tree under the source
//! root (`src/main/java` by default); packages that only exist in jars are
//! not visible.
//!
//! # Example
//!
//! ```ignore
//! let report = mappergen_build::generate_mappers()
//!     .project_root(".")
//!     .request(GenerationRequest::new(
//!         ["com.example.model"],
//!         "com.example.mapper",
//!         "com.base.GenericMapper",
//!     ))
//!     .run()?;
//!
//! for failed in report.failed_requests() {
//!     eprintln!("{}: {:?}", failed.origin, failed.result);
//! }
//! ```

pub mod config;
pub mod discover;
pub mod emitter;
pub mod error;
mod generator;
pub mod names;
pub mod processor;
pub mod request;
pub mod scanner;
pub mod source_tree;
pub mod types;

pub use config::MapperGenConfig;
pub use emitter::{Filer, FsFiler, MemoryFiler, WriteStatus};
pub use error::{ConfigurationError, EmitError, Error, LookupError, RequestError, ScanError};
pub use generator::{MapperGenerator, PlannedRoot};
pub use names::{BaseInterface, MapperSpec};
pub use processor::{Planner, Processor, ProcessorOptions, RequestOutcome, RoundReport};
pub use request::{ConfigurationRoot, GenerationRequest};
pub use scanner::JavaSources;
pub use source_tree::{FsSourceTree, MemorySourceTree, SourceTree};
pub use types::{InMemoryTypes, ModelType, TypeDecl, TypeRepository};

/// Create a new mapper generator with default settings.
pub fn generate_mappers() -> MapperGenerator {
    MapperGenerator::new()
}
