pub mod generate;
pub mod init;
pub mod plan;

use std::path::PathBuf;

use clap::Args;

use crate::context::ProjectContext;
use crate::output::OutputManager;

/// Overrides shared by commands that run the pipeline.
#[derive(Args, Clone, Debug, Default)]
pub struct PipelineArgs {
    /// Java source root, relative to the project root
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Persistence marker annotation (fully qualified)
    #[arg(long)]
    pub marker: Option<String>,

    /// Treat member types nested inside declared types as models
    #[arg(long)]
    pub nested: bool,

    /// Ignore @EnableAutoGenMapper roots in the sources
    #[arg(long)]
    pub no_annotations: bool,
}

impl PipelineArgs {
    pub fn generator(&self, ctx: &ProjectContext, output: &OutputManager) -> mappergen_build::MapperGenerator {
        if !ctx.is_initialized() {
            output.warning("No mappergen.toml found, using defaults and annotated sources only");
        }
        output.verbose(&format!("Project root: {}", ctx.project_root.display()));

        let mut generator = ctx.generator();
        if let Some(source_root) = &self.source_root {
            generator = generator.source_root(source_root);
        }
        if let Some(marker) = &self.marker {
            generator = generator.marker(marker);
        }
        if self.nested {
            generator = generator.nested_models(true);
        }
        if self.no_annotations {
            generator = generator.scan_annotations(false);
        }
        generator
    }
}
