use anyhow::{Context, Result};
use clap::Args;
use mappergen_build::config::CONFIG_FILE_NAME;
use mappergen_build::{GenerationRequest, MapperGenConfig};

use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Setup",
    commands: &[
        "mappergen init                              # Write mappergen.toml in the current directory",
        "mappergen init --force                      # Overwrite an existing mappergen.toml",
    ],
}];

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Starting configuration with one example request.
fn starter_config() -> MapperGenConfig {
    MapperGenConfig {
        mappers: vec![GenerationRequest::new(
            ["com.example.model"],
            "com.example.mapper",
            "com.example.base.GenericMapper",
        )],
        ..Default::default()
    }
}

pub fn handle_init(args: InitArgs, output: &OutputManager) -> Result<()> {
    output.heading("Initialize mappergen");

    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config_path = current_dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        output.info("Use --force to overwrite it.");
        anyhow::bail!("{} already exists", config_path.display());
    }

    let content = toml::to_string_pretty(&starter_config()).context("Failed to serialize config")?;
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    output.success(&format!("Created {}", config_path.display()));
    output.bullet("Edit the [[mapper]] table to point at your model packages");
    output.bullet("Run 'mappergen plan' to preview, then 'mappergen generate'");
    Ok(())
}
