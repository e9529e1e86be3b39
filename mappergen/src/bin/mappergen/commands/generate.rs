use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use mappergen_build::{RoundReport, WriteStatus};
use serde::Serialize;

use super::PipelineArgs;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Generate Mappers",
        commands: &[
            "mappergen generate                          # Use mappergen.toml and annotated sources",
            "mappergen generate --output-dir build/gen   # Write somewhere else",
        ],
    },
    ExampleGroup {
        title: "Scripting",
        commands: &["mappergen --output json generate          # Machine-readable results"],
    },
];

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory generated sources are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Debug, Serialize)]
struct RequestResult {
    origin: String,
    status: &'static str,
    written: usize,
    unchanged: usize,
    failed: usize,
    mappers: Vec<String>,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateSummary {
    requests: Vec<RequestResult>,
}

impl From<&RoundReport> for GenerateSummary {
    fn from(report: &RoundReport) -> Self {
        let requests = report
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(summary) => RequestResult {
                    origin: outcome.origin.clone(),
                    status: if summary.failed.is_empty() { "ok" } else { "partial" },
                    written: summary
                        .generated
                        .iter()
                        .filter(|g| g.status == WriteStatus::Written)
                        .count(),
                    unchanged: summary
                        .generated
                        .iter()
                        .filter(|g| g.status == WriteStatus::Unchanged)
                        .count(),
                    failed: summary.failed.len(),
                    mappers: summary.generated.iter().map(|g| g.mapper.clone()).collect(),
                    errors: summary.failed.iter().map(|f| f.error.to_string()).collect(),
                },
                Err(err) => RequestResult {
                    origin: outcome.origin.clone(),
                    status: "failed",
                    written: 0,
                    unchanged: 0,
                    failed: 0,
                    mappers: Vec::new(),
                    errors: vec![err.to_string()],
                },
            })
            .collect();
        Self { requests }
    }
}

impl TableDisplay for GenerateSummary {
    fn to_table(&self, output: &OutputManager) -> comfy_table::Table {
        let mut table = output.create_table(&["Request", "Status", "Written", "Unchanged", "Failed", "Errors"]);
        for request in &self.requests {
            table.add_row(vec![
                Cell::new(&request.origin),
                output.status_cell(request.status),
                Cell::new(request.written),
                Cell::new(request.unchanged),
                Cell::new(request.failed),
                Cell::new(request.errors.join("\n")),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.requests
            .iter()
            .map(|r| format!("{} {} written={} unchanged={} failed={}", r.origin, r.status, r.written, r.unchanged, r.failed))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_generate(args: GenerateArgs, config: Option<&Path>, output: &OutputManager) -> Result<()> {
    output.heading("Generate Mappers");

    let ctx = ProjectContext::find(config)?;
    let mut generator = args.pipeline.generator(&ctx, output);
    if let Some(output_dir) = &args.output_dir {
        generator = generator.output_dir(output_dir);
    }

    output.progress("Scanning Java sources");
    let report = generator.run().context("Failed to run mapper generation")?;
    output.clear_line();

    if report.outcomes.is_empty() {
        output.warning("No configuration roots found");
        output.info("Add a [[mapper]] table to mappergen.toml or annotate a type with @EnableAutoGenMapper");
        return Ok(());
    }

    output.round_details(&report);
    output.display(&GenerateSummary::from(&report))?;

    let failed_requests = report.failed_requests().count();
    let failed_mappers = report.failed_mappers().count();
    if failed_requests > 0 || failed_mappers > 0 {
        anyhow::bail!("{failed_requests} request(s) failed, {failed_mappers} mapper(s) could not be written");
    }

    output.success(&format!("{} mapper(s) up to date", report.generated().count()));
    Ok(())
}
