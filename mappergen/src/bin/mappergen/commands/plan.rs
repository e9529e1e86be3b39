use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use mappergen_build::PlannedRoot;
use serde::Serialize;

use super::PipelineArgs;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Preview",
    commands: &[
        "mappergen plan                              # List models and the mappers they would get",
        "mappergen plan --nested                     # Include nested member types",
    ],
}];

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Debug, Serialize)]
struct PlanRow {
    origin: String,
    model: Option<String>,
    mapper: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct PlanListing {
    rows: Vec<PlanRow>,
}

impl PlanListing {
    fn from_planned(planned: &[PlannedRoot]) -> Self {
        let mut rows = Vec::new();
        for entry in planned {
            match &entry.plan {
                Ok(plan) if plan.specs.is_empty() => rows.push(PlanRow {
                    origin: entry.root.origin.clone(),
                    model: None,
                    mapper: None,
                    error: None,
                }),
                Ok(plan) => rows.extend(plan.specs.iter().map(|spec| PlanRow {
                    origin: entry.root.origin.clone(),
                    model: Some(spec.model.qualified_name.clone()),
                    mapper: Some(spec.qualified_name()),
                    error: None,
                })),
                Err(err) => rows.push(PlanRow {
                    origin: entry.root.origin.clone(),
                    model: None,
                    mapper: None,
                    error: Some(err.to_string()),
                }),
            }
        }
        Self { rows }
    }

    fn failures(&self) -> usize {
        self.rows.iter().filter(|row| row.error.is_some()).count()
    }
}

impl TableDisplay for PlanListing {
    fn to_table(&self, output: &OutputManager) -> comfy_table::Table {
        let mut table = output.create_table(&["Request", "Model", "Mapper"]);
        for row in &self.rows {
            let (model, mapper) = match (&row.model, &row.mapper, &row.error) {
                (Some(model), Some(mapper), _) => (model.clone(), mapper.clone()),
                (_, _, Some(error)) => (format!("error: {error}"), String::new()),
                _ => ("(no models)".to_string(), String::new()),
            };
            table.add_row(vec![Cell::new(&row.origin), Cell::new(model), Cell::new(mapper)]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.rows
            .iter()
            .map(|row| match (&row.model, &row.mapper, &row.error) {
                (Some(model), Some(mapper), _) => format!("{} {model} -> {mapper}", row.origin),
                (_, _, Some(error)) => format!("{} error: {error}", row.origin),
                _ => format!("{} (no models)", row.origin),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn handle_plan(args: PlanArgs, config: Option<&Path>, output: &OutputManager) -> Result<()> {
    output.heading("Mapper Plan");

    let ctx = ProjectContext::find(config)?;
    let generator = args.pipeline.generator(&ctx, output);

    output.progress("Scanning Java sources");
    let planned = generator.plan().context("Failed to plan mapper generation")?;
    output.clear_line();

    if planned.is_empty() {
        output.warning("No configuration roots found");
        return Ok(());
    }

    let listing = PlanListing::from_planned(&planned);
    output.display(&listing)?;

    match listing.failures() {
        0 => output.info("Nothing was written. Run 'mappergen generate' to write these mappers."),
        n => output.warning(&format!("{n} request(s) would fail")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mappergen_build::processor::Plan;
    use mappergen_build::request::ConfigurationRoot;
    use mappergen_build::{GenerationRequest, LookupError, ModelType, RequestError, names};

    #[test]
    fn test_listing_rows() {
        let request = GenerationRequest::new(["a.model"], "a.mapper", "a.base.GenericMapper").with_origin("first");
        let model = ModelType {
            qualified_name: "a.model.Order".to_string(),
            package: "a.model".to_string(),
            nested_name: "Order".to_string(),
        };
        let spec = names::resolve(&model, &request).unwrap();
        let planned = vec![
            PlannedRoot {
                root: ConfigurationRoot::from(request),
                plan: Ok(Plan {
                    packages: Default::default(),
                    specs: vec![spec],
                }),
            },
            PlannedRoot {
                root: ConfigurationRoot::from(
                    GenerationRequest::new(["a.gone"], "a.mapper", "a.base.GenericMapper").with_origin("second"),
                ),
                plan: Err(RequestError::Lookup(LookupError::new("a.gone"))),
            },
        ];

        let listing = PlanListing::from_planned(&planned);
        assert_eq!(listing.failures(), 1);
        assert_eq!(
            listing.to_compact(),
            "first a.model.Order -> a.mapper.OrderMapper\nsecond error: package 'a.gone' cannot be resolved"
        );
    }
}
