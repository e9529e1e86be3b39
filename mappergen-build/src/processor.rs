//! Round orchestration: requests in, generated mappers and diagnostics out.
//!
//! A request either fails as a whole (bad configuration, unknown package) and
//! produces nothing, or runs to completion with per-mapper write failures
//! recorded next to the successes. No failure ever stops a sibling request.

use std::collections::{BTreeSet, HashMap};

use crate::config::DEFAULT_MARKER;
use crate::discover::discover;
use crate::emitter::{Filer, WriteStatus, emit};
use crate::error::{EmitError, RequestError};
use crate::names::{MapperSpec, resolve};
use crate::request::{ConfigurationRoot, GenerationRequest};
use crate::source_tree::{SourceTree, expand};
use crate::types::TypeRepository;

#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Qualified name of the persistence marker annotation.
    pub marker: String,
    pub nested_models: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            nested_models: false,
        }
    }
}

/// Resolved work for one request, before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    pub packages: BTreeSet<String>,
    pub specs: Vec<MapperSpec>,
}

/// Discovery and naming, without side effects.
pub struct Planner<'a> {
    tree: &'a dyn SourceTree,
    types: &'a dyn TypeRepository,
    options: ProcessorOptions,
}

impl<'a> Planner<'a> {
    pub fn new(tree: &'a dyn SourceTree, types: &'a dyn TypeRepository, options: ProcessorOptions) -> Self {
        Self { tree, types, options }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn plan(&self, request: &GenerationRequest) -> Result<Plan, RequestError> {
        request.validate()?;

        let mut packages = BTreeSet::new();
        for root in &request.model_packages {
            packages.extend(expand(self.tree, root));
        }
        log::debug!("{}: {} package(s) to scan", request.origin, packages.len());

        let models = discover(self.types, &packages, &self.options.marker, self.options.nested_models)?;

        let specs = models
            .iter()
            .map(|model| resolve(model, request))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Plan { packages, specs })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMapper {
    pub model: String,
    pub mapper: String,
    pub status: WriteStatus,
}

#[derive(Debug)]
pub struct FailedMapper {
    pub model: String,
    pub mapper: String,
    pub error: EmitError,
}

#[derive(Debug, Default)]
pub struct RequestSummary {
    pub packages: BTreeSet<String>,
    pub generated: Vec<GeneratedMapper>,
    pub failed: Vec<FailedMapper>,
}

#[derive(Debug)]
pub struct RequestOutcome {
    pub origin: String,
    pub result: Result<RequestSummary, RequestError>,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(summary) if summary.failed.is_empty())
    }
}

/// Per-request results of one round.
#[derive(Debug, Default)]
pub struct RoundReport {
    pub outcomes: Vec<RequestOutcome>,
}

impl RoundReport {
    /// The round always claims the configuration annotation, whatever happened
    /// to individual requests.
    pub fn claimed(&self) -> bool {
        true
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RequestOutcome::is_success)
    }

    pub fn failed_requests(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }

    pub fn generated(&self) -> impl Iterator<Item = &GeneratedMapper> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .flat_map(|summary| summary.generated.iter())
    }

    pub fn failed_mappers(&self) -> impl Iterator<Item = &FailedMapper> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .flat_map(|summary| summary.failed.iter())
    }
}

/// Drives planning and emission for every configuration root of a round.
pub struct Processor<'a> {
    planner: Planner<'a>,
    filer: &'a mut dyn Filer,
    /// Origin that last wrote each (package, name) this round.
    written: HashMap<(String, String), String>,
}

impl<'a> Processor<'a> {
    pub fn new(
        tree: &'a dyn SourceTree,
        types: &'a dyn TypeRepository,
        filer: &'a mut dyn Filer,
        options: ProcessorOptions,
    ) -> Self {
        Self {
            planner: Planner::new(tree, types, options),
            filer,
            written: HashMap::new(),
        }
    }

    pub fn process_round<I>(&mut self, roots: I) -> RoundReport
    where
        I: IntoIterator<Item = ConfigurationRoot>,
    {
        let outcomes = roots
            .into_iter()
            .map(|root| match root.request {
                Ok(request) => self.process_request(&request),
                Err(err) => {
                    log::error!("{}: {err}", root.origin);
                    RequestOutcome {
                        origin: root.origin,
                        result: Err(err.into()),
                    }
                }
            })
            .collect();
        RoundReport { outcomes }
    }

    pub fn process_request(&mut self, request: &GenerationRequest) -> RequestOutcome {
        let plan = match self.planner.plan(request) {
            Ok(plan) => plan,
            Err(err) => {
                log::error!("{}: {err}", request.origin);
                return RequestOutcome {
                    origin: request.origin.clone(),
                    result: Err(err),
                };
            }
        };

        let mut summary = RequestSummary {
            packages: plan.packages,
            ..Default::default()
        };

        for spec in &plan.specs {
            let model = spec.model.qualified_name.clone();
            let mapper = spec.qualified_name();
            match emit(self.filer, spec) {
                Ok(status) => {
                    self.record_write(spec, &request.origin);
                    if status == WriteStatus::Written {
                        log::info!("generated {mapper} for {model}");
                    }
                    summary.generated.push(GeneratedMapper { model, mapper, status });
                }
                Err(error) => {
                    log::warn!("{}: {error}", request.origin);
                    summary.failed.push(FailedMapper { model, mapper, error });
                }
            }
        }

        RequestOutcome {
            origin: request.origin.clone(),
            result: Ok(summary),
        }
    }

    fn record_write(&mut self, spec: &MapperSpec, origin: &str) {
        let key = (spec.package.clone(), spec.name.clone());
        if let Some(previous) = self.written.insert(key, origin.to_string())
            && previous != origin
        {
            log::warn!(
                "{} from {origin} replaces the one generated for {previous}",
                spec.qualified_name()
            );
        }
    }
}
