//! Builder that runs a full round against a project on disk.

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE_NAME, MapperGenConfig};
use crate::emitter::FsFiler;
use crate::error::{Error, RequestError};
use crate::processor::{Plan, Planner, Processor, ProcessorOptions, RoundReport};
use crate::request::{ConfigurationRoot, GenerationRequest};
use crate::scanner::JavaSources;
use crate::source_tree::FsSourceTree;
use crate::types::TypeRepository;

/// Builder for configuring and running the mapper generator.
#[derive(Debug, Clone)]
pub struct MapperGenerator {
    project_root: PathBuf,
    config: Option<MapperGenConfig>,
    config_file: Option<PathBuf>,
    source_root: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    marker: Option<String>,
    config_annotation: Option<String>,
    nested_models: Option<bool>,
    scan_annotations: Option<bool>,
    requests: Vec<GenerationRequest>,
}

/// A configuration root and what it would generate.
#[derive(Debug, Clone)]
pub struct PlannedRoot {
    pub root: ConfigurationRoot,
    pub plan: Result<Plan, RequestError>,
}

/// Settings after merging builder overrides over the config file.
#[derive(Debug, Clone)]
struct ResolvedSettings {
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
    pub config_annotation: String,
    pub scan_annotations: bool,
    pub options: ProcessorOptions,
}

impl MapperGenerator {
    /// Create a new generator rooted at the current directory.
    pub fn new() -> Self {
        Self {
            project_root: PathBuf::from("."),
            config: None,
            config_file: None,
            source_root: None,
            output_dir: None,
            marker: None,
            config_annotation: None,
            nested_models: None,
            scan_annotations: None,
            requests: Vec::new(),
        }
    }

    /// Directory relative paths are resolved against.
    ///
    /// Default: `.`
    pub fn project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = path.into();
        self
    }

    /// Read settings and `[[mapper]]` roots from this file.
    ///
    /// Default: `mappergen.toml` in the project root, if present.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use an already loaded configuration instead of reading a file.
    ///
    /// Takes precedence over [`config_file`](Self::config_file).
    pub fn config(mut self, config: MapperGenConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Default: `src/main/java`
    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(path.into());
        self
    }

    /// Default: `target/generated-sources/annotations`
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Default: `javax.persistence.Table`
    pub fn marker(mut self, qualified: impl Into<String>) -> Self {
        self.marker = Some(qualified.into());
        self
    }

    /// Default: `com.wesd.mybatis.annotation.EnableAutoGenMapper`
    pub fn config_annotation(mut self, qualified: impl Into<String>) -> Self {
        self.config_annotation = Some(qualified.into());
        self
    }

    pub fn nested_models(mut self, enabled: bool) -> Self {
        self.nested_models = Some(enabled);
        self
    }

    pub fn scan_annotations(mut self, enabled: bool) -> Self {
        self.scan_annotations = Some(enabled);
        self
    }

    /// Add a request on top of those found in configuration.
    ///
    /// Can be called multiple times.
    pub fn request(mut self, request: GenerationRequest) -> Self {
        self.requests.push(request);
        self
    }

    fn load_config(&self) -> Result<MapperGenConfig, Error> {
        if let Some(config) = &self.config {
            return Ok(config.clone());
        }
        match &self.config_file {
            Some(path) => MapperGenConfig::load(&self.resolve_path(path)),
            None => {
                let default_path = self.project_root.join(CONFIG_FILE_NAME);
                if default_path.exists() {
                    MapperGenConfig::load(&default_path)
                } else {
                    Ok(MapperGenConfig::default())
                }
            }
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    fn settings(&self, config: &MapperGenConfig) -> ResolvedSettings {
        let project = &config.project;
        let source_root = self
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(&project.source_root));
        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&project.output_dir));

        ResolvedSettings {
            source_root: self.resolve_path(&source_root),
            output_dir: self.resolve_path(&output_dir),
            config_annotation: self
                .config_annotation
                .clone()
                .unwrap_or_else(|| project.config_annotation.clone()),
            scan_annotations: self.scan_annotations.unwrap_or(project.scan_annotations),
            options: ProcessorOptions {
                marker: self.marker.clone().unwrap_or_else(|| project.marker.clone()),
                nested_models: self.nested_models.unwrap_or(project.nested_models),
            },
        }
    }

    /// Config file roots, then builder requests, then annotated Java types.
    fn collect_roots(
        &self,
        config: &MapperGenConfig,
        settings: &ResolvedSettings,
        types: &dyn TypeRepository,
    ) -> Vec<ConfigurationRoot> {
        let mut roots = config.roots();
        roots.extend(self.requests.iter().enumerate().map(|(index, request)| {
            let mut request = request.clone();
            if request.origin.is_empty() {
                request.origin = format!("request#{}", index + 1);
            }
            ConfigurationRoot::from(request)
        }));

        if settings.scan_annotations {
            roots.extend(
                types
                    .annotated_with(&settings.config_annotation)
                    .into_iter()
                    .map(|decl| ConfigurationRoot::from_annotated(decl, &settings.config_annotation)),
            );
        }
        roots
    }

    /// Resolve what a round would generate without writing anything.
    pub fn plan(&self) -> Result<Vec<PlannedRoot>, Error> {
        let config = self.load_config()?;
        let settings = self.settings(&config);
        let sources = JavaSources::scan(&settings.source_root)?;
        let tree = FsSourceTree::new(&settings.source_root);
        let planner = Planner::new(&tree, &sources, settings.options.clone());

        Ok(self
            .collect_roots(&config, &settings, &sources)
            .into_iter()
            .map(|root| {
                let plan = match &root.request {
                    Ok(request) => planner.plan(request),
                    Err(err) => Err(err.clone().into()),
                };
                PlannedRoot { root, plan }
            })
            .collect())
    }

    /// Run the generator.
    ///
    /// Scans the source root, collects configuration roots and processes them
    /// as one round. Only setup problems are errors; request failures are in
    /// the returned report.
    pub fn run(self) -> Result<RoundReport, Error> {
        let config = self.load_config()?;
        let settings = self.settings(&config);
        log::debug!(
            "source root {}, output {}",
            settings.source_root.display(),
            settings.output_dir.display()
        );

        let sources = JavaSources::scan(&settings.source_root)?;
        let tree = FsSourceTree::new(&settings.source_root);
        let mut filer = FsFiler::new(&settings.output_dir);
        let roots = self.collect_roots(&config, &settings, &sources);

        if roots.is_empty() {
            log::warn!("no configuration roots found");
        }

        let mut processor = Processor::new(&tree, &sources, &mut filer, settings.options);
        let report = processor.process_round(roots);

        log::info!(
            "mappergen: {} mapper(s) from {} request(s), {} failed",
            report.generated().count(),
            report.outcomes.len(),
            report.failed_requests().count()
        );
        Ok(report)
    }
}

impl Default for MapperGenerator {
    fn default() -> Self {
        Self::new()
    }
}
