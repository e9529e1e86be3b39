//! `mappergen.toml` configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::{ConfigurationRoot, DEFAULT_CONFIG_ANNOTATION, GenerationRequest};
use crate::source_tree::DEFAULT_SOURCE_ROOT;

pub const CONFIG_FILE_NAME: &str = "mappergen.toml";

/// Persistence marker selecting model types by default.
pub const DEFAULT_MARKER: &str = "javax.persistence.Table";

/// Where generated sources go, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "target/generated-sources/annotations";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapperGenConfig {
    #[serde(default)]
    pub project: ProjectSettings,
    #[serde(default, rename = "mapper", skip_serializing_if = "Vec::is_empty")]
    pub mappers: Vec<GenerationRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_marker")]
    pub marker: String,
    #[serde(default = "default_config_annotation")]
    pub config_annotation: String,
    /// Also read configuration roots from annotated Java types.
    #[serde(default = "default_true")]
    pub scan_annotations: bool,
    /// Consider member types nested inside declared types as models.
    #[serde(default)]
    pub nested_models: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            output_dir: default_output_dir(),
            marker: default_marker(),
            config_annotation: default_config_annotation(),
            scan_annotations: true,
            nested_models: false,
        }
    }
}

fn default_source_root() -> String {
    DEFAULT_SOURCE_ROOT.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_config_annotation() -> String {
    DEFAULT_CONFIG_ANNOTATION.to_string()
}

fn default_true() -> bool {
    true
}

impl MapperGenConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Configuration roots declared in the file, labelled `mappergen.toml#<n>`.
    pub fn roots(&self) -> Vec<ConfigurationRoot> {
        self.mappers
            .iter()
            .enumerate()
            .map(|(index, request)| {
                ConfigurationRoot::from(request.clone().with_origin(format!("{CONFIG_FILE_NAME}#{}", index + 1)))
            })
            .collect()
    }
}
