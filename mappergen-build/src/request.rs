//! Generation requests and the configuration roots they come from.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::names::{BaseInterface, split_base};
use crate::types::{ElementValue, TypeDecl};

/// Configuration annotation read from Java sources by default.
pub const DEFAULT_CONFIG_ANNOTATION: &str = "com.wesd.mybatis.annotation.EnableAutoGenMapper";

/// One configuration root's settings for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Where the request was declared, for diagnostics.
    #[serde(skip)]
    pub origin: String,
    pub model_packages: Vec<String>,
    pub mapper_package: String,
    #[serde(default)]
    pub mapper_prefix: String,
    pub base_interface: String,
}

impl GenerationRequest {
    pub fn new<I, S>(model_packages: I, mapper_package: impl Into<String>, base_interface: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origin: String::new(),
            model_packages: model_packages.into_iter().map(Into::into).collect(),
            mapper_package: mapper_package.into(),
            mapper_prefix: String::new(),
            base_interface: base_interface.into(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mapper_prefix = prefix.into();
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Check the request and split its base interface.
    pub fn validate(&self) -> Result<BaseInterface, ConfigurationError> {
        if self.model_packages.is_empty() {
            return Err(ConfigurationError::NoModelPackages);
        }
        if self.mapper_package.trim().is_empty() {
            return Err(ConfigurationError::EmptyMapperPackage);
        }
        split_base(&self.base_interface)
    }

    /// Build a request from the configuration annotation on `decl`.
    ///
    /// Reads `modelPackageName`, `mapperPackageName`, `mapperPrefix` and
    /// `superMapperClassName`; other elements are ignored.
    pub fn from_annotated(decl: &TypeDecl, annotation: &str) -> Result<Self, ConfigurationError> {
        let missing = |element: &str| ConfigurationError::MissingElement {
            annotation: annotation.to_string(),
            element: element.to_string(),
        };
        let Some(found) = decl.annotation(annotation) else {
            return Err(missing("modelPackageName"));
        };

        let invalid = |element: &str, message: String| ConfigurationError::InvalidAnnotation {
            annotation: annotation.to_string(),
            element: element.to_string(),
            message,
        };
        let string = |name: &str| -> Result<Option<String>, ConfigurationError> {
            match found.element(name) {
                None => Ok(None),
                Some(ElementValue::Str(value)) => Ok(Some(value.clone())),
                Some(other) => Err(invalid(name, format!("expected a string literal, found {other:?}"))),
            }
        };

        let model_packages = match found.element("modelPackageName") {
            None => return Err(missing("modelPackageName")),
            Some(value) => value
                .as_string_list()
                .ok_or_else(|| invalid("modelPackageName", "expected string literals".to_string()))?,
        };
        let mapper_package = string("mapperPackageName")?.ok_or_else(|| missing("mapperPackageName"))?;
        let base_interface = string("superMapperClassName")?.ok_or_else(|| missing("superMapperClassName"))?;
        let mapper_prefix = string("mapperPrefix")?.unwrap_or_default();

        Ok(GenerationRequest::new(model_packages, mapper_package, base_interface)
            .with_prefix(mapper_prefix)
            .with_origin(decl.qualified_name()))
    }
}

/// A configuration root as seen by the orchestrator: either a usable request
/// or the reason it could not be read.
#[derive(Debug, Clone)]
pub struct ConfigurationRoot {
    pub origin: String,
    pub request: Result<GenerationRequest, ConfigurationError>,
}

impl From<GenerationRequest> for ConfigurationRoot {
    fn from(request: GenerationRequest) -> Self {
        Self {
            origin: request.origin.clone(),
            request: Ok(request),
        }
    }
}

impl ConfigurationRoot {
    pub fn from_annotated(decl: &TypeDecl, annotation: &str) -> Self {
        Self {
            origin: decl.qualified_name(),
            request: GenerationRequest::from_annotated(decl, annotation),
        }
    }
}
