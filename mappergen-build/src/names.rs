//! Naming rules for generated mappers.

use crate::error::ConfigurationError;
use crate::request::GenerationRequest;
use crate::types::{ModelType, qualify};

/// Appended to every generated mapper name.
pub const MAPPER_SUFFIX: &str = "Mapper";

/// Replaces qualifier separators left after stripping the package.
pub const NESTED_JOIN: char = '$';

/// The base interface split into package and simple name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseInterface {
    pub package: String,
    pub simple_name: String,
}

impl BaseInterface {
    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.simple_name)
    }
}

/// Everything needed to emit one mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperSpec {
    pub name: String,
    pub package: String,
    pub base: BaseInterface,
    pub model: ModelType,
}

impl MapperSpec {
    /// Identity of the generated unit in the output root.
    pub fn key(&self) -> (&str, &str) {
        (&self.package, &self.name)
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }
}

/// Strip the owning package from a qualified type name and flatten what is left.
///
/// `short_name("a.b.model", "a.b.model.order.Order") == "order$Order"`
pub fn short_name(package: &str, qualified: &str) -> String {
    let relative = if package.is_empty() {
        qualified
    } else {
        qualified
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(qualified)
    };
    relative.replace('.', &NESTED_JOIN.to_string())
}

pub fn generated_name(prefix: &str, short_name: &str) -> String {
    format!("{prefix}{short_name}{MAPPER_SUFFIX}")
}

/// Split a fully qualified interface name at its last `.`.
pub fn split_base(qualified: &str) -> Result<BaseInterface, ConfigurationError> {
    match qualified.rsplit_once('.') {
        Some((package, simple_name)) if !package.is_empty() && !simple_name.is_empty() => Ok(BaseInterface {
            package: package.to_string(),
            simple_name: simple_name.to_string(),
        }),
        _ => Err(ConfigurationError::UnqualifiedBaseInterface(qualified.to_string())),
    }
}

pub fn resolve(model: &ModelType, request: &GenerationRequest) -> Result<MapperSpec, ConfigurationError> {
    let base = split_base(&request.base_interface)?;
    let short = short_name(&model.package, &model.qualified_name);
    Ok(MapperSpec {
        name: generated_name(&request.mapper_prefix, &short),
        package: request.mapper_package.clone(),
        base,
        model: model.clone(),
    })
}
