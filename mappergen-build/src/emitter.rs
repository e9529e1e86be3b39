//! Rendering and writing generated mapper interfaces.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::EmitError;
use crate::names::MapperSpec;
use crate::source_tree::package_dir;
use crate::types::qualify;

/// Outcome of writing one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    /// An identical unit was already present.
    Unchanged,
}

/// Destination for generated source units, keyed by (package, simple name).
pub trait Filer {
    /// Write `body`, replacing any unit previously written under the same key.
    fn write_source(&mut self, package: &str, name: &str, body: &str) -> io::Result<WriteStatus>;
}

/// Writes `<root>/<package path>/<Name>.java`.
#[derive(Debug, Clone)]
pub struct FsFiler {
    root: PathBuf,
}

impl FsFiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, package: &str, name: &str) -> PathBuf {
        package_dir(&self.root, package).join(format!("{name}.java"))
    }
}

impl Filer for FsFiler {
    fn write_source(&mut self, package: &str, name: &str, body: &str) -> io::Result<WriteStatus> {
        let path = self.path_for(package, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Only write if content has changed
        if fs::read_to_string(&path).is_ok_and(|existing| existing == body) {
            return Ok(WriteStatus::Unchanged);
        }

        fs::write(&path, body)?;
        Ok(WriteStatus::Written)
    }
}

/// Keeps generated units in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiler {
    units: BTreeMap<(String, String), String>,
}

impl MemoryFiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, package: &str, name: &str) -> Option<&str> {
        self.units
            .get(&(package.to_string(), name.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Qualified names of every unit, sorted.
    pub fn names(&self) -> Vec<String> {
        self.units.keys().map(|(package, name)| qualify(package, name)).collect()
    }
}

impl Filer for MemoryFiler {
    fn write_source(&mut self, package: &str, name: &str, body: &str) -> io::Result<WriteStatus> {
        let key = (package.to_string(), name.to_string());
        if self.units.get(&key).is_some_and(|existing| existing == body) {
            return Ok(WriteStatus::Unchanged);
        }
        self.units.insert(key, body.to_string());
        Ok(WriteStatus::Written)
    }
}

/// Render `spec` as a Java compilation unit.
///
/// ```text
/// package com.example.mapper;
///
/// import com.base.GenericMapper;
/// import com.example.model.Order;
///
/// public interface OrderMapper extends GenericMapper<Order> {
/// }
/// ```
pub fn render(spec: &MapperSpec) -> String {
    let mut imports = BTreeSet::new();

    let base_qualified = spec.base.qualified_name();
    let base_ref = if spec.base.simple_name == spec.name {
        base_qualified.clone()
    } else {
        if needs_import(&spec.base.package, &spec.package) {
            imports.insert(base_qualified.clone());
        }
        spec.base.simple_name.clone()
    };

    let model = &spec.model;
    let outer = model.outer_name();
    let outer_qualified = qualify(&model.package, outer);
    let clashes = outer == spec.name || (outer == spec.base.simple_name && outer_qualified != base_qualified);
    let model_ref = if clashes && !model.package.is_empty() {
        model.qualified_name.clone()
    } else {
        if needs_import(&model.package, &spec.package) {
            imports.insert(outer_qualified);
        }
        model.nested_name.clone()
    };

    let mut content = String::new();
    if !spec.package.is_empty() {
        let _ = writeln!(content, "package {};", spec.package);
        let _ = writeln!(content);
    }
    if !imports.is_empty() {
        for import in &imports {
            let _ = writeln!(content, "import {import};");
        }
        let _ = writeln!(content);
    }
    let _ = writeln!(content, "public interface {} extends {base_ref}<{model_ref}> {{", spec.name);
    let _ = writeln!(content, "}}");
    content
}

fn needs_import(package: &str, target: &str) -> bool {
    !package.is_empty() && package != target && package != "java.lang"
}

/// Render and write one mapper.
pub fn emit(filer: &mut dyn Filer, spec: &MapperSpec) -> Result<WriteStatus, EmitError> {
    let body = render(spec);
    filer
        .write_source(&spec.package, &spec.name, &body)
        .map_err(|source| EmitError {
            package: spec.package.clone(),
            name: spec.name.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::BaseInterface;
    use crate::types::ModelType;

    fn spec(name: &str, package: &str, base: &str, model_package: &str, nested: &str) -> MapperSpec {
        let (base_package, base_name) = base.rsplit_once('.').unwrap();
        MapperSpec {
            name: name.to_string(),
            package: package.to_string(),
            base: BaseInterface {
                package: base_package.to_string(),
                simple_name: base_name.to_string(),
            },
            model: ModelType {
                qualified_name: qualify(model_package, nested),
                package: model_package.to_string(),
                nested_name: nested.to_string(),
            },
        }
    }

    #[test]
    fn test_render_basic() {
        let body = render(&spec(
            "OrderMapper",
            "com.example.mapper",
            "com.base.GenericMapper",
            "com.example.model",
            "Order",
        ));
        assert_eq!(
            body,
            "package com.example.mapper;\n\
             \n\
             import com.base.GenericMapper;\n\
             import com.example.model.Order;\n\
             \n\
             public interface OrderMapper extends GenericMapper<Order> {\n\
             }\n"
        );
    }

    #[test]
    fn test_render_nested_model() {
        let body = render(&spec(
            "order$OrderMapper",
            "a.b.mapper",
            "a.base.GenericMapper",
            "a.b.model",
            "order.Order",
        ));
        assert!(body.contains("import a.b.model.order;\n"));
        assert!(body.contains("public interface order$OrderMapper extends GenericMapper<order.Order> {\n"));
    }

    #[test]
    fn test_render_same_package_needs_no_import() {
        let body = render(&spec("OrderMapper", "app", "app.GenericMapper", "app", "Order"));
        assert_eq!(body, "package app;\n\npublic interface OrderMapper extends GenericMapper<Order> {\n}\n");
    }

    #[test]
    fn test_render_name_clash_uses_qualified_model() {
        let body = render(&spec("Mapper", "a.mapper", "a.base.Mapper", "a.model", "Mapper"));
        assert!(body.contains("extends a.base.Mapper<a.model.Mapper>"));
        assert!(!body.contains("import"));

        let body = render(&spec("XMapper", "a.mapper", "a.base.Repository", "a.model", "Repository"));
        assert!(body.contains("import a.base.Repository;\n"));
        assert!(body.contains("extends Repository<a.model.Repository>"));
    }

    #[test]
    fn test_memory_filer_overwrites_by_key() {
        let mut filer = MemoryFiler::new();
        assert_eq!(filer.write_source("p", "A", "one").unwrap(), WriteStatus::Written);
        assert_eq!(filer.write_source("p", "A", "one").unwrap(), WriteStatus::Unchanged);
        assert_eq!(filer.write_source("p", "A", "two").unwrap(), WriteStatus::Written);
        assert_eq!(filer.len(), 1);
        assert_eq!(filer.get("p", "A"), Some("two"));
        assert_eq!(filer.names(), vec!["p.A".to_string()]);
    }

    #[test]
    fn test_fs_filer_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut filer = FsFiler::new(dir.path());
        let spec = spec("OrderMapper", "com.example.mapper", "com.base.GenericMapper", "com.example.model", "Order");

        assert_eq!(emit(&mut filer, &spec).unwrap(), WriteStatus::Written);
        let path = dir.path().join("com/example/mapper/OrderMapper.java");
        let first = std::fs::read(&path).unwrap();

        assert_eq!(emit(&mut filer, &spec).unwrap(), WriteStatus::Unchanged);
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_fs_filer_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the package directory should be
        std::fs::write(dir.path().join("com"), "").unwrap();
        let mut filer = FsFiler::new(dir.path());
        let spec = spec("OrderMapper", "com.example", "com.base.GenericMapper", "com.model", "Order");

        let err = emit(&mut filer, &spec).unwrap_err();
        assert_eq!(err.name, "OrderMapper");
        assert_eq!(err.package, "com.example");
    }
}
