//! Declared-type model and the read-only repository the pipeline queries.

use std::collections::BTreeMap;

use crate::error::LookupError;

/// An annotation written on a declaration.
///
/// `candidates` holds every fully qualified name the written name may refer to
/// once imports are taken into account; a fully qualified usage has exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub candidates: Vec<String>,
    /// Element values in source order. A lone value is named `value`.
    pub elements: Vec<(String, ElementValue)>,
}

impl Annotation {
    pub fn qualified(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            candidates: vec![name.clone()],
            name,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, name: impl Into<String>, value: ElementValue) -> Self {
        self.elements.push((name.into(), value));
        self
    }

    pub fn element(&self, name: &str) -> Option<&ElementValue> {
        self.elements
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn matches(&self, qualified: &str) -> bool {
        self.candidates.iter().any(|candidate| candidate == qualified)
    }
}

/// An annotation element value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementValue {
    /// String literal, concatenations of literals folded.
    Str(String),
    Array(Vec<ElementValue>),
    /// Anything else (constants, class literals, nested annotations), as source text.
    Expr(String),
}

impl ElementValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElementValue::Str(value) => Some(value),
            _ => None,
        }
    }

    /// A single string or an array of strings, as Java allows for `String[]` elements.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        match self {
            ElementValue::Str(value) => Some(vec![value.clone()]),
            ElementValue::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            ElementValue::Expr(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A type declared in a package, with its member types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Owning package (empty for the default package).
    pub package: String,
    /// Name relative to the package, e.g. `Outer.Inner`.
    pub nested_name: String,
    pub kind: TypeKind,
    pub annotations: Vec<Annotation>,
    pub members: Vec<TypeDecl>,
}

impl TypeDecl {
    pub fn new(package: impl Into<String>, nested_name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            package: package.into(),
            nested_name: nested_name.into(),
            kind,
            annotations: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn class(package: impl Into<String>, nested_name: impl Into<String>) -> Self {
        Self::new(package, nested_name, TypeKind::Class)
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_member(mut self, member: TypeDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.nested_name)
    }

    pub fn simple_name(&self) -> &str {
        self.nested_name.rsplit('.').next().unwrap_or(&self.nested_name)
    }

    pub fn annotation(&self, qualified: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|annotation| annotation.matches(qualified))
    }

    pub fn has_annotation(&self, qualified: &str) -> bool {
        self.annotation(qualified).is_some()
    }

    /// This declaration followed by every member type, depth first.
    pub fn walk(&self) -> Vec<&TypeDecl> {
        let mut out = vec![self];
        for member in &self.members {
            out.extend(member.walk());
        }
        out
    }
}

/// A type selected as a model. Ordered so sets deduplicate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModelType {
    pub qualified_name: String,
    pub package: String,
    pub nested_name: String,
}

impl ModelType {
    /// The outermost enclosing type, which is what an import names.
    pub fn outer_name(&self) -> &str {
        self.nested_name.split('.').next().unwrap_or(&self.nested_name)
    }
}

impl From<&TypeDecl> for ModelType {
    fn from(decl: &TypeDecl) -> Self {
        Self {
            qualified_name: decl.qualified_name(),
            package: decl.package.clone(),
            nested_name: decl.nested_name.clone(),
        }
    }
}

/// Read-only view of the program's declared types.
pub trait TypeRepository {
    /// Top-level types declared in `package`.
    fn declared_types(&self, package: &str) -> Result<&[TypeDecl], LookupError>;

    /// Every declaration (nested ones included) carrying `annotation`.
    fn annotated_with(&self, annotation: &str) -> Vec<&TypeDecl>;
}

/// Type repository held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypes {
    packages: BTreeMap<String, Vec<TypeDecl>>,
}

impl InMemoryTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a package that may have no types of its own.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.packages.entry(package.into()).or_default();
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.insert(decl);
        self
    }

    pub fn insert(&mut self, decl: TypeDecl) {
        self.packages.entry(decl.package.clone()).or_default().push(decl);
    }

    pub fn declare_package(&mut self, package: impl Into<String>) {
        self.packages.entry(package.into()).or_default();
    }

    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn type_count(&self) -> usize {
        self.packages
            .values()
            .flatten()
            .map(|decl| decl.walk().len())
            .sum()
    }
}

impl TypeRepository for InMemoryTypes {
    fn declared_types(&self, package: &str) -> Result<&[TypeDecl], LookupError> {
        self.packages
            .get(package)
            .map(Vec::as_slice)
            .ok_or_else(|| LookupError::new(package))
    }

    fn annotated_with(&self, annotation: &str) -> Vec<&TypeDecl> {
        self.packages
            .values()
            .flatten()
            .flat_map(TypeDecl::walk)
            .filter(|decl| decl.has_annotation(annotation))
            .collect()
    }
}

/// Join a package and a relative name with `.`, honoring the default package.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}
