//! Declaration-level view of a Java compilation unit.
//!
//! The source is parsed with tree-sitter; only the package, imports and type
//! declarations (with their annotations and member types) are read from the
//! tree. Method bodies, initializers and local classes are never visited.

use thiserror::Error;
use tree_sitter::{LanguageError, Node, Parser};

use super::elements::annotation_elements;
use crate::types::{Annotation, TypeDecl, TypeKind, qualify};

/// Declarations found in one `.java` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub package: String,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `import a.b.C;`
    Single(String),
    /// `import a.b.*;`
    Wildcard(String),
}

/// Source that does not parse as Java.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// A tree-sitter parser loaded with the Java grammar, reusable across files.
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self, LanguageError> {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse one compilation unit. Any error or missing node in the tree
    /// rejects the whole file.
    pub fn parse(&mut self, source: &str) -> Result<CompilationUnit, SyntaxError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::new(1, "parser produced no tree"))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(first_error(root, source));
        }
        Ok(UnitReader::new(source).read(root))
    }
}

/// Named children of `node`, comments excluded.
pub(super) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn type_kind(kind: &str) -> Option<TypeKind> {
    match kind {
        "class_declaration" => Some(TypeKind::Class),
        "interface_declaration" => Some(TypeKind::Interface),
        "enum_declaration" => Some(TypeKind::Enum),
        "record_declaration" => Some(TypeKind::Record),
        "annotation_type_declaration" => Some(TypeKind::Annotation),
        _ => None,
    }
}

/// Dotted name written as `a.b.C`, possibly spread over several tokens.
fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn first_error(root: Node<'_>, source: &str) -> SyntaxError {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let line = node.start_position().row + 1;
        if node.is_missing() {
            return SyntaxError::new(line, format!("missing {}", node.kind()));
        }
        if node.is_error() {
            let text = source[node.byte_range()].lines().next().unwrap_or_default().trim();
            let snippet: String = text.chars().take(40).collect();
            return SyntaxError::new(line, format!("unexpected `{snippet}`"));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    SyntaxError::new(root.start_position().row + 1, "syntax error")
}

struct UnitReader<'s> {
    source: &'s str,
    package: String,
    imports: Vec<Import>,
}

impl<'s> UnitReader<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            package: String::new(),
            imports: Vec::new(),
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn read(mut self, root: Node<'_>) -> CompilationUnit {
        let mut types = Vec::new();
        for child in named_children(root) {
            match child.kind() {
                "package_declaration" => self.package = self.dotted_name(child).unwrap_or_default(),
                "import_declaration" => self.import(child),
                kind => {
                    if let Some(kind) = type_kind(kind) {
                        types.push(self.type_decl(child, kind, None));
                    }
                }
            }
        }
        CompilationUnit {
            package: self.package,
            imports: self.imports,
            types,
        }
    }

    /// The `identifier` or `scoped_identifier` child of a package or import.
    fn dotted_name(&self, node: Node<'_>) -> Option<String> {
        named_children(node)
            .into_iter()
            .find(|child| matches!(child.kind(), "identifier" | "scoped_identifier"))
            .map(|name| compact(self.text(name)))
    }

    fn import(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        let tokens: Vec<&str> = node.children(&mut cursor).map(|child| child.kind()).collect();
        if tokens.contains(&"static") {
            return;
        }
        let Some(name) = self.dotted_name(node) else {
            return;
        };
        self.imports.push(if tokens.contains(&"asterisk") {
            Import::Wildcard(name)
        } else {
            Import::Single(name)
        });
    }

    fn type_decl(&self, node: Node<'_>, kind: TypeKind, enclosing: Option<&str>) -> TypeDecl {
        let name = node
            .child_by_field_name("name")
            .map(|name| self.text(name))
            .unwrap_or_default();
        let nested_name = match enclosing {
            Some(outer) => format!("{outer}.{name}"),
            None => name.to_string(),
        };

        let annotations = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "modifiers")
            .flat_map(|modifiers| named_children(modifiers))
            .filter_map(|modifier| self.annotation(modifier))
            .collect();

        let members = node
            .child_by_field_name("body")
            .map(|body| self.members(body, &nested_name))
            .unwrap_or_default();

        TypeDecl {
            package: self.package.clone(),
            nested_name,
            kind,
            annotations,
            members,
        }
    }

    /// Member types declared directly in a type body.
    fn members(&self, body: Node<'_>, enclosing: &str) -> Vec<TypeDecl> {
        let mut members = Vec::new();
        for child in named_children(body) {
            if child.kind() == "enum_body_declarations" {
                members.extend(self.members(child, enclosing));
            } else if let Some(kind) = type_kind(child.kind()) {
                members.push(self.type_decl(child, kind, Some(enclosing)));
            }
        }
        members
    }

    fn annotation(&self, node: Node<'_>) -> Option<Annotation> {
        if !matches!(node.kind(), "marker_annotation" | "annotation") {
            return None;
        }
        let name = compact(self.text(node.child_by_field_name("name")?));
        let elements = node
            .child_by_field_name("arguments")
            .map(|arguments| annotation_elements(arguments, self.source))
            .unwrap_or_default();
        Some(Annotation {
            candidates: self.resolve(&name),
            name,
            elements,
        })
    }

    /// Fully qualified names an annotation written as `name` may denote.
    fn resolve(&self, name: &str) -> Vec<String> {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        let imported = self.imports.iter().find_map(|import| match import {
            Import::Single(path) if path.rsplit('.').next() == Some(head) => Some(path.as_str()),
            _ => None,
        });

        let mut candidates = Vec::new();
        if let Some(rest) = rest {
            candidates.push(name.to_string());
            if let Some(path) = imported {
                candidates.push(format!("{path}.{rest}"));
            }
            return candidates;
        }

        if let Some(path) = imported {
            candidates.push(path.to_string());
            return candidates;
        }

        candidates.push(qualify(&self.package, name));
        for import in &self.imports {
            if let Import::Wildcard(package) = import {
                candidates.push(format!("{package}.{name}"));
            }
        }
        candidates.push(format!("java.lang.{name}"));
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementValue;

    fn parse(source: &str) -> CompilationUnit {
        JavaParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn test_package_imports_and_types() {
        let unit = parse(
            r#"
            package com.example.model;

            import java.util.List;
            import javax.persistence.*;
            import static java.util.Collections.emptyList;

            @Table(name = "orders")
            public class Order {
                private List<String> lines = emptyList();
            }

            class Helper {}
            "#,
        );

        assert_eq!(unit.package, "com.example.model");
        assert_eq!(
            unit.imports,
            vec![
                Import::Single("java.util.List".to_string()),
                Import::Wildcard("javax.persistence".to_string()),
            ]
        );
        assert_eq!(unit.types.len(), 2);

        let order = &unit.types[0];
        assert_eq!(order.qualified_name(), "com.example.model.Order");
        assert!(order.has_annotation("javax.persistence.Table"));
        assert_eq!(
            order.annotations[0].element("name"),
            Some(&ElementValue::Str("orders".to_string()))
        );
        assert!(unit.types[1].annotations.is_empty());
    }

    #[test]
    fn test_single_import_wins() {
        let unit = parse(
            r#"
            package a;
            import javax.persistence.Table;
            import other.*;
            @Table class A {}
            @other.Entity class B {}
            "#,
        );
        assert_eq!(unit.types[0].annotations[0].candidates, vec!["javax.persistence.Table".to_string()]);
        assert!(unit.types[1].has_annotation("other.Entity"));
        assert!(!unit.types[1].has_annotation("a.Entity"));
    }

    #[test]
    fn test_same_package_annotation() {
        let unit = parse("package a.b; @Marker class A {}");
        assert!(unit.types[0].has_annotation("a.b.Marker"));
    }

    #[test]
    fn test_nested_types() {
        let unit = parse(
            r#"
            package a.b.model;
            public class Outer {
                private Class<?> type = Outer.class;

                @Deprecated
                public void run() {
                    Runnable r = new Runnable() { public void run() {} };
                    class Local {}
                }

                @Table
                public static class Inner {
                    enum State { OPEN, CLOSED; interface Visitor {} }
                }

                record Point(int x, int y) implements Comparable<Point> {
                    public int compareTo(Point o) { return 0; }
                }
            }
            "#,
        );

        let outer = &unit.types[0];
        let names: Vec<_> = outer.walk().iter().map(|d| d.nested_name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "Outer",
                "Outer.Inner",
                "Outer.Inner.State",
                "Outer.Inner.State.Visitor",
                "Outer.Point",
            ]
        );
        assert!(outer.members[0].has_annotation("a.b.model.Table"));
        assert!(outer.annotations.is_empty());
        assert_eq!(outer.members[1].kind, TypeKind::Record);
    }

    #[test]
    fn test_annotations_stay_on_their_declaration() {
        let unit = parse(
            r#"
            package a;
            class A {
                @Table
                void f() {}
                class B {}
                @Table
                int field = 1;
                class C {}
            }
            "#,
        );
        let members = &unit.types[0].members;
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.annotations.is_empty()));
    }

    #[test]
    fn test_annotation_declaration() {
        let unit = parse(
            r#"
            package com.wesd.mybatis.annotation;
            @Target(ElementType.TYPE)
            public @interface EnableAutoGenMapper {
                String[] modelPackageName();
                String mapperPrefix() default "";
            }
            "#,
        );
        assert_eq!(unit.types[0].kind, TypeKind::Annotation);
        assert_eq!(unit.types[0].simple_name(), "EnableAutoGenMapper");
    }

    #[test]
    fn test_default_package() {
        let unit = parse("@Table class A {}");
        assert_eq!(unit.package, "");
        assert_eq!(unit.types[0].qualified_name(), "A");
        assert!(unit.types[0].has_annotation("Table"));
    }

    #[test]
    fn test_realistic_entity_sources() {
        let unit = parse(
            r#"
            package com.shop.model;

            import javax.persistence.*;
            import java.util.*;

            /** Marked with {@code @Table} in docs only: "{". */
            @Entity
            @Table(name = "orders", indexes = {@Index(name = "idx_customer", columnList = "customer_id")})
            public class Order implements Comparable<Order> {
                static final Map<String, Integer> CODES = new HashMap<>();
                static { CODES.put("{", 1); }

                private char open = '{';
                private String close = "}";

                enum Status {
                    NEW { @Override String label() { return "new"; } },
                    PAID;
                    String label() { return name(); }
                }

                public <T extends Comparable<T>> T max(List<T> items) { return Collections.max(items); }

                @Override
                public int compareTo(Order other) { return 0; }
            }

            @Table
            sealed interface Shape permits Circle {}

            @Table
            final class Circle implements Shape {}
            "#,
        );

        let marked: Vec<_> = unit
            .types
            .iter()
            .flat_map(TypeDecl::walk)
            .filter(|decl| decl.has_annotation("javax.persistence.Table"))
            .map(|decl| decl.nested_name.as_str())
            .collect();
        assert_eq!(marked, vec!["Order", "Shape", "Circle"]);
        assert_eq!(unit.types[0].members[0].nested_name, "Order.Status");
    }

    #[test]
    fn test_unbalanced_body_is_rejected() {
        let error = JavaParser::new()
            .unwrap()
            .parse("package a;\nclass A {\n void f() {")
            .unwrap_err();
        assert!(error.line >= 1);
        assert!(!error.message.is_empty());
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = JavaParser::new().unwrap();
        assert!(parser.parse("class A {").is_err());
        let unit = parser.parse("package p; class B {}").unwrap();
        assert_eq!(unit.types[0].qualified_name(), "p.B");
    }
}
