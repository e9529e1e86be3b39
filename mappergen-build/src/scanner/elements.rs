//! Annotation element values read from an `annotation_argument_list` node.
//!
//! String literals, arrays and `+` chains of string literals become typed
//! values. Anything else (constant references, class literals, nested
//! annotations) is kept as its source text.

use tree_sitter::Node;

use super::parser::named_children;
use crate::types::ElementValue;

/// Element name of a lone argument, as in `@A("x")`.
const VALUE: &str = "value";

pub(crate) fn annotation_elements(arguments: Node<'_>, source: &str) -> Vec<(String, ElementValue)> {
    named_children(arguments)
        .into_iter()
        .map(|argument| {
            if argument.kind() != "element_value_pair" {
                return (VALUE.to_string(), element_value(argument, source));
            }
            let key = argument
                .child_by_field_name("key")
                .map(|key| source[key.byte_range()].to_string())
                .unwrap_or_default();
            let value = argument
                .child_by_field_name("value")
                .map(|value| element_value(value, source))
                .unwrap_or_else(|| ElementValue::Expr(String::new()));
            (key, value)
        })
        .collect()
}

fn element_value(node: Node<'_>, source: &str) -> ElementValue {
    if node.kind() == "element_value_array_initializer" {
        return ElementValue::Array(
            named_children(node)
                .into_iter()
                .map(|item| element_value(item, source))
                .collect(),
        );
    }
    match string_value(node, source) {
        Some(text) => ElementValue::Str(text),
        None => ElementValue::Expr(source[node.byte_range()].trim().to_string()),
    }
}

/// Value of a string literal or a constant `+` chain of them.
fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "string_literal" => Some(literal_text(node, source)),
        "parenthesized_expression" => string_value(*named_children(node).first()?, source),
        "binary_expression" => {
            let operator = node.child_by_field_name("operator")?;
            if &source[operator.byte_range()] != "+" {
                return None;
            }
            let mut text = string_value(node.child_by_field_name("left")?, source)?;
            text.push_str(&string_value(node.child_by_field_name("right")?, source)?);
            Some(text)
        }
        _ => None,
    }
}

fn literal_text(literal: Node<'_>, source: &str) -> String {
    let mut text = String::new();
    for part in named_children(literal) {
        let raw = &source[part.byte_range()];
        match part.kind() {
            "escape_sequence" => unescape(raw, &mut text),
            _ => text.push_str(raw),
        }
    }
    text
}

fn unescape(sequence: &str, out: &mut String) {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    let decoded = match body {
        "n" => Some('\n'),
        "t" => Some('\t'),
        "r" => Some('\r'),
        "b" => Some('\u{8}'),
        "f" => Some('\u{c}'),
        "s" => Some(' '),
        _ if body.starts_with('u') => {
            u32::from_str_radix(body.trim_start_matches('u'), 16)
                .ok()
                .and_then(char::from_u32)
        }
        _ if !body.is_empty() && body.chars().all(|c| c.is_digit(8)) => {
            u32::from_str_radix(body, 8).ok().and_then(char::from_u32)
        }
        // line continuation inside a text block
        _ if body.starts_with(['\n', '\r']) => return,
        _ => body.chars().next(),
    };
    match decoded {
        Some(c) => out.push(c),
        None => out.push_str(sequence),
    }
}
