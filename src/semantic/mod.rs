//! Semantic queries consumed by providers.
//!
//! Providers only ask questions through [`SemanticModel`]; the crate ships
//! [`SyntacticModel`], which answers them from declarations in the same
//! document. Hosts with a real compiler behind them implement the trait
//! themselves.

mod syntactic;

pub use syntactic::SyntacticModel;

use crate::syntax::{Document, TextSpan, is_valid_identifier};
use std::fmt;
use tree_sitter::Node;

/// A type as written in source, e.g. `int`, `bool?`, `(int x, int y)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    display: String,
}

impl TypeRef {
    /// Creates a type reference, normalising whitespace.
    pub fn new(display: impl AsRef<str>) -> Self {
        let collapsed = display
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            display: collapsed.replace(" ?", "?"),
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Returns true for `T?` and `Nullable<T>`.
    pub fn is_nullable(&self) -> bool {
        self.display.ends_with('?') || self.nullable_generic_argument().is_some()
    }

    /// The underlying type of a nullable type, or the type itself.
    pub fn underlying(&self) -> TypeRef {
        if let Some(inner) = self.display.strip_suffix('?') {
            return TypeRef::new(inner);
        }
        match self.nullable_generic_argument() {
            Some(inner) => TypeRef::new(inner),
            None => self.clone(),
        }
    }

    pub fn is_bool(&self) -> bool {
        matches!(
            self.display.as_str(),
            "bool" | "Boolean" | "System.Boolean"
        )
    }

    pub fn is_nullable_bool(&self) -> bool {
        self.is_nullable() && self.underlying().is_bool()
    }

    pub fn is_tuple(&self) -> bool {
        self.display.starts_with('(') && self.display.ends_with(')')
    }

    /// Element names of a tuple type; `None` entries are unnamed elements.
    pub fn tuple_element_names(&self) -> Option<Vec<Option<String>>> {
        if !self.is_tuple() {
            return None;
        }
        let inner = &self.display[1..self.display.len() - 1];
        let names = split_top_level(inner, |c| c == ',')
            .into_iter()
            .map(|element| {
                let parts = split_top_level(element, char::is_whitespace);
                match parts.as_slice() {
                    [_, .., name] if is_valid_identifier(name) => Some(name.to_string()),
                    _ => None,
                }
            })
            .collect();
        Some(names)
    }

    fn nullable_generic_argument(&self) -> Option<&str> {
        let rest = self
            .display
            .strip_prefix("System.Nullable<")
            .or_else(|| self.display.strip_prefix("Nullable<"))?;
        rest.strip_suffix('>')
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Splits on separators that are not nested inside `()`, `<>` or `[]`.
fn split_top_level(text: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '<' | '[' => depth += 1,
            ')' | '>' | ']' => depth -= 1,
            _ if depth == 0 && is_separator(c) => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Semantic facts about a document, supplied by the host.
pub trait SemanticModel: Send + Sync {
    /// The type of an expression, if it can be determined.
    fn type_of(&self, doc: &Document, expr: Node<'_>) -> Option<TypeRef>;

    /// Parameter types the argument at `index` (or named `name`) may bind to,
    /// one entry per applicable overload.
    fn parameter_types(
        &self,
        doc: &Document,
        call: Node<'_>,
        index: usize,
        name: Option<&str>,
    ) -> Vec<TypeRef>;

    /// Returns true for non-nullable value types.
    fn is_value_type(&self, doc: &Document, ty: &TypeRef) -> bool;

    /// Spans of every reference to `name`, declarations included.
    fn find_references(&self, doc: &Document, name: &str) -> Vec<TextSpan>;

    /// The declared return type of the method-like member enclosing `node`.
    fn enclosing_return_type(&self, doc: &Document, node: Node<'_>) -> Option<TypeRef>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_types() {
        assert!(TypeRef::new("bool?").is_nullable_bool());
        assert!(TypeRef::new("bool ?").is_nullable_bool());
        assert!(TypeRef::new("Nullable<bool>").is_nullable_bool());
        assert!(!TypeRef::new("bool").is_nullable());
        assert_eq!(TypeRef::new("int?").underlying(), TypeRef::new("int"));
    }

    #[test]
    fn test_tuple_element_names() {
        let ty = TypeRef::new("(int x, Dictionary<int, string> map, bool)");
        assert_eq!(
            ty.tuple_element_names().unwrap(),
            vec![Some("x".to_string()), Some("map".to_string()), None]
        );
        assert!(TypeRef::new("int").tuple_element_names().is_none());
    }
}
