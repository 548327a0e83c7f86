//! A single-document semantic model built from declarations in the tree.

use super::{SemanticModel, TypeRef};
use crate::error::Result;
use crate::lang::{CSharp, Language};
use crate::syntax::nodes::{
    arguments_of, descendants, encloses, has_default_value, initializer_of, invoked_name, name_of,
    parameters_of, parent_of_kind, type_node_of,
};
use crate::syntax::{Document, TextSpan, named_children, operator_text, unwrap_parens};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor};

const SCOPES: &[&str] = &[
    "block",
    "switch_section",
    "for_statement",
    "foreach_statement",
    "using_statement",
    "method_declaration",
    "constructor_declaration",
    "local_function_statement",
    "lambda_expression",
    "class_declaration",
    "struct_declaration",
    "record_declaration",
    "interface_declaration",
    "compilation_unit",
];

const METHOD_LIKE: &[&str] = &[
    "method_declaration",
    "local_function_statement",
    "constructor_declaration",
];

const VALUE_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "short", "ushort", "int", "uint", "long", "ulong", "char", "float",
    "double", "decimal", "nint", "nuint", "Boolean", "Byte", "SByte", "Int16", "UInt16", "Int32",
    "UInt32", "Int64", "UInt64", "Char", "Single", "Double", "Decimal", "IntPtr", "UIntPtr",
    "DateTime", "DateTimeOffset", "TimeSpan", "Guid",
];

/// How many `var` initializers are followed before a type is given up on.
const MAX_VAR_DEPTH: usize = 16;

/// Which declarations a name may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    Any,
    /// Fields and properties, for `this.x` and `base.x`.
    Members,
}

fn is_member(declared: Node<'_>) -> bool {
    match declared.kind() {
        "property_declaration" => true,
        "variable_declarator" => declared
            .parent()
            .and_then(|declaration| declaration.parent())
            .is_some_and(|p| p.kind() == "field_declaration" || p.kind() == "event_field_declaration"),
        _ => false,
    }
}

/// Answers semantic queries from the declarations of one document.
///
/// Locals, parameters, fields and properties are resolved by name through
/// enclosing scopes; `var` takes the type of its initializer. Overloads are
/// the method declarations of the same document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntacticModel;

impl SyntacticModel {
    pub fn new() -> Self {
        Self
    }

    fn resolve_name(
        &self,
        doc: &Document,
        usage: Node<'_>,
        name: &str,
        lookup: Lookup,
        depth: usize,
    ) -> Option<TypeRef> {
        let mut best: Option<(usize, usize, TypeRef)> = None;
        for node in descendants(doc.root()) {
            let declared = match node.kind() {
                "variable_declarator" | "parameter" | "property_declaration" => node,
                _ => continue,
            };
            if lookup == Lookup::Members && !is_member(declared) {
                continue;
            }
            let Some(ident) = name_of(declared) else {
                continue;
            };
            if doc.node_text(ident) != name || ident.id() == usage.id() {
                continue;
            }
            // `var x = x` and `var x = this.x` never name the declarator itself.
            if initializer_of(declared).is_some_and(|init| encloses(init, usage)) {
                continue;
            }
            let Some(scope) = parent_of_kind(declared, SCOPES) else {
                continue;
            };
            if !encloses(scope, usage) {
                continue;
            }
            let is_local = declared.kind() == "variable_declarator"
                && parent_of_kind(declared, &["local_declaration_statement"]).is_some();
            if is_local && declared.start_byte() > usage.start_byte() {
                continue;
            }
            let Some(ty) = self.declared_type(doc, declared, depth) else {
                continue;
            };
            let scope_size = scope.end_byte() - scope.start_byte();
            let better = match &best {
                None => true,
                Some((size, start, _)) => {
                    scope_size < *size || (scope_size == *size && declared.start_byte() > *start)
                }
            };
            if better {
                best = Some((scope_size, declared.start_byte(), ty));
            }
        }
        best.map(|(_, _, ty)| ty)
    }

    fn declared_type(&self, doc: &Document, declared: Node<'_>, depth: usize) -> Option<TypeRef> {
        let ty = type_node_of(declared)?;
        let text = doc.node_text(ty);
        if text == "var" {
            if depth >= MAX_VAR_DEPTH {
                tracing::debug!(depth, "gave up following var initializers");
                return None;
            }
            return initializer_of(declared).and_then(|init| self.type_at(doc, init, depth + 1));
        }
        Some(TypeRef::new(text))
    }

    fn type_at(&self, doc: &Document, expr: Node<'_>, depth: usize) -> Option<TypeRef> {
        let expr = unwrap_parens(expr);
        let text = doc.node_text(expr);
        if let Some(ty) = literal_type(expr.kind(), text) {
            return Some(TypeRef::new(ty));
        }
        match expr.kind() {
            "identifier" => self.resolve_name(doc, expr, text, Lookup::Any, depth),
            "cast_expression" | "default_expression" | "object_creation_expression" => expr
                .child_by_field_name("type")
                .or_else(|| named_children(expr).into_iter().next())
                .map(|ty| TypeRef::new(doc.node_text(ty))),
            "prefix_unary_expression" if text.trim_start().starts_with('!') => {
                Some(TypeRef::new("bool"))
            }
            "is_pattern_expression" | "is_expression" => Some(TypeRef::new("bool")),
            "binary_expression" => match operator_text(doc, expr)? {
                "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => Some(TypeRef::new("bool")),
                _ => None,
            },
            "member_access_expression" => {
                let target = expr.child_by_field_name("expression")?;
                let name = expr.child_by_field_name("name")?;
                match doc.node_text(target) {
                    "this" | "base" => {
                        self.resolve_name(doc, name, doc.node_text(name), Lookup::Members, depth)
                    }
                    _ => None,
                }
            }
            "invocation_expression" => {
                let function = expr.child_by_field_name("function")?;
                if function.kind() == "identifier" {
                    self.method_return_type(doc, doc.node_text(function))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn method_return_type(&self, doc: &Document, name: &str) -> Option<TypeRef> {
        descendants(doc.root())
            .into_iter()
            .filter(|n| n.kind() == "method_declaration" || n.kind() == "local_function_statement")
            .find(|n| name_of(*n).is_some_and(|id| doc.node_text(id) == name))
            .and_then(type_node_of)
            .map(|ty| TypeRef::new(doc.node_text(ty)))
    }

    fn declared_value_types(&self, doc: &Document) -> Vec<String> {
        descendants(doc.root())
            .into_iter()
            .filter(|n| n.kind() == "struct_declaration" || n.kind() == "enum_declaration")
            .filter_map(name_of)
            .map(|id| doc.node_text(id).to_string())
            .collect()
    }

    fn identifier_spans(&self, doc: &Document, name: &str) -> Result<Vec<TextSpan>> {
        let query = CSharp.query("(identifier) @id")?;
        let mut cursor = QueryCursor::new();
        let source = doc.text().as_bytes();
        let mut spans = Vec::new();

        let mut matches = cursor.matches(&query, doc.root(), source);
        while let Some(m) = matches.next() {
            for capture in m.captures {
                if capture.node.utf8_text(source).is_ok_and(|text| text == name) {
                    spans.push(doc.span_of(capture.node));
                }
            }
        }
        spans.sort();
        spans.dedup();
        Ok(spans)
    }
}

fn literal_type(kind: &str, text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();
    match kind {
        "boolean_literal" => Some("bool"),
        "character_literal" => Some("char"),
        "string_literal" | "verbatim_string_literal" | "raw_string_literal"
        | "interpolated_string_expression" => Some("string"),
        "integer_literal" => Some(
            if lower.ends_with("ul") || lower.ends_with("lu") {
                "ulong"
            } else if lower.ends_with('l') {
                "long"
            } else if lower.ends_with('u') {
                "uint"
            } else {
                "int"
            },
        ),
        "real_literal" => Some(if lower.ends_with('f') {
            "float"
        } else if lower.ends_with('m') {
            "decimal"
        } else {
            "double"
        }),
        _ => None,
    }
}

impl SemanticModel for SyntacticModel {
    fn type_of(&self, doc: &Document, expr: Node<'_>) -> Option<TypeRef> {
        self.type_at(doc, expr, 0)
    }

    fn parameter_types(
        &self,
        doc: &Document,
        call: Node<'_>,
        index: usize,
        name: Option<&str>,
    ) -> Vec<TypeRef> {
        let Some(callee) = invoked_name(doc, call) else {
            return Vec::new();
        };
        let declaration_kinds: &[&str] = if call.kind() == "object_creation_expression" {
            &["constructor_declaration"]
        } else {
            &["method_declaration", "local_function_statement"]
        };
        let argc = arguments_of(call).len();

        descendants(doc.root())
            .into_iter()
            .filter(|n| declaration_kinds.contains(&n.kind()))
            .filter(|n| name_of(*n).is_some_and(|id| doc.node_text(id) == callee))
            .filter_map(|method| {
                let params = parameters_of(method);
                let required = params.iter().filter(|p| !has_default_value(**p)).count();
                if argc < required || argc > params.len() {
                    return None;
                }
                let param = match name {
                    Some(name) => params
                        .iter()
                        .find(|p| name_of(**p).is_some_and(|id| doc.node_text(id) == name))?,
                    None => params.get(index)?,
                };
                type_node_of(*param).map(|ty| TypeRef::new(doc.node_text(ty)))
            })
            .collect()
    }

    fn is_value_type(&self, doc: &Document, ty: &TypeRef) -> bool {
        if ty.is_nullable() {
            return false;
        }
        if ty.is_tuple() {
            return true;
        }
        let name = ty.display();
        let name = name.strip_prefix("System.").unwrap_or(name);
        VALUE_TYPES.contains(&name) || self.declared_value_types(doc).iter().any(|d| d == name)
    }

    fn find_references(&self, doc: &Document, name: &str) -> Vec<TextSpan> {
        match self.identifier_spans(doc, name) {
            Ok(spans) => spans,
            Err(e) => {
                tracing::warn!(error = %e, "identifier query failed");
                Vec::new()
            }
        }
    }

    fn enclosing_return_type(&self, doc: &Document, node: Node<'_>) -> Option<TypeRef> {
        let method = parent_of_kind(node, METHOD_LIKE)?;
        if method.kind() == "constructor_declaration" {
            return None;
        }
        type_node_of(method).map(|ty| TypeRef::new(doc.node_text(ty)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ancestor_of_kind;

    fn node_at<'d>(doc: &'d Document, needle: &str, kinds: &[&str]) -> Node<'d> {
        let start = doc.text().find(needle).unwrap();
        ancestor_of_kind(doc, TextSpan::new(start, needle.len()), kinds).unwrap()
    }

    #[test]
    fn test_type_of_local_and_parameter() {
        let source = "class C { void M(bool? flag) { int count = 1; var name = \"x\"; Use(flag, count, name); } }";
        let doc = Document::parse(source).unwrap();
        let model = SyntacticModel::new();
        let call = node_at(&doc, "Use(", &["invocation_expression"]);
        let args: Vec<_> = arguments_of(call)
            .into_iter()
            .map(|a| crate::syntax::nodes::argument_expression(a).unwrap())
            .collect();

        assert_eq!(model.type_of(&doc, args[0]), Some(TypeRef::new("bool?")));
        assert_eq!(model.type_of(&doc, args[1]), Some(TypeRef::new("int")));
        assert_eq!(model.type_of(&doc, args[2]), Some(TypeRef::new("string")));
    }

    #[test]
    fn test_type_of_literals_and_casts() {
        let source = "class C { void M() { Use(true, 5L, (bool?)o, 1.5m); } }";
        let doc = Document::parse(source).unwrap();
        let model = SyntacticModel::new();
        let call = node_at(&doc, "Use(", &["invocation_expression"]);
        let types: Vec<_> = arguments_of(call)
            .into_iter()
            .map(|a| {
                let expr = crate::syntax::nodes::argument_expression(a).unwrap();
                model.type_of(&doc, expr).map(|t| t.display().to_string())
            })
            .collect();

        assert_eq!(
            types,
            vec![
                Some("bool".to_string()),
                Some("long".to_string()),
                Some("bool?".to_string()),
                Some("decimal".to_string()),
            ]
        );
    }

    #[test]
    fn test_inner_scope_shadows_field() {
        let source = "class C { string value; void M() { int value = 0; Use(value); } }";
        let doc = Document::parse(source).unwrap();
        let model = SyntacticModel::new();
        let call = node_at(&doc, "Use(", &["invocation_expression"]);
        let arg = crate::syntax::nodes::argument_expression(arguments_of(call)[0]).unwrap();

        assert_eq!(model.type_of(&doc, arg), Some(TypeRef::new("int")));
    }

    #[test]
    fn test_parameter_types_across_overloads() {
        let source = "class C {\n    void Run(int a) { }\n    void Run(long a) { }\n    void Run(int a, int b) { }\n    void Go() { Run(null); }\n}";
        let doc = Document::parse(source).unwrap();
        let model = SyntacticModel::new();
        let call = node_at(&doc, "Run(null)", &["invocation_expression"]);

        let types = model.parameter_types(&doc, call, 0, None);
        assert_eq!(types, vec![TypeRef::new("int"), TypeRef::new("long")]);
    }

    #[test]
    fn test_value_types() {
        let doc = Document::parse("struct Point { } enum Color { Red } class Box { }").unwrap();
        let model = SyntacticModel::new();

        assert!(model.is_value_type(&doc, &TypeRef::new("int")));
        assert!(model.is_value_type(&doc, &TypeRef::new("System.Int32")));
        assert!(model.is_value_type(&doc, &TypeRef::new("Point")));
        assert!(model.is_value_type(&doc, &TypeRef::new("Color")));
        assert!(!model.is_value_type(&doc, &TypeRef::new("Box")));
        assert!(!model.is_value_type(&doc, &TypeRef::new("int?")));
        assert!(!model.is_value_type(&doc, &TypeRef::new("string")));
    }

    #[test]
    fn test_find_references() {
        let source = "class C { int _count; void M() { _count = _count + 1; } }";
        let doc = Document::parse(source).unwrap();
        let spans = SyntacticModel::new().find_references(&doc, "_count");
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| doc.slice(*s) == "_count"));
    }

    #[test]
    fn test_enclosing_return_type() {
        let source = "class C { (int x, int y) M() { return (1, 2); } }";
        let doc = Document::parse(source).unwrap();
        let ret = node_at(&doc, "return", &["return_statement"]);
        let ty = SyntacticModel::new().enclosing_return_type(&doc, ret).unwrap();
        assert_eq!(ty.tuple_element_names().unwrap().len(), 2);
    }

    /// Type of the identifier starting at the first occurrence of `needle`.
    fn local_type(source: &str, needle: &str) -> Option<TypeRef> {
        let doc = Document::parse(source).unwrap();
        let start = doc.text().find(needle).unwrap();
        let usage = ancestor_of_kind(&doc, TextSpan::new(start, 1), &["identifier"]).unwrap();
        SyntacticModel::new().type_of(&doc, usage)
    }

    #[test]
    fn test_var_initialized_from_this_member() {
        let source = "class C { bool x; void M() { var x = this.x; if (x == true) { } } }";
        assert_eq!(local_type(source, "x =="), Some(TypeRef::new("bool")));
    }

    #[test]
    fn test_this_member_ignores_locals() {
        let source = "class C { long x; void M() { int x = 1; Use(this.x); } }";
        let doc = Document::parse(source).unwrap();
        let access = node_at(&doc, "this.x", &["member_access_expression"]);
        assert_eq!(SyntacticModel::new().type_of(&doc, access), Some(TypeRef::new("long")));
    }

    #[test]
    fn test_self_referential_var_is_unresolved() {
        let source = "class C { void M() { var x = x; if (x == true) { } } }";
        assert_eq!(local_type(source, "x =="), None);
    }

    #[test]
    fn test_var_chain_resolves() {
        let source = "class C { void M() { var a = 1L; var b = a; var c = b; Use(c); } }";
        assert_eq!(local_type(source, "c)"), Some(TypeRef::new("long")));
    }
}
