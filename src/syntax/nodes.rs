//! Shape helpers for C# declarations, invocations and arguments.
//!
//! These tolerate small differences between grammar versions (inlined
//! `=` initializers versus `equals_value_clause`, `name:` fields versus
//! `name_colon` nodes) so providers can ask for a part by meaning.

use super::{Document, children, named_children};
use tree_sitter::Node;

/// Pre-order list of a node and all of its named descendants.
pub fn descendants(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        out.push(current);
        let mut kids = named_children(current);
        kids.reverse();
        stack.extend(kids);
    }
    out
}

/// Returns true if `inner` lies within `outer` (inclusive).
pub fn encloses(outer: Node<'_>, inner: Node<'_>) -> bool {
    outer.start_byte() <= inner.start_byte() && inner.end_byte() <= outer.end_byte()
}

/// Nearest proper ancestor of one of the given kinds.
pub fn parent_of_kind<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// The name identifier of a `variable_declarator`, `parameter` or member.
pub fn name_of(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("name").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "identifier")
    })
}

/// The initializer expression of a `variable_declarator`.
pub fn initializer_of(declarator: Node<'_>) -> Option<Node<'_>> {
    if let Some(value) = declarator.child_by_field_name("value") {
        return Some(value);
    }
    let kids = children(declarator);
    for (i, child) in kids.iter().enumerate() {
        if child.kind() == "equals_value_clause" {
            return named_children(*child).into_iter().last();
        }
        if child.kind() == "=" {
            return kids[i + 1..].iter().copied().find(|n| n.is_named());
        }
    }
    None
}

/// The declarators of a `variable_declaration`.
pub fn declarators_of(declaration: Node<'_>) -> Vec<Node<'_>> {
    named_children(declaration)
        .into_iter()
        .filter(|c| c.kind() == "variable_declarator")
        .collect()
}

/// The `variable_declaration` child of a local or field declaration.
pub fn variable_declaration_of(statement: Node<'_>) -> Option<Node<'_>> {
    named_children(statement)
        .into_iter()
        .find(|c| c.kind() == "variable_declaration")
}

/// The declared type node of a declaration, parameter, property or method.
pub fn type_node_of(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "local_declaration_statement" | "field_declaration" | "event_field_declaration" => {
            variable_declaration_of(node).and_then(type_node_of)
        }
        "variable_declarator" => node.parent().and_then(type_node_of),
        "method_declaration" | "local_function_statement" | "delegate_declaration"
        | "operator_declaration" => node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type")),
        _ => node.child_by_field_name("type"),
    }
}

/// The parameters of a method-like declaration.
pub fn parameters_of(node: Node<'_>) -> Vec<Node<'_>> {
    let list = node.child_by_field_name("parameters").or_else(|| {
        named_children(node)
            .into_iter()
            .find(|c| c.kind() == "parameter_list")
    });
    list.map(|l| {
        named_children(l)
            .into_iter()
            .filter(|c| c.kind() == "parameter")
            .collect()
    })
    .unwrap_or_default()
}

/// Returns true if a parameter declares a default value.
pub fn has_default_value(parameter: Node<'_>) -> bool {
    children(parameter)
        .iter()
        .any(|c| c.kind() == "=" || c.kind() == "equals_value_clause")
}

/// The argument nodes of an invocation or object creation.
pub fn arguments_of(call: Node<'_>) -> Vec<Node<'_>> {
    let list = call.child_by_field_name("arguments").or_else(|| {
        named_children(call)
            .into_iter()
            .find(|c| c.kind() == "argument_list")
    });
    list.map(|l| {
        named_children(l)
            .into_iter()
            .filter(|c| c.kind() == "argument")
            .collect()
    })
    .unwrap_or_default()
}

/// The `name` of a named argument or tuple element (`name: value`).
pub fn argument_name(argument: Node<'_>) -> Option<Node<'_>> {
    if let Some(name) = argument.child_by_field_name("name") {
        return Some(name);
    }
    let kids = children(argument);
    for (i, child) in kids.iter().enumerate() {
        if child.kind() == "name_colon" {
            return name_of(*child);
        }
        if child.kind() == ":" && i > 0 && kids[i - 1].kind() == "identifier" {
            return Some(kids[i - 1]);
        }
    }
    None
}

/// The value expression of an argument or tuple element.
pub fn argument_expression(argument: Node<'_>) -> Option<Node<'_>> {
    named_children(argument)
        .into_iter()
        .filter(|c| c.kind() != "comment" && c.kind() != "name_colon")
        .last()
}

/// The simple name of the method or type being invoked.
pub fn invoked_name<'d>(doc: &'d Document, call: Node<'_>) -> Option<&'d str> {
    let target = match call.kind() {
        "object_creation_expression" => call.child_by_field_name("type")?,
        _ => call.child_by_field_name("function")?,
    };
    let target = match target.kind() {
        "member_access_expression" => target.child_by_field_name("name").unwrap_or(target),
        _ => target,
    };
    let text = doc.node_text(target);
    let text = text.rsplit('.').next().unwrap_or(text);
    let text = text.split('<').next().unwrap_or(text).trim();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{TextSpan, ancestor_of_kind};

    fn find<'d>(doc: &'d Document, needle: &str, kind: &str) -> Node<'d> {
        let start = doc.text().find(needle).unwrap();
        ancestor_of_kind(doc, TextSpan::new(start, needle.len()), &[kind]).unwrap()
    }

    #[test]
    fn test_declarator_parts() {
        let doc = Document::parse("class C { void M() { int a = 1, b; } }").unwrap();
        let statement = find(&doc, "int a", "local_declaration_statement");
        let declaration = variable_declaration_of(statement).unwrap();
        let declarators = declarators_of(declaration);

        assert_eq!(declarators.len(), 2);
        assert_eq!(doc.node_text(name_of(declarators[0]).unwrap()), "a");
        assert_eq!(doc.node_text(initializer_of(declarators[0]).unwrap()), "1");
        assert!(initializer_of(declarators[1]).is_none());
        assert_eq!(doc.node_text(type_node_of(statement).unwrap()), "int");
    }

    #[test]
    fn test_parameters() {
        let doc = Document::parse("class C { void M(int a, string b = null) { } }").unwrap();
        let method = find(&doc, "void M", "method_declaration");
        let params = parameters_of(method);

        assert_eq!(params.len(), 2);
        assert!(!has_default_value(params[0]));
        assert!(has_default_value(params[1]));
        assert_eq!(doc.node_text(type_node_of(params[1]).unwrap()), "string");
        assert_eq!(doc.node_text(type_node_of(method).unwrap()), "void");
    }

    #[test]
    fn test_arguments() {
        let doc = Document::parse("class C { void M() { obj.Run(1, value: null); } }").unwrap();
        let call = find(&doc, "obj.Run", "invocation_expression");
        let args = arguments_of(call);

        assert_eq!(invoked_name(&doc, call), Some("Run"));
        assert_eq!(args.len(), 2);
        assert!(argument_name(args[0]).is_none());
        assert_eq!(doc.node_text(argument_name(args[1]).unwrap()), "value");
        assert_eq!(doc.node_text(argument_expression(args[1]).unwrap()), "null");
    }
}
