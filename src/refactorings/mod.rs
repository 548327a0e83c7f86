//! Refactorings offered for a selection span.
//!
//! ## Available Refactorings
//!
//! - [`AddBraces`] - Wrap an embedded statement in a block
//! - [`AddBracesToIfElse`] - Wrap every brace-less body of an `if`/`else` chain
//! - [`RemoveBraces`] - Unwrap a single-statement block
//! - [`ExpandCompoundAssignment`] - `x += y` to `x = x + y`
//! - [`UseCompoundAssignment`] - `x = x + y` to `x += y`
//! - [`SplitVariableDeclaration`] - One statement per declarator
//! - [`MergeStringLiterals`] - Concatenated literals to one literal

mod add_braces;
pub(crate) mod compound_assignment;
mod merge_strings;
mod remove_braces;
mod split_declaration;

pub use add_braces::{AddBraces, AddBracesToIfElse};
pub use compound_assignment::{ExpandCompoundAssignment, UseCompoundAssignment};
pub use merge_strings::MergeStringLiterals;
pub use remove_braces::RemoveBraces;
pub use split_declaration::SplitVariableDeclaration;

use crate::dispatch::RefactoringProvider;
use crate::syntax::named_children;
use tree_sitter::Node;

/// Every refactoring provider shipped by this crate.
pub fn builtin() -> Vec<Box<dyn RefactoringProvider>> {
    vec![
        Box::new(AddBraces),
        Box::new(AddBracesToIfElse),
        Box::new(RemoveBraces),
        Box::new(ExpandCompoundAssignment),
        Box::new(UseCompoundAssignment),
        Box::new(SplitVariableDeclaration),
        Box::new(MergeStringLiterals),
    ]
}

/// Statements that own an embedded statement.
const EMBEDDED_OWNERS: &[&str] = &[
    "if_statement",
    "while_statement",
    "for_statement",
    "foreach_statement",
    "do_statement",
    "using_statement",
    "lock_statement",
    "fixed_statement",
];

/// The embedded statement bodies of an owner, in source order.
///
/// For `if`, an `else if` link is included; callers decide whether to treat
/// it as a body.
fn bodies_of(owner: Node<'_>) -> Vec<Node<'_>> {
    match owner.kind() {
        "if_statement" => [
            owner.child_by_field_name("consequence"),
            owner.child_by_field_name("alternative"),
        ]
        .into_iter()
        .flatten()
        .collect(),
        "do_statement" => owner
            .child_by_field_name("body")
            .or_else(|| {
                named_children(owner)
                    .into_iter()
                    .find(|c| c.kind() != "comment")
            })
            .into_iter()
            .collect(),
        k if EMBEDDED_OWNERS.contains(&k) => owner
            .child_by_field_name("body")
            .or_else(|| {
                named_children(owner)
                    .into_iter()
                    .filter(|c| c.kind() != "comment")
                    .last()
            })
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Returns true if `node` is the embedded statement of its parent.
fn is_embedded(node: Node<'_>) -> bool {
    node.parent()
        .is_some_and(|owner| bodies_of(owner).contains(&node))
}

/// Returns true if `node` is the `if` of an `else if`.
fn is_else_if(node: Node<'_>) -> bool {
    node.kind() == "if_statement"
        && node.parent().is_some_and(|owner| {
            owner.kind() == "if_statement" && owner.child_by_field_name("alternative") == Some(node)
        })
}

/// The indentation unit between a header line and its body line.
fn indent_unit(header_indent: &str, body_indent: &str) -> String {
    match body_indent.strip_prefix(header_indent) {
        Some(unit) if !unit.is_empty() => unit.to_string(),
        _ => "    ".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::action::CodeAction;
    use crate::cancel::CancellationToken;
    use crate::config::FixSettings;
    use crate::dispatch::{Dispatcher, RefactoringProvider};
    use crate::semantic::SyntacticModel;
    use crate::syntax::{Document, TextSpan};
    use std::sync::Arc;

    /// Span of the first occurrence of `needle`.
    pub fn span_of(source: &str, needle: &str) -> TextSpan {
        TextSpan::new(source.find(needle).unwrap(), needle.len())
    }

    /// Runs one refactoring provider and returns its actions.
    pub fn refactor(
        provider: impl RefactoringProvider + 'static,
        source: &str,
        span: TextSpan,
    ) -> Vec<CodeAction> {
        let doc = Document::parse(source).unwrap();
        let mut dispatcher = Dispatcher::new(Arc::new(FixSettings::new()));
        dispatcher.add_refactoring_provider(Box::new(provider));
        dispatcher
            .refactorings(&doc, span, &SyntacticModel, &CancellationToken::new())
            .unwrap()
    }

    /// Applies an action and returns the new text.
    pub fn apply(action: &CodeAction) -> String {
        action
            .apply(&CancellationToken::new())
            .unwrap()
            .text()
            .to_string()
    }
}
