//! Unwrapping single-statement blocks.

use super::{EMBEDDED_OWNERS, bodies_of, indent_unit, is_embedded};
use crate::action::CodeAction;
use crate::dispatch::{RefactoringContext, RefactoringProvider};
use crate::error::Result;
use crate::syntax::{
    ChangedDocument, Direction, Document, SyntaxEditor, TextSpan, contains_comment, find_anchor,
    is_kind, named_children,
};
use tree_sitter::Node;

/// Statements that cannot stand as an embedded statement.
const NOT_EMBEDDABLE: &[&str] = &[
    "local_declaration_statement",
    "local_function_statement",
    "labeled_statement",
];

/// Replaces a block holding one statement with that statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveBraces;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `{ stmt }` on one line.
    Inline,
    /// The opening brace ends the header line.
    TrailingBrace,
    /// The opening brace has a line of its own.
    OwnLineBrace,
}

#[derive(Debug, Clone, Copy)]
struct Unwrap {
    block: TextSpan,
    statement: TextSpan,
    header: usize,
    brace_anchor: usize,
    layout: Layout,
    /// Start of an `else` that shares the closing brace's line.
    trailing_else: Option<usize>,
}

impl RefactoringProvider for RemoveBraces {
    fn id(&self) -> &'static str {
        "remove-braces"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(plan) = find_target(ctx.document, ctx.span) else {
            return Ok(());
        };
        tracing::debug!(block = %plan.block, "single-statement block located");
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new("Remove braces", self.id(), move |_| {
            rewrite(&doc, plan)
        }));
        Ok(())
    }
}

fn is_embedded_block(node: Node<'_>) -> bool {
    node.kind() == "block" && is_embedded(node)
}

fn find_target(doc: &Document, span: TextSpan) -> Option<Unwrap> {
    let block = find_anchor(doc, span, Direction::Ancestors, is_embedded_block).or_else(|| {
        let owner = find_anchor(doc, span, Direction::Ancestors, |n| {
            is_kind(n, EMBEDDED_OWNERS)
        })?;
        bodies_of(owner).into_iter().find(|body| body.kind() == "block")
    })?;
    let owner = block.parent()?;

    if contains_comment(block) {
        return None;
    }
    let statements = named_children(block);
    let &[statement] = statements.as_slice() else {
        return None;
    };
    if is_kind(statement, NOT_EMBEDDABLE) {
        return None;
    }
    let guards_else = owner.kind() == "if_statement"
        && owner.child_by_field_name("consequence") == Some(block)
        && owner.child_by_field_name("alternative").is_some();
    if guards_else && ends_with_open_if(statement) {
        tracing::debug!("unwrapping would attach the else to an inner if");
        return None;
    }

    let previous = block.prev_sibling()?;
    let layout = if doc.same_line(block.start_byte(), block.end_byte()) {
        Layout::Inline
    } else if doc.same_line(previous.end_byte(), block.start_byte()) {
        Layout::TrailingBrace
    } else {
        Layout::OwnLineBrace
    };
    let header = match previous.kind() {
        "else" => previous.start_byte(),
        _ => owner.start_byte(),
    };
    let trailing_else = block
        .next_sibling()
        .filter(|next| next.kind() == "else" && doc.same_line(block.end_byte(), next.start_byte()))
        .map(|next| next.start_byte());
    Some(Unwrap {
        block: doc.span_of(block),
        statement: doc.span_of(statement),
        header,
        brace_anchor: previous.end_byte(),
        layout,
        trailing_else,
    })
}

/// Returns true if the statement ends in an `if` that has no `else`.
fn ends_with_open_if(statement: Node<'_>) -> bool {
    match statement.kind() {
        "if_statement" => statement
            .child_by_field_name("alternative")
            .is_none_or(ends_with_open_if),
        k if EMBEDDED_OWNERS.contains(&k) => bodies_of(statement)
            .last()
            .is_some_and(|body| ends_with_open_if(*body)),
        _ => false,
    }
}

fn rewrite(doc: &Document, plan: Unwrap) -> Result<ChangedDocument> {
    let text = doc.slice(plan.statement);
    let mut editor = SyntaxEditor::new(doc);
    match plan.layout {
        Layout::Inline => {
            editor.replace(plan.block, text);
        }
        Layout::TrailingBrace | Layout::OwnLineBrace => {
            let indent = doc.indentation_at(plan.header);
            let unit = indent_unit(indent, doc.indentation_at(plan.statement.start));
            let (start, replacement) = if plan.layout == Layout::TrailingBrace {
                (plan.brace_anchor, format!("{}{indent}{unit}{text}", doc.newline()))
            } else {
                (doc.line_start(plan.block.start), format!("{indent}{unit}{text}"))
            };
            // `} else` becomes an `else` on its own line.
            let (end, tail) = match plan.trailing_else {
                Some(keyword) => (keyword, format!("{}{indent}", doc.newline())),
                None => (plan.block.end(), String::new()),
            };
            editor.replace(TextSpan::from_bounds(start, end), format!("{replacement}{tail}"));
        }
    }
    editor.apply()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refactorings::test_support::{apply, refactor, span_of};

    #[test]
    fn test_inline_block() {
        let source = "class C { void M() { if (x) { y(); } } }";
        let actions = refactor(RemoveBraces, source, span_of(source, "y();"));
        assert_eq!(actions.len(), 1);
        assert_eq!(apply(&actions[0]), "class C { void M() { if (x) y(); } }");
    }

    #[test]
    fn test_own_line_brace() {
        let source = "class C\n{\n    void M()\n    {\n        if (x)\n        {\n            y();\n        }\n    }\n}\n";
        let actions = refactor(RemoveBraces, source, span_of(source, "y()"));
        assert_eq!(
            apply(&actions[0]),
            "class C\n{\n    void M()\n    {\n        if (x)\n            y();\n    }\n}\n"
        );
    }

    #[test]
    fn test_trailing_brace() {
        let source = "class C {\n    void M() {\n        foreach (var i in xs) {\n            y(i);\n        }\n    }\n}\n";
        let actions = refactor(RemoveBraces, source, span_of(source, "y(i)"));
        assert_eq!(
            apply(&actions[0]),
            "class C {\n    void M() {\n        foreach (var i in xs)\n            y(i);\n    }\n}\n"
        );
    }

    #[test]
    fn test_else_moves_to_own_line() {
        let source = "class C\n{\n    void M()\n    {\n        if (a) {\n            x();\n        } else {\n            y();\n        }\n    }\n}\n";
        let actions = refactor(RemoveBraces, source, span_of(source, "x()"));
        assert_eq!(
            apply(&actions[0]),
            "class C\n{\n    void M()\n    {\n        if (a)\n            x();\n        else {\n            y();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_inline_block_before_else() {
        let source = "class C { void M() { if (a) { x(); } else { y(); } } }";
        let actions = refactor(RemoveBraces, source, span_of(source, "x();"));
        assert_eq!(
            apply(&actions[0]),
            "class C { void M() { if (a) x(); else { y(); } } }"
        );
    }

    #[test]
    fn test_not_reapplied_after_unwrapping() {
        let source = "class C { void M() { if (x) { y(); } } }";
        let actions = refactor(RemoveBraces, source, span_of(source, "y();"));
        let output = apply(&actions[0]);
        assert!(refactor(RemoveBraces, &output, span_of(&output, "y();")).is_empty());
    }

    #[test]
    fn test_block_with_comment_not_applicable() {
        let source = "class C { void M() { if (x) { /* keep */ y(); } } }";
        assert!(refactor(RemoveBraces, source, span_of(source, "y();")).is_empty());
    }

    #[test]
    fn test_declaration_not_applicable() {
        let source = "class C { void M() { if (x) { int y = 1; } } }";
        assert!(refactor(RemoveBraces, source, span_of(source, "int y")).is_empty());
    }

    #[test]
    fn test_several_statements_not_applicable() {
        let source = "class C { void M() { if (x) { y(); z(); } } }";
        assert!(refactor(RemoveBraces, source, span_of(source, "y();")).is_empty());
    }

    #[test]
    fn test_dangling_else_not_applicable() {
        let source = "class C { void M() { if (a) { if (b) x(); } else y(); } }";
        assert!(refactor(RemoveBraces, source, span_of(source, "if (b)")).is_empty());
    }

    #[test]
    fn test_method_body_not_applicable() {
        let source = "class C { void M() { y(); } }";
        assert!(refactor(RemoveBraces, source, span_of(source, "y();")).is_empty());
    }
}
