//! Merging a concatenation of string literals into one literal.

use crate::action::CodeAction;
use crate::dispatch::{RefactoringContext, RefactoringProvider};
use crate::error::Result;
use crate::syntax::{
    Direction, Document, SyntaxEditor, TextSpan, contains_comment, find_anchor, operator_text,
};
use tree_sitter::Node;

/// `"a" + "b"` to `"ab"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStringLiterals;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralStyle {
    Regular,
    Verbatim,
}

impl LiteralStyle {
    fn of(text: &str) -> Option<Self> {
        if text.ends_with("u8") || text.starts_with("\"\"\"") {
            return None;
        }
        if text.starts_with("@\"") {
            Some(LiteralStyle::Verbatim)
        } else if text.starts_with('"') {
            Some(LiteralStyle::Regular)
        } else {
            None
        }
    }

    /// The text between the quotes.
    fn contents(self, text: &str) -> &str {
        let open = match self {
            LiteralStyle::Regular => 1,
            LiteralStyle::Verbatim => 2,
        };
        text.get(open..text.len().saturating_sub(1)).unwrap_or("")
    }

    fn quote(self, contents: &str) -> String {
        match self {
            LiteralStyle::Regular => format!("\"{contents}\""),
            LiteralStyle::Verbatim => format!("@\"{contents}\""),
        }
    }
}

#[derive(Debug, Clone)]
struct Merge {
    expression: TextSpan,
    merged: String,
}

impl RefactoringProvider for MergeStringLiterals {
    fn id(&self) -> &'static str {
        "merge-string-literals"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(plan) = find_target(ctx.document, ctx.span) else {
            return Ok(());
        };
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new(
            "Merge string literals",
            self.id(),
            move |_| {
                let mut editor = SyntaxEditor::new(&doc);
                editor.replace(plan.expression, plan.merged.clone());
                editor.apply()
            },
        ));
        Ok(())
    }
}

fn is_concatenation(doc: &Document, node: Node<'_>) -> bool {
    node.kind() == "binary_expression" && operator_text(doc, node) == Some("+")
}

fn find_target(doc: &Document, span: TextSpan) -> Option<Merge> {
    let mut root = find_anchor(doc, span, Direction::Ancestors, |n| is_concatenation(doc, n))?;
    while let Some(parent) = root.parent().filter(|p| is_concatenation(doc, *p)) {
        root = parent;
    }
    if contains_comment(root) {
        return None;
    }

    let mut leaves = Vec::new();
    collect_operands(doc, root, &mut leaves);
    let style = LiteralStyle::of(leaves.first()?)?;
    let mut merged = String::new();
    for leaf in &leaves {
        if LiteralStyle::of(leaf)? != style {
            return None;
        }
        merged.push_str(style.contents(leaf));
    }
    Some(Merge {
        expression: doc.span_of(root),
        merged: style.quote(&merged),
    })
}

/// Flattens a `+` chain, substituting an empty operand for anything that is
/// not a string literal so the caller rejects it.
fn collect_operands<'d>(doc: &'d Document, node: Node<'_>, out: &mut Vec<&'d str>) {
    if is_concatenation(doc, node)
        && let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        )
    {
        collect_operands(doc, left, out);
        collect_operands(doc, right, out);
        return;
    }
    match node.kind() {
        "string_literal" | "verbatim_string_literal" => out.push(doc.node_text(node)),
        _ => out.push(""),
    }
}
