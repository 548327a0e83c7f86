//! Wrapping embedded statements in blocks.

use super::{EMBEDDED_OWNERS, bodies_of, indent_unit, is_else_if, is_embedded};
use crate::action::CodeAction;
use crate::dispatch::{RefactoringContext, RefactoringProvider};
use crate::error::Result;
use crate::syntax::{
    ChangedDocument, Direction, Document, SyntaxEditor, TextEdit, TextSpan, ancestor_of_kind,
    children, find_anchor, is_kind,
};
use tree_sitter::Node;

/// Wraps the embedded statement at the span in a block.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddBraces;

/// Wraps every brace-less body of the `if` chain at the span.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddBracesToIfElse;

/// A brace-less statement and the header line it hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BraceTarget {
    statement: TextSpan,
    header: usize,
    inline: bool,
}

impl BraceTarget {
    fn of(doc: &Document, statement: Node<'_>, header: usize) -> Self {
        Self {
            statement: doc.span_of(statement),
            header,
            inline: !doc.is_first_on_line(statement.start_byte()),
        }
    }
}

impl RefactoringProvider for AddBraces {
    fn id(&self) -> &'static str {
        "add-braces"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(target) = find_target(ctx.document, ctx.span) else {
            return Ok(());
        };
        tracing::debug!(statement = %target.statement, "brace-less statement located");
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new("Add braces", self.id(), move |_| {
            rewrite(&doc, &[target])
        }));
        Ok(())
    }
}

impl RefactoringProvider for AddBracesToIfElse {
    fn id(&self) -> &'static str {
        "add-braces-to-if-else"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let targets = chain_targets(ctx.document, ctx.span);
        if targets.is_empty() {
            return Ok(());
        }
        tracing::debug!(bodies = targets.len(), "brace-less if chain located");
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new(
            "Add braces to if-else",
            self.id(),
            move |_| rewrite(&doc, &targets),
        ));
        Ok(())
    }
}

fn is_brace_less_body(node: Node<'_>) -> bool {
    node.kind() != "block" && !is_else_if(node) && is_embedded(node)
}

fn find_target(doc: &Document, span: TextSpan) -> Option<BraceTarget> {
    let statement = find_anchor(doc, span, Direction::Ancestors, is_brace_less_body).or_else(|| {
        // The span sits on a header such as `while (x)`.
        let owner = find_anchor(doc, span, Direction::Ancestors, |n| {
            is_kind(n, EMBEDDED_OWNERS)
        })?;
        bodies_of(owner)
            .into_iter()
            .find(|body| is_brace_less_body(*body))
    })?;
    Some(BraceTarget::of(doc, statement, header_of(statement)?))
}

fn header_of(statement: Node<'_>) -> Option<usize> {
    let owner = statement.parent()?;
    if owner.child_by_field_name("alternative") == Some(statement)
        && let Some(keyword) = else_keyword(owner)
    {
        return Some(keyword.start_byte());
    }
    Some(owner.start_byte())
}

fn else_keyword(if_node: Node<'_>) -> Option<Node<'_>> {
    children(if_node).into_iter().find(|c| c.kind() == "else")
}

fn chain_targets(doc: &Document, span: TextSpan) -> Vec<BraceTarget> {
    let Some(mut root) = ancestor_of_kind(doc, span, &["if_statement"]) else {
        return Vec::new();
    };
    while let Some(owner) = root.parent().filter(|_| is_else_if(root)) {
        root = owner;
    }
    collect_chain(doc, root, None, Vec::new())
}

/// Walks an `if` chain; `previous` is the `if` whose `else` led to `node`.
fn collect_chain<'t>(
    doc: &Document,
    node: Node<'t>,
    previous: Option<Node<'t>>,
    mut targets: Vec<BraceTarget>,
) -> Vec<BraceTarget> {
    let header = previous
        .and_then(else_keyword)
        .map_or(node.start_byte(), |keyword| keyword.start_byte());
    if let Some(consequence) = node.child_by_field_name("consequence")
        && consequence.kind() != "block"
    {
        targets.push(BraceTarget::of(doc, consequence, header));
    }
    match node.child_by_field_name("alternative") {
        Some(next) if next.kind() == "if_statement" => {
            collect_chain(doc, next, Some(node), targets)
        }
        Some(alternative) if alternative.kind() != "block" => {
            let header = else_keyword(node).map_or(node.start_byte(), |k| k.start_byte());
            targets.push(BraceTarget::of(doc, alternative, header));
            targets
        }
        _ => targets,
    }
}

fn wrap(doc: &Document, target: BraceTarget) -> TextEdit {
    let text = doc.slice(target.statement);
    if target.inline {
        return TextEdit::new(target.statement, format!("{{ {text} }}"));
    }

    let nl = doc.newline();
    let indent = doc.indentation_at(target.header);
    let unit = indent_unit(indent, doc.indentation_at(target.statement.start));
    let start = doc.line_start(target.statement.start);
    let mut end = target.statement.end();
    let rest = doc.text().get(end..doc.line_end(end)).unwrap_or("");
    let trailing = if rest.trim_start().starts_with("//") {
        end = doc.line_end(end);
        rest
    } else {
        ""
    };
    TextEdit::new(
        TextSpan::from_bounds(start, end),
        format!("{indent}{{{nl}{indent}{unit}{text}{trailing}{nl}{indent}}}"),
    )
}

fn rewrite(doc: &Document, targets: &[BraceTarget]) -> Result<ChangedDocument> {
    let mut editor = SyntaxEditor::new(doc);
    for target in targets {
        let edit = wrap(doc, *target);
        editor.replace(edit.span, edit.new_text);
    }
    editor.apply()
}
