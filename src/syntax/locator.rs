//! Locating the anchor node for a diagnostic or selection span.

use super::{Document, TextSpan, named_children};
use tree_sitter::Node;

/// Which way to search from the node covering a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Walk outward through the covering node's ancestors.
    Ancestors,
    /// Search inward for the deepest matching node that still covers the span.
    Innermost,
}

/// Finds the node a provider should anchor on.
///
/// Returns `None` when the span lies outside the document, covers only
/// whitespace, or lands on a comment or a missing token.
pub fn find_anchor<'t, F>(
    doc: &'t Document,
    span: TextSpan,
    direction: Direction,
    predicate: F,
) -> Option<Node<'t>>
where
    F: Fn(Node<'t>) -> bool,
{
    let start = covering_node(doc, span)?;
    match direction {
        Direction::Ancestors => {
            let mut current = Some(start);
            while let Some(node) = current {
                if predicate(node) {
                    return Some(node);
                }
                current = node.parent();
            }
            None
        }
        Direction::Innermost => innermost(start, span, &predicate),
    }
}

/// Finds the nearest ancestor (or the covering node itself) of one of the given kinds.
pub fn ancestor_of_kind<'t>(
    doc: &'t Document,
    span: TextSpan,
    kinds: &[&str],
) -> Option<Node<'t>> {
    find_anchor(doc, span, Direction::Ancestors, |n| kinds.contains(&n.kind()))
}

fn covering_node(doc: &Document, span: TextSpan) -> Option<Node<'_>> {
    if span.end() > doc.len() {
        return None;
    }
    if !span.is_empty() && doc.slice(span).trim().is_empty() {
        return None;
    }
    let node = doc
        .root()
        .descendant_for_byte_range(span.start, span.end())?;
    if node.is_missing() || node.kind() == "comment" {
        tracing::trace!(kind = node.kind(), %span, "span landed on trivia or a missing token");
        return None;
    }
    Some(node)
}

fn innermost<'t, F>(node: Node<'t>, span: TextSpan, predicate: &F) -> Option<Node<'t>>
where
    F: Fn(Node<'t>) -> bool,
{
    let covers = |n: Node<'t>| n.start_byte() <= span.start && span.end() <= n.end_byte();
    for child in named_children(node) {
        if covers(child)
            && let Some(found) = innermost(child, span, predicate)
        {
            return Some(found);
        }
    }
    if covers(node) && predicate(node) {
        Some(node)
    } else {
        None
    }
}
