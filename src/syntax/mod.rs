//! Immutable syntax snapshots and node helpers.
//!
//! A [`Document`] owns one source text and the tree-sitter tree parsed from
//! it. Documents are never edited in place: [`edit::SyntaxEditor`] turns a set
//! of node-level edits into a new source text and reparses it into a new
//! document, so every snapshot handed to a provider stays valid for as long as
//! the provider holds it.

pub mod edit;
pub mod locator;
pub mod nodes;

pub use edit::{Annotation, AnnotatedSpan, ChangedDocument, SyntaxEditor, TextEdit};
pub use locator::{Direction, ancestor_of_kind, find_anchor};

use crate::error::{FixError, Result};
use crate::lang::{CSharp, Language};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// A half-open byte range `[start, start + length)` in a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TextSpan {
    pub start: usize,
    pub length: usize,
}

impl TextSpan {
    /// Creates a span from a start offset and a length.
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Creates a span from start and end offsets.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Creates an empty span at the given offset.
    pub fn at(offset: usize) -> Self {
        Self::new(offset, 0)
    }

    /// Exclusive end offset, saturating at `usize::MAX`.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns true if `offset` lies inside the span.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }

    /// Returns true if `other` lies entirely inside this span.
    pub fn contains_span(&self, other: TextSpan) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// Returns true if the spans overlap, or touch when either is empty.
    pub fn intersects(&self, other: TextSpan) -> bool {
        if self.is_empty() || other.is_empty() {
            return other.start >= self.start && other.start <= self.end()
                || self.start >= other.start && self.start <= other.end();
        }
        self.start < other.end() && other.start < self.end()
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl FromStr for TextSpan {
    type Err = String;

    /// Parses `START:LEN` or a bare `OFFSET`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid span '{s}': {e}"))
        };
        match s.split_once(':') {
            Some((start, length)) => Ok(Self::new(parse(start)?, parse(length)?)),
            None => Ok(Self::at(parse(s)?)),
        }
    }
}

/// A position in a document (0-indexed line and character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// An immutable source snapshot together with its syntax tree.
#[derive(Clone)]
pub struct Document {
    path: Option<PathBuf>,
    source: Arc<str>,
    tree: Arc<Tree>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .finish()
    }
}

impl Document {
    /// Parses C# source into a new document.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source: String = source.into();
        let tree = CSharp.parse(&source)?;
        Ok(Self {
            path: None,
            source: Arc::from(source),
            tree: Arc::new(tree),
        })
    }

    /// Reads and parses a C# file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !CSharp.matches_path(path) {
            return Err(FixError::UnsupportedLanguage(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            ));
        }
        let source = std::fs::read_to_string(path)?;
        Self::parse(source)
            .map(|doc| doc.with_path(path))
            .map_err(|e| match e {
                FixError::Parse { message, .. } => FixError::Parse {
                    path: path.to_path_buf(),
                    message,
                },
                other => other,
            })
    }

    /// Attaches a file path to the document.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The root node (`compilation_unit`).
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns true if the parser recovered from syntax errors.
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// The source text of a node.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// The source text covered by a span, or `""` if the span is invalid.
    pub fn slice(&self, span: TextSpan) -> &str {
        self.source.get(span.start..span.end()).unwrap_or("")
    }

    /// The span covered by a node.
    pub fn span_of(&self, node: Node<'_>) -> TextSpan {
        TextSpan::from_bounds(node.start_byte(), node.end_byte())
    }

    /// Offset of the first byte of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        let bytes = self.source.as_bytes();
        let offset = offset.min(bytes.len());
        bytes[..offset]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1)
    }

    /// Offset of the line terminator (or end of text) of the line containing `offset`.
    pub fn line_end(&self, offset: usize) -> usize {
        let bytes = self.source.as_bytes();
        let offset = offset.min(bytes.len());
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| offset + i);
        if end > 0 && bytes.get(end - 1) == Some(&b'\r') && end > offset {
            end - 1
        } else {
            end
        }
    }

    /// Offset just past the line terminator of the line containing `offset`.
    pub fn next_line_start(&self, offset: usize) -> usize {
        let bytes = self.source.as_bytes();
        let offset = offset.min(bytes.len());
        bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |i| offset + i + 1)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: usize) -> &str {
        let start = self.line_start(offset);
        let line = self.source.get(start..).unwrap_or("");
        let width = line
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count();
        &line[..width]
    }

    /// Returns true if only whitespace precedes `offset` on its line.
    pub fn is_first_on_line(&self, offset: usize) -> bool {
        let start = self.line_start(offset);
        self.source
            .get(start..offset)
            .is_some_and(|s| s.trim().is_empty())
    }

    /// Returns true if only whitespace follows `offset` on its line.
    pub fn is_last_on_line(&self, offset: usize) -> bool {
        let end = self.line_end(offset);
        self.source
            .get(offset..end)
            .is_some_and(|s| s.trim().is_empty())
    }

    /// Returns true if both offsets lie on the same line.
    pub fn same_line(&self, a: usize, b: usize) -> bool {
        self.line_start(a) == self.line_start(b)
    }

    /// The line terminator used by the document.
    pub fn newline(&self) -> &'static str {
        if self.source.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        }
    }

    /// Converts a byte offset to a line/character position.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line_start = self.line_start(offset);
        let line = self.source.as_bytes()[..line_start]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        let character = self
            .source
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count());
        Position::new(line as u32, character as u32)
    }

    /// Converts a line/character position back to a byte offset.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let mut line_start = 0;
        for _ in 0..position.line {
            line_start = self.source[line_start..]
                .find('\n')
                .map(|i| line_start + i + 1)?;
        }
        let line = self.source.get(line_start..self.line_end(line_start))?;
        let character = position.character as usize;
        if character == line.chars().count() {
            return Some(line_start + line.len());
        }
        line.char_indices()
            .nth(character)
            .map(|(i, _)| line_start + i)
    }

    /// Parses a replacement text into a new document with the same path.
    pub fn with_text(&self, text: impl Into<String>) -> Result<Document> {
        let doc = Document::parse(text)?;
        Ok(match &self.path {
            Some(path) => doc.with_path(path.clone()),
            None => doc,
        })
    }

    /// Validates that a span lies inside the document.
    pub fn check_span(&self, span: TextSpan) -> Result<()> {
        if span.end() > self.source.len() {
            return Err(FixError::SpanOutOfRange {
                start: span.start,
                end: span.end(),
                len: self.source.len(),
            });
        }
        Ok(())
    }
}

/// Named children of a node, in source order.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// All children of a node (named and anonymous), in source order.
pub fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Returns true if the node has one of the given kinds.
pub fn is_kind(node: Node<'_>, kinds: &[&str]) -> bool {
    kinds.contains(&node.kind())
}

/// Returns true if any descendant of the node is a comment.
pub fn contains_comment(node: Node<'_>) -> bool {
    if node.kind() == "comment" {
        return true;
    }
    named_children(node).into_iter().any(contains_comment)
}

/// The operator token of a binary or assignment expression.
///
/// Uses the `operator` field when the grammar exposes it, otherwise the text
/// between the `left` and `right` operands.
pub fn operator_text<'d>(doc: &'d Document, node: Node<'_>) -> Option<&'d str> {
    if let Some(op) = node.child_by_field_name("operator") {
        let text = doc.node_text(op).trim();
        if !text.is_empty() {
            return Some(text);
        }
    }
    let left = node.child_by_field_name("left")?;
    let right = node.child_by_field_name("right")?;
    doc.text()
        .get(left.end_byte()..right.start_byte())
        .map(str::trim)
        .filter(|op| !op.is_empty())
}

/// Strips any number of enclosing parentheses.
pub fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match named_children(node).into_iter().find(|c| c.kind() != "comment") {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

const PRIMARY_EXPRESSIONS: &[&str] = &[
    "identifier",
    "generic_name",
    "qualified_name",
    "member_access_expression",
    "invocation_expression",
    "element_access_expression",
    "conditional_access_expression",
    "parenthesized_expression",
    "this_expression",
    "this",
    "base_expression",
    "boolean_literal",
    "integer_literal",
    "real_literal",
    "character_literal",
    "string_literal",
    "verbatim_string_literal",
    "null_literal",
    "object_creation_expression",
    "default_expression",
    "typeof_expression",
    "postfix_unary_expression",
];

/// Returns true if the expression binds tighter than any binary operator.
pub fn is_primary_expression(node: Node<'_>) -> bool {
    is_kind(node, PRIMARY_EXPRESSIONS)
}

/// Returns true if a C# identifier can be spelled as given.
pub fn is_valid_identifier(name: &str) -> bool {
    let name = name.strip_prefix('@').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_bounds() {
        let span = TextSpan::from_bounds(4, 10);
        assert_eq!(span.length, 6);
        assert_eq!(span.end(), 10);
        assert!(span.contains(4));
        assert!(!span.contains(10));
        assert!(span.contains_span(TextSpan::new(5, 2)));
        assert!(span.intersects(TextSpan::new(9, 3)));
        assert!(!span.intersects(TextSpan::new(10, 3)));
        assert!(span.intersects(TextSpan::at(10)));
    }

    #[test]
    fn test_span_end_saturates() {
        let span = TextSpan::new(usize::MAX, 2);
        assert_eq!(span.end(), usize::MAX);
        assert!(!span.contains(0));
        assert!(!TextSpan::new(0, 4).intersects(span));
        let doc = Document::parse("class C { }").unwrap();
        assert!(doc.check_span(span).is_err());
    }

    #[test]
    fn test_span_from_str() {
        assert_eq!("12:5".parse::<TextSpan>().unwrap(), TextSpan::new(12, 5));
        assert_eq!("7".parse::<TextSpan>().unwrap(), TextSpan::at(7));
        assert!("x:1".parse::<TextSpan>().is_err());
    }

    #[test]
    fn test_line_helpers() {
        let doc = Document::parse("class C\n{\n    int x;\n}\n").unwrap();
        let offset = doc.text().find("int").unwrap();
        assert_eq!(doc.line_start(offset), 10);
        assert_eq!(doc.indentation_at(offset), "    ");
        assert!(doc.is_first_on_line(offset));
        assert!(!doc.is_first_on_line(offset + 1));
        assert_eq!(&doc.text()[doc.line_start(offset)..doc.line_end(offset)], "    int x;");
        assert_eq!(doc.position(offset), Position::new(2, 4));
        assert_eq!(doc.newline(), "\n");
    }

    #[test]
    fn test_offset_inverts_position() {
        let doc = Document::parse("class C\n{\n    int x;\n}\n").unwrap();
        let offset = doc.text().find("x;").unwrap();
        assert_eq!(doc.offset(doc.position(offset)), Some(offset));
        assert_eq!(doc.offset(Position::new(1, 1)), Some(9));
        assert_eq!(doc.offset(Position::new(9, 0)), None);
        assert_eq!(doc.offset(Position::new(0, 40)), None);
    }

    #[test]
    fn test_node_text_and_span() {
        let doc = Document::parse("class C { }").unwrap();
        let class = doc.root().named_child(0).unwrap();
        assert_eq!(class.kind(), "class_declaration");
        assert_eq!(doc.node_text(class), "class C { }");
        assert_eq!(doc.span_of(class), TextSpan::new(0, 11));
    }

    #[test]
    fn test_slice_invalid_span() {
        let doc = Document::parse("class C { }").unwrap();
        assert_eq!(doc.slice(TextSpan::new(100, 3)), "");
        assert!(doc.check_span(TextSpan::new(100, 3)).is_err());
        assert!(doc.check_span(TextSpan::new(0, 3)).is_ok());
    }

    #[test]
    fn test_with_text_keeps_path() {
        let doc = Document::parse("class C { }").unwrap().with_path("A.cs");
        let next = doc.with_text("class D { }").unwrap();
        assert_eq!(next.path(), Some(Path::new("A.cs")));
        assert_eq!(doc.text(), "class C { }");
    }

    #[test]
    fn test_valid_identifier() {
        assert!(is_valid_identifier("value"));
        assert!(is_valid_identifier("_x1"));
        assert!(is_valid_identifier("@class"));
        assert!(!is_valid_identifier("1x"));
        assert!(!is_valid_identifier(""));
    }
}
