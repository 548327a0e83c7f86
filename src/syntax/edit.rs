//! Node-level edit primitives producing new document snapshots.

use super::{Document, TextSpan};
use crate::error::{FixError, Result};
use serde::Serialize;
use tree_sitter::Node;

/// Advisory metadata for whoever post-processes a changed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    /// The inserted text should be reformatted.
    Format,
    /// Names in the inserted text may be simplified (e.g. `System.X` to `X`).
    Simplify,
}

/// A single replacement in original-document coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: TextSpan,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(span: TextSpan, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }
}

/// An annotation and the span it covers in the changed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedSpan {
    pub annotation: Annotation,
    pub span: TextSpan,
}

/// The result of applying an editor: a new snapshot plus what changed.
#[derive(Debug, Clone)]
pub struct ChangedDocument {
    pub document: Document,
    edits: Vec<TextEdit>,
    annotations: Vec<AnnotatedSpan>,
}

impl ChangedDocument {
    /// The edits that were applied, sorted by position, in original coordinates.
    pub fn text_edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Annotations with their spans in the changed document.
    pub fn annotations(&self) -> &[AnnotatedSpan] {
        &self.annotations
    }

    /// The text of the changed document.
    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }
}

/// Collects edits against one snapshot and applies them atomically.
pub struct SyntaxEditor<'d> {
    doc: &'d Document,
    edits: Vec<(TextEdit, Vec<Annotation>)>,
}

impl<'d> SyntaxEditor<'d> {
    /// Creates an editor for the given snapshot.
    pub fn new(doc: &'d Document) -> Self {
        Self {
            doc,
            edits: Vec::new(),
        }
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    /// Replaces an arbitrary span.
    pub fn replace(&mut self, span: TextSpan, text: impl Into<String>) -> &mut Self {
        self.edits.push((TextEdit::new(span, text), Vec::new()));
        self
    }

    /// Replaces a node, keeping the text around it.
    pub fn replace_node(&mut self, node: Node<'_>, text: impl Into<String>) -> &mut Self {
        let span = self.doc.span_of(node);
        self.replace(span, text)
    }

    /// Removes a node.
    ///
    /// A node alone on its line(s) is removed together with those lines;
    /// otherwise the node and the horizontal whitespace after it are removed.
    pub fn remove_node(&mut self, node: Node<'_>) -> &mut Self {
        let span = self.removal_span(self.doc.span_of(node));
        self.replace(span, "")
    }

    /// Removes a span using the same line rules as [`Self::remove_node`].
    pub fn remove_span(&mut self, span: TextSpan) -> &mut Self {
        let span = self.removal_span(span);
        self.replace(span, "")
    }

    /// Inserts text immediately before a node.
    pub fn insert_before(&mut self, node: Node<'_>, text: impl Into<String>) -> &mut Self {
        self.replace(TextSpan::at(node.start_byte()), text)
    }

    /// Inserts text immediately after a node.
    pub fn insert_after(&mut self, node: Node<'_>, text: impl Into<String>) -> &mut Self {
        self.replace(TextSpan::at(node.end_byte()), text)
    }

    /// Attaches an annotation to the most recent edit.
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        if let Some((_, annotations)) = self.edits.last_mut() {
            annotations.push(annotation);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    fn removal_span(&self, span: TextSpan) -> TextSpan {
        let doc = self.doc;
        if doc.is_first_on_line(span.start) && doc.is_last_on_line(span.end()) {
            let start = doc.line_start(span.start);
            let end = doc.next_line_start(span.end());
            return TextSpan::from_bounds(start, end);
        }
        let trailing = doc
            .text()
            .get(span.end()..)
            .unwrap_or("")
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count();
        TextSpan::from_bounds(span.start, span.end() + trailing)
    }

    /// Applies all edits and reparses the result.
    pub fn apply(self) -> Result<ChangedDocument> {
        let mut edits = self.edits;
        for (edit, _) in &edits {
            self.doc.check_span(edit.span)?;
        }
        // Insertions at the same offset keep their registration order.
        edits.sort_by_key(|(edit, _)| (edit.span.start, edit.span.end()));

        for pair in edits.windows(2) {
            let (a, b) = (&pair[0].0, &pair[1].0);
            let overlapping = b.span.start < a.span.end()
                || (b.span.start == a.span.start && !a.span.is_empty() && !b.span.is_empty());
            if overlapping {
                return Err(FixError::ConflictingEdits {
                    first_start: a.span.start,
                    first_end: a.span.end(),
                    second_start: b.span.start,
                    second_end: b.span.end(),
                });
            }
        }

        let source = self.doc.text();
        let mut output = String::with_capacity(source.len());
        let mut annotations = Vec::new();
        let mut cursor = 0;
        for (edit, marks) in &edits {
            output.push_str(source.get(cursor..edit.span.start).unwrap_or(""));
            let new_start = output.len();
            output.push_str(&edit.new_text);
            for annotation in marks {
                annotations.push(AnnotatedSpan {
                    annotation: *annotation,
                    span: TextSpan::new(new_start, edit.new_text.len()),
                });
            }
            cursor = edit.span.end();
        }
        output.push_str(source.get(cursor..).unwrap_or(""));

        tracing::trace!(edits = edits.len(), "applied syntax edits");
        let document = self.doc.with_text(output)?;
        Ok(ChangedDocument {
            document,
            edits: edits.into_iter().map(|(edit, _)| edit).collect(),
            annotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ancestor_of_kind;

    fn span_of(source: &str, needle: &str) -> TextSpan {
        TextSpan::new(source.find(needle).unwrap(), needle.len())
    }

    #[test]
    fn test_replace_node() {
        let source = "class C { void M() { a(); } }";
        let doc = Document::parse(source).unwrap();
        let stmt = ancestor_of_kind(&doc, span_of(source, "a()"), &["expression_statement"]).unwrap();

        let mut editor = SyntaxEditor::new(&doc);
        editor.replace_node(stmt, "b();");
        let changed = editor.apply().unwrap();

        assert_eq!(changed.text(), "class C { void M() { b(); } }");
        assert_eq!(doc.text(), source);
        assert_eq!(changed.text_edits().len(), 1);
    }

    #[test]
    fn test_remove_node_on_own_line() {
        let source = "class C\n{\n    void M()\n    {\n        a();\n        b();\n    }\n}\n";
        let doc = Document::parse(source).unwrap();
        let stmt = ancestor_of_kind(&doc, span_of(source, "a()"), &["expression_statement"]).unwrap();

        let mut editor = SyntaxEditor::new(&doc);
        editor.remove_node(stmt);
        let changed = editor.apply().unwrap();

        assert_eq!(
            changed.text(),
            "class C\n{\n    void M()\n    {\n        b();\n    }\n}\n"
        );
    }

    #[test]
    fn test_insert_before_and_after() {
        let source = "class C { int x; }";
        let doc = Document::parse(source).unwrap();
        let field = ancestor_of_kind(&doc, span_of(source, "int x;"), &["field_declaration"]).unwrap();

        let mut editor = SyntaxEditor::new(&doc);
        editor.insert_before(field, "[A] ").annotate(Annotation::Simplify);
        editor.insert_after(field, " int y;");
        let changed = editor.apply().unwrap();

        assert_eq!(changed.text(), "class C { [A] int x; int y; }");
        assert_eq!(changed.annotations().len(), 1);
        let annotated = &changed.annotations()[0];
        assert_eq!(annotated.annotation, Annotation::Simplify);
        assert_eq!(changed.document.slice(annotated.span), "[A] ");
    }

    #[test]
    fn test_conflicting_edits() {
        let doc = Document::parse("class C { }").unwrap();
        let mut editor = SyntaxEditor::new(&doc);
        editor.replace(TextSpan::new(0, 5), "struct");
        editor.replace(TextSpan::new(2, 5), "x");
        assert!(matches!(editor.apply(), Err(FixError::ConflictingEdits { .. })));
    }

    #[test]
    fn test_out_of_range_edit() {
        let doc = Document::parse("class C { }").unwrap();
        let mut editor = SyntaxEditor::new(&doc);
        editor.replace(TextSpan::new(40, 1), "x");
        assert!(matches!(editor.apply(), Err(FixError::SpanOutOfRange { .. })));
    }

    #[test]
    fn test_no_edits_is_noop() {
        let doc = Document::parse("class C { }").unwrap();
        let changed = SyntaxEditor::new(&doc).apply().unwrap();
        assert_eq!(changed.text(), doc.text());
        assert!(!changed.is_modified());
    }
}
