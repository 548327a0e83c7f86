//! Diff previews of a changed document.

use crate::syntax::{ChangedDocument, Document};
use similar::{ChangeTag, DiffOp, TextDiff};
use std::fmt::{self, Write};
use std::ops::Range;

struct Palette {
    delete: &'static str,
    insert: &'static str,
    header: &'static str,
    reset: &'static str,
}

const PLAIN: Palette = Palette {
    delete: "",
    insert: "",
    header: "",
    reset: "",
};

// ANSI color codes
const ANSI: Palette = Palette {
    delete: "\x1b[31m",
    insert: "\x1b[32m",
    header: "\x1b[36m",
    reset: "\x1b[0m",
};

/// Generates a unified diff between a document and its changed snapshot.
pub fn unified_diff(original: &Document, changed: &ChangedDocument) -> String {
    render(original.text(), changed.text(), &label(original), &PLAIN)
}

/// Colorized diff output for terminal display.
pub fn colorized_diff(original: &Document, changed: &ChangedDocument) -> String {
    render(original.text(), changed.text(), &label(original), &ANSI)
}

fn label(doc: &Document) -> String {
    doc.path()
        .map_or_else(|| "<input>".to_string(), |p| p.display().to_string())
}

fn render(original: &str, modified: &str, label: &str, palette: &Palette) -> String {
    let mut output = String::new();
    // Formatting into a String cannot fail.
    let _ = write_diff(&mut output, original, modified, label, palette);
    output
}

fn write_diff(
    out: &mut String,
    original: &str,
    modified: &str,
    label: &str,
    p: &Palette,
) -> fmt::Result {
    let diff = TextDiff::from_lines(original, modified);
    writeln!(out, "{}--- a/{}{}", p.header, label, p.reset)?;
    writeln!(out, "{}+++ b/{}{}", p.header, label, p.reset)?;

    for group in diff.grouped_ops(3) {
        let (old, new) = hunk_ranges(&group);
        writeln!(
            out,
            "{}@@ -{},{} +{},{} @@{}",
            p.header,
            old.start + 1,
            old.len(),
            new.start + 1,
            new.len(),
            p.reset
        )?;
        for op in &group {
            for change in diff.iter_changes(op) {
                let (sign, color) = match change.tag() {
                    ChangeTag::Delete => ("-", p.delete),
                    ChangeTag::Insert => ("+", p.insert),
                    ChangeTag::Equal => (" ", ""),
                };
                let reset = if color.is_empty() { "" } else { p.reset };
                write!(out, "{color}{sign}{}{reset}", change.value())?;
                if change.missing_newline() {
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

fn hunk_ranges(group: &[DiffOp]) -> (Range<usize>, Range<usize>) {
    match (group.first(), group.last()) {
        (Some(first), Some(last)) => (
            first.old_range().start..last.old_range().end,
            first.new_range().start..last.new_range().end,
        ),
        _ => (0..0, 0..0),
    }
}

/// Represents a summary of changes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffSummary {
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Summarises what an action changed.
    pub fn of(original: &Document, changed: &ChangedDocument) -> Self {
        Self::from_diff(original.text(), changed.text())
    }

    /// Creates a summary from original and modified content.
    pub fn from_diff(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            insertions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} insertions(+), {} deletions(-)",
            self.insertions, self.deletions
        )
    }
}
