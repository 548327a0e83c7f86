//! CS0152: the switch statement contains multiple cases with the same label value.

use crate::action::CodeAction;
use crate::diagnostic::Diagnostic;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::syntax::nodes::{descendants, parent_of_kind};
use crate::syntax::{Document, SyntaxEditor, TextSpan, ancestor_of_kind, children, is_kind};
use tree_sitter::Node;

const DIAGNOSTIC_ID: &str = "CS0152";

const LABEL_KINDS: &[&str] = &[
    "case_switch_label",
    "case_pattern_switch_label",
    "default_switch_label",
    "switch_label",
];

const SWITCHES: &[&str] = &["switch_statement", "switch_expression"];

/// Removes duplicate `case` labels, or whole sections made only of duplicates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveDuplicateCaseLabel;

struct Section {
    span: TextSpan,
    labels: Vec<TextSpan>,
}

impl CodeFixProvider for RemoveDuplicateCaseLabel {
    fn id(&self) -> &'static str {
        "remove-duplicate-case-label"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[DIAGNOSTIC_ID]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        let Some(switch) = ancestor_of_kind(doc, ctx.span, &["switch_section"])
            .and_then(|section| parent_of_kind(section, SWITCHES))
        else {
            return Ok(());
        };
        let sections = sections_of(doc, switch);

        let flagged: Vec<&Diagnostic> = ctx
            .batch()
            .iter()
            .filter(|d| d.id == DIAGNOSTIC_ID)
            .filter(|d| {
                sections
                    .iter()
                    .any(|s| s.labels.iter().any(|l| l.contains_span(d.span)))
            })
            .collect();
        // One action per switch: only the first flagged diagnostic registers it.
        if flagged.first().is_none_or(|first| first.span != ctx.span) {
            return Ok(());
        }

        let mut removals = Vec::new();
        for section in &sections {
            let hit: Vec<TextSpan> = section
                .labels
                .iter()
                .copied()
                .filter(|label| flagged.iter().any(|d| label.contains_span(d.span)))
                .collect();
            if hit.is_empty() {
                continue;
            }
            if hit.len() == section.labels.len() {
                removals.push(section.span);
            } else {
                removals.extend(hit);
            }
        }
        tracing::debug!(removals = removals.len(), "duplicate case labels located");

        let fixed: Vec<Diagnostic> = flagged.into_iter().cloned().collect();
        let doc = doc.clone();
        let action = CodeAction::new("Remove duplicate case label", DIAGNOSTIC_ID, move |_| {
            let mut editor = SyntaxEditor::new(&doc);
            for span in &removals {
                editor.remove_span(*span);
            }
            editor.apply()
        })
        .fixing(fixed);
        ctx.register(action);
        Ok(())
    }
}

fn sections_of(doc: &Document, switch: Node<'_>) -> Vec<Section> {
    descendants(switch)
        .into_iter()
        .filter(|n| n.kind() == "switch_section")
        .filter(|n| parent_of_kind(*n, SWITCHES) == Some(switch))
        .map(|section| Section {
            span: doc.span_of(section),
            labels: labels_of(section),
        })
        .collect()
}

/// Label spans of a section, whether the grammar wraps them in label nodes
/// or lays out `case ... :` tokens directly in the section.
fn labels_of(section: Node<'_>) -> Vec<TextSpan> {
    let kids = children(section);
    let mut labels = Vec::new();
    let mut i = 0;
    while i < kids.len() {
        let kid = kids[i];
        if is_kind(kid, LABEL_KINDS) {
            labels.push(TextSpan::from_bounds(kid.start_byte(), kid.end_byte()));
        } else if matches!(kid.kind(), "case" | "default")
            && let Some(offset) = kids[i..].iter().position(|k| k.kind() == ":")
        {
            let colon = kids[i + offset];
            labels.push(TextSpan::from_bounds(kid.start_byte(), colon.end_byte()));
            i += offset;
        }
        i += 1;
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::test_support::{apply, diagnostic, diagnostic_nth, fix};

    fn method(body: &str) -> String {
        format!("class C\n{{\n    void M(int x)\n    {{\n{body}    }}\n}}\n")
    }

    #[test]
    fn test_removes_section_of_only_duplicates() {
        let source = method(
            "        switch (x)\n        {\n            case 1:\n                A();\n                break;\n            case 1:\n                B();\n                break;\n        }\n",
        );
        let diagnostics = [diagnostic_nth(DIAGNOSTIC_ID, &source, "case 1:", 1)];
        let actions = fix(RemoveDuplicateCaseLabel, &source, &diagnostics);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].diagnostics().len(), 1);
        assert_eq!(
            apply(&actions[0]),
            method(
                "        switch (x)\n        {\n            case 1:\n                A();\n                break;\n        }\n"
            )
        );
    }

    #[test]
    fn test_removes_only_flagged_label() {
        let source = method(
            "        switch (x)\n        {\n            case 1:\n                A();\n                break;\n            case 2:\n            case 1:\n                B();\n                break;\n        }\n",
        );
        let diagnostics = [diagnostic_nth(DIAGNOSTIC_ID, &source, "case 1:", 1)];
        let actions = fix(RemoveDuplicateCaseLabel, &source, &diagnostics);
        assert_eq!(
            apply(&actions[0]),
            method(
                "        switch (x)\n        {\n            case 1:\n                A();\n                break;\n            case 2:\n                B();\n                break;\n        }\n"
            )
        );
    }

    #[test]
    fn test_fixes_all_duplicates_in_switch_together() {
        let source = method(
            "        switch (x)\n        {\n            case 1: A(); break;\n            case 1: B(); break;\n            case 1: C(); break;\n        }\n",
        );
        let diagnostics = [
            diagnostic_nth(DIAGNOSTIC_ID, &source, "case 1:", 1),
            diagnostic_nth(DIAGNOSTIC_ID, &source, "case 1:", 2),
        ];
        let actions = fix(RemoveDuplicateCaseLabel, &source, &diagnostics);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].diagnostics().len(), 2);
        assert_eq!(
            apply(&actions[0]),
            method("        switch (x)\n        {\n            case 1: A(); break;\n        }\n")
        );
    }

    #[test]
    fn test_diagnostic_outside_switch_registers_nothing() {
        let source = method("        A();\n");
        let diagnostics = [diagnostic(DIAGNOSTIC_ID, &source, "A()")];
        assert!(fix(RemoveDuplicateCaseLabel, &source, &diagnostics).is_empty());
    }
}
