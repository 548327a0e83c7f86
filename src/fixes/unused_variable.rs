//! CS0168 / CS0219: a local variable is declared (or assigned) but never used.

use crate::action::CodeAction;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::syntax::nodes::{descendants, declarators_of, initializer_of, name_of, parent_of_kind};
use crate::syntax::{Document, SyntaxEditor, TextSpan, ancestor_of_kind, children, is_kind};
use tree_sitter::Node;

const DECLARED_NEVER_USED: &str = "CS0168";
const ASSIGNED_NEVER_USED: &str = "CS0219";

/// Expressions whose evaluation may be observable.
const SIDE_EFFECTS: &[&str] = &[
    "invocation_expression",
    "object_creation_expression",
    "implicit_object_creation_expression",
    "assignment_expression",
    "postfix_unary_expression",
    "await_expression",
    "throw_expression",
];

/// Removes an unused local, or just its declarator when others remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnusedVariable;

impl CodeFixProvider for RemoveUnusedVariable {
    fn id(&self) -> &'static str {
        "remove-unused-variable"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[DECLARED_NEVER_USED, ASSIGNED_NEVER_USED]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        let Some((name, removal)) = find_removal(doc, ctx.span) else {
            return Ok(());
        };
        let Some(diagnostic) = ctx.diagnostics.first() else {
            return Ok(());
        };
        let key = diagnostic.id.clone();
        let fixed = ctx.diagnostics.to_vec();
        let doc = doc.clone();
        ctx.register(
            CodeAction::new(format!("Remove unused variable '{name}'"), key, move |_| {
                let mut editor = SyntaxEditor::new(&doc);
                match removal {
                    Removal::Statement(span) => editor.remove_span(span),
                    Removal::Declarator(span) => editor.replace(span, ""),
                };
                editor.apply()
            })
            .fixing(fixed),
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Removal {
    /// The whole declaration statement, with its line when it has one.
    Statement(TextSpan),
    /// One declarator and the comma separating it from a neighbour.
    Declarator(TextSpan),
}

fn find_removal(doc: &Document, span: TextSpan) -> Option<(String, Removal)> {
    let declarator = ancestor_of_kind(doc, span, &["variable_declarator"])?;
    let statement = parent_of_kind(declarator, &["local_declaration_statement"])?;
    if children(statement).iter().any(|c| c.kind() == "using") {
        return None;
    }
    if let Some(init) = initializer_of(declarator)
        && has_side_effects(doc, init)
    {
        tracing::debug!("initializer may have side effects");
        return None;
    }
    let name = doc.node_text(name_of(declarator)?).to_string();

    let declaration = declarator.parent()?;
    let declarators = declarators_of(declaration);
    if declarators.len() == 1 {
        return Some((name, Removal::Statement(doc.span_of(statement))));
    }
    let index = declarators.iter().position(|d| *d == declarator)?;
    let removal = match declarators.get(index + 1) {
        Some(next) => TextSpan::from_bounds(declarator.start_byte(), next.start_byte()),
        None => TextSpan::from_bounds(declarators[index - 1].end_byte(), declarator.end_byte()),
    };
    Some((name, Removal::Declarator(removal)))
}

fn has_side_effects(doc: &Document, init: Node<'_>) -> bool {
    descendants(init).into_iter().any(|n| {
        is_kind(n, SIDE_EFFECTS)
            || (n.kind() == "prefix_unary_expression" && {
                let text = doc.node_text(n);
                text.starts_with("++") || text.starts_with("--")
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixes::test_support::{apply, diagnostic, fix};

    #[test]
    fn test_removes_statement_line() {
        let source = "class C\n{\n    void M()\n    {\n        int unused = 1;\n        Run();\n    }\n}\n";
        let diagnostics = [diagnostic(ASSIGNED_NEVER_USED, source, "unused")];
        let actions = fix(RemoveUnusedVariable, source, &diagnostics);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title(), "Remove unused variable 'unused'");
        assert_eq!(actions[0].equivalence_key(), "CS0219");
        assert_eq!(
            apply(&actions[0]),
            "class C\n{\n    void M()\n    {\n        Run();\n    }\n}\n"
        );
    }

    #[test]
    fn test_removes_single_declarator() {
        let source = "class C { void M() { int a = 1, b = 2, c = 3; } }";
        let first = [diagnostic(ASSIGNED_NEVER_USED, source, "a = 1")];
        assert_eq!(
            apply(&fix(RemoveUnusedVariable, source, &first)[0]),
            "class C { void M() { int b = 2, c = 3; } }"
        );
        let last = [diagnostic(ASSIGNED_NEVER_USED, source, "c = 3")];
        assert_eq!(
            apply(&fix(RemoveUnusedVariable, source, &last)[0]),
            "class C { void M() { int a = 1, b = 2; } }"
        );
    }

    #[test]
    fn test_declared_without_initializer() {
        let source = "class C { void M() { int x; Run(); } }";
        let diagnostics = [diagnostic(DECLARED_NEVER_USED, source, "x")];
        assert_eq!(
            apply(&fix(RemoveUnusedVariable, source, &diagnostics)[0]),
            "class C { void M() { Run(); } }"
        );
    }

    #[test]
    fn test_side_effecting_initializer_not_applicable() {
        for init in ["Load()", "new Thing()", "i++", "++i", "y = 2"] {
            let source = format!("class C {{ void M(int i, int y) {{ var x = {init}; }} }}");
            let diagnostics = [diagnostic(ASSIGNED_NEVER_USED, &source, "x =")];
            assert!(fix(RemoveUnusedVariable, &source, &diagnostics).is_empty(), "{init}");
        }
    }

    #[test]
    fn test_field_not_applicable() {
        let source = "class C { int x = 1; }";
        let diagnostics = [diagnostic(ASSIGNED_NEVER_USED, source, "x")];
        assert!(fix(RemoveUnusedVariable, source, &diagnostics).is_empty());
    }
}
