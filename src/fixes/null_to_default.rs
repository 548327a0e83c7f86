//! CS1503 / CS0037: `null` used where a non-nullable value type is expected.

use crate::action::CodeAction;
use crate::diagnostic::Diagnostic;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::resolver::CandidateSet;
use crate::semantic::{SemanticModel, TypeRef};
use crate::syntax::nodes::{argument_name, arguments_of, type_node_of};
use crate::syntax::{Direction, Document, SyntaxEditor, TextSpan, find_anchor};
use tree_sitter::Node;

const ARGUMENT_MISMATCH: &str = "CS1503";
const NULL_TO_VALUE_TYPE: &str = "CS0037";

/// Replaces `null` with `default(T)` for the value type the target expects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceNullWithDefault;

impl CodeFixProvider for ReplaceNullWithDefault {
    fn id(&self) -> &'static str {
        "replace-null-with-default"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[ARGUMENT_MISMATCH, NULL_TO_VALUE_TYPE]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        let Some(null) = find_anchor(doc, ctx.span, Direction::Innermost, |n| {
            n.kind() == "null_literal"
        }) else {
            return Ok(());
        };
        let null_span = doc.span_of(null);

        for diagnostic in ctx.diagnostics {
            ctx.token.check()?;
            let actions = match diagnostic.id.as_str() {
                ARGUMENT_MISMATCH => {
                    let mut candidates = CandidateSet::new(ARGUMENT_MISMATCH);
                    for ty in argument_candidates(doc, null, ctx.model) {
                        candidates.push(ty.display().to_string(), ty);
                    }
                    tracing::debug!(
                        candidates = candidates.len(),
                        "parameter types for null argument"
                    );
                    candidates.into_actions(|key, _, ty| {
                        replacement(doc, null_span, &ty, key, diagnostic)
                    })
                }
                NULL_TO_VALUE_TYPE => target_type(doc, null, ctx.model)
                    .map(|ty| {
                        let key = NULL_TO_VALUE_TYPE.to_string();
                        replacement(doc, null_span, &ty, key, diagnostic)
                    })
                    .into_iter()
                    .collect(),
                _ => Vec::new(),
            };
            for action in actions {
                ctx.register(action);
            }
        }
        Ok(())
    }
}

fn replacement(
    doc: &Document,
    null: TextSpan,
    ty: &TypeRef,
    key: String,
    diagnostic: &Diagnostic,
) -> CodeAction {
    let text = format!("default({ty})");
    let doc = doc.clone();
    CodeAction::new(format!("Replace 'null' with '{text}'"), key, move |_| {
        let mut editor = SyntaxEditor::new(&doc);
        editor.replace(null, text.clone());
        editor.apply()
    })
    .fixing([diagnostic.clone()])
}

/// Value types the argument may bind to across the overloads.
fn argument_candidates(doc: &Document, null: Node<'_>, model: &dyn SemanticModel) -> Vec<TypeRef> {
    let Some(argument) = null.parent().filter(|p| p.kind() == "argument") else {
        return Vec::new();
    };
    let Some(call) = argument.parent().and_then(|list| list.parent()) else {
        return Vec::new();
    };
    let Some(index) = arguments_of(call).iter().position(|a| *a == argument) else {
        return Vec::new();
    };
    let name = argument_name(argument).map(|n| doc.node_text(n));
    model
        .parameter_types(doc, call, index, name)
        .into_iter()
        .filter(|ty| model.is_value_type(doc, ty))
        .collect()
}

/// The type `null` is converted to by a declaration, assignment or return.
fn target_type(doc: &Document, null: Node<'_>, model: &dyn SemanticModel) -> Option<TypeRef> {
    let mut parent = null.parent()?;
    if parent.kind() == "equals_value_clause" {
        parent = parent.parent()?;
    }
    match parent.kind() {
        "variable_declarator" => {
            let ty = doc.node_text(type_node_of(parent)?);
            (ty != "var").then(|| TypeRef::new(ty))
        }
        "assignment_expression" => {
            let left = parent.child_by_field_name("left")?;
            model.type_of(doc, left)
        }
        "return_statement" | "arrow_expression_clause" => model.enclosing_return_type(doc, null),
        _ => None,
    }
}
