//! CS8123: a tuple element name is ignored because the target type names it differently.

use crate::action::CodeAction;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::semantic::{SemanticModel, TypeRef};
use crate::syntax::nodes::{argument_expression, argument_name, type_node_of};
use crate::syntax::{Document, SyntaxEditor, TextSpan, ancestor_of_kind, named_children};
use tree_sitter::Node;

const DIAGNOSTIC_ID: &str = "CS8123";

/// Renames a tuple element to the target's element name, or drops the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixTupleElementName;

#[derive(Debug, Clone)]
enum ElementFix {
    Rename { name: TextSpan, from: String, to: String },
    RemoveName { prefix: TextSpan, from: String },
}

impl ElementFix {
    fn title(&self) -> String {
        match self {
            ElementFix::Rename { from, to, .. } => format!("Rename tuple element '{from}' to '{to}'"),
            ElementFix::RemoveName { from, .. } => format!("Remove tuple element name '{from}'"),
        }
    }
}

impl CodeFixProvider for FixTupleElementName {
    fn id(&self) -> &'static str {
        "fix-tuple-element-name"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[DIAGNOSTIC_ID]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        let Some(fix) = find_fix(doc, ctx.span, ctx.model) else {
            return Ok(());
        };
        tracing::debug!(?fix, "tuple element fix located");
        let fixed = ctx.diagnostics.to_vec();
        let doc = doc.clone();
        ctx.register(
            CodeAction::new(fix.title(), DIAGNOSTIC_ID, move |_| {
                let mut editor = SyntaxEditor::new(&doc);
                match &fix {
                    ElementFix::Rename { name, to, .. } => editor.replace(*name, to.clone()),
                    ElementFix::RemoveName { prefix, .. } => editor.replace(*prefix, ""),
                };
                editor.apply()
            })
            .fixing(fixed),
        );
        Ok(())
    }
}

fn find_fix(doc: &Document, span: TextSpan, model: &dyn SemanticModel) -> Option<ElementFix> {
    let tuple = ancestor_of_kind(doc, span, &["tuple_expression"])?;
    let target = target_type(doc, tuple, model)?;
    let expected = target.tuple_element_names()?;
    let elements: Vec<Node<'_>> = named_children(tuple)
        .into_iter()
        .filter(|c| c.kind() == "argument")
        .collect();
    if elements.len() != expected.len() {
        return None;
    }

    let mismatches: Vec<(Node<'_>, Node<'_>, Option<&String>)> = elements
        .iter()
        .zip(&expected)
        .filter_map(|(element, wanted)| {
            let name = argument_name(*element)?;
            (wanted.as_deref() != Some(doc.node_text(name))).then_some((*element, name, wanted.as_ref()))
        })
        .collect();
    let at_span = mismatches.iter().find(|(element, _, _)| {
        element.start_byte() <= span.start && span.end() <= element.end_byte()
    });
    let &(element, name, wanted) = at_span.or(mismatches.first())?;

    let from = doc.node_text(name).to_string();
    Some(match wanted {
        Some(to) => ElementFix::Rename {
            name: doc.span_of(name),
            from,
            to: to.clone(),
        },
        None => {
            let value = argument_expression(element)?;
            ElementFix::RemoveName {
                prefix: TextSpan::from_bounds(name.start_byte(), value.start_byte()),
                from,
            }
        }
    })
}

/// The tuple type the literal is converted to.
fn target_type(doc: &Document, tuple: Node<'_>, model: &dyn SemanticModel) -> Option<TypeRef> {
    let mut parent = tuple.parent()?;
    if parent.kind() == "equals_value_clause" {
        parent = parent.parent()?;
    }
    match parent.kind() {
        "variable_declarator" => {
            let ty = doc.node_text(type_node_of(parent)?);
            (ty != "var").then(|| TypeRef::new(ty))
        }
        "assignment_expression" => model.type_of(doc, parent.child_by_field_name("left")?),
        "return_statement" | "arrow_expression_clause" => model.enclosing_return_type(doc, tuple),
        _ => None,
    }
}
