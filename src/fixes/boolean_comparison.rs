//! RCS1049: simplify a comparison with a boolean literal.

use crate::action::CodeAction;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::semantic::{SemanticModel, TypeRef};
use crate::syntax::{
    Direction, Document, SyntaxEditor, TextSpan, contains_comment, find_anchor, is_kind,
    is_primary_expression, named_children, operator_text, unwrap_parens,
};
use tree_sitter::Node;

const DIAGNOSTIC_ID: &str = "RCS1049";

/// Operands that can take `??` or `!` without extra parentheses.
const TIGHT_OPERANDS: &[&str] = &["cast_expression", "prefix_unary_expression"];

/// Rewrites `b == true`, `b != false`, `b == false` and `b != true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifyBooleanComparison;

/// How the comparison is rewritten, chosen by the operand's type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Simplification {
    /// `b == true` to `b`.
    Keep { operand: String },
    /// `b == false` to `!b`.
    Negate { negated: String },
    /// `n == true` to `n.GetValueOrDefault()`.
    ValueOrDefault { receiver: String },
    /// `n != true` to `!n.GetValueOrDefault()`.
    NotValueOrDefault { receiver: String },
    /// `n != false` to `(n ?? true)`.
    CoalesceTrue { operand: String },
    /// `n == false` to `!(n ?? true)`.
    NotCoalesceTrue { operand: String },
}

impl Simplification {
    fn render(&self) -> String {
        match self {
            Simplification::Keep { operand } => operand.clone(),
            Simplification::Negate { negated } => negated.clone(),
            Simplification::ValueOrDefault { receiver } => format!("{receiver}.GetValueOrDefault()"),
            Simplification::NotValueOrDefault { receiver } => {
                format!("!{receiver}.GetValueOrDefault()")
            }
            Simplification::CoalesceTrue { operand } => format!("({operand} ?? true)"),
            Simplification::NotCoalesceTrue { operand } => format!("!({operand} ?? true)"),
        }
    }
}

/// The operand of the comparison, classified by type.
enum Operand<'t> {
    Bool(Node<'t>),
    NullableBool { operand: String, receiver: String },
}

impl CodeFixProvider for SimplifyBooleanComparison {
    fn id(&self) -> &'static str {
        "simplify-boolean-comparison"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[DIAGNOSTIC_ID]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        let Some((comparison, simplification)) = find_comparison(doc, ctx.span, ctx.model) else {
            return Ok(());
        };
        tracing::debug!(?simplification, "boolean comparison located");
        let replacement = simplification.render();
        let fixed = ctx.diagnostics.to_vec();
        let doc = doc.clone();
        ctx.register(
            CodeAction::new("Simplify boolean comparison", DIAGNOSTIC_ID, move |_| {
                let mut editor = SyntaxEditor::new(&doc);
                editor.replace(comparison, replacement.clone());
                editor.apply()
            })
            .fixing(fixed),
        );
        Ok(())
    }
}

fn literal_value(doc: &Document, node: Node<'_>) -> Option<bool> {
    if node.kind() != "boolean_literal" {
        return None;
    }
    match doc.node_text(node) {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn is_boolean_comparison(doc: &Document, node: Node<'_>) -> bool {
    if node.kind() != "binary_expression" || !matches!(operator_text(doc, node), Some("==" | "!=")) {
        return false;
    }
    let literal = |field| {
        node.child_by_field_name(field)
            .and_then(|n| literal_value(doc, n))
            .is_some()
    };
    literal("left") || literal("right")
}

fn find_comparison(
    doc: &Document,
    span: TextSpan,
    model: &dyn SemanticModel,
) -> Option<(TextSpan, Simplification)> {
    let comparison = find_anchor(doc, span, Direction::Ancestors, |n| {
        is_boolean_comparison(doc, n)
    })?;
    if contains_comment(comparison) {
        return None;
    }
    let left = comparison.child_by_field_name("left")?;
    let right = comparison.child_by_field_name("right")?;
    let (expression, value) = match (literal_value(doc, left), literal_value(doc, right)) {
        (_, Some(value)) => (left, value),
        (Some(value), None) => (right, value),
        (None, None) => return None,
    };
    // True when the comparison holds exactly when the operand is true.
    let affirmative = (operator_text(doc, comparison)? == "==") == value;

    let simplification = match classify(doc, expression, model)? {
        Operand::Bool(operand) if affirmative => Simplification::Keep {
            operand: doc.node_text(operand).to_string(),
        },
        Operand::Bool(operand) => Simplification::Negate {
            negated: negate(doc, operand),
        },
        Operand::NullableBool { receiver, .. } if value && affirmative => {
            Simplification::ValueOrDefault { receiver }
        }
        Operand::NullableBool { receiver, .. } if value => {
            Simplification::NotValueOrDefault { receiver }
        }
        Operand::NullableBool { operand, .. } if affirmative => {
            Simplification::CoalesceTrue { operand }
        }
        Operand::NullableBool { operand, .. } => Simplification::NotCoalesceTrue { operand },
    };
    Some((doc.span_of(comparison), simplification))
}

fn classify<'t>(
    doc: &Document,
    expression: Node<'t>,
    model: &dyn SemanticModel,
) -> Option<Operand<'t>> {
    let inner = unwrap_parens(expression);
    if inner.kind() == "cast_expression"
        && let Some(ty) = inner.child_by_field_name("type")
        && TypeRef::new(doc.node_text(ty)).is_nullable_bool()
    {
        // `(bool?)v`: look through the cast when `v` is already a boolean.
        let value = inner.child_by_field_name("value")?;
        return Some(match model.type_of(doc, value) {
            Some(ty) if ty.is_bool() => Operand::Bool(value),
            Some(ty) if ty.is_nullable_bool() => nullable(doc, value),
            _ => nullable(doc, expression),
        });
    }

    let ty = model.type_of(doc, expression)?;
    if ty.is_bool() {
        Some(Operand::Bool(expression))
    } else if ty.is_nullable_bool() {
        Some(nullable(doc, expression))
    } else {
        None
    }
}

fn nullable<'t>(doc: &Document, expression: Node<'_>) -> Operand<'t> {
    let text = doc.node_text(expression);
    let receiver = if is_primary_expression(expression) {
        text.to_string()
    } else {
        format!("({text})")
    };
    let operand = if is_primary_expression(expression) || is_kind(expression, TIGHT_OPERANDS) {
        text.to_string()
    } else {
        format!("({text})")
    };
    Operand::NullableBool { operand, receiver }
}

/// The text of `!expression`, removing a double negation.
fn negate(doc: &Document, expression: Node<'_>) -> String {
    let inner = unwrap_parens(expression);
    if inner.kind() == "prefix_unary_expression"
        && doc.node_text(inner).starts_with('!')
        && let Some(operand) = named_children(inner).into_iter().last()
    {
        return doc.node_text(operand).to_string();
    }
    let text = doc.node_text(expression);
    if is_primary_expression(expression) {
        format!("!{text}")
    } else {
        format!("!({text})")
    }
}
