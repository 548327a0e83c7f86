//! Converting between `x op= y` and `x = x op y`.

use crate::action::CodeAction;
use crate::dispatch::{RefactoringContext, RefactoringProvider};
use crate::error::Result;
use crate::operators::{BinaryOperator, CompoundOperator};
use crate::syntax::nodes::descendants;
use crate::syntax::{
    ChangedDocument, Direction, Document, SyntaxEditor, TextSpan, contains_comment, find_anchor,
    is_kind, is_primary_expression, operator_text, unwrap_parens,
};
use tree_sitter::Node;

/// Expressions that can be evaluated twice without observable difference.
const PURE_TARGET_PARTS: &[&str] = &[
    "identifier",
    "this_expression",
    "this",
    "member_access_expression",
    "element_access_expression",
    "bracketed_argument_list",
    "argument",
    "integer_literal",
    "string_literal",
];

/// `x += y` to `x = x + y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandCompoundAssignment;

/// `x = x + y` to `x += y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UseCompoundAssignment;

/// A compound assignment to expand.
#[derive(Debug, Clone)]
pub(crate) struct Expansion {
    assignment: TextSpan,
    target: String,
    operator: BinaryOperator,
    value: String,
}

/// A simple assignment whose right side repeats its target.
#[derive(Debug, Clone)]
pub(crate) struct Contraction {
    assignment: TextSpan,
    target: String,
    operator: CompoundOperator,
    value: String,
}

impl RefactoringProvider for ExpandCompoundAssignment {
    fn id(&self) -> &'static str {
        "expand-compound-assignment"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(plan) = find_expansion(ctx.document, ctx.span) else {
            return Ok(());
        };
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new(
            format!("Expand '{}='", plan.operator),
            self.id(),
            move |_| expand(&doc, &plan),
        ));
        Ok(())
    }
}

impl RefactoringProvider for UseCompoundAssignment {
    fn id(&self) -> &'static str {
        "use-compound-assignment"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(plan) = find_contraction(ctx.document, ctx.span) else {
            return Ok(());
        };
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new(
            format!("Use '{}'", plan.operator),
            self.id(),
            move |_| contract(&doc, &plan),
        ));
        Ok(())
    }
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn is_pure_target(node: Node<'_>) -> bool {
    descendants(node)
        .into_iter()
        .all(|n| is_kind(n, PURE_TARGET_PARTS))
}

fn operands(node: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    Some((
        node.child_by_field_name("left")?,
        node.child_by_field_name("right")?,
    ))
}

pub(crate) fn find_expansion(doc: &Document, span: TextSpan) -> Option<Expansion> {
    let assignment = find_anchor(doc, span, Direction::Ancestors, |n| {
        n.kind() == "assignment_expression"
            && operator_text(doc, n).is_some_and(|op| CompoundOperator::from_token(op).is_some())
    })?;
    if contains_comment(assignment) {
        return None;
    }
    let operator = CompoundOperator::from_token(operator_text(doc, assignment)?)?.to_binary();
    let (left, right) = operands(assignment)?;
    let value = doc.node_text(right);
    let value = if is_primary_expression(right) {
        value.to_string()
    } else {
        format!("({value})")
    };
    Some(Expansion {
        assignment: doc.span_of(assignment),
        target: doc.node_text(left).to_string(),
        operator,
        value,
    })
}

pub(crate) fn expand(doc: &Document, plan: &Expansion) -> Result<ChangedDocument> {
    let mut editor = SyntaxEditor::new(doc);
    editor.replace(
        plan.assignment,
        format!(
            "{target} = {target} {op} {value}",
            target = plan.target,
            op = plan.operator,
            value = plan.value
        ),
    );
    editor.apply()
}

pub(crate) fn find_contraction(doc: &Document, span: TextSpan) -> Option<Contraction> {
    let assignment = find_anchor(doc, span, Direction::Ancestors, |n| {
        n.kind() == "assignment_expression" && operator_text(doc, n) == Some("=")
    })?;
    if contains_comment(assignment) {
        return None;
    }
    let (left, right) = operands(assignment)?;
    let binary = unwrap_parens(right);
    if binary.kind() != "binary_expression" {
        return None;
    }
    let operator = BinaryOperator::from_token(operator_text(doc, binary)?)?.to_compound();
    let (operand, value) = operands(binary)?;
    if !is_pure_target(left) || squash(doc.node_text(left)) != squash(doc.node_text(operand)) {
        return None;
    }
    Some(Contraction {
        assignment: doc.span_of(assignment),
        target: doc.node_text(left).to_string(),
        operator,
        value: doc.node_text(unwrap_parens(value)).to_string(),
    })
}

pub(crate) fn contract(doc: &Document, plan: &Contraction) -> Result<ChangedDocument> {
    let mut editor = SyntaxEditor::new(doc);
    editor.replace(
        plan.assignment,
        format!("{} {} {}", plan.target, plan.operator, plan.value),
    );
    editor.apply()
}

impl Contraction {
    pub(crate) fn operator(&self) -> CompoundOperator {
        self.operator
    }
}
