//! CS3001, CS3002, CS3003, CS3008: members that are not CLS-compliant.

use crate::action::CodeAction;
use crate::diagnostic::Diagnostic;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::semantic::SemanticModel;
use crate::syntax::nodes::type_node_of;
use crate::syntax::{
    Annotation, Direction, Document, SyntaxEditor, TextSpan, children, find_anchor, is_kind,
    is_valid_identifier,
};
use tree_sitter::Node;

const ARGUMENT_TYPE: &str = "CS3001";
const RETURN_TYPE: &str = "CS3002";
const VARIABLE_TYPE: &str = "CS3003";
const UNDERSCORE_NAME: &str = "CS3008";

const ATTRIBUTE: &str = "[System.CLSCompliant(false)]";

const MEMBER_KINDS: &[&str] = &[
    "field_declaration",
    "event_field_declaration",
    "property_declaration",
    "indexer_declaration",
    "event_declaration",
    "method_declaration",
    "constructor_declaration",
    "operator_declaration",
    "delegate_declaration",
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "enum_declaration",
    "enum_member_declaration",
];

const TYPED_KINDS: &[&str] = &[
    "parameter",
    "variable_declarator",
    "property_declaration",
    "indexer_declaration",
    "method_declaration",
    "operator_declaration",
    "delegate_declaration",
];

/// Renames, retypes or marks members flagged as not CLS-compliant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClsCompliance;

impl CodeFixProvider for ClsCompliance {
    fn id(&self) -> &'static str {
        "cls-compliance"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[ARGUMENT_TYPE, RETURN_TYPE, VARIABLE_TYPE, UNDERSCORE_NAME]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let doc = ctx.document;
        for diagnostic in ctx.diagnostics {
            ctx.token.check()?;
            let fix = match diagnostic.id.as_str() {
                UNDERSCORE_NAME => rename_action(doc, ctx.span, ctx.model, diagnostic),
                _ => change_type_action(doc, ctx.span, diagnostic),
            };
            if let Some(action) = fix {
                ctx.register(action);
            }
        }

        // One mark per member, owned by the member's first diagnostic in the batch.
        let Some(member) = member_at(doc, ctx.span) else {
            return Ok(());
        };
        let flagged: Vec<Diagnostic> = ctx
            .batch()
            .iter()
            .filter(|d| member_at(doc, d.span).is_some_and(|m| m.id() == member.id()))
            .cloned()
            .collect();
        if flagged.first().is_some_and(|first| first.span == ctx.span)
            && let Some(action) = mark_action(doc, member, flagged)
        {
            ctx.register(action);
        }
        Ok(())
    }
}

fn rename_action(
    doc: &Document,
    span: TextSpan,
    model: &dyn SemanticModel,
    diagnostic: &Diagnostic,
) -> Option<CodeAction> {
    let identifier = find_anchor(doc, span, Direction::Innermost, |n| n.kind() == "identifier")?;
    let old = doc.node_text(identifier).to_string();
    let new = old.trim_start_matches('_').to_string();
    if new.is_empty() || !is_valid_identifier(&new) {
        return None;
    }
    if !model.find_references(doc, &new).is_empty() {
        tracing::debug!(%old, %new, "rename would collide with an existing name");
        return None;
    }
    let references = model.find_references(doc, &old);
    let doc = doc.clone();
    let title = format!("Rename '{old}' to '{new}'");
    Some(
        CodeAction::new(title, format!("{}:rename", diagnostic.id), move |_| {
            let mut editor = SyntaxEditor::new(&doc);
            for reference in &references {
                editor.replace(*reference, new.clone());
            }
            editor.apply()
        })
        .fixing([diagnostic.clone()]),
    )
}

fn change_type_action(doc: &Document, span: TextSpan, diagnostic: &Diagnostic) -> Option<CodeAction> {
    let declaration = find_anchor(doc, span, Direction::Ancestors, |n| {
        is_kind(n, TYPED_KINDS) && type_node_of(n).is_some()
    })?;
    let ty = type_node_of(declaration)?;
    let compliant = compliant_type(doc.node_text(ty))?;
    let ty = doc.span_of(ty);
    let doc = doc.clone();
    let title = format!("Change type to '{compliant}'");
    Some(
        CodeAction::new(title, format!("{}:change-type", diagnostic.id), move |_| {
            let mut editor = SyntaxEditor::new(&doc);
            editor.replace(ty, compliant.clone());
            editor.apply()
        })
        .fixing([diagnostic.clone()]),
    )
}

fn member_at(doc: &Document, span: TextSpan) -> Option<Node<'_>> {
    find_anchor(doc, span, Direction::Ancestors, |n| is_kind(n, MEMBER_KINDS))
}

fn mark_action(doc: &Document, member: Node<'_>, flagged: Vec<Diagnostic>) -> Option<CodeAction> {
    let key = format!("{}:mark", flagged.first()?.id);
    if has_cls_attribute(doc, member) {
        return None;
    }
    let (at, text) = if doc.is_first_on_line(member.start_byte()) {
        let indent = doc.indentation_at(member.start_byte());
        (
            doc.line_start(member.start_byte()),
            format!("{indent}{ATTRIBUTE}{}", doc.newline()),
        )
    } else {
        (member.start_byte(), format!("{ATTRIBUTE} "))
    };
    let doc = doc.clone();
    Some(
        CodeAction::new(
            "Mark as [CLSCompliant(false)]",
            key,
            move |_| {
                let mut editor = SyntaxEditor::new(&doc);
                editor
                    .replace(TextSpan::at(at), text.clone())
                    .annotate(Annotation::Simplify);
                editor.apply()
            },
        )
        .fixing(flagged),
    )
}

fn has_cls_attribute(doc: &Document, member: Node<'_>) -> bool {
    children(member)
        .into_iter()
        .filter(|c| c.kind() == "attribute_list")
        .any(|list| doc.node_text(list).contains("CLSCompliant"))
}

/// The CLS-compliant counterpart of an unsigned or signed-byte type,
/// keeping nullable and array suffixes.
fn compliant_type(text: &str) -> Option<String> {
    let split = text.find(['?', '[']).unwrap_or(text.len());
    let (base, suffix) = text.split_at(split);
    let mapped = match base.trim() {
        "uint" => "long",
        "ushort" => "int",
        "ulong" => "decimal",
        "sbyte" => "short",
        "UInt32" => "Int64",
        "UInt16" => "Int32",
        "UInt64" => "Decimal",
        "SByte" => "Int16",
        "System.UInt32" => "System.Int64",
        "System.UInt16" => "System.Int32",
        "System.UInt64" => "System.Decimal",
        "System.SByte" => "System.Int16",
        _ => return None,
    };
    Some(format!("{mapped}{suffix}"))
}
