//! Splitting a multi-declarator local declaration.

use crate::action::CodeAction;
use crate::dispatch::{RefactoringContext, RefactoringProvider};
use crate::error::Result;
use crate::syntax::nodes::{declarators_of, variable_declaration_of};
use crate::syntax::{
    ChangedDocument, Document, SyntaxEditor, TextSpan, ancestor_of_kind, contains_comment,
};

/// `int a = 1, b = 2;` to `int a = 1;` and `int b = 2;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitVariableDeclaration;

#[derive(Debug, Clone)]
struct Split {
    statement: TextSpan,
    prefix: String,
    declarators: Vec<String>,
    separator: String,
}

impl RefactoringProvider for SplitVariableDeclaration {
    fn id(&self) -> &'static str {
        "split-variable-declaration"
    }

    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()> {
        let Some(plan) = find_target(ctx.document, ctx.span) else {
            return Ok(());
        };
        tracing::debug!(declarators = plan.declarators.len(), "splittable declaration located");
        let doc = ctx.document.clone();
        ctx.register(CodeAction::new(
            "Split variable declaration",
            self.id(),
            move |_| rewrite(&doc, &plan),
        ));
        Ok(())
    }
}

fn find_target(doc: &Document, span: TextSpan) -> Option<Split> {
    let statement = ancestor_of_kind(doc, span, &["local_declaration_statement"])?;
    if contains_comment(statement) {
        return None;
    }
    let declarators = declarators_of(variable_declaration_of(statement)?);
    let first = declarators.first()?;
    if declarators.len() < 2 {
        return None;
    }

    // Modifiers, `using` and the type, including the space before the first name.
    let prefix = doc
        .slice(TextSpan::from_bounds(statement.start_byte(), first.start_byte()))
        .to_string();
    let separator = if doc.is_first_on_line(statement.start_byte()) {
        format!("{}{}", doc.newline(), doc.indentation_at(statement.start_byte()))
    } else {
        " ".to_string()
    };
    Some(Split {
        statement: doc.span_of(statement),
        prefix,
        declarators: declarators
            .iter()
            .map(|d| doc.node_text(*d).to_string())
            .collect(),
        separator,
    })
}

fn rewrite(doc: &Document, plan: &Split) -> Result<ChangedDocument> {
    let statements: Vec<String> = plan
        .declarators
        .iter()
        .map(|declarator| format!("{}{};", plan.prefix, declarator))
        .collect();
    let mut editor = SyntaxEditor::new(doc);
    editor.replace(plan.statement, statements.join(&plan.separator));
    editor.apply()
}
