//! IDE0054: use compound assignment.

use crate::action::CodeAction;
use crate::dispatch::{CodeFixContext, CodeFixProvider};
use crate::error::Result;
use crate::refactorings::compound_assignment::{contract, find_contraction};

const DIAGNOSTIC_ID: &str = "IDE0054";

/// Code-fix form of [`crate::refactorings::UseCompoundAssignment`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UseCompoundAssignmentFix;

impl CodeFixProvider for UseCompoundAssignmentFix {
    fn id(&self) -> &'static str {
        "use-compound-assignment-fix"
    }

    fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
        &[DIAGNOSTIC_ID]
    }

    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
        let Some(plan) = find_contraction(ctx.document, ctx.span) else {
            return Ok(());
        };
        let fixed = ctx.diagnostics.to_vec();
        let doc = ctx.document.clone();
        ctx.register(
            CodeAction::new(
                format!("Use '{}'", plan.operator()),
                DIAGNOSTIC_ID,
                move |_| contract(&doc, &plan),
            )
            .fixing(fixed),
        );
        Ok(())
    }
}
