//! The provider contract and the shell that drives it.
//!
//! For every invocation the [`Dispatcher`] runs each provider through the
//! same steps: gate on [`FixSettings`], hand it the diagnostics it declared
//! (grouped by span) or the selection span, and collect whatever actions it
//! registers. A provider that fails contributes nothing; the rest of the
//! batch is unaffected. Only cancellation stops the batch.

use crate::action::{ActionSink, CodeAction};
use crate::cancel::CancellationToken;
use crate::config::FixSettings;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::semantic::SemanticModel;
use crate::syntax::{Document, TextSpan};
use serde::Serialize;
use std::sync::Arc;

/// Reacts to a fixed set of diagnostic ids.
pub trait CodeFixProvider: Send + Sync {
    /// Settings key of this provider.
    fn id(&self) -> &'static str;

    /// Diagnostic ids this provider can fix.
    fn fixable_diagnostic_ids(&self) -> &'static [&'static str];

    /// Registers zero or more actions for the diagnostics in `ctx`.
    fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()>;
}

/// Offers transformations for a selection span.
pub trait RefactoringProvider: Send + Sync {
    /// Settings key of this provider.
    fn id(&self) -> &'static str;

    /// Registers zero or more actions for the span in `ctx`.
    fn compute_refactorings(&self, ctx: &mut RefactoringContext<'_>) -> Result<()>;
}

/// Inputs of one code-fix invocation.
pub struct CodeFixContext<'a> {
    pub document: &'a Document,
    /// Span shared by `diagnostics`.
    pub span: TextSpan,
    /// Diagnostics at `span` that this provider declared.
    pub diagnostics: &'a [Diagnostic],
    pub model: &'a dyn SemanticModel,
    pub token: &'a CancellationToken,
    batch: &'a [Diagnostic],
    provider: &'static str,
    sink: &'a mut ActionSink,
}

impl CodeFixContext<'_> {
    /// Every diagnostic of the batch this provider declared, at any span.
    pub fn batch(&self) -> &[Diagnostic] {
        self.batch
    }

    pub fn register(&mut self, action: CodeAction) {
        self.sink.push(action.from_provider(self.provider));
    }
}

/// Inputs of one refactoring invocation.
pub struct RefactoringContext<'a> {
    pub document: &'a Document,
    pub span: TextSpan,
    pub model: &'a dyn SemanticModel,
    pub token: &'a CancellationToken,
    provider: &'static str,
    sink: &'a mut ActionSink,
}

impl RefactoringContext<'_> {
    pub fn register(&mut self, action: CodeAction) {
        self.sink.push(action.from_provider(self.provider));
    }
}

/// What kind of provider an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    CodeFix,
    Refactoring,
}

/// Description of a registered provider.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub kind: ProviderKind,
    pub diagnostic_ids: Vec<&'static str>,
}

/// Runs providers against a document and collects their actions.
pub struct Dispatcher {
    settings: Arc<FixSettings>,
    fix_providers: Vec<Box<dyn CodeFixProvider>>,
    refactoring_providers: Vec<Box<dyn RefactoringProvider>>,
}

impl Dispatcher {
    /// Creates a dispatcher without providers.
    pub fn new(settings: Arc<FixSettings>) -> Self {
        Self {
            settings,
            fix_providers: Vec::new(),
            refactoring_providers: Vec::new(),
        }
    }

    /// Creates a dispatcher with every provider shipped by this crate.
    pub fn with_builtin_providers(settings: Arc<FixSettings>) -> Self {
        let mut dispatcher = Self::new(settings);
        for provider in crate::fixes::builtin() {
            dispatcher.fix_providers.push(provider);
        }
        for provider in crate::refactorings::builtin() {
            dispatcher.refactoring_providers.push(provider);
        }
        dispatcher
    }

    pub fn add_code_fix_provider(&mut self, provider: Box<dyn CodeFixProvider>) -> &mut Self {
        self.fix_providers.push(provider);
        self
    }

    pub fn add_refactoring_provider(
        &mut self,
        provider: Box<dyn RefactoringProvider>,
    ) -> &mut Self {
        self.refactoring_providers.push(provider);
        self
    }

    pub fn settings(&self) -> &FixSettings {
        &self.settings
    }

    /// Describes every registered provider.
    pub fn providers(&self) -> Vec<ProviderInfo> {
        let fixes = self.fix_providers.iter().map(|p| ProviderInfo {
            id: p.id(),
            kind: ProviderKind::CodeFix,
            diagnostic_ids: p.fixable_diagnostic_ids().to_vec(),
        });
        let refactorings = self.refactoring_providers.iter().map(|p| ProviderInfo {
            id: p.id(),
            kind: ProviderKind::Refactoring,
            diagnostic_ids: Vec::new(),
        });
        fixes.chain(refactorings).collect()
    }

    /// Collects code fixes for a batch of diagnostics.
    ///
    /// Returns `Err` only on cancellation.
    pub fn code_fixes(
        &self,
        document: &Document,
        diagnostics: &[Diagnostic],
        model: &dyn SemanticModel,
        token: &CancellationToken,
    ) -> Result<Vec<CodeAction>> {
        let mut actions = Vec::new();
        for provider in &self.fix_providers {
            token.check()?;
            if !self.settings.is_enabled(provider.id()) {
                tracing::debug!(provider = provider.id(), "provider disabled");
                continue;
            }
            let declared = provider.fixable_diagnostic_ids();
            let batch: Vec<Diagnostic> = diagnostics
                .iter()
                .filter(|d| declared.contains(&d.id.as_str()))
                .filter(|d| self.settings.is_enabled(&d.id))
                .filter(|d| {
                    let in_range = d.span.end() <= document.len();
                    if !in_range {
                        tracing::debug!(id = %d.id, span = %d.span, "diagnostic outside document");
                    }
                    in_range
                })
                .cloned()
                .collect();

            for (span, group) in group_by_span(&batch) {
                let mut sink = ActionSink::new();
                let mut ctx = CodeFixContext {
                    document,
                    span,
                    diagnostics: &group,
                    model,
                    token,
                    batch: &batch,
                    provider: provider.id(),
                    sink: &mut sink,
                };
                match provider.register_code_fixes(&mut ctx) {
                    Ok(()) => actions.extend(sink.into_actions()),
                    Err(e) if e.is_cancelled() => return Err(e),
                    Err(e) => {
                        tracing::warn!(provider = provider.id(), %span, error = %e, "code fix provider failed");
                    }
                }
            }
        }
        Ok(actions)
    }

    /// Collects refactorings for a selection span.
    ///
    /// Returns `Err` only on cancellation.
    pub fn refactorings(
        &self,
        document: &Document,
        span: TextSpan,
        model: &dyn SemanticModel,
        token: &CancellationToken,
    ) -> Result<Vec<CodeAction>> {
        let mut actions = Vec::new();
        if span.end() > document.len() {
            tracing::debug!(%span, "selection outside document");
            return Ok(actions);
        }
        for provider in &self.refactoring_providers {
            token.check()?;
            if !self.settings.is_enabled(provider.id()) {
                tracing::debug!(provider = provider.id(), "provider disabled");
                continue;
            }
            let mut sink = ActionSink::new();
            let mut ctx = RefactoringContext {
                document,
                span,
                model,
                token,
                provider: provider.id(),
                sink: &mut sink,
            };
            match provider.compute_refactorings(&mut ctx) {
                Ok(()) => actions.extend(sink.into_actions()),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    tracing::warn!(provider = provider.id(), %span, error = %e, "refactoring provider failed");
                }
            }
        }
        Ok(actions)
    }
}

fn group_by_span(diagnostics: &[Diagnostic]) -> Vec<(TextSpan, Vec<Diagnostic>)> {
    let mut groups: Vec<(TextSpan, Vec<Diagnostic>)> = Vec::new();
    for diagnostic in diagnostics {
        match groups.iter_mut().find(|(span, _)| *span == diagnostic.span) {
            Some((_, group)) => group.push(diagnostic.clone()),
            None => groups.push((diagnostic.span, vec![diagnostic.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixError;
    use crate::semantic::SyntacticModel;
    use crate::syntax::SyntaxEditor;

    struct Echo {
        id: &'static str,
        ids: &'static [&'static str],
    }

    impl CodeFixProvider for Echo {
        fn id(&self) -> &'static str {
            self.id
        }

        fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
            self.ids
        }

        fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
            for diagnostic in ctx.diagnostics {
                let doc = ctx.document.clone();
                let action = CodeAction::new(
                    format!("Fix {}", diagnostic.id),
                    diagnostic.id.clone(),
                    move |_| SyntaxEditor::new(&doc).apply(),
                );
                ctx.register(action.fixing([diagnostic.clone()]));
            }
            Ok(())
        }
    }

    struct Failing;

    impl CodeFixProvider for Failing {
        fn id(&self) -> &'static str {
            "failing"
        }

        fn fixable_diagnostic_ids(&self) -> &'static [&'static str] {
            &["X1"]
        }

        fn register_code_fixes(&self, ctx: &mut CodeFixContext<'_>) -> Result<()> {
            let doc = ctx.document.clone();
            ctx.register(CodeAction::new("partial", "partial", move |_| {
                SyntaxEditor::new(&doc).apply()
            }));
            Err(FixError::InvalidConfig("boom".to_string()))
        }
    }

    fn dispatcher(settings: FixSettings) -> Dispatcher {
        let mut dispatcher = Dispatcher::new(Arc::new(settings));
        dispatcher
            .add_code_fix_provider(Box::new(Echo { id: "first", ids: &["X1"] }))
            .add_code_fix_provider(Box::new(Failing))
            .add_code_fix_provider(Box::new(Echo { id: "second", ids: &["X2"] }));
        dispatcher
    }

    fn diagnostics() -> Vec<Diagnostic> {
        vec![
            Diagnostic::new("X1", TextSpan::new(0, 5)),
            Diagnostic::new("X2", TextSpan::new(6, 1)),
            Diagnostic::new("X3", TextSpan::new(6, 1)),
        ]
    }

    #[test]
    fn test_only_declared_ids_are_dispatched() {
        let doc = Document::parse("class C { }").unwrap();
        let actions = dispatcher(FixSettings::new())
            .code_fixes(&doc, &diagnostics(), &SyntacticModel, &CancellationToken::new())
            .unwrap();

        let keys: Vec<_> = actions.iter().map(|a| a.equivalence_key()).collect();
        assert_eq!(keys, vec!["X1", "X2"]);
        assert_eq!(actions[0].provider(), "first");
        assert_eq!(actions[1].provider(), "second");
    }

    #[test]
    fn test_disabled_provider_does_not_interfere() {
        let doc = Document::parse("class C { }").unwrap();
        let actions = dispatcher(FixSettings::new().disable("first"))
            .code_fixes(&doc, &diagnostics(), &SyntacticModel, &CancellationToken::new())
            .unwrap();

        assert!(actions.iter().all(|a| a.provider() != "first"));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].equivalence_key(), "X2");
    }

    #[test]
    fn test_disabled_diagnostic_id() {
        let doc = Document::parse("class C { }").unwrap();
        let actions = dispatcher(FixSettings::new().disable("X2"))
            .code_fixes(&doc, &diagnostics(), &SyntacticModel, &CancellationToken::new())
            .unwrap();

        let keys: Vec<_> = actions.iter().map(|a| a.equivalence_key()).collect();
        assert_eq!(keys, vec!["X1"]);
    }

    #[test]
    fn test_failed_provider_contributes_nothing() {
        let doc = Document::parse("class C { }").unwrap();
        let actions = dispatcher(FixSettings::new())
            .code_fixes(&doc, &diagnostics(), &SyntacticModel, &CancellationToken::new())
            .unwrap();
        assert!(actions.iter().all(|a| a.equivalence_key() != "partial"));
    }

    #[test]
    fn test_cancellation_stops_batch() {
        let doc = Document::parse("class C { }").unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let result = dispatcher(FixSettings::new()).code_fixes(
            &doc,
            &diagnostics(),
            &SyntacticModel,
            &token,
        );
        assert!(matches!(result, Err(FixError::Cancelled)));
    }

    #[test]
    fn test_out_of_range_diagnostic_is_skipped() {
        let doc = Document::parse("class C { }").unwrap();
        let diagnostics = vec![Diagnostic::new("X1", TextSpan::new(400, 2))];
        let actions = dispatcher(FixSettings::new())
            .code_fixes(&doc, &diagnostics, &SyntacticModel, &CancellationToken::new())
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_overflowing_spans_are_skipped() {
        let doc = Document::parse("class C { }").unwrap();
        let diagnostics = vec![
            Diagnostic::new("X1", TextSpan::new(usize::MAX, 2)),
            Diagnostic::new("X2", TextSpan::new(6, 1)),
        ];
        let actions = dispatcher(FixSettings::new())
            .code_fixes(&doc, &diagnostics, &SyntacticModel, &CancellationToken::new())
            .unwrap();
        let keys: Vec<_> = actions.iter().map(|a| a.equivalence_key()).collect();
        assert_eq!(keys, vec!["X2"]);

        let refactorings = Dispatcher::with_builtin_providers(Arc::new(FixSettings::new()))
            .refactorings(
                &doc,
                TextSpan::new(usize::MAX - 1, 5),
                &SyntacticModel,
                &CancellationToken::new(),
            )
            .unwrap();
        assert!(refactorings.is_empty());
    }

    #[test]
    fn test_group_by_span() {
        let groups = group_by_span(&[
            Diagnostic::new("A", TextSpan::new(1, 1)),
            Diagnostic::new("B", TextSpan::new(2, 1)),
            Diagnostic::new("C", TextSpan::new(1, 1)),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1.len(), 2);
    }
}
