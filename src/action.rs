//! Lazily computed code actions and the sink providers register them with.

use crate::cancel::CancellationToken;
use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::syntax::ChangedDocument;
use std::fmt;
use std::sync::Arc;

type ComputeFn = dyn Fn(&CancellationToken) -> Result<ChangedDocument> + Send + Sync;

/// A named, not-yet-executed transformation.
///
/// Registering an action computes nothing; the rewrite runs only when the
/// caller picks the action and calls [`CodeAction::apply`]. The input
/// document is an immutable snapshot, so applying the same action twice
/// yields the same result.
#[derive(Clone)]
pub struct CodeAction {
    title: String,
    equivalence_key: String,
    provider: &'static str,
    diagnostics: Vec<Diagnostic>,
    compute: Arc<ComputeFn>,
}

impl CodeAction {
    /// Creates an action from a title, a key and the deferred rewrite.
    pub fn new<F>(title: impl Into<String>, equivalence_key: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&CancellationToken) -> Result<ChangedDocument> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.into(),
            provider: "",
            diagnostics: Vec::new(),
            compute: Arc::new(compute),
        }
    }

    /// Records the diagnostics this action fixes.
    pub fn fixing(mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.diagnostics.extend(diagnostics);
        self
    }

    pub(crate) fn from_provider(mut self, provider: &'static str) -> Self {
        self.provider = provider;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Key that distinguishes this action from others offered for the same span.
    pub fn equivalence_key(&self) -> &str {
        &self.equivalence_key
    }

    /// Id of the provider that registered the action.
    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Runs the rewrite.
    pub fn apply(&self, token: &CancellationToken) -> Result<ChangedDocument> {
        token.check()?;
        tracing::debug!(key = %self.equivalence_key, "applying code action");
        let changed = (self.compute)(token)?;
        token.check()?;
        Ok(changed)
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .field("provider", &self.provider)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// Collects registered actions in registration order.
#[derive(Debug, Default)]
pub struct ActionSink {
    actions: Vec<CodeAction>,
}

impl ActionSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: CodeAction) {
        tracing::debug!(
            provider = action.provider,
            key = %action.equivalence_key,
            "registered code action"
        );
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_actions(self) -> Vec<CodeAction> {
        self.actions
    }
}

/// Finds an action by equivalence key.
pub fn find_action<'a>(actions: &'a [CodeAction], key: &str) -> Option<&'a CodeAction> {
    actions.iter().find(|a| a.equivalence_key() == key)
}
