//! Enumerating several plausible fixes for one diagnostic.

use crate::action::CodeAction;

/// Distinct candidates for a diagnostic, in discovery order.
///
/// Candidates are deduplicated by discriminator (typically the display name
/// of the candidate type). Each one becomes its own action keyed
/// `"{diagnostic_id}:{discriminator}"`; choosing between them is left to the
/// caller.
#[derive(Debug, Clone)]
pub struct CandidateSet<T> {
    diagnostic_id: String,
    candidates: Vec<(String, T)>,
}

impl<T> CandidateSet<T> {
    pub fn new(diagnostic_id: impl Into<String>) -> Self {
        Self {
            diagnostic_id: diagnostic_id.into(),
            candidates: Vec::new(),
        }
    }

    /// Adds a candidate unless one with the same discriminator exists.
    pub fn push(&mut self, discriminator: impl Into<String>, value: T) -> bool {
        let discriminator = discriminator.into();
        if self.candidates.iter().any(|(d, _)| *d == discriminator) {
            return false;
        }
        self.candidates.push((discriminator, value));
        true
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The equivalence key for a discriminator.
    pub fn key_for(&self, discriminator: &str) -> String {
        format!("{}:{}", self.diagnostic_id, discriminator)
    }

    pub fn discriminators(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|(d, _)| d.as_str())
    }

    /// Builds one action per candidate; `build` receives the key, the
    /// discriminator and the candidate value.
    pub fn into_actions<F>(self, mut build: F) -> Vec<CodeAction>
    where
        F: FnMut(String, &str, T) -> CodeAction,
    {
        let keys: Vec<String> = self.discriminators().map(|d| self.key_for(d)).collect();
        self.candidates
            .into_iter()
            .zip(keys)
            .map(|((discriminator, value), key)| build(key, &discriminator, value))
            .collect()
    }
}
