//! # C# Fixes
//!
//! Diagnostic-driven code fixes and span-triggered refactorings for C#
//! source, built on tree-sitter.
//!
//! This crate provides:
//! - Immutable [`syntax::Document`] snapshots with node-level editing
//! - A provider contract for code fixes (keyed by diagnostic id) and refactorings
//! - Lazily computed [`action::CodeAction`]s identified by equivalence keys
//! - A [`dispatch::Dispatcher`] that gates providers on [`config::FixSettings`]
//!   and contains provider failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csharp_fixes::prelude::*;
//! use std::sync::Arc;
//!
//! let doc = Document::parse("class C { void M() { if (x) y(); } }")?;
//! let dispatcher = Dispatcher::with_builtin_providers(Arc::new(FixSettings::new()));
//!
//! let span = TextSpan::new(28, 4);
//! let actions = dispatcher.refactorings(&doc, span, &SyntacticModel, &CancellationToken::new())?;
//! for action in &actions {
//!     println!("{} ({})", action.title(), action.equivalence_key());
//! }
//!
//! if let Some(action) = find_action(&actions, "add-braces") {
//!     let changed = action.apply(&CancellationToken::new())?;
//!     println!("{}", changed.text());
//! }
//! # Ok::<(), csharp_fixes::error::FixError>(())
//! ```
//!
//! ## Code Fixes
//!
//! ```rust,no_run
//! use csharp_fixes::prelude::*;
//! use std::sync::Arc;
//!
//! let settings = FixSettings::new().disable("cls-compliance");
//! let dispatcher = Dispatcher::with_builtin_providers(Arc::new(settings));
//!
//! let doc = Document::load("src/Program.cs")?;
//! let diagnostics = load_report("report.json")?;
//! let actions = dispatcher.code_fixes(&doc, &diagnostics, &SyntacticModel, &CancellationToken::new())?;
//! println!("{} fixes available", actions.len());
//! # Ok::<(), csharp_fixes::error::FixError>(())
//! ```

pub mod action;
pub mod cancel;
pub mod config;
pub mod diagnostic;
pub mod diff;
pub mod dispatch;
pub mod error;
pub mod fixes;
pub mod lang;
pub mod operators;
pub mod refactorings;
pub mod resolver;
pub mod semantic;
pub mod syntax;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::action::{ActionSink, CodeAction, find_action};
    pub use crate::cancel::CancellationToken;
    pub use crate::config::FixSettings;
    pub use crate::diagnostic::{Diagnostic, Severity, load_report, parse_build_output};
    pub use crate::diff::{DiffSummary, colorized_diff, unified_diff};
    pub use crate::dispatch::{
        CodeFixContext, CodeFixProvider, Dispatcher, ProviderInfo, ProviderKind,
        RefactoringContext, RefactoringProvider,
    };
    pub use crate::error::{FixError, Result};
    pub use crate::lang::{CSharp, Language};
    pub use crate::operators::{BinaryOperator, CompoundOperator};
    pub use crate::resolver::CandidateSet;
    pub use crate::semantic::{SemanticModel, SyntacticModel, TypeRef};
    pub use crate::syntax::{
        Annotation, ChangedDocument, Direction, Document, Position, SyntaxEditor, TextEdit, TextSpan,
        find_anchor,
    };
}

pub use prelude::*;
