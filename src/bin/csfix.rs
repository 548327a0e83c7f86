//! CLI for the csharp-fixes engine.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use csharp_fixes::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "csfix")]
#[command(author, version, about = "Code fixes and refactorings for C#", long_about = None)]
struct Cli {
    /// Log provider decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered providers
    Providers {
        /// Settings file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the actions offered for a file
    Actions {
        #[command(flatten)]
        input: Input,

        /// Print actions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply one action by equivalence key
    Apply {
        #[command(flatten)]
        input: Input,

        /// Equivalence key of the action to apply
        #[arg(short, long)]
        key: String,

        /// Preview changes without writing the file
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args)]
struct Input {
    /// C# source file
    file: PathBuf,

    /// JSON diagnostic report
    #[arg(short, long)]
    diagnostics: Option<PathBuf>,

    /// Compiler or MSBuild output to read diagnostics from
    #[arg(long)]
    build_log: Option<PathBuf>,

    /// Selection to refactor, as START:LEN or OFFSET
    #[arg(short, long)]
    span: Option<TextSpan>,

    /// Settings file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct ActionRow<'a> {
    title: &'a str,
    key: &'a str,
    provider: &'a str,
    diagnostics: Vec<&'a str>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Providers { config } => cmd_providers(config.as_deref()),
        Commands::Actions { input, json } => cmd_actions(&input, json),
        Commands::Apply {
            input,
            key,
            dry_run,
        } => cmd_apply(&input, &key, dry_run),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatcher(config: Option<&Path>) -> Result<Dispatcher> {
    let settings = match config {
        Some(path) => FixSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => FixSettings::new(),
    };
    Ok(Dispatcher::with_builtin_providers(Arc::new(settings)))
}

fn cmd_providers(config: Option<&Path>) -> Result<()> {
    let dispatcher = dispatcher(config)?;
    for info in dispatcher.providers() {
        let state = if dispatcher.settings().is_enabled(info.id) {
            ""
        } else {
            " (disabled)"
        };
        match info.kind {
            ProviderKind::CodeFix => println!(
                "fix          {}{} [{}]",
                info.id,
                state,
                info.diagnostic_ids.join(", ")
            ),
            ProviderKind::Refactoring => println!("refactoring  {}{}", info.id, state),
        }
    }
    Ok(())
}

/// Loads the input file and computes every action it qualifies for.
fn collect(input: &Input) -> Result<(Document, Vec<CodeAction>)> {
    let dispatcher = dispatcher(input.config.as_deref())?;
    let doc = Document::load(&input.file)
        .with_context(|| format!("Failed to parse {}", input.file.display()))?;

    let mut diagnostics = Vec::new();
    if let Some(report) = &input.diagnostics {
        diagnostics.extend(
            load_report(report)
                .with_context(|| format!("Failed to read diagnostics from {}", report.display()))?,
        );
    }
    if let Some(log) = &input.build_log {
        let output = std::fs::read_to_string(log)
            .with_context(|| format!("Failed to read build log {}", log.display()))?;
        diagnostics.extend(parse_build_output(&doc, &output).context("Failed to parse build log")?);
    }
    if input.span.is_none() && input.diagnostics.is_none() && input.build_log.is_none() {
        bail!("Nothing to do: pass --diagnostics, --build-log or --span");
    }

    let token = CancellationToken::new();
    let mut actions = Vec::new();
    if !diagnostics.is_empty() {
        actions.extend(
            dispatcher
                .code_fixes(&doc, &diagnostics, &SyntacticModel, &token)
                .context("Computing code fixes failed")?,
        );
    }
    if let Some(span) = input.span {
        actions.extend(
            dispatcher
                .refactorings(&doc, span, &SyntacticModel, &token)
                .context("Computing refactorings failed")?,
        );
    }
    Ok((doc, actions))
}

fn cmd_actions(input: &Input, json: bool) -> Result<()> {
    let (_, actions) = collect(input)?;

    if json {
        let rows: Vec<ActionRow<'_>> = actions
            .iter()
            .map(|a| ActionRow {
                title: a.title(),
                key: a.equivalence_key(),
                provider: a.provider(),
                diagnostics: a.diagnostics().iter().map(|d| d.id.as_str()).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if actions.is_empty() {
        println!("No actions available");
    }
    for action in &actions {
        println!(
            "{}  [{}] ({})",
            action.title(),
            action.equivalence_key(),
            action.provider()
        );
    }
    Ok(())
}

fn cmd_apply(input: &Input, key: &str, dry_run: bool) -> Result<()> {
    let (doc, actions) = collect(input)?;
    let action = find_action(&actions, key).ok_or_else(|| FixError::ActionNotFound(key.to_string()))?;

    let changed = action
        .apply(&CancellationToken::new())
        .with_context(|| format!("Applying '{}' failed", action.title()))?;

    if dry_run {
        println!("{}", colorized_diff(&doc, &changed));
        println!("\n{}", DiffSummary::of(&doc, &changed));
    } else {
        std::fs::write(&input.file, changed.text())
            .with_context(|| format!("Failed to write {}", input.file.display()))?;
        println!("Applied '{}' to {}", action.title(), input.file.display());
    }
    Ok(())
}
