//! Diagnostics reported by the compiler or by analyzers.

use crate::error::Result;
use crate::syntax::{Document, Position, TextSpan};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    #[default]
    Warning,
    Error,
}

/// An issue at a source span, identified by a stable id such as `CS0152`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: String,
    pub span: TextSpan,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Diagnostic {
    /// Creates a warning diagnostic without a message.
    pub fn new(id: impl Into<String>, span: TextSpan) -> Self {
        Self {
            id: id.into(),
            span,
            severity: Severity::Warning,
            message: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Reads a JSON array of diagnostics.
///
/// ```json
/// [{ "id": "CS0152", "span": { "start": 120, "length": 7 }, "severity": "error" }]
/// ```
pub fn load_report(path: impl AsRef<Path>) -> Result<Vec<Diagnostic>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&content)?)
}

/// Extracts the diagnostics for `doc` from compiler or MSBuild output.
///
/// Recognises lines of the form
/// `Program.cs(12,5): error CS0152: message [App.csproj]`, including the
/// `(line,col,endLine,endCol)` form. Positions are 1-based. When the
/// document has a path, lines reporting other files are skipped.
pub fn parse_build_output(doc: &Document, output: &str) -> Result<Vec<Diagnostic>> {
    let pattern = Regex::new(
        r"^\s*(?P<file>.+?)\((?P<line>\d+),(?P<col>\d+)(?:,(?P<end_line>\d+),(?P<end_col>\d+))?\)\s*:\s*(?P<severity>error|warning|info|hidden)\s+(?P<id>[A-Za-z]+\d+)\s*:\s*(?P<message>.*?)(?:\s+\[[^\]]*\])?\s*$",
    )?;
    let file_name = doc.path().and_then(Path::file_name);

    let mut diagnostics = Vec::new();
    for line in output.lines() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };
        if let Some(expected) = file_name
            && Path::new(caps["file"].trim()).file_name() != Some(expected)
        {
            continue;
        }
        let location = |l: &str, c: &str| -> Option<usize> {
            let line = caps.name(l)?.as_str().parse::<u32>().ok()?;
            let col = caps.name(c)?.as_str().parse::<u32>().ok()?;
            doc.offset(Position::new(line.checked_sub(1)?, col.checked_sub(1)?))
        };
        let Some(start) = location("line", "col") else {
            tracing::debug!(line, "reported location is outside the document");
            continue;
        };
        let span = match location("end_line", "end_col") {
            Some(end) if end >= start => TextSpan::from_bounds(start, end),
            _ => TextSpan::at(start),
        };
        let severity = match &caps["severity"] {
            "error" => Severity::Error,
            "info" => Severity::Info,
            "hidden" => Severity::Hidden,
            _ => Severity::Warning,
        };
        diagnostics.push(
            Diagnostic::new(&caps["id"], span)
                .with_severity(severity)
                .with_message(&caps["message"]),
        );
    }
    Ok(diagnostics)
}
