// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and run reports for the assembler.

use std::fmt;
use std::sync::Arc;

/// Categories of assembler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    Assembler,
    Capacity,
    Cli,
    Directive,
    Instruction,
    Io,
    Label,
    Operand,
    Preprocess,
    Symbol,
}

/// An assembler error with a kind and message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// Severity level for diagnostics.
///
/// The pipeline itself is fail-fast and only produces errors; the warning
/// level exists for CLI-stage notices that do not fail the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A diagnostic message with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) line: u32,
    pub(crate) column: Option<usize>,
    pub(crate) severity: Severity,
    pub(crate) error: AsmError,
    pub(crate) file: Option<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: AsmError) -> Self {
        Self {
            line,
            column: None,
            severity,
            error,
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    /// Render in the fixed stderr contract shape:
    /// `Error in <file> line <n>: <message>`.
    pub fn format(&self) -> String {
        let sev = match self.severity {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        };
        match &self.file {
            Some(file) => format!("{sev} in {file} line {}: {}", self.line, self.error.message()),
            None => format!("{sev} in line {}: {}", self.line, self.error.message()),
        }
    }

    /// Render the contract line followed by the offending source line, with
    /// the error column highlighted when one is known.
    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let mut out = self.format();
        out.push('\n');
        out.push_str(&crate::report::context_line(
            self.line,
            self.column,
            lines,
            use_color,
        ));
        out
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.error.kind()
    }
}

/// Report from a successful assembly run.
#[derive(Debug)]
pub struct AsmRunReport {
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
}

impl AsmRunReport {
    pub fn new(diagnostics: Vec<Diagnostic>, source_lines: impl Into<Arc<Vec<String>>>) -> Self {
        Self {
            diagnostics,
            source_lines: source_lines.into(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }
}

/// Error from a failed assembly run.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
}

impl AsmRunError {
    pub fn new(
        error: AsmError,
        diagnostics: Vec<Diagnostic>,
        source_lines: impl Into<Arc<Vec<String>>>,
    ) -> Self {
        Self {
            error,
            diagnostics,
            source_lines: source_lines.into(),
        }
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AsmRunError {}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassCounts {
    pub lines: u32,
    pub errors: u32,
}

impl PassCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_matches_stderr_contract() {
        let err = AsmError::new(AsmErrorKind::Label, "Label MAIN already defined", None);
        let diag = Diagnostic::new(12, Severity::Error, err).with_file(Some("prog.am".to_string()));
        assert_eq!(
            diag.format(),
            "Error in prog.am line 12: Label MAIN already defined"
        );
    }

    #[test]
    fn diagnostic_without_file_omits_filename() {
        let err = AsmError::new(AsmErrorKind::Preprocess, "Missing macro name", None);
        let diag = Diagnostic::new(3, Severity::Error, err);
        assert_eq!(diag.format(), "Error in line 3: Missing macro name");
    }

    #[test]
    fn format_with_context_appends_the_source_line() {
        let err = AsmError::new(AsmErrorKind::Label, "Label A already defined", None);
        let diag = Diagnostic::new(2, Severity::Error, err).with_file(Some("prog.am".to_string()));
        let lines = vec!["stop".to_string(), "A: stop".to_string()];
        assert_eq!(
            diag.format_with_context(Some(&lines), false),
            "Error in prog.am line 2: Label A already defined\n    2 | A: stop"
        );
    }

    #[test]
    fn format_with_context_marks_the_column_past_the_end() {
        let err = AsmError::new(AsmErrorKind::Assembler, "Source line too long", None);
        let diag = Diagnostic::new(1, Severity::Error, err).with_column(Some(9));
        let lines = vec!["inc r1".to_string()];
        assert_eq!(
            diag.format_with_context(Some(&lines), false),
            "Error in line 1: Source line too long\n    1 | inc r1^"
        );
    }

    #[test]
    fn format_error_appends_parameter() {
        assert_eq!(
            format_error("Invalid operation", Some("mvo")),
            "Invalid operation: mvo"
        );
        assert_eq!(format_error("Empty .data directive", None), "Empty .data directive");
    }

    #[test]
    fn run_report_counts_errors() {
        let diags = vec![
            Diagnostic::new(1, Severity::Error, AsmError::new(AsmErrorKind::Symbol, "a", None)),
            Diagnostic::new(2, Severity::Warning, AsmError::new(AsmErrorKind::Cli, "b", None)),
        ];
        let report = AsmRunReport::new(diags, Vec::new());
        assert_eq!(report.error_count(), 1);
    }
}
