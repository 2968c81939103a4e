//! Error taxonomy and diagnostic rendering.
//!
//! Passes 1-3 accumulate diagnostics and report all of them at once; passes
//! 4-8 operate on already-validated input, so any failure there is an
//! internal defect, not an authoring error. `CompileError` is the boundary
//! type every pass's public API returns; ambient glue code within a pass may
//! still use `anyhow` internally as long as it never crosses the boundary.

use std::fmt;
use std::path::PathBuf;

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A 1-based line:column location inside a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single user-visible diagnostic, per spec.md §7's rendering contract.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub location: Location,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub context_lines: Vec<String>,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn error(file: impl Into<PathBuf>, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            location: Location::default(),
            severity: Severity::Error,
            category: category.into(),
            message: message.into(),
            context_lines: Vec::new(),
            hint: None,
        }
    }

    pub fn warning(file: impl Into<PathBuf>, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            location: Location::default(),
            severity: Severity::Warning,
            category: category.into(),
            message: message.into(),
            context_lines: Vec::new(),
            hint: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_context(mut self, lines: Vec<String>) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}:{}: {}[{}]: {}",
            self.file.display(),
            self.location,
            self.severity,
            self.category,
            self.message
        )?;
        for line in &self.context_lines {
            writeln!(f, "  {line}")?;
        }
        if let Some(hint) = &self.hint {
            writeln!(f, "  Hint: {hint}")?;
        }
        Ok(())
    }
}

/// The five-variant error taxonomy from spec.md §7.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(Diagnostic),

    #[error("schema error: {} diagnostic(s)", .0.len())]
    Schema(Vec<Diagnostic>),

    #[error("import error: {0}")]
    Import(Diagnostic),

    #[error("policy error: {} diagnostic(s)", .0.len())]
    Policy(Vec<Diagnostic>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CompileError {
    /// Exit code per spec.md §6: 0 success, 1 authoring error, 2 internal.
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Internal(_) => 2,
            _ => 1,
        }
    }

    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        match self {
            CompileError::Syntax(d) | CompileError::Import(d) => {
                vec![d]
            }
            CompileError::Schema(ds) | CompileError::Policy(ds) => ds.iter().collect(),
            CompileError::Internal(_) => Vec::new(),
        }
    }
}

/// Accumulates diagnostics across a pass that must report everything found
/// (passes 1-3) rather than aborting on the first problem.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| !d.is_error()).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Summarize as "N errors, M warnings" for non-verbose mode.
    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s) (use --verbose for details)",
            self.error_count(),
            self.warning_count()
        )
    }

    /// Finish the pass: if any errors were accumulated, return a `Schema`
    /// error carrying all of them; otherwise return the warnings for the
    /// caller to surface separately.
    pub fn finish(self) -> Result<Vec<Diagnostic>, CompileError> {
        if self.has_errors() {
            Err(CompileError::Schema(self.into_vec()))
        } else {
            Ok(self.into_vec())
        }
    }

    /// Same accumulate-then-report discipline as [`finish`], for a bag whose
    /// diagnostics are known to all originate from post-schema policy checks
    /// (spec.md §7 `PolicyError`) rather than JSON Schema validation.
    pub fn finish_as_policy(self) -> Result<Vec<Diagnostic>, CompileError> {
        if self.has_errors() {
            Err(CompileError::Policy(self.into_vec()))
        } else {
            Ok(self.into_vec())
        }
    }
}
