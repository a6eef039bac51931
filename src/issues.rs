//! Diagnostic types for extraction results.
//!
//! Nothing the scanner finds in source text is fatal. Every problem it
//! recovers from is reported as a [`Diagnostic`] carrying a fixed
//! [`DiagnosticKind`], which in turn decides the [`Severity`].

use std::path::PathBuf;

use serde::Serialize;

// ============================================================
// Severity and Kind
// ============================================================

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// What went wrong, independent of the wording of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    // Lexical
    UnterminatedComment,
    UnterminatedString,
    UnterminatedCharacter,
    UnterminatedRawString,
    ExcessClosingDelimiter,
    UnbalancedOpeningDelimiter,
    BranchMismatch,
    // Metadata comments
    UnexpectedMetaCharacter,
    UnterminatedMetaString,
    DiscardedMetaData,
    IgnoredAnnotation,
    // Calls and contexts
    InvalidTrInvocation,
    MissingContext,
    MissingTrSupport,
    UnknownQualifier,
    UndeclaredQualifiedClass,
    UnsupportedEncoding,
    // Includes
    UnreadableInclude,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::UnterminatedComment
            | DiagnosticKind::UnterminatedString
            | DiagnosticKind::UnterminatedCharacter
            | DiagnosticKind::UnterminatedRawString
            | DiagnosticKind::ExcessClosingDelimiter
            | DiagnosticKind::UnbalancedOpeningDelimiter => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DiagnosticKind::UnterminatedComment => "unterminated-comment",
            DiagnosticKind::UnterminatedString => "unterminated-string",
            DiagnosticKind::UnterminatedCharacter => "unterminated-character",
            DiagnosticKind::UnterminatedRawString => "unterminated-raw-string",
            DiagnosticKind::ExcessClosingDelimiter => "excess-closing-delimiter",
            DiagnosticKind::UnbalancedOpeningDelimiter => "unbalanced-opening-delimiter",
            DiagnosticKind::BranchMismatch => "branch-mismatch",
            DiagnosticKind::UnexpectedMetaCharacter => "unexpected-meta-character",
            DiagnosticKind::UnterminatedMetaString => "unterminated-meta-string",
            DiagnosticKind::DiscardedMetaData => "discarded-meta-data",
            DiagnosticKind::IgnoredAnnotation => "ignored-annotation",
            DiagnosticKind::InvalidTrInvocation => "invalid-tr-invocation",
            DiagnosticKind::MissingContext => "missing-context",
            DiagnosticKind::MissingTrSupport => "missing-tr-support",
            DiagnosticKind::UnknownQualifier => "unknown-qualifier",
            DiagnosticKind::UndeclaredQualifiedClass => "undeclared-qualified-class",
            DiagnosticKind::UnsupportedEncoding => "unsupported-encoding",
            DiagnosticKind::UnreadableInclude => "unreadable-include",
        };
        f.write_str(name)
    }
}

// ============================================================
// Diagnostic
// ============================================================

/// One recovered problem, located at a 1-indexed line of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<PathBuf>,
        line: usize,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.file.display(),
            self.line,
            self.severity(),
            self.message
        )
    }
}
