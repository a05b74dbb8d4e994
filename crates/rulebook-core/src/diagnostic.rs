//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Structural parse defects (1xxx)
    /// Document has no title heading
    MissingTitle,

    /// Document has no metadata block after the title
    MissingMetadata,

    /// Metadata key is not one the parser recognizes
    UnknownMetadataKey,

    /// Filename prefix does not map to any section
    UnknownSectionPrefix,

    /// A fenced code block is opened but never closed
    UnterminatedCodeFence,

    /// Rule file could not be read (I/O failure or invalid UTF-8)
    UnreadableFile,

    // Content-quality defects (2xxx)
    /// Rule title is empty
    EmptyTitle,

    /// Explanation body is empty
    EmptyExplanation,

    /// Explanation is present but shorter than the quality threshold
    ShortExplanation,

    /// Rule has no examples at all
    MissingExamples,

    /// No example classifies as either bad or good
    NoClassifiedExample,

    /// Rule has no bad (anti-pattern) example
    MissingBadExample,

    /// Rule has no good (recommended) example
    MissingGoodExample,

    /// No example carries a non-empty code block
    ExamplesWithoutCode,

    /// An example has code but no language tag
    MissingLanguageTag,

    /// Impact value is not one of the fixed tiers
    InvalidImpact,

    /// Rule has no quantified impact description
    MissingImpactDescription,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTitle => "MISSING_TITLE",
            Self::MissingMetadata => "MISSING_METADATA",
            Self::UnknownMetadataKey => "UNKNOWN_METADATA_KEY",
            Self::UnknownSectionPrefix => "UNKNOWN_SECTION_PREFIX",
            Self::UnterminatedCodeFence => "UNTERMINATED_CODE_FENCE",
            Self::UnreadableFile => "UNREADABLE_FILE",
            Self::EmptyTitle => "EMPTY_TITLE",
            Self::EmptyExplanation => "EMPTY_EXPLANATION",
            Self::ShortExplanation => "SHORT_EXPLANATION",
            Self::MissingExamples => "MISSING_EXAMPLES",
            Self::NoClassifiedExample => "NO_CLASSIFIED_EXAMPLE",
            Self::MissingBadExample => "MISSING_BAD_EXAMPLE",
            Self::MissingGoodExample => "MISSING_GOOD_EXAMPLE",
            Self::ExamplesWithoutCode => "EXAMPLES_WITHOUT_CODE",
            Self::MissingLanguageTag => "MISSING_LANGUAGE_TAG",
            Self::InvalidImpact => "INVALID_IMPACT",
            Self::MissingImpactDescription => "MISSING_IMPACT_DESCRIPTION",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Warning - should be reviewed but never excludes a rule
    Warn,

    /// Error - the rule is excluded from both build outputs
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source location in a rule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File name relative to the rules directory
    pub file: String,

    /// Optional line number (1-indexed)
    pub line: Option<usize>,
}

impl Location {
    /// Create a new location with just a file name
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    /// Create a location with file and line number
    pub fn with_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Expected value (for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (for comparison diagnostics)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warn, message)
    }

    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// Whether this diagnostic blocks inclusion in the build
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
