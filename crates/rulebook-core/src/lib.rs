//! Rulebook Core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod config;
pub mod diagnostic;
pub mod report;
pub mod rule;
pub mod section;

pub use config::{BuildMetadata, Config, ConfigError};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use report::{FileReport, Report, ReportSummary, ReportVersion};
pub use rule::{classify_label, Example, ExampleKind, Impact, Rule, DEFAULT_LANGUAGE};
pub use section::{Section, SectionRegistry};
