//! Per-file pipeline: parse, validate, include-or-exclude
//!
//! Inclusion is atomic at the file level: any parse or validation error
//! drops the whole rule from both build outputs. Warnings never exclude.
//! Files are processed in isolation, so one malformed file cannot abort
//! the batch.

use tracing::debug;

use rulebook_core::{Diagnostic, FileReport, Rule, SectionRegistry};
use rulebook_parser::parse_document;

use crate::validator::validate_rule;

/// Raw contents of one discovered rule file
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name relative to the rules directory
    pub name: String,

    /// Raw document text
    pub content: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Tagged per-file outcome
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Rule passed parsing and validation (possibly with warnings)
    Included(Rule),

    /// At least one error; the file contributes nothing to either output
    Excluded,
}

/// Everything downstream stages need: the valid rules and the full per-file
/// diagnostic record
#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    /// Rules that survived parse and validation, in input order
    pub rules: Vec<Rule>,

    /// One report per processed file, in input order
    pub reports: Vec<FileReport>,
}

/// Parse and validate a single document.
///
/// Validation runs only on a rule that parsed cleanly; a structurally broken
/// document would just re-report its parse defects as content defects.
pub fn process_document(
    document: &SourceDocument,
    registry: &SectionRegistry,
) -> (FileOutcome, Vec<Diagnostic>) {
    let parsed = parse_document(&document.name, &document.content, registry);
    let mut diagnostics = parsed.diagnostics;

    if !diagnostics.iter().any(Diagnostic::is_error) {
        let outcome = validate_rule(&parsed.rule, &document.name);
        diagnostics.extend(outcome.diagnostics);
        if outcome.valid {
            return (FileOutcome::Included(parsed.rule), diagnostics);
        }
    }

    (FileOutcome::Excluded, diagnostics)
}

/// Run the per-file pipeline over every document.
///
/// Both returned collections follow input order; determinism downstream
/// depends only on rule content, not on this order.
pub fn process_documents(documents: &[SourceDocument], registry: &SectionRegistry) -> BuildInput {
    let mut input = BuildInput::default();

    for document in documents {
        let (outcome, diagnostics) = process_document(document, registry);
        input.reports.push(FileReport::new(&document.name, diagnostics));

        match outcome {
            FileOutcome::Included(rule) => {
                debug!(file = %document.name, "rule included");
                input.rules.push(rule);
            }
            FileOutcome::Excluded => {
                debug!(file = %document.name, "rule excluded");
            }
        }
    }

    input
}
