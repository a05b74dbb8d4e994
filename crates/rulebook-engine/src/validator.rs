//! Content-quality validation
//!
//! Pure function of a single parsed rule plus the fixed impact enumeration.
//! Every check is evaluated (no short-circuiting) so all issues surface in
//! one pass. A rule with zero errors is valid regardless of warning count.

use rulebook_core::{Diagnostic, DiagnosticCode, ExampleKind, Impact, Location, Rule};

/// Explanations shorter than this are flagged (warning, still publishable)
const MIN_EXPLANATION_CHARS: usize = 50;

/// Result of validating one rule
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    /// True iff no error-severity diagnostic was produced
    pub valid: bool,

    /// All findings, errors and warnings alike
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate a parsed rule against the content-quality policy.
///
/// `file` is only used for diagnostic locations; no I/O happens here.
pub fn validate_rule(rule: &Rule, file: &str) -> ValidationOutcome {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let at = || Location::new(file);

    if rule.title.trim().is_empty() {
        diagnostics.push(
            Diagnostic::error(DiagnosticCode::EmptyTitle, "title is empty").with_location(at()),
        );
    }

    if rule.explanation.trim().is_empty() {
        diagnostics.push(
            Diagnostic::error(DiagnosticCode::EmptyExplanation, "explanation is empty")
                .with_location(at()),
        );
    } else if rule.explanation.chars().count() < MIN_EXPLANATION_CHARS {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::ShortExplanation,
                format!(
                    "explanation is shorter than {} characters",
                    MIN_EXPLANATION_CHARS
                ),
            )
            .with_location(at()),
        );
    }

    if rule.examples.is_empty() {
        // With no examples at all, the example-level checks below would only
        // restate the same problem, so this is the single finding.
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::MissingExamples,
                "missing examples, need at least one bad and one good",
            )
            .with_location(at()),
        );
    } else {
        let has_bad = rule.examples.iter().any(|e| e.kind() == ExampleKind::Bad);
        let has_good = rule.examples.iter().any(|e| e.kind() == ExampleKind::Good);

        if !has_bad && !has_good {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::NoClassifiedExample,
                    "no example classifies as either bad or good",
                )
                .with_location(at()),
            );
        } else if !has_bad {
            // Bad examples are recommended, not mandated
            diagnostics.push(
                Diagnostic::warning(DiagnosticCode::MissingBadExample, "missing bad example")
                    .with_location(at()),
            );
        } else if !has_good {
            // Good examples are mandatory
            diagnostics.push(
                Diagnostic::error(DiagnosticCode::MissingGoodExample, "missing good example")
                    .with_location(at()),
            );
        }

        if !rule.examples.iter().any(|e| e.has_code()) {
            diagnostics.push(
                Diagnostic::error(DiagnosticCode::ExamplesWithoutCode, "examples have no code")
                    .with_location(at()),
            );
        }

        for example in &rule.examples {
            if example.has_code() && example.language.is_none() {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::MissingLanguageTag,
                        format!("example '{}' has code but no language tag", example.label),
                    )
                    .with_location(at()),
                );
            }
        }
    }

    if Impact::parse(&rule.impact).is_none() {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::InvalidImpact,
                format!(
                    "invalid impact '{}', valid levels are: {}",
                    rule.impact,
                    Impact::valid_levels()
                ),
            )
            .with_comparison(Impact::valid_levels(), rule.impact.clone())
            .with_location(at()),
        );
    }

    if rule.impact_description.is_none() {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::MissingImpactDescription,
                "missing impact description",
            )
            .with_location(at()),
        );
    }

    let valid = !diagnostics.iter().any(Diagnostic::is_error);
    ValidationOutcome { valid, diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_core::Example;

    fn example(label: &str, code: &str, language: Option<&str>) -> Example {
        Example {
            label: label.to_string(),
            description: None,
            code: code.to_string(),
            language: language.map(str::to_string),
            additional_text: None,
        }
    }

    fn base_rule() -> Rule {
        Rule {
            title: "Add Missing Index".to_string(),
            impact: "CRITICAL".to_string(),
            impact_description: Some("100x faster lookups".to_string()),
            explanation: "Sequential scans on large tables dominate query time; index filter columns."
                .to_string(),
            section: 1,
            examples: vec![
                example("Incorrect", "SELECT * FROM orders WHERE customer_id = 42;", Some("sql")),
                example("Correct", "CREATE INDEX ON orders (customer_id);", Some("sql")),
            ],
            supabase_notes: None,
            references: Vec::new(),
            id: None,
        }
    }

    fn codes(outcome: &ValidationOutcome) -> Vec<DiagnosticCode> {
        outcome.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn well_formed_rule_is_valid_with_no_diagnostics() {
        let outcome = validate_rule(&base_rule(), "query-index.md");
        assert!(outcome.valid);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn missing_good_example_is_an_error() {
        let mut rule = base_rule();
        rule.examples = vec![example("Incorrect", "SELECT 1;", Some("sql"))];
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(!outcome.valid);
        assert_eq!(codes(&outcome), vec![DiagnosticCode::MissingGoodExample]);
    }

    #[test]
    fn missing_bad_example_is_only_a_warning() {
        let mut rule = base_rule();
        rule.examples = vec![example("Correct", "SELECT 1;", Some("sql"))];
        let outcome = validate_rule(&rule, "query-star.md");
        assert!(outcome.valid);
        assert_eq!(codes(&outcome), vec![DiagnosticCode::MissingBadExample]);
    }

    #[test]
    fn zero_examples_report_exactly_one_error() {
        let mut rule = base_rule();
        rule.examples.clear();
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(!outcome.valid);
        // Exactly the missing-examples error, no example-related warnings
        assert_eq!(codes(&outcome), vec![DiagnosticCode::MissingExamples]);
        assert_eq!(
            outcome.diagnostics[0].message,
            "missing examples, need at least one bad and one good"
        );
    }

    #[test]
    fn unclassifiable_examples_are_an_error() {
        let mut rule = base_rule();
        rule.examples = vec![example("Discussion", "SELECT 1;", Some("sql"))];
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(!outcome.valid);
        assert!(codes(&outcome).contains(&DiagnosticCode::NoClassifiedExample));
    }

    #[test]
    fn examples_without_any_code_are_an_error() {
        let mut rule = base_rule();
        rule.examples = vec![example("Incorrect", "", None), example("Correct", "  ", None)];
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(!outcome.valid);
        let found = codes(&outcome);
        assert!(found.contains(&DiagnosticCode::ExamplesWithoutCode));
        // No language-tag warnings for codeless examples
        assert!(!found.contains(&DiagnosticCode::MissingLanguageTag));
    }

    #[test]
    fn missing_language_tag_is_a_warning_per_example() {
        let mut rule = base_rule();
        rule.examples = vec![
            example("Incorrect", "SELECT 1;", None),
            example("Correct", "SELECT 2;", None),
        ];
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(outcome.valid);
        let tag_warnings = outcome
            .diagnostics
            .iter()
            .filter(|d| d.code == DiagnosticCode::MissingLanguageTag)
            .count();
        assert_eq!(tag_warnings, 2);
    }

    #[test]
    fn invalid_impact_names_value_and_valid_set() {
        let mut rule = base_rule();
        rule.impact = "SEVERE".to_string();
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(!outcome.valid);

        let errors: Vec<_> = outcome.diagnostics.iter().filter(|d| d.is_error()).collect();
        assert_eq!(errors.len(), 1);
        let diag = errors[0];
        assert_eq!(diag.code, DiagnosticCode::InvalidImpact);
        assert!(diag.message.contains("SEVERE"));
        assert!(diag.message.contains("CRITICAL, HIGH, MEDIUM-HIGH, MEDIUM, LOW-MEDIUM, LOW"));
        assert_eq!(diag.actual.as_deref(), Some("SEVERE"));
    }

    #[test]
    fn short_explanation_is_a_warning_not_an_error() {
        let mut rule = base_rule();
        rule.explanation = "Too short.".to_string();
        let outcome = validate_rule(&rule, "query-index.md");
        assert!(outcome.valid);
        assert_eq!(codes(&outcome), vec![DiagnosticCode::ShortExplanation]);
    }

    #[test]
    fn all_checks_are_evaluated_in_one_pass() {
        let rule = Rule {
            title: String::new(),
            impact: "HUGE".to_string(),
            impact_description: None,
            explanation: String::new(),
            section: 1,
            examples: Vec::new(),
            supabase_notes: None,
            references: Vec::new(),
            id: None,
        };
        let outcome = validate_rule(&rule, "query-broken.md");
        let found = codes(&outcome);
        assert!(found.contains(&DiagnosticCode::EmptyTitle));
        assert!(found.contains(&DiagnosticCode::EmptyExplanation));
        assert!(found.contains(&DiagnosticCode::MissingExamples));
        assert!(found.contains(&DiagnosticCode::InvalidImpact));
        assert!(found.contains(&DiagnosticCode::MissingImpactDescription));
    }
}
