//! Test-case extraction
//!
//! Walks the same grouped, id-assigned rules as the document builder and
//! flattens every classified, code-carrying example into one test case.
//! Traversal order matches the builder's (registry section order, then
//! assigned-id order), so `rule_id` values here always agree with the
//! rendered document.

use serde::{Deserialize, Serialize};

use rulebook_core::{ExampleKind, SectionRegistry};

use crate::builder::GroupedRules;

/// One flattened example, paired with its rule identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Rule identifier assigned by the aggregator (e.g. "1.2")
    pub rule_id: String,

    /// Title of the owning rule
    pub rule_title: String,

    /// "bad" or "good"; unclassified examples are never extracted
    #[serde(rename = "type")]
    pub kind: ExampleKind,

    /// Verbatim snippet text
    pub code: String,

    /// Language tag (rendering default applied when the source had none)
    pub language: String,

    /// Example description, synthesized when the source had none
    pub description: String,
}

/// Serialized shape of the test-case list (test-cases.json v1)
///
/// An empty result set is a valid outcome and is written as an explicit
/// empty list, not as an absent file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseList {
    /// Number of extracted cases
    pub count: usize,

    /// All cases in document order
    pub cases: Vec<TestCase>,
}

impl TestCaseList {
    pub fn new(cases: Vec<TestCase>) -> Self {
        Self {
            count: cases.len(),
            cases,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

/// Extract labeled test cases from grouped, id-assigned rules.
///
/// For each rule, each example with non-empty code and a bad/good
/// classification yields one case; examples whose label matches neither
/// keyword set are silently skipped.
pub fn extract_test_cases(grouped: &GroupedRules, registry: &SectionRegistry) -> Vec<TestCase> {
    let mut cases: Vec<TestCase> = Vec::new();

    for section in registry.sections() {
        let Some(rules) = grouped.get(&section.number) else {
            continue;
        };

        for rule in rules {
            let rule_id = rule.id.clone().unwrap_or_default();

            for example in &rule.examples {
                if !example.has_code() {
                    continue;
                }
                let kind = example.kind();
                if kind == ExampleKind::Unclassified {
                    continue;
                }

                let description = example.description.clone().unwrap_or_else(|| {
                    format!("{} example for {}", example.label, rule.title)
                });

                cases.push(TestCase {
                    rule_id: rule_id.clone(),
                    rule_title: rule.title.clone(),
                    kind,
                    code: example.code.clone(),
                    language: example.language_or_default().to_string(),
                    description,
                });
            }
        }
    }

    cases
}
