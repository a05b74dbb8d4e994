//! Rulebook Engine
//!
//! Validation, per-file pipeline, document aggregation, and test-case
//! extraction. Everything here is pure: I/O belongs to the CLI.

pub mod builder;
pub mod extractor;
pub mod pipeline;
pub mod validator;

pub use builder::{anchor_for, assign_rule_ids, render_document, GroupedRules};
pub use extractor::{extract_test_cases, TestCase, TestCaseList};
pub use pipeline::{process_document, process_documents, BuildInput, FileOutcome, SourceDocument};
pub use validator::{validate_rule, ValidationOutcome};
