//! Rule and example types, impact tiers, example classification

use serde::{Deserialize, Serialize};

/// Fixed impact tier enumeration, ordered from highest to lowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Impact {
    /// Highest-priority issues (e.g. missing indexes)
    Critical,

    /// High-value optimizations
    High,

    /// Between medium and high
    MediumHigh,

    /// Moderate improvements
    Medium,

    /// Between low and medium
    LowMedium,

    /// Incremental tuning
    Low,
}

impl Impact {
    /// All tiers in descending order
    pub const LEVELS: [Impact; 6] = [
        Impact::Critical,
        Impact::High,
        Impact::MediumHigh,
        Impact::Medium,
        Impact::LowMedium,
        Impact::Low,
    ];

    /// Canonical display form (the form rule documents must use)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::MediumHigh => "MEDIUM-HIGH",
            Self::Medium => "MEDIUM",
            Self::LowMedium => "LOW-MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Parse a tier, case-insensitively, from its canonical form
    pub fn parse(value: &str) -> Option<Impact> {
        let upper = value.trim().to_uppercase();
        Self::LEVELS.iter().copied().find(|level| level.as_str() == upper)
    }

    /// Comma-separated list of valid tiers, for diagnostics
    pub fn valid_levels() -> String {
        Self::LEVELS
            .iter()
            .map(|level| level.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of an example label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleKind {
    /// Anti-pattern the rule warns against
    Bad,

    /// Recommended usage
    Good,

    /// Label matches neither keyword set
    Unclassified,
}

impl std::fmt::Display for ExampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bad => write!(f, "bad"),
            Self::Good => write!(f, "good"),
            Self::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Keywords marking an anti-pattern example label
const BAD_KEYWORDS: [&str; 3] = ["incorrect", "wrong", "bad"];

/// Keywords marking a recommended example label
const GOOD_KEYWORDS: [&str; 6] = [
    "correct",
    "good",
    "usage",
    "implementation",
    "example",
    "recommended",
];

/// Classify an example label as bad, good, or unclassified.
///
/// Matching is case-insensitive substring matching. The bad keyword set is
/// checked first, so an ambiguous label such as "Incorrect Example" (which
/// contains both "incorrect" and "example") classifies as bad.
///
/// This is the single shared classifier: the validator, the document builder,
/// and the test-case extractor must all route through it so their notions of
/// bad/good can never diverge.
pub fn classify_label(label: &str) -> ExampleKind {
    let lowered = label.to_lowercase();

    if BAD_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return ExampleKind::Bad;
    }

    if GOOD_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return ExampleKind::Good;
    }

    ExampleKind::Unclassified
}

/// One labeled code illustration attached to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Free-text heading (e.g. "Incorrect", "Correct usage")
    pub label: String,

    /// Optional short parenthetical from the heading
    #[serde(default)]
    pub description: Option<String>,

    /// Verbatim snippet text; may be empty
    pub code: String,

    /// Language tag from the code fence
    #[serde(default)]
    pub language: Option<String>,

    /// Trailing commentary rendered after the code block
    #[serde(default)]
    pub additional_text: Option<String>,
}

impl Example {
    /// Classification of this example's label
    pub fn kind(&self) -> ExampleKind {
        classify_label(&self.label)
    }

    /// Whether the example carries a non-empty code snippet
    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }

    /// Language tag, falling back to the rendering default
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

/// Language assumed for code fences without an explicit tag
pub const DEFAULT_LANGUAGE: &str = "sql";

/// One parsed performance-guideline record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Display title
    pub title: String,

    /// Raw impact value as written in the document.
    /// Membership in [`Impact::LEVELS`] is the validator's job, not the parser's.
    pub impact: String,

    /// Optional free-text quantification (e.g. "10-100x on large tables")
    #[serde(default)]
    pub impact_description: Option<String>,

    /// Prose body preceding the first example
    pub explanation: String,

    /// Section number derived from the filename prefix
    pub section: u32,

    /// Examples in source order
    pub examples: Vec<Example>,

    /// Optional platform-specific annotation
    #[serde(default)]
    pub supabase_notes: Option<String>,

    /// URL/citation strings from the trailing references block
    #[serde(default)]
    pub references: Vec<String>,

    /// Identifier `"<section>.<index>"`, assigned only during aggregation
    #[serde(default)]
    pub id: Option<String>,
}

impl Rule {
    /// Parsed impact tier, if the raw value is a member of the enumeration
    pub fn impact_tier(&self) -> Option<Impact> {
        Impact::parse(&self.impact)
    }
}
