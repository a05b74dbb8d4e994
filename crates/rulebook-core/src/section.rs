//! Section registry
//!
//! Sections are loaded from a TOML table when one is present, otherwise the
//! compile-time default table is used. The fallback is all-or-nothing: a
//! missing, unparseable, or empty source never yields a partial table.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rule::Impact;

/// A named, numbered, impact-tiered grouping of rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section number (1-based, unique)
    pub number: u32,

    /// Display title (e.g. "Query Performance")
    pub title: String,

    /// Filename prefix that maps rule files into this section
    pub prefix: String,

    /// Overall impact tier of the section
    pub impact: Impact,

    /// One-line description rendered under the section heading
    pub description: String,
}

/// TOML shape of a section-definition file
#[derive(Debug, Deserialize)]
struct SectionFile {
    #[serde(default)]
    sections: Vec<Section>,
}

/// The ordered, read-only list of sections for one build run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    /// Load sections from a TOML file, falling back to the default table.
    ///
    /// Fallback triggers on a missing file, a parse failure, or a file that
    /// defines zero sections.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        Self::from_toml(&contents)
    }

    /// Parse sections from a TOML string, falling back to the default table
    pub fn from_toml(contents: &str) -> Self {
        match toml::from_str::<SectionFile>(contents) {
            Ok(file) if !file.sections.is_empty() => Self {
                sections: file.sections,
            },
            _ => Self::default(),
        }
    }

    /// Sections in declared order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Look up a section by number
    pub fn by_number(&self, number: u32) -> Option<&Section> {
        self.sections.iter().find(|s| s.number == number)
    }

    /// Resolve a filename prefix (text before the first `-`) to a section
    /// number. `connection` is accepted as an alias for `conn`.
    pub fn section_for_prefix(&self, prefix: &str) -> Option<u32> {
        let prefix = if prefix == "connection" { "conn" } else { prefix };
        self.sections
            .iter()
            .find(|s| s.prefix == prefix)
            .map(|s| s.number)
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self {
            sections: default_sections(),
        }
    }
}

/// The canonical 8-section table
fn default_sections() -> Vec<Section> {
    let table: [(u32, &str, &str, Impact, &str); 8] = [
        (
            1,
            "Query Performance",
            "query",
            Impact::Critical,
            "Indexing strategy, query structure, and execution-plan hygiene.",
        ),
        (
            2,
            "Connection Management",
            "conn",
            Impact::High,
            "Pooling, connection limits, and client lifecycle.",
        ),
        (
            3,
            "Schema Design",
            "schema",
            Impact::MediumHigh,
            "Table layout, data types, and normalization trade-offs.",
        ),
        (
            4,
            "Locking and Concurrency",
            "lock",
            Impact::MediumHigh,
            "Lock contention, transaction scope, and isolation.",
        ),
        (
            5,
            "Security Performance",
            "security",
            Impact::Medium,
            "Row level security policies and auth-aware query patterns.",
        ),
        (
            6,
            "Data Management",
            "data",
            Impact::Medium,
            "Bulk operations, vacuuming, and table maintenance.",
        ),
        (
            7,
            "Monitoring",
            "monitor",
            Impact::LowMedium,
            "Statistics, slow-query logging, and diagnostics.",
        ),
        (
            8,
            "Advanced Features",
            "advanced",
            Impact::Low,
            "Partitioning, extensions, and specialized tuning.",
        ),
    ];

    table
        .into_iter()
        .map(|(number, title, prefix, impact, description)| Section {
            number,
            title: title.to_string(),
            prefix: prefix.to_string(),
            impact,
            description: description.to_string(),
        })
        .collect()
}
