//! Aggregator/builder: group validated rules, assign stable identifiers,
//! render the combined reference document.
//!
//! Determinism contract: identical inputs produce byte-identical output.
//! Nothing here reads the clock or the filesystem; the only date rendered
//! is the one supplied in the build metadata.

use std::collections::BTreeMap;

use rulebook_core::{BuildMetadata, Rule, SectionRegistry};

/// Rules grouped by section number, sorted by title, with ids assigned
pub type GroupedRules = BTreeMap<u32, Vec<Rule>>;

/// Partition valid rules by section and assign per-section identifiers.
///
/// Within a section, rules sort by title (case-insensitive lexicographic,
/// stable for ties) and receive `id = "<section>.<position+1>"`, so id
/// assignment is a pure function of section membership and title ordering,
/// never of source file order.
pub fn assign_rule_ids(rules: Vec<Rule>) -> GroupedRules {
    let mut grouped: GroupedRules = BTreeMap::new();

    for rule in rules {
        grouped.entry(rule.section).or_default().push(rule);
    }

    for (section, section_rules) in grouped.iter_mut() {
        section_rules.sort_by_key(|rule| rule.title.to_lowercase());
        for (index, rule) in section_rules.iter_mut().enumerate() {
            rule.id = Some(format!("{}.{}", section, index + 1));
        }
    }

    grouped
}

/// Derive a table-of-contents anchor from heading text: lowercase, strip
/// punctuation, collapse whitespace to hyphens.
///
/// This is a pinned output-format contract (it must match the heading-id
/// convention of the rendering target), not an internal detail.
pub fn anchor_for(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Render the aggregated reference document.
///
/// Sections render in the registry's declared order; a section with zero
/// rules renders a placeholder notice instead of a rule list.
pub fn render_document(
    grouped: &GroupedRules,
    registry: &SectionRegistry,
    metadata: &BuildMetadata,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", metadata.title));
    out.push_str(&format!("Version: {}\n", metadata.version));
    out.push_str(&format!("Organization: {}\n", metadata.organization));
    if !metadata.date.is_empty() {
        out.push_str(&format!("Date: {}\n", metadata.date));
    }
    out.push('\n');

    out.push_str("## Abstract\n\n");
    out.push_str(&metadata.abstract_text);
    out.push_str("\n\n");

    render_toc(&mut out, grouped, registry);

    for section in registry.sections() {
        let heading = format!("{}. {}", section.number, section.title);
        out.push_str(&format!("## {}\n\n", heading));
        out.push_str(&format!("Impact: {}\n\n", section.impact));
        out.push_str(&section.description);
        out.push_str("\n\n");

        match grouped.get(&section.number) {
            Some(rules) if !rules.is_empty() => {
                for rule in rules {
                    render_rule(&mut out, rule);
                }
            }
            _ => {
                out.push_str("_No rules defined for this section yet._\n\n");
            }
        }
    }

    if !metadata.references.is_empty() {
        out.push_str("## References\n\n");
        for reference in &metadata.references {
            out.push_str(&format!("- {}\n", reference));
        }
        out.push('\n');
    }

    // Single trailing newline
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

fn render_toc(out: &mut String, grouped: &GroupedRules, registry: &SectionRegistry) {
    out.push_str("## Table of Contents\n\n");

    for section in registry.sections() {
        let heading = format!("{}. {}", section.number, section.title);
        out.push_str(&format!(
            "{}. [{}](#{}) ({} impact)\n",
            section.number,
            section.title,
            anchor_for(&heading),
            section.impact
        ));

        if let Some(rules) = grouped.get(&section.number) {
            for rule in rules {
                let entry = rule_heading(rule);
                out.push_str(&format!("   - [{}](#{})\n", entry, anchor_for(&entry)));
            }
        }
    }

    out.push('\n');
}

/// Heading text for a rule subsection: assigned id followed by title
fn rule_heading(rule: &Rule) -> String {
    match &rule.id {
        Some(id) => format!("{} {}", id, rule.title),
        None => rule.title.clone(),
    }
}

/// Render one rule subsection.
///
/// The subsection deliberately mirrors the source document shape (metadata
/// lines after the heading, examples one level deeper) so a rule's content
/// survives a render/re-parse round trip.
fn render_rule(out: &mut String, rule: &Rule) {
    out.push_str(&format!("### {}\n\n", rule_heading(rule)));

    out.push_str(&format!("Impact: {}\n", rule.impact));
    if let Some(desc) = &rule.impact_description {
        out.push_str(&format!("Impact description: {}\n", desc));
    }
    out.push('\n');

    out.push_str(&rule.explanation);
    out.push_str("\n\n");

    for example in &rule.examples {
        match &example.description {
            Some(desc) => out.push_str(&format!("#### {} ({})\n\n", example.label, desc)),
            None => out.push_str(&format!("#### {}\n\n", example.label)),
        }

        out.push_str(&format!("```{}\n", example.language_or_default()));
        out.push_str(&example.code);
        if !example.code.ends_with('\n') && !example.code.is_empty() {
            out.push('\n');
        }
        out.push_str("```\n\n");

        if let Some(text) = &example.additional_text {
            out.push_str(text);
            out.push_str("\n\n");
        }
    }

    if let Some(notes) = &rule.supabase_notes {
        out.push_str(&format!("Supabase: {}\n\n", notes));
    }

    match rule.references.len() {
        0 => {}
        1 => out.push_str(&format!("Reference: {}\n\n", rule.references[0])),
        _ => {
            out.push_str("References:\n");
            for reference in &rule.references {
                out.push_str(&format!("- {}\n", reference));
            }
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulebook_core::Example;

    fn rule(title: &str, section: u32) -> Rule {
        Rule {
            title: title.to_string(),
            impact: "HIGH".to_string(),
            impact_description: None,
            explanation: "An explanation that is comfortably over the minimum length limit."
                .to_string(),
            section,
            examples: vec![Example {
                label: "Correct".to_string(),
                description: None,
                code: "SELECT 1;".to_string(),
                language: Some("sql".to_string()),
                additional_text: None,
            }],
            supabase_notes: None,
            references: Vec::new(),
            id: None,
        }
    }

    #[test]
    fn ids_follow_title_order_not_input_order() {
        let grouped = assign_rule_ids(vec![rule("Zebra Index", 3), rule("Avoid Bloat", 3)]);
        let section = &grouped[&3];
        assert_eq!(section[0].title, "Avoid Bloat");
        assert_eq!(section[0].id.as_deref(), Some("3.1"));
        assert_eq!(section[1].title, "Zebra Index");
        assert_eq!(section[1].id.as_deref(), Some("3.2"));
    }

    #[test]
    fn id_assignment_is_idempotent() {
        let rules = vec![rule("B", 1), rule("A", 1), rule("C", 2)];
        let first = assign_rule_ids(rules.clone());
        let second = assign_rule_ids(rules);
        assert_eq!(first, second);
    }

    #[test]
    fn equal_titles_keep_input_order() {
        let mut a = rule("Same Title", 1);
        a.explanation = "First of the two rules with an identical title text.".to_string();
        let b = rule("Same Title", 1);
        let grouped = assign_rule_ids(vec![a.clone(), b]);
        assert_eq!(grouped[&1][0].explanation, a.explanation);
    }

    #[test]
    fn anchors_match_heading_convention() {
        assert_eq!(anchor_for("1. Query Performance"), "1-query-performance");
        assert_eq!(anchor_for("1.1 Add Missing Index"), "11-add-missing-index");
        assert_eq!(anchor_for("Avoid SELECT * (star)"), "avoid-select-star");
        assert_eq!(anchor_for("  Collapse   spaces "), "collapse-spaces");
    }

    #[test]
    fn empty_sections_render_placeholder() {
        let grouped = assign_rule_ids(Vec::new());
        let doc = render_document(&grouped, &SectionRegistry::default(), &BuildMetadata::default());
        assert_eq!(doc.matches("_No rules defined for this section yet._").count(), 8);
        assert!(doc.contains("## 1. Query Performance"));
        assert!(doc.contains("## 8. Advanced Features"));
    }

    #[test]
    fn single_reference_renders_inline() {
        let mut r = rule("With One Ref", 1);
        r.references = vec!["https://a.example".to_string()];
        let grouped = assign_rule_ids(vec![r]);
        let doc = render_document(&grouped, &SectionRegistry::default(), &BuildMetadata::default());
        assert!(doc.contains("Reference: https://a.example"));
        assert!(!doc.contains("References:\n- https://a.example"));
    }

    #[test]
    fn multiple_references_render_as_list() {
        let mut r = rule("With Two Refs", 1);
        r.references = vec!["https://a.example".to_string(), "https://b.example".to_string()];
        let grouped = assign_rule_ids(vec![r]);
        let doc = render_document(&grouped, &SectionRegistry::default(), &BuildMetadata::default());
        assert!(doc.contains("References:\n- https://a.example\n- https://b.example"));
    }

    #[test]
    fn toc_lists_sections_with_impact_and_rule_anchors() {
        let grouped = assign_rule_ids(vec![rule("Add Missing Index", 1)]);
        let doc = render_document(&grouped, &SectionRegistry::default(), &BuildMetadata::default());
        assert!(doc.contains("1. [Query Performance](#1-query-performance) (CRITICAL impact)"));
        assert!(doc.contains("   - [1.1 Add Missing Index](#11-add-missing-index)"));
    }

    #[test]
    fn date_renders_only_when_supplied() {
        let grouped = GroupedRules::new();
        let registry = SectionRegistry::default();

        let without = render_document(&grouped, &registry, &BuildMetadata::default());
        assert!(!without.contains("Date:"));

        let mut metadata = BuildMetadata::default();
        metadata.date = "2026-08-01".to_string();
        let with = render_document(&grouped, &registry, &metadata);
        assert!(with.contains("Date: 2026-08-01"));
    }
}
