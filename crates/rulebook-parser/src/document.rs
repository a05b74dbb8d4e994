//! Line-by-line rule document parser
//!
//! A rule document has a deterministic structure:
//! - Title heading: `# Rule Title`
//! - Metadata block: `Key: value` lines directly after the title
//!   (`Impact`, `Impact description`, `Supabase`, `Reference(s)`)
//! - Explanation: prose up to the first example heading
//! - Example blocks: `## Label (optional parenthetical)` followed by an
//!   optional fenced code region and optional trailing prose
//! - References: a trailing `References:` block, inline or one per line
//!
//! Parser approach: line-by-line state machine with regex for header
//! detection. Heading depth is relative to the title heading, so a rule
//! subsection cut out of the aggregated document (title at `###`, examples
//! at `####`) parses the same way as a standalone file (title at `#`).

use regex::Regex;
use tracing::debug;

use rulebook_core::{Diagnostic, DiagnosticCode, Example, Location, Rule, SectionRegistry};

/// Result of parsing one rule document.
///
/// A best-effort [`Rule`] is always produced, even when errors were found,
/// so the validator can report its own findings in the same run. Callers
/// must treat the rule as unusable unless [`ParseOutcome::is_success`].
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Best-effort parsed rule
    pub rule: Rule,

    /// Everything the parser found wrong, errors and warnings alike
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True when no error-severity diagnostic was recorded
    pub fn is_success(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Parse one rule document into a structured rule plus diagnostics.
///
/// `file_name` supplies the section: the text before the first `-` in the
/// stem is resolved through the registry's prefix table. An unrecognized
/// prefix is an error, never a silent default.
///
/// Never panics; all failure is returned as diagnostics.
pub fn parse_document(file_name: &str, content: &str, registry: &SectionRegistry) -> ParseOutcome {
    let heading_re = Regex::new(r"^(#{1,4}) (.+)$").expect("valid regex");
    let metadata_re = Regex::new(r"^([A-Za-z][A-Za-z -]*?):\s*(.*)$").expect("valid regex");
    let reference_re = Regex::new(r"(?i)^references?:\s*(.*)$").expect("valid regex");
    let supabase_re = Regex::new(r"(?i)^supabase(?: notes?)?:\s*(.*)$").expect("valid regex");

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    // Section membership comes from the filename prefix, not the content.
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    let prefix = stem.split('-').next().unwrap_or(stem);
    let section = match registry.section_for_prefix(prefix) {
        Some(number) => number,
        None => {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownSectionPrefix,
                    format!("filename prefix '{}' does not map to any section", prefix),
                )
                .with_location(Location::new(file_name)),
            );
            0
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut i = 0;

    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    // Title: the first heading line. Its depth anchors example headings one
    // level deeper.
    let mut title = String::new();
    let mut title_level = 1;
    if i < lines.len() {
        if let Some(caps) = heading_re.captures(lines[i]) {
            title_level = caps[1].len();
            title = caps[2].trim().to_string();
            i += 1;
        }
    }
    if title.is_empty() {
        diagnostics.push(
            Diagnostic::error(DiagnosticCode::MissingTitle, "missing title")
                .with_location(Location::with_line(file_name, i + 1)),
        );
    }

    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    // Metadata block: consecutive `Key: value` lines up to the first blank
    // line or heading. An unrecognized key is consumed with a warning so one
    // typo cannot shift the whole block into the explanation.
    let mut impact = String::new();
    let mut impact_description: Option<String> = None;
    let mut supabase_notes: Option<String> = None;
    let mut references: Vec<String> = Vec::new();
    let mut saw_metadata = false;

    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line.starts_with('#') {
            break;
        }
        let Some(caps) = metadata_re.captures(line) else {
            break;
        };
        let key = caps[1].trim().to_lowercase();
        let value = caps[2].trim().to_string();
        saw_metadata = true;

        match key.as_str() {
            "impact" => impact = value,
            "impact description" | "impact-description" => {
                impact_description = non_empty(value);
            }
            "supabase" | "supabase note" | "supabase notes" => {
                supabase_notes = non_empty(value);
            }
            "reference" | "references" => {
                if !value.is_empty() {
                    references.push(value);
                }
            }
            other => {
                diagnostics.push(
                    Diagnostic::warning(
                        DiagnosticCode::UnknownMetadataKey,
                        format!("unknown metadata key '{}'", other),
                    )
                    .with_location(Location::with_line(file_name, i + 1)),
                );
            }
        }
        i += 1;
    }

    if !saw_metadata {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::MissingMetadata,
                "missing metadata block after title",
            )
            .with_location(Location::new(file_name)),
        );
    }

    // Body: explanation prose, then example blocks. Trailing `Supabase:` and
    // `References:` directives are recognized in any prose region.
    let example_marker = format!("{} ", "#".repeat(title_level + 1));
    let mut explanation_lines: Vec<&str> = Vec::new();
    let mut examples: Vec<Example> = Vec::new();

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if let Some(rest) = line.strip_prefix(&example_marker) {
            let (label, description) = split_label(rest.trim());
            i += 1;
            let example = parse_example_body(
                file_name,
                &lines,
                &mut i,
                &example_marker,
                label,
                description,
                &mut supabase_notes,
                &mut references,
                &reference_re,
                &supabase_re,
                &mut diagnostics,
            );
            examples.push(example);
        } else if let Some(caps) = reference_re.captures(trimmed) {
            let inline = caps[1].trim().to_string();
            i += 1;
            collect_references(&lines, &mut i, inline, &mut references);
        } else if let Some(caps) = supabase_re.captures(trimmed) {
            if supabase_notes.is_none() {
                supabase_notes = non_empty(caps[1].trim().to_string());
            }
            i += 1;
        } else {
            explanation_lines.push(line);
            i += 1;
        }
    }

    let explanation = join_prose(&explanation_lines);

    debug!(
        file = file_name,
        section,
        examples = examples.len(),
        diagnostics = diagnostics.len(),
        "parsed rule document"
    );

    let rule = Rule {
        title,
        impact,
        impact_description,
        explanation,
        section,
        examples,
        supabase_notes,
        references,
        id: None,
    };

    ParseOutcome { rule, diagnostics }
}

/// Parse the body of one example block: optional parenthetical description
/// line, optional fenced code region, trailing prose.
///
/// Consumes lines until the next example heading or EOF. A label without a
/// fenced block still yields an example with empty code.
#[allow(clippy::too_many_arguments)]
fn parse_example_body(
    file_name: &str,
    lines: &[&str],
    i: &mut usize,
    example_marker: &str,
    label: String,
    mut description: Option<String>,
    supabase_notes: &mut Option<String>,
    references: &mut Vec<String>,
    reference_re: &Regex,
    supabase_re: &Regex,
    diagnostics: &mut Vec<Diagnostic>,
) -> Example {
    let mut code = String::new();
    let mut language: Option<String> = None;
    let mut saw_fence = false;
    let mut trailing_lines: Vec<&str> = Vec::new();

    while *i < lines.len() {
        let line = lines[*i];
        let trimmed = line.trim();

        if line.starts_with(example_marker) {
            break;
        }

        if !saw_fence && trimmed.starts_with("```") {
            saw_fence = true;
            language = non_empty(trimmed.trim_start_matches('`').trim().to_string());
            let fence_line = *i + 1;
            *i += 1;

            let mut code_lines: Vec<&str> = Vec::new();
            let mut closed = false;
            while *i < lines.len() {
                if lines[*i].trim().starts_with("```") {
                    closed = true;
                    *i += 1;
                    break;
                }
                code_lines.push(lines[*i]);
                *i += 1;
            }
            if !closed {
                diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::UnterminatedCodeFence,
                        format!("code fence opened in example '{}' is never closed", label),
                    )
                    .with_location(Location::with_line(file_name, fence_line)),
                );
            }
            code = code_lines.join("\n");
            continue;
        }

        if let Some(caps) = reference_re.captures(trimmed) {
            let inline = caps[1].trim().to_string();
            *i += 1;
            collect_references(lines, i, inline, references);
            continue;
        }

        if let Some(caps) = supabase_re.captures(trimmed) {
            if supabase_notes.is_none() {
                *supabase_notes = non_empty(caps[1].trim().to_string());
            }
            *i += 1;
            continue;
        }

        // A standalone parenthetical before the fence doubles as the
        // description when the heading carried none.
        if !saw_fence
            && description.is_none()
            && trimmed.starts_with('(')
            && trimmed.ends_with(')')
        {
            description = non_empty(trimmed[1..trimmed.len() - 1].trim().to_string());
            *i += 1;
            continue;
        }

        trailing_lines.push(line);
        *i += 1;
    }

    Example {
        label,
        description,
        code,
        language,
        additional_text: non_empty(join_prose(&trailing_lines)),
    }
}

/// Consume a references block: either the inline value already captured from
/// the `References:` line, or the following lines (optionally bulleted) up to
/// the next heading.
fn collect_references(lines: &[&str], i: &mut usize, inline: String, references: &mut Vec<String>) {
    if !inline.is_empty() {
        references.push(inline);
        return;
    }

    while *i < lines.len() {
        let trimmed = lines[*i].trim();
        if trimmed.starts_with('#') {
            break;
        }
        if !trimmed.is_empty() {
            let entry = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
                .unwrap_or(trimmed);
            references.push(entry.trim().to_string());
        }
        *i += 1;
    }
}

/// Split an example heading into label and optional trailing parenthetical.
///
/// `"Incorrect (N+1 query)"` becomes `("Incorrect", Some("N+1 query"))`.
fn split_label(text: &str) -> (String, Option<String>) {
    let text = text.trim().trim_end_matches(':').trim();

    if text.ends_with(')') {
        if let Some(pos) = text.rfind(" (") {
            let label = text[..pos].trim().to_string();
            let inner = text[pos + 2..text.len() - 1].trim().to_string();
            if !label.is_empty() {
                return (label, non_empty(inner));
            }
        }
    }

    (text.to_string(), None)
}

/// Join prose lines, trimming leading/trailing blank lines
fn join_prose(lines: &[&str]) -> String {
    lines.join("\n").trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rulebook_core::ExampleKind;

    fn registry() -> SectionRegistry {
        SectionRegistry::default()
    }

    fn parse(file_name: &str, content: &str) -> ParseOutcome {
        parse_document(file_name, content, &registry())
    }

    const FULL_DOC: &str = r#"# Add Missing Index

Impact: CRITICAL
Impact description: 100x faster lookups on large tables
Supabase: Use the index advisor to find candidates.

Sequential scans on large tables dominate query time. Add a btree index
on columns used in WHERE clauses and joins.

## Incorrect (no index on filter column)

```sql
SELECT * FROM orders WHERE customer_id = 42;
```

Forces a sequential scan over the whole table.

## Correct

```sql
CREATE INDEX idx_orders_customer_id ON orders (customer_id);
```

References:
- https://www.postgresql.org/docs/current/indexes.html
- https://supabase.com/docs/guides/database/query-optimization
"#;

    #[test]
    fn parse_full_document() {
        let outcome = parse("query-add-missing-index.md", FULL_DOC);
        assert!(outcome.is_success(), "diagnostics: {:?}", outcome.diagnostics);

        let rule = &outcome.rule;
        assert_eq!(rule.title, "Add Missing Index");
        assert_eq!(rule.impact, "CRITICAL");
        assert_eq!(
            rule.impact_description.as_deref(),
            Some("100x faster lookups on large tables")
        );
        assert_eq!(rule.section, 1);
        assert!(rule.explanation.starts_with("Sequential scans"));
        assert_eq!(
            rule.supabase_notes.as_deref(),
            Some("Use the index advisor to find candidates.")
        );
        assert_eq!(rule.references.len(), 2);
        assert!(rule.id.is_none());

        assert_eq!(rule.examples.len(), 2);
        let bad = &rule.examples[0];
        assert_eq!(bad.label, "Incorrect");
        assert_eq!(bad.description.as_deref(), Some("no index on filter column"));
        assert_eq!(bad.language.as_deref(), Some("sql"));
        assert!(bad.code.contains("customer_id = 42"));
        assert_eq!(
            bad.additional_text.as_deref(),
            Some("Forces a sequential scan over the whole table.")
        );
        assert_eq!(bad.kind(), ExampleKind::Bad);

        let good = &rule.examples[1];
        assert_eq!(good.label, "Correct");
        assert!(good.description.is_none());
        assert!(good.code.starts_with("CREATE INDEX"));
        assert_eq!(good.kind(), ExampleKind::Good);
    }

    #[test]
    fn examples_preserve_source_order() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\n## Correct\n\n## Incorrect\n\n## Correct again\n";
        let outcome = parse("query-t.md", doc);
        let labels: Vec<&str> = outcome.rule.examples.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Correct", "Incorrect", "Correct again"]);
    }

    #[test]
    fn missing_title_is_an_error_but_parsing_continues() {
        let doc = "Impact: HIGH\n\nSome explanation.\n\n## Correct\n\n```sql\nSELECT 1;\n```\n";
        let outcome = parse("query-untitled.md", doc);
        assert!(!outcome.is_success());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MissingTitle));
        // Best-effort: the rest of the document is still parsed
        assert_eq!(outcome.rule.impact, "HIGH");
        assert_eq!(outcome.rule.examples.len(), 1);
    }

    #[test]
    fn missing_metadata_block_is_an_error() {
        let doc = "# Title\n\nExplanation straight away.\n";
        let outcome = parse("query-bare.md", doc);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::MissingMetadata));
        assert_eq!(outcome.rule.explanation, "Explanation straight away.");
    }

    #[test]
    fn unknown_section_prefix_is_an_error_not_a_default() {
        let doc = "# Title\n\nImpact: LOW\n\nBody.\n";
        let outcome = parse("misc-title.md", doc);
        assert!(!outcome.is_success());
        let diag = outcome
            .diagnostics
            .iter()
            .find(|d| d.code == DiagnosticCode::UnknownSectionPrefix)
            .expect("unknown prefix diagnostic");
        assert!(diag.message.contains("misc"));
    }

    #[test]
    fn every_known_prefix_resolves() {
        let cases = [
            ("query-x.md", 1),
            ("conn-x.md", 2),
            ("connection-x.md", 2),
            ("schema-x.md", 3),
            ("lock-x.md", 4),
            ("security-x.md", 5),
            ("data-x.md", 6),
            ("monitor-x.md", 7),
            ("advanced-x.md", 8),
        ];
        for (file, expected) in cases {
            let outcome = parse(file, "# T\n\nImpact: LOW\n\nBody.\n");
            assert_eq!(outcome.rule.section, expected, "file {}", file);
        }
    }

    #[test]
    fn label_without_fence_yields_empty_code() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\n## Incorrect\n\nJust prose, no code.\n";
        let outcome = parse("query-t.md", doc);
        assert_eq!(outcome.rule.examples.len(), 1);
        let example = &outcome.rule.examples[0];
        assert_eq!(example.code, "");
        assert!(!example.has_code());
        assert_eq!(example.additional_text.as_deref(), Some("Just prose, no code."));
    }

    #[test]
    fn fence_without_language_tag() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\n## Correct\n\n```\nSELECT 1;\n```\n";
        let outcome = parse("query-t.md", doc);
        let example = &outcome.rule.examples[0];
        assert!(example.language.is_none());
        assert_eq!(example.language_or_default(), "sql");
        assert_eq!(example.code, "SELECT 1;");
    }

    #[test]
    fn unterminated_fence_is_reported() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\n## Correct\n\n```sql\nSELECT 1;\n";
        let outcome = parse("query-t.md", doc);
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnterminatedCodeFence));
        // Collected code is still kept
        assert_eq!(outcome.rule.examples[0].code, "SELECT 1;");
    }

    #[test]
    fn inline_reference_value() {
        let doc = "# T\n\nImpact: LOW\nReference: https://example.org/one\n\nBody.\n";
        let outcome = parse("query-t.md", doc);
        assert_eq!(outcome.rule.references, vec!["https://example.org/one"]);
    }

    #[test]
    fn bulleted_references_block() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\nReferences:\n- https://a.example\n- https://b.example\n";
        let outcome = parse("query-t.md", doc);
        assert_eq!(
            outcome.rule.references,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn unknown_metadata_key_is_a_warning() {
        let doc = "# T\n\nImpact: LOW\nSeverity: red\n\nBody.\n";
        let outcome = parse("query-t.md", doc);
        assert!(outcome.is_success());
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnknownMetadataKey));
        // The typo'd line does not leak into the explanation
        assert_eq!(outcome.rule.explanation, "Body.");
    }

    #[test]
    fn nested_heading_levels_parse_like_top_level() {
        // A rule subsection cut from the aggregated document: title at ###,
        // examples at ####.
        let doc = "### Add Missing Index\n\nImpact: CRITICAL\n\nBody text here.\n\n#### Incorrect\n\n```sql\nSELECT 1;\n```\n";
        let outcome = parse("query-add-missing-index.md", doc);
        assert!(outcome.is_success(), "diagnostics: {:?}", outcome.diagnostics);
        assert_eq!(outcome.rule.title, "Add Missing Index");
        assert_eq!(outcome.rule.examples.len(), 1);
        assert_eq!(outcome.rule.examples[0].label, "Incorrect");
    }

    #[test]
    fn standalone_parenthetical_becomes_description() {
        let doc = "# T\n\nImpact: LOW\n\nBody.\n\n## Incorrect\n\n(runs per row)\n\n```sql\nSELECT 1;\n```\n";
        let outcome = parse("query-t.md", doc);
        let example = &outcome.rule.examples[0];
        assert_eq!(example.description.as_deref(), Some("runs per row"));
    }

    #[test]
    fn label_split_edge_cases() {
        assert_eq!(split_label("Incorrect"), ("Incorrect".to_string(), None));
        assert_eq!(
            split_label("Incorrect (N+1 query)"),
            ("Incorrect".to_string(), Some("N+1 query".to_string()))
        );
        assert_eq!(split_label("Correct:"), ("Correct".to_string(), None));
        // A lone parenthesized heading keeps its text as the label
        assert_eq!(split_label("(odd)"), ("(odd)".to_string(), None));
    }
}
