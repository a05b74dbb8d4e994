use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use rulebook_core::{
    Config, Diagnostic, DiagnosticCode, FileReport, Location, Report, SectionRegistry, Severity,
};
use rulebook_engine::{
    assign_rule_ids, extract_test_cases, process_documents, render_document, SourceDocument,
    TestCaseList,
};

/// Rulebook - compile performance-rule documents into a reference document
/// and a test-case list
#[derive(Parser)]
#[command(name = "rulebook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: rulebook.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every rule document and print errors and warnings
    Validate {
        /// Directory of rule documents (overrides config)
        #[arg(short, long)]
        rules_dir: Option<PathBuf>,

        /// Also write a JSON validation report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Run the full pipeline and write both outputs
    Build {
        /// Directory of rule documents (overrides config)
        #[arg(short, long)]
        rules_dir: Option<PathBuf>,

        /// Output path for the aggregated document (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for the test-case list (overrides config)
        #[arg(short, long)]
        test_cases: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("rulebook.toml").exists() {
        Config::from_file(Path::new("rulebook.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Validate { rules_dir, report } => {
            validate_command(&config, rules_dir.as_deref(), report.as_deref(), cli.verbose)
        }
        Commands::Build {
            rules_dir,
            output,
            test_cases,
        } => build_command(
            &config,
            rules_dir.as_deref(),
            output.as_deref(),
            test_cases.as_deref(),
            cli.verbose,
        ),
    }
}

/// Load the section registry from the configured file, or the defaults
fn load_registry(config: &Config, verbose: bool) -> SectionRegistry {
    let path = config
        .sections_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("sections.toml"));

    if verbose {
        if path.exists() {
            eprintln!("{} {}", "Loading sections from:".cyan(), path.display());
        } else {
            eprintln!("{}", "Using built-in section table".cyan());
        }
    }

    SectionRegistry::load(&path)
}

/// Result of scanning the rules directory: readable documents plus one
/// pre-failed report per file that could not be read
#[derive(Debug, Default)]
struct Discovery {
    documents: Vec<SourceDocument>,
    failures: Vec<FileReport>,
}

impl Discovery {
    fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.failures.is_empty()
    }
}

/// Discover rule documents in a directory.
///
/// Only `.md` files count; names starting with `_` are reserved for
/// templates and policy documents and are skipped. Zero discovered files is
/// an expected initial-setup state, not an error.
///
/// A file that cannot be read (I/O failure, invalid UTF-8) is recorded as an
/// excluded file and the walk continues; one unreadable file never aborts
/// the batch.
fn discover_documents(rules_dir: &Path, verbose: bool) -> Discovery {
    let mut discovery = Discovery::default();

    if !rules_dir.exists() {
        if verbose {
            eprintln!(
                "{} {}",
                "Rules directory does not exist:".yellow(),
                rules_dir.display()
            );
        }
        return discovery;
    }

    for entry in WalkDir::new(rules_dir).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let name = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| rules_dir.display().to_string());
                discovery.failures.push(unreadable(name, &e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".md") || name.starts_with('_') {
            continue;
        }

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => discovery.documents.push(SourceDocument::new(name, content)),
            Err(e) => discovery.failures.push(unreadable(name, &e.to_string())),
        }
    }

    tracing::debug!(
        count = discovery.documents.len(),
        failed = discovery.failures.len(),
        dir = %rules_dir.display(),
        "discovered rule documents"
    );
    discovery
}

/// Excluded-file report for a file that could not be read
fn unreadable(name: String, reason: &str) -> FileReport {
    let diagnostic = Diagnostic::error(
        DiagnosticCode::UnreadableFile,
        format!("failed to read file: {}", reason),
    )
    .with_location(Location::new(&name));
    FileReport::new(name, vec![diagnostic])
}

/// Validate command - check all rule documents, exit non-zero on any error
fn validate_command(
    config: &Config,
    rules_dir: Option<&Path>,
    report_path: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let rules_dir = rules_dir.unwrap_or(&config.rules_dir);
    let registry = load_registry(config, verbose);

    if verbose {
        eprintln!("{} {}", "Scanning:".cyan(), rules_dir.display());
    }

    let discovery = discover_documents(rules_dir, verbose);
    if discovery.is_empty() {
        println!(
            "{}",
            "No rule documents found (expected for a fresh setup)".yellow()
        );
    }

    let input = process_documents(&discovery.documents, &registry);
    let mut files = discovery.failures;
    files.extend(input.reports);
    let report = Report::from_files(files);

    print_file_diagnostics(&report);
    print_summary(&report);

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Build command - run the full pipeline and write both outputs.
///
/// Files with errors are excluded and reported, but exclusion alone never
/// fails the build; both outputs are written even for zero rules.
fn build_command(
    config: &Config,
    rules_dir: Option<&Path>,
    output: Option<&Path>,
    test_cases: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let rules_dir = rules_dir.unwrap_or(&config.rules_dir);
    let output = output.unwrap_or(&config.output);
    let test_cases_path = test_cases.unwrap_or(&config.test_cases);
    let registry = load_registry(config, verbose);

    if verbose {
        eprintln!("{} {}", "Scanning:".cyan(), rules_dir.display());
    }

    let discovery = discover_documents(rules_dir, verbose);
    let input = process_documents(&discovery.documents, &registry);
    let mut files = discovery.failures;
    files.extend(input.reports);
    let report = Report::from_files(files);

    print_file_diagnostics(&report);

    let grouped = assign_rule_ids(input.rules);
    let document = render_document(&grouped, &registry, &config.metadata);
    std::fs::write(output, document)?;

    let cases = extract_test_cases(&grouped, &registry);
    let list = TestCaseList::new(cases);
    list.save_to_file(test_cases_path)?;

    println!();
    println!(
        "{} {} rules across {} sections",
        "Built".green().bold(),
        report.summary.rules_included,
        registry.sections().len()
    );
    if report.summary.files_checked > report.summary.rules_included {
        println!(
            "{} {} file(s) excluded due to errors",
            "Note:".yellow(),
            report.summary.files_checked - report.summary.rules_included
        );
    }
    println!("{} {}", "Document:".green(), output.display());
    println!(
        "{} {} ({} cases)",
        "Test cases:".green(),
        test_cases_path.display(),
        list.count
    );

    Ok(())
}

/// Print per-file diagnostics in discovery order
fn print_file_diagnostics(report: &Report) {
    for file in &report.files {
        if file.diagnostics.is_empty() {
            continue;
        }

        let status = if file.included {
            "included".green()
        } else {
            "excluded".red().bold()
        };
        println!("{} ({})", file.file.bold(), status);

        for diag in &file.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
            };
            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(loc) = &diag.location {
                if let Some(line) = loc.line {
                    println!("    at {}:{}", loc.file, line);
                }
            }
            if let Some(expected) = &diag.expected {
                println!("    Expected: {}", expected);
            }
            if let Some(actual) = &diag.actual {
                println!("    Actual:   {}", actual);
            }
        }
    }
}

/// Print the aggregate summary
fn print_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Rule Validation Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Files checked: {}", report.summary.files_checked);
    println!("Rules included: {}", report.summary.rules_included);
    println!();

    if report.summary.errors > 0 {
        println!(
            "  Errors:   {}",
            format!("{}", report.summary.errors).red().bold()
        );
    } else {
        println!(
            "  Errors:   {}",
            format!("{}", report.summary.errors).green()
        );
    }

    if report.summary.warnings > 0 {
        println!(
            "  Warnings: {}",
            format!("{}", report.summary.warnings).yellow()
        );
    } else {
        println!(
            "  Warnings: {}",
            format!("{}", report.summary.warnings).green()
        );
    }

    println!();
    if report.has_errors() {
        println!("{}", "✗ Validation failed".red().bold());
    } else {
        println!("{}", "✓ All rules valid".green().bold());
    }
    println!("{}", "=".repeat(60).bright_blue());
}
