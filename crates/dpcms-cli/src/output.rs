//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use dpcms_core::{ContentRecord, Stats, Validation};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single record with its facets
    pub fn print_record(&self, record: &ContentRecord) {
        match self.format {
            OutputFormat::Human => {
                let meta = &record.metadata;
                println!("ID:          {}", record.id);
                println!("Type:        {}", record.kind);
                println!("Title:       {}", record.title);
                if let Some(ref short) = record.short_description {
                    println!("Summary:     {}", short);
                }
                if let Some(urgency) = meta.urgency {
                    println!("Urgency:     {}", urgency);
                }
                if let Some(severity) = meta.severity {
                    println!("Severity:    {}", severity);
                }
                if let Some(ref category) = meta.category {
                    match meta.subcategory {
                        Some(ref sub) => println!("Category:    {} / {}", category, sub),
                        None => println!("Category:    {}", category),
                    }
                }
                if !meta.tags.is_empty() {
                    println!("Tags:        {}", meta.tags.join(", "));
                }
                println!("Status:      {}", meta.status);
                println!("Version:     {}", meta.version);
                println!(
                    "Author:      {}{}",
                    meta.author,
                    if meta.medically_reviewed {
                        " (medically reviewed)"
                    } else {
                        ""
                    }
                );
                if let Some(ref reviewer) = meta.reviewed_by {
                    println!("Reviewed by: {}", reviewer);
                }
                println!("Updated:     {}", meta.last_updated.format("%Y-%m-%d %H:%M"));

                println!();
                println!("{}", record.body);

                print_list("Symptoms", &meta.symptoms);
                print_list("When to seek help", &meta.when_to_seek_help);
                print_list("Home remedies", &meta.home_remedies);
                print_list("Prevention", &meta.prevention);
                print_list("Sources", &meta.sources);
            }
            OutputFormat::Json => print_json(record),
            OutputFormat::Quiet => {
                println!("{}", record.id);
            }
        }
    }

    /// Print a list of records
    pub fn print_records(&self, records: &[&ContentRecord]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No content found.");
                    return;
                }
                for record in records {
                    println!(
                        "{:<8} | {:<10} | {:<9} | {:<8} | {}",
                        short_id(&record.id),
                        record.kind.as_str(),
                        record.metadata.urgency.map(|u| u.as_str()).unwrap_or("-"),
                        record.metadata.status.as_str(),
                        truncate(&record.title, 45)
                    );
                }
                println!("\n{} record(s)", records.len());
            }
            OutputFormat::Json => print_json(&records),
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print collection statistics
    pub fn print_stats(&self, stats: &Stats<'_>) {
        match self.format {
            OutputFormat::Human => {
                println!("Total content: {}", stats.total_content);
                println!();
                println!("By type:");
                for (kind, count) in &stats.by_type {
                    println!("  {:<11} {}", kind.as_str(), count);
                }
                println!("By urgency:");
                for (urgency, count) in &stats.by_urgency {
                    println!("  {:<11} {}", urgency, count);
                }
                println!("By status:");
                for (status, count) in &stats.by_status {
                    println!("  {:<11} {}", status.as_str(), count);
                }

                println!();
                println!("── Recently updated ──");
                for record in &stats.recently_updated {
                    println!(
                        "[{}] {} {}",
                        record.metadata.last_updated.format("%Y-%m-%d"),
                        short_id(&record.id),
                        truncate(&record.title, 50)
                    );
                }

                if !stats.needs_review.is_empty() {
                    println!();
                    println!("── Needs review ({}) ──", stats.needs_review.len());
                    for record in &stats.needs_review {
                        println!("{} {}", short_id(&record.id), truncate(&record.title, 50));
                    }
                }
            }
            OutputFormat::Json => print_json(stats),
            OutputFormat::Quiet => {
                println!("{}", stats.total_content);
            }
        }
    }

    /// Print a validation report
    pub fn print_validation(&self, validation: &Validation) {
        match self.format {
            OutputFormat::Human => {
                if validation.is_valid() {
                    println!("✓ Valid");
                } else {
                    println!("✗ Invalid");
                }
                for error in &validation.errors {
                    println!("  error:   {}", error);
                }
                for warning in &validation.warnings {
                    println!("  warning: {}", warning);
                }
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "isValid": validation.is_valid(),
                    "errors": validation.errors,
                    "warnings": validation.warnings,
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", if validation.is_valid() { "valid" } else { "invalid" });
            }
        }
    }

    /// Print soft validation warnings to stderr
    pub fn warnings(&self, warnings: &[String]) {
        if self.is_quiet() {
            return;
        }
        for warning in warnings {
            eprintln!("⚠ {}", warning);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render JSON: {}", e),
    }
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("── {} ──", heading);
    for item in items {
        println!("• {}", item);
    }
}

/// First eight characters of an id
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
