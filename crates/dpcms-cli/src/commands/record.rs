//! Record command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use dpcms_core::{
    ContentType, Filter, FilterUpdate, RecordDraft, Repository, Severity, SortKey, SortOrder,
    Status, UpdateRequest, Urgency,
};

use crate::output::Output;
use crate::prompt::{accept_warnings, confirm};

/// Field flags shared by `add` and `update`
#[derive(Args, Debug, Default, Clone)]
pub struct RecordFields {
    /// Content type (condition, symptom, advice, disclaimer, treatment, prevention)
    #[arg(long = "type")]
    pub kind: Option<ContentType>,
    /// Title
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Body text
    #[arg(short, long)]
    pub content: Option<String>,
    /// One-line summary
    #[arg(long)]
    pub short_description: Option<String>,
    /// Author
    #[arg(short, long)]
    pub author: Option<String>,
    /// Urgency (immediate, moderate, monitor)
    #[arg(long)]
    pub urgency: Option<Urgency>,
    /// Severity (mild, moderate, severe, critical)
    #[arg(long)]
    pub severity: Option<Severity>,
    /// Category
    #[arg(long)]
    pub category: Option<String>,
    /// Tags (repeatable); replaces existing tags on update
    #[arg(short = 'g', long = "tag")]
    pub tags: Vec<String>,
    /// Lifecycle status (draft, review, approved, archived)
    #[arg(long)]
    pub status: Option<Status>,
    /// Read fields from a JSON file first; flags override it
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Save without asking when there are warnings
    #[arg(short, long)]
    pub yes: bool,
}

impl RecordFields {
    /// Build a draft from `--file` (if any) with flags layered on top
    pub fn into_draft(self) -> Result<RecordDraft> {
        let mut draft: RecordDraft = match self.file {
            Some(ref path) => read_json(path)?,
            None => RecordDraft::default(),
        };

        if self.kind.is_some() {
            draft.kind = self.kind;
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(content) = self.content {
            draft.body = content;
        }
        if self.short_description.is_some() {
            draft.short_description = self.short_description;
        }
        let meta = &mut draft.metadata;
        if let Some(author) = self.author {
            meta.author = author;
        }
        if self.urgency.is_some() {
            meta.urgency = self.urgency;
        }
        if self.severity.is_some() {
            meta.severity = self.severity;
        }
        if self.category.is_some() {
            meta.category = self.category;
        }
        if !self.tags.is_empty() {
            meta.tags = self.tags;
        }
        if let Some(status) = self.status {
            meta.status = status;
        }

        Ok(draft)
    }

    /// Build an update request from `--file` (if any) with flags layered on top
    pub fn into_update(self) -> Result<UpdateRequest> {
        let mut request: UpdateRequest = match self.file {
            Some(ref path) => read_json(path)?,
            None => UpdateRequest::default(),
        };

        if self.kind.is_some() {
            request.kind = self.kind;
        }
        if self.title.is_some() {
            request.title = self.title;
        }
        if self.content.is_some() {
            request.body = self.content;
        }
        if self.short_description.is_some() {
            request.short_description = self.short_description;
        }
        let patch = &mut request.metadata;
        if self.author.is_some() {
            patch.author = self.author;
        }
        if self.urgency.is_some() {
            patch.urgency = self.urgency;
        }
        if self.severity.is_some() {
            patch.severity = self.severity;
        }
        if self.category.is_some() {
            patch.category = self.category;
        }
        if !self.tags.is_empty() {
            patch.tags = Some(self.tags);
        }
        if self.status.is_some() {
            patch.status = self.status;
        }

        Ok(request)
    }
}

/// Search, filter and sort flags for `list`
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive search over title, content, tags and category
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only this content type, or "all"
    #[arg(short = 't', long = "type", default_value = "all")]
    pub kind: Filter<ContentType>,
    /// Only this urgency, or "all"
    #[arg(short, long, default_value = "all")]
    pub urgency: Filter<Urgency>,
    /// Only this status, or "all"
    #[arg(long, default_value = "all")]
    pub status: Filter<Status>,
    /// Sort key (title, lastUpdated, urgency, category)
    #[arg(long, default_value = "lastUpdated")]
    pub sort: SortKey,
    /// Sort order (asc, desc)
    #[arg(long, default_value = "desc")]
    pub order: SortOrder,
}

/// List records under the given criteria
pub fn list(repo: &mut Repository, args: ListArgs, output: &Output) -> Result<()> {
    if let Some(term) = args.search {
        repo.search(term);
    }
    repo.set_filters(FilterUpdate {
        filter_type: Some(args.kind),
        filter_urgency: Some(args.urgency),
        filter_status: Some(args.status),
    });
    repo.set_sorting(args.sort, args.order);

    output.print_records(&repo.filtered_content());
    Ok(())
}

/// Show a single record
pub fn show(repo: &Repository, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let record = repo
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Content not found: {}", id))?;

    output.print_record(record);
    Ok(())
}

/// Create a new record
pub fn add(repo: &mut Repository, fields: RecordFields, output: &Output) -> Result<()> {
    let yes = fields.yes;
    let draft = fields.into_draft()?;

    let validation = repo.validate(&draft);
    if validation.is_valid() && !accept_warnings(&validation.warnings, yes, output)? {
        output.message("Cancelled.");
        return Ok(());
    }

    let saved = repo.add(draft).context("Failed to add content")?;

    output.success(&format!("Added content: {}", saved.record.id));
    output.print_record(&saved.record);
    Ok(())
}

/// Apply changes to an existing record
pub fn update(
    repo: &mut Repository,
    id: String,
    fields: RecordFields,
    output: &Output,
) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let yes = fields.yes;
    let request = fields.into_update()?;

    if let Some(current) = repo.get(&id) {
        let merged = request.apply_to(current);
        let validation = repo.validate(&RecordDraft::from(&merged));
        if validation.is_valid() && !accept_warnings(&validation.warnings, yes, output)? {
            output.message("Cancelled.");
            return Ok(());
        }
    }

    let saved = repo.update(&id, request).context("Failed to update content")?;

    output.success(&format!(
        "Updated content: {} (version {})",
        saved.record.id, saved.record.metadata.version
    ));
    output.print_record(&saved.record);
    Ok(())
}

/// Delete a record
pub fn delete(repo: &mut Repository, id: String, yes: bool, output: &Output) -> Result<()> {
    let id = resolve_id(repo, &id)?;

    if output.should_prompt() && !yes {
        if let Some(record) = repo.get(&id) {
            println!("Delete {}: {} - {}", record.kind, record.id, record.title);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !repo.delete(&id) {
        bail!("Content not found: {}", id);
    }

    output.success(&format!("Deleted content: {}", id));
    Ok(())
}

/// Copy a record as a new draft
pub fn duplicate(repo: &mut Repository, id: String, output: &Output) -> Result<()> {
    let id = resolve_id(repo, &id)?;
    let saved = repo
        .duplicate(&id)
        .context("Failed to duplicate content")?;

    output.warnings(&saved.warnings);
    output.success(&format!("Duplicated {} as {}", id, saved.record.id));
    output.print_record(&saved.record);
    Ok(())
}

/// Validate a draft file without saving it
pub fn validate(repo: &Repository, file: &Path, output: &Output) -> Result<()> {
    let draft: RecordDraft = read_json(file)?;
    let validation = repo.validate(&draft);

    output.print_validation(&validation);
    if !validation.is_valid() {
        bail!("{} validation error(s)", validation.errors.len());
    }
    Ok(())
}

/// Resolve a record id (supports full id or unique prefix)
fn resolve_id(repo: &Repository, id: &str) -> Result<String> {
    if repo.get(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = repo
        .records()
        .iter()
        .filter(|r| r.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No content found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple records match '{}':", id);
            for record in &matches {
                eprintln!("  {} - {}", record.id, record.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {:?}", path))
}
