//! Export and import command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use dpcms_core::{ExportFormat, Repository};

use crate::output::{print_json, Output, OutputFormat};

/// Export the whole collection
///
/// With `--output` the artifact is written into that directory under its
/// dated file name; otherwise it goes to stdout.
pub async fn export(
    repo: &Repository,
    format: ExportFormat,
    dir: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    match dir {
        Some(dir) => {
            let path = repo
                .export_to_dir(format, &dir)
                .await
                .context("Failed to export content")?;
            output.success(&format!(
                "Exported {} record(s) to {}",
                repo.records().len(),
                path.display()
            ));
            if output.is_quiet() {
                println!("{}", path.display());
            }
        }
        None => {
            let artifact = repo.export(format).context("Failed to export content")?;
            print_json(&artifact);
        }
    }
    Ok(())
}

/// Append every record from an artifact file
pub async fn import(repo: &mut Repository, file: &Path, output: &Output) -> Result<()> {
    let count = repo
        .import_file(file)
        .await
        .with_context(|| format!("Failed to import {:?}", file))?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "imported": count,
                    "total": repo.records().len()
                })
            );
        }
        OutputFormat::Quiet => println!("{}", count),
        OutputFormat::Human => {
            output.success(&format!(
                "Imported {} record(s); {} total",
                count,
                repo.records().len()
            ));
        }
    }
    Ok(())
}
