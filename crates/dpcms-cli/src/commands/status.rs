//! Status command handler

use anyhow::Result;

use dpcms_core::{Config, Repository};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(repo: &Repository, config: &Config, output: &Output) -> Result<()> {
    let database = config.database_path();
    let size = std::fs::metadata(&database).map(|m| m.len()).unwrap_or(0);
    let last_backup = repo
        .last_backup()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "location": repo.location(),
                    "records": repo.records().len(),
                    "last_backup": repo.last_backup(),
                    "detached": repo.is_detached(),
                    "error": repo.error(),
                    "storage": {
                        "database": database,
                        "size": size
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", repo.records().len());
        }
        OutputFormat::Human => {
            println!("DPCMS Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location:    {}", repo.location());
            println!("  Size:        {}", format_size(size));
            println!("  Last backup: {}", last_backup);
            if repo.is_detached() {
                println!("  State:       detached (run `dpcms restore` or `dpcms reset`)");
            }
            println!();
            println!("Contents:");
            println!("  Records: {}", repo.records().len());
        }
    }

    Ok(())
}

/// Format a byte count for humans
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
