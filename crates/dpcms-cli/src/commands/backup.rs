//! Restore and reset command handlers

use anyhow::{Context, Result};

use dpcms_core::Repository;

use crate::output::Output;
use crate::prompt::confirm;

/// Reload the collection from the backup slot
pub fn restore(repo: &mut Repository, yes: bool, output: &Output) -> Result<()> {
    if output.should_prompt() && !yes {
        println!("Replace all content with the last backup?");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = repo
        .restore_backup()
        .context("Failed to restore from backup")?;

    output.success(&format!("Restored {} record(s) from backup", count));
    Ok(())
}

/// Discard everything and re-seed the default records
pub fn reset(repo: &mut Repository, yes: bool, output: &Output) -> Result<()> {
    if output.should_prompt() && !yes {
        println!(
            "Delete all {} record(s) and the backup, then restore the defaults?",
            repo.records().len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let count = repo.reset().context("Failed to reset content")?;

    output.success(&format!("Reset to {} default record(s)", count));
    Ok(())
}
