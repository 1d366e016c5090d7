//! Stats command handler

use anyhow::Result;

use dpcms_core::Repository;

use crate::output::Output;

/// Show aggregate statistics
pub fn show(repo: &Repository, output: &Output) -> Result<()> {
    output.print_stats(&repo.stats());
    Ok(())
}
