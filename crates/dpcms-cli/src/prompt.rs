//! Interactive confirmation
//!
//! Soft validation warnings and destructive commands ask before going on.

use anyhow::Result;
use std::io::{self, Write};

use crate::output::Output;

/// Prompt for confirmation
///
/// Returns true if user confirms, false otherwise.
/// In non-interactive mode (no TTY), returns false.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

/// Decide whether to continue past soft warnings
///
/// No warnings, `--yes`, or machine-readable output all proceed without
/// asking. Otherwise the warnings are shown and the user is asked.
pub fn accept_warnings(warnings: &[String], yes: bool, output: &Output) -> Result<bool> {
    if warnings.is_empty() || yes {
        return Ok(true);
    }

    output.warnings(warnings);
    if !output.should_prompt() {
        return Ok(true);
    }
    confirm("Save anyway?")
}

fn is_yes(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    input == "y" || input == "yes"
}
