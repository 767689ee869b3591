//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and the message editor

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_commits, display_config_vars, display_deploy_plan, display_error, display_files,
    display_release, display_status, display_success, display_warning,
};

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive) as confirmation.
/// Default is "no" if user presses Enter.
///
/// # Arguments
/// * `prompt` - The prompt message to display (without the "(y/N): " suffix)
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_confirmation(&input))
}

fn is_confirmation(input: &str) -> bool {
    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Opens `editor` on a file pre-filled with `initial` and returns the result.
///
/// The editor runs through `sh -c` the way git launches `core.editor`, so
/// editor values with arguments ("code --wait") work. Lines starting with
/// `#` are dropped.
///
/// # Returns
/// * `Ok(String)` - Edited message, trimmed
/// * `Err` - If the editor fails or the message is empty
pub fn edit_message(editor: &str, path: &Path, initial: &str) -> Result<String> {
    fs::write(path, initial)
        .with_context(|| format!("cannot write {}", path.display()))?;

    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{} \"$@\"", editor))
        .arg(editor)
        .arg(path)
        .status()
        .with_context(|| format!("cannot launch editor '{}'", editor))?;
    if !status.success() {
        anyhow::bail!("editor '{}' exited with {}", editor, status);
    }

    let edited = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let message = strip_comments(&edited);
    if message.is_empty() {
        anyhow::bail!("Aborting due to empty message");
    }
    Ok(message)
}

/// Drop `#` comment lines and surrounding whitespace.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
