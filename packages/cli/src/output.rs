//! Token artifacts: JSON token file and environment export script

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ledger_jwt_common::LoggingTransformer;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Environment variable holding the token `name`, e.g. `bank_alice` -> `BANK_ALICE_TOKEN`.
#[must_use]
pub fn export_var_name(name: &str) -> String {
    let mut var: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    var.push_str("_TOKEN");
    var
}

/// One `export NAME_TOKEN="..."` line per token, in name order.
#[must_use]
pub fn export_lines(tokens: &BTreeMap<String, String>) -> Vec<String> {
    tokens
        .iter()
        .map(|(name, token)| format!("export {}=\"{token}\"", export_var_name(name)))
        .collect()
}

/// Shell script exporting every token.
#[must_use]
pub fn render_script(tokens: &BTreeMap<String, String>, generated_at: DateTime<Utc>) -> String {
    let vars = tokens
        .keys()
        .map(|name| export_var_name(name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut script = String::from("#!/bin/bash\n");
    script.push_str("# Ledger API JWT tokens\n");
    script.push_str(&format!(
        "# Generated on {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for line in export_lines(tokens) {
        script.push_str(&line);
        script.push('\n');
    }
    script.push_str("\necho \"Ledger API JWT tokens loaded into environment\"\n");
    script.push_str(&format!("echo \"Available tokens: {vars}\"\n"));
    script
}

/// Pretty-printed JSON object of name -> token.
///
/// # Errors
/// Fails when the tokens cannot be encoded.
pub fn render_json(tokens: &BTreeMap<String, String>) -> Result<String> {
    let mut json = serde_json::to_string_pretty(tokens).context("Failed to encode tokens")?;
    json.push('\n');
    Ok(json)
}

/// Write the JSON token file and the executable export script.
///
/// Both files are staged next to their targets and only moved into place
/// once both were written, so a failed write leaves neither behind.
///
/// # Errors
/// Fails when either file cannot be staged or moved into place.
pub fn write_artifacts(
    json_path: &Path,
    script_path: &Path,
    tokens: &BTreeMap<String, String>,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let staged_json = stage(json_path, &render_json(tokens)?)?;
    let staged_script = stage(script_path, &render_script(tokens, generated_at))?;
    make_executable(staged_script.path())?;

    staged_json
        .persist(json_path)
        .with_context(|| format!("Failed to write tokens to {}", json_path.display()))?;
    LoggingTransformer::log_artifact_written("token file", json_path, tokens.len());

    staged_script
        .persist(script_path)
        .with_context(|| format!("Failed to write script to {}", script_path.display()))?;
    LoggingTransformer::log_artifact_written("export script", script_path, tokens.len());

    Ok(())
}

/// Temporary file in the target's directory holding `contents`. Removed on drop.
fn stage(target: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = target
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to stage {}", target.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to stage {}", target.display()))?;
    Ok(file)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
