//! Validate a timeline document.

use std::path::PathBuf;

use mixcut_timeline_model::TimelineDoc;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Checking timeline at: {}", path.display());

    let json = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let doc = TimelineDoc::from_json(&json)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let errors = doc.validate();
    if errors.is_empty() {
        println!("Timeline is valid.");
        return Ok(());
    }

    println!("\nValidation issues:");
    for error in &errors {
        println!("  - {error}");
    }
    anyhow::bail!("{} issue(s) found", errors.len());
}
