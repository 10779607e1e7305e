//! List the clips active at a timeline time.

use std::path::PathBuf;

use mixcut_preview_engine::active_clips;
use mixcut_timeline_model::TimelineDoc;

pub fn run(path: PathBuf, time: f64) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let doc = TimelineDoc::from_json(&json)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let lookup = |id: &str| doc.assets.iter().find(|a| a.id == id).cloned();
    let active = active_clips(time, &doc.tracks, &lookup);

    println!("Active clips at t={time:.2}s: {}", active.len());
    for entry in &active {
        println!(
            "  track {} clip {} source_time={:.3}s asset={} ({:?})",
            entry.track_order,
            entry.clip.id,
            entry.clip.source_time_at(time),
            entry.asset.id,
            entry.asset.kind,
        );
    }

    Ok(())
}
