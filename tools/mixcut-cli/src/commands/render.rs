//! Composite one preview frame and write it as PNG.

use std::path::PathBuf;
use std::sync::Arc;

use mixcut_common::EditorConfig;
use mixcut_preview_engine::PreviewEngine;
use mixcut_timeline_model::{MemoryStore, TimelineDoc};

pub fn run(
    path: PathBuf,
    time: f64,
    output: PathBuf,
    width: u32,
    height: u32,
    scale: Option<f64>,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let doc = TimelineDoc::from_json(&json)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    let render_scale = scale.unwrap_or_else(|| EditorConfig::load().preview.render_scale);

    let store = Arc::new(MemoryStore::new(doc));
    store.set_playhead(time, false);
    let mut engine = PreviewEngine::new(store, width, height, render_scale);

    // Tick until the loop idles so late-arriving first frames land.
    let mut frames = 0;
    while engine.tick()? {
        frames += 1;
        if frames > 16 {
            break;
        }
    }

    let surface = engine.surface();
    println!(
        "Rendered t={time:.2}s at {}x{} ({frames} tick(s))",
        surface.width(),
        surface.height()
    );
    surface
        .save(&output)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}
