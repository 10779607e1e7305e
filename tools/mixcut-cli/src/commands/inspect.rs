//! Show timeline document information.

use std::path::PathBuf;

use mixcut_timeline_model::TimelineDoc;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let doc = TimelineDoc::from_json(&json)
        .map_err(|e| anyhow::anyhow!("Failed to parse timeline: {e}"))?;

    println!("Timeline: {}", path.display());
    println!("  Duration: {:.2}s", doc.duration());
    println!("  Tracks: {}", doc.tracks.len());
    for track in &doc.tracks {
        let flags = match (track.visible, track.locked) {
            (false, true) => " [hidden, locked]",
            (false, false) => " [hidden]",
            (true, true) => " [locked]",
            (true, false) => "",
        };
        println!("    Track {}{flags}: {} clip(s)", track.order, track.clips.len());
        for clip in &track.clips {
            let placement = match clip.position {
                Some(p) => format!(
                    " @ ({:.2},{:.2}) {:.2}x{:.2}",
                    p.x, p.y, p.width, p.height
                ),
                None => String::new(),
            };
            println!(
                "      {} [{:.2}s..{:.2}s) asset={} speed={}x{placement}",
                clip.id,
                clip.start_time,
                clip.end_time(),
                clip.asset_id,
                clip.speed,
            );
        }
    }
    println!("  Assets: {}", doc.assets.len());
    for asset in &doc.assets {
        println!(
            "    {} ({:?}) {}x{} {:.2}s — {}",
            asset.id, asset.kind, asset.width, asset.height, asset.duration, asset.path
        );
    }

    Ok(())
}
