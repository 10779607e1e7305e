//! Show or update persisted preferences.

use mixcut_common::EditorConfig;

pub fn run(set_render_scale: Option<f64>) -> anyhow::Result<()> {
    let mut config = EditorConfig::load();

    if let Some(scale) = set_render_scale {
        config
            .set_render_scale(scale)
            .map_err(|e| anyhow::anyhow!("Failed to save config: {e}"))?;
        println!("Render scale set to {}", config.preview.render_scale);
        return Ok(());
    }

    println!("Preview:");
    println!("  render_scale: {}", config.preview.render_scale);
    println!("Recording:");
    println!("  screen_fps: {}", config.recording.screen_fps);
    println!("  camera_fps: {}", config.recording.camera_fps);
    println!("  audio_sample_rate: {}", config.recording.audio_sample_rate);
    println!("Logging:");
    println!("  level: {}", config.logging.level);

    Ok(())
}
