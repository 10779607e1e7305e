//! Exercise the recording compositor against synthetic sources.

use std::path::PathBuf;

use mixcut_recording_engine::{
    RecordingConfig, RecordingSession, ScreenTarget, SyntheticOpener,
};

pub async fn run(duration: f64, no_camera: bool, output: PathBuf) -> anyhow::Result<()> {
    let config = RecordingConfig {
        screen: Some(ScreenTarget::Full),
        camera: (!no_camera).then(|| "cam0".to_string()),
        microphones: vec!["mic0".to_string()],
        ..RecordingConfig::default()
    };

    let mut session = RecordingSession::new(config, SyntheticOpener::new());
    session
        .start(960.0, 540.0)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start recording: {e}"))?;

    println!(
        "Recording (compositing: {})",
        if session.is_compositing() { "screen + camera" } else { "single source" }
    );

    // Simulated clock at 1ms resolution.
    let total_ms = (duration.max(0.0) * 1000.0) as u64;
    let mut frames = 0u64;
    for ms in 0..total_ms {
        if session.tick(ms * 1_000_000) {
            frames += 1;
        }
    }
    let audio = session.mixed_audio_block();
    println!("Produced {frames} composited frame(s), {} audio sample(s)", audio.len());

    if let Some(frame) = session.composited_frame() {
        frame
            .save(&output)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;
        println!("Wrote {}", output.display());
    }

    session.stop();
    Ok(())
}
