//! Real-time audio mixing.
//!
//! More than one audio source gets summed into a single destination
//! track with clipping at full scale. A mix failure falls back to
//! passing the first track through rather than failing the stream.

use mixcut_common::{MixcutError, MixcutResult};

use crate::capture::AudioSource;

/// Sum sample blocks into one block, clamped to `[-1, 1]`.
///
/// Blocks may be shorter than the longest one (a device with nothing
/// buffered reads short); missing samples contribute silence.
pub fn mix_blocks(blocks: &[Vec<f32>]) -> MixcutResult<Vec<f32>> {
    if blocks.is_empty() {
        return Err(MixcutError::audio("no audio blocks to mix"));
    }
    let len = blocks.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = vec![0.0f32; len];
    for block in blocks {
        for (acc, sample) in out.iter_mut().zip(block.iter()) {
            *acc += sample;
        }
    }
    // Clamp only the final sum; clamping per source would make the
    // result depend on source order.
    for acc in &mut out {
        *acc = acc.clamp(-1.0, 1.0);
    }
    Ok(out)
}

/// Mix multiple blocks, or pass a single block through untouched.
///
/// On mix failure the first block is passed through so audio keeps
/// flowing.
pub fn mix_or_passthrough(mut blocks: Vec<Vec<f32>>) -> Vec<f32> {
    match blocks.len() {
        0 => Vec::new(),
        1 => blocks.remove(0),
        _ => match mix_blocks(&blocks) {
            Ok(mixed) => mixed,
            Err(e) => {
                tracing::warn!(error = %e, "audio mix failed, passing first track through");
                blocks.remove(0)
            }
        },
    }
}

/// Pull one block from every source and mix them down.
pub fn pull_mixed(sources: &mut [Box<dyn AudioSource>], frames: usize) -> Vec<f32> {
    let blocks: Vec<Vec<f32>> = sources.iter_mut().map(|s| s.read_block(frames)).collect();
    mix_or_passthrough(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_sums_and_clamps() {
        let mixed = mix_blocks(&[vec![0.5, 0.8, -0.5], vec![0.25, 0.8, -0.9]]).unwrap();
        assert!((mixed[0] - 0.75).abs() < 1e-6);
        assert_eq!(mixed[1], 1.0); // clipped
        assert_eq!(mixed[2], -1.0);
    }

    #[test]
    fn test_mix_is_source_order_independent() {
        // An over-full intermediate sum must not clip early: 0.6 + 0.6
        // - 0.5 is 0.7 regardless of which source lands last.
        let a = vec![0.6f32];
        let b = vec![0.6f32];
        let c = vec![-0.5f32];
        let forward = mix_blocks(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let reverse = mix_blocks(&[c, b, a]).unwrap();
        assert!((forward[0] - 0.7).abs() < 1e-6);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_short_block_contributes_silence() {
        let mixed = mix_blocks(&[vec![0.5, 0.5, 0.5], vec![0.25]]).unwrap();
        assert!((mixed[0] - 0.75).abs() < 1e-6);
        assert!((mixed[1] - 0.5).abs() < 1e-6);
        assert!((mixed[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_track_passes_through_unmodified() {
        let block = vec![0.9f32, -0.9, 0.3];
        assert_eq!(mix_or_passthrough(vec![block.clone()]), block);
    }

    #[test]
    fn test_empty_input_yields_silence() {
        assert!(mix_or_passthrough(Vec::new()).is_empty());
        assert!(mix_blocks(&[]).is_err());
    }
}
