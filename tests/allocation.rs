//! Heap profile of steady-state playback.
//!
//! Kept as the only test in this binary: dhat's testing profiler is global.

use sticker_frames::{AnimationPlayer, Container, DecoderConfig};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn container(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes: Vec<u8> = [24i32, frames.len() as i32, 32, 16, 128]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect();
    let mut previous = vec![0u8; 128 * 16];
    for frame in frames {
        let delta: Vec<u8> = frame.iter().zip(&previous).map(|(a, b)| a ^ b).collect();
        let payload = lz4_flex::block::compress(&delta);
        bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        bytes.extend_from_slice(&payload);
        previous.clone_from(frame);
    }
    bytes
}

#[test]
fn test_playback_does_not_allocate() {
    let _profiler = dhat::Profiler::builder().testing().build();

    let frames: Vec<Vec<u8>> = (0..12u8)
        .map(|i| (0..128 * 16).map(|p| (p as u8).wrapping_mul(i)).collect())
        .collect();
    let container = Container::new(container(&frames)).unwrap();
    let mut player = AnimationPlayer::new(container, &DecoderConfig::default()).unwrap();

    let before = dhat::HeapStats::get();
    for _ in 0..3 {
        for expected in &frames {
            let frame = player.advance().unwrap();
            assert!(frame.pixels == &expected[..]);
        }
    }
    let after = dhat::HeapStats::get();

    dhat::assert_eq!(after.total_blocks, before.total_blocks);
    dhat::assert_eq!(player.stats().loops_completed, 3);
}
