//! Sample queue tests
//!
//! Ordering and capacity guarantees of the SPSC block queue, including a
//! real producer thread racing a consumer thread.

use proptest::prelude::*;
use simple_eq_audio::{sample_queue, SingleChannelSampleFifo};
use std::thread;

#[test]
fn test_threaded_blocks_arrive_in_order() {
    const BLOCKS: usize = 5_000;
    let (mut producer, mut consumer) = sample_queue(8, 16);

    let writer = thread::spawn(move || {
        let mut pushed = Vec::with_capacity(BLOCKS);
        for i in 0..BLOCKS {
            let value = i as f32;
            if producer.push(&[value; 8]) {
                pushed.push(value);
            }
            if i % 64 == 0 {
                thread::yield_now();
            }
        }
        (pushed, producer.dropped())
    });

    let mut received = Vec::new();
    let mut drain = |consumer: &mut simple_eq_audio::BlockConsumer| {
        while let Some(block) = consumer.pop() {
            assert_eq!(block.len(), 8);
            assert!(block.iter().all(|&s| s == block[0]), "torn block");
            received.push(block[0]);
        }
    };

    while !writer.is_finished() {
        drain(&mut consumer);
        thread::yield_now();
    }

    let (pushed, dropped) = writer.join().unwrap();
    drain(&mut consumer);

    assert_eq!(received, pushed);
    assert_eq!(pushed.len() as u64 + dropped, BLOCKS as u64);
}

#[test]
fn test_accumulator_in_audio_thread() {
    let (producer, mut consumer) = sample_queue(100, 64);
    let mut fifo = SingleChannelSampleFifo::new(producer);

    let writer = thread::spawn(move || {
        // Odd host block sizes still produce whole 100-sample blocks
        let mut next = 0.0_f32;
        for _ in 0..50 {
            let block: Vec<f32> = (0..73)
                .map(|_| {
                    next += 1.0;
                    next
                })
                .collect();
            fifo.update(&block);
        }
        fifo.dropped()
    });

    let dropped = writer.join().unwrap();
    assert_eq!(dropped, 0);

    // 50 × 73 = 3650 samples → 36 full blocks
    assert_eq!(consumer.num_available(), 36);

    let mut expected = 1.0_f32;
    while let Some(block) = consumer.pop() {
        assert_eq!(block.len(), 100);
        for &sample in block.iter() {
            assert_eq!(sample, expected);
            expected += 1.0;
        }
    }
}

proptest! {
    /// Property: after N pushes into a queue of depth C with no reads, the
    /// queue holds the first min(N, C) blocks in order and dropped N - C
    #[test]
    fn queue_keeps_first_blocks_and_counts_drops(
        depth in 1usize..32,
        pushes in 0usize..96,
    ) {
        let (mut producer, mut consumer) = sample_queue(2, depth);

        for i in 0..pushes {
            let accepted = producer.push(&[i as f32, -(i as f32)]);
            prop_assert_eq!(accepted, i < depth);
        }

        let kept = pushes.min(depth);
        prop_assert_eq!(consumer.num_available(), kept);
        prop_assert_eq!(consumer.dropped(), pushes.saturating_sub(depth) as u64);

        for i in 0..kept {
            let block = consumer.pop().unwrap();
            prop_assert_eq!(block.samples(), &[i as f32, -(i as f32)][..]);
        }
        prop_assert!(consumer.pop().is_none());
    }
}
