//! Lock-free sample block queue (audio thread → analyzer)
//!
//! Single producer, single consumer. Built from two `ringbuf` SPSC rings:
//! `filled` carries blocks to the consumer, `free` returns them to the
//! producer. Every block is allocated up front, so pushing on the audio
//! thread is a copy plus two index updates.
//!
//! When no free block is left the push is dropped and counted; queued
//! blocks are never overwritten, so the consumer sees the oldest unread
//! blocks in order.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fixed-capacity sample buffer plus fill count
#[derive(Debug, Clone)]
pub struct SampleBlock {
    samples: Box<[f32]>,
    len: usize,
}

impl SampleBlock {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Valid samples
    pub fn samples(&self) -> &[f32] {
        &self.samples[..self.len]
    }

    /// Number of valid samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when the block holds no samples
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of samples
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    fn fill(&mut self, samples: &[f32]) {
        let len = samples.len().min(self.samples.len());
        self.samples[..len].copy_from_slice(&samples[..len]);
        self.len = len;
    }
}

/// Create a queue of `depth` blocks holding up to `block_capacity` samples
///
/// Both values are raised to at least 1.
pub fn sample_queue(block_capacity: usize, depth: usize) -> (BlockProducer, BlockConsumer) {
    let block_capacity = block_capacity.max(1);
    let depth = depth.max(1);

    let mut free = HeapRb::<SampleBlock>::new(depth);
    for _ in 0..depth {
        // Capacity equals depth, cannot fail
        let _ = free.try_push(SampleBlock::with_capacity(block_capacity));
    }

    let (filled_prod, filled_cons) = HeapRb::<SampleBlock>::new(depth).split();
    let (free_prod, free_cons) = free.split();
    let dropped = Arc::new(AtomicU64::new(0));

    let producer = BlockProducer {
        filled: filled_prod,
        free: free_cons,
        dropped: Arc::clone(&dropped),
        block_capacity,
    };
    let consumer = BlockConsumer {
        filled: filled_cons,
        free: free_prod,
        dropped,
        depth,
    };

    (producer, consumer)
}

/// Audio-thread side of a sample queue
pub struct BlockProducer {
    filled: HeapProd<SampleBlock>,
    free: HeapCons<SampleBlock>,
    dropped: Arc<AtomicU64>,
    block_capacity: usize,
}

impl BlockProducer {
    /// Copy `samples` into the queue as one block
    ///
    /// Samples beyond the block capacity are truncated. Returns `false` and
    /// counts a drop when the queue is full. Never blocks or allocates.
    pub fn push(&mut self, samples: &[f32]) -> bool {
        let Some(mut block) = self.free.try_pop() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };

        block.fill(samples);

        // Every block is either free or filled, so this has room
        match self.filled.try_push(block) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Maximum samples per block
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Blocks dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BlockProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockProducer")
            .field("block_capacity", &self.block_capacity)
            .field("queued", &self.filled.occupied_len())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// Analyzer side of a sample queue
pub struct BlockConsumer {
    filled: HeapCons<SampleBlock>,
    free: HeapProd<SampleBlock>,
    dropped: Arc<AtomicU64>,
    depth: usize,
}

impl BlockConsumer {
    /// Oldest queued block
    ///
    /// The block goes back to the producer when the guard is dropped.
    pub fn pop(&mut self) -> Option<PoppedBlock<'_>> {
        let block = self.filled.try_pop()?;
        Some(PoppedBlock {
            block: Some(block),
            free: &mut self.free,
        })
    }

    /// Number of blocks ready to pop
    pub fn num_available(&self) -> usize {
        self.filled.occupied_len()
    }

    /// Queue depth in blocks
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Blocks the producer dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Discard every queued block
    pub fn clear(&mut self) -> usize {
        let mut discarded = 0;
        while self.pop().is_some() {
            discarded += 1;
        }
        discarded
    }
}

impl std::fmt::Debug for BlockConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockConsumer")
            .field("depth", &self.depth)
            .field("available", &self.num_available())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// A popped block on loan from the queue
pub struct PoppedBlock<'a> {
    block: Option<SampleBlock>,
    free: &'a mut HeapProd<SampleBlock>,
}

impl PoppedBlock<'_> {
    /// Valid samples of the block
    pub fn samples(&self) -> &[f32] {
        match &self.block {
            Some(block) => block.samples(),
            None => &[],
        }
    }
}

impl std::ops::Deref for PoppedBlock<'_> {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        self.samples()
    }
}

impl Drop for PoppedBlock<'_> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            let _ = self.free.try_push(block);
        }
    }
}

/// Producer-side accumulator for one channel
///
/// Gathers incoming samples into blocks of `block_size` and pushes each
/// full block. Lives on the audio thread.
#[derive(Debug)]
pub struct SingleChannelSampleFifo {
    producer: BlockProducer,
    pending: Box<[f32]>,
    filled: usize,
}

impl SingleChannelSampleFifo {
    /// Wrap a producer; blocks are pushed once `producer.block_capacity()`
    /// samples have accumulated
    pub fn new(producer: BlockProducer) -> Self {
        let block_size = producer.block_capacity();
        Self {
            producer,
            pending: vec![0.0; block_size].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Append samples, pushing every completed block
    pub fn update(&mut self, samples: &[f32]) {
        let block_size = self.pending.len();
        let mut remaining = samples;

        while !remaining.is_empty() {
            let take = (block_size - self.filled).min(remaining.len());
            self.pending[self.filled..self.filled + take].copy_from_slice(&remaining[..take]);
            self.filled += take;
            remaining = &remaining[take..];

            if self.filled == block_size {
                self.producer.push(&self.pending);
                self.filled = 0;
            }
        }
    }

    /// Block size in samples
    pub fn block_size(&self) -> usize {
        self.pending.len()
    }

    /// Blocks dropped because the consumer fell behind
    pub fn dropped(&self) -> u64 {
        self.producer.dropped()
    }
}
