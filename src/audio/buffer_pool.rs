// BufferPool - lock-free buffer pool with dual SPSC queues
//
// Object pool built on two lock-free SPSC (Single Producer Single Consumer)
// ring buffers, so the capture callback never allocates. Buffers hold
// interleaved f32 samples exactly as delivered by the input device.
//
// Buffer flow:
// 1. Capture thread pops an empty buffer from the pool queue
// 2. Capture thread fills it with interleaved samples
// 3. Capture thread pushes it onto the data queue
// 4. Analysis thread pops it, feeds the frame source
// 5. Analysis thread returns it to the pool queue

use rtrb::{Consumer, Producer};

/// Interleaved capture buffer - pre-allocated vector of f32 samples
pub type CaptureBuffer = Vec<f32>;

/// Queue endpoints owned by the capture thread
pub struct CaptureThreadChannels {
    /// Producer for sending filled buffers to the analysis thread
    pub data_producer: Producer<CaptureBuffer>,
    /// Consumer for retrieving recycled empty buffers
    pub pool_consumer: Consumer<CaptureBuffer>,
}

/// Queue endpoints owned by the analysis thread
pub struct AnalysisThreadChannels {
    /// Consumer for receiving filled capture buffers
    pub data_consumer: Consumer<CaptureBuffer>,
    /// Producer for returning empty buffers to the pool
    pub pool_producer: Producer<CaptureBuffer>,
}

pub struct BufferPool;

impl BufferPool {
    /// Pre-allocate `buffer_count` buffers of `buffer_size` interleaved
    /// samples and return the two thread-side channel bundles.
    ///
    /// All heap allocation happens here; both queue sides are wait-free
    /// afterwards.
    ///
    /// # Panics
    /// Panics if `buffer_count` or `buffer_size` is 0.
    pub fn new(
        buffer_count: usize,
        buffer_size: usize,
    ) -> (CaptureThreadChannels, AnalysisThreadChannels) {
        assert!(buffer_count > 0, "buffer_count must be greater than 0");
        assert!(buffer_size > 0, "buffer_size must be greater than 0");

        let (mut pool_producer, pool_consumer) = rtrb::RingBuffer::new(buffer_count);
        let (data_producer, data_consumer) = rtrb::RingBuffer::new(buffer_count);

        for _ in 0..buffer_count {
            let buffer = vec![0.0_f32; buffer_size];
            pool_producer
                .push(buffer)
                .expect("Failed to push buffer to pool queue during initialization");
        }

        (
            CaptureThreadChannels {
                data_producer,
                pool_consumer,
            },
            AnalysisThreadChannels {
                data_consumer,
                pool_producer,
            },
        )
    }
}
