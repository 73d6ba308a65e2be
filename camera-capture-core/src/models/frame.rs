use chrono::{DateTime, Utc};

/// Metadata describing one completed capture request.
///
/// Produced by the provider on its delivery thread and handed across the
/// marshaling hop by value; image data itself is out of scope here.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMetadata {
    /// Index of the stream the frame belongs to.
    pub stream: usize,
    /// Monotonically increasing per-stream sequence number.
    pub sequence: u64,
    /// Completion time.
    pub timestamp: DateTime<Utc>,
    /// Bytes occupied by image data in the buffer.
    pub bytes_used: u32,
    /// Sensor exposure for this frame, in microseconds.
    pub exposure_us: u32,
    /// Analogue sensor gain for this frame.
    pub gain: f32,
}
