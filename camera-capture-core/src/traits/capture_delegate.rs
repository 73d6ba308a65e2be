use crate::models::frame::FrameMetadata;

/// Event delegate for capture session notifications.
///
/// All methods are invoked on the dispatch thread.
pub trait CaptureDelegate: Send + Sync {
    /// Called once per completed frame.
    fn on_frame_completed(&self, _frame: &FrameMetadata) {}

    /// Called exactly once when a bounded capture reaches its requested
    /// frame count. Never called for an unbounded capture.
    fn on_capture_finished(&self);
}
