use std::sync::Arc;

use crate::models::camera::{CameraProperties, ControlInfo};
use crate::models::config::{StreamConfig, StreamInfo};
use crate::models::error::CaptureError;
use crate::models::frame::FrameMetadata;

/// Callback invoked once per completed capture request.
///
/// Fires on a provider-internal thread — callers must marshal onto the
/// dispatch thread before touching orchestration state.
pub type FrameCallback = Arc<dyn Fn(FrameMetadata) + Send + Sync + 'static>;

/// Interface to a single camera exposed by the hub.
///
/// Implemented by hardware backends and by [`SimulatedCamera`] for
/// development and tests.
///
/// [`SimulatedCamera`]: crate::hub::simulated::SimulatedCamera
pub trait CameraProvider: Send + Sync {
    /// Stable identifier, unique within the hub.
    fn id(&self) -> String;

    /// Static device properties (location, model).
    fn properties(&self) -> CameraProperties;

    /// Controls the device exposes, with their ranges.
    fn controls(&self) -> Vec<ControlInfo>;

    /// Resolve the requested streams against device capabilities.
    ///
    /// The provider may adjust sizes and formats to fit the device; with
    /// `strict` set, any adjustment is an error instead.
    fn configure(
        &self,
        streams: &[StreamConfig],
        strict: bool,
    ) -> Result<Vec<StreamInfo>, CaptureError>;

    /// Arm the device and begin delivering completed frames via `callback`.
    ///
    /// Requires a successful `configure` first.
    fn start(&self, callback: FrameCallback) -> Result<(), CaptureError>;

    /// Disarm the device and release capture resources.
    fn stop(&self);
}
