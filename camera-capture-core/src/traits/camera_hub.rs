use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::traits::camera_provider::CameraProvider;

/// Callback invoked with a camera id when a device arrives or goes away.
///
/// May fire on a hub-internal thread.
pub type HotplugCallback = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// The device-management layer: owns discovery and the set of cameras.
///
/// Must be started before cameras are queried, and stopped exactly once,
/// after the run loop has exited and no session remains active.
pub trait CameraHub: Send + Sync {
    /// Bring up device discovery. Called once, before any other method.
    fn start(&self) -> Result<(), CaptureError>;

    /// Shut discovery down. Called once, after all sessions are stopped.
    fn stop(&self);

    /// Snapshot of the cameras currently known to the hub.
    fn cameras(&self) -> Vec<Arc<dyn CameraProvider>>;

    /// Register an observer for device arrival.
    fn on_camera_added(&self, callback: HotplugCallback);

    /// Register an observer for device removal.
    fn on_camera_removed(&self, callback: HotplugCallback);
}
