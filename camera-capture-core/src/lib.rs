//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides the run loop, liveness tracking, capture session orchestration,
//! and hotplug monitoring. Hardware backends implement the [`CameraHub`] and
//! [`CameraProvider`] traits; a synthetic [`SimulatedHub`] backend ships with
//! the crate for development and tests.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/    ← CameraHub, CameraProvider, CaptureDelegate
//! ├── models/    ← CaptureError, StreamConfig, FrameMetadata, naming
//! ├── runtime/   ← EventLoop, LoopHandle, LoopUsers
//! ├── session/   ← CaptureSession (completion counting, marshaling)
//! ├── hub/       ← SimulatedHub, SimulatedCamera
//! ├── hotplug    ← HotplugMonitor
//! └── app        ← App, RunPlan (setup → dispatch → teardown)
//! ```
//!
//! All orchestration state is touched from a single dispatch thread: frame
//! and hotplug notifications originating on backend threads are marshaled
//! through [`LoopHandle::post`], and the interrupt path only ever calls
//! [`LoopHandle::exit`].

pub mod app;
pub mod hotplug;
pub mod hub;
pub mod models;
pub mod runtime;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use app::{App, RunPlan};
pub use hotplug::HotplugMonitor;
pub use hub::simulated::{SimulatedCamera, SimulatedHub};
pub use models::camera::{
    display_name, CameraLocation, CameraProperties, CameraSelector, ControlInfo,
};
pub use models::config::{CaptureLimit, StreamConfig, StreamInfo};
pub use models::error::CaptureError;
pub use models::frame::FrameMetadata;
pub use runtime::event_loop::{EventLoop, LoopHandle};
pub use runtime::loop_users::LoopUsers;
pub use session::capture::CaptureSession;
pub use traits::camera_hub::{CameraHub, HotplugCallback};
pub use traits::camera_provider::{CameraProvider, FrameCallback};
pub use traits::capture_delegate::CaptureDelegate;
