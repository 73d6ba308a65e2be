use std::sync::Arc;

use log::{debug, info};

use crate::hotplug::HotplugMonitor;
use crate::models::camera::{display_name, CameraSelector};
use crate::models::config::{CaptureLimit, StreamConfig};
use crate::models::error::CaptureError;
use crate::runtime::event_loop::{EventLoop, LoopHandle};
use crate::runtime::loop_users::LoopUsers;
use crate::session::capture::CaptureSession;
use crate::traits::camera_hub::CameraHub;
use crate::traits::capture_delegate::CaptureDelegate;

/// What a single invocation should do, lowered from the CLI options.
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub list: bool,
    pub camera: Option<CameraSelector>,
    pub streams: Vec<StreamConfig>,
    pub strict_formats: bool,
    pub capture: Option<CaptureLimit>,
    pub print_metadata: bool,
    pub list_controls: bool,
    pub list_properties: bool,
    pub info: bool,
    pub monitor: bool,
}

/// Releases the capture's liveness claim when a bounded run completes.
struct CaptureFinished {
    users: Arc<LoopUsers>,
    loop_handle: LoopHandle,
}

impl CaptureDelegate for CaptureFinished {
    fn on_capture_finished(&self) {
        self.users.release(&self.loop_handle);
    }
}

/// Process-wide controller: owns the hub handle, the run loop, and the
/// liveness count, and coordinates setup, dispatch, and teardown.
///
/// The loop is entered only if at least one asynchronous activity was
/// started, and teardown is symmetric regardless of which event source
/// ended the loop.
pub struct App {
    hub: Arc<dyn CameraHub>,
    plan: RunPlan,
    users: Arc<LoopUsers>,
    event_loop: EventLoop,
}

impl App {
    pub fn new(hub: Arc<dyn CameraHub>, plan: RunPlan) -> Self {
        Self {
            hub,
            plan,
            users: Arc::new(LoopUsers::new()),
            event_loop: EventLoop::new(),
        }
    }

    /// Handle for requesting termination from outside the dispatch thread.
    ///
    /// The interrupt closure holds a clone of this; it is the only way the
    /// loop can be ended from an asynchronous context.
    pub fn loop_handle(&self) -> LoopHandle {
        self.event_loop.handle()
    }

    /// Execute the plan and return the process exit status.
    ///
    /// The hub is stopped on every path once it has been started, after
    /// the run loop has fully exited and the session is stopped.
    pub fn run(&mut self) -> Result<i32, CaptureError> {
        self.hub.start()?;
        let result = self.run_plan();
        self.hub.stop();
        result
    }

    fn run_plan(&mut self) -> Result<i32, CaptureError> {
        if self.plan.list {
            self.list_cameras();
        }

        let mut session = match &self.plan.camera {
            Some(selector) => {
                let session = CaptureSession::new(
                    self.hub.as_ref(),
                    selector,
                    &self.plan.streams,
                    self.plan.strict_formats,
                )?;
                println!("Using camera {}", session.camera_id());
                Some(session)
            }
            None => None,
        };

        if self.plan.list_controls || self.plan.list_properties || self.plan.info {
            let session = session.as_ref().ok_or_else(|| {
                CaptureError::InvalidArgument(
                    "camera information requires a selected camera".into(),
                )
            })?;
            if self.plan.list_controls {
                print_controls(session);
            }
            if self.plan.list_properties {
                print_properties(session);
            }
            if self.plan.info {
                print_stream_info(session);
            }
        }

        let mut capture_started = false;
        if let Some(limit) = self.plan.capture {
            let session = session.as_mut().ok_or_else(|| {
                CaptureError::InvalidArgument("cannot capture without a selected camera".into())
            })?;
            let delegate = Arc::new(CaptureFinished {
                users: Arc::clone(&self.users),
                loop_handle: self.loop_handle(),
            });
            session.start(limit, &self.loop_handle(), delegate, self.plan.print_metadata)?;
            self.users.add();
            capture_started = true;
        }

        let _monitor = if self.plan.monitor {
            println!("Monitoring camera hotplug events");
            println!("Press Ctrl-C to interrupt");
            let monitor = HotplugMonitor::start(self.hub.as_ref(), &self.loop_handle());
            self.users.add();
            Some(monitor)
        } else {
            None
        };

        let mut code = 0;
        if self.users.count() > 0 {
            debug!("entering run loop with {} active user(s)", self.users.count());
            code = self.event_loop.exec();
        }

        if capture_started {
            if let Some(session) = session.as_mut() {
                session.stop();
                info!("capture stopped after {} frame(s)", session.frames_completed());
            }
        }

        Ok(code)
    }

    fn list_cameras(&self) {
        println!("Available cameras:");
        for (index, camera) in self.hub.cameras().iter().enumerate() {
            println!(
                "{}: {}",
                index + 1,
                display_name(&camera.id(), &camera.properties())
            );
        }
    }
}

fn print_controls(session: &CaptureSession) {
    println!("Controls for camera {}:", session.camera_id());
    for control in session.controls() {
        println!(
            "  {}: min {} max {} default {}",
            control.name, control.min, control.max, control.default
        );
    }
}

fn print_properties(session: &CaptureSession) {
    let props = session.properties();
    println!("Properties for camera {}:", session.camera_id());
    if let Some(location) = props.location {
        println!("  Location: {location}");
    }
    if let Some(model) = &props.model {
        println!("  Model: {model}");
    }
}

fn print_stream_info(session: &CaptureSession) {
    for stream in session.stream_info() {
        println!(
            "stream {}: {}x{} {} stride {} frame size {}",
            stream.index,
            stream.width,
            stream.height,
            stream.pixel_format,
            stream.stride,
            stream.frame_size
        );
    }
}
