use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;

use crate::models::camera::{CameraLocation, CameraProperties, ControlInfo};
use crate::models::config::{StreamConfig, StreamInfo};
use crate::models::error::CaptureError;
use crate::models::frame::FrameMetadata;
use crate::traits::camera_hub::{CameraHub, HotplugCallback};
use crate::traits::camera_provider::{CameraProvider, FrameCallback};

/// Largest frame geometry the synthetic sensor reports.
const SENSOR_WIDTH: u32 = 1920;
const SENSOR_HEIGHT: u32 = 1080;

struct CameraState {
    applied: Option<Vec<StreamInfo>>,
    worker: Option<thread::JoinHandle<()>>,
    streaming: Arc<AtomicBool>,
}

/// Synthetic camera that generates frame completions on a worker thread.
///
/// Stands in for a hardware backend during development and in tests.
/// Frame delivery happens on the worker thread, so consumers exercise the
/// same marshaling path a real backend would require.
pub struct SimulatedCamera {
    id: String,
    properties: CameraProperties,
    formats: Vec<String>,
    frame_interval: Duration,
    state: Mutex<CameraState>,
}

impl SimulatedCamera {
    pub fn new(id: &str, properties: CameraProperties) -> Self {
        Self {
            id: id.to_string(),
            properties,
            formats: vec!["YUYV".into(), "MJPG".into(), "NV12".into()],
            frame_interval: Duration::from_millis(33),
            state: Mutex::new(CameraState {
                applied: None,
                worker: None,
                streaming: Arc::new(AtomicBool::new(false)),
            }),
        }
    }

    /// Override the synthetic frame rate (tests use short intervals).
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }
}

impl CameraProvider for SimulatedCamera {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn properties(&self) -> CameraProperties {
        self.properties.clone()
    }

    fn controls(&self) -> Vec<ControlInfo> {
        vec![
            ControlInfo {
                name: "Brightness".into(),
                min: -64,
                max: 64,
                default: 0,
            },
            ControlInfo {
                name: "Contrast".into(),
                min: 0,
                max: 95,
                default: 32,
            },
            ControlInfo {
                name: "ExposureTime".into(),
                min: 100,
                max: 100_000,
                default: 16_666,
            },
        ]
    }

    fn configure(
        &self,
        streams: &[StreamConfig],
        strict: bool,
    ) -> Result<Vec<StreamInfo>, CaptureError> {
        if streams.is_empty() {
            return Err(CaptureError::ConfigurationFailed(
                "no streams requested".into(),
            ));
        }

        let mut applied = Vec::with_capacity(streams.len());
        for (index, request) in streams.iter().enumerate() {
            request.validate()?;

            // Clamp to the sensor and round down to even dimensions.
            let width = request.width.min(SENSOR_WIDTH) & !1;
            let height = request.height.min(SENSOR_HEIGHT) & !1;
            let pixel_format = if self.formats.iter().any(|f| f == &request.pixel_format) {
                request.pixel_format.clone()
            } else {
                self.formats[0].clone()
            };

            let adjusted = width != request.width
                || height != request.height
                || pixel_format != request.pixel_format;
            if adjusted {
                if strict {
                    return Err(CaptureError::ConfigurationFailed(format!(
                        "stream {index}: {}x{} {} not supported as requested",
                        request.width, request.height, request.pixel_format
                    )));
                }
                warn!(
                    "camera {}: stream {index} adjusted to {width}x{height} {pixel_format}",
                    self.id
                );
            }

            let stride = width * 2;
            applied.push(StreamInfo {
                index,
                width,
                height,
                pixel_format,
                stride,
                frame_size: stride * height,
            });
        }

        self.state.lock().applied = Some(applied.clone());
        Ok(applied)
    }

    fn start(&self, callback: FrameCallback) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        let Some(streams) = state.applied.clone() else {
            return Err(CaptureError::StreamingFailed(
                "camera is not configured".into(),
            ));
        };
        if state.worker.is_some() {
            return Err(CaptureError::StreamingFailed(
                "camera is already streaming".into(),
            ));
        }

        let streaming = Arc::new(AtomicBool::new(true));
        state.streaming = Arc::clone(&streaming);

        let interval = self.frame_interval;
        let id = self.id.clone();
        let worker = thread::Builder::new()
            .name(format!("sim-camera-{id}"))
            .spawn(move || {
                let mut sequence = 0u64;
                while streaming.load(Ordering::Acquire) {
                    thread::sleep(interval);
                    if !streaming.load(Ordering::Acquire) {
                        break;
                    }
                    for stream in &streams {
                        callback(FrameMetadata {
                            stream: stream.index,
                            sequence,
                            timestamp: Utc::now(),
                            bytes_used: stream.frame_size,
                            exposure_us: 16_666,
                            gain: 1.0 + (sequence % 8) as f32 / 16.0,
                        });
                    }
                    sequence += 1;
                }
                debug!("camera {id}: frame generator stopped");
            })
            .map_err(|e| CaptureError::StreamingFailed(format!("worker thread: {e}")))?;

        state.worker = Some(worker);
        Ok(())
    }

    fn stop(&self) {
        let worker = {
            let mut state = self.state.lock();
            state.streaming.store(false, Ordering::Release);
            state.worker.take()
        };
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

struct HubState {
    started: bool,
    cameras: Vec<Arc<SimulatedCamera>>,
    on_added: Vec<HotplugCallback>,
    on_removed: Vec<HotplugCallback>,
}

/// Synthetic device-management layer backing the CLI and the test suite.
///
/// Cameras can be attached and detached at runtime via [`plug`] and
/// [`unplug`], which fire the registered hotplug observers on the calling
/// thread — the same contract a hardware hub's discovery thread would have.
///
/// [`plug`]: SimulatedHub::plug
/// [`unplug`]: SimulatedHub::unplug
pub struct SimulatedHub {
    state: Mutex<HubState>,
}

impl SimulatedHub {
    pub fn new() -> Self {
        Self::with_cameras(Vec::new())
    }

    pub fn with_cameras(cameras: Vec<Arc<SimulatedCamera>>) -> Self {
        Self {
            state: Mutex::new(HubState {
                started: false,
                cameras,
                on_added: Vec::new(),
                on_removed: Vec::new(),
            }),
        }
    }

    /// The stock development hub: one internal and one external camera.
    pub fn with_default_cameras() -> Self {
        Self::with_cameras(vec![
            Arc::new(SimulatedCamera::new(
                "cam0",
                CameraProperties {
                    location: Some(CameraLocation::Front),
                    model: Some("Integrated Camera".into()),
                },
            )),
            Arc::new(SimulatedCamera::new(
                "usb-cam1",
                CameraProperties {
                    location: Some(CameraLocation::External),
                    model: Some("USB 2.0 Camera".into()),
                },
            )),
        ])
    }

    /// Attach a camera at runtime, firing the arrival observers.
    pub fn plug(&self, camera: Arc<SimulatedCamera>) {
        let (id, callbacks) = {
            let mut state = self.state.lock();
            let id = camera.id();
            state.cameras.push(camera);
            (id, state.on_added.clone())
        };
        for callback in callbacks {
            callback(&id);
        }
    }

    /// Detach the camera with `id`, firing the removal observers.
    ///
    /// Detaching an unknown id is a no-op.
    pub fn unplug(&self, id: &str) {
        let callbacks = {
            let mut state = self.state.lock();
            let before = state.cameras.len();
            state.cameras.retain(|camera| camera.id() != id);
            if state.cameras.len() == before {
                return;
            }
            state.on_removed.clone()
        };
        for callback in callbacks {
            callback(id);
        }
    }
}

impl Default for SimulatedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraHub for SimulatedHub {
    fn start(&self) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        if state.started {
            return Err(CaptureError::HubStartFailed("hub is already started".into()));
        }
        state.started = true;
        debug!("hub started with {} camera(s)", state.cameras.len());
        Ok(())
    }

    fn stop(&self) {
        let mut state = self.state.lock();
        state.started = false;
        state.on_added.clear();
        state.on_removed.clear();
    }

    fn cameras(&self) -> Vec<Arc<dyn CameraProvider>> {
        let state = self.state.lock();
        if !state.started {
            warn!("camera query before hub start");
            return Vec::new();
        }
        state
            .cameras
            .iter()
            .map(|camera| Arc::clone(camera) as Arc<dyn CameraProvider>)
            .collect()
    }

    fn on_camera_added(&self, callback: HotplugCallback) {
        self.state.lock().on_added.push(callback);
    }

    fn on_camera_removed(&self, callback: HotplugCallback) {
        self.state.lock().on_removed.push(callback);
    }
}
