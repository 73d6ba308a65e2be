use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, info};

use crate::models::camera::{CameraProperties, CameraSelector, ControlInfo};
use crate::models::config::{CaptureLimit, StreamConfig, StreamInfo};
use crate::models::error::CaptureError;
use crate::models::frame::FrameMetadata;
use crate::runtime::event_loop::LoopHandle;
use crate::traits::camera_hub::CameraHub;
use crate::traits::camera_provider::CameraProvider;
use crate::traits::capture_delegate::CaptureDelegate;

/// Per-capture bookkeeping shared with the marshaled completion handler.
///
/// Runs entirely on the dispatch thread once frames start flowing; the
/// atomics exist because the tracker is created on the orchestration
/// thread and queried from it afterwards.
struct CompletionTracker {
    limit: CaptureLimit,
    print_metadata: bool,
    completed: AtomicU64,
    finished: AtomicBool,
    delegate: Arc<dyn CaptureDelegate>,
}

impl CompletionTracker {
    fn on_frame(&self, frame: FrameMetadata) {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;

        let mut line = format!(
            "{} stream{} seq {:06} bytes {}",
            frame.timestamp.format("%H:%M:%S%.6f"),
            frame.stream,
            frame.sequence,
            frame.bytes_used
        );
        if self.print_metadata {
            line.push_str(&format!(
                " exposure {}us gain {:.2}",
                frame.exposure_us, frame.gain
            ));
        }
        println!("{line}");

        self.delegate.on_frame_completed(&frame);

        if let CaptureLimit::Bounded(requested) = self.limit {
            // Completions already queued when the limit is reached must not
            // re-fire the finished notification.
            if completed >= requested && !self.finished.swap(true, Ordering::AcqRel) {
                debug!("capture reached {requested} frame(s)");
                self.delegate.on_capture_finished();
            }
        }
    }
}

/// The single active capture session, bound to one selected camera.
///
/// Construction resolves the camera selection and applies the stream
/// configuration; a session that constructs successfully is valid by
/// definition. [`stop`] must only be called after a successful [`start`] —
/// the application controller tracks that invariant.
///
/// [`start`]: CaptureSession::start
/// [`stop`]: CaptureSession::stop
pub struct CaptureSession {
    camera: Arc<dyn CameraProvider>,
    streams: Vec<StreamInfo>,
    tracker: Option<Arc<CompletionTracker>>,
    started: bool,
}

impl CaptureSession {
    /// Bind a camera and resolve the requested stream configuration.
    pub fn new(
        hub: &dyn CameraHub,
        selector: &CameraSelector,
        requested: &[StreamConfig],
        strict: bool,
    ) -> Result<Self, CaptureError> {
        let camera = select_camera(hub, selector)?;

        // An empty request still configures one default stream.
        let requested: Vec<StreamConfig> = if requested.is_empty() {
            vec![StreamConfig::default()]
        } else {
            requested.to_vec()
        };
        let streams = camera.configure(&requested, strict)?;
        for stream in &streams {
            debug!(
                "stream {}: {}x{} {}",
                stream.index, stream.width, stream.height, stream.pixel_format
            );
        }

        Ok(Self {
            camera,
            streams,
            tracker: None,
            started: false,
        })
    }

    pub fn camera_id(&self) -> String {
        self.camera.id()
    }

    pub fn properties(&self) -> CameraProperties {
        self.camera.properties()
    }

    pub fn controls(&self) -> Vec<ControlInfo> {
        self.camera.controls()
    }

    pub fn stream_info(&self) -> &[StreamInfo] {
        &self.streams
    }

    /// Frames completed so far (0 before `start`).
    pub fn frames_completed(&self) -> u64 {
        self.tracker
            .as_ref()
            .map_or(0, |tracker| tracker.completed.load(Ordering::Acquire))
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Arm the camera; completions are marshaled onto the dispatch thread.
    ///
    /// On error nothing was armed and the caller must not count this
    /// session as a reason to keep the loop alive.
    pub fn start(
        &mut self,
        limit: CaptureLimit,
        loop_handle: &LoopHandle,
        delegate: Arc<dyn CaptureDelegate>,
        print_metadata: bool,
    ) -> Result<(), CaptureError> {
        let tracker = Arc::new(CompletionTracker {
            limit,
            print_metadata,
            completed: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            delegate,
        });

        let handle = loop_handle.clone();
        let marshal = Arc::clone(&tracker);
        self.camera.start(Arc::new(move |frame: FrameMetadata| {
            // Hop from the provider thread onto the dispatch thread.
            let tracker = Arc::clone(&marshal);
            handle.post(move || tracker.on_frame(frame));
        }))?;

        info!("camera {}: capturing {limit}", self.camera.id());
        self.tracker = Some(tracker);
        self.started = true;
        Ok(())
    }

    /// Disarm the camera and release capture resources.
    pub fn stop(&mut self) {
        self.camera.stop();
        self.started = false;
    }
}

fn select_camera(
    hub: &dyn CameraHub,
    selector: &CameraSelector,
) -> Result<Arc<dyn CameraProvider>, CaptureError> {
    let cameras = hub.cameras();
    let camera = match selector {
        // Indices are 1-based on the command line.
        CameraSelector::Index(index) => index
            .checked_sub(1)
            .and_then(|index| cameras.get(index).cloned()),
        CameraSelector::Id(id) => cameras.into_iter().find(|camera| camera.id() == *id),
    };
    camera.ok_or_else(|| CaptureError::DeviceNotFound(selector.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use crate::hub::simulated::{SimulatedCamera, SimulatedHub};
    use crate::runtime::event_loop::EventLoop;

    /// Records how many frames had completed at the moment the finished
    /// notification fired.
    struct RecordingDelegate {
        frames: AtomicU64,
        finished: AtomicU64,
        frames_at_finish: AtomicU64,
    }

    impl RecordingDelegate {
        fn new() -> Self {
            Self {
                frames: AtomicU64::new(0),
                finished: AtomicU64::new(0),
                frames_at_finish: AtomicU64::new(0),
            }
        }
    }

    impl CaptureDelegate for RecordingDelegate {
        fn on_frame_completed(&self, _frame: &FrameMetadata) {
            self.frames.fetch_add(1, Ordering::AcqRel);
        }

        fn on_capture_finished(&self) {
            self.finished.fetch_add(1, Ordering::AcqRel);
            self.frames_at_finish
                .store(self.frames.load(Ordering::Acquire), Ordering::Release);
        }
    }

    fn fast_hub() -> SimulatedHub {
        let camera = SimulatedCamera::new("cam0", CameraProperties::default())
            .with_frame_interval(Duration::from_millis(1));
        let hub = SimulatedHub::with_cameras(vec![Arc::new(camera)]);
        hub.start().unwrap();
        hub
    }

    /// Runs the session until the watchdog expires, with frames flowing
    /// the whole time, then returns the delegate for inspection.
    fn run_session(limit: CaptureLimit, watchdog: Duration) -> (Arc<RecordingDelegate>, u64) {
        let hub = fast_hub();
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();
        let delegate = Arc::new(RecordingDelegate::new());

        let mut session = CaptureSession::new(
            &hub,
            &CameraSelector::Index(1),
            &[],
            false,
        )
        .unwrap();
        session
            .start(limit, &handle, Arc::clone(&delegate) as Arc<dyn CaptureDelegate>, false)
            .unwrap();

        let waker = handle.clone();
        let timer = thread::spawn(move || {
            thread::sleep(watchdog);
            waker.exit(0);
        });
        assert_eq!(event_loop.exec(), 0);
        timer.join().unwrap();

        session.stop();
        let completed = session.frames_completed();
        hub.stop();
        (delegate, completed)
    }

    #[test]
    fn bounded_capture_finishes_exactly_once_at_the_limit() {
        let (delegate, completed) = run_session(CaptureLimit::Bounded(3), Duration::from_millis(100));

        assert!(completed >= 3, "expected at least 3 frames, got {completed}");
        assert_eq!(delegate.finished.load(Ordering::Acquire), 1);
        assert_eq!(delegate.frames_at_finish.load(Ordering::Acquire), 3);
    }

    #[test]
    fn unbounded_capture_never_finishes_on_its_own() {
        let (delegate, completed) = run_session(CaptureLimit::Unbounded, Duration::from_millis(60));

        assert!(completed > 0, "expected frames to flow");
        assert_eq!(delegate.finished.load(Ordering::Acquire), 0);
    }

    #[test]
    fn unknown_camera_id_fails_construction() {
        let hub = fast_hub();
        let result = CaptureSession::new(
            &hub,
            &CameraSelector::Id("nope".into()),
            &[],
            false,
        );
        assert!(matches!(result, Err(CaptureError::DeviceNotFound(_))));
    }

    #[test]
    fn out_of_range_index_fails_construction() {
        let hub = fast_hub();
        let result = CaptureSession::new(&hub, &CameraSelector::Index(9), &[], false);
        assert!(matches!(result, Err(CaptureError::DeviceNotFound(_))));
    }

    #[test]
    fn selection_by_id_binds_the_right_camera() {
        let hub = fast_hub();
        let session =
            CaptureSession::new(&hub, &CameraSelector::Id("cam0".into()), &[], false).unwrap();
        assert_eq!(session.camera_id(), "cam0");
        assert!(!session.is_started());
    }

    #[test]
    fn strict_configuration_error_propagates_from_construction() {
        let hub = fast_hub();
        let request = StreamConfig {
            width: 641,
            ..StreamConfig::default()
        };
        let result = CaptureSession::new(&hub, &CameraSelector::Index(1), &[request], true);
        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
    }
}
