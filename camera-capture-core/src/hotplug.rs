use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::runtime::event_loop::LoopHandle;
use crate::traits::camera_hub::CameraHub;

/// Reports camera arrival and removal without affecting loop liveness.
///
/// Events are marshaled onto the dispatch thread and printed; monitoring
/// has no natural end and only stops when the process is interrupted and
/// the hub is shut down.
pub struct HotplugMonitor {
    added: Arc<AtomicU64>,
    removed: Arc<AtomicU64>,
}

impl HotplugMonitor {
    /// Register arrival and removal observers on the hub.
    pub fn start(hub: &dyn CameraHub, loop_handle: &LoopHandle) -> Self {
        let added = Arc::new(AtomicU64::new(0));
        let removed = Arc::new(AtomicU64::new(0));

        let handle = loop_handle.clone();
        let counter = Arc::clone(&added);
        hub.on_camera_added(Arc::new(move |id: &str| {
            let id = id.to_string();
            let counter = Arc::clone(&counter);
            handle.post(move || {
                counter.fetch_add(1, Ordering::AcqRel);
                println!("{} camera added: {id}", Utc::now().format("%H:%M:%S%.3f"));
            });
        }));

        let handle = loop_handle.clone();
        let counter = Arc::clone(&removed);
        hub.on_camera_removed(Arc::new(move |id: &str| {
            let id = id.to_string();
            let counter = Arc::clone(&counter);
            handle.post(move || {
                counter.fetch_add(1, Ordering::AcqRel);
                println!("{} camera removed: {id}", Utc::now().format("%H:%M:%S%.3f"));
            });
        }));

        Self { added, removed }
    }

    /// Arrival events observed so far.
    pub fn cameras_added(&self) -> u64 {
        self.added.load(Ordering::Acquire)
    }

    /// Removal events observed so far.
    pub fn cameras_removed(&self) -> u64 {
        self.removed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::hub::simulated::{SimulatedCamera, SimulatedHub};
    use crate::models::camera::CameraProperties;
    use crate::runtime::event_loop::EventLoop;

    fn camera(id: &str) -> Arc<SimulatedCamera> {
        Arc::new(
            SimulatedCamera::new(id, CameraProperties::default())
                .with_frame_interval(Duration::from_millis(1)),
        )
    }

    #[test]
    fn events_are_counted_on_the_dispatch_thread() {
        let hub = SimulatedHub::new();
        hub.start().unwrap();
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        let monitor = HotplugMonitor::start(&hub, &handle);

        hub.plug(camera("hot0"));
        hub.plug(camera("hot1"));
        hub.unplug("hot0");

        // Queued after the three events, so they run first.
        let exit = handle.clone();
        handle.post(move || exit.exit(0));
        assert_eq!(event_loop.exec(), 0);

        assert_eq!(monitor.cameras_added(), 2);
        assert_eq!(monitor.cameras_removed(), 1);
    }

    #[test]
    fn events_before_exec_are_delivered_once_the_loop_runs() {
        let hub = SimulatedHub::new();
        hub.start().unwrap();
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();

        let monitor = HotplugMonitor::start(&hub, &handle);
        hub.plug(camera("early"));
        assert_eq!(monitor.cameras_added(), 0);

        let exit = handle.clone();
        handle.post(move || exit.exit(0));
        event_loop.exec();

        assert_eq!(monitor.cameras_added(), 1);
    }
}
