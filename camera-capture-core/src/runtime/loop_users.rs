use std::sync::atomic::{AtomicUsize, Ordering};

use super::event_loop::LoopHandle;

/// Count of independently-terminating asynchronous activities that must
/// keep the run loop alive.
///
/// Each activity calls [`add`] when it begins and [`release`] exactly once
/// when its natural end condition is reached; the release that brings the
/// count to zero requests loop exit with status 0. An external interrupt
/// bypasses the count entirely and may end the loop at any value.
///
/// [`add`]: LoopUsers::add
/// [`release`]: LoopUsers::release
pub struct LoopUsers {
    active: AtomicUsize,
}

impl LoopUsers {
    pub fn new() -> Self {
        Self {
            active: AtomicUsize::new(0),
        }
    }

    /// Register one more reason for the loop to keep running.
    pub fn add(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Current number of active reasons.
    pub fn count(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Drop one reason; the transition to zero requests loop exit.
    pub fn release(&self, loop_handle: &LoopHandle) {
        let previous = self.active.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "release without a matching add");
        if previous == 1 {
            loop_handle.exit(0);
        }
    }
}

impl Default for LoopUsers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::event_loop::EventLoop;

    #[test]
    fn release_to_zero_requests_exit() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();
        let users = LoopUsers::new();

        users.add();
        users.release(&handle);

        assert_eq!(users.count(), 0);
        // The exit requested by the release makes exec return at once.
        assert_eq!(event_loop.exec(), 0);
    }

    #[test]
    fn nonzero_release_does_not_request_exit() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();
        let users = LoopUsers::new();

        users.add();
        users.add();
        users.release(&handle);
        assert_eq!(users.count(), 1);

        // Were exit already requested, this callback would be discarded
        // and exec would return 0 instead of 5.
        let exit = handle.clone();
        handle.post(move || exit.exit(5));
        assert_eq!(event_loop.exec(), 5);
    }

    #[test]
    fn add_never_requests_exit() {
        let event_loop = EventLoop::new();
        let handle = event_loop.handle();
        let users = LoopUsers::new();

        users.add();
        users.add();
        assert_eq!(users.count(), 2);

        let exit = handle.clone();
        handle.post(move || exit.exit(3));
        assert_eq!(event_loop.exec(), 3);
    }
}
