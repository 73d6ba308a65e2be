use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

type Callback = Box<dyn FnOnce() + Send + 'static>;

struct LoopInner {
    queue: Mutex<VecDeque<Callback>>,
    wakeup: Condvar,
    exit_requested: AtomicBool,
    exit_code: AtomicI32,
}

/// Single-threaded event dispatcher.
///
/// [`exec`] blocks the calling thread and runs marshaled callbacks in
/// arrival order, on that thread, until an exit is requested through a
/// [`LoopHandle`]. The application controller owns exactly one of these;
/// everything that needs to reach the loop from another thread holds a
/// cloned handle instead of a process global.
///
/// [`exec`]: EventLoop::exec
pub struct EventLoop {
    inner: Arc<LoopInner>,
}

/// Cheap, cloneable handle for marshaling work onto the dispatch thread
/// and for requesting loop exit from any thread.
#[derive(Clone)]
pub struct LoopHandle {
    inner: Arc<LoopInner>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(LoopInner {
                queue: Mutex::new(VecDeque::new()),
                wakeup: Condvar::new(),
                exit_requested: AtomicBool::new(false),
                exit_code: AtomicI32::new(0),
            }),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Dispatch callbacks until exit is requested, then return the exit code.
    ///
    /// Callbacks still queued when exit is requested are discarded, not run.
    /// An exit requested before `exec` starts makes it return immediately.
    pub fn exec(&self) -> i32 {
        loop {
            let callback = {
                let mut queue = self.inner.queue.lock();
                loop {
                    if self.inner.exit_requested.load(Ordering::Acquire) {
                        queue.clear();
                        return self.inner.exit_code.load(Ordering::Acquire);
                    }
                    match queue.pop_front() {
                        Some(callback) => break callback,
                        None => self.inner.wakeup.wait(&mut queue),
                    }
                }
            };
            // The queue lock is released while the callback runs, so
            // callbacks may freely post or request exit themselves.
            callback();
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopHandle {
    /// Queue `callback` for execution on the dispatch thread.
    ///
    /// Dropped silently if exit has already been requested.
    pub fn post<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.inner.exit_requested.load(Ordering::Acquire) {
            return;
        }
        self.inner.queue.lock().push_back(Box::new(callback));
        self.inner.wakeup.notify_one();
    }

    /// Request loop exit with `code`.
    ///
    /// Safe from any thread, from inside a dispatched callback, and before
    /// `exec` has started. When called more than once the last code wins.
    pub fn exit(&self, code: i32) {
        self.inner.exit_code.store(code, Ordering::Release);
        self.inner.exit_requested.store(true, Ordering::Release);
        // Take and drop the queue lock so a dispatcher between its exit
        // check and its wait cannot miss the notification.
        drop(self.inner.queue.lock());
        self.inner.wakeup.notify_one();
    }
}
