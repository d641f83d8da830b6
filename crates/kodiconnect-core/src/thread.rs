//! Cooperative lifecycle control for worker threads.
//!
//! A [`ThreadControl`] is held by a worker and cloned into whoever needs to
//! stop or pause it. Workers poll [`ThreadControl::is_stopped`] and
//! [`ThreadControl::is_suspended`] from their loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::host::AbortMonitor;
use crate::properties::{PropertyStore, SHOULD_STOP, Window};

/// Stop / suspend flags shared between a worker and its controllers.
#[derive(Clone)]
pub struct ThreadControl {
    stopped: Arc<AtomicBool>,
    suspended: Arc<AtomicBool>,
    monitor: Arc<dyn AbortMonitor>,
    stop_property: Option<Arc<dyn PropertyStore>>,
}

impl ThreadControl {
    /// Create a running, unsuspended control watching `monitor` for host
    /// shutdown.
    pub fn new(monitor: Arc<dyn AbortMonitor>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            suspended: Arc::new(AtomicBool::new(false)),
            monitor,
            stop_property: None,
        }
    }

    /// Also treat `emby_shouldStop == "true"` as a stop request.
    ///
    /// Used by library sync threads, which the reset routine stops through
    /// that property.
    #[must_use]
    pub fn with_stop_property(mut self, properties: Arc<dyn PropertyStore>) -> Self {
        self.stop_property = Some(properties);
        self
    }

    /// Ask the worker to stop.
    pub fn stop_thread(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Pause the worker.
    pub fn suspend_thread(&self) {
        self.suspended.store(true, Ordering::SeqCst);
    }

    /// Resume a paused worker.
    pub fn resume_thread(&self) {
        self.suspended.store(false, Ordering::SeqCst);
    }

    /// Whether the worker is paused.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Whether the worker should exit: stopped explicitly, host shutting
    /// down, or (with a stop property) sync stop requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        if self.stopped.load(Ordering::SeqCst) || self.monitor.abort_requested() {
            return true;
        }
        self.stop_property
            .as_deref()
            .is_some_and(|properties| Window::home(properties).is_true(SHOULD_STOP))
    }
}

impl std::fmt::Debug for ThreadControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadControl")
            .field("stopped", &self.stopped.load(Ordering::SeqCst))
            .field("suspended", &self.is_suspended())
            .field("watches_stop_property", &self.stop_property.is_some())
            .finish()
    }
}
