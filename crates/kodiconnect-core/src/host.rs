//! Host application services: dialogs, restart, sleeping and shutdown
//! monitoring.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Modal dialogs shown by the host.
#[cfg_attr(test, mockall::automock)]
pub trait Dialog: Send + Sync {
    /// Yes/no question. Returns `true` for yes.
    fn yes_no(&self, heading: &str, line: &str) -> bool;

    /// Informational message with a single OK button.
    fn ok(&self, heading: &str, line: &str);

    /// Pick one of `options`. `None` when cancelled.
    fn select(&self, heading: &str, options: &[String]) -> Option<usize>;

    /// Free text input, pre-filled with `default`. `hidden` masks the
    /// typed characters. An empty string means the user cancelled.
    fn input(&self, heading: &str, default: &str, hidden: bool) -> String;

    /// Toast notification.
    fn notification(&self, heading: &str, message: &str, icon: &str, time_ms: u32, sound: bool);
}

/// Host application control.
#[cfg_attr(test, mockall::automock)]
pub trait Host: Send + Sync {
    /// Host build version, e.g. `"16.1 Git:2016-04-24-c327c53"`.
    fn build_version(&self) -> String;

    /// Block the calling thread.
    fn sleep(&self, duration: Duration);

    /// Ask the host to restart.
    fn restart_app(&self);

    /// Touch `url` through the host's virtual file system. Used to make the
    /// host pick up new network credentials without a restart.
    fn probe_path(&self, url: &str) -> bool;
}

/// Reports whether the host is shutting down.
#[cfg_attr(test, mockall::automock)]
pub trait AbortMonitor: Send + Sync {
    /// `true` once the host asked addons to exit.
    fn abort_requested(&self) -> bool;
}

/// Abort monitor driven by a shared flag.
#[derive(Debug, Clone, Default)]
pub struct FlagAbortMonitor {
    flag: Arc<AtomicBool>,
}

impl FlagAbortMonitor {
    /// Create a monitor that has not been aborted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal shutdown.
    pub fn request_abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl AbortMonitor for FlagAbortMonitor {
    fn abort_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
