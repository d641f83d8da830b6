//! Window property store access.
//!
//! The host keeps process-wide string properties attached to windows. The
//! addon uses them as cross-thread flags (stop requests, scan-in-progress,
//! log level). [`PropertyStore`] abstracts the host store; [`Window`] binds a
//! store to a single window id.

use std::collections::HashMap;
use std::sync::RwLock;

/// Id of the host's home window, where all addon properties live.
pub const HOME_WINDOW_ID: u32 = 10000;

/// Set to `"true"` to ask running library sync threads to stop.
pub const SHOULD_STOP: &str = "emby_shouldStop";

/// `"true"` while a library sync scan is running.
pub const DB_SCAN: &str = "emby_dbScan";

/// Addon log verbosity, `-2` (errors only) to `2` (database debug).
pub const LOG_LEVEL: &str = "emby_logLevel";

/// Host-managed property storage keyed by window id and name.
#[cfg_attr(test, mockall::automock)]
pub trait PropertyStore: Send + Sync {
    /// Current value, `None` when the property is not set.
    fn get(&self, window_id: u32, key: &str) -> Option<String>;

    /// Set a property.
    fn set(&self, window_id: u32, key: &str, value: &str);

    /// Remove a property.
    fn clear(&self, window_id: u32, key: &str);
}

/// In-process property store.
#[derive(Debug, Default)]
pub struct InMemoryPropertyStore {
    values: RwLock<HashMap<(u32, String), String>>,
}

impl InMemoryPropertyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, window_id: u32, key: &str) -> Option<String> {
        self.values
            .read()
            .ok()?
            .get(&(window_id, key.to_string()))
            .cloned()
    }

    fn set(&self, window_id: u32, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert((window_id, key.to_string()), value.to_string());
        }
    }

    fn clear(&self, window_id: u32, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(&(window_id, key.to_string()));
        }
    }
}

/// What [`window`] should do with a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyAction<'a> {
    /// Read the value.
    Get,
    /// Replace the value.
    Set(&'a str),
    /// Remove the property.
    Clear,
}

/// Get, set or clear a property on `window_id`.
///
/// Returns the value for [`PropertyAction::Get`] (empty when unset) and
/// `None` for mutations.
pub fn window(
    store: &dyn PropertyStore,
    property: &str,
    action: PropertyAction<'_>,
    window_id: u32,
) -> Option<String> {
    match action {
        PropertyAction::Clear => {
            store.clear(window_id, property);
            None
        }
        PropertyAction::Set(value) => {
            store.set(window_id, property, value);
            None
        }
        PropertyAction::Get => Some(store.get(window_id, property).unwrap_or_default()),
    }
}

/// A property store bound to one window.
#[derive(Clone, Copy)]
pub struct Window<'a> {
    store: &'a dyn PropertyStore,
    id: u32,
}

impl<'a> Window<'a> {
    /// Bind to the home window.
    #[must_use]
    pub fn home(store: &'a dyn PropertyStore) -> Self {
        Self::new(store, HOME_WINDOW_ID)
    }

    /// Bind to an arbitrary window id.
    #[must_use]
    pub fn new(store: &'a dyn PropertyStore, id: u32) -> Self {
        Self { store, id }
    }

    /// Window id.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Property value, empty when unset.
    #[must_use]
    pub fn get(&self, property: &str) -> String {
        window(self.store, property, PropertyAction::Get, self.id).unwrap_or_default()
    }

    /// Whether the property reads exactly `"true"`.
    #[must_use]
    pub fn is_true(&self, property: &str) -> bool {
        self.get(property) == "true"
    }

    /// Set a property.
    pub fn set(&self, property: &str, value: &str) {
        window(self.store, property, PropertyAction::Set(value), self.id);
    }

    /// Remove a property.
    pub fn clear(&self, property: &str) {
        window(self.store, property, PropertyAction::Clear, self.id);
    }
}

impl std::fmt::Debug for Window<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window").field("id", &self.id).finish()
    }
}
