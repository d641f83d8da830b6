//! Addon settings and localized strings.
//!
//! Settings are plain string key/value pairs owned by the host. The
//! file-backed [`XmlSettingsStore`] reads and writes the addon's
//! `settings.xml` in the host's `<settings><setting id=".." value=".."/>`
//! layout, so deleting that file resets every setting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::xml::{self, Element};

/// `"true"` when music libraries are synced too.
pub const ENABLE_MUSIC: &str = "enableMusic";

/// `"true"` once the first full sync has completed.
pub const SYNC_INSTALL_RUN_DONE: &str = "SyncInstallRunDone";

/// Server name whose network credentials live in `passwords.xml`.
pub const NETWORK_CREDS: &str = "networkCreds";

/// Persistent addon settings.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Setting value, empty when unset.
    fn get_setting(&self, key: &str) -> String;

    /// Store a setting value.
    fn set_setting(&self, key: &str, value: &str);
}

/// Localized string lookup.
#[cfg_attr(test, mockall::automock)]
pub trait Localization: Send + Sync {
    /// String for `id`, empty when unknown.
    fn localized_string(&self, id: u32) -> String;
}

/// Get a setting, or set it when `value` is given.
///
/// Returns the current value for a read and `None` after a write.
pub fn settings(store: &dyn SettingsStore, key: &str, value: Option<&str>) -> Option<String> {
    match value {
        Some(value) => {
            store.set_setting(key, value);
            None
        }
        None => Some(store.get_setting(key)),
    }
}

/// Look up a localized string.
pub fn language(strings: &dyn Localization, id: u32) -> String {
    strings.localized_string(id)
}

/// Settings kept in memory only.
#[derive(Debug, Default, Clone)]
pub struct InMemorySettings {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySettings {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `pairs`.
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        for (key, value) in pairs {
            store.set_setting(key, value);
        }
        store
    }
}

impl SettingsStore for InMemorySettings {
    fn get_setting(&self, key: &str) -> String {
        self.values
            .read()
            .ok()
            .and_then(|values| values.get(key).cloned())
            .unwrap_or_default()
    }

    fn set_setting(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

/// Settings persisted to the addon's `settings.xml`.
///
/// Every write rewrites the whole file; reads go to the file each time so
/// that changes made by the host are picked up.
pub struct XmlSettingsStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl XmlSettingsStore {
    /// Create a store backed by `path`.
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Element {
        xml::load_or_new(self.fs.as_ref(), &self.path, "settings")
    }
}

impl std::fmt::Debug for XmlSettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSettingsStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SettingsStore for XmlSettingsStore {
    fn get_setting(&self, key: &str) -> String {
        self.load()
            .children
            .iter()
            .find(|s| s.name == "setting" && s.attribute("id") == Some(key))
            .and_then(|s| s.attribute("value").or_else(|| s.text()))
            .unwrap_or_default()
            .to_string()
    }

    fn set_setting(&self, key: &str, value: &str) {
        let mut root = self.load();
        let existing = root
            .children
            .iter_mut()
            .find(|s| s.name == "setting" && s.attribute("id") == Some(key));
        match existing {
            Some(setting) => setting.set_attribute("value", value),
            None => {
                root.push(
                    Element::new("setting")
                        .with_attribute("id", key)
                        .with_attribute("value", value),
                );
            }
        }

        if let Some(parent) = self.path.parent()
            && !self.fs.exists(parent)
            && let Err(e) = self.fs.create_dir_all(parent)
        {
            warn!("Failed to create settings directory: {}", e);
            return;
        }
        match xml::save(self.fs.as_ref(), &self.path, &root) {
            Ok(()) => debug!("Saved setting {}", key),
            Err(e) => warn!("Failed to save setting {}: {}", key, e),
        }
    }
}

/// In-memory localized string table.
#[derive(Debug, Default, Clone)]
pub struct StringTable {
    strings: HashMap<u32, String>,
}

impl StringTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a string.
    #[must_use]
    pub fn with(mut self, id: u32, text: impl Into<String>) -> Self {
        self.strings.insert(id, text.into());
        self
    }
}

impl Localization for StringTable {
    fn localized_string(&self, id: u32) -> String {
        self.strings.get(&id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use mockall::predicate::eq;

    #[test]
    fn test_settings_get_and_set() {
        let store = InMemorySettings::new();

        assert_eq!(settings(&store, ENABLE_MUSIC, None).as_deref(), Some(""));
        assert_eq!(settings(&store, ENABLE_MUSIC, Some("true")), None);
        assert_eq!(
            settings(&store, ENABLE_MUSIC, None).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_settings_delegates_to_store() {
        let mut mock = MockSettingsStore::new();
        mock.expect_set_setting()
            .with(eq(SYNC_INSTALL_RUN_DONE), eq("false"))
            .times(1)
            .return_const(());

        settings(&mock, SYNC_INSTALL_RUN_DONE, Some("false"));
    }

    #[test]
    fn test_language_lookup() {
        let strings = StringTable::new().with(30001, "Emby for Kodi");
        assert_eq!(language(&strings, 30001), "Emby for Kodi");
        assert_eq!(language(&strings, 1), "");
    }

    #[test]
    fn test_xml_settings_round_trip() {
        let fs = Arc::new(MockFileSystem::new());
        let store = XmlSettingsStore::new(fs.clone(), "/addon_data/plugin/settings.xml");

        store.set_setting(NETWORK_CREDS, "NAS");
        store.set_setting(ENABLE_MUSIC, "true");
        store.set_setting(NETWORK_CREDS, "SERVER-PC");

        assert_eq!(store.get_setting(NETWORK_CREDS), "SERVER-PC");
        assert_eq!(store.get_setting(ENABLE_MUSIC), "true");
        assert_eq!(store.get_setting("missing"), "");

        let content = fs.contents("/addon_data/plugin/settings.xml").unwrap();
        assert_eq!(content.matches("<setting ").count(), 2);
    }

    #[test]
    fn test_xml_settings_reads_host_file() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(
            "/p/settings.xml",
            r#"<settings><setting id="enableMusic" value="true" /><setting id="other">x</setting></settings>"#,
        );
        let store = XmlSettingsStore::new(fs, "/p/settings.xml");

        assert_eq!(store.get_setting(ENABLE_MUSIC), "true");
        assert_eq!(store.get_setting("other"), "x");
    }
}
