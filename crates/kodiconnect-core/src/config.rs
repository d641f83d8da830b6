//! Addon configuration management.
//!
//! Holds the addon identity, the host build version and the directories the
//! host exposes through its `special://` protocol. The configuration is
//! stored as JSON and created with defaults on first load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, FileSystemError, Result};

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "kodiconnect.json";

/// Default addon id.
pub const DEFAULT_ADDON_ID: &str = "plugin.video.plexkodiconnect";

/// Default addon display name.
pub const DEFAULT_ADDON_NAME: &str = "PlexKodiConnect";

/// Roots of the host's `special://` protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpecialPaths {
    /// `special://home/`
    pub home: PathBuf,
    /// `special://profile/`
    pub profile: PathBuf,
    /// `special://userdata/`
    pub userdata: PathBuf,
    /// `special://database/`
    pub database: PathBuf,
}

impl SpecialPaths {
    /// Lay out the special roots under a host home directory the way the
    /// host does for its master profile.
    #[must_use]
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let userdata = home.join("userdata");
        Self {
            profile: userdata.clone(),
            database: userdata.join("Database"),
            userdata,
            home,
        }
    }

    /// Translate a `special://` URL into a file system path.
    ///
    /// Anything that does not start with a known special root is returned
    /// unchanged.
    #[must_use]
    pub fn translate(&self, url: &str) -> PathBuf {
        let Some(rest) = url.strip_prefix("special://") else {
            return PathBuf::from(url);
        };
        let (root, tail) = rest.split_once('/').unwrap_or((rest, ""));
        let base = match root {
            "home" => &self.home,
            "profile" | "masterprofile" => &self.profile,
            "userdata" => &self.userdata,
            "database" => &self.database,
            _ => return PathBuf::from(url),
        };
        tail.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(base.clone(), |acc, segment| acc.join(segment))
    }

    /// `special://profile/playlists/video/`
    #[must_use]
    pub fn video_playlists(&self) -> PathBuf {
        self.translate("special://profile/playlists/video/")
    }

    /// `special://profile/library/video/`
    #[must_use]
    pub fn video_nodes(&self) -> PathBuf {
        self.translate("special://profile/library/video/")
    }

    /// `special://profile/sources.xml`
    #[must_use]
    pub fn sources_xml(&self) -> PathBuf {
        self.translate("special://profile/sources.xml")
    }

    /// `special://userdata/passwords.xml`
    #[must_use]
    pub fn passwords_xml(&self) -> PathBuf {
        self.translate("special://userdata/passwords.xml")
    }
}

impl Default for SpecialPaths {
    fn default() -> Self {
        Self::from_home(default_host_home())
    }
}

/// Addon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddonConfig {
    /// Addon id as registered with the host.
    #[serde(default = "default_addon_id")]
    pub addon_id: String,
    /// Addon display name, used as log title prefix.
    #[serde(default = "default_addon_name")]
    pub addon_name: String,
    /// Host build version string, e.g. `"16.1 Git:2016-04-24"`.
    #[serde(default)]
    pub build_version: String,
    /// Host special directories.
    #[serde(default)]
    pub special: SpecialPaths,
    /// Addon profile directory (holds `settings.xml` and `profiles/`).
    /// Defaults to `{userdata}/addon_data/{addon_id}` when absent.
    #[serde(default)]
    pub addon_profile: Option<PathBuf>,
}

fn default_addon_id() -> String {
    DEFAULT_ADDON_ID.to_string()
}

fn default_addon_name() -> String {
    DEFAULT_ADDON_NAME.to_string()
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            addon_id: default_addon_id(),
            addon_name: default_addon_name(),
            build_version: String::new(),
            special: SpecialPaths::default(),
            addon_profile: None,
        }
    }
}

impl AddonConfig {
    /// Build a configuration rooted at a host home directory.
    #[must_use]
    pub fn for_home(home: impl Into<PathBuf>, build_version: impl Into<String>) -> Self {
        Self {
            build_version: build_version.into(),
            special: SpecialPaths::from_home(home),
            ..Self::default()
        }
    }

    /// Load configuration from the default location, creating it if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, creating a default file if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config file not found, using defaults");
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::FileSystem(FileSystemError::ReadFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to read config file: {e}"),
            })
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {e}")))?;

        info!("Loaded config from {}", path.display());
        debug!("Profile directory: {}", config.special.profile.display());

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                Error::FileSystem(FileSystemError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create config directory: {e}"),
                })
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            Error::FileSystem(FileSystemError::WriteFailed {
                path: path.to_path_buf(),
                reason: format!("Failed to write config file: {e}"),
            })
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// The addon profile directory.
    #[must_use]
    pub fn addon_profile(&self) -> PathBuf {
        self.addon_profile.clone().unwrap_or_else(|| {
            self.special
                .userdata
                .join("addon_data")
                .join(&self.addon_id)
        })
    }

    /// The addon's persisted `settings.xml`.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.addon_profile().join("settings.xml")
    }

    /// Directory receiving profiler output.
    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.addon_profile().join("profiles")
    }
}

/// Default host home directory (`~/.kodi`).
#[must_use]
pub fn default_host_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kodi")
}

/// Path of the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kodiconnect")
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_translate_known_roots() {
        let special = SpecialPaths::from_home("/home/user/.kodi");

        assert_eq!(
            special.translate("special://database/MyVideos99.db"),
            PathBuf::from("/home/user/.kodi/userdata/Database/MyVideos99.db")
        );
        assert_eq!(
            special.translate("special://profile/playlists/video/"),
            PathBuf::from("/home/user/.kodi/userdata/playlists/video")
        );
        assert_eq!(
            special.translate("special://home/addons"),
            PathBuf::from("/home/user/.kodi/addons")
        );
    }

    #[test]
    fn test_translate_passes_through_unknown() {
        let special = SpecialPaths::from_home("/k");
        assert_eq!(
            special.translate("smb://server/share"),
            PathBuf::from("smb://server/share")
        );
        assert_eq!(
            special.translate("special://skin/media"),
            PathBuf::from("special://skin/media")
        );
    }

    #[test]
    fn test_named_paths() {
        let special = SpecialPaths::from_home("/k");
        assert_eq!(special.sources_xml(), PathBuf::from("/k/userdata/sources.xml"));
        assert_eq!(
            special.passwords_xml(),
            PathBuf::from("/k/userdata/passwords.xml")
        );
        assert_eq!(
            special.video_nodes(),
            PathBuf::from("/k/userdata/library/video")
        );
    }

    #[test]
    fn test_addon_profile_default_and_override() {
        let mut config = AddonConfig::for_home("/k", "16.1");
        assert_eq!(
            config.settings_file(),
            PathBuf::from("/k/userdata/addon_data/plugin.video.plexkodiconnect/settings.xml")
        );

        config.addon_profile = Some(PathBuf::from("/elsewhere"));
        assert_eq!(config.profiles_dir(), PathBuf::from("/elsewhere/profiles"));
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join(CONFIG_FILE_NAME);

        let config = AddonConfig::load_from(&path).unwrap();

        assert_eq!(config.addon_id, DEFAULT_ADDON_ID);
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        let config = AddonConfig::for_home(temp.path(), "15.2 Git:20151019");

        config.save_to(&path).unwrap();
        let loaded = AddonConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"build_version": "14.2"}"#).unwrap();

        let loaded = AddonConfig::load_from(&path).unwrap();
        assert_eq!(loaded.build_version, "14.2");
        assert_eq!(loaded.addon_name, DEFAULT_ADDON_NAME);
    }

    #[test]
    fn test_load_invalid_json_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "not json").unwrap();

        let result = AddonConfig::load_from(&path);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
