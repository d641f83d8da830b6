//! Kodiconnect Core Library
//!
//! This crate provides the host-side utilities of a Kodi library sync addon:
//! - Window property, settings and localization accessors
//! - Catalog database resolution by host version, and a full library reset
//! - Editors for `sources.xml`, `passwords.xml` and smart playlists
//! - Cleanup of generated playlists and library nodes
//! - File-name-safe normalization of titles and tags
//! - Property-gated addon logging, thread lifecycle control and profiling
//!
//! Host services (dialogs, window properties, settings, restart) are traits
//! so that they can be backed by the real host, by the console, or by mocks.
//!
//! # Error Handling
//!
//! Fallible operations return [`Result`]; see the [`error`] module for the
//! error categories.
//!
//! ```rust,ignore
//! use kodiconnect_core::{AddonConfig, RealFileSystem, sources_xml};
//!
//! let config = AddonConfig::load()?;
//! sources_xml(&RealFileSystem::new(), &config.special.sources_xml())?;
//! ```

pub mod cleanup;
pub mod config;
pub mod database;
pub mod error;
pub mod fs;
pub mod host;
pub mod logging;
pub mod normalize;
pub mod passwords;
pub mod playlist;
pub mod profiling;
pub mod properties;
pub mod reset;
pub mod settings;
pub mod sources;
pub mod thread;
pub mod xml;

pub use cleanup::{CleanupReport, NODE_PREFIX, PLAYLIST_PREFIX, delete_nodes, delete_playlists};
pub use config::{
    AddonConfig, CONFIG_FILE_NAME, DEFAULT_ADDON_ID, DEFAULT_ADDON_NAME, SpecialPaths,
    config_file_path, default_host_home,
};
pub use database::{DbKind, VERSION_TABLE, kodi_sql, music_db_path, video_db_path, wipe_tables};
pub use error::{DatabaseError, Error, ErrorKind, FileSystemError, Result, XmlError};
pub use fs::{FileSystem, RealFileSystem};
pub use host::{AbortMonitor, Dialog, FlagAbortMonitor, Host};
pub use logging::{LogRotation, Logger, LoggingConfig, LoggingGuard, log_msg};
pub use normalize::{normalize_nodes, normalize_string};
pub use passwords::{PasswordsDocument, PasswordsOutcome, passwords_xml};
pub use playlist::{MIXED_VIEW, PlaylistOutcome, playlist_xsp};
pub use profiling::{CallStats, ProfileSession, start_profiling, stop_profiling};
pub use properties::{
    DB_SCAN, HOME_WINDOW_ID, InMemoryPropertyStore, LOG_LEVEL, PropertyAction, PropertyStore,
    SHOULD_STOP, Window, window,
};
pub use reset::{ResetContext, ResetOutcome, reset};
pub use settings::{
    InMemorySettings, Localization, SettingsStore, StringTable, XmlSettingsStore, language,
    settings,
};
pub use sources::{SourcesDocument, sources_xml};
pub use thread::ThreadControl;
