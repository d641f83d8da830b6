//! Full reset of the local library.
//!
//! Stops any running sync, removes generated playlists and nodes, empties
//! the host catalogs and the addon database, and optionally the addon
//! settings, then asks the host to restart.

use std::time::Duration;

use tracing::info;

use crate::cleanup::{delete_nodes, delete_playlists};
use crate::config::AddonConfig;
use crate::database::{DbKind, kodi_sql, wipe_tables};
use crate::error::Result;
use crate::fs::FileSystem;
use crate::host::{Dialog, Host};
use crate::logging::Logger;
use crate::properties::{DB_SCAN, PropertyStore, SHOULD_STOP, Window};
use crate::settings::{ENABLE_MUSIC, SYNC_INSTALL_RUN_DONE, SettingsStore};

/// How many times the sync flag is checked before giving up.
pub const SYNC_WAIT_ATTEMPTS: u32 = 10;

/// Pause between two checks of the sync flag.
pub const SYNC_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Services the reset talks to.
#[derive(Clone, Copy)]
pub struct ResetContext<'a> {
    /// Addon and host paths.
    pub config: &'a AddonConfig,
    /// File system holding playlists, nodes and the settings file.
    pub fs: &'a dyn FileSystem,
    /// Window properties shared with the sync threads.
    pub properties: &'a dyn PropertyStore,
    /// Addon settings.
    pub settings: &'a dyn SettingsStore,
    /// Confirmation and status dialogs.
    pub dialog: &'a dyn Dialog,
    /// Host control.
    pub host: &'a dyn Host,
}

impl std::fmt::Debug for ResetContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetContext")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

/// How a reset ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The user declined the first confirmation.
    Declined,
    /// The library sync did not stop in time; nothing was reset.
    SyncStillRunning,
    /// Everything was reset and a restart was requested.
    Completed {
        /// Whether the addon settings file was deleted.
        settings_deleted: bool,
    },
}

/// Reset the local library after confirmation.
///
/// Database and file system errors are returned as soon as they happen;
/// databases wiped before the failure stay wiped.
pub fn reset(ctx: &ResetContext<'_>) -> Result<ResetOutcome> {
    let log = Logger::new(ctx.properties, &ctx.config.addon_name, "Reset");

    if !ctx
        .dialog
        .yes_no("Warning", "Are you sure you want to reset your local Kodi database?")
    {
        return Ok(ResetOutcome::Declined);
    }

    if !stop_sync(ctx, &log) {
        ctx.dialog.ok(
            "Warning",
            "Could not stop the database from running. Try again.",
        );
        return Ok(ResetOutcome::SyncStillRunning);
    }

    delete_playlists(ctx.fs, &ctx.config.special.video_playlists())?;
    delete_nodes(ctx.fs, &ctx.config.special.video_nodes())?;

    let build_version = ctx.host.build_version();
    let mut databases = vec![DbKind::Video];
    if ctx.settings.get_setting(ENABLE_MUSIC) == "true" {
        databases.push(DbKind::Music);
    }
    databases.push(DbKind::Emby);

    for kind in databases {
        log.log(&format!("Resetting the {kind} database."), 1);
        let mut conn = kodi_sql(kind, &ctx.config.special.database, &build_version)?;
        wipe_tables(&mut conn)?;
    }

    ctx.settings.set_setting(SYNC_INSTALL_RUN_DONE, "false");

    let mut settings_deleted = false;
    if ctx.dialog.yes_no("Warning", "Reset all Emby Addon settings?") {
        let settings_file = ctx.config.settings_file();
        if ctx.fs.exists(&settings_file) {
            ctx.fs.remove_file(&settings_file)?;
            settings_deleted = true;
        }
        log.log("Deleting: settings.xml", 1);
    }

    ctx.dialog.ok(
        "Emby for Kodi",
        "Database reset has completed, Kodi will now restart to apply the changes.",
    );
    info!("Database reset completed, restarting");
    ctx.host.restart_app();

    Ok(ResetOutcome::Completed { settings_deleted })
}

/// Raise the stop flag and wait for the sync to clear `emby_dbScan`.
/// Returns `false` when it is still set after [`SYNC_WAIT_ATTEMPTS`] checks.
fn stop_sync(ctx: &ResetContext<'_>, log: &Logger<'_>) -> bool {
    let window = Window::home(ctx.properties);
    window.set(SHOULD_STOP, "true");

    let mut remaining = SYNC_WAIT_ATTEMPTS;
    while window.is_true(DB_SCAN) {
        log.log(&format!("Sync is running, will retry: {remaining}..."), 1);
        remaining -= 1;
        if remaining == 0 {
            return false;
        }
        ctx.host.sleep(SYNC_WAIT_INTERVAL);
    }
    true
}
