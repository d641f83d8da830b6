//! Removal of addon-generated playlists and library nodes.
//!
//! Everything the addon writes into the host profile is recognizable by a
//! fixed, case-sensitive name prefix; anything else is left alone.

use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::fs::FileSystem;

/// Prefix of generated smart playlist files.
pub const PLAYLIST_PREFIX: &str = "Emby";

/// Prefix of generated library node files and directories.
pub const NODE_PREFIX: &str = "emby";

/// What a cleanup pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Files removed.
    pub files_removed: usize,
    /// Directories removed, with their contents.
    pub directories_removed: usize,
}

fn has_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .is_some_and(|name| name.starts_with(prefix))
}

/// Delete generated smart playlists in `playlists_dir`.
///
/// A missing directory removes nothing.
pub fn delete_playlists(fs: &dyn FileSystem, playlists_dir: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    if !fs.is_dir(playlists_dir) {
        debug!("No playlist directory at {}", playlists_dir.display());
        return Ok(report);
    }

    for entry in fs.read_dir(playlists_dir)? {
        if !fs.is_dir(&entry) && has_prefix(&entry, PLAYLIST_PREFIX) {
            fs.remove_file(&entry)?;
            report.files_removed += 1;
        }
    }

    info!(
        "Removed {} playlists from {}",
        report.files_removed,
        playlists_dir.display()
    );
    Ok(report)
}

/// Delete generated library node directories and files in `nodes_dir`.
///
/// A missing directory removes nothing.
pub fn delete_nodes(fs: &dyn FileSystem, nodes_dir: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    if !fs.is_dir(nodes_dir) {
        debug!("No node directory at {}", nodes_dir.display());
        return Ok(report);
    }

    for entry in fs.read_dir(nodes_dir)? {
        if !has_prefix(&entry, NODE_PREFIX) {
            continue;
        }
        if fs.is_dir(&entry) {
            fs.remove_dir_all(&entry)?;
            report.directories_removed += 1;
        } else {
            fs.remove_file(&entry)?;
            report.files_removed += 1;
        }
    }

    info!(
        "Removed {} node directories and {} node files from {}",
        report.directories_removed,
        report.files_removed,
        nodes_dir.display()
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn test_delete_playlists_by_prefix() {
        let fs = MockFileSystem::new();
        fs.add_file("/pl/Emby Action.xsp", "x");
        fs.add_file("/pl/Emby Kids - homevideos.xsp", "x");
        fs.add_file("/pl/emby lowercase.xsp", "x");
        fs.add_file("/pl/My Favourites.xsp", "x");

        let report = delete_playlists(&fs, Path::new("/pl")).unwrap();

        assert_eq!(report.files_removed, 2);
        assert!(!fs.exists(Path::new("/pl/Emby Action.xsp")));
        assert!(fs.exists(Path::new("/pl/emby lowercase.xsp")));
        assert!(fs.exists(Path::new("/pl/My Favourites.xsp")));
    }

    #[test]
    fn test_delete_playlists_missing_directory() {
        let fs = MockFileSystem::new();
        let report = delete_playlists(&fs, Path::new("/nowhere")).unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn test_delete_nodes_files_and_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/nodes/emby_movies/index.xml", "x");
        fs.add_file("/nodes/emby_movies/all.xml", "x");
        fs.add_file("/nodes/emby_tvshows.xml", "x");
        fs.add_file("/nodes/Emby Upper/index.xml", "x");
        fs.add_file("/nodes/movies/index.xml", "x");

        let report = delete_nodes(&fs, Path::new("/nodes")).unwrap();

        assert_eq!(report.directories_removed, 1);
        assert_eq!(report.files_removed, 1);
        assert!(!fs.exists(Path::new("/nodes/emby_movies")));
        assert!(!fs.exists(Path::new("/nodes/emby_tvshows.xml")));
        assert!(fs.exists(Path::new("/nodes/Emby Upper/index.xml")));
        assert!(fs.exists(Path::new("/nodes/movies/index.xml")));
    }
}
