//! Smart playlists (`.xsp`) filtering the library by tag.

use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use tracing::{info, warn};

use crate::cleanup::PLAYLIST_PREFIX;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::normalize::normalize_nodes;

/// View type whose playlists mention the media type in their name.
pub const MIXED_VIEW: &str = "mixed";

/// What [`playlist_xsp`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistOutcome {
    /// A new playlist file was written.
    Created(PathBuf),
    /// The playlist already existed and was left alone.
    AlreadyExists(PathBuf),
    /// The existing playlist was deleted.
    Removed(PathBuf),
    /// Writing the playlist failed; the error has been logged.
    WriteFailed(PathBuf),
}

/// Smart playlist type for a media type.
#[must_use]
pub fn playlist_type(mediatype: &str) -> &str {
    match mediatype {
        "homevideos" => "movies",
        other => other,
    }
}

/// Display name and file name of the playlist for a tag.
#[must_use]
pub fn playlist_names(mediatype: &str, tagname: &str, viewtype: &str) -> (String, String) {
    let clean = normalize_nodes(tagname);
    if viewtype == MIXED_VIEW {
        (
            format!("{tagname} - {mediatype}"),
            format!("{PLAYLIST_PREFIX} {clean} - {mediatype}.xsp"),
        )
    } else {
        (tagname.to_string(), format!("{PLAYLIST_PREFIX} {clean}.xsp"))
    }
}

/// Playlist document matching every item tagged `tagname`.
///
/// The `<name>` element is `Emby {name}`, so the host lists the playlist
/// with the prefix that cleanup matches on.
#[must_use]
pub fn render_xsp(mediatype: &str, name: &str, tagname: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\" ?>\n\
         <smartplaylist type=\"{}\">\n\
         \t<name>{} {}</name>\n\
         \t<match>all</match>\n\
         \t<rule field=\"tag\" operator=\"is\">\n\
         \t\t<value>{}</value>\n\
         \t</rule></smartplaylist>",
        escape(playlist_type(mediatype)),
        PLAYLIST_PREFIX,
        escape(name),
        escape(tagname)
    )
}

/// Create, keep or delete the smart playlist for `tagname` in
/// `playlists_dir`.
///
/// An existing playlist is never overwritten. Failing to create the directory
/// or to write a new playlist is logged and reported through
/// [`PlaylistOutcome::WriteFailed`] rather than an error; only a failed
/// deletion is returned as `Err`.
pub fn playlist_xsp(
    fs: &dyn FileSystem,
    playlists_dir: &Path,
    mediatype: &str,
    tagname: &str,
    viewtype: &str,
    delete: bool,
) -> Result<PlaylistOutcome> {
    let (name, file_name) = playlist_names(mediatype, tagname, viewtype);
    let path = playlists_dir.join(file_name);

    if !fs.exists(playlists_dir)
        && let Err(e) = fs.create_dir_all(playlists_dir)
    {
        warn!(
            "Failed to create playlist directory {}: {}",
            playlists_dir.display(),
            e
        );
        return Ok(PlaylistOutcome::WriteFailed(path));
    }

    if fs.exists(&path) {
        if delete {
            fs.remove_file(&path)?;
            info!("Removed playlist {}", path.display());
            return Ok(PlaylistOutcome::Removed(path));
        }
        return Ok(PlaylistOutcome::AlreadyExists(path));
    }

    match fs.write(&path, &render_xsp(mediatype, &name, tagname)) {
        Ok(()) => {
            info!("Created playlist {}", path.display());
            Ok(PlaylistOutcome::Created(path))
        }
        Err(e) => {
            warn!("Failed to create playlist {}: {}", path.display(), e);
            Ok(PlaylistOutcome::WriteFailed(path))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use crate::fs::mock::MockFileSystem;
    use tempfile::TempDir;

    const DIR: &str = "/profile/playlists/video";

    #[test]
    fn test_creates_playlist() {
        let fs = MockFileSystem::new();

        let outcome = playlist_xsp(&fs, Path::new(DIR), "movies", "Action", "movies", false).unwrap();

        let path = PathBuf::from("/profile/playlists/video/Emby Action.xsp");
        assert_eq!(outcome, PlaylistOutcome::Created(path.clone()));
        let body = fs.contents(&path).unwrap();
        assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\" ?>\n"));
        assert!(body.contains("<smartplaylist type=\"movies\">"));
        assert!(body.contains("\t<name>Emby Action</name>\n"));
        assert!(body.contains("\t\t<value>Action</value>\n"));
        assert!(body.ends_with("\t</rule></smartplaylist>"));
    }

    #[test]
    fn test_existing_playlist_is_not_rewritten() {
        let fs = MockFileSystem::new();
        fs.add_file("/profile/playlists/video/Emby Action.xsp", "custom");

        let outcome = playlist_xsp(&fs, Path::new(DIR), "movies", "Action", "movies", false).unwrap();

        assert!(matches!(outcome, PlaylistOutcome::AlreadyExists(_)));
        assert_eq!(
            fs.contents("/profile/playlists/video/Emby Action.xsp").unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_delete_existing_playlist() {
        let fs = MockFileSystem::new();
        playlist_xsp(&fs, Path::new(DIR), "tvshows", "Drama", "tvshows", false).unwrap();

        let outcome = playlist_xsp(&fs, Path::new(DIR), "tvshows", "Drama", "tvshows", true).unwrap();

        assert!(matches!(outcome, PlaylistOutcome::Removed(_)));
        assert!(!fs.exists(Path::new("/profile/playlists/video/Emby Drama.xsp")));
    }

    #[test]
    fn test_delete_missing_playlist_creates_it() {
        let fs = MockFileSystem::new();

        let outcome = playlist_xsp(&fs, Path::new(DIR), "movies", "Kids", "movies", true).unwrap();

        assert!(matches!(outcome, PlaylistOutcome::Created(_)));
    }

    #[test]
    fn test_mixed_view_homevideos() {
        let fs = MockFileSystem::new();

        let outcome =
            playlist_xsp(&fs, Path::new(DIR), "homevideos", "Family", MIXED_VIEW, false).unwrap();

        let path = PathBuf::from("/profile/playlists/video/Emby Family - homevideos.xsp");
        assert_eq!(outcome, PlaylistOutcome::Created(path.clone()));
        let body = fs.contents(&path).unwrap();
        assert!(body.contains("<smartplaylist type=\"movies\">"));
        assert!(body.contains("<name>Emby Family - homevideos</name>"));
        assert!(body.contains("<value>Family</value>"));
    }

    #[test]
    fn test_file_name_is_normalized_and_text_escaped() {
        let fs = MockFileSystem::new();

        let outcome =
            playlist_xsp(&fs, Path::new(DIR), "movies", "Sci-Fi: R&D (Best)", "movies", false)
                .unwrap();

        let path = PathBuf::from("/profile/playlists/video/Emby Sci-Fi R&D Best.xsp");
        assert_eq!(outcome, PlaylistOutcome::Created(path.clone()));
        let body = fs.contents(&path).unwrap();
        assert!(body.contains("<value>Sci-Fi: R&amp;D (Best)</value>"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let fs = MockFileSystem::new();
        fs.add_dir(DIR);
        fs.deny_writes("/profile/playlists/video/Emby Action.xsp");

        let outcome = playlist_xsp(&fs, Path::new(DIR), "movies", "Action", "movies", false).unwrap();

        assert!(matches!(outcome, PlaylistOutcome::WriteFailed(_)));
    }

    #[test]
    fn test_blocked_directory_is_reported_per_tag() {
        let temp = TempDir::new().unwrap();
        // A plain file where the playlists directory should go
        std::fs::write(temp.path().join("playlists"), "not a directory").unwrap();
        let dir = temp.path().join("playlists").join("video");
        let fs = RealFileSystem::new();

        for tag in ["Action", "Drama"] {
            let outcome = playlist_xsp(&fs, &dir, "movies", tag, "movies", false).unwrap();
            assert_eq!(
                outcome,
                PlaylistOutcome::WriteFailed(dir.join(format!("Emby {tag}.xsp")))
            );
        }
    }
}
