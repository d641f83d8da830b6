//! Host catalog database location and maintenance.
//!
//! The host names its video and music databases after their schema version,
//! which changes with every major release. [`DbKind::file_name`] maps the
//! host build version onto those names.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{DatabaseError, Result};

/// Table holding the schema version. Never wiped.
pub const VERSION_TABLE: &str = "version";

/// Video schema versions by host major version.
const VIDEO_DB_VERSIONS: &[(&str, u32)] = &[
    ("13", 78), // Gotham
    ("14", 90), // Helix
    ("15", 93), // Isengard
    ("16", 99), // Jarvis
];

/// Music schema versions by host major version.
const MUSIC_DB_VERSIONS: &[(&str, u32)] = &[
    ("13", 46), // Gotham
    ("14", 48), // Helix
    ("15", 52), // Isengard
    ("16", 56), // Jarvis
];

/// The databases the addon touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbKind {
    /// Host video catalog.
    Video,
    /// Host music catalog.
    Music,
    /// Host texture cache.
    Texture,
    /// The addon's own mapping database.
    Emby,
}

impl DbKind {
    /// Database file name for a host build version.
    ///
    /// Unknown versions produce a name without a version number
    /// (`MyVideos.db`); callers must check the file exists.
    #[must_use]
    pub fn file_name(self, build_version: &str) -> String {
        match self {
            Self::Video => format!("MyVideos{}.db", schema_suffix(VIDEO_DB_VERSIONS, build_version)),
            Self::Music => format!("MyMusic{}.db", schema_suffix(MUSIC_DB_VERSIONS, build_version)),
            Self::Texture => "Textures13.db".to_string(),
            Self::Emby => "emby.db".to_string(),
        }
    }

    /// Full path under the host database directory.
    #[must_use]
    pub fn path(self, database_dir: &Path, build_version: &str) -> PathBuf {
        database_dir.join(self.file_name(build_version))
    }
}

impl std::fmt::Display for DbKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Music => write!(f, "music"),
            Self::Texture => write!(f, "texture"),
            Self::Emby => write!(f, "emby"),
        }
    }
}

fn schema_suffix(table: &[(&str, u32)], build_version: &str) -> String {
    let major: String = build_version.chars().take(2).collect();
    table
        .iter()
        .find(|(prefix, _)| *prefix == major)
        .map(|(_, version)| version.to_string())
        .unwrap_or_default()
}

/// Path of the host video database.
#[must_use]
pub fn video_db_path(database_dir: &Path, build_version: &str) -> PathBuf {
    DbKind::Video.path(database_dir, build_version)
}

/// Path of the host music database.
#[must_use]
pub fn music_db_path(database_dir: &Path, build_version: &str) -> PathBuf {
    DbKind::Music.path(database_dir, build_version)
}

/// Open a connection to one of the databases.
pub fn kodi_sql(kind: DbKind, database_dir: &Path, build_version: &str) -> Result<Connection> {
    let path = kind.path(database_dir, build_version);
    debug!("Opening {} database at {}", kind, path.display());
    Connection::open(&path).map_err(|source| DatabaseError::OpenFailed { path, source }.into())
}

/// Delete every row of every table except [`VERSION_TABLE`], in one
/// transaction. Returns the names of the wiped tables.
pub fn wipe_tables(conn: &mut Connection) -> Result<Vec<String>> {
    let path = PathBuf::from(conn.path().unwrap_or_default());
    let query_failed = |source| DatabaseError::QueryFailed {
        path: path.clone(),
        source,
    };

    let tx = conn.transaction().map_err(query_failed)?;
    let tables: Vec<String> = {
        let mut stmt = tx
            .prepare("SELECT tbl_name FROM sqlite_master WHERE type='table'")
            .map_err(query_failed)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(query_failed)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_failed)?
    };

    let mut wiped = Vec::new();
    for table in tables.into_iter().filter(|t| t != VERSION_TABLE) {
        let sql = format!("DELETE FROM \"{}\"", table.replace('"', "\"\""));
        tx.execute(&sql, []).map_err(query_failed)?;
        wiped.push(table);
    }
    tx.commit().map_err(query_failed)?;

    info!("Wiped {} tables in {}", wiped.len(), path.display());
    Ok(wiped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_known_versions() {
        assert_eq!(DbKind::Video.file_name("13.2 Git:2014"), "MyVideos78.db");
        assert_eq!(DbKind::Video.file_name("16.1 Git:20160424"), "MyVideos99.db");
        assert_eq!(DbKind::Music.file_name("14.0"), "MyMusic48.db");
        assert_eq!(DbKind::Music.file_name("15.2"), "MyMusic52.db");
    }

    #[test]
    fn test_unknown_version_has_empty_suffix() {
        assert_eq!(DbKind::Video.file_name("17.0 Krypton"), "MyVideos.db");
        assert_eq!(DbKind::Music.file_name(""), "MyMusic.db");
        assert_eq!(
            video_db_path(Path::new("/db"), "12.3"),
            PathBuf::from("/db/MyVideos.db")
        );
    }

    #[test]
    fn test_fixed_names() {
        assert_eq!(DbKind::Texture.file_name("16.0"), "Textures13.db");
        assert_eq!(DbKind::Emby.file_name("anything"), "emby.db");
        assert_eq!(
            music_db_path(Path::new("/db"), "16.0"),
            PathBuf::from("/db/MyMusic56.db")
        );
    }

    #[test]
    fn test_wipe_keeps_version_table() {
        let temp = TempDir::new().unwrap();
        let mut conn = kodi_sql(DbKind::Video, temp.path(), "16.1").unwrap();
        conn.execute_batch(
            "CREATE TABLE version (idVersion INTEGER);
             INSERT INTO version VALUES (99);
             CREATE TABLE movie (idMovie INTEGER, c00 TEXT);
             INSERT INTO movie VALUES (1, 'Alien'), (2, 'Aliens');
             CREATE TABLE tag (tag_id INTEGER, name TEXT);
             INSERT INTO tag VALUES (1, 'Action');",
        )
        .unwrap();

        let mut wiped = wipe_tables(&mut conn).unwrap();
        wiped.sort();
        assert_eq!(wiped, vec!["movie".to_string(), "tag".to_string()]);

        let count = |table: &str| -> i64 {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
                .unwrap()
        };
        assert_eq!(count("version"), 1);
        assert_eq!(count("movie"), 0);
        assert_eq!(count("tag"), 0);
        assert!(temp.path().join("MyVideos99.db").exists());
    }

    #[test]
    fn test_wipe_empty_database() {
        let temp = TempDir::new().unwrap();
        let mut conn = kodi_sql(DbKind::Emby, temp.path(), "").unwrap();
        assert!(wipe_tables(&mut conn).unwrap().is_empty());
    }
}
