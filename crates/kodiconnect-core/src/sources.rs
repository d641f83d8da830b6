//! `sources.xml` editing.
//!
//! The host only registers its network protocol handlers for paths that
//! appear in a media source. Two dummy network sources make sure the
//! handlers are available when master lock is enabled.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::xml::{self, Element};

/// Dummy network paths registered as video sources.
pub const DUMMY_SOURCE_PATHS: [&str; 2] = [
    "smb://embydummy/dummypath1/",
    "smb://embydummy/dummypath2/",
];

/// Display name of the dummy sources.
pub const DUMMY_SOURCE_NAME: &str = "Emby";

/// A parsed `sources.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcesDocument {
    root: Element,
}

impl Default for SourcesDocument {
    fn default() -> Self {
        Self {
            root: Element::new("sources"),
        }
    }
}

impl SourcesDocument {
    /// Load `path`, starting empty when missing or unreadable.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Self {
        Self {
            root: xml::load_or_new(fs, path, "sources"),
        }
    }

    /// Parse a document from a string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            root: Element::parse(content)?,
        })
    }

    /// Root element.
    #[must_use]
    pub const fn root(&self) -> &Element {
        &self.root
    }

    /// Make sure a `video` section exists, creating it with its `default`
    /// entry when missing.
    pub fn ensure_video_section(&mut self) -> &mut Element {
        let index = match self.root.children.iter().position(|c| c.name == "video") {
            Some(index) => index,
            None => {
                self.root.children.push(
                    Element::new("video")
                        .with_child(Element::new("default").with_attribute("pathversion", "1")),
                );
                self.root.children.len() - 1
            }
        };
        &mut self.root.children[index]
    }

    /// Whether any `path` element in the whole document has text `path`.
    ///
    /// This deliberately looks beyond the `video` section: a path registered
    /// under any media type counts.
    #[must_use]
    pub fn contains_path(&self, path: &str) -> bool {
        self.root
            .descendants()
            .into_iter()
            .any(|e| e.name == "path" && e.text() == Some(path))
    }

    /// Append a video source unless `path` is already present anywhere.
    /// Returns whether a source was added.
    pub fn add_video_source(&mut self, name: &str, path: &str) -> bool {
        if self.contains_path(path) {
            return false;
        }
        self.ensure_video_section().push(
            Element::new("source")
                .with_child(Element::new("name").with_text(name))
                .with_child(
                    Element::new("path")
                        .with_attribute("pathversion", "1")
                        .with_text(path),
                )
                .with_child(Element::new("allowsharing").with_text("true")),
        );
        true
    }

    /// Number of `source` entries under `video`.
    #[must_use]
    pub fn video_source_count(&self) -> usize {
        self.root
            .child("video")
            .map_or(0, |v| v.children.iter().filter(|c| c.name == "source").count())
    }

    /// Pretty-printed XML.
    pub fn to_xml(&self) -> Result<String> {
        self.root.to_pretty_string()
    }

    /// Write the document to `path`.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        xml::save(fs, path, &self.root)
    }
}

/// Ensure the dummy network sources are registered in `sources_path`.
///
/// Returns how many sources were added.
pub fn sources_xml(fs: &dyn FileSystem, sources_path: &Path) -> Result<usize> {
    let mut doc = SourcesDocument::load(fs, sources_path);
    doc.ensure_video_section();

    let added = DUMMY_SOURCE_PATHS
        .iter()
        .filter(|path| doc.add_video_source(DUMMY_SOURCE_NAME, path))
        .count();

    doc.save(fs, sources_path)?;
    info!(
        "Registered {} dummy sources in {}",
        added,
        sources_path.display()
    );
    Ok(added)
}
