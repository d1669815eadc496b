//! Temporary geometry directories.
//!
//! Mirrors the static resource layout: `<root>/<group>/<name>.geojson`.

use std::path::Path;
use tempfile::TempDir;

/// A throwaway geometry root removed when dropped.
pub struct GeoDir {
    dir: TempDir,
}

impl GeoDir {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<group>/<name>.geojson`.
    pub fn write(&self, group: &str, name: &str, contents: &str) -> std::io::Result<()> {
        let group_dir = self.dir.path().join(group);
        std::fs::create_dir_all(&group_dir)?;
        std::fs::write(group_dir.join(format!("{}.geojson", name)), contents)
    }
}
