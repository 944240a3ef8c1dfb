//! Host filesystem access

#[cfg(test)]
pub mod fake;

use provision::{Error, Filesystem, Result};
use std::path::Path;

/// Reads host state through `std::fs`
pub struct HostFs;

impl Filesystem for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
