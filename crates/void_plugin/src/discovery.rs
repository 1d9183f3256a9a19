//! Plugin file discovery and naming
//!
//! A plugin is any shared library in the plugin directory. Its name is the
//! file stem with the platform library prefix removed, and its entry point is
//! `Load<Name>PluginX<Bits>` where `<Bits>` is the target pointer width.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// File extensions recognized as shared libraries
pub const SHARED_LIBRARY_EXTENSIONS: &[&str] = &["dll", "so", "dylib"];

/// Prefix the platform puts in front of library file names
#[cfg(windows)]
pub const LIBRARY_PREFIX: &str = "";
#[cfg(not(windows))]
pub const LIBRARY_PREFIX: &str = "lib";

/// Pointer width of the running target, as used in entry point names
#[cfg(target_pointer_width = "64")]
pub const POINTER_BITS: &str = "64";
#[cfg(target_pointer_width = "32")]
pub const POINTER_BITS: &str = "32";

/// Check whether `path` names a shared library by its extension
pub fn is_shared_library(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SHARED_LIBRARY_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Derive the plugin name from a library path
pub fn plugin_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = if LIBRARY_PREFIX.is_empty() {
        stem
    } else {
        stem.strip_prefix(LIBRARY_PREFIX).unwrap_or(stem)
    };

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Name of the entry point a plugin called `name` exports
pub fn entry_symbol(name: &str) -> String {
    format!("Load{}PluginX{}", name, POINTER_BITS)
}

/// Shared libraries directly inside `dir`, sorted by path.
///
/// A missing directory yields no candidates.
pub fn list_libraries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        log::debug!("Plugin directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut libraries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_shared_library(&path) {
            libraries.push(path);
        }
    }
    libraries.sort();
    Ok(libraries)
}
