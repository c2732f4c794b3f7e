//! # svg-runtime-locate
//!
//! Find the PDF-to-SVG runtime bundle on disk so a host can boot it.
//!
//! The conversion runtime ships as a directory containing a `_framework/`
//! folder with the runtime loader and its boot configuration:
//!
//! ```text
//! runtime/
//!  └─ _framework/
//!      ├─ dotnet.js
//!      ├─ blazor.boot.json   ← boot configuration handed to the host
//!      └─ …assemblies…
//! ```
//!
//! ## How it works
//!
//! [`locate_runtime`] walks a fixed list of candidate roots and returns the
//! first one whose boot configuration exists:
//!
//! 1. An explicit directory passed by the caller.
//! 2. `PDF2SVG_RUNTIME_DIR`.
//! 3. `runtime/` next to the current executable (the deployed layout).
//! 4. [`runtime_home_dir`], i.e. `<data_local_dir>/pdf2svg/runtime`.
//!
//! Nothing is cached: every call searches again, so a bundle that is moved
//! or replaced between bootstraps is picked up on the next one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use svg_runtime_locate::{locate_runtime, RuntimeLocation};
//!
//! let location: RuntimeLocation = locate_runtime(None).expect("runtime bundle missing");
//! println!("booting from {}", location.boot_config.display());
//! ```
//!
//! ## Environment variable overrides
//!
//! - `PDF2SVG_RUNTIME_DIR` — path to a runtime bundle root; checked before the
//!   executable-relative and per-user locations.
//! - `PDF2SVG_RUNTIME_HOME` — override the per-user base directory.

use std::path::{Path, PathBuf};

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Folder inside a runtime root holding the loader and assemblies.
pub const FRAMEWORK_DIR: &str = "_framework";

/// Boot configuration file name inside [`FRAMEWORK_DIR`].
pub const BOOT_CONFIG_FILE: &str = "blazor.boot.json";

/// Directory name of a bundle deployed next to the executable.
pub const RUNTIME_DIR_NAME: &str = "runtime";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating a runtime bundle.
#[derive(Error, Debug)]
pub enum LocateError {
    /// No candidate root contained a boot configuration.
    #[error("PDF-to-SVG runtime bundle not found; searched: {}", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// An explicit root was given but its boot configuration is missing.
    #[error("'{}' is not a runtime bundle: missing {}", .root.display(), .boot_config.display())]
    MissingBootConfig { root: PathBuf, boot_config: PathBuf },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<no candidates>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Location ─────────────────────────────────────────────────────────────────

/// A runtime bundle on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLocation {
    /// Bundle root, e.g. `./runtime`.
    pub root: PathBuf,
    /// `<root>/_framework`.
    pub framework_dir: PathBuf,
    /// `<root>/_framework/blazor.boot.json`.
    pub boot_config: PathBuf,
}

impl RuntimeLocation {
    /// Derive the bundle layout for `root` without touching the file system.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let framework_dir = root.join(FRAMEWORK_DIR);
        let boot_config = framework_dir.join(BOOT_CONFIG_FILE);
        Self {
            root,
            framework_dir,
            boot_config,
        }
    }

    /// `true` when the boot configuration exists on disk.
    pub fn exists(&self) -> bool {
        self.boot_config.is_file()
    }
}

// ── Directory resolution ─────────────────────────────────────────────────────

/// Returns the per-user runtime directory.
///
/// Default locations:
/// - **macOS**: `~/Library/Application Support/pdf2svg/runtime/`
/// - **Linux**: `~/.local/share/pdf2svg/runtime/`
/// - **Windows**: `%LOCALAPPDATA%\pdf2svg\runtime\`
///
/// Override the base by setting `PDF2SVG_RUNTIME_HOME`.
pub fn runtime_home_dir() -> PathBuf {
    if let Ok(override_dir) = std::env::var("PDF2SVG_RUNTIME_HOME") {
        return PathBuf::from(override_dir).join(RUNTIME_DIR_NAME);
    }

    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("pdf2svg").join(RUNTIME_DIR_NAME)
}

/// Candidate roots searched when no explicit directory is given, in order.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);

    if let Ok(env_dir) = std::env::var("PDF2SVG_RUNTIME_DIR") {
        if !env_dir.is_empty() {
            candidates.push(PathBuf::from(env_dir));
        }
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(RUNTIME_DIR_NAME));
    }

    candidates.push(runtime_home_dir());
    candidates
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Resolves the runtime bundle.
///
/// With `explicit = Some(dir)` only that directory is considered and a
/// missing boot configuration is reported as
/// [`LocateError::MissingBootConfig`]. With `None`, the default candidates
/// are searched on every call.
pub fn locate_runtime(explicit: Option<&Path>) -> Result<RuntimeLocation, LocateError> {
    if let Some(root) = explicit {
        let location = RuntimeLocation::from_root(root);
        if location.exists() {
            return Ok(location);
        }
        return Err(LocateError::MissingBootConfig {
            root: location.root,
            boot_config: location.boot_config,
        });
    }

    let candidates = default_candidates();
    search(&candidates).ok_or(LocateError::NotFound {
        searched: candidates,
    })
}

fn search(candidates: &[PathBuf]) -> Option<RuntimeLocation> {
    candidates
        .iter()
        .map(|root| RuntimeLocation::from_root(root))
        .find(RuntimeLocation::exists)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_in(dir: &Path) -> RuntimeLocation {
        let location = RuntimeLocation::from_root(dir);
        std::fs::create_dir_all(&location.framework_dir).unwrap();
        std::fs::write(&location.boot_config, b"{}").unwrap();
        location
    }

    #[test]
    fn layout_is_derived_from_root() {
        let loc = RuntimeLocation::from_root("/opt/app/runtime");
        assert_eq!(loc.framework_dir, PathBuf::from("/opt/app/runtime/_framework"));
        assert_eq!(
            loc.boot_config,
            PathBuf::from("/opt/app/runtime/_framework/blazor.boot.json")
        );
    }

    #[test]
    fn explicit_root_with_boot_config_resolves() {
        let tmp = tempfile::tempdir().unwrap();
        let expected = bundle_in(tmp.path());
        let found = locate_runtime(Some(tmp.path())).unwrap();
        assert_eq!(found, expected);
    }

    #[test]
    fn explicit_root_without_boot_config_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = locate_runtime(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, LocateError::MissingBootConfig { .. }));
        assert!(err.to_string().contains(BOOT_CONFIG_FILE));
    }

    #[test]
    fn search_skips_candidates_without_bundle() {
        let empty = tempfile::tempdir().unwrap();
        let full = tempfile::tempdir().unwrap();
        bundle_in(full.path());
        let found = search(&[empty.path().to_path_buf(), full.path().to_path_buf()]).unwrap();
        assert_eq!(found.root, full.path());
    }

    #[test]
    fn not_found_lists_searched_paths() {
        let err = LocateError::NotFound {
            searched: vec![PathBuf::from("/a/runtime"), PathBuf::from("/b/runtime")],
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/runtime, /b/runtime"), "got: {msg}");
    }

    #[test]
    fn moved_bundle_is_found_again() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        let old_location = bundle_in(old.path());

        std::env::set_var("PDF2SVG_RUNTIME_DIR", old.path());
        let first = locate_runtime(None);

        std::fs::remove_file(&old_location.boot_config).unwrap();
        bundle_in(new.path());
        std::env::set_var("PDF2SVG_RUNTIME_DIR", new.path());
        let second = locate_runtime(None);
        std::env::remove_var("PDF2SVG_RUNTIME_DIR");

        assert_eq!(first.unwrap().root, old.path());
        assert_eq!(second.unwrap().root, new.path());
    }

    #[test]
    fn runtime_home_override_via_env() {
        std::env::set_var("PDF2SVG_RUNTIME_HOME", "/tmp/test_pdf2svg_override");
        let d = runtime_home_dir();
        std::env::remove_var("PDF2SVG_RUNTIME_HOME");
        assert_eq!(d, PathBuf::from("/tmp/test_pdf2svg_override/runtime"));
    }
}
