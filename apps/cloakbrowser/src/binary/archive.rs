//! Archive extraction for downloaded Chromium builds.
//!
//! Release archives are gzip-compressed tarballs. Extraction always starts
//! from an empty version directory, refuses entries that could land outside
//! it, and flattens archives that wrap everything in one top-level folder.

use std::fs::File;
use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, info, warn};

use crate::errors::{IoContext, Result};

/// Extracts a tar.gz archive into `dest_dir`, replacing whatever was there.
///
/// Entries with absolute paths, `..` segments, or link types are skipped
/// and logged as suspicious. If the result is a single directory, its
/// children are hoisted into `dest_dir`. Finally the executable bit is set
/// on `binary_path` if that file exists; checking that it does is left to
/// the caller.
///
/// # Errors
///
/// Returns a `Filesystem` error if:
/// - The archive cannot be opened or read
/// - The old directory cannot be removed
/// - Directory or file creation fails
/// - Permissions cannot be set
pub fn extract_archive(archive_path: &Path, dest_dir: &Path, binary_path: &Path) -> Result<()> {
    info!("Extracting to {}", dest_dir.display());

    if dest_dir.exists() {
        std::fs::remove_dir_all(dest_dir).fs_context("Failed to remove directory", dest_dir)?;
    }
    std::fs::create_dir_all(dest_dir).fs_context("Failed to create directory", dest_dir)?;

    unpack_entries(archive_path, dest_dir)?;
    flatten_single_subdir(dest_dir)?;

    if binary_path.is_file() {
        set_executable(binary_path)?;
        info!("Binary ready: {}", binary_path.display());
    }

    Ok(())
}

fn unpack_entries(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path).fs_context("Failed to open archive", archive_path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    for entry in archive
        .entries()
        .fs_context("Failed to read tar entries", archive_path)?
    {
        let mut entry = entry.fs_context("Failed to read tar entry", archive_path)?;
        let entry_path = entry
            .path()
            .fs_context("Invalid entry path in", archive_path)?
            .into_owned();

        if !is_safe_relative(&entry_path) {
            warn!(
                "Skipping suspicious archive entry with absolute or parent path: {}",
                entry_path.display()
            );
            continue;
        }

        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            warn!("Skipping link in archive: {}", entry_path.display());
            continue;
        }

        let output_path = dest_dir.join(&entry_path);

        if entry_type.is_dir() {
            std::fs::create_dir_all(&output_path)
                .fs_context("Failed to create directory", &output_path)?;
        } else if entry_type.is_file() {
            if let Some(parent) = output_path.parent() {
                std::fs::create_dir_all(parent).fs_context("Failed to create directory", parent)?;
            }
            entry
                .unpack(&output_path)
                .fs_context("Failed to extract", &output_path)?;
        } else {
            debug!(
                "Skipping unsupported archive entry type {:?}: {}",
                entry_type,
                entry_path.display()
            );
        }
    }

    Ok(())
}

/// Accepts only paths made of plain names (and `.`).
fn is_safe_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Hoists the children of a lone top-level directory into `dest_dir`.
///
/// The wrapper is renamed aside first so a child sharing its name
/// (e.g. `chrome/chrome`) can still be moved up.
fn flatten_single_subdir(dest_dir: &Path) -> Result<()> {
    let entries: Vec<_> = std::fs::read_dir(dest_dir)
        .fs_context("Failed to read directory", dest_dir)?
        .collect::<std::io::Result<_>>()
        .fs_context("Failed to read directory", dest_dir)?;

    let [only] = entries.as_slice() else {
        return Ok(());
    };
    let file_type = only
        .file_type()
        .fs_context("Failed to inspect", &only.path())?;
    if !file_type.is_dir() {
        return Ok(());
    }

    let wrapper = only.path();
    debug!("Flattening single subdirectory: {}", wrapper.display());

    let aside = dest_dir.join(format!(
        ".flatten-{}",
        only.file_name().to_string_lossy()
    ));
    std::fs::rename(&wrapper, &aside).fs_context("Failed to rename", &wrapper)?;

    for child in std::fs::read_dir(&aside).fs_context("Failed to read directory", &aside)? {
        let child = child.fs_context("Failed to read directory", &aside)?;
        let target = dest_dir.join(child.file_name());
        std::fs::rename(child.path(), &target).fs_context("Failed to move", &child.path())?;
    }

    std::fs::remove_dir(&aside).fs_context("Failed to remove directory", &aside)?;
    Ok(())
}

/// Adds the executable bits to `path` (Unix only).
///
/// # Errors
///
/// Returns a `Filesystem` error if metadata cannot be read or permissions
/// cannot be set.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .fs_context("Failed to get metadata", path)?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms).fs_context("Failed to set permissions", path)
}

/// Sets executable permissions (no-op on non-Unix platforms).
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
