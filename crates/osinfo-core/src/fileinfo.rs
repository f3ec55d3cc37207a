//! File metadata query.
//!
//! Captures `stat(2)` (or `lstat(2)`) output once and renders it into a
//! [`FileReport`]: size, permission string, resolved owner/group names and
//! local modification time.

use crate::format::{format_permissions, format_timestamp, PermissionString};
use crate::identity::NameResolver;
use osinfo_common::{Error, Result};
use serde::Serialize;
use std::io::{self, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw metadata for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Modification time, epoch seconds.
    pub mtime: i64,
}

impl FileMetadata {
    /// Stat `path`. With `follow_symlinks == false` the link itself is
    /// described instead of its target.
    pub fn capture(path: impl AsRef<Path>, follow_symlinks: bool) -> Result<Self> {
        let path = path.as_ref();
        let (op, meta) = if follow_symlinks {
            ("stat", std::fs::metadata(path))
        } else {
            ("lstat", std::fs::symlink_metadata(path))
        };
        let meta = meta.map_err(|e| Error::query(op, e))?;

        debug!(path = %path.display(), mode = meta.mode(), "captured file metadata");

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: meta.size(),
            mode: meta.mode(),
            uid: meta.uid(),
            gid: meta.gid(),
            mtime: meta.mtime(),
        })
    }

    pub fn permissions(&self) -> PermissionString {
        format_permissions(self.mode)
    }
}

/// Human-facing view of [`FileMetadata`].
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub size: u64,
    pub permissions: PermissionString,
    pub owner: String,
    pub group: String,
    pub modified: String,
}

impl FileReport {
    pub fn build(meta: &FileMetadata, resolver: &impl NameResolver) -> Self {
        FileReport {
            path: meta.path.display().to_string(),
            size: meta.size,
            permissions: meta.permissions(),
            owner: resolver.user(meta.uid).name,
            group: resolver.group(meta.gid).name,
            modified: format_timestamp(meta.mtime).unwrap_or_else(|| meta.mtime.to_string()),
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "File: {}", self.path)?;
        writeln!(out, "Size: {} bytes", self.size)?;
        writeln!(out, "Permissions: {}", self.permissions)?;
        writeln!(out, "Owner: {}", self.owner)?;
        writeln!(out, "Group: {}", self.group)?;
        writeln!(out, "Last modified: {}", self.modified)
    }
}

/// Capture and render in one step.
pub fn query_file(
    path: impl AsRef<Path>,
    follow_symlinks: bool,
    resolver: &impl NameResolver,
) -> Result<FileReport> {
    let meta = FileMetadata::capture(path, follow_symlinks)?;
    Ok(FileReport::build(&meta, resolver))
}
