//! Typed JSON reads and atomic JSON writes.

use crate::error::{FsError, FsResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Reads and deserializes a JSON file.
///
/// # Errors
///
/// - [`FsError::NotFound`] if the path does not exist
/// - [`FsError::PermissionDenied`] if the OS refuses access
/// - [`FsError::Malformed`] if the content is not valid JSON for `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> FsResult<T> {
    let bytes = fs::read(path).map_err(|e| FsError::from_read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| FsError::Malformed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads a JSON file as an untyped [`serde_json::Value`].
///
/// Used at migration boundaries where the stored shape is not known until
/// its version field has been inspected.
pub fn read_json_value(path: &Path) -> FsResult<serde_json::Value> {
    read_json(path)
}

/// Serializes `value` pretty-printed and writes it to `path` atomically.
///
/// Missing parent directories are created. The content is written to a
/// temporary file in the destination directory, synced to disk, and renamed
/// over the destination; the rename is the atomic boundary. On Unix the
/// parent directory is fsynced afterwards so the rename itself is durable.
///
/// # Errors
///
/// Returns [`FsError::WriteFailed`] if any commit step fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> FsResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FsError::write_failed(path, e))?;
    }

    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| {
        FsError::write_failed(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    bytes.push(b'\n');

    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path).map_err(|e| FsError::write_failed(path, e))?;
    file.write_all(&bytes)
        .map_err(|e| FsError::write_failed(path, e))?;
    file.sync_all().map_err(|e| FsError::write_failed(path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| FsError::write_failed(path, e))?;

    if let Some(parent) = path.parent() {
        sync_directory(parent).map_err(|e| FsError::write_failed(path, e))?;
    }

    Ok(())
}

/// Removes a file, treating "already absent" as success.
pub fn remove_file_if_exists(path: &Path) -> FsResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FsError::from_read(path, e)),
    }
}

/// Recursively copies a directory tree.
///
/// Missing source directories are skipped rather than reported, so callers
/// can copy an optional layout (for example an entity directory that has
/// never held a document).
pub fn copy_tree(src: &Path, dst: &Path) -> FsResult<()> {
    if !src.exists() {
        return Ok(());
    }
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Returns the temporary path used for the atomic write of `path`.
fn temp_path_for(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| std::ffi::OsString::from("file"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Fsyncs a directory so a preceding rename is durable.
#[cfg(unix)]
fn sync_directory(path: &Path) -> std::io::Result<()> {
    let dir = File::open(path)?;
    dir.sync_all()
}

/// Windows NTFS journaling covers metadata durability; directory fsync is
/// not supported there.
#[cfg(not(unix))]
fn sync_directory(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        name: String,
        count: u32,
    }

    fn payload() -> Payload {
        Payload {
            name: "alpha".into(),
            count: 3,
        }
    }

    #[test]
    fn round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &payload()).unwrap();
        let back: Payload = read_json(&path).unwrap();
        assert_eq!(back, payload());
    }

    #[test]
    fn output_is_pretty_printed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &payload()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"name\""));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let result: FsResult<Payload> = read_json(&path);
        assert!(matches!(result, Err(FsError::NotFound { .. })));
    }

    #[test]
    fn garbage_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result: FsResult<Payload> = read_json(&path);
        assert!(matches!(result, Err(FsError::Malformed { .. })));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        let result: FsResult<Payload> = read_json(&path);
        assert!(matches!(result, Err(FsError::Malformed { .. })));
    }

    #[test]
    fn parents_created_recursively() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("doc.json");

        write_json(&path, &payload()).unwrap();
        assert!(path.exists());

        // Idempotent on rewrite.
        write_json(&path, &payload()).unwrap();
    }

    #[test]
    fn overwrite_replaces_whole_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &payload()).unwrap();
        let updated = Payload {
            name: "beta".into(),
            count: 9,
        };
        write_json(&path, &updated).unwrap();

        let back: Payload = read_json(&path).unwrap();
        assert_eq!(back, updated);
    }

    #[test]
    fn interrupted_write_leaves_previous_file_intact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        write_json(&path, &payload()).unwrap();

        // Simulate a crash before the rename: a half-written temp file is
        // sitting next to the destination.
        std::fs::write(temp_path_for(&path), b"{ \"name\": \"trunc").unwrap();

        let back: Payload = read_json(&path).unwrap();
        assert_eq!(back, payload());
    }

    #[test]
    fn untyped_read_preserves_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"{\"version\": \"0.9.0\", \"extra\": true}").unwrap();

        let value = read_json_value(&path).unwrap();
        assert_eq!(value["version"], "0.9.0");
        assert_eq!(value["extra"], true);
    }

    #[test]
    fn remove_if_exists_reports_presence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");

        assert!(!remove_file_if_exists(&path).unwrap());
        write_json(&path, &payload()).unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn copy_tree_recurses() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");

        write_json(&src.join("top.json"), &payload()).unwrap();
        write_json(&src.join("2024").join("nested.json"), &payload()).unwrap();

        copy_tree(&src, &dst).unwrap();

        let top: Payload = read_json(&dst.join("top.json")).unwrap();
        let nested: Payload = read_json(&dst.join("2024").join("nested.json")).unwrap();
        assert_eq!(top, payload());
        assert_eq!(nested, payload());
    }

    #[test]
    fn copy_tree_missing_source_is_ok() {
        let dir = tempdir().unwrap();
        copy_tree(&dir.path().join("nope"), &dir.path().join("dst")).unwrap();
        assert!(!dir.path().join("dst").exists());
    }
}
