use std::io;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/*
 * Directory enumeration shared by the classifier and the version resolver.
 * Only the immediate entries of a directory are ever needed, so the walker is
 * pinned to depth one and sorted by file name to give a stable enumeration
 * order across platforms. Symbolic links are resolved to their targets.
 */

#[derive(Debug)]
pub enum FileSystemError {
    Io(io::Error),
    Walk(walkdir::Error),
    InvalidPath(PathBuf),
}

impl From<io::Error> for FileSystemError {
    fn from(err: io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

impl From<walkdir::Error> for FileSystemError {
    fn from(err: walkdir::Error) -> Self {
        FileSystemError::Walk(err)
    }
}

impl std::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {e}"),
            FileSystemError::Walk(e) => write!(f, "Directory listing error: {e}"),
            FileSystemError::InvalidPath(p) => write!(f, "Not a directory: {p:?}"),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            FileSystemError::Walk(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FileSystemError>;

/*
 * Lists the immediate entries (files and directories) of `directory`, sorted
 * by file name. Fails if `directory` is not a readable directory; individual
 * entries that cannot be read are logged and skipped.
 */
pub fn list_directory(directory: &Path) -> Result<Vec<DirEntry>> {
    if !directory.is_dir() {
        return Err(FileSystemError::InvalidPath(directory.to_path_buf()));
    }
    // Opening the directory up front surfaces permission errors, which the
    // walker would otherwise report as a skipped entry.
    std::fs::read_dir(directory)?;

    let mut entries = Vec::new();
    // Links are followed so a linked version directory or frame reports the
    // type of its target. Dangling links surface as skipped entries below.
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry_result in walker {
        match entry_result {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                log::warn!("FileSystem: Skipping unreadable entry under {directory:?}: {e}");
            }
        }
    }
    log::trace!(
        "FileSystem: Listed {} entries in {directory:?}.",
        entries.len()
    );
    Ok(entries)
}

/* Immediate subdirectories of `directory`, sorted by name. */
pub fn list_subdirectories(directory: &Path) -> Result<Vec<DirEntry>> {
    Ok(list_directory(directory)?
        .into_iter()
        .filter(|entry| entry.file_type().is_dir())
        .collect())
}

/* Lossy UTF-8 file name of a directory entry. */
pub fn entry_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

/* Renders a path with forward slashes, the form written back to the host. */
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
