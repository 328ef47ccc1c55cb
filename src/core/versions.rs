/*
 * Resolution of sibling version directories. An asset lives in a directory
 * such as `.../plate/v002/`; its siblings (`v001`, `v003`, ...) are alternate
 * revisions. This module enumerates those siblings in numeric order and turns
 * a chosen one into a concrete reference: a video file, or a frame sequence
 * template with its frame range.
 */
use super::file_system::{self, FileSystemError};
use super::formats::MediaFormats;
use super::models::FrameRange;
use super::sequence::{self, FRAME_PLACEHOLDER_WIDTH};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum VersionError {
    NoParentDirectory(PathBuf),
    NoVersionsFound(PathBuf),
    FileSystem(FileSystemError),
}

impl From<FileSystemError> for VersionError {
    fn from(err: FileSystemError) -> Self {
        VersionError::FileSystem(err)
    }
}

impl std::fmt::Display for VersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionError::NoParentDirectory(p) => {
                write!(f, "Reference directory {p:?} has no parent asset directory")
            }
            VersionError::NoVersionsFound(p) => {
                write!(f, "No version directories found in {p:?}")
            }
            VersionError::FileSystem(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for VersionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VersionError::FileSystem(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VersionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDirectory {
    pub version_number: u64,
    pub absolute_path: PathBuf,
}

impl VersionDirectory {
    /* Label offered to the operator, e.g. `v3`. */
    pub fn label(&self) -> String {
        format!("v{}", self.version_number)
    }
}

/*
 * Parses a version directory name: exactly one leading non-digit character
 * followed by an unsigned integer (`v3`, `V012`).
 */
pub fn parse_version_number(directory_name: &str) -> Option<u64> {
    let mut chars = directory_name.chars();
    let prefix = chars.next()?;
    if prefix.is_ascii_digit() {
        return None;
    }
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/*
 * Lists the version directories next to `current_reference_directory`,
 * ascending by version number. Entries whose names do not parse are skipped.
 */
pub fn resolve_versions(current_reference_directory: &Path) -> Result<Vec<VersionDirectory>> {
    let parent_asset_directory = current_reference_directory
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| VersionError::NoParentDirectory(current_reference_directory.to_path_buf()))?;

    let mut versions: Vec<VersionDirectory> =
        file_system::list_subdirectories(parent_asset_directory)?
            .iter()
            .filter_map(|entry| {
                let name = file_system::entry_name(entry);
                match parse_version_number(&name) {
                    Some(version_number) => Some(VersionDirectory {
                        version_number,
                        absolute_path: entry.path().to_path_buf(),
                    }),
                    None => {
                        log::trace!("VersionResolver: Ignoring non-version directory '{name}'.");
                        None
                    }
                }
            })
            .collect();

    if versions.is_empty() {
        return Err(VersionError::NoVersionsFound(
            parent_asset_directory.to_path_buf(),
        ));
    }
    versions.sort_by_key(|v| v.version_number);
    log::debug!(
        "VersionResolver: Found {} versions under {parent_asset_directory:?}.",
        versions.len()
    );
    Ok(versions)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionResult {
    AlreadyCurrent,
    Promoted {
        new_path: String,
        /* `None` when the target is a single file and the range is untouched. */
        frame_range: Option<FrameRange>,
    },
    NoQualifyingMedia,
}

/*
 * Picks the media a reference should point at inside `version_directory`.
 *
 * The first entry (in file-name order) whose extension is a promotion video or
 * image format wins; later entries are ignored. Video files and image files
 * that are not sequence members are used verbatim. Sequence members become a
 * `base_####.ext` template whose range starts at the member's frame number and
 * ends at the number of entries in the directory.
 */
pub fn promote_to(
    current_reference_directory: &Path,
    version_directory: &VersionDirectory,
    formats: &MediaFormats,
) -> Result<PromotionResult> {
    if version_directory.absolute_path == current_reference_directory {
        log::debug!(
            "VersionResolver: {} is already the current version.",
            version_directory.label()
        );
        return Ok(PromotionResult::AlreadyCurrent);
    }

    let entries = file_system::list_directory(&version_directory.absolute_path)?;
    let entry_count = entries.len();

    for entry in &entries {
        let entry_path = entry.path();
        if formats.promotion_video.matches_path(entry_path) {
            return Ok(PromotionResult::Promoted {
                new_path: file_system::to_forward_slashes(entry_path),
                frame_range: None,
            });
        }
        if formats.promotion_image.matches_path(entry_path) {
            return Ok(promote_image(
                &version_directory.absolute_path,
                &file_system::entry_name(entry),
                entry_path,
                entry_count,
            ));
        }
    }

    log::info!(
        "VersionResolver: No promotable media in {:?}.",
        version_directory.absolute_path
    );
    Ok(PromotionResult::NoQualifyingMedia)
}

fn promote_image(
    directory: &Path,
    file_name: &str,
    entry_path: &Path,
    entry_count: usize,
) -> PromotionResult {
    match sequence::split_sequence_name(file_name) {
        Ok(descriptor) => {
            let new_path = sequence::build_template_path(
                &directory.to_string_lossy(),
                &descriptor.base_name,
                FRAME_PLACEHOLDER_WIDTH,
                &descriptor.extension,
            );
            let first = i64::try_from(descriptor.frame_number).unwrap_or(i64::MAX);
            let last = sequence_last_frame(entry_count);
            PromotionResult::Promoted {
                new_path,
                frame_range: Some(FrameRange::new(first, last)),
            }
        }
        Err(e) => {
            log::debug!("VersionResolver: {e}; promoting it as a single file.");
            PromotionResult::Promoted {
                new_path: file_system::to_forward_slashes(entry_path),
                frame_range: None,
            }
        }
    }
}

/*
 * Last frame of a promoted sequence. This is the total number of entries in
 * the version directory, not the number of sequence members.
 */
fn sequence_last_frame(directory_entry_count: usize) -> i64 {
    i64::try_from(directory_entry_count).unwrap_or(i64::MAX)
}
