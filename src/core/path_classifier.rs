/*
 * Decides whether a reference path points at usable media. The check is made
 * against the file system at call time and nothing is cached, because a relink
 * or an external copy may change what is on disk between two scans.
 */
use super::file_system;
use super::formats::ExtensionSet;
use super::sequence;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClassification {
    Valid,
    MissingFile,
    DirectoryNoValidContent,
}

// An unreadable directory is treated as empty.
fn readable_entries(directory: &Path) -> Vec<walkdir::DirEntry> {
    file_system::list_directory(directory).unwrap_or_else(|e| {
        log::warn!("PathClassifier: Could not list {directory:?}: {e}");
        Vec::new()
    })
}

pub fn classify(path: &str, allowed_extensions: &ExtensionSet) -> PathClassification {
    if path.is_empty() {
        return PathClassification::MissingFile;
    }
    let candidate = Path::new(path);

    if !candidate.exists() {
        if sequence_template_exists(candidate) {
            return PathClassification::Valid;
        }
        log::debug!("PathClassifier: {path:?} does not exist.");
        return PathClassification::MissingFile;
    }

    if candidate.is_dir() {
        let has_valid_content = readable_entries(candidate)
            .iter()
            .any(|entry| allowed_extensions.matches_path(Path::new(entry.file_name())));
        if !has_valid_content {
            log::debug!("PathClassifier: Directory {path:?} holds no recognised media.");
            return PathClassification::DirectoryNoValidContent;
        }
    }

    PathClassification::Valid
}

/*
 * A `base_####.ext` template names no file itself; it exists when at least one
 * frame of the sequence is present in its directory.
 */
fn sequence_template_exists(template: &Path) -> bool {
    let Some(template_name) = template.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !sequence::is_template_name(template_name) {
        return false;
    }
    let Some(directory) = template.parent().filter(|d| d.is_dir()) else {
        return false;
    };
    readable_entries(directory).iter().any(|entry| {
        entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| sequence::template_matches(template_name, name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn image_extensions() -> ExtensionSet {
        ExtensionSet::new([".exr", ".dpx", ".png"])
    }

    #[test]
    fn test_empty_path_is_missing() {
        assert_eq!(
            classify("", &image_extensions()),
            PathClassification::MissingFile
        );
    }

    #[test]
    fn test_nonexistent_path_is_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ghost.exr");
        assert_eq!(
            classify(&path.to_string_lossy(), &image_extensions()),
            PathClassification::MissingFile
        );
    }

    #[test]
    fn test_existing_file_is_valid_regardless_of_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        File::create(&path).unwrap();
        assert_eq!(
            classify(&path.to_string_lossy(), &image_extensions()),
            PathClassification::Valid
        );
    }

    #[test]
    fn test_directory_without_media_is_location_error() {
        // Arrange
        let dir = tempdir().unwrap();
        File::create(dir.path().join("readme.txt")).unwrap();
        File::create(dir.path().join(".exr")).unwrap();

        // Act
        let result = classify(&dir.path().to_string_lossy(), &image_extensions());

        // Assert
        assert_eq!(result, PathClassification::DirectoryNoValidContent);
    }

    #[test]
    fn test_directory_with_media_is_valid_case_insensitive() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("plate_0001.EXR")).unwrap();
        assert_eq!(
            classify(&dir.path().to_string_lossy(), &image_extensions()),
            PathClassification::Valid
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_template_with_linked_frames_is_valid() {
        // Arrange
        let dir = tempdir().unwrap();
        let cache = dir.path().join("cache");
        let shot = dir.path().join("shot");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::create_dir_all(&shot).unwrap();
        File::create(cache.join("render_0001.exr")).unwrap();
        std::os::unix::fs::symlink(cache.join("render_0001.exr"), shot.join("render_0001.exr"))
            .unwrap();

        // Act
        let result = classify(
            &shot.join("render_####.exr").to_string_lossy(),
            &image_extensions(),
        );

        // Assert
        assert_eq!(result, PathClassification::Valid);
    }

    #[test]
    fn test_classification_is_stable_without_mutation() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.png")).unwrap();
        let path = dir.path().to_string_lossy().into_owned();
        let first = classify(&path, &image_extensions());
        let second = classify(&path, &image_extensions());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sequence_template_with_members_is_valid() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("render_0001.exr")).unwrap();
        File::create(dir.path().join("render_0002.exr")).unwrap();
        let template = dir.path().join("render_####.exr");
        assert_eq!(
            classify(&template.to_string_lossy(), &image_extensions()),
            PathClassification::Valid
        );
    }

    #[test]
    fn test_sequence_template_without_members_is_missing() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("other_0001.exr")).unwrap();
        let template = dir.path().join("render_####.exr");
        assert_eq!(
            classify(&template.to_string_lossy(), &image_extensions()),
            PathClassification::MissingFile
        );
    }
}
