/*
 * Media format families recognised by the asset manager. An `ExtensionSet`
 * holds lower-cased extensions with a leading dot so that membership checks
 * are case-insensitive no matter how the caller spells the extension.
 * `MediaFormats` groups the four families used by relinking (2D and 3D) and by
 * version promotion (video and image sequences).
 */
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExtensionSet {
    extensions: BTreeSet<String>,
}

fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().trim_start_matches('.');
    format!(".{}", trimmed.to_lowercase())
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ExtensionSet {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| e.len() > 1)
                .collect(),
        }
    }

    pub fn union(&self, other: &ExtensionSet) -> ExtensionSet {
        ExtensionSet {
            extensions: self.extensions.union(&other.extensions).cloned().collect(),
        }
    }

    /* Matches an extension given with or without its leading dot. */
    pub fn contains(&self, extension: &str) -> bool {
        if extension.trim().trim_start_matches('.').is_empty() {
            return false;
        }
        self.extensions.contains(&normalize_extension(extension))
    }

    /*
     * Checks the extension of the last component of `path`. Names without an
     * extension (including dot-files such as `.hidden`) never match.
     */
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.contains(e))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /* Renders a picker filter such as `Supported Files (*.abc *.exr)`. */
    pub fn file_filter_label(&self, title: &str) -> String {
        let patterns: Vec<String> = self.iter().map(|e| format!("*{e}")).collect();
        format!("{title} ({})", patterns.join(" "))
    }
}

impl From<Vec<String>> for ExtensionSet {
    fn from(extensions: Vec<String>) -> Self {
        ExtensionSet::new(extensions)
    }
}

impl From<ExtensionSet> for Vec<String> {
    fn from(set: ExtensionSet) -> Self {
        set.extensions.into_iter().collect()
    }
}

/*
 * The extension families the engine works with. Relinking accepts the union
 * of the 2D (raster and video) and 3D (geometry) families; promotion looks
 * for video files first-class and treats image files as frame sequences.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaFormats {
    pub relink_2d: ExtensionSet,
    pub relink_3d: ExtensionSet,
    pub promotion_video: ExtensionSet,
    pub promotion_image: ExtensionSet,
}

impl MediaFormats {
    pub fn relink_extensions(&self) -> ExtensionSet {
        self.relink_2d.union(&self.relink_3d)
    }
}

impl Default for MediaFormats {
    fn default() -> Self {
        MediaFormats {
            relink_2d: ExtensionSet::new([
                ".exr", ".dpx", ".tif", ".tiff", ".png", ".jpg", ".jpeg", ".tga", ".mov", ".mp4",
                ".avi",
            ]),
            relink_3d: ExtensionSet::new([".abc", ".fbx", ".obj", ".gltf", ".glb"]),
            promotion_video: ExtensionSet::new([
                ".mov", ".mp4", ".avi", ".mpg", ".mpeg", ".wmv", ".mkv", ".flv", ".webm",
            ]),
            promotion_image: ExtensionSet::new([
                ".exr", ".dpx", ".tif", ".tiff", ".png", ".jpg", ".jpeg", ".tga",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_case_insensitive_and_dot_agnostic() {
        let set = ExtensionSet::new(["EXR", ".Png"]);
        assert!(set.contains("exr"));
        assert!(set.contains(".EXR"));
        assert!(set.contains("png"));
        assert!(!set.contains("jpg"));
        assert!(!set.contains(""));
        assert!(!set.contains("."));
    }

    #[test]
    fn test_matches_path_ignores_dot_files() {
        let set = ExtensionSet::new([".hidden", ".exr"]);
        assert!(set.matches_path(Path::new("/shots/a/plate.0001.EXR")));
        assert!(!set.matches_path(Path::new("/shots/a/.hidden")));
        assert!(!set.matches_path(Path::new("/shots/a/no_extension")));
    }

    #[test]
    fn test_relink_extensions_is_union_of_2d_and_3d() {
        let formats = MediaFormats::default();
        let union = formats.relink_extensions();
        assert!(union.contains("mov"));
        assert!(union.contains("abc"));
        assert!(!union.contains("mkv"), "mkv is only a promotion format");
    }

    #[test]
    fn test_file_filter_label_lists_patterns() {
        let set = ExtensionSet::new(["obj", "abc"]);
        assert_eq!(
            set.file_filter_label("Supported Files"),
            "Supported Files (*.abc *.obj)"
        );
    }

    #[test]
    fn test_media_formats_serde_uses_plain_lists() {
        let json = r#"{ "relink_3d": ["ABC"] }"#;
        let formats: MediaFormats = serde_json::from_str(json).unwrap();
        assert!(formats.relink_3d.contains(".abc"));
        assert!(!formats.relink_3d.contains(".fbx"));
        assert_eq!(formats.promotion_video, MediaFormats::default().promotion_video);
    }
}
