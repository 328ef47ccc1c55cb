use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/*
 * Identifies a scene-graph node by its name. Names are unique within the host
 * at any instant, so the registry keys its records on this value.
 */
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        NodeId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Host class tags that reference external media.
const MEDIA_REFERENCE_CLASSES: &[&str] = &["Read"];

/*
 * What a node means to the asset manager, resolved once per scan from the
 * host's class tag.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    MediaReference,
    Other,
}

impl NodeRole {
    pub fn from_class(class: &str) -> Self {
        if MEDIA_REFERENCE_CLASSES.contains(&class) {
            NodeRole::MediaReference
        } else {
            NodeRole::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStatus {
    UpToDate,
    Missing,
    LocationError,
    Relinked,
}

impl LinkStatus {
    /* Broken records are the only ones offered a new path during a sweep. */
    pub fn is_broken(self) -> bool {
        matches!(self, LinkStatus::Missing | LinkStatus::LocationError)
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::UpToDate => "Up-to-date",
            LinkStatus::Missing => "Missing",
            LinkStatus::LocationError => "Location Error",
            LinkStatus::Relinked => "Relinked",
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub first: i64,
    pub last: i64,
}

impl FrameRange {
    pub fn new(first: i64, last: i64) -> Self {
        FrameRange { first, last }
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

pub const UNKNOWN_COLORSPACE: &str = "Unknown";
pub const ABSENT_CELL: &str = "N/A";

/*
 * One tracked media reference. `asset_name` and `asset_type` are derived from
 * `path` and are refreshed whenever the path changes through `set_path`.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub node_id: NodeId,
    pub asset_name: Option<String>,
    pub asset_type: Option<String>,
    pub path: String,
    pub status: LinkStatus,
    pub colorspace: String,
    pub frame_range: Option<FrameRange>,
}

impl AssetRecord {
    pub fn new(
        node_id: NodeId,
        path: String,
        status: LinkStatus,
        colorspace: Option<String>,
        frame_range: Option<FrameRange>,
    ) -> Self {
        let mut record = AssetRecord {
            node_id,
            asset_name: None,
            asset_type: None,
            path: String::new(),
            status,
            colorspace: colorspace.unwrap_or_else(|| UNKNOWN_COLORSPACE.to_string()),
            frame_range,
        };
        record.set_path(path);
        record
    }

    pub fn set_path(&mut self, path: String) {
        self.asset_name = derive_asset_name(&path);
        self.asset_type = derive_asset_type(&path);
        self.path = path;
    }

    pub fn to_row(&self) -> ReportRow {
        let cell = |value: Option<String>| value.unwrap_or_else(|| ABSENT_CELL.to_string());
        ReportRow([
            self.node_id.to_string(),
            cell(self.asset_name.clone()),
            cell(self.asset_type.clone()),
            self.path.clone(),
            self.status.label().to_string(),
            self.colorspace.clone(),
            cell(self.frame_range.map(|r| r.to_string())),
        ])
    }
}

/* File stem of the last path component, accepting either separator. */
fn derive_asset_name(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let file_name = normalized.rsplit('/').next().unwrap_or("");
    if file_name.is_empty() {
        return None;
    }
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

/* Text after the last `.`; the whole path when there is none. */
fn derive_asset_type(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    path.rsplit('.').next().map(str::to_string)
}

pub const REPORT_COLUMNS: [&str; 7] = [
    "Node",
    "Asset",
    "Type",
    "Path",
    "Status",
    "Colorspace",
    "Range",
];

/* Column order: node, asset, type, path, status, colorspace, range. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow(pub [String; 7]);

impl ReportRow {
    pub fn node(&self) -> &str {
        &self.0[0]
    }

    pub fn status(&self) -> &str {
        &self.0[4]
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }
}
