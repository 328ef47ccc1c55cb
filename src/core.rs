/*
 * This module consolidates the platform-agnostic engine of the asset manager:
 * path classification, frame-sequence naming, version directory resolution,
 * the asset registry and relink engine, the host scene-graph contract with a
 * JSON-backed scene, the CSV report sink, and application configuration.
 */
pub mod config;
pub mod file_system;
pub mod formats;
pub mod host;
pub mod models;
pub mod path_classifier;
pub mod path_utils;
pub mod registry;
pub mod relink;
pub mod report;
pub mod scene_document;
pub mod sequence;
pub mod versions;

// Re-export key structures and enums
pub use formats::{ExtensionSet, MediaFormats};
pub use models::{AssetRecord, FrameRange, LinkStatus, NodeId, ReportRow};
pub use registry::AssetRegistry;

// Re-export host related items
pub use host::{
    AttributeValue, FILE_ATTRIBUTE, FIRST_FRAME_ATTRIBUTE, HostError, LAST_FRAME_ATTRIBUTE,
    SceneHostOperations,
};
pub use scene_document::SceneDocument;

// Re-export report related items
pub use report::{CoreReportWriter, ReportWriterOperations};

#[cfg(test)]
pub use report::ReportError;

// Re-export config related items
pub use config::{AppConfig, ConfigManagerOperations, CoreConfigManager};
