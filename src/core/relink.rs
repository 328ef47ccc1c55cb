/*
 * Manual repair of broken references. A single relink validates the candidate
 * path's extension and moves the record to `Relinked`; the sweep walks the
 * whole registry, re-checks every record against the file system and offers
 * a replacement path for each one that is broken.
 */
use super::formats::ExtensionSet;
use super::host::{FILE_ATTRIBUTE, HostError, SceneHostOperations};
use super::models::{AssetRecord, LinkStatus, NodeId};
use super::path_classifier::{self, PathClassification};
use super::registry::AssetRegistry;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelinkError {
    InvalidExtension(String),
}

impl fmt::Display for RelinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelinkError::InvalidExtension(path) => {
                write!(f, "'{path}' is not a supported 2D or 3D file type")
            }
        }
    }
}

impl std::error::Error for RelinkError {}

pub type Result<T> = std::result::Result<T, RelinkError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelinkedState {
    pub path: String,
    pub status: LinkStatus,
}

pub fn validate_candidate(candidate_path: &str, allowed_extensions: &ExtensionSet) -> Result<()> {
    if allowed_extensions.matches_path(Path::new(candidate_path)) {
        Ok(())
    } else {
        Err(RelinkError::InvalidExtension(candidate_path.to_string()))
    }
}

/*
 * Points `record` at `candidate_path`. On an extension mismatch the record is
 * left untouched. A successful relink always lands in `Relinked`; only a later
 * rescan can turn it into `UpToDate`.
 */
pub fn relink(
    record: &mut AssetRecord,
    candidate_path: &str,
    allowed_extensions: &ExtensionSet,
) -> Result<RelinkedState> {
    validate_candidate(candidate_path, allowed_extensions)?;
    log::info!(
        "RelinkEngine: {} relinked from {:?} to {candidate_path:?}",
        record.node_id,
        record.path
    );
    record.set_path(candidate_path.to_string());
    record.status = LinkStatus::Relinked;
    Ok(RelinkedState {
        path: record.path.clone(),
        status: record.status,
    })
}

/*
 * Re-checks a broken record against the file system, refining it between
 * `Missing` and `LocationError`. Any other status, and a path that now
 * classifies as valid, leave the record as it is.
 */
pub fn recheck_status(record: &mut AssetRecord, allowed_extensions: &ExtensionSet) {
    if !record.status.is_broken() {
        return;
    }
    match path_classifier::classify(&record.path, allowed_extensions) {
        PathClassification::MissingFile => record.status = LinkStatus::Missing,
        PathClassification::DirectoryNoValidContent => record.status = LinkStatus::LocationError,
        PathClassification::Valid => {}
    }
}

#[derive(Debug)]
pub enum SweepFailure {
    Rejected(RelinkError),
    HostWrite(HostError),
}

impl fmt::Display for SweepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepFailure::Rejected(e) => write!(f, "{e}"),
            SweepFailure::HostWrite(e) => write!(f, "{e}"),
        }
    }
}

/*
 * Supplies replacement paths during a sweep and hears about rows that could
 * not be repaired. Implemented by the interactive layer.
 */
pub trait ReplacementPathProvider {
    fn choose_replacement(
        &mut self,
        record: &AssetRecord,
        allowed_extensions: &ExtensionSet,
    ) -> Option<String>;

    fn on_failure(&mut self, record: &AssetRecord, failure: &SweepFailure);

    fn on_missing_node(&mut self, _node_id: &NodeId) {}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /* True when at least one record was broken at the start of its visit. */
    pub had_broken: bool,
    pub relinked: Vec<NodeId>,
    pub failed: Vec<NodeId>,
    pub skipped: Vec<NodeId>,
    pub missing_nodes: Vec<NodeId>,
    pub still_broken: usize,
}

pub fn relink_sweep(
    registry: &mut AssetRegistry,
    host: &mut dyn SceneHostOperations,
    allowed_extensions: &ExtensionSet,
    provider: &mut dyn ReplacementPathProvider,
) -> SweepReport {
    let mut report = SweepReport::default();

    for record in registry.records_mut().iter_mut() {
        if !host.contains_node(&record.node_id) {
            log::warn!(
                "RelinkEngine: Node {} no longer exists; skipping.",
                record.node_id
            );
            provider.on_missing_node(&record.node_id);
            report.missing_nodes.push(record.node_id.clone());
            continue;
        }

        // Only the status a row has on entry decides whether it is offered a
        // path; rows reading Up-to-date or Relinked are left alone.
        if !record.status.is_broken() {
            continue;
        }
        report.had_broken = true;
        recheck_status(record, allowed_extensions);

        let Some(candidate) = provider.choose_replacement(record, allowed_extensions) else {
            log::debug!("RelinkEngine: No replacement chosen for {}.", record.node_id);
            report.skipped.push(record.node_id.clone());
            continue;
        };

        if let Err(e) = validate_candidate(&candidate, allowed_extensions) {
            log::warn!("RelinkEngine: {e}");
            provider.on_failure(record, &SweepFailure::Rejected(e));
            report.failed.push(record.node_id.clone());
            continue;
        }

        if let Err(e) = host.set_attribute(&record.node_id, FILE_ATTRIBUTE, candidate.clone().into())
        {
            log::error!(
                "RelinkEngine: Host refused new path for {}: {e}",
                record.node_id
            );
            provider.on_failure(record, &SweepFailure::HostWrite(e));
            report.failed.push(record.node_id.clone());
            continue;
        }

        match relink(record, &candidate, allowed_extensions) {
            Ok(_) => report.relinked.push(record.node_id.clone()),
            Err(e) => {
                provider.on_failure(record, &SweepFailure::Rejected(e));
                report.failed.push(record.node_id.clone());
            }
        }
    }

    report.still_broken = registry.broken_count();
    log::info!(
        "RelinkEngine: Sweep finished; {} relinked, {} failed, {} skipped, {} still broken.",
        report.relinked.len(),
        report.failed.len(),
        report.skipped.len(),
        report.still_broken
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formats::MediaFormats;
    use crate::core::scene_document::{SceneDocument, SceneNode};
    use std::collections::VecDeque;
    use std::fs::File;
    use tempfile::tempdir;

    fn missing_record() -> AssetRecord {
        AssetRecord::new(
            NodeId::new("Read1"),
            "/gone/plate.exr".to_string(),
            LinkStatus::Missing,
            None,
            None,
        )
    }

    #[test]
    fn test_relink_accepts_supported_extension() {
        let mut record = missing_record();
        let allowed = MediaFormats::default().relink_extensions();

        let state = relink(&mut record, "/new/Geo.ABC", &allowed).unwrap();

        assert_eq!(state.status, LinkStatus::Relinked);
        assert_eq!(record.path, "/new/Geo.ABC");
        assert_eq!(record.status, LinkStatus::Relinked);
        assert_eq!(record.asset_name.as_deref(), Some("Geo"));
    }

    #[test]
    fn test_relink_rejects_unsupported_extension_without_mutation() {
        let mut record = missing_record();
        let before = record.clone();
        let allowed = MediaFormats::default().relink_extensions();

        let result = relink(&mut record, "/new/notes.txt", &allowed);

        assert_eq!(
            result,
            Err(RelinkError::InvalidExtension("/new/notes.txt".to_string()))
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_recheck_never_upgrades() {
        let dir = tempdir().unwrap();
        let existing = dir.path().join("plate.exr");
        File::create(&existing).unwrap();
        let mut record = AssetRecord::new(
            NodeId::new("Read1"),
            existing.to_string_lossy().into_owned(),
            LinkStatus::LocationError,
            None,
            None,
        );

        recheck_status(&mut record, &MediaFormats::default().relink_extensions());

        assert_eq!(record.status, LinkStatus::LocationError);
    }

    struct ScriptedProvider {
        answers: VecDeque<Option<String>>,
        asked: Vec<NodeId>,
        failures: Vec<String>,
    }

    impl ScriptedProvider {
        fn new(answers: Vec<Option<&str>>) -> Self {
            ScriptedProvider {
                answers: answers
                    .into_iter()
                    .map(|a| a.map(str::to_string))
                    .collect(),
                asked: Vec::new(),
                failures: Vec::new(),
            }
        }
    }

    impl ReplacementPathProvider for ScriptedProvider {
        fn choose_replacement(
            &mut self,
            record: &AssetRecord,
            _allowed_extensions: &ExtensionSet,
        ) -> Option<String> {
            self.asked.push(record.node_id.clone());
            self.answers.pop_front().flatten()
        }

        fn on_failure(&mut self, _record: &AssetRecord, failure: &SweepFailure) {
            self.failures.push(failure.to_string());
        }
    }

    #[test]
    fn test_sweep_offers_only_broken_records_and_continues_past_rejection() {
        // Arrange
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.exr");
        File::create(&good).unwrap();
        let mut host = SceneDocument::new(vec![
            SceneNode::new("Read1", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/a.exr"),
            SceneNode::new("Read2", "Read")
                .with_attribute(FILE_ATTRIBUTE, &*good.to_string_lossy()),
            SceneNode::new("Read3", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/b.exr"),
        ]);
        let formats = MediaFormats::default();
        let mut registry = AssetRegistry::new();
        registry.rescan(&host, &formats);
        let mut provider = ScriptedProvider::new(vec![Some("/fixed/a.txt"), Some("/fixed/b.dpx")]);

        // Act
        let report = relink_sweep(
            &mut registry,
            &mut host,
            &formats.relink_extensions(),
            &mut provider,
        );

        // Assert
        assert!(report.had_broken);
        assert_eq!(provider.asked, vec![NodeId::new("Read1"), NodeId::new("Read3")]);
        assert_eq!(provider.failures.len(), 1);
        assert_eq!(report.relinked, vec![NodeId::new("Read3")]);
        assert_eq!(report.failed, vec![NodeId::new("Read1")]);
        assert_eq!(report.still_broken, 1);

        let read1 = registry.record(&NodeId::new("Read1")).unwrap();
        assert_eq!(read1.path, "/gone/a.exr");
        assert_eq!(read1.status, LinkStatus::Missing);
        let read3 = registry.record(&NodeId::new("Read3")).unwrap();
        assert_eq!(read3.status, LinkStatus::Relinked);
        assert_eq!(host.file_path(&NodeId::new("Read3")).as_deref(), Some("/fixed/b.dpx"));
    }

    #[test]
    fn test_sweep_without_broken_records() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.mov");
        File::create(&good).unwrap();
        let mut host = SceneDocument::new(vec![
            SceneNode::new("Read1", "Read")
                .with_attribute(FILE_ATTRIBUTE, &*good.to_string_lossy()),
        ]);
        let formats = MediaFormats::default();
        let mut registry = AssetRegistry::new();
        registry.rescan(&host, &formats);
        let mut provider = ScriptedProvider::new(vec![]);

        let report = relink_sweep(
            &mut registry,
            &mut host,
            &formats.relink_extensions(),
            &mut provider,
        );

        assert!(!report.had_broken);
        assert!(provider.asked.is_empty());
    }

    #[test]
    fn test_sweep_skips_vanished_nodes_and_cancelled_choices() {
        let mut host = SceneDocument::new(vec![
            SceneNode::new("Read1", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/a.exr"),
            SceneNode::new("Read2", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/b.exr"),
        ]);
        let formats = MediaFormats::default();
        let mut registry = AssetRegistry::new();
        registry.rescan(&host, &formats);
        host.remove_node(&NodeId::new("Read1"));
        let mut provider = ScriptedProvider::new(vec![None]);

        let report = relink_sweep(
            &mut registry,
            &mut host,
            &formats.relink_extensions(),
            &mut provider,
        );

        assert_eq!(report.missing_nodes, vec![NodeId::new("Read1")]);
        assert_eq!(report.skipped, vec![NodeId::new("Read2")]);
        assert!(report.had_broken);
        assert_eq!(report.still_broken, 2);
    }

    #[test]
    fn test_recheck_refines_broken_and_ignores_relinked() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();
        let allowed = MediaFormats::default().relink_extensions();
        let mut broken = AssetRecord::new(
            NodeId::new("Read1"),
            dir.path().to_string_lossy().into_owned(),
            LinkStatus::Missing,
            None,
            None,
        );
        let mut relinked = AssetRecord::new(
            NodeId::new("Read2"),
            "/not/yet/delivered.exr".to_string(),
            LinkStatus::Relinked,
            None,
            None,
        );

        recheck_status(&mut broken, &allowed);
        recheck_status(&mut relinked, &allowed);

        assert_eq!(broken.status, LinkStatus::LocationError);
        assert_eq!(relinked.status, LinkStatus::Relinked);
    }

    #[test]
    fn test_repeated_sweeps_only_offer_rows_broken_on_entry() {
        // Arrange
        let dir = tempdir().unwrap();
        let plate = dir.path().join("plate.exr");
        File::create(&plate).unwrap();
        let mut host = SceneDocument::new(vec![
            SceneNode::new("Read1", "Read")
                .with_attribute(FILE_ATTRIBUTE, &*plate.to_string_lossy()),
            SceneNode::new("Read2", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/b.exr"),
        ]);
        let formats = MediaFormats::default();
        let allowed = formats.relink_extensions();
        let mut registry = AssetRegistry::new();
        registry.rescan(&host, &formats);
        std::fs::remove_file(&plate).unwrap();
        let mut first_pass = ScriptedProvider::new(vec![Some("/not/yet/delivered.exr")]);
        let mut second_pass = ScriptedProvider::new(vec![]);

        // Act
        let first = relink_sweep(&mut registry, &mut host, &allowed, &mut first_pass);
        let second = relink_sweep(&mut registry, &mut host, &allowed, &mut second_pass);

        // Assert
        assert_eq!(first_pass.asked, vec![NodeId::new("Read2")]);
        assert!(first.had_broken);
        assert!(second_pass.asked.is_empty());
        assert!(!second.had_broken);
        let read1 = registry.record(&NodeId::new("Read1")).unwrap();
        assert_eq!(read1.status, LinkStatus::UpToDate);
        let read2 = registry.record(&NodeId::new("Read2")).unwrap();
        assert_eq!(read2.status, LinkStatus::Relinked);
        assert_eq!(read2.path, "/not/yet/delivered.exr");
    }
}
