/*
 * The in-memory table of tracked media references. A scan replaces the whole
 * table; afterwards records are only mutated in place by relink and version
 * operations, and are addressed by the `NodeId` of the node that owns them.
 */
use super::formats::MediaFormats;
use super::host::SceneHostOperations;
use super::models::{AssetRecord, LinkStatus, NodeId, NodeRole, ReportRow};
use super::path_classifier::{self, PathClassification};
use std::collections::HashSet;

/*
 * Initial status of a freshly scanned record. A host-reported node error wins
 * over whatever the file system says about the path.
 */
pub fn initial_status(classification: PathClassification, host_reports_error: bool) -> LinkStatus {
    if host_reports_error {
        return LinkStatus::LocationError;
    }
    match classification {
        PathClassification::Valid => LinkStatus::UpToDate,
        PathClassification::MissingFile => LinkStatus::Missing,
        PathClassification::DirectoryNoValidContent => LinkStatus::LocationError,
    }
}

#[derive(Debug, Default)]
pub struct AssetRegistry {
    records: Vec<AssetRecord>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        AssetRegistry {
            records: Vec::new(),
        }
    }

    /*
     * Rebuilds the table from the host's nodes, in host enumeration order.
     * Only media-reference nodes produce records.
     */
    pub fn rescan(
        &mut self,
        host: &dyn SceneHostOperations,
        formats: &MediaFormats,
    ) -> &[AssetRecord] {
        let allowed_extensions = formats.relink_extensions();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut records = Vec::new();

        for node_id in host.all_nodes() {
            if host.node_role(&node_id) != Some(NodeRole::MediaReference) {
                continue;
            }
            if !seen.insert(node_id.clone()) {
                log::warn!("AssetRegistry: Host reported node {node_id} twice; keeping the first.");
                continue;
            }

            let path = host.file_path(&node_id).unwrap_or_default();
            let classification = path_classifier::classify(&path, &allowed_extensions);
            let status = initial_status(classification, host.has_error(&node_id));
            log::trace!("AssetRegistry: {node_id} -> {path:?} ({status})");

            records.push(AssetRecord::new(
                node_id.clone(),
                path,
                status,
                host.colorspace(&node_id),
                host.frame_range(&node_id),
            ));
        }

        log::info!("AssetRegistry: Scan found {} media references.", records.len());
        self.records = records;
        &self.records
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [AssetRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, node_id: &NodeId) -> Option<&AssetRecord> {
        self.records.iter().find(|r| &r.node_id == node_id)
    }

    pub fn record_mut(&mut self, node_id: &NodeId) -> Option<&mut AssetRecord> {
        self.records.iter_mut().find(|r| &r.node_id == node_id)
    }

    pub fn record_at(&self, row: usize) -> Option<&AssetRecord> {
        self.records.get(row)
    }

    pub fn broken_count(&self) -> usize {
        self.records.iter().filter(|r| r.status.is_broken()).count()
    }

    pub fn export_rows(&self) -> Vec<ReportRow> {
        self.records.iter().map(AssetRecord::to_row).collect()
    }
}
