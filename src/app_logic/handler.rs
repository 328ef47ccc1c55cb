use super::prompts::{MessageSeverity, OperatorPromptOperations};
use crate::core::relink::{self, ReplacementPathProvider, SweepFailure, SweepReport};
use crate::core::versions::{self, PromotionResult, VersionDirectory, VersionError};
use crate::core::{
    AssetRecord, AssetRegistry, AttributeValue, ExtensionSet, FIRST_FRAME_ATTRIBUTE, FILE_ATTRIBUTE, FrameRange,
    HostError, LAST_FRAME_ATTRIBUTE, LinkStatus, MediaFormats, NodeId, ReportWriterOperations,
    SceneHostOperations,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/* Names the configuration directory and log file location. */
pub const APP_NAME: &str = "AssetManager";

/* Activating this column navigates to the node in the host. */
pub const NODE_COLUMN: usize = 0;

const SUPPORTED_FILES_TITLE: &str = "Supported Files";
const REPORT_FILTER: &str = "CSV Files (*.csv)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetManagerEvent {
    ScanRequested,
    RelinkRequested,
    VersionsRequested,
    ReportRequested,
    RowActivated { row: usize, column: usize },
}

/* A table row the operator activated, resolved to the node it shows. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActivation {
    pub row: usize,
    pub column: usize,
    pub node_id: NodeId,
}

/*
 * A subscriber to the row-activated event. Subscribers never see each other;
 * each one decides on its own whether the activation concerns it.
 */
pub trait RowActivatedHandler {
    fn on_row_activated(
        &mut self,
        activation: &RowActivation,
        host: &mut dyn SceneHostOperations,
        prompts: &dyn OperatorPromptOperations,
    );
}

/* Brings the activated node into view when the node column was clicked. */
#[derive(Debug, Default)]
pub struct NodeNavigator {}

impl RowActivatedHandler for NodeNavigator {
    fn on_row_activated(
        &mut self,
        activation: &RowActivation,
        host: &mut dyn SceneHostOperations,
        prompts: &dyn OperatorPromptOperations,
    ) {
        if activation.column != NODE_COLUMN {
            return;
        }
        match host.focus_node(&activation.node_id) {
            Ok(()) => log::debug!("NodeNavigator: Focused {}.", activation.node_id),
            Err(e @ HostError::NodeNotFound(_)) => {
                log::warn!("NodeNavigator: {e}");
                prompts.notify(MessageSeverity::Warning, "Node Not Found", &e.to_string());
            }
            Err(e) => {
                log::error!("NodeNavigator: Could not focus {}: {e}", activation.node_id);
                prompts.notify(MessageSeverity::Error, "Navigation Failed", &e.to_string());
            }
        }
    }
}

/*
 * The "currently selected asset" slot. It remembers the node of the last
 * activated row, whatever column was clicked, and is consumed by version
 * promotion.
 */
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    selected: Option<NodeId>,
}

impl SelectionContext {
    pub fn capture(&mut self, node_id: NodeId) {
        log::debug!("SelectionContext: Selected {node_id}.");
        self.selected = Some(node_id);
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

impl RowActivatedHandler for SelectionContext {
    fn on_row_activated(
        &mut self,
        activation: &RowActivation,
        _host: &mut dyn SceneHostOperations,
        _prompts: &dyn OperatorPromptOperations,
    ) {
        self.capture(activation.node_id.clone());
    }
}

/* Bridges the relink sweep to the operator's file picker. */
struct PromptReplacementProvider<'a> {
    prompts: &'a dyn OperatorPromptOperations,
}

impl ReplacementPathProvider for PromptReplacementProvider<'_> {
    fn choose_replacement(
        &mut self,
        record: &AssetRecord,
        allowed_extensions: &ExtensionSet,
    ) -> Option<String> {
        let start_directory = Path::new(&record.path)
            .parent()
            .filter(|dir| dir.is_dir());
        self.prompts.choose_file(
            &format!("Select New Asset Path for {}", record.node_id),
            start_directory,
            &allowed_extensions.file_filter_label(SUPPORTED_FILES_TITLE),
        )
    }

    fn on_failure(&mut self, record: &AssetRecord, failure: &SweepFailure) {
        match failure {
            SweepFailure::Rejected(_) => self.prompts.notify(
                MessageSeverity::Warning,
                "Invalid File Type",
                "Please select a supported 2D or 3D file type.",
            ),
            SweepFailure::HostWrite(e) => self.prompts.notify(
                MessageSeverity::Error,
                "Relink Failed",
                &format!("{}: {e}", record.node_id),
            ),
        }
    }

    fn on_missing_node(&mut self, node_id: &NodeId) {
        self.prompts.notify(
            MessageSeverity::Warning,
            "Node Not Found",
            &HostError::NodeNotFound(node_id.clone()).to_string(),
        );
    }
}

/*
 * Operator-facing orchestration of the asset manager: scanning the host,
 * repairing broken references, promoting a reference to another version
 * directory and exporting the table. The host is passed into every call
 * rather than owned, so the caller decides when the scene is persisted.
 */
pub struct AssetManagerLogic {
    pub(crate) registry: AssetRegistry,
    pub(crate) formats: MediaFormats,
    pub(crate) selection: SelectionContext,
    pub(crate) navigator: NodeNavigator,
    prompts: Arc<dyn OperatorPromptOperations>,
    report_writer: Arc<dyn ReportWriterOperations>,
}

impl AssetManagerLogic {
    pub fn new(
        formats: MediaFormats,
        prompts: Arc<dyn OperatorPromptOperations>,
        report_writer: Arc<dyn ReportWriterOperations>,
    ) -> Self {
        AssetManagerLogic {
            registry: AssetRegistry::new(),
            formats,
            selection: SelectionContext::default(),
            navigator: NodeNavigator::default(),
            prompts,
            report_writer,
        }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn handle_event(&mut self, host: &mut dyn SceneHostOperations, event: AssetManagerEvent) {
        log::trace!("AssetManagerLogic: Handling {event:?}");
        match event {
            AssetManagerEvent::ScanRequested => {
                self.scan(host);
            }
            AssetManagerEvent::RelinkRequested => {
                self.relink_assets(host);
            }
            AssetManagerEvent::VersionsRequested => {
                self.promote_selected(host);
            }
            AssetManagerEvent::ReportRequested => {
                self.generate_report();
            }
            AssetManagerEvent::RowActivated { row, column } => {
                self.activate_row(host, row, column);
            }
        }
    }

    /*
     * Rebuilds the table from the host. A selection whose node is no longer
     * tracked is dropped so promotion cannot act on a stale node.
     */
    pub fn scan(&mut self, host: &dyn SceneHostOperations) -> usize {
        let count = self.registry.rescan(host, &self.formats).len();
        let stale = self
            .selection
            .selected()
            .is_some_and(|selected| self.registry.record(selected).is_none());
        if stale {
            log::debug!("AssetManagerLogic: Selected node vanished from the table; clearing.");
            self.selection.clear();
        }
        count
    }

    pub fn relink_assets(&mut self, host: &mut dyn SceneHostOperations) -> SweepReport {
        let allowed_extensions = self.formats.relink_extensions();
        let mut provider = PromptReplacementProvider {
            prompts: self.prompts.as_ref(),
        };
        let report = relink::relink_sweep(
            &mut self.registry,
            host,
            &allowed_extensions,
            &mut provider,
        );

        if !report.had_broken {
            self.prompts.notify(
                MessageSeverity::Information,
                "Notice",
                "All files are linked and up-to-date.",
            );
        } else if report.still_broken > 0 {
            self.prompts.notify(
                MessageSeverity::Warning,
                "Relink Incomplete",
                &format!(
                    "{} asset(s) are still missing or in a location error.",
                    report.still_broken
                ),
            );
        }
        report
    }

    /*
     * Publishes a row activation to both subscribers. Rows outside the table
     * are ignored.
     */
    pub fn activate_row(&mut self, host: &mut dyn SceneHostOperations, row: usize, column: usize) {
        let Some(record) = self.registry.record_at(row) else {
            log::warn!("AssetManagerLogic: Row {row} is not in the table.");
            return;
        };
        let activation = RowActivation {
            row,
            column,
            node_id: record.node_id.clone(),
        };
        let prompts = self.prompts.as_ref();
        self.navigator.on_row_activated(&activation, host, prompts);
        self.selection.on_row_activated(&activation, host, prompts);
    }

    /*
     * Offers the version directories next to the selected asset and repoints
     * it at the chosen one. Returns what promotion decided, or `None` if it
     * never got that far.
     */
    pub fn promote_selected(
        &mut self,
        host: &mut dyn SceneHostOperations,
    ) -> Option<PromotionResult> {
        let Some(node_id) = self.selection.selected().cloned() else {
            self.prompts
                .notify(MessageSeverity::Warning, "Error", "No asset selected.");
            return None;
        };
        let current_path = match self.registry.record(&node_id) {
            Some(record) if host.contains_node(&node_id) => record.path.clone(),
            _ => {
                self.selection.clear();
                self.prompts.notify(
                    MessageSeverity::Warning,
                    "Node Not Found",
                    &HostError::NodeNotFound(node_id).to_string(),
                );
                return None;
            }
        };
        let current_directory = Path::new(&current_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let available = match versions::resolve_versions(&current_directory) {
            Ok(available) => available,
            Err(e) => {
                self.report_version_error(&e);
                return None;
            }
        };
        let chosen = self.choose_version(&available)?;

        match versions::promote_to(&current_directory, chosen, &self.formats) {
            Ok(PromotionResult::AlreadyCurrent) => {
                self.prompts.notify(
                    MessageSeverity::Information,
                    "Updated Version",
                    "The asset is already up-to-date.",
                );
                Some(PromotionResult::AlreadyCurrent)
            }
            Ok(PromotionResult::Promoted {
                new_path,
                frame_range,
            }) => {
                self.apply_promotion(host, &node_id, &new_path, frame_range)
                    .ok()?;
                log::info!(
                    "AssetManagerLogic: {node_id} promoted to {} ({new_path}).",
                    chosen.label()
                );
                Some(PromotionResult::Promoted {
                    new_path,
                    frame_range,
                })
            }
            Ok(PromotionResult::NoQualifyingMedia) => {
                self.prompts.notify(
                    MessageSeverity::Information,
                    "Updated Version",
                    &format!("{} contains no supported video or image files.", chosen.label()),
                );
                Some(PromotionResult::NoQualifyingMedia)
            }
            Err(e) => {
                self.report_version_error(&e);
                None
            }
        }
    }

    fn choose_version<'v>(&self, available: &'v [VersionDirectory]) -> Option<&'v VersionDirectory> {
        let labels: Vec<String> = available.iter().map(VersionDirectory::label).collect();
        let choice =
            self.prompts
                .choose_from_list("Select Available Version", "Choose a version:", &labels)?;
        available.iter().find(|v| v.label() == choice)
    }

    fn report_version_error(&self, error: &VersionError) {
        match error {
            VersionError::NoVersionsFound(_) | VersionError::NoParentDirectory(_) => {
                log::info!("AssetManagerLogic: {error}");
                self.prompts.notify(
                    MessageSeverity::Information,
                    "Updated Version",
                    &error.to_string(),
                );
            }
            VersionError::FileSystem(_) => {
                log::warn!("AssetManagerLogic: {error}");
                self.prompts
                    .notify(MessageSeverity::Warning, "Updated Version", &error.to_string());
            }
        }
    }

    /*
     * Writes the promoted reference to the host first, then to the record.
     * Frame bounds are written before the file. On refusal the values already
     * written are put back and the record is untouched.
     */
    fn apply_promotion(
        &mut self,
        host: &mut dyn SceneHostOperations,
        node_id: &NodeId,
        new_path: &str,
        frame_range: Option<FrameRange>,
    ) -> Result<(), HostError> {
        let mut writes: Vec<(&str, AttributeValue)> = Vec::new();
        if let Some(range) = frame_range {
            writes.push((FIRST_FRAME_ATTRIBUTE, range.first.into()));
            writes.push((LAST_FRAME_ATTRIBUTE, range.last.into()));
        }
        writes.push((FILE_ATTRIBUTE, new_path.into()));

        let mut applied: Vec<(&str, Option<AttributeValue>)> = Vec::new();
        for (name, value) in writes {
            let previous = host.attribute(node_id, name);
            if let Err(e) = host.set_attribute(node_id, name, value) {
                log::error!("AssetManagerLogic: Host refused promotion of {node_id}: {e}");
                restore_attributes(host, node_id, applied);
                self.prompts
                    .notify(MessageSeverity::Error, "Promotion Failed", &e.to_string());
                return Err(e);
            }
            applied.push((name, previous));
        }

        if let Some(record) = self.registry.record_mut(node_id) {
            record.set_path(new_path.to_string());
            if frame_range.is_some() {
                record.frame_range = frame_range;
            }
            record.status = LinkStatus::UpToDate;
        }
        Ok(())
    }

    /* Asks for a destination and writes the table there. */
    pub fn generate_report(&self) -> Option<PathBuf> {
        let destination = self.prompts.choose_save_path("Save Report", REPORT_FILTER)?;
        let rows = self.registry.export_rows();
        match self.report_writer.write_report(&rows, &destination) {
            Ok(()) => {
                self.prompts.notify(
                    MessageSeverity::Information,
                    "Report Generated",
                    &format!("Report saved at:\n{}", destination.display()),
                );
                Some(destination)
            }
            Err(e) => {
                log::error!("AssetManagerLogic: {e}");
                self.prompts
                    .notify(MessageSeverity::Error, "Report Failed", &e.to_string());
                None
            }
        }
    }
}

/* Undoes a partial promotion, most recent write first. */
fn restore_attributes(
    host: &mut dyn SceneHostOperations,
    node_id: &NodeId,
    applied: Vec<(&str, Option<AttributeValue>)>,
) {
    for (name, previous) in applied.into_iter().rev() {
        let Some(value) = previous else {
            log::warn!("AssetManagerLogic: {node_id} had no '{name}' to restore.");
            continue;
        };
        if let Err(e) = host.set_attribute(node_id, name, value) {
            log::error!("AssetManagerLogic: Could not restore '{name}' on {node_id}: {e}");
        }
    }
}
