// src/main.rs

mod app_logic;
mod core;

use crate::app_logic::{
    APP_NAME, AssetManagerEvent, AssetManagerLogic, ConsolePrompts, MessageSeverity,
    OperatorPromptOperations,
};
use crate::core::{
    AppConfig, AssetRegistry, ConfigManagerOperations, CoreConfigManager, CoreReportWriter,
    SceneDocument, path_utils,
};
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

const LOG_FILENAME: &str = "asset_manager.log";

const HELP_TEXT: &str = "\
Commands:
  scan          rescan the scene for media references
  list          show the asset table
  select <row>  make <row> the selected asset
  open <row>    select <row> and focus its node
  relink        offer a new path for every broken reference
  versions      switch the selected asset to another version directory
  report        export the table as CSV
  save          write the scene back to disk
  help          show this text
  quit          leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Scan,
    List,
    Select(usize),
    Open(usize),
    Relink,
    Versions,
    Report,
    Save,
    Help,
    Quit,
}

/* Rows are numbered from 1 for the operator. */
fn parse_row(argument: Option<&str>) -> Result<usize, String> {
    let text = argument.ok_or_else(|| "expected a row number".to_string())?;
    match text.parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row - 1),
        _ => Err(format!("'{text}' is not a row number")),
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Err("empty command".to_string());
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "scan" => Command::Scan,
        "list" | "ls" => Command::List,
        "select" => Command::Select(parse_row(words.next())?),
        "open" => Command::Open(parse_row(words.next())?),
        "relink" => Command::Relink,
        "versions" => Command::Versions,
        "report" => Command::Report,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn format_table(registry: &AssetRegistry) -> Vec<String> {
    let mut lines = vec![format!(
        "{:>3}  {:<12} {:<20} {:<6} {:<15} {:<10} {:<11} {}",
        "#", "Node", "Asset", "Type", "Status", "Colorspace", "Range", "Path"
    )];
    for (index, row) in registry.export_rows().iter().enumerate() {
        let [node, asset, asset_type, path, status, colorspace, range] = &row.0;
        lines.push(format!(
            "{:>3}  {node:<12} {asset:<20} {asset_type:<6} {status:<15} {colorspace:<10} {range:<11} {path}",
            index + 1
        ));
    }
    lines
}

fn init_logging(console_level: LevelFilter) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        console_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(log_path) = path_utils::app_config_file(APP_NAME, LOG_FILENAME) {
        match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file)),
            Err(e) => eprintln!("Could not open log file {log_path:?}: {e}"),
        }
    }
    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialise logging: {e}");
    }
}

fn resolve_scene_path(config_manager: &dyn ConfigManagerOperations) -> Option<PathBuf> {
    if let Some(argument) = std::env::args_os().nth(1) {
        return Some(PathBuf::from(argument));
    }
    match config_manager.load_last_scene_path(APP_NAME) {
        Ok(last) => last,
        Err(e) => {
            log::warn!("Main: Could not read last scene path: {e}");
            None
        }
    }
}

fn main() -> ExitCode {
    let config_manager = CoreConfigManager::new();
    let config_result = config_manager.load_config(APP_NAME);
    let config = config_result.as_ref().cloned().unwrap_or_default();
    init_logging(config.log_level_filter());
    if let Err(e) = &config_result {
        log::error!("Main: Failed to load settings, using defaults: {e}");
    }
    let AppConfig { formats, .. } = config;

    let Some(scene_path) = resolve_scene_path(&config_manager) else {
        eprintln!("Usage: asset_manager <scene.json>");
        return ExitCode::FAILURE;
    };
    let mut scene = match SceneDocument::load(&scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            log::error!("Main: Could not open scene {scene_path:?}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config_manager.save_last_scene_path(APP_NAME, Some(&scene_path)) {
        log::warn!("Main: Could not remember scene path: {e}");
    }

    let console = Arc::new(ConsolePrompts::new(io::stdin().lock(), io::stdout()));
    let mut logic = AssetManagerLogic::new(
        formats,
        console.clone(),
        Arc::new(CoreReportWriter::new()),
    );

    logic.handle_event(&mut scene, AssetManagerEvent::ScanRequested);
    console.print(&format!(
        "{} media references in {}. Type 'help' for commands.",
        logic.registry().len(),
        scene_path.display()
    ));

    run_command_loop(&*console, &mut logic, &mut scene, &scene_path);
    ExitCode::SUCCESS
}

fn run_command_loop<R: BufRead, W: Write>(
    console: &ConsolePrompts<R, W>,
    logic: &mut AssetManagerLogic,
    scene: &mut SceneDocument,
    scene_path: &Path,
) {
    loop {
        console.print("> ");
        let Some(line) = console.read_line() else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                console.print(&format!("{message}; type 'help' for commands."));
                continue;
            }
        };
        log::debug!("Main: Command {command:?}");

        match command {
            Command::Scan => {
                logic.handle_event(scene, AssetManagerEvent::ScanRequested);
                console.print(&format!("{} media references.", logic.registry().len()));
            }
            Command::List => {
                for line in format_table(logic.registry()) {
                    console.print(&line);
                }
            }
            Command::Select(row) => {
                logic.handle_event(scene, AssetManagerEvent::RowActivated { row, column: 1 });
            }
            Command::Open(row) => {
                logic.handle_event(
                    scene,
                    AssetManagerEvent::RowActivated {
                        row,
                        column: app_logic::handler::NODE_COLUMN,
                    },
                );
            }
            Command::Relink => logic.handle_event(scene, AssetManagerEvent::RelinkRequested),
            Command::Versions => logic.handle_event(scene, AssetManagerEvent::VersionsRequested),
            Command::Report => logic.handle_event(scene, AssetManagerEvent::ReportRequested),
            Command::Save => match scene.save(scene_path) {
                Ok(()) => console.notify(
                    MessageSeverity::Information,
                    "Saved",
                    &scene_path.display().to_string(),
                ),
                Err(e) => {
                    log::error!("Main: Could not save scene: {e}");
                    console.notify(MessageSeverity::Error, "Save Failed", &e.to_string());
                }
            },
            Command::Help => console.print(HELP_TEXT),
            Command::Quit => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene_document::SceneNode;
    use crate::core::{FILE_ATTRIBUTE, MediaFormats};

    #[test]
    fn test_parse_command_words_and_rows() {
        assert_eq!(parse_command("scan"), Ok(Command::Scan));
        assert_eq!(parse_command("  LIST "), Ok(Command::List));
        assert_eq!(parse_command("open 2"), Ok(Command::Open(1)));
        assert_eq!(parse_command("select 1"), Ok(Command::Select(0)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_command_rejects_bad_input() {
        assert!(parse_command("select").is_err());
        assert!(parse_command("open 0").is_err());
        assert!(parse_command("open two").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_format_table_numbers_rows_from_one() {
        let scene = SceneDocument::new(vec![
            SceneNode::new("Read1", "Read").with_attribute(FILE_ATTRIBUTE, "/gone/bg.exr"),
        ]);
        let mut registry = AssetRegistry::new();
        registry.rescan(&scene, &MediaFormats::default());

        let lines = format_table(&registry);

        assert_eq!(lines.len(), 2);
        assert!(lines[1].trim_start().starts_with("1  Read1"));
        assert!(lines[1].contains("Missing"));
        assert!(lines[1].ends_with("/gone/bg.exr"));
    }
}
