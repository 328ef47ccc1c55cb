/*
 * Locates the application's local configuration directory, where settings,
 * the last opened scene and the log file are kept.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

fn ensure_dir(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        log::trace!("PathUtils: Using existing directory {path:?}");
        return Some(path.to_path_buf());
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            log::debug!("PathUtils: Created directory {path:?}");
            Some(path.to_path_buf())
        }
        Err(e) => {
            log::error!("PathUtils: Failed to create directory {path:?}: {e}");
            None
        }
    }
}

/*
 * Returns the platform's local (non-roaming) configuration directory for
 * `app_name`, creating it when needed. `None` if the platform offers no such
 * directory or it cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", app_name)?;
    ensure_dir(project_dirs.config_local_dir())
}

/* Path of `file_name` inside the application's local configuration directory. */
pub fn app_config_file(app_name: &str, file_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(file_name))
}
