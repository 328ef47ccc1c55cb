/*
 * The interactive surface the application logic talks to: pickers that may
 * be cancelled and one-way notices. Implementations take `&self` so the logic
 * can share them behind an `Arc`.
 */
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Information,
    Warning,
    Error,
}

impl fmt::Display for MessageSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MessageSeverity::Information => "info",
            MessageSeverity::Warning => "warning",
            MessageSeverity::Error => "error",
        };
        f.write_str(text)
    }
}

pub trait OperatorPromptOperations {
    /* Single existing file, or `None` if the operator cancelled. */
    fn choose_file(&self, title: &str, start_directory: Option<&Path>, filter: &str)
    -> Option<String>;

    /* One of `labels`, or `None` if the operator cancelled. */
    fn choose_from_list(&self, title: &str, prompt: &str, labels: &[String]) -> Option<String>;

    fn choose_save_path(&self, title: &str, filter: &str) -> Option<PathBuf>;

    fn notify(&self, severity: MessageSeverity, title: &str, message: &str);
}
