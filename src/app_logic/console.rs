/*
 * Line-oriented implementation of the operator prompts. Every picker prints a
 * title and reads one answer line; an empty line cancels. The same reader
 * also feeds the binary's command loop through `read_line`, so there is a
 * single consumer of the input stream.
 */
use super::prompts::{MessageSeverity, OperatorPromptOperations};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct ConsolePrompts<R: BufRead, W: Write> {
    input: Mutex<R>,
    output: Mutex<W>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: BufRead, W: Write> ConsolePrompts<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompts {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    /* Next input line without its line ending; `None` at end of input. */
    pub fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match lock(&self.input).read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("ConsolePrompts: Failed to read input: {e}");
                None
            }
        }
    }

    pub fn print(&self, text: &str) {
        let mut output = lock(&self.output);
        if let Err(e) = writeln!(output, "{text}").and_then(|_| output.flush()) {
            log::error!("ConsolePrompts: Failed to write output: {e}");
        }
    }

    fn ask(&self, question: &str) -> Option<String> {
        self.print(question);
        let answer = self.read_line()?;
        let answer = answer.trim();
        if answer.is_empty() {
            log::debug!("ConsolePrompts: Prompt cancelled.");
            None
        } else {
            Some(answer.to_string())
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: BufRead, W: Write> OperatorPromptOperations for ConsolePrompts<R, W> {
    fn choose_file(
        &self,
        title: &str,
        start_directory: Option<&Path>,
        filter: &str,
    ) -> Option<String> {
        self.print(&format!("== {title} ({filter})"));
        if let Some(dir) = start_directory {
            self.print(&format!("   looking in {}", dir.display()));
        }
        self.ask("Path (empty to cancel):")
    }

    fn choose_from_list(&self, title: &str, prompt: &str, labels: &[String]) -> Option<String> {
        self.print(&format!("== {title}"));
        for (index, label) in labels.iter().enumerate() {
            self.print(&format!("  {}) {label}", index + 1));
        }
        let answer = self.ask(&format!("{prompt} (number or name, empty to cancel):"))?;

        let chosen = match answer.parse::<usize>() {
            Ok(number) => number.checked_sub(1).and_then(|i| labels.get(i)),
            Err(_) => labels.iter().find(|label| label.eq_ignore_ascii_case(&answer)),
        };
        if chosen.is_none() {
            self.print(&format!("'{answer}' is not one of the choices."));
        }
        chosen.cloned()
    }

    fn choose_save_path(&self, title: &str, filter: &str) -> Option<PathBuf> {
        self.print(&format!("== {title} ({filter})"));
        self.ask("Save as (empty to cancel):").map(PathBuf::from)
    }

    fn notify(&self, severity: MessageSeverity, title: &str, message: &str) {
        self.print(&format!("[{severity}] {title}: {message}"));
    }
}
