//! Startup scripts: command files run through the interactive dispatch path.

use std::path::Path;

use tracing::debug;

use crate::console::ShellConsole;
use crate::error::{VfsError, VfsResult};
use crate::shell::{Shell, Status};

/// Executable lines of a script: trimmed, without blanks and `#` comments.
pub fn script_commands(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

impl Shell {
    /// Run every command of `text` in order, echoing each one after the
    /// prompt. Stops at `exit`.
    pub fn run_script<C: ShellConsole>(&mut self, text: &str, console: &mut C) -> Status {
        for command in script_commands(text) {
            console.write_prompt(&self.prompt());
            console.write_line(command);
            if self.run_line(command, console) == Status::Exit {
                debug!("script stopped at exit");
                return Status::Exit;
            }
        }
        Status::Continue
    }

    /// Read a script file and run it.
    pub fn run_script_file<C: ShellConsole>(
        &mut self,
        path: &Path,
        console: &mut C,
    ) -> VfsResult<Status> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VfsError::FileNotFound(path.display().to_string()),
            _ => VfsError::Io(e),
        })?;
        debug!(path = %path.display(), "running script");
        Ok(self.run_script(&text, console))
    }
}
