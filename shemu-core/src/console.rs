//! Console output abstraction for the shell.
//!
//! The `ShellConsole` trait receives prompts and output lines the same way
//! for interactive input, startup scripts and tests (HeadlessConsole).

/// Line-oriented output sink.
pub trait ShellConsole {
    /// Write one line of output.
    fn write_line(&mut self, line: &str);

    /// Write a prompt (no trailing newline). Can be a no-op.
    fn write_prompt(&mut self, _prompt: &str) {}
}

/// Headless console for testing - captures everything written to it.
#[derive(Debug, Default)]
pub struct HeadlessConsole {
    lines: Vec<String>,
    pending_prompt: Option<String>,
}

impl HeadlessConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines. A prompt is joined with the line written after it.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Get all output as one newline-joined string.
    pub fn output_string(&self) -> String {
        self.lines.join("\n")
    }

    /// Clear output buffer.
    pub fn clear_output(&mut self) {
        self.lines.clear();
        self.pending_prompt = None;
    }
}

impl ShellConsole for HeadlessConsole {
    fn write_line(&mut self, line: &str) {
        match self.pending_prompt.take() {
            Some(prompt) => self.lines.push(prompt + line),
            None => self.lines.push(line.to_string()),
        }
    }

    fn write_prompt(&mut self, prompt: &str) {
        self.pending_prompt = Some(prompt.to_string());
    }
}
