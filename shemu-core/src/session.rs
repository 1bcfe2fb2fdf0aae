//! Per-session state shared by all commands.

use std::time::{Duration, Instant};

/// Identity shown in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub user: String,
    pub host: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            user: "user".to_string(),
            host: "localhost".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            host: host.into(),
        }
    }
}

/// Session context: command history, start time and exit flag.
#[derive(Debug, Clone)]
pub struct Session {
    config: ShellConfig,
    history: Vec<String>,
    started_at: Instant,
    exited: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}

impl Session {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
            started_at: Instant::now(),
            exited: false,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Append a raw input line to the history.
    pub fn record(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    /// Every recorded line, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Wall-clock time since the session started.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn mark_exited(&mut self) {
        self.exited = true;
    }
}

/// Format a duration as `HH:MM:SS`. Hours grow past two digits as needed.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use shemu_core::format_uptime;
/// assert_eq!(format_uptime(Duration::from_secs(3661)), "01:01:01");
/// ```
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
