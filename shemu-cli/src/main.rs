//! Shell emulator CLI - interactive terminal front end.
//!
//! Usage:
//!   shemu [--vfs IMAGE.xml] [--script START.sh]
//!
//! Examples:
//!   shemu                             # Empty VFS, interactive
//!   shemu --vfs demo.xml              # Load an image, then prompt
//!   shemu --vfs demo.xml --script s   # Run a startup script first
//!   shemu -l debug                    # Dispatch tracing on stderr

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tracing::debug;

use shemu_core::{Shell, ShellConfig, ShellConsole, Status};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

/// Shell emulator with an in-memory filesystem
#[derive(Parser, Debug)]
#[command(name = "shemu", version)]
#[command(about = "Shell emulator with a virtual filesystem")]
struct Args {
    /// VFS image (XML) to load at startup
    #[arg(long)]
    vfs: Option<PathBuf>,

    /// Script of commands to run before the prompt
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log verbosity on stderr
    #[arg(long, short, default_value = "warn", value_enum)]
    log_level: LogLevel,

    /// Seconds to wait for a key after `exit` (0 closes immediately)
    #[arg(long, default_value_t = 5)]
    exit_delay: u64,
}

/// Console writing straight to stdout.
struct StdoutConsole;

impl ShellConsole for StdoutConsole {
    fn write_line(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{line}");
        let _ = handle.flush();
    }

    fn write_prompt(&mut self, prompt: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = write!(handle, "{prompt}");
        let _ = handle.flush();
    }
}

fn setup_tracing(level: LogLevel) {
    if let Some(level) = level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

/// First non-empty value among the given environment variables.
fn env_any(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

fn config_from_env() -> ShellConfig {
    let defaults = ShellConfig::default();
    ShellConfig::new(
        env_any(&["USER", "USERNAME"]).unwrap_or(defaults.user),
        env_any(&["HOSTNAME", "COMPUTERNAME"]).unwrap_or(defaults.host),
    )
}

/// Read lines until `exit` or end of input.
fn repl(shell: &mut Shell, console: &mut StdoutConsole) -> std::io::Result<Status> {
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        console.write_prompt(&shell.prompt());
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            console.write_line("");
            return Ok(Status::Continue);
        }
        if shell.run_line(line.trim(), console) == Status::Exit {
            return Ok(Status::Exit);
        }
    }
}

/// Resolve when a key is pressed on the terminal.
async fn key_press() {
    loop {
        if event::poll(Duration::from_millis(0)).unwrap_or(false) {
            if let Ok(Event::Key(_)) = event::read() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Keep the terminal open after `exit` until a key press or `delay`.
async fn wait_for_close(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    println!("Press any key to close...");

    // Enable raw mode (gracefully handle non-TTY)
    let raw_mode_enabled = enable_raw_mode().is_ok();

    tokio::select! {
        _ = key_press() => debug!("key pressed, closing"),
        _ = tokio::time::sleep(delay) => debug!("exit delay elapsed"),
    }

    if raw_mode_enabled {
        let _ = disable_raw_mode();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    setup_tracing(args.log_level);
    debug!(?args, "parsed arguments");

    let vfs = args.vfs.clone();
    let script = args.script.clone();

    // The shell is synchronous; run it off the async workers
    let status = tokio::task::spawn_blocking(move || -> std::io::Result<Status> {
        let mut shell = Shell::with_config(config_from_env());
        let mut console = StdoutConsole;

        if let Some(path) = &vfs {
            shell.load_vfs(path, &mut console);
        }

        if let Some(path) = &script {
            match shell.run_script_file(path, &mut console) {
                Ok(Status::Exit) => return Ok(Status::Exit),
                Ok(Status::Continue) => {}
                Err(e) => console.write_line(&format!("Error: {e}")),
            }
        }

        repl(&mut shell, &mut console)
    })
    .await??;

    if status == Status::Exit {
        wait_for_close(Duration::from_secs(args.exit_delay)).await;
    }

    Ok(())
}
