//! Command interpreter - maps input lines onto VFS and session operations.

use tracing::{debug, warn};

use crate::console::ShellConsole;
use crate::error::{VfsError, VfsResult};
use crate::fs::{EntryKind, Vfs};
use crate::session::{format_uptime, Session, ShellConfig};

/// Marker printed by `ls` for an empty listing.
pub const EMPTY_MARKER: &str = "<empty>";
/// Printed by `exit`.
pub const FAREWELL: &str = "Exiting emulator...";

/// Whether the session accepts more input after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Continue,
    Exit,
}

/// Output of one input line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    pub lines: Vec<String>,
    pub status: Status,
}

impl Outcome {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            status: Status::Continue,
        }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Ls { long: bool, path: Option<&'a str> },
    /// `None` returns to the root.
    Cd(Option<String>),
    VfsSave(&'a str),
    Uptime,
    History,
    Exit,
}

impl<'a> TryFrom<&[&'a str]> for Command<'a> {
    type Error = VfsError;

    fn try_from(tokens: &[&'a str]) -> Result<Self, Self::Error> {
        let Some((&name, args)) = tokens.split_first() else {
            return Err(VfsError::UnknownCommand(String::new()));
        };

        match name {
            "ls" => {
                let mut long = false;
                let mut path = None;
                for &arg in args {
                    if arg == "-l" {
                        long = true;
                    } else if path.is_none() {
                        path = Some(arg);
                    }
                }
                Ok(Self::Ls { long, path })
            }
            "cd" if args.is_empty() => Ok(Self::Cd(None)),
            "cd" => Ok(Self::Cd(Some(args.join(" ")))),
            "vfs-save" => match args {
                [path] => Ok(Self::VfsSave(*path)),
                _ => Err(VfsError::Usage("vfs-save <path>".into())),
            },
            "uptime" => Ok(Self::Uptime),
            "history" => Ok(Self::History),
            "exit" => Ok(Self::Exit),
            other => Err(VfsError::UnknownCommand(other.to_string())),
        }
    }
}

/// Split a line on single spaces, dropping empty tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').filter(|t| !t.is_empty()).collect()
}

/// The shell: a VFS plus the session context it runs in.
#[derive(Debug, Default)]
pub struct Shell {
    vfs: Vfs,
    session: Session,
}

impl Shell {
    pub fn new(vfs: Vfs, session: Session) -> Self {
        Self { vfs, session }
    }

    /// Shell over an empty filesystem.
    pub fn with_config(config: ShellConfig) -> Self {
        Self::new(Vfs::new(), Session::new(config))
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Prompt string, e.g. `[user@host /docs]$ `.
    pub fn prompt(&self) -> String {
        let config = self.session.config();
        format!("[{}@{} {}]$ ", config.user, config.host, self.vfs.pwd())
    }

    /// Execute one input line. Never fails: errors become output lines.
    ///
    /// Every non-blank line is recorded in the history before dispatch.
    /// After `exit`, input is ignored.
    pub fn execute(&mut self, line: &str) -> Outcome {
        if self.session.has_exited() {
            debug!(line, "ignoring input after exit");
            return Outcome {
                lines: Vec::new(),
                status: Status::Exit,
            };
        }

        let tokens = tokenize(line);
        if tokens.is_empty() {
            return Outcome::default();
        }
        self.session.record(line);

        debug!(command = tokens[0], args = ?&tokens[1..], "dispatch");
        match self.dispatch(&tokens) {
            Ok(outcome) => outcome,
            Err(e) => {
                let e = match e {
                    VfsError::Io(io) => VfsError::CommandExecution(io.to_string()),
                    other => other,
                };
                debug!(error = %e, "command failed");
                Outcome::line(format!("Error: {e}"))
            }
        }
    }

    /// Execute a line and write its output to `console`.
    pub fn run_line<C: ShellConsole>(&mut self, line: &str, console: &mut C) -> Status {
        let outcome = self.execute(line);
        for line in &outcome.lines {
            console.write_line(line);
        }
        outcome.status
    }

    /// Load a VFS image at startup.
    ///
    /// Failure is reported on the console and leaves the current tree in
    /// place. Returns whether the image was loaded.
    pub fn load_vfs<C: ShellConsole>(&mut self, path: &std::path::Path, console: &mut C) -> bool {
        match self.vfs.load_from_xml(path) {
            Ok(()) => {
                console.write_line(&format!("VFS loaded from {}", path.display()));
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "VFS not loaded");
                console.write_line(&format!("VFS not loaded: {e}"));
                false
            }
        }
    }

    fn dispatch(&mut self, tokens: &[&str]) -> VfsResult<Outcome> {
        let outcome = match Command::try_from(tokens)? {
            Command::Ls { long, path } => Outcome::lines(self.ls(long, path)),
            Command::Cd(None) => {
                self.vfs.reset_cwd();
                Outcome::default()
            }
            Command::Cd(Some(path)) => {
                self.vfs.change_dir(&path)?;
                Outcome::default()
            }
            Command::VfsSave(path) => {
                self.vfs.save_to_xml(path)?;
                Outcome::line(format!("VFS saved to {path}"))
            }
            Command::Uptime => Outcome::line(format_uptime(self.session.uptime())),
            Command::History => Outcome::lines(
                self.session
                    .history()
                    .iter()
                    .enumerate()
                    .map(|(i, line)| format!("{}  {}", i + 1, line))
                    .collect(),
            ),
            Command::Exit => {
                self.session.mark_exited();
                Outcome {
                    lines: vec![FAREWELL.to_string()],
                    status: Status::Exit,
                }
            }
        };
        Ok(outcome)
    }

    fn ls(&self, long: bool, path: Option<&str>) -> Vec<String> {
        if long {
            return self
                .vfs
                .list_dir_details(path)
                .into_iter()
                .map(|entry| match entry.kind {
                    EntryKind::Directory { items } => format!("dr\t{}\t{} items", entry.name, items),
                    EntryKind::File { bytes } => format!("-f\t{}\t{} bytes", entry.name, bytes),
                })
                .collect();
        }

        let names = self.vfs.list_dir(path);
        if names.is_empty() {
            vec![EMPTY_MARKER.to_string()]
        } else {
            vec![names.join(" ")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::Node;
    use rstest::rstest;

    fn shell() -> Shell {
        let mut root = Node::dir();
        let a = root.add_dir("a").unwrap();
        a.add_file("c", "");
        root.add_file("b.txt", "abc");
        Shell::new(Vfs::from_root(root), Session::default())
    }

    #[rstest]
    #[case("ls", &["ls"])]
    #[case("  cd   a  b ", &["cd", "a", "b"])]
    #[case("", &[])]
    #[case("   ", &[])]
    #[case("ls\t-l", &["ls\t-l"])]
    fn test_tokenize(#[case] line: &str, #[case] expected: &[&str]) {
        assert_eq!(tokenize(line), expected);
    }

    #[rstest]
    #[case(&["ls"], Command::Ls { long: false, path: None })]
    #[case(&["ls", "-l"], Command::Ls { long: true, path: None })]
    #[case(&["ls", "-l", "a"], Command::Ls { long: true, path: Some("a") })]
    #[case(&["ls", "a", "-l", "b"], Command::Ls { long: true, path: Some("a") })]
    #[case(&["cd"], Command::Cd(None))]
    #[case(&["cd", "my", "dir"], Command::Cd(Some("my dir".into())))]
    #[case(&["vfs-save", "out.xml"], Command::VfsSave("out.xml"))]
    #[case(&["exit", "now"], Command::Exit)]
    fn test_parse_command(#[case] tokens: &[&str], #[case] expected: Command) {
        assert_eq!(Command::try_from(tokens).unwrap(), expected);
    }

    #[test]
    fn test_ls_short() {
        let mut sh = shell();
        assert_eq!(sh.execute("ls").lines, ["a b.txt"]);
        assert_eq!(sh.execute("ls a").lines, ["c"]);
        assert_eq!(sh.execute("ls nope").lines, [EMPTY_MARKER]);
    }

    #[test]
    fn test_ls_long() {
        let mut sh = shell();
        assert_eq!(
            sh.execute("ls -l").lines,
            ["dr\ta\t1 items", "-f\tb.txt\t3 bytes"]
        );
        assert_eq!(sh.execute("ls -l a").lines, ["-f\tc\t0 bytes"]);
        assert!(sh.execute("ls -l nope").lines.is_empty());
    }

    #[test]
    fn test_cd() {
        let mut sh = shell();
        assert!(sh.execute("cd a").lines.is_empty());
        assert_eq!(sh.vfs().pwd(), "/a");
        assert_eq!(sh.prompt(), "[user@localhost /a]$ ");

        sh.execute("cd");
        assert_eq!(sh.vfs().pwd(), "/");
    }

    #[test]
    fn test_cd_failure_reports_and_continues() {
        let mut sh = shell();
        sh.execute("cd a");
        let outcome = sh.execute("cd nope");
        assert_eq!(outcome.lines, ["Error: directory not found: nope"]);
        assert_eq!(outcome.status, Status::Continue);
        assert_eq!(sh.vfs().pwd(), "/a");
    }

    #[test]
    fn test_cd_rejoins_spaced_path() {
        let mut root = Node::dir();
        root.add_dir("my dir");
        let mut sh = Shell::new(Vfs::from_root(root), Session::default());
        sh.execute("cd my dir");
        assert_eq!(sh.vfs().pwd(), "/my dir");
    }

    #[test]
    fn test_vfs_save_usage() {
        let mut sh = shell();
        assert_eq!(
            sh.execute("vfs-save").lines,
            ["Error: usage: vfs-save <path>"]
        );
        assert_eq!(
            sh.execute("vfs-save a b").lines,
            ["Error: usage: vfs-save <path>"]
        );
    }

    #[test]
    fn test_vfs_save_io_failure_is_execution_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/out.xml");
        let mut sh = shell();
        let outcome = sh.execute(&format!("vfs-save {}", target.display()));
        assert_eq!(outcome.lines.len(), 1);
        assert!(
            outcome.lines[0].starts_with("Error: command execution failed:"),
            "{:?}",
            outcome.lines
        );
    }

    #[test]
    fn test_unknown_command() {
        let mut sh = shell();
        assert_eq!(
            sh.execute("frobnicate now").lines,
            ["Error: unknown command 'frobnicate'"]
        );
    }

    #[test]
    fn test_history_includes_current_and_malformed() {
        let mut sh = shell();
        sh.execute("ls");
        sh.execute("bad  command");
        sh.execute("   ");
        assert_eq!(
            sh.execute("history").lines,
            ["1  ls", "2  bad  command", "3  history"]
        );
    }

    #[test]
    fn test_uptime_format() {
        let mut sh = shell();
        let lines = sh.execute("uptime").lines;
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split(':').collect();
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|f| f.len() == 2 && f.bytes().all(|b| b.is_ascii_digit())));
    }

    #[test]
    fn test_exit_stops_dispatch() {
        let mut sh = shell();
        let outcome = sh.execute("exit");
        assert_eq!(outcome.status, Status::Exit);
        assert_eq!(outcome.lines, [FAREWELL]);

        let after = sh.execute("ls");
        assert_eq!(after.status, Status::Exit);
        assert!(after.lines.is_empty());
        assert_eq!(sh.session().history(), ["exit"]);
    }
}
