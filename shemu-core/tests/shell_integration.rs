//! End-to-end tests driving the shell with real VFS image files.

use std::path::{Path, PathBuf};

use shemu_core::{HeadlessConsole, Node, Session, Shell, Status, Vfs, VfsError};
use tempfile::TempDir;

const IMAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<vfs>
  <dir name="root">
    <dir name="a">
      <file name="note.txt">aGk=</file>
    </dir>
    <file name="b.txt">YWJj</file>
  </dir>
</vfs>
"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn loaded_shell(path: &Path) -> Shell {
    let mut shell = Shell::default();
    let mut console = HeadlessConsole::new();
    assert!(shell.load_vfs(path, &mut console));
    shell
}

#[test]
fn test_listing_a_loaded_image() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = loaded_shell(&write_file(&dir, "vfs.xml", IMAGE));

    assert_eq!(shell.execute("ls").lines, ["a b.txt"]);
    assert_eq!(
        shell.execute("ls -l").lines,
        ["dr\ta\t1 items", "-f\tb.txt\t3 bytes"]
    );
    assert_eq!(shell.execute("ls -l /a").lines, ["-f\tnote.txt\t2 bytes"]);
}

#[test]
fn test_navigation_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = loaded_shell(&write_file(&dir, "vfs.xml", IMAGE));

    shell.execute("cd a");
    assert_eq!(shell.execute("ls").lines, ["note.txt"]);
    shell.execute("cd ..\\..\\..");
    assert_eq!(shell.vfs().pwd(), "/");
    shell.execute("cd /a");
    shell.execute("cd Root");
    assert_eq!(shell.vfs().pwd(), "/");

    let before = shell.execute("ls").lines;
    assert_eq!(
        shell.execute("cd nope").lines,
        ["Error: directory not found: nope"]
    );
    assert_eq!(shell.execute("ls").lines, before);
}

#[test]
fn test_history_reproduces_input_verbatim() {
    let mut shell = Shell::default();
    shell.execute("ls");
    shell.execute("cd a");
    shell.execute("uptime");

    assert_eq!(shell.session().history(), ["ls", "cd a", "uptime"]);
    let lines = shell.execute("history").lines;
    assert_eq!(lines, ["1  ls", "2  cd a", "3  uptime", "4  history"]);
}

#[test]
fn test_save_then_reload_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_file(&dir, "vfs.xml", IMAGE);
    let target = dir.path().join("copy.xml");

    let mut shell = loaded_shell(&source);
    shell.execute("cd a");
    let outcome = shell.execute(&format!("vfs-save {}", target.display()));
    assert_eq!(outcome.lines, [format!("VFS saved to {}", target.display())]);

    let mut reloaded = Vfs::new();
    reloaded.load_from_xml(&target).unwrap();
    assert_eq!(reloaded.root(), shell.vfs().root());
    assert_eq!(
        reloaded.lookup(&["a", "note.txt"]).and_then(Node::content),
        Some("hi")
    );
}

#[test]
fn test_failed_startup_load_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let mut shell = Shell::default();
    let mut console = HeadlessConsole::new();

    assert!(!shell.load_vfs(&dir.path().join("missing.xml"), &mut console));
    assert_eq!(console.lines().len(), 1);
    assert!(console.lines()[0].starts_with("VFS not loaded: file not found"));
    assert_eq!(shell.execute("ls").lines, ["<empty>"]);
}

#[test]
fn test_bad_images_keep_previous_tree() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_file(&dir, "vfs.xml", IMAGE);
    let wrong_root = write_file(&dir, "wrong.xml", r#"<fs><dir name="root"/></fs>"#);
    let broken = write_file(&dir, "broken.xml", r#"<vfs><dir name="root">"#);

    let mut vfs = Vfs::new();
    vfs.load_from_xml(&good).unwrap();
    let tree = vfs.root().clone();

    assert!(matches!(
        vfs.load_from_xml(&wrong_root),
        Err(VfsError::Format(_))
    ));
    assert!(matches!(vfs.load_from_xml(&broken), Err(VfsError::Parse(_))));
    assert!(matches!(
        vfs.load_from_xml(dir.path().join("absent.xml")),
        Err(VfsError::FileNotFound(_))
    ));
    assert_eq!(vfs.root(), &tree);
}

#[test]
fn test_script_file_uses_same_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let image = write_file(&dir, "vfs.xml", IMAGE);
    let script = write_file(
        &dir,
        "start.sh",
        "# list then move\nls\n\ncd a\nls -l\nbogus\nexit\nls\n",
    );

    let mut shell = Shell::new(Vfs::new(), Session::default());
    let mut console = HeadlessConsole::new();
    shell.load_vfs(&image, &mut console);
    console.clear_output();

    let status = shell.run_script_file(&script, &mut console).unwrap();
    assert_eq!(status, Status::Exit);
    assert_eq!(
        console.lines(),
        [
            "[user@localhost /]$ ls",
            "a b.txt",
            "[user@localhost /]$ cd a",
            "[user@localhost /a]$ ls -l",
            "-f\tnote.txt\t2 bytes",
            "[user@localhost /a]$ bogus",
            "Error: unknown command 'bogus'",
            "[user@localhost /a]$ exit",
            "Exiting emulator...",
        ]
    );
}

#[test]
fn test_deeply_nested_image_degrades_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let depth = 5000;
    let xml = format!(
        r#"<vfs><dir name="root">{}{}</dir></vfs>"#,
        r#"<dir name="d">"#.repeat(depth),
        "</dir>".repeat(depth)
    );
    let path = write_file(&dir, "deep.xml", &xml);

    let mut shell = Shell::default();
    let mut console = HeadlessConsole::new();
    assert!(!shell.load_vfs(&path, &mut console));
    assert!(
        console.lines()[0].starts_with("VFS not loaded: invalid VFS format"),
        "{:?}",
        console.lines()
    );
    assert_eq!(shell.execute("ls").lines, ["<empty>"]);
}
