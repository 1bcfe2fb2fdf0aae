//! Textual path resolution against a current working directory.
//!
//! Resolution never touches the tree: it only folds path components onto a
//! base component sequence. Callers check the result against the tree.

/// Path keyword that jumps back to the root (matched ASCII case-insensitively).
pub const ROOT_ALIAS: &str = "root";

/// Resolve `path` relative to `cwd` into an absolute component sequence.
///
/// - `None` returns `cwd` unchanged
/// - `\` is accepted as a separator; empty segments are dropped
/// - a leading `/` starts from the root, anything else from `cwd`
/// - `.` is ignored, `..` pops one component (a no-op at the root)
/// - `root`, compared ASCII case-insensitively, resets to the root
///
/// # Examples
/// ```
/// use shemu_core::resolve;
/// let cwd = vec!["home".to_string(), "user".to_string()];
/// assert_eq!(resolve(Some("../docs"), &cwd), ["home", "docs"]);
/// assert_eq!(resolve(Some("/etc"), &cwd), ["etc"]);
/// assert!(resolve(Some("ROOT"), &cwd).is_empty());
/// ```
pub fn resolve<S: AsRef<str>>(path: Option<&str>, cwd: &[S]) -> Vec<String> {
    let base = || -> Vec<String> { cwd.iter().map(|c| c.as_ref().to_string()).collect() };
    let Some(path) = path else {
        return base();
    };

    let normalized = path.replace('\\', "/");
    let mut parts: Vec<String> = if normalized.starts_with('/') {
        Vec::new()
    } else {
        base()
    };

    for component in normalized.split('/').filter(|c| !c.is_empty()) {
        match component {
            "." => {}
            ".." => {
                parts.pop();
            }
            c if c.eq_ignore_ascii_case(ROOT_ALIAS) => parts.clear(),
            c => parts.push(c.to_string()),
        }
    }

    parts
}

/// Render a component sequence as an absolute path (`/` for the root).
pub fn join<S: AsRef<str>>(components: &[S]) -> String {
    let mut out = String::from("/");
    let joined: Vec<&str> = components.iter().map(|c| c.as_ref()).collect();
    out.push_str(&joined.join("/"));
    out
}
