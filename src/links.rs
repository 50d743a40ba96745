use regex::Regex;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

/// An inline `[label](target)` occurrence inside a document.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRef {
    pub label: String,
    pub target: String,
    /// Byte range of the target text, excluding the parentheses
    pub target_span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    External,
    Anchor,
    Internal,
}

impl LinkRef {
    pub fn kind(&self) -> LinkKind {
        classify(&self.target)
    }
}

pub struct LinkScanner {
    link_re: Regex,
}

impl LinkScanner {
    pub fn new() -> Result<LinkScanner, regex::Error> {
        Ok(LinkScanner {
            link_re: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)")?,
        })
    }

    /// All links in order of appearance.
    pub fn extract(&self, content: &str) -> Vec<LinkRef> {
        self.link_re
            .captures_iter(content)
            .filter_map(|caps| {
                let label = caps.get(1)?;
                let target = caps.get(2)?;
                Some(LinkRef {
                    label: label.as_str().to_string(),
                    target: target.as_str().to_string(),
                    target_span: target.range(),
                })
            })
            .collect()
    }
}

/// Network schemes are external; `file:` URIs and bare paths are internal.
pub fn classify(target: &str) -> LinkKind {
    if target.starts_with('#') {
        return LinkKind::Anchor;
    }
    if let Some(colon) = target.find(':') {
        let scheme = &target[..colon];
        // Single letters are drive names, not schemes
        let is_scheme = scheme.len() >= 2
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
        if is_scheme && !scheme.eq_ignore_ascii_case("file") {
            return LinkKind::External;
        }
    }
    LinkKind::Internal
}

/// Split `path#anchor` on the first `#`.
pub fn split_anchor(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (target, None),
    }
}

/// Remove `root_uri` from the front of `path`, ignoring ASCII case.
pub fn strip_root_uri<'a>(path: &'a str, root_uri: &str) -> Option<&'a str> {
    if root_uri.is_empty() {
        return None;
    }
    let head = path.get(..root_uri.len())?;
    if head.eq_ignore_ascii_case(root_uri) {
        Some(&path[root_uri.len()..])
    } else {
        None
    }
}

/// Filesystem path named by a `file://` URI. `file:///D:/x` keeps the drive
/// (`D:/x`); `file:///tmp/x` stays absolute (`/tmp/x`).
pub fn file_uri_path(uri: &str) -> Option<PathBuf> {
    let rest = strip_root_uri(uri, "file://")?;
    let bytes = rest.as_bytes();
    let has_drive = bytes.len() >= 3
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':';
    if has_drive {
        Some(PathBuf::from(&rest[1..]))
    } else {
        Some(PathBuf::from(rest))
    }
}

/// Last path component, accepting either separator.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `/..` stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Relative path from directory `from` to `to`, `/`-separated.
///
/// Both paths must share the same root; returns `None` when they do not
/// (different drives, or one absolute and one relative).
pub fn relative_path(from: &Path, to: &Path) -> Option<String> {
    let from = normalize(from);
    let to = normalize(to);

    fn root_of(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
            .collect()
    }
    if root_of(&from) != root_of(&to) {
        return None;
    }

    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();
    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Climbing out of an unknown parent cannot be expressed
    if from_parts[common..].iter().any(|c| *c == Component::ParentDir) {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        parts.push("..".to_string());
    }
    for part in &to_parts[common..] {
        parts.push(part.as_os_str().to_string_lossy().to_string());
    }

    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}
