/// Normalize a path relative to the notes root.
///
/// Backslashes become forward slashes and leading `./` or `/` are removed,
/// so Windows and Unix walks of the same tree produce the same keys.
pub fn normalize_relative_path(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let mut rest = normalized.as_str();
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            rest = stripped;
        } else {
            break;
        }
    }
    rest.to_string()
}

/// Last path segment: `journal/2020/jan.md` → `jan.md`.
///
/// Handles both forward slashes and backslashes.
pub fn file_name(relative_path: &str) -> &str {
    relative_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(relative_path)
}

/// Directory part of a relative path, without trailing slash. Empty for root-level files.
pub fn parent_dir(relative_path: &str) -> &str {
    match relative_path.rfind('/') {
        Some(idx) => &relative_path[..idx],
        None => "",
    }
}

/// Resolve `reference` as written inside the document at `from_path`.
///
/// The reference is joined onto the referencing document's directory and
/// `.`/`..` segments are collapsed. Returns `None` when `..` climbs above the
/// notes root.
///
/// ```text
/// ("journal/a.md", "b.md")          → Some("journal/b.md")
/// ("journal/a.md", "../index.md")   → Some("index.md")
/// ("a.md", "../outside.md")         → None
/// ```
pub fn resolve_reference(from_path: &str, reference: &str) -> Option<String> {
    let reference = reference.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    if !reference.starts_with('/') {
        segments.extend(parent_dir(from_path).split('/').filter(|s| !s.is_empty()));
    }

    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
