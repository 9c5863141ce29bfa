// ── Constants ───────────────────────────────────────────────────────────────

pub const ROOT: &str = "/";
pub const SEPARATOR: char = '/';

// ── Limits ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TreeLimits {
    pub max_file_size: usize,
    pub max_node_count: usize,
    pub max_name_length: usize,
}

impl Default for TreeLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024, // 10 MB
            max_node_count: 10_000,
            max_name_length: 255,
        }
    }
}

// ── Path functions ──────────────────────────────────────────────────────────

/// A path is absolute when it starts at the root separator.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Iterate the non-empty components of a path. Repeated separators collapse.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|c| !c.is_empty())
}

/// Split a path into its parent part and final component.
///
/// Trailing separators are ignored, so `a/b/` splits like `a/b`. The parent
/// part is empty for a bare relative name and `/` for a top-level absolute
/// name. The root path splits into (`/`, ``).
pub fn split_last(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return if is_absolute(path) { (ROOT, "") } else { ("", "") };
    }
    match trimmed.rfind(SEPARATOR) {
        Some(0) => (ROOT, &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => ("", trimmed),
    }
}

/// Join an absolute directory path and a child name.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT || parent.is_empty() {
        format!("{}{}", ROOT, name)
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// Check if a name contains characters the tree or the export format cannot carry.
fn has_forbidden_chars(name: &str) -> bool {
    name.chars()
        .any(|c| c.is_control() || c == SEPARATOR || c == ':')
}

/// Validate a new node name. Returns `Some(error_message)` if invalid.
pub fn validate_name(name: &str, max_name_length: usize) -> Option<String> {
    if name.is_empty() {
        return Some("Name cannot be empty".to_string());
    }
    if name == "." || name == ".." {
        return Some(format!("Name is reserved: {}", name));
    }
    if name.len() > max_name_length {
        return Some(format!(
            "Name exceeds max length ({})",
            max_name_length
        ));
    }
    if has_forbidden_chars(name) {
        return Some(format!("Name contains forbidden characters: {:?}", name));
    }
    None
}

// ── Tests ───────────────────────────────────────────────────────────────────
