//! Platform-independent path algebra on forward-slash paths.
//!
//! Everything here works on `&str` rather than `std::path::Path` so that keys,
//! emission names and specifiers look the same on every host: backslashes are
//! converted to `/`, and Windows drive prefixes (`C:`) are kept as the root.

/// Script extensions that identify a module, longest declaration forms first.
const DECLARABLE_EXTENSIONS: &[&str] = &[
    ".d.ts", ".d.mts", ".d.cts", ".tsx", ".ts", ".mts", ".cts", ".jsx", ".js", ".mjs", ".cjs",
];

/// Convert backslashes to forward slashes.
pub fn to_slash(path: &str) -> String {
    path.replace('\\', "/")
}

/// Split a slash path into its root (`""`, `"/"` or `"C:/"`) and the rest.
fn split_root(path: &str) -> (String, &str) {
    if let Some(rest) = path.strip_prefix('/') {
        return ("/".to_string(), rest);
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let rest = &path[2..];
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        return (format!("{}/", &path[..2]), rest);
    }
    (String::new(), path)
}

/// Whether `path` is absolute (POSIX root or drive letter).
pub fn is_absolute(path: &str) -> bool {
    !split_root(&to_slash(path)).0.is_empty()
}

/// Collapse `.`, `..` and duplicate separators.
///
/// Relative paths keep their leading `..` segments; `..` above an absolute
/// root is dropped. An empty relative result is `"."`.
pub fn normalize(path: &str) -> String {
    let slashed = to_slash(path);
    let (root, rest) = split_root(&slashed);

    let mut segments: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ if !root.is_empty() => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (root.is_empty(), joined.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => joined,
        (false, _) => format!("{root}{joined}"),
    }
}

/// Segments of a normalized path, without its root. `"."` has none.
fn segments(path: &str) -> (String, Vec<String>) {
    let normalized = normalize(path);
    let (root, rest) = split_root(&normalized);
    let parts = rest
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(str::to_string)
        .collect();
    (root, parts)
}

/// Parent directory. `"."` for a bare file name; the root for a root child.
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    let (root, rest) = split_root(&normalized);
    match rest.rfind('/') {
        Some(index) => format!("{root}{}", &rest[..index]),
        None if !root.is_empty() => root,
        None => ".".to_string(),
    }
}

/// Last path segment.
pub fn basename(path: &str) -> String {
    let slashed = to_slash(path);
    let trimmed = slashed.trim_end_matches('/');
    trimmed
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Extension of the last segment including the dot, or `""`.
pub fn extname(path: &str) -> String {
    let base = basename(path);
    match base.rfind('.') {
        Some(index) if index > 0 => base[index..].to_string(),
        _ => String::new(),
    }
}

/// Join two paths and normalize. Empty sides are ignored.
pub fn join(base: &str, path: &str) -> String {
    match (base.is_empty(), path.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => normalize(path),
        (false, true) => normalize(base),
        (false, false) => normalize(&format!("{base}/{path}")),
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve(base: &str, path: &str) -> String {
    if is_absolute(path) {
        normalize(path)
    } else {
        join(base, path)
    }
}

/// Relative path from directory `from` to `to`. Equal paths give `""`.
///
/// Paths on different roots have no relative form; `to` is returned
/// normalized.
pub fn relative(from: &str, to: &str) -> String {
    let (from_root, from_parts) = segments(from);
    let (to_root, to_parts) = segments(to);
    if from_root != to_root {
        return normalize(to);
    }

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(from_parts.len() - common));
    parts.extend(to_parts[common..].iter().map(String::as_str));
    parts.join("/")
}

/// Directory shared by every path, aligned on segment boundaries.
///
/// - no paths: `""`
/// - one path: its parent directory
/// - many: segment-wise prefix intersection; when only the root is shared the
///   root marker is returned rather than an empty string
pub fn lowest_common_ancestor<S: AsRef<str>>(paths: &[S]) -> String {
    match paths {
        [] => return String::new(),
        [only] => return dirname(only.as_ref()),
        _ => {}
    }

    let normalized: Vec<String> = paths.iter().map(|p| normalize(p.as_ref())).collect();
    let mut ancestor: Vec<&str> = normalized[0].split('/').collect();

    for path in &normalized[1..] {
        let shared = path
            .split('/')
            .zip(&ancestor)
            .take_while(|(segment, kept)| segment == *kept)
            .count();
        ancestor.truncate(shared);
    }

    match ancestor.as_slice() {
        [] => String::new(),
        [""] => "/".to_string(),
        [drive] if drive.len() == 2 && drive.ends_with(':') => format!("{drive}/"),
        _ => ancestor.join("/"),
    }
}

/// Remove one trailing script extension (`.d.ts` counts as one).
///
/// Used to build the logical identity of a module, so that `a.ts`, `a.tsx`
/// and `a.mts` all collapse to `a`.
pub fn strip_declarable_extension(name: &str) -> String {
    let slashed = to_slash(name);
    for ext in DECLARABLE_EXTENSIONS {
        if let Some(stem) = slashed.strip_suffix(ext) {
            if !stem.is_empty() && !stem.ends_with('/') {
                return stem.to_string();
            }
        }
    }
    slashed
}

/// Whether the last segment ends in a script extension.
pub fn has_script_extension(specifier: &str) -> bool {
    let base = basename(specifier);
    DECLARABLE_EXTENSIONS
        .iter()
        .any(|ext| base.len() > ext.len() && base.ends_with(ext))
}

/// Runtime (JavaScript-family) counterpart of a file's extension.
///
/// `.ts`/`.tsx` → `.js`, `.mts` → `.mjs`, `.cts` → `.cjs`; JavaScript
/// extensions map to themselves. `None` when the extension is not a script.
pub fn guess_counterpart_extension(specifier: &str) -> Option<&'static str> {
    match extname(specifier).as_str() {
        ".ts" | ".tsx" | ".js" | ".jsx" => Some(".js"),
        ".mts" | ".mjs" => Some(".mjs"),
        ".cts" | ".cjs" => Some(".cjs"),
        _ => None,
    }
}

/// Module key: absolute, normalized, extension stripped.
pub fn module_key(path: &str) -> String {
    strip_declarable_extension(&normalize(path))
}
