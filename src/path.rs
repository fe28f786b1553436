//! Logical path normalization.
//!
//! Every facade operation canonicalizes its path(s) here before dispatch, so
//! a path names the same file on the local tree and the same key in the
//! remote container. Remote "directories" are key prefixes, which is why the
//! listing variant appends exactly one separator.

/// Separator used in logical paths and remote keys.
pub const SEPARATOR: char = '/';

/// Canonicalize a logical path.
///
/// Backslashes are treated as separators, runs of separators collapse to one
/// and a trailing separator is stripped.
///
/// # Examples
///
/// ```
/// use storage_adapter::path::normalize;
///
/// assert_eq!(normalize("out//images///a.png"), "out/images/a.png");
/// assert_eq!(normalize("out/tables/"), "out/tables");
/// assert_eq!(normalize(r"out\tables\t.csv"), "out/tables/t.csv");
/// ```
pub fn normalize(path: &str) -> String {
	let mut normalized = String::with_capacity(path.len());
	let mut previous_was_separator = false;

	for ch in path.chars() {
		let ch = if ch == '\\' { SEPARATOR } else { ch };
		if ch == SEPARATOR {
			if !previous_was_separator {
				normalized.push(SEPARATOR);
			}
			previous_was_separator = true;
		} else {
			normalized.push(ch);
			previous_was_separator = false;
		}
	}

	if normalized.ends_with(SEPARATOR) {
		normalized.pop();
	}

	normalized
}

/// Canonicalize a directory path for prefix listing.
///
/// The result ends with exactly one separator so that `out` does not match
/// keys under `output/`. The root (an empty path) stays empty and matches
/// every key.
///
/// ```
/// use storage_adapter::path::normalize_prefix;
///
/// assert_eq!(normalize_prefix("out//"), "out/");
/// assert_eq!(normalize_prefix(""), "");
/// ```
pub fn normalize_prefix(path: &str) -> String {
	let mut prefix = normalize(path);
	if !prefix.is_empty() {
		prefix.push(SEPARATOR);
	}
	prefix
}

/// Join a normalized directory and an entry name into a logical path.
pub(crate) fn join(dir: &str, name: &str) -> String {
	if dir.is_empty() {
		name.to_string()
	} else {
		format!("{}{}{}", dir, SEPARATOR, name)
	}
}

/// Whether `path` ends with `extension`, ignoring ASCII case.
///
/// The extension may be given with or without its leading dot.
pub(crate) fn has_extension(path: &str, extension: &str) -> bool {
	let extension = extension.trim_start_matches('.');
	if extension.is_empty() {
		return true;
	}

	let file_name = path.rsplit(SEPARATOR).next().unwrap_or(path);
	match file_name.rsplit_once('.') {
		Some((stem, ext)) => !stem.is_empty() && ext.eq_ignore_ascii_case(extension),
		None => false,
	}
}
