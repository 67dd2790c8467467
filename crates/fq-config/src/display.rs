//! Path formatting for terminal output.

use std::path::Path;

use directories::BaseDirs;
use pathdiff::diff_paths;

use crate::Field;

/// Formats a path for display.
///
/// Paths under `base` are shown relative to it, paths under the home directory with a
/// `~/` prefix, and anything else as given.
pub fn format_path_for_display(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base
        && path.starts_with(base)
        && let Some(relative) = diff_paths(path, base)
    {
        if relative.as_os_str().is_empty() {
            return String::from(".");
        }
        return relative.display().to_string();
    }

    if let Some(dirs) = BaseDirs::new()
        && let Ok(rest) = path.strip_prefix(dirs.home_dir())
    {
        return format!("~/{}", rest.display());
    }

    path.display().to_string()
}

/// Describes where a field was defined: `built-in` or the defining file.
pub fn format_origin(field: &Field, base: Option<&Path>) -> String {
    field.origin.as_deref().map_or_else(
        || String::from("built-in"),
        |path| format_path_for_display(path, base),
    )
}
