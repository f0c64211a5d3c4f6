//! Workspace path sandboxing.
//!
//! Every tool call funnels its `file_path` argument through [`resolve`],
//! which confines it to the workspace root and the supported workbook
//! extensions. The root is re-resolved on each call from the injected
//! config, so a changed configuration takes effect on the next call.

use crate::config::ServerConfig;
use crate::error::{ExcelError, Result};
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const ALLOWED_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

/// Effective workspace root for this call: the configured override, or the
/// process working directory when none is set. Always absolute and
/// symlink-resolved.
pub fn workspace_root(config: &ServerConfig) -> Result<PathBuf> {
    let root = match config.workspace_root.as_ref() {
        Some(configured) => expand_home(configured),
        None => env::current_dir()?,
    };
    let root = absolute(root)?;
    resolve_lenient(&root)
}

/// Validate a caller-supplied path and pin it inside the workspace.
///
/// Relative paths resolve against the workspace root. The candidate is
/// normalized component-wise and its existing ancestry symlink-resolved, so
/// neither `..` segments nor sibling directories sharing a string prefix
/// with the root (`/data` vs `/data2`) can escape.
pub fn resolve(config: &ServerConfig, file_path: &str) -> Result<PathBuf> {
    let root = workspace_root(config)?;
    let candidate = expand_home(Path::new(file_path));
    let candidate = if candidate.is_absolute() {
        candidate
    } else {
        root.join(candidate)
    };
    let candidate = resolve_lenient(&candidate)?;

    if candidate != root && !candidate.starts_with(&root) {
        return Err(ExcelError::OutOfWorkspace {
            path: candidate,
            root,
        });
    }

    let allowed = candidate
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()));
    if !allowed {
        return Err(ExcelError::UnsupportedExtension { path: candidate });
    }

    if candidate.is_dir() {
        return Err(ExcelError::PathIsDirectory { path: candidate });
    }

    Ok(candidate)
}

/// Workspace-relative display form used in tool responses.
pub fn display_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if raw.contains('\\') {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Canonicalize a path that may not exist yet: lexically normalize it, then
/// symlink-resolve the deepest existing ancestor and re-append the missing
/// tail. `..` is applied before symlink resolution, which keeps a symlinked
/// subdirectory from acting as an escape hatch.
fn resolve_lenient(path: &Path) -> Result<PathBuf> {
    let normalized = lexical_normalize(path);
    let mut existing = normalized.as_path();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();

    loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => {
                let mut out = resolved;
                for part in tail.iter().rev() {
                    out.push(part);
                }
                return Ok(out);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Ok(normalized),
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_normalize_applies_dot_segments() {
        assert_eq!(
            lexical_normalize(Path::new("/a/b/../c/./d.xlsx")),
            PathBuf::from("/a/c/d.xlsx")
        );
        assert_eq!(
            lexical_normalize(Path::new("/a/../../b.xlsx")),
            PathBuf::from("/b.xlsx")
        );
    }

    #[test]
    fn display_path_uses_forward_slashes() {
        assert_eq!(display_path(Path::new("/ws/book.xlsx")), "/ws/book.xlsx");
    }
}
