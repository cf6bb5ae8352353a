//! Path helpers shared by the `cd` builtin and the tab strip

use std::io;
use std::path::{Path, PathBuf};

use crate::error::ExecError;

/// Longest final path component shown before truncation
const MAX_LEAF_CHARS: usize = 12;

/// Expand `~` and `~/...` against the home directory
pub fn expand_tilde(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (path, Some(home)) if path.starts_with("~/") => home.join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

/// Resolve the target of `cd [path]` relative to `cwd`.
///
/// A missing argument means the home directory. The result is canonical and
/// guaranteed to be a directory.
pub fn resolve_directory(cwd: &Path, target: Option<&str>) -> Result<PathBuf, ExecError> {
    let home = dirs::home_dir();
    let requested = match target.map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => expand_tilde(raw, home.as_deref()),
        None => home.ok_or_else(|| ExecError::ChangeDirectory {
            path: PathBuf::from("~"),
            source: io::Error::new(io::ErrorKind::NotFound, "HOME not set"),
        })?,
    };

    let absolute = if requested.is_absolute() {
        requested.clone()
    } else {
        cwd.join(&requested)
    };

    let resolved = std::fs::canonicalize(&absolute).map_err(|source| {
        ExecError::ChangeDirectory {
            path: requested.clone(),
            source,
        }
    })?;

    if !resolved.is_dir() {
        return Err(ExecError::ChangeDirectory {
            path: requested,
            source: io::Error::new(io::ErrorKind::NotADirectory, "Not a directory"),
        });
    }

    Ok(resolved)
}

/// Compact a directory for display: home becomes `~`, parent components are
/// reduced to their first letter and a long leaf is truncated.
pub fn shorten_path(path: &Path, home: Option<&Path>) -> String {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return String::new();
    }

    let modified = match home.and_then(|h| path.strip_prefix(h).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", rest.to_string_lossy()),
        None => text.into_owned(),
    };

    let components: Vec<&str> = modified.split('/').filter(|c| !c.is_empty()).collect();
    let mut output = String::new();
    if modified.starts_with('/') {
        output.push('/');
    }

    for (idx, component) in components.iter().enumerate() {
        if idx + 1 == components.len() {
            if component.chars().count() > MAX_LEAF_CHARS {
                output.extend(component.chars().take(MAX_LEAF_CHARS));
                output.push_str("...");
            } else {
                output.push_str(component);
            }
        } else if let Some(first) = component.chars().next() {
            output.push(first);
            output.push('/');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/parrot");
        assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/parrot"));
        assert_eq!(
            expand_tilde("~/src", Some(home)),
            PathBuf::from("/home/parrot/src")
        );
        assert_eq!(expand_tilde("~other", Some(home)), PathBuf::from("~other"));
        assert_eq!(expand_tilde("~/src", None), PathBuf::from("~/src"));
    }

    #[test]
    fn test_shorten_path() {
        let home = Path::new("/home/parrot");
        assert_eq!(
            shorten_path(Path::new("/home/parrot/projects/crate"), Some(home)),
            "~/p/crate"
        );
        assert_eq!(shorten_path(Path::new("/home/parrot"), Some(home)), "~");
        assert_eq!(shorten_path(Path::new("/usr/local/bin"), None), "/u/l/bin");
        assert_eq!(
            shorten_path(Path::new("/var/a_very_long_directory_name"), None),
            "/v/a_very_long_...",
        );
        assert_eq!(shorten_path(Path::new("/"), None), "/");
    }

    #[test]
    fn test_resolve_relative_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();

        let resolved = resolve_directory(temp.path(), Some("nested")).unwrap();
        assert_eq!(resolved, temp.path().join("nested").canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_rejects_missing_and_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("file.txt"), "x").unwrap();

        let missing = resolve_directory(temp.path(), Some("/nonexistent")).unwrap_err();
        assert!(missing.to_string().starts_with("cd: /nonexistent:"));

        let file = resolve_directory(temp.path(), Some("file.txt")).unwrap_err();
        assert!(file.to_string().contains("Not a directory"));
    }
}
