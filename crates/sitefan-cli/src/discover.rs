//! Destination discovery by directory-name convention.

use std::io;
use std::path::Path;

use sitefan_schema::DestinationRoot;

/// Subdirectories of `dir` whose name starts with `prefix`, sorted by name.
///
/// Files and non-UTF-8 names are ignored.
pub fn discover_roots(dir: &Path, prefix: &str) -> io::Result<Vec<DestinationRoot>> {
    let mut roots = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !name.starts_with(prefix) || !entry.path().is_dir() {
            continue;
        }
        roots.push(DestinationRoot::new(entry.path()));
    }

    roots.sort();
    tracing::debug!(dir = %dir.display(), prefix, found = roots.len(), "Discovered distributions");
    Ok(roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_matches_prefixed_directories_only() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("python311-64")).unwrap();
        std::fs::create_dir(dir.path().join("python37-32")).unwrap();
        std::fs::create_dir(dir.path().join("venv")).unwrap();
        std::fs::write(dir.path().join("python-notes.txt"), "x").unwrap();

        let roots = discover_roots(dir.path(), "python").unwrap();

        assert_eq!(
            roots,
            vec![
                DestinationRoot::new(dir.path().join("python311-64")),
                DestinationRoot::new(dir.path().join("python37-32")),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(discover_roots(dir.path(), "python").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_errors() {
        let dir = TempDir::new().unwrap();
        assert!(discover_roots(&dir.path().join("nope"), "python").is_err());
    }
}
