//! In-memory view of a downloaded source archive.

/// One member of a source archive, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Slash-separated path inside the archive (e.g. `nvda-2024.1/source/nvda.pyw`).
    pub path: String,
    /// File payload. `None` for directory entries.
    pub contents: Option<Vec<u8>>,
    /// Whether the entry is a directory marker.
    pub is_dir: bool,
    /// Whether the path stays inside the extraction directory.
    pub enclosed: bool,
}

impl ArchiveEntry {
    /// A regular file entry.
    pub fn file(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Some(contents.into()),
            is_dir: false,
            enclosed: true,
        }
    }

    /// A directory marker entry.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: None,
            is_dir: true,
            enclosed: true,
        }
    }

    /// Mark the path as escaping the extraction directory (`..`, absolute).
    pub fn not_enclosed(mut self) -> Self {
        self.enclosed = false;
        self
    }

    /// First path segment, i.e. the archive's top-level folder.
    pub fn top_level(&self) -> &str {
        self.path.split('/').next().unwrap_or_default()
    }
}

/// The subtree of an archive that gets installed: `<top-level>/<subdir>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePrefix(String);

impl SourcePrefix {
    /// Build the prefix from the top-level folder name and the relative source subdirectory.
    pub fn new(top_level: &str, subdir: &str) -> Self {
        let top = top_level.trim_matches('/');
        let sub = subdir.trim_matches('/');
        if sub.is_empty() {
            Self(format!("{top}/"))
        } else {
            Self(format!("{top}/{sub}/"))
        }
    }

    /// The prefix string, always ending in `/`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of `entry_path` relative to the prefix, or `None` when the entry lies outside it.
    ///
    /// The prefix directory itself maps to the empty string.
    pub fn relative<'a>(&self, entry_path: &'a str) -> Option<&'a str> {
        entry_path.strip_prefix(self.0.as_str())
    }
}

impl std::fmt::Display for SourcePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level() {
        assert_eq!(ArchiveEntry::dir("proj-v1/").top_level(), "proj-v1");
        assert_eq!(ArchiveEntry::file("proj-v1/readme.md", "x").top_level(), "proj-v1");
    }

    #[test]
    fn test_prefix_relative() {
        let prefix = SourcePrefix::new("proj-v1", "source");
        assert_eq!(prefix.as_str(), "proj-v1/source/");
        assert_eq!(prefix.relative("proj-v1/source/app/main.py"), Some("app/main.py"));
        assert_eq!(prefix.relative("proj-v1/source/"), Some(""));
        assert_eq!(prefix.relative("proj-v1/sources/x.py"), None);
        assert_eq!(prefix.relative("proj-v1/requirements.txt"), None);
    }

    #[test]
    fn test_prefix_normalizes_slashes() {
        assert_eq!(SourcePrefix::new("proj-v1/", "/source/").as_str(), "proj-v1/source/");
        assert_eq!(SourcePrefix::new("proj-v1", "").as_str(), "proj-v1/");
    }
}
