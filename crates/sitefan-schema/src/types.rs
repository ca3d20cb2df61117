//! Selector, requirement and destination types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which revision of the upstream repository to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionSelector {
    /// Newest published release, looked up through the release metadata API.
    #[default]
    Latest,
    /// Tip of the default branch.
    Head,
    /// An explicit tag name.
    Tag(String),
}

/// Errors that can occur when parsing a [`VersionSelector`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector string was empty or whitespace.
    #[error("Version selector must not be empty")]
    Empty,
}

impl FromStr for VersionSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(SelectorError::Empty),
            "latest" => Ok(Self::Latest),
            "head" => Ok(Self::Head),
            tag => Ok(Self::Tag(tag.to_string())),
        }
    }
}

impl TryFrom<String> for VersionSelector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionSelector> for String {
    fn from(value: VersionSelector) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Head => f.write_str("head"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// A single pip requirement string (e.g. `comtypes==1.2.0`), already trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement(String);

impl Requirement {
    /// Parse one declaration line. Returns `None` for blank lines and `#` comments.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(Self(line.to_string()))
    }

    /// Return the requirement as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<std::ffi::OsStr> for Requirement {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

/// Raw text of a dependency-declaration file (`requirements.txt`).
///
/// Kept verbatim; [`requirements`](Self::requirements) yields the lines that
/// actually name a package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDeclaration(String);

impl DependencyDeclaration {
    /// Wrap declaration text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The declaration exactly as captured from the archive.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Requirement lines in file order, skipping blanks and comments.
    pub fn requirements(&self) -> impl Iterator<Item = Requirement> + '_ {
        self.0.split('\n').filter_map(Requirement::from_line)
    }
}

/// One target Python distribution that receives the extracted sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DestinationRoot(PathBuf);

impl DestinationRoot {
    /// Wrap a distribution directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The distribution directory itself.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Join a path relative to this root.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.0.join(rel)
    }
}

impl AsRef<Path> for DestinationRoot {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for DestinationRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parsing() {
        assert_eq!("latest".parse::<VersionSelector>(), Ok(VersionSelector::Latest));
        assert_eq!("head".parse::<VersionSelector>(), Ok(VersionSelector::Head));
        assert_eq!(
            " release-2024.1 ".parse::<VersionSelector>(),
            Ok(VersionSelector::Tag("release-2024.1".to_string()))
        );
        assert_eq!("  ".parse::<VersionSelector>(), Err(SelectorError::Empty));
    }

    #[test]
    fn test_selector_serde_as_string() {
        let json = serde_json::to_string(&VersionSelector::Tag("v1".into())).unwrap();
        assert_eq!(json, "\"v1\"");
        let back: VersionSelector = serde_json::from_str("\"head\"").unwrap();
        assert_eq!(back, VersionSelector::Head);
        assert!(serde_json::from_str::<VersionSelector>("\"\"").is_err());
    }

    #[test]
    fn test_requirements_skip_blank_and_comments() {
        let decl = DependencyDeclaration::new("foo\n# bar\n\nbaz");
        let reqs: Vec<String> = decl.requirements().map(|r| r.to_string()).collect();
        assert_eq!(reqs, vec!["foo", "baz"]);
    }

    #[test]
    fn test_requirements_trim_whitespace_and_crlf() {
        let decl = DependencyDeclaration::new(
            "  wxPython==4.2 \r\n\t# indented comment\r\n   \r\nconfigobj\r\n",
        );
        let reqs: Vec<String> = decl.requirements().map(|r| r.to_string()).collect();
        assert_eq!(reqs, vec!["wxPython==4.2", "configobj"]);
    }

    #[test]
    fn test_empty_declaration() {
        let decl = DependencyDeclaration::default();
        assert!(decl.is_empty());
        assert_eq!(decl.requirements().count(), 0);
    }
}
