//! Archive materialization: fan the archive's source subtree out into every
//! destination root and capture the dependency declaration on the way.
//!
//! ## Rules
//!
//! - The first archive entry names the top-level folder. Only entries below
//!   `<top-level>/<source_subdir>/` are written; everything else (build
//!   scripts, tests, docs) is ignored.
//! - The dependency declaration is searched for across the *whole* archive,
//!   and the last matching entry wins.
//! - Each selected file lands at `<root>/<site_lib>/<relative path>` for every
//!   root. An existing regular file is removed first; directories are never
//!   removed.
//! - An entry the zip reader does not consider enclosed (absolute, or `..`
//!   climbing out of the archive) aborts the run before it is written.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use thiserror::Error;
use zip::ZipArchive;

use sitefan_schema::{ArchiveEntry, DependencyDeclaration, DestinationRoot, SourcePrefix};

use crate::Reporter;
use crate::config::SiteLayout;

/// Errors while reading the archive or writing it out.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// Filesystem error below a destination root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive could not be parsed as a zip.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive has no entries to name the top-level folder.
    #[error("Archive is empty")]
    EmptyArchive,

    /// The dependency declaration is not text.
    #[error("Dependency declaration {path} is not valid UTF-8")]
    Decode {
        /// Archive path of the declaration.
        path: String,
    },

    /// An entry path escapes the extraction directory.
    #[error("Invalid path in archive: {0}")]
    UnsafePath(String),
}

/// Parse zip bytes into entries, preserving archive order.
pub fn read_entries(archive_bytes: &[u8]) -> Result<Vec<ArchiveEntry>, MaterializeError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let path = file.name().to_string();
        let enclosed = file.enclosed_name().is_some();

        let entry = if file.is_dir() {
            ArchiveEntry::dir(path)
        } else {
            let mut contents = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
            file.read_to_end(&mut contents)?;
            ArchiveEntry::file(path, contents)
        };
        entries.push(if enclosed { entry } else { entry.not_enclosed() });
    }

    Ok(entries)
}

/// Parse `archive_bytes` and materialize it into `roots`.
///
/// Returns the captured dependency declaration, empty when the archive has
/// none. With no roots nothing is written, but the declaration is still
/// returned.
pub fn materialize<R: Reporter + ?Sized>(
    archive_bytes: &[u8],
    roots: &[DestinationRoot],
    layout: &SiteLayout,
    reporter: &R,
) -> Result<DependencyDeclaration, MaterializeError> {
    let entries = read_entries(archive_bytes)?;
    materialize_entries(&entries, roots, layout, reporter)
}

/// Materialize already-parsed entries. See the [module docs](self) for the rules.
pub fn materialize_entries<R: Reporter + ?Sized>(
    entries: &[ArchiveEntry],
    roots: &[DestinationRoot],
    layout: &SiteLayout,
    reporter: &R,
) -> Result<DependencyDeclaration, MaterializeError> {
    let (first, rest) = entries.split_first().ok_or(MaterializeError::EmptyArchive)?;
    let prefix = SourcePrefix::new(first.top_level(), &layout.source_subdir);
    tracing::debug!(%prefix, roots = roots.len(), "Materializing archive");

    let mut declaration = DependencyDeclaration::default();

    for entry in rest {
        if entry.path.ends_with(layout.declaration_file.as_str()) {
            declaration = decode_declaration(entry)?;
        }

        let Some(relative) = prefix.relative(&entry.path) else {
            continue;
        };
        if roots.is_empty() {
            continue;
        }
        if !entry.enclosed {
            return Err(MaterializeError::UnsafePath(entry.path.clone()));
        }

        for root in roots {
            let target = layout.site_dir(root).join(relative);
            write_entry(entry, &target)?;
        }

        if !entry.is_dir {
            reporter.extracted(relative);
        }
    }

    Ok(declaration)
}

fn decode_declaration(entry: &ArchiveEntry) -> Result<DependencyDeclaration, MaterializeError> {
    let bytes = entry.contents.clone().unwrap_or_default();
    let text = String::from_utf8(bytes).map_err(|_| MaterializeError::Decode {
        path: entry.path.clone(),
    })?;
    tracing::debug!(path = %entry.path, "Captured dependency declaration");
    Ok(DependencyDeclaration::new(text))
}

fn write_entry(entry: &ArchiveEntry, target: &Path) -> Result<(), MaterializeError> {
    if entry.is_dir || entry.path.ends_with('/') {
        fs::create_dir_all(target)?;
        return Ok(());
    }

    if target.is_file() {
        fs::remove_file(target)?;
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    tracing::trace!(target = %target.display(), "Writing file");
    fs::write(target, entry.contents.as_deref().unwrap_or_default())?;
    Ok(())
}
