//! Discovery of downward API files projected into the pod.
//!
//! The kubelet projects each value as a symbolic link (`podname -> ..data/podname`)
//! next to its own bookkeeping entries (`..data`, `..2024_01_01_00_00_00.123`).
//! Only the symbolic links are meaningful metadata.
//!
//! The traversal ([`walk`]) and the selection ([`select_entries`]) are separate
//! so selection can be tested against an in-memory listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix the kubelet uses for its own entries in a projected volume
const BOOKKEEPING_PREFIX: &str = "..";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    Symlink,
    File,
    Other,
}

impl From<fs::FileType> for EntryKind {
    fn from(file_type: fs::FileType) -> Self {
        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// One entry produced by a directory traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntryInfo {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Result of scanning the metadata directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    /// The directory does not exist. Expected outside a pod.
    Missing,
    /// Selected entries in traversal order.
    Entries(Vec<PathBuf>),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Failed to inspect {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Directory traversal failed: {0}")]
    Walk(#[from] io::Error),
}

/// Depth-first traversal below a root directory.
///
/// Entries are visited in lexical order per directory and symbolic links are
/// never followed. The root itself is not yielded.
pub struct Walk {
    /// Pending entries, last element is visited next
    stack: Vec<DirEntryInfo>,
    /// Directory to expand before popping the next entry
    pending_dir: Option<PathBuf>,
}

pub fn walk(root: impl Into<PathBuf>) -> Walk {
    Walk {
        stack: Vec::new(),
        pending_dir: Some(root.into()),
    }
}

impl Walk {
    fn expand(&mut self, dir: &Path) -> io::Result<()> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            children.push(DirEntryInfo::new(entry.path(), entry.file_type()?.into()));
        }
        children.sort_by(|a, b| a.path.cmp(&b.path));
        self.stack.extend(children.into_iter().rev());
        Ok(())
    }
}

impl Iterator for Walk {
    type Item = io::Result<DirEntryInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(dir) = self.pending_dir.take() {
            if let Err(e) = self.expand(&dir) {
                // A failed expansion ends the walk
                self.stack.clear();
                return Some(Err(e));
            }
        }

        let entry = self.stack.pop()?;
        if entry.kind == EntryKind::Dir {
            self.pending_dir = Some(entry.path.clone());
        }
        Some(Ok(entry))
    }
}

/// Picks the metadata entries out of a traversal.
///
/// Directories, bookkeeping entries (base name starting with `..`) and
/// regular files are dropped. Any traversal error fails the whole selection.
pub fn select_entries<I>(entries: I) -> Result<Vec<PathBuf>, ScanError>
where
    I: IntoIterator<Item = io::Result<DirEntryInfo>>,
{
    let mut selected = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.kind != EntryKind::Symlink || is_bookkeeping(&entry.path) {
            continue;
        }
        selected.push(entry.path);
    }
    Ok(selected)
}

fn is_bookkeeping(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(BOOKKEEPING_PREFIX))
        .unwrap_or(false)
}

/// Scans `root` for projected metadata entries.
pub fn scan(root: &Path) -> Result<Scan, ScanError> {
    match fs::metadata(root) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Scan::Missing),
        Err(source) => {
            return Err(ScanError::Root {
                path: root.to_path_buf(),
                source,
            })
        }
    }
    select_entries(walk(root)).map(Scan::Entries)
}

/// Reads the full contents of one entry, following the link.
pub fn read_contents(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}
