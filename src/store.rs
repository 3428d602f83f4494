//! Document stores: load a [`Document`] and write it back.
//!
//! Two flavors exist. [`ProjectFile`] is the per-repository document found by
//! walking up from the working directory; not finding it is an error the user
//! has to act on. [`StateFile`] is the tool's own per-user document holding
//! cached repository state; a missing file simply means nothing is cached yet.
//!
//! Persisting writes the whole document, creating parent directories as
//! needed. There is no locking: the last writer wins.

use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::EncfigError;
use crate::file;

/// Load and persist a whole [`Document`].
pub trait DocumentStore {
    /// Where the document lives, for messages.
    fn location(&self) -> &Path;
    fn load(&self) -> Result<Document, EncfigError>;
    fn persist(&self, doc: &Document) -> Result<(), EncfigError>;
}

impl<T: DocumentStore + ?Sized> DocumentStore for &T {
    fn location(&self) -> &Path {
        (**self).location()
    }

    fn load(&self) -> Result<Document, EncfigError> {
        (**self).load()
    }

    fn persist(&self, doc: &Document) -> Result<(), EncfigError> {
        (**self).persist(doc)
    }
}

/// The project's configuration document, e.g. `.travis.yml`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFile {
    path: PathBuf,
}

impl ProjectFile {
    /// Locate `file_name` in `start` or the nearest ancestor directory.
    pub fn discover(start: &Path, file_name: &str) -> Result<Self, EncfigError> {
        let path =
            file::find_upwards(start, file_name).ok_or_else(|| EncfigError::StoreNotFound {
                file_name: file_name.into(),
                start: start.to_path_buf(),
            })?;
        tracing::debug!(path = %path.display(), "found project document");
        Ok(Self { path })
    }
}

impl DocumentStore for ProjectFile {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, EncfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| EncfigError::IoError {
            path: self.path.clone(),
            source: e,
        })?;
        parse_at(&self.path, &content)
    }

    fn persist(&self, doc: &Document) -> Result<(), EncfigError> {
        write_document(&self.path, doc)
    }
}

/// The tool's per-user state document (`state.yml` in the config directory).
#[derive(Debug, Clone, PartialEq)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub const FILE_NAME: &'static str = "state.yml";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `state.yml` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }
}

impl DocumentStore for StateFile {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Document, EncfigError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => parse_at(&self.path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(EncfigError::IoError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn persist(&self, doc: &Document) -> Result<(), EncfigError> {
        write_document(&self.path, doc)
    }
}

fn parse_at(path: &Path, content: &str) -> Result<Document, EncfigError> {
    Document::parse(content).map_err(|e| EncfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize `doc` and write it to `path`, creating parent directories.
fn write_document(path: &Path, doc: &Document) -> Result<(), EncfigError> {
    let content = doc.to_yaml().map_err(|e| EncfigError::InvalidValue {
        key: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EncfigError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, content).map_err(|e| EncfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "persisted document");
    Ok(())
}
