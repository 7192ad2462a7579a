//! line sources for configuration text
//!
//! The driver only knows [SourceProvider]. [FsSources] reads files, [MemorySources] serves named strings.
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

/// An opened source
pub struct Source {
    /// stable identifier, used in diagnostics and to detect include cycles
    pub id: String,
    pub reader: Box<dyn BufRead>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source").field("id", &self.id).finish_non_exhaustive()
    }
}

pub trait SourceProvider {
    /// Open `reference`, which is included from the source `parent` unless it is the root source
    fn open(&self, reference: &str, parent: Option<&str>) -> Result<Source, SourceError>;
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Source not found: {0}")]
    NotFound(String),
    #[error("Unable to read {id}")]
    Read {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    fn from_io(id: impl Into<String>, error: std::io::Error) -> Self {
        let id = id.into();
        if error.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(id)
        } else {
            SourceError::Read { id, source: error }
        }
    }
}

/// Files on disk
///
/// Includes resolve relative to the directory of the including file. Identifiers are canonical paths.
#[derive(Debug, Default, Clone)]
pub struct FsSources;

impl FsSources {
    fn resolve(reference: &str, parent: Option<&str>) -> PathBuf {
        let reference = Path::new(reference);
        match parent.and_then(|parent| Path::new(parent).parent()) {
            Some(directory) => directory.join(reference),
            None => reference.to_path_buf(),
        }
    }
}

impl SourceProvider for FsSources {
    fn open(&self, reference: &str, parent: Option<&str>) -> Result<Source, SourceError> {
        let path = Self::resolve(reference, parent);
        let path = path
            .canonicalize()
            .map_err(|e| SourceError::from_io(path.display().to_string(), e))?;
        let id = path.display().to_string();
        tracing::info!(path = %id, "opening source");

        let file = std::fs::File::open(&path).map_err(|e| SourceError::from_io(id.clone(), e))?;
        Ok(Source {
            id,
            reader: Box::new(BufReader::new(file)),
        })
    }
}

/// Named in-memory sources
///
/// ```
/// # use confargs::source::MemorySources;
/// let sources = MemorySources::default()
///     .with("main.conf", "Name Johnny\ninclude extra.conf")
///     .with("extra.conf", "Bell yes");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemorySources {
    sources: HashMap<String, String>,
}

impl MemorySources {
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(name.into(), text.into());
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl SourceProvider for MemorySources {
    fn open(&self, reference: &str, _parent: Option<&str>) -> Result<Source, SourceError> {
        let text = self
            .sources
            .get(reference)
            .ok_or_else(|| SourceError::NotFound(reference.to_string()))?;

        Ok(Source {
            id: reference.to_string(),
            reader: Box::new(Cursor::new(text.clone().into_bytes())),
        })
    }
}
