use std::fs;
use std::path::{Path, PathBuf};

use bson::{Bson, Document};

use crate::error::StoreError;

pub type DocumentIter<'a> = Box<dyn Iterator<Item = Result<Document, StoreError>> + 'a>;

/// Source of the documents a store starts with.
///
/// Each loader owns the conversion to BSON.
pub trait Loader: Send + Sync {
    fn load(&self) -> Result<DocumentIter<'_>, StoreError>;
}

/// A loader that yields nothing. Use when the store is populated in code.
pub struct NoopLoader;

impl Loader for NoopLoader {
    fn load(&self) -> Result<DocumentIter<'_>, StoreError> {
        Ok(Box::new(std::iter::empty()))
    }
}

/// Reads movie documents from a JSON file: either one array of objects, or
/// one object per line (NDJSON). Extended JSON such as `{"$date": ...}` is
/// honoured.
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for JsonFileLoader {
    fn load(&self) -> Result<DocumentIter<'_>, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        let source = self.path.display().to_string();

        if text.trim_start().starts_with('[') {
            let values: Vec<serde_json::Value> =
                serde_json::from_str(&text).map_err(|e| parse_error(&source, e))?;
            let docs = values
                .into_iter()
                .enumerate()
                .map(move |(i, value)| to_document(value, &format!("{source}[{i}]")));
            return Ok(Box::new(docs.collect::<Vec<_>>().into_iter()));
        }

        let docs: Vec<Result<Document, StoreError>> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let location = format!("{source}:{}", i + 1);
                serde_json::from_str(line)
                    .map_err(|e| parse_error(&location, e))
                    .and_then(|value| to_document(value, &location))
            })
            .collect();
        Ok(Box::new(docs.into_iter()))
    }
}

fn parse_error(location: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Parse {
        location: location.to_string(),
        message: e.to_string(),
    }
}

/// Convert extended JSON into a document. Top-level values must be objects.
fn to_document(value: serde_json::Value, location: &str) -> Result<Document, StoreError> {
    match Bson::try_from(value).map_err(|e| parse_error(location, e))? {
        Bson::Document(doc) => Ok(doc),
        other => Err(parse_error(
            location,
            format!("expected an object, found {:?}", other.element_type()),
        )),
    }
}
