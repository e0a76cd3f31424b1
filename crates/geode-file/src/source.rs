//! File-backed list source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use geode_core::error::{Error, InvalidInputError, TransportError};
use geode_core::{ApiUrl, Cursor, EntityKind, ListSource, Page, QueryParams, RawPage, Result};

use crate::filter::{Predicate, sort_records};

/// Page size used when the request carries no `limit`.
pub const DEFAULT_LIMIT: usize = 50;

/// Filesystem-backed list source.
///
/// Cursors are decimal offsets into the filtered, sorted collection.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    url: ApiUrl,
}

impl FileSource {
    /// Create a source for a `file://` API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a local file URL.
    pub fn new(url: ApiUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| InvalidInputError::ApiUrl {
            value: url.to_string(),
            reason: "file source needs a file:// URL".to_string(),
        })?;
        Ok(Self { root, url })
    }

    /// Returns the dataset directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path of a collection file.
    fn collection_path(&self, kind: EntityKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.collection()))
    }

    /// Read every record of a collection; a missing file is an empty one.
    async fn load(&self, kind: EntityKind) -> Result<Vec<Value>> {
        let path = self.collection_path(kind);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "collection file missing, serving empty list");
                return Ok(Vec::new());
            }
            Err(e) => return Err(TransportError::from(e).into()),
        };

        match serde_json::from_str::<Value>(&raw)? {
            Value::Array(records) => Ok(records),
            _ => Err(Error::Decode(format!(
                "{} must hold a JSON array",
                path.display()
            ))),
        }
    }
}

fn parse_offset(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw.parse::<usize>().map_err(|e| {
            InvalidInputError::Cursor {
                value: raw.to_string(),
                reason: e.to_string(),
            }
            .into()
        }),
    }
}

#[async_trait]
impl ListSource for FileSource {
    fn url(&self) -> &ApiUrl {
        &self.url
    }

    #[instrument(skip(self, params), fields(root = %self.root.display(), %kind))]
    async fn list(&self, kind: EntityKind, params: &QueryParams) -> Result<RawPage> {
        let predicates = match params.filter_object()? {
            Some(filter) => Predicate::compile(&filter)?,
            None => Vec::new(),
        };
        let sort = params.sort()?;
        let offset = parse_offset(params.cursor())?;
        let limit = params.limit()?.unwrap_or(DEFAULT_LIMIT).max(1);

        let mut records: Vec<Value> = self
            .load(kind)
            .await?
            .into_iter()
            .filter(|record| predicates.iter().all(|p| p.matches(record)))
            .collect();

        if let Some(sort) = &sort {
            sort_records(&mut records, sort);
        }

        let total = records.len();
        let end = offset.saturating_add(limit).min(total);
        let results = records
            .into_iter()
            .skip(offset)
            .take(end.saturating_sub(offset))
            .collect();

        let next = if end < total {
            Some(Cursor::new(end.to_string())?)
        } else {
            None
        };

        debug!(total, offset, end, "served page from file");
        Ok(Page { results, next })
    }
}
