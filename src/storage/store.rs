//! Annotation store: a directory of annotation files backed by a
//! read-through cache of the remote LYTAF databases.
//!
//! Each source lives in `annotation_<source>.lytaf`. How the remote copy is
//! obtained is left to a [`RemoteFetcher`]; the store only decides when to
//! ask for it, according to its [`CachePolicy`].

use crate::core::record::{EventTypeDef, IntervalRecord, LytafSource};
use crate::core::temporal::TimeRange;
use crate::error::{Error, Result};
use crate::storage::annotation_file::{self, AnnotationHeader, AnnotationReader};
use crate::storage::loader::CatalogueLoader;
use crate::storage::table::AnnotationTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// When the store goes to the remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Never fetch. A missing local file is an error.
    LocalOnly,
    /// Use the local file when present, fetching only when it is missing.
    #[default]
    PreferLocal,
    /// Always fetch and overwrite the local file.
    ForceRemote,
}

/// Retrieves the current contents of a remote annotation database
#[cfg_attr(test, mockall::automock)]
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, source: LytafSource) -> Result<AnnotationTable>;
}

/// Disk-backed implementation of `CatalogueLoader`
pub struct AnnotationStore {
    /// Directory where annotation files are stored.
    dir: PathBuf,
    policy: CachePolicy,
    fetcher: Option<Box<dyn RemoteFetcher>>,
}

impl AnnotationStore {
    /// Open a store rooted at the given directory, creating it if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            policy: CachePolicy::default(),
            fetcher: None,
        })
    }

    /// Set the cache policy
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the remote fetcher
    pub fn with_fetcher<F: RemoteFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the local file for `source`
    pub fn path_for(&self, source: LytafSource) -> PathBuf {
        self.dir.join(format!("annotation_{}.lytaf", source.as_str()))
    }

    /// Write `table` as the local copy of `source`
    pub fn import(&self, source: LytafSource, table: &AnnotationTable) -> Result<AnnotationHeader> {
        let header = annotation_file::write_table(self.path_for(source), source, table)?;
        debug!(
            source = %source,
            events = header.event_count,
            types = header.type_count,
            "wrote annotation file"
        );
        Ok(header)
    }

    fn read_local(&self, source: LytafSource) -> Result<AnnotationTable> {
        AnnotationReader::open(self.path_for(source))?.read_table()
    }

    fn refresh(&self, source: LytafSource) -> Result<AnnotationTable> {
        let fetcher = self.fetcher.as_ref().ok_or_else(|| {
            Error::NotAvailable(format!(
                "No remote fetcher configured to retrieve {}",
                source.db_name()
            ))
        })?;
        info!(source = %source, "fetching remote annotation database");
        let table = fetcher.fetch(source)?;
        self.import(source, &table)?;
        Ok(table)
    }

    /// Resolve the table for `source` according to the cache policy
    fn table_for(&self, source: LytafSource) -> Result<AnnotationTable> {
        match self.policy {
            CachePolicy::ForceRemote => self.refresh(source),
            _ if self.path_for(source).exists() => self.read_local(source),
            CachePolicy::LocalOnly => Err(Error::NotAvailable(format!(
                "{} is not in the local store at {}",
                source.db_name(),
                self.dir.display()
            ))),
            CachePolicy::PreferLocal => {
                info!(source = %source, "no local annotation file");
                self.refresh(source)
            }
        }
    }
}

impl CatalogueLoader for AnnotationStore {
    fn load(&self, source: LytafSource, range: &TimeRange) -> Result<Vec<IntervalRecord>> {
        let table = self.table_for(source)?;
        let records = table.records_in(range)?;
        debug!(source = %source, records = records.len(), "loaded annotation records");
        Ok(records)
    }

    fn event_types(&self, source: LytafSource) -> Result<Vec<EventTypeDef>> {
        Ok(self.table_for(source)?.definitions())
    }

    fn load_with_types(
        &self,
        source: LytafSource,
        range: &TimeRange,
    ) -> Result<(Vec<IntervalRecord>, Vec<EventTypeDef>)> {
        let table = self.table_for(source)?;
        let records = table.records_in(range)?;
        debug!(source = %source, records = records.len(), "loaded annotation records and types");
        Ok((records, table.definitions()))
    }
}
