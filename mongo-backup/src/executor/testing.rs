//! In-memory database used by executor and API tests.

use crate::db::{Connection, Connector};
use crate::utils::errors::{BackupError, ExportCause, Result};
use mongodb::bson::Document;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum FakeCollection {
    Docs(Vec<Document>),
    /// Reading this collection fails
    Fail,
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    pub collections: Vec<(String, FakeCollection)>,
    pub fail_connect: bool,
    pub fail_list: bool,
    pub closes: Arc<AtomicUsize>,
}

impl FakeConnector {
    pub fn with(collections: Vec<(&str, FakeCollection)>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }
}

impl Connector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(&self, _uri: &str) -> Result<FakeConnection> {
        if self.fail_connect {
            return Err(BackupError::Connection("server selection timed out".into()));
        }
        Ok(FakeConnection {
            collections: self.collections.clone(),
            fail_list: self.fail_list,
            closes: self.closes.clone(),
            closed: false,
        })
    }
}

#[derive(Debug)]
pub struct FakeConnection {
    collections: Vec<(String, FakeCollection)>,
    fail_list: bool,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl FakeConnection {
    pub fn with(collections: Vec<(&str, FakeCollection)>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|(name, c)| (name.to_string(), c))
                .collect(),
            fail_list: false,
            closes: Arc::default(),
            closed: false,
        }
    }
}

impl Connection for FakeConnection {
    async fn list_collections(&self, _database: &str) -> Result<Vec<String>> {
        if self.fail_list {
            return Err(BackupError::Connection("listCollections failed".into()));
        }
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_documents(
        &self,
        _database: &str,
        collection: &str,
    ) -> std::result::Result<Vec<Document>, ExportCause> {
        match self.collections.iter().find(|(name, _)| name == collection) {
            Some((_, FakeCollection::Docs(docs))) => Ok(docs.clone()),
            Some((_, FakeCollection::Fail)) => {
                Err(ExportCause::Source("connection reset by peer".into()))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
