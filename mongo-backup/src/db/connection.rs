//! Database connector.
//!
//! [`Connector`] and [`Connection`] are the seam between the executor and
//! the database, so runs can be driven against something other than a live
//! MongoDB deployment.

use crate::utils::errors::{BackupError, ExportCause, Result};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};

/// Opens connections to the target database.
pub trait Connector: Send + Sync + 'static {
    type Connection: Connection;

    /// Open a connection and verify it is alive.
    ///
    /// Fails with [`BackupError::Connection`] if the URI is malformed or the
    /// liveness check fails or times out.
    fn connect(&self, uri: &str) -> impl Future<Output = Result<Self::Connection>> + Send;
}

/// An open handle to the target database, owned by one run.
pub trait Connection: Send + Sync {
    /// Current collection names of `database`, in server order.
    fn list_collections(&self, database: &str) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Every document of `collection` as of the start of the read.
    fn fetch_documents(
        &self,
        database: &str,
        collection: &str,
    ) -> impl Future<Output = std::result::Result<Vec<Document>, ExportCause>> + Send;

    /// Release the connection. Calling this more than once is a no-op.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// [`Connector`] backed by the official MongoDB driver.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    timeout: Duration,
}

impl MongoConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for MongoConnector {
    type Connection = MongoConnection;

    async fn connect(&self, uri: &str) -> Result<MongoConnection> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| BackupError::Connection(format!("invalid connection string: {}", e)))?;
        options.server_selection_timeout = Some(self.timeout);
        options.connect_timeout = Some(self.timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)
            .map_err(|e| BackupError::Connection(e.to_string()))?;

        if let Err(e) = client.database("admin").run_command(doc! { "ping": 1 }).await {
            error!("MongoDB liveness check failed: {}", e);
            client.shutdown().await;
            return Err(BackupError::Connection(format!("ping failed: {}", e)));
        }

        info!("Connection to MongoDB established");
        Ok(MongoConnection {
            client: Some(client),
        })
    }
}

#[derive(Debug)]
pub struct MongoConnection {
    client: Option<Client>,
}

impl MongoConnection {
    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| BackupError::Connection("connection already closed".into()))
    }
}

impl Connection for MongoConnection {
    async fn list_collections(&self, database: &str) -> Result<Vec<String>> {
        self.client()?
            .database(database)
            .list_collection_names()
            .await
            .map_err(|e| {
                BackupError::Connection(format!("failed to list collections of {}: {}", database, e))
            })
    }

    async fn fetch_documents(
        &self,
        database: &str,
        collection: &str,
    ) -> std::result::Result<Vec<Document>, ExportCause> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ExportCause::Source("connection already closed".into()))?;

        let cursor = client
            .database(database)
            .collection::<Document>(collection)
            .find(doc! {})
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        debug!("Read {} documents from {}.{}", documents.len(), database, collection);
        Ok(documents)
    }

    async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("MongoDB connection closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_uri_is_connection_error() {
        let connector = MongoConnector::new(Duration::from_millis(200));
        let result = connector.connect("not-a-mongodb-uri").await;
        assert!(matches!(result, Err(BackupError::Connection(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        let connector = MongoConnector::new(Duration::from_millis(300));
        // Port 1 on loopback refuses connections.
        let result = connector
            .connect("mongodb://127.0.0.1:1/?directConnection=true")
            .await;
        assert!(matches!(result, Err(BackupError::Connection(_))));
    }
}
