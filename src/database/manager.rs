use std::future::Future;
use std::time::Duration;

use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

const DUPLICATE_KEY_CODE: i32 = 11000;

/// Errors from the persistence gateway
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid connection string: {0}")]
    InvalidUri(String),

    #[error("Duplicate value for unique field '{0}'")]
    Duplicate(String),

    #[error("Operation '{0}' timed out")]
    Timeout(&'static str),

    #[error("Unexpected document shape: {0}")]
    Decode(String),

    #[error(transparent)]
    Mongo(mongodb::error::Error),
}

impl From<mongodb::error::Error> for DatabaseError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE =>
            {
                DatabaseError::Duplicate(duplicate_field(&write_error.message))
            }
            _ => DatabaseError::Mongo(err),
        }
    }
}

/// Pull the field name out of an E11000 message (`... index: email_1 dup key: ...`).
fn duplicate_field(message: &str) -> String {
    message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(|index| {
            index
                .trim_end_matches("_-1")
                .trim_end_matches("_1")
                .to_string()
        })
        .filter(|field| !field.is_empty())
        .unwrap_or_else(|| "value".to_string())
}

/// Handle to the application database.
///
/// Cloning is cheap: the driver client is reference counted and its
/// connection pool is shared between clones.
#[derive(Clone, Debug)]
pub struct Database {
    handle: mongodb::Database,
    connect_timeout: Duration,
    operation_timeout: Duration,
    ping_timeout: Duration,
}

impl Database {
    /// Build a lazily connecting handle. Parses the URI but performs no I/O.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| DatabaseError::InvalidUri(e.to_string()))?;

        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        options.app_name = Some("invoice-api".to_string());
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);

        let client = Client::with_options(options)?;

        Ok(Self {
            handle: client.database(&config.name),
            connect_timeout,
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
            ping_timeout: Duration::from_secs(config.ping_timeout_secs),
        })
    }

    /// Build a handle and verify the server answers a ping.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let database = Self::new(config).await?;
        database.ping_within(database.connect_timeout).await?;
        info!(database = %config.name, "connected to MongoDB");
        Ok(database)
    }

    pub fn handle(&self) -> &mongodb::Database {
        &self.handle
    }

    pub fn collection<T>(&self, name: &str) -> Collection<T> {
        self.handle.collection::<T>(name)
    }

    /// Liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.ping_within(self.ping_timeout).await
    }

    async fn ping_within(&self, limit: Duration) -> Result<(), DatabaseError> {
        match tokio::time::timeout(limit, self.handle.run_command(doc! { "ping": 1 }, None)).await {
            Ok(result) => result.map(|_: Document| ()).map_err(DatabaseError::from),
            Err(_) => Err(DatabaseError::Timeout("ping")),
        }
    }

    /// Run one driver call under the per-operation timeout.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, DatabaseError>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result.map_err(DatabaseError::from),
            Err(_) => {
                warn!(operation, "database operation timed out");
                Err(DatabaseError::Timeout(operation))
            }
        }
    }
}
