use crate::errors::BackupError;
use async_trait::async_trait;

/// Permanently removes a database from the server.
#[async_trait]
pub trait Dropper: Send + Sync {
    async fn drop_database(&self, database: &str) -> Result<(), BackupError>;
}

mod mysql_client;
pub use mysql_client::MysqlClient;
