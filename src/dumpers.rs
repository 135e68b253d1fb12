use crate::errors::BackupError;
use async_trait::async_trait;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

#[async_trait]
pub trait Dumper: Send + Sync {
    /// Writes the dump of `database` into `output`, which is already created and empty.
    async fn dump(&self, database: &str, output: File) -> Result<(), BackupError>;
}

mod mysqldump;
pub use mysqldump::MysqlDump;

///Creates (or truncates) the dump file at `path` and fills it using `dumper`.
///On failure the file is removed so no truncated dump is left behind.
pub async fn create_dump(
    dumper: &dyn Dumper,
    database: &str,
    path: &Path,
) -> Result<(), BackupError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|source| BackupError::FileCreate {
            database: database.to_string(),
            path: path.to_path_buf(),
            source,
        })?;
    let file = file.into_std().await;

    if let Err(e) = dumper.dump(database, file).await {
        remove_dump(path).await;
        return Err(e);
    }
    Ok(())
}

async fn remove_dump(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove incomplete dump");
        }
    }
}
