use crate::errors::BackupError;
use std::path::Path;
use tracing::{error, info};

/// Receives progress of a batch. Implementations must be safe to call from many workers.
pub trait Reporter: Send + Sync {
    fn directory_created(&self, path: &Path);
    fn dumped(&self, database: &str, path: &Path);
    fn renamed(&self, database: &str, path: &Path, replacements: usize);
    fn dropped(&self, database: &str);
    fn failed(&self, error: &BackupError);
    fn finished(&self, succeeded: usize, failed: usize);
}

/// Emits every event through `tracing`.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn directory_created(&self, path: &Path) {
        info!(path = %path.display(), "destination folder created");
    }

    fn dumped(&self, database: &str, path: &Path) {
        info!(database, path = %path.display(), "dump created");
    }

    fn renamed(&self, database: &str, path: &Path, replacements: usize) {
        info!(
            database,
            path = %path.display(),
            replacements,
            "database renamed in dump file with prefix 'R4_'"
        );
    }

    fn dropped(&self, database: &str) {
        info!(database, "database dropped");
    }

    fn failed(&self, error: &BackupError) {
        error!(database = error.database(), stage = %error.stage(), "{error}");
    }

    fn finished(&self, succeeded: usize, failed: usize) {
        if failed > 0 {
            error!(succeeded, failed, "batch finished with failures");
        } else {
            info!(succeeded, "batch finished");
        }
    }
}
