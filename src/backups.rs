use crate::config::{Config, DropPolicy};
use crate::droppers::Dropper;
use crate::dumpers::Dumper;
use crate::errors::BackupError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod batch_backup;
mod database_backup;
pub use batch_backup::{BatchBackup, BatchReport};
pub use database_backup::DatabaseBackup;

/// External tools the pipeline shells out to.
#[derive(Clone)]
pub struct Tools {
    pub dumper: Arc<dyn Dumper>,
    pub dropper: Arc<dyn Dropper>,
}

/// Optional stages run after a successful dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackupOptions {
    pub rename: bool,
    pub delete: bool,
    pub drop_policy: DropPolicy,
}

impl From<&Config> for BackupOptions {
    fn from(config: &Config) -> Self {
        BackupOptions {
            rename: config.rename,
            delete: config.delete,
            drop_policy: config.drop_policy,
        }
    }
}

/// Result of one database's pipeline.
#[derive(Debug)]
pub struct JobOutcome {
    pub database: String,
    pub errors: Vec<BackupError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Stage of the first failure, if any.
    #[cfg(test)]
    pub(crate) fn failed_stage(&self) -> Option<crate::errors::Stage> {
        self.errors.first().map(BackupError::stage)
    }
}

/// `<root>/<database>.sql`, or `<database>.sql` when there is no root.
pub fn dump_path(root_directory: Option<&Path>, database: &str) -> PathBuf {
    let file_name = format!("{}.sql", database);
    match root_directory {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Some("out"), "shop", "out/shop.sql"; "with destination")]
    #[test_case(None, "shop", "shop.sql"; "working directory")]
    #[test_case(Some("dumps/2024"), "my.db", "dumps/2024/my.db.sql"; "dotted name")]
    fn dump_paths(root: Option<&str>, database: &str, expected: &str) {
        assert_eq!(dump_path(root.map(Path::new), database), PathBuf::from(expected));
    }
}
