use std::path::PathBuf;

use crate::backups::{BackupOptions, JobOutcome, Tools};
use crate::config::DropPolicy;
use crate::dumpers::create_dump;
use crate::errors::BackupError;
use crate::reporting::Reporter;
use crate::rewrite::rename_database_in_dump;

///Dumps one database to its own file, then optionally renames it in the dump and drops it.
pub struct DatabaseBackup {
    database: String,
    file_path: PathBuf,
}

impl DatabaseBackup {
    pub fn new(database: String, file_path: PathBuf) -> DatabaseBackup {
        DatabaseBackup {
            database,
            file_path,
        }
    }

    pub async fn execute(
        self,
        tools: &Tools,
        options: &BackupOptions,
        reporter: &dyn Reporter,
    ) -> JobOutcome {
        let mut errors = Vec::new();

        //Nothing else runs without a complete dump.
        if let Err(e) = create_dump(tools.dumper.as_ref(), &self.database, &self.file_path).await {
            reporter.failed(&e);
            errors.push(e);
            return self.outcome(errors);
        }
        reporter.dumped(&self.database, &self.file_path);

        if options.rename {
            match rename_database_in_dump(&self.file_path, &self.database).await {
                Ok(replacements) => reporter.renamed(&self.database, &self.file_path, replacements),
                Err(e) => {
                    reporter.failed(&e);
                    errors.push(e);
                    if options.drop_policy == DropPolicy::RequireRewrite {
                        return self.outcome(errors);
                    }
                }
            }
        }

        if options.delete {
            match tools.dropper.drop_database(&self.database).await {
                Ok(()) => reporter.dropped(&self.database),
                Err(e) => {
                    reporter.failed(&e);
                    errors.push(e);
                }
            }
        }

        self.outcome(errors)
    }

    fn outcome(self, errors: Vec<BackupError>) -> JobOutcome {
        JobOutcome {
            database: self.database,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backups::fakes::{FakeDropper, FakeDumper};
    use crate::errors::Stage;
    use crate::reporting::testing::RecordingReporter;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn tools(dumper: FakeDumper, dropper: Arc<FakeDropper>) -> Tools {
        Tools {
            dumper: Arc::new(dumper),
            dropper,
        }
    }

    fn options(rename: bool, delete: bool, drop_policy: DropPolicy) -> BackupOptions {
        BackupOptions {
            rename,
            delete,
            drop_policy,
        }
    }

    #[tokio::test]
    async fn dump_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        let dropper = Arc::new(FakeDropper::default());
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path.clone())
            .execute(
                &tools(FakeDumper::default(), dropper.clone()),
                &options(false, false, DropPolicy::RequireRewrite),
                &reporter,
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CREATE DATABASE `shop`;\nUSE `shop`;\n"
        );
        assert!(dropper.dropped().is_empty());
        assert_eq!(reporter.events(), vec!["dumped shop"]);
    }

    #[tokio::test]
    async fn full_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        let dropper = Arc::new(FakeDropper::default());
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path.clone())
            .execute(
                &tools(FakeDumper::default(), dropper.clone()),
                &options(true, true, DropPolicy::RequireRewrite),
                &reporter,
            )
            .await;

        assert!(outcome.is_success());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CREATE DATABASE `R4_shop`;\nUSE `R4_shop`;\n"
        );
        assert_eq!(dropper.dropped(), vec!["shop"]);
        assert_eq!(
            reporter.events(),
            vec!["dumped shop", "renamed shop 2", "dropped shop"]
        );
    }

    #[tokio::test]
    async fn failed_dump_stops_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        let dropper = Arc::new(FakeDropper::default());
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path.clone())
            .execute(
                &tools(FakeDumper::failing(&["shop"]), dropper.clone()),
                &options(true, true, DropPolicy::IndependentOfRewrite),
                &reporter,
            )
            .await;

        assert_eq!(outcome.failed_stage(), Some(Stage::Dump));
        assert_eq!(outcome.errors.len(), 1);
        assert!(!path.exists());
        assert!(dropper.dropped().is_empty());
        assert_eq!(reporter.events(), vec!["failed shop dump"]);
    }

    #[tokio::test]
    async fn failed_rename_blocks_drop_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        std::fs::create_dir(dir.path().join("shop.sql.temp")).unwrap();
        let dropper = Arc::new(FakeDropper::default());
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path.clone())
            .execute(
                &tools(FakeDumper::default(), dropper.clone()),
                &options(true, true, DropPolicy::RequireRewrite),
                &reporter,
            )
            .await;

        assert_eq!(outcome.failed_stage(), Some(Stage::Rewrite));
        assert!(dropper.dropped().is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "CREATE DATABASE `shop`;\nUSE `shop`;\n"
        );
        assert_eq!(reporter.events(), vec!["dumped shop", "failed shop rewrite"]);
    }

    #[tokio::test]
    async fn failed_rename_still_drops_when_independent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        std::fs::create_dir(dir.path().join("shop.sql.temp")).unwrap();
        let dropper = Arc::new(FakeDropper::default());
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path)
            .execute(
                &tools(FakeDumper::default(), dropper.clone()),
                &options(true, true, DropPolicy::IndependentOfRewrite),
                &reporter,
            )
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_stage(), Some(Stage::Rewrite));
        assert_eq!(dropper.dropped(), vec!["shop"]);
        assert_eq!(
            reporter.events(),
            vec!["dumped shop", "failed shop rewrite", "dropped shop"]
        );
    }

    #[tokio::test]
    async fn failed_drop_keeps_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shop.sql");
        let dropper = Arc::new(FakeDropper::failing(&["shop"]));
        let reporter = RecordingReporter::default();

        let outcome = DatabaseBackup::new("shop".into(), path.clone())
            .execute(
                &tools(FakeDumper::default(), dropper.clone()),
                &options(false, true, DropPolicy::RequireRewrite),
                &reporter,
            )
            .await;

        assert_eq!(outcome.failed_stage(), Some(Stage::Drop));
        assert!(path.exists());
        assert_eq!(reporter.events(), vec!["dumped shop", "failed shop drop"]);
    }
}
