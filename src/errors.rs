use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::process::CommandError;

/// Pipeline stage a database failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dump,
    Rewrite,
    Drop,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dump => "dump",
            Stage::Rewrite => "rewrite",
            Stage::Drop => "drop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ListReadError {
    #[error("database list {} not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("could not open database list {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("error reading database list {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
#[error("error creating directory {}: {source}", .path.display())]
pub struct DirectoryCreateError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// Failure of a single database's pipeline. Every message names the database.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("could not create dump file {} for database {database}: {source}", .path.display())]
    FileCreate {
        database: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to create dump for database {database}: {cause}")]
    DumpFailed {
        database: String,
        #[source]
        cause: CommandError,
    },
    #[error("error reading dump {} of database {database}: {source}", .path.display())]
    RewriteRead {
        database: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("error writing renamed dump {} of database {database}: {source}", .path.display())]
    RewriteWrite {
        database: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("error dropping database {database}: {cause}")]
    DropFailed {
        database: String,
        #[source]
        cause: CommandError,
    },
}

impl BackupError {
    pub fn stage(&self) -> Stage {
        match self {
            BackupError::FileCreate { .. } | BackupError::DumpFailed { .. } => Stage::Dump,
            BackupError::RewriteRead { .. } | BackupError::RewriteWrite { .. } => Stage::Rewrite,
            BackupError::DropFailed { .. } => Stage::Drop,
        }
    }

    pub fn database(&self) -> &str {
        match self {
            BackupError::FileCreate { database, .. }
            | BackupError::DumpFailed { database, .. }
            | BackupError::RewriteRead { database, .. }
            | BackupError::RewriteWrite { database, .. }
            | BackupError::DropFailed { database, .. } => database,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn io_error() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "denied")
    }

    fn command_error() -> CommandError {
        CommandError::Spawn {
            program: "mysqldump".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        }
    }

    #[test_case(BackupError::FileCreate { database: "shop".into(), path: "shop.sql".into(), source: io_error() }, Stage::Dump; "file create")]
    #[test_case(BackupError::DumpFailed { database: "shop".into(), cause: command_error() }, Stage::Dump; "dump failed")]
    #[test_case(BackupError::RewriteRead { database: "shop".into(), path: "shop.sql".into(), source: io_error() }, Stage::Rewrite; "rewrite read")]
    #[test_case(BackupError::RewriteWrite { database: "shop".into(), path: "shop.sql".into(), source: io_error() }, Stage::Rewrite; "rewrite write")]
    #[test_case(BackupError::DropFailed { database: "shop".into(), cause: command_error() }, Stage::Drop; "drop failed")]
    fn stage_and_database(error: BackupError, stage: Stage) {
        assert_eq!(error.stage(), stage);
        assert_eq!(error.database(), "shop");
        assert!(error.to_string().contains("shop"));
    }
}
