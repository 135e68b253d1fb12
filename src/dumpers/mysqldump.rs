use crate::config::Credentials;
use crate::dumpers::Dumper;
use crate::errors::BackupError;
use crate::process::run_command;
use async_trait::async_trait;
use std::fs::File;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Dumps a database with `mysqldump -BR`, including its routines.
pub struct MysqlDump {
    program: PathBuf,
    credentials: Credentials,
}

impl MysqlDump {
    pub fn new(program: PathBuf, credentials: Credentials) -> MysqlDump {
        MysqlDump {
            program,
            credentials,
        }
    }

    fn args(&self, database: &str) -> Vec<String> {
        let mut args = vec!["-BR".to_string()];
        args.extend(self.credentials.connection_args());
        args.push(database.to_string());
        args
    }
}

#[async_trait]
impl Dumper for MysqlDump {
    async fn dump(&self, database: &str, output: File) -> Result<(), BackupError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(database)).stdout(Stdio::from(output));
        run_command(&mut cmd)
            .await
            .map_err(|cause| BackupError::DumpFailed {
                database: database.to_string(),
                cause,
            })
    }
}
