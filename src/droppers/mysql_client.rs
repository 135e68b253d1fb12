use crate::config::Credentials;
use crate::droppers::Dropper;
use crate::errors::BackupError;
use crate::process::run_command;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Drops databases through the `mysql` command-line client.
pub struct MysqlClient {
    program: PathBuf,
    credentials: Credentials,
}

impl MysqlClient {
    pub fn new(program: PathBuf, credentials: Credentials) -> MysqlClient {
        MysqlClient {
            program,
            credentials,
        }
    }

    fn args(&self, database: &str) -> Vec<String> {
        let mut args = self.credentials.connection_args();
        args.push("-e".to_string());
        args.push(drop_statement(database));
        args
    }
}

fn drop_statement(database: &str) -> String {
    format!("DROP DATABASE `{}`;", database.replace('`', "``"))
}

#[async_trait]
impl Dropper for MysqlClient {
    async fn drop_database(&self, database: &str) -> Result<(), BackupError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(database)).stdout(Stdio::null());
        run_command(&mut cmd)
            .await
            .map_err(|cause| BackupError::DropFailed {
                database: database.to_string(),
                cause,
            })
    }
}
