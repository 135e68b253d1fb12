use anyhow::Result;
use std::sync::Arc;

mod config;
pub use config::{Args, Config, ConfigError, Credentials, DropPolicy, Source};

pub mod backups;
pub mod database_list;
pub mod droppers;
pub mod dumpers;
pub mod errors;
pub mod process;
pub mod reporting;
pub mod rewrite;

use crate::backups::{BackupOptions, BatchBackup, BatchReport, Tools};
use crate::database_list::{DatabaseList, read_databases};
use crate::droppers::MysqlClient;
use crate::dumpers::MysqlDump;
use crate::reporting::Reporter;

/// Process exit status for a finished run: 0 when every database was backed up,
/// 2 when some failed and 1 when the run could not complete at all.
pub fn exit_code(result: &Result<BatchReport>) -> i32 {
    match result {
        Ok(report) if report.failed() > 0 => 2,
        Ok(_) => 0,
        Err(_) => 1,
    }
}

pub async fn run(config: Config, reporter: Arc<dyn Reporter>) -> Result<BatchReport> {
    let tools = Tools {
        dumper: Arc::new(MysqlDump::new(
            config.mysqldump.clone(),
            config.credentials.clone(),
        )),
        dropper: Arc::new(MysqlClient::new(
            config.mysql.clone(),
            config.credentials.clone(),
        )),
    };
    run_with_tools(config, tools, reporter).await
}

async fn run_with_tools(
    config: Config,
    tools: Tools,
    reporter: Arc<dyn Reporter>,
) -> Result<BatchReport> {
    let list = match &config.source {
        Source::File(path) => read_databases(path).await?,
        Source::Name(name) => DatabaseList {
            names: vec![name.clone()],
            undecodable_lines: Vec::new(),
        },
    };

    let mut backup = BatchBackup::new(config.destination.clone());
    for database in list.names {
        backup.add_database(database);
    }
    for line in list.undecodable_lines {
        backup.add_undecodable_line(line);
    }
    backup
        .execute(tools, BackupOptions::from(&config), config.jobs, reporter)
        .await
}
