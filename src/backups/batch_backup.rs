use crate::backups::{BackupOptions, DatabaseBackup, JobOutcome, Tools, dump_path};
use crate::errors::DirectoryCreateError;
use crate::reporting::Reporter;
use anyhow::{Result, bail};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::Instrument;

///Backs up a list of databases with a fixed number of concurrent workers.
pub struct BatchBackup {
    root_directory: Option<PathBuf>,
    databases: Vec<String>,
    seen: HashSet<String>,
    undecodable_lines: Vec<usize>,
}

/// Outcomes of every database in work-list order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<JobOutcome>,
    /// List file lines that could not be turned into a database name.
    pub undecodable_lines: Vec<usize>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded() + self.undecodable_lines.len()
    }
}

impl BatchBackup {
    pub fn new(root_directory: Option<PathBuf>) -> BatchBackup {
        BatchBackup {
            root_directory,
            databases: Vec::new(),
            seen: HashSet::new(),
            undecodable_lines: Vec::new(),
        }
    }

    /// Queues `name` unless it is already queued. Returns whether it was added.
    pub fn add_database(&mut self, name: String) -> bool {
        if !self.seen.insert(name.clone()) {
            return false;
        }
        self.databases.push(name);
        true
    }

    /// Records a list line that was skipped, so the batch counts it as failed.
    pub fn add_undecodable_line(&mut self, line: usize) {
        self.undecodable_lines.push(line);
    }

    #[cfg(test)]
    pub(crate) fn databases(&self) -> &[String] {
        &self.databases
    }

    async fn prepare_directory(
        &self,
        reporter: &dyn Reporter,
    ) -> Result<(), DirectoryCreateError> {
        let Some(dir) = &self.root_directory else {
            return Ok(());
        };
        let existed = tokio::fs::metadata(dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        //Also fails when `dir` exists but is not a directory.
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| DirectoryCreateError {
                path: dir.clone(),
                source,
            })?;
        if !existed {
            reporter.directory_created(dir);
        }
        Ok(())
    }

    pub async fn execute(
        &self,
        tools: Tools,
        options: BackupOptions,
        jobs: NonZeroUsize,
        reporter: Arc<dyn Reporter>,
    ) -> Result<BatchReport> {
        self.prepare_directory(reporter.as_ref()).await?;

        let (tx, rx) = mpsc::channel::<(usize, String)>(jobs.get());
        let rx = Arc::new(Mutex::new(rx));
        let mut task_set = tokio::task::JoinSet::new();

        for _ in 0..jobs.get().min(self.databases.len()) {
            let rx = rx.clone();
            let tools = tools.clone();
            let reporter = reporter.clone();
            let root_directory = self.root_directory.clone();
            task_set.spawn(async move {
                let mut outcomes = Vec::new();
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some((index, database)) = next else { break };
                    let path = dump_path(root_directory.as_deref(), &database);
                    let span = tracing::info_span!("backup", database = %database);
                    let outcome = DatabaseBackup::new(database, path)
                        .execute(&tools, &options, reporter.as_ref())
                        .instrument(span)
                        .await;
                    outcomes.push((index, outcome));
                }
                outcomes
            });
        }
        drop(rx);

        for (index, database) in self.databases.iter().enumerate() {
            //Only fails when every worker is gone, which join_next reports below.
            if tx.send((index, database.clone())).await.is_err() {
                break;
            }
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(self.databases.len());
        while let Some(result) = task_set.join_next().await {
            match result {
                Ok(worker_outcomes) => outcomes.extend(worker_outcomes),
                Err(e) => {
                    task_set.abort_all();
                    bail!("Unrecoverable error: {e}")
                }
            }
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let report = BatchReport {
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            undecodable_lines: self.undecodable_lines.clone(),
        };
        reporter.finished(report.succeeded(), report.failed());
        Ok(report)
    }
}
