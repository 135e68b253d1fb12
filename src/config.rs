use clap::{ArgAction, Parser};
use dotenvy;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use thiserror::Error;

pub const HOST_VAR: &str = "MYSQL_HOST";
pub const USERNAME_VAR: &str = "MYSQL_USERNAME";
pub const PASSWORD_VAR: &str = "MYSQL_PASSWORD";

#[derive(Parser, Debug, Clone)]
#[command(name = "dbhopper")]
#[command(
    version,
    about = "A tool to dump MySQL databases",
    long_about = "A command-line tool to dump MySQL databases with options to rename the database in the dump file and delete the database after dumping."
)]
//-h is taken by --host, so help is long-only.
#[command(disable_help_flag = true)]
pub struct Args {
    /// Path to .txt file containing list of databases (one per line)
    #[arg(short, long, value_name = "FILE", conflicts_with = "name")]
    pub file: Option<PathBuf>,

    /// Name of a single database to dump
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to destination folder of databases dumps
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Rename the database in the dump file with prefix 'R4_'
    #[arg(short, long)]
    pub rename: bool,

    /// Drop the database after dumping
    #[arg(short, long)]
    pub delete: bool,

    /// With --rename and --delete, still drop the database when renaming the dump failed
    #[arg(long)]
    pub drop_after_failed_rename: bool,

    /// MySQL username (optional, falls back to MYSQL_USERNAME environment variable)
    #[arg(short, long)]
    pub username: Option<String>,

    /// MySQL password (optional, falls back to MYSQL_PASSWORD environment variable)
    #[arg(short, long)]
    pub password: Option<String>,

    /// MySQL host (optional, falls back to MYSQL_HOST environment variable)
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Number of databases processed at the same time
    #[arg(short, long, default_value = "4")]
    pub jobs: NonZeroUsize,

    /// Dump program to run
    #[arg(long, value_name = "PROGRAM", default_value = "mysqldump")]
    pub mysqldump: PathBuf,

    /// MySQL client program used to drop databases
    #[arg(long, value_name = "PROGRAM", default_value = "mysql")]
    pub mysql: PathBuf,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

/// Where the work list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Name(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(host: String, username: String, password: String) -> Credentials {
        Credentials {
            host,
            username,
            password,
        }
    }

    #[cfg(test)]
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Connection arguments shared by mysqldump and mysql.
    pub fn connection_args(&self) -> Vec<String> {
        vec![
            "-h".to_string(),
            self.host.clone(),
            "-u".to_string(),
            self.username.clone(),
            format!("-p{}", self.password),
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Decides whether a failed rename still lets the drop stage run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPolicy {
    #[default]
    RequireRewrite,
    IndependentOfRewrite,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub destination: Option<PathBuf>,
    pub rename: bool,
    pub delete: bool,
    pub drop_policy: DropPolicy,
    pub jobs: NonZeroUsize,
    pub credentials: Credentials,
    pub mysqldump: PathBuf,
    pub mysql: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "MySQL connection details ({}) are required. Provide them via command-line arguments or environment variables.",
        .missing.join(", ")
    )]
    MissingCredentials { missing: Vec<&'static str> },
    #[error("Either --file or --name must be provided.")]
    MissingSource,
}

fn get_env(key: &str) -> Option<String> {
    dotenvy::var(key).ok()
}

fn resolve(flag: Option<String>, fallback: Option<String>) -> Option<String> {
    flag.filter(|s| !s.is_empty())
        .or(fallback)
        .filter(|s| !s.is_empty())
}

impl Config {
    pub fn build(args: Args) -> Result<Config, ConfigError> {
        Config::build_with(args, get_env)
    }

    fn build_with<F>(args: Args, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = resolve(args.host, env(HOST_VAR));
        let username = resolve(args.username, env(USERNAME_VAR));
        let password = resolve(args.password, env(PASSWORD_VAR));

        let credentials = match (host, username, password) {
            (Some(host), Some(username), Some(password)) => {
                Credentials::new(host, username, password)
            }
            (host, username, password) => {
                let missing = [
                    ("username", username.is_none()),
                    ("password", password.is_none()),
                    ("host", host.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, missing)| missing.then_some(name))
                .collect();
                return Err(ConfigError::MissingCredentials { missing });
            }
        };

        let source = match (args.file, args.name) {
            (Some(file), _) if !file.as_os_str().is_empty() => Source::File(file),
            (_, Some(name)) if !name.trim().is_empty() => Source::Name(name.trim().to_string()),
            _ => return Err(ConfigError::MissingSource),
        };

        let destination = args.output.filter(|p| !p.as_os_str().is_empty());

        let drop_policy = if args.drop_after_failed_rename {
            DropPolicy::IndependentOfRewrite
        } else {
            DropPolicy::RequireRewrite
        };

        Ok(Config {
            source,
            destination,
            rename: args.rename,
            delete: args.delete,
            drop_policy,
            jobs: args.jobs,
            credentials,
            mysqldump: args.mysqldump,
            mysql: args.mysql,
        })
    }
}
