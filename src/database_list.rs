use crate::errors::ListReadError;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// Names read from a list file, plus the 1-based numbers of lines that were
/// skipped because they are not valid UTF-8.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DatabaseList {
    pub names: Vec<String>,
    pub undecodable_lines: Vec<usize>,
}

/// Reads one database name per line, skipping blank lines and trimming whitespace.
///
/// A line that is not valid UTF-8 does not abort the read: it is logged and
/// recorded in [`DatabaseList::undecodable_lines`] so the rest of the list can
/// still be backed up.
pub async fn read_databases(path: &Path) -> Result<DatabaseList, ListReadError> {
    let file = File::open(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ListReadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ListReadError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut lines = BufReader::new(file).split(b'\n');
    let mut list = DatabaseList::default();
    let mut number = 0;
    loop {
        let line = lines.next_segment().await.map_err(|source| ListReadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let Some(line) = line else { break };
        number += 1;
        let line = match String::from_utf8(line) {
            Ok(line) => line,
            Err(_) => {
                warn!(
                    path = %path.display(),
                    line = number,
                    "skipping line that is not valid UTF-8"
                );
                list.undecodable_lines.push(number);
                continue;
            }
        };
        let name = line.trim();
        if !name.is_empty() {
            list.names.push(name.to_string());
        }
    }
    Ok(list)
}
