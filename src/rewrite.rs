use crate::errors::BackupError;
use memchr::memmem;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// Tag put in front of the database identifier by [`rename_database_in_dump`].
pub const RENAME_PREFIX: &str = "R4_";

/// Replaces every literal `` `database` `` in the dump with `` `R4_database` ``.
///
/// The replacement is a plain byte substitution, so matches inside comments or
/// string data are replaced too. The new contents are written to a sibling
/// `.temp` file which is then renamed over the dump, leaving the original
/// untouched if anything fails. Returns the number of replacements made.
pub async fn rename_database_in_dump(path: &Path, database: &str) -> Result<usize, BackupError> {
    let data = fs::read(path)
        .await
        .map_err(|source| BackupError::RewriteRead {
            database: database.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

    let from = format!("`{}`", database);
    let to = format!("`{}{}`", RENAME_PREFIX, database);
    let (rewritten, count) = replace_all(&data, from.as_bytes(), to.as_bytes());

    let temp_path = temp_path(path);
    if let Err(source) = write_and_swap(&temp_path, path, &rewritten).await {
        if let Err(e) = fs::remove_file(&temp_path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %temp_path.display(), error = %e, "could not remove temporary dump");
            }
        }
        return Err(BackupError::RewriteWrite {
            database: database.to_string(),
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(count)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".temp");
    PathBuf::from(name)
}

async fn write_and_swap(temp_path: &Path, path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(temp_path, data).await?;
    fs::rename(temp_path, path).await
}

fn replace_all(haystack: &[u8], from: &[u8], to: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(haystack.len());
    let mut count = 0;
    let mut last = 0;
    for pos in memmem::find_iter(haystack, from) {
        out.extend_from_slice(&haystack[last..pos]);
        out.extend_from_slice(to);
        last = pos + from.len();
        count += 1;
    }
    out.extend_from_slice(&haystack[last..]);
    (out, count)
}
