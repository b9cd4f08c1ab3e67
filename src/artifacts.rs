use crate::error::CrawlError;
use crate::results::PageResult;
use crate::utils::AGGREGATE_FILE_NAME;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Deletes every file in `dir` whose modification time is more than `max_age` ago.
///
/// Never fails: a missing directory or an unreadable entry is logged and
/// skipped. Returns how many files were removed.
pub async fn cleanup(dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            ::log::debug!("Skipping cleanup of {}: {}", dir.display(), e);
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                ::log::warn!("Failed to list {}: {}", dir.display(), e);
                break;
            }
        };
        let path = entry.path();

        let modified = match entry.metadata().await {
            Ok(meta) if meta.is_file() => meta.modified(),
            Ok(_) => continue,
            Err(e) => Err(e),
        };
        let modified = match modified {
            Ok(modified) => modified,
            Err(e) => {
                ::log::warn!("Cannot read modification time of {}: {}", path.display(), e);
                continue;
            }
        };

        // Timestamps in the future count as brand new
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                removed += 1;
                ::log::debug!("Removed stale artifact {}", path.display());
            }
            Err(e) => ::log::warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    if removed > 0 {
        ::log::info!("Cleaned up {} old files from {}", removed, dir.display());
    }
    removed
}

/// Writes all results to the aggregate file in `dir`, replacing any previous one
pub async fn persist(dir: &Path, results: &[PageResult]) -> Result<PathBuf, CrawlError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CrawlError::io(dir, e))?;

    let path = aggregate_path(dir);
    let json = serde_json::to_string_pretty(results)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| CrawlError::io(&path, e))?;

    ::log::info!("Saved {} pages to {}", results.len(), path.display());
    Ok(path)
}

/// Reads an aggregate file back
pub async fn load_aggregate(path: &Path) -> Result<Vec<PageResult>, CrawlError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CrawlError::io(path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Well-known location of the aggregate file inside `dir`
pub fn aggregate_path(dir: &Path) -> PathBuf {
    dir.join(AGGREGATE_FILE_NAME)
}
