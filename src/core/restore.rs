use chrono::Utc;
use tokio::io::AsyncRead;

use crate::client::Api;
use crate::common::{debug, info, warn, Result, Time};
use crate::core::format::{FileHeader, KeyRecord};

/// Restore policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    /// Delete every key before restoring it. Delete failures always abort.
    pub delete_first: bool,
    /// Skip records the store refuses to restore instead of aborting.
    pub ignore_errors: bool,
}

/// Outcome of a completed restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: u64,
    pub skipped: u64,
    /// Key count declared in the file header.
    pub advertised: u64,
}

/// Replay every record of a dump file into the store.
///
/// Records are read until the stream ends at a record boundary, the header key
/// count is only compared for a warning. Structural file errors, delete
/// failures and transport errors are always fatal. With `ignore_errors`, a
/// RESTORE the store answers with an error is counted as skipped.
pub async fn restore<A, R>(
    api: &mut A,
    reader: &mut R,
    options: RestoreOptions,
) -> Result<RestoreSummary>
where
    A: Api + ?Sized,
    R: AsyncRead + Unpin,
{
    let started: Time = Utc::now();
    let header = FileHeader::read_from(reader).await?;
    debug!(
        version = header.version(),
        key_count = header.key_count(),
        "Read header"
    );

    let mut summary = RestoreSummary {
        restored: 0,
        skipped: 0,
        advertised: header.key_count(),
    };

    while let Some(record) = KeyRecord::read_from(reader).await? {
        let (key, ttl_ms, value) = record.into_parts();

        if options.delete_first {
            api.delete(&key).await?;
        }

        match api.restore(&key, ttl_ms, &value).await {
            Ok(()) => {
                debug!(%key, ttl_ms, "Restore key");
                summary.restored += 1;
            }
            Err(err) if options.ignore_errors && err.is_command() => {
                warn!(%key, "Skip key. {}", err);
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    let read = summary.restored + summary.skipped;
    if read != summary.advertised {
        warn!(
            advertised = summary.advertised,
            read, "Header key count does not match records in file"
        );
    }

    info!(
        restored = summary.restored,
        skipped = summary.skipped,
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Restore completed"
    );

    Ok(summary)
}
