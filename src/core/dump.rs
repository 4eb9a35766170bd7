use chrono::Utc;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::client::Api;
use crate::common::{debug, info, ErrorKind, Result, Time};
use crate::core::format::{FileHeader, KeyRecord};
use crate::Key;

/// Outcome of a completed dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    pub keys: u64,
    /// Header and records.
    pub bytes_written: u64,
}

/// Fetch a single key as a record.
/// a key that disappeared since it was selected is an error.
pub async fn dump_key<A: Api + ?Sized>(api: &mut A, key: &Key) -> Result<KeyRecord> {
    let ttl_ms = api.pttl(key).await?;

    let value = api.dump(key).await?.ok_or_else(|| ErrorKind::KeyNotFound {
        key: key.to_string(),
    })?;

    Ok(KeyRecord::new(key.clone(), ttl_ms, value))
}

/// Write the header and one record per key, in the given order.
///
/// Any failure aborts the dump, keys are never silently skipped.
/// The writer is flushed on success.
pub async fn dump<A, W>(api: &mut A, keys: &[Key], writer: &mut W) -> Result<DumpSummary>
where
    A: Api + ?Sized,
    W: AsyncWrite + Unpin,
{
    let started: Time = Utc::now();
    let mut written = FileHeader::new(keys.len() as u64).write_to(writer).await?;

    for key in keys {
        let record = dump_key(api, key).await?;
        written += record.write_to(writer).await?;

        debug!(
            %key,
            ttl_ms = record.ttl_ms(),
            value_bytes = record.value().len(),
            "Dump key"
        );
    }

    writer.flush().await?;

    let summary = DumpSummary {
        keys: keys.len() as u64,
        bytes_written: written as u64,
    };

    info!(
        keys = summary.keys,
        bytes = summary.bytes_written,
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Dump completed"
    );

    Ok(summary)
}
