use std::cmp;

use bytes::{Buf, BufMut, Bytes};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::common::{ErrorKind, Result};
use crate::core::format::read_full;
use crate::Key;

// Upper bound of the buffer reserved up front for a key or value.
// larger fields grow while reading, so a corrupt length can not force a huge allocation.
const MAX_PREALLOC_BYTES: u64 = 1024 * 1024;

/// One dumped key: remaining ttl, key name and the store serialized value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    // milliseconds remaining until expiry. 0 means no expiry.
    ttl_ms: i64,
    key: Key,
    // opaque store native serialization.
    value: Bytes,
}

impl KeyRecord {
    pub const FIXED_BYTES: usize = 8 // ttl_ms
        + 8 // key length
        + 8 // value length
    ;

    /// Negative ttl (no expiry or already expired) is stored as 0.
    pub fn new(key: impl Into<Key>, ttl_ms: i64, value: impl Into<Bytes>) -> Self {
        Self {
            ttl_ms: cmp::max(ttl_ms, 0),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_parts(self) -> (Key, i64, Bytes) {
        (self.key, self.ttl_ms, self.value)
    }

    // Return encoded bytes length.
    pub fn encoded_len(&self) -> usize {
        KeyRecord::FIXED_BYTES + self.key.len() + self.value.len()
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_i64(self.ttl_ms);
        dst.put_u64(self.key.len() as u64);
        dst.put_slice(&self.key);
        dst.put_u64(self.value.len() as u64);
        dst.put_slice(&self.value);
    }

    // Decode one record from an in-memory buffer.
    // Ok(None) when the buffer is exhausted at a record boundary.
    pub fn decode(src: &mut impl Buf) -> Result<Option<Self>> {
        if !src.has_remaining() {
            return Ok(None);
        }

        let ttl_ms = buf::get_u64(src, "ttl")? as i64;
        let key_len = buf::get_u64(src, "key length")?;
        let key = buf::get_bytes(src, key_len, "key")?;
        let value_len = buf::get_u64(src, "value length")?;
        let value = buf::get_bytes(src, value_len, "value")?;

        Ok(Some(KeyRecord::new(key, ttl_ms, value)))
    }

    // Write binary expression to writer.
    // return written bytes.
    // flush is left to the caller.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<usize> {
        writer.write_i64(self.ttl_ms).await?;
        writer.write_u64(self.key.len() as u64).await?;
        writer.write_all(&self.key).await?;
        writer.write_u64(self.value.len() as u64).await?;
        writer.write_all(&self.value).await?;

        Ok(self.encoded_len())
    }

    // Read next record from reader.
    // Ok(None) when the stream ends exactly at a record boundary,
    // any shorter read inside a record is TruncatedRecord.
    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Self>> {
        // calling order is important, fields are laid out in this order.
        let mut ttl = [0u8; 8];
        match read_full(reader, &mut ttl).await? {
            0 => return Ok(None),
            8 => (),
            n => return Err(truncated("ttl", 8, n as u64)),
        }
        let ttl_ms = i64::from_be_bytes(ttl);

        let key_len = read_u64(reader, "key length").await?;
        let key = read_bytes(reader, key_len, "key").await?;
        let value_len = read_u64(reader, "value length").await?;
        let value = read_bytes(reader, value_len, "value").await?;

        Ok(Some(KeyRecord::new(key, ttl_ms, value)))
    }
}

async fn read_u64<R: AsyncRead + Unpin>(reader: &mut R, field: &'static str) -> Result<u64> {
    let mut buf = [0u8; 8];
    let n = read_full(reader, &mut buf).await?;
    if n < buf.len() {
        return Err(truncated(field, 8, n as u64));
    }
    Ok(u64::from_be_bytes(buf))
}

async fn read_bytes<R: AsyncRead + Unpin>(
    reader: &mut R,
    len: u64,
    field: &'static str,
) -> Result<Bytes> {
    let mut buf = Vec::with_capacity(cmp::min(len, MAX_PREALLOC_BYTES) as usize);
    let n = (&mut *reader).take(len).read_to_end(&mut buf).await? as u64;
    if n < len {
        return Err(truncated(field, len, n));
    }
    Ok(Bytes::from(buf))
}

fn truncated(field: &'static str, expected: u64, actual: u64) -> crate::Error {
    ErrorKind::TruncatedRecord {
        field,
        expected,
        actual,
    }
    .into()
}

// in-memory buffer utilities.
mod buf {
    use super::*;

    pub(super) fn get_u64(src: &mut impl Buf, field: &'static str) -> Result<u64> {
        if src.remaining() < 8 {
            return Err(truncated(field, 8, src.remaining() as u64));
        }
        Ok(src.get_u64())
    }

    pub(super) fn get_bytes(src: &mut impl Buf, len: u64, field: &'static str) -> Result<Bytes> {
        if (src.remaining() as u64) < len {
            return Err(truncated(field, len, src.remaining() as u64));
        }
        Ok(src.copy_to_bytes(len as usize))
    }
}
