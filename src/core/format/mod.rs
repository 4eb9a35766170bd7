//! Dump file format.
//!
//! ```text
//! header  | magic "RDMP" (4) | version u8 (1) | key count u64 (8) |
//! record  | ttl ms i64 (8) | key len u64 (8) | key | value len u64 (8) | value |
//! ```
//!
//! All integers are big-endian and fixed width, records follow the header
//! back to back without padding. The key count is advisory, readers stop at the
//! end of the stream.

mod header;
pub use header::{FileHeader, MAGIC, VERSION};

mod record;
pub use record::KeyRecord;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::common::Result;

pub fn encode_header(key_count: u64) -> [u8; FileHeader::BYTES] {
    FileHeader::new(key_count).encode()
}

pub async fn decode_header<R: AsyncRead + Unpin>(reader: &mut R) -> Result<FileHeader> {
    FileHeader::read_from(reader).await
}

pub fn encode_record(record: &KeyRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.encoded_len());
    record.encode(&mut buf);
    buf
}

pub async fn decode_record<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<KeyRecord>> {
    KeyRecord::read_from(reader).await
}

// Fill buf as far as the reader allows, return read bytes.
// unlike read_exact, a short read is not an error so callers can tell
// a clean end of stream from a truncated field.
pub(crate) async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
