use bytes::{Buf, BufMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::common::{ErrorKind, Result};
use crate::core::format::read_full;

/// File signature, "RDMP".
pub const MAGIC: [u8; 4] = [0x52, 0x44, 0x4d, 0x50];

/// Current format version.
pub const VERSION: u8 = 1;

/// Leading block of every dump file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    version: u8,
    // Number of records written after the header.
    // advisory only, readers stop at end of stream.
    key_count: u64,
}

impl FileHeader {
    pub const BYTES: usize = 4 // magic
        + 1 // version
        + 8 // key_count
    ;

    pub fn new(key_count: u64) -> Self {
        Self {
            version: VERSION,
            key_count,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn key_count(&self) -> u64 {
        self.key_count
    }

    pub fn encode(&self) -> [u8; FileHeader::BYTES] {
        let mut buf = [0u8; FileHeader::BYTES];
        let mut dst = &mut buf[..];

        dst.put_slice(&MAGIC);
        dst.put_u8(self.version);
        dst.put_u64(self.key_count);

        buf
    }

    pub fn decode(buf: &[u8; FileHeader::BYTES]) -> Result<Self> {
        let mut src = &buf[..];

        let mut magic = [0u8; 4];
        src.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(ErrorKind::MalformedHeader {
                description: format!("unknown signature {:02x?}", magic),
            }
            .into());
        }

        let version = src.get_u8();
        if version != VERSION {
            return Err(ErrorKind::UnsupportedVersion { version }.into());
        }

        Ok(Self {
            version,
            key_count: src.get_u64(),
        })
    }

    // Write header to writer, return written bytes.
    // flush is left to the caller.
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.encode()).await?;
        Ok(FileHeader::BYTES)
    }

    pub async fn read_from<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; FileHeader::BYTES];
        let n = read_full(reader, &mut buf).await?;
        if n < FileHeader::BYTES {
            return Err(ErrorKind::MalformedHeader {
                description: format!(
                    "expected {} bytes, only {} available",
                    FileHeader::BYTES,
                    n
                ),
            }
            .into());
        }

        FileHeader::decode(&buf)
    }
}
