use std::fmt;
use std::io::Cursor;

use bytes::{Buf, Bytes};

use crate::common::{Error, ErrorKind};
use crate::protocol::DELIMITER;

// Reply and request unit of the store protocol.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Bytes),
    Null,
    Array(Vec<Frame>),
}

pub(crate) mod frameprefix {
    pub(crate) const SIMPLE: u8 = b'+';
    pub(crate) const ERROR: u8 = b'-';
    pub(crate) const INTEGER: u8 = b':';
    pub(crate) const BULK: u8 = b'$';
    pub(crate) const ARRAY: u8 = b'*';
}

#[derive(Debug)]
pub(crate) enum FrameError {
    /// Not enough data is available to decode a frame from buffer.
    Incomplete,
    Invalid(String),
}

type ByteCursor<'a> = Cursor<&'a [u8]>;

impl Frame {
    // Build a command frame, every argument is sent as bulk string.
    #[cfg(test)]
    pub(crate) fn command<I, A>(args: I) -> Frame
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        Frame::Array(
            args.into_iter()
                .map(|arg| Frame::Bulk(Bytes::copy_from_slice(arg.as_ref())))
                .collect(),
        )
    }

    pub(crate) fn check(src: &mut ByteCursor) -> Result<(), FrameError> {
        match cursor::get_u8(src)? {
            frameprefix::SIMPLE | frameprefix::ERROR | frameprefix::INTEGER => {
                cursor::get_line(src)?;
                Ok(())
            }
            frameprefix::BULK => {
                let len = cursor::get_decimal(src)?;
                if len < 0 {
                    return Ok(());
                }
                // skip bytes length + delimiter
                cursor::skip(src, len as usize + DELIMITER.len())
            }
            frameprefix::ARRAY => {
                let len = cursor::get_decimal(src)?;
                for _ in 0..len.max(0) {
                    Frame::check(src)?;
                }
                Ok(())
            }
            prefix => Err(FrameError::Invalid(format!(
                "unknown frame prefix {:?}",
                prefix as char
            ))),
        }
    }

    pub(crate) fn parse(src: &mut ByteCursor) -> Result<Frame, FrameError> {
        match cursor::get_u8(src)? {
            frameprefix::SIMPLE => Ok(Frame::Simple(cursor::get_string(src)?)),
            frameprefix::ERROR => Ok(Frame::Error(cursor::get_string(src)?)),
            frameprefix::INTEGER => Ok(Frame::Integer(cursor::get_decimal(src)?)),
            frameprefix::BULK => {
                let len = cursor::get_decimal(src)?;
                if len < 0 {
                    return Ok(Frame::Null);
                }
                let len = len as usize;
                if src.remaining() < len + DELIMITER.len() {
                    return Err(FrameError::Incomplete);
                }
                let value = Bytes::copy_from_slice(&src.chunk()[..len]);
                if &src.chunk()[len..len + DELIMITER.len()] != DELIMITER {
                    return Err(FrameError::Invalid("bulk string not terminated".into()));
                }
                cursor::skip(src, len + DELIMITER.len())?;

                Ok(Frame::Bulk(value))
            }
            frameprefix::ARRAY => {
                let len = cursor::get_decimal(src)?;
                if len < 0 {
                    return Ok(Frame::Null);
                }
                let mut frames = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    frames.push(Frame::parse(src)?);
                }
                Ok(Frame::Array(frames))
            }
            prefix => Err(FrameError::Invalid(format!(
                "unknown frame prefix {:?}",
                prefix as char
            ))),
        }
    }

    #[cfg(test)]
    pub(crate) fn encode(&self, dst: &mut impl bytes::BufMut) {
        match self {
            Frame::Simple(s) => {
                dst.put_u8(frameprefix::SIMPLE);
                dst.put_slice(s.as_bytes());
                dst.put_slice(DELIMITER);
            }
            Frame::Error(s) => {
                dst.put_u8(frameprefix::ERROR);
                dst.put_slice(s.as_bytes());
                dst.put_slice(DELIMITER);
            }
            Frame::Integer(n) => {
                dst.put_u8(frameprefix::INTEGER);
                dst.put_slice(n.to_string().as_bytes());
                dst.put_slice(DELIMITER);
            }
            Frame::Bulk(val) => {
                dst.put_u8(frameprefix::BULK);
                dst.put_slice(val.len().to_string().as_bytes());
                dst.put_slice(DELIMITER);
                dst.put_slice(val);
                dst.put_slice(DELIMITER);
            }
            Frame::Null => dst.put_slice(b"$-1\r\n"),
            Frame::Array(frames) => {
                dst.put_u8(frameprefix::ARRAY);
                dst.put_slice(frames.len().to_string().as_bytes());
                dst.put_slice(DELIMITER);
                for frame in frames {
                    frame.encode(dst);
                }
            }
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Simple(s) => write!(f, "+{}", s),
            Frame::Error(s) => write!(f, "-{}", s),
            Frame::Integer(n) => write!(f, ":{}", n),
            Frame::Bulk(val) if val.len() > 64 => {
                write!(f, "${} bytes", val.len())
            }
            Frame::Bulk(val) => write!(f, "${:?}", String::from_utf8_lossy(val)),
            Frame::Null => write!(f, "(nil)"),
            Frame::Array(frames) => write!(f, "*{} frames", frames.len()),
        }
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Incomplete => ErrorKind::NetworkFraming("incomplete frame".into()).into(),
            FrameError::Invalid(description) => ErrorKind::NetworkFraming(description).into(),
        }
    }
}

// cursor utilities.
mod cursor {
    use super::*;

    pub(super) fn get_u8(src: &mut ByteCursor) -> Result<u8, FrameError> {
        if !src.has_remaining() {
            return Err(FrameError::Incomplete);
        }
        Ok(src.get_u8())
    }

    pub(super) fn skip(src: &mut ByteCursor, n: usize) -> Result<(), FrameError> {
        if src.remaining() < n {
            return Err(FrameError::Incomplete);
        }
        src.advance(n);
        Ok(())
    }

    pub(super) fn get_decimal(src: &mut ByteCursor) -> Result<i64, FrameError> {
        let line = get_line(src)?;

        atoi::atoi::<i64>(line)
            .ok_or_else(|| FrameError::Invalid("invalid protocol decimal format".into()))
    }

    pub(super) fn get_string(src: &mut ByteCursor) -> Result<String, FrameError> {
        let line = get_line(src)?;
        String::from_utf8(line.to_vec()).map_err(|e| FrameError::Invalid(e.to_string()))
    }

    pub(super) fn get_line<'a>(src: &mut ByteCursor<'a>) -> Result<&'a [u8], FrameError> {
        let buf: &'a [u8] = *src.get_ref();
        let start = src.position() as usize;
        let rest = buf.get(start..).unwrap_or_default();

        match rest.windows(2).position(|w| w == DELIMITER) {
            Some(i) => {
                src.set_position((start + i + DELIMITER.len()) as u64);
                Ok(&rest[..i])
            }
            None => Err(FrameError::Incomplete),
        }
    }
}
