use std::io::Cursor;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

use crate::common::{trace, ErrorKind, Result};
use crate::protocol::frame::{frameprefix, Frame, FrameError};
use crate::protocol::DELIMITER;

pub(crate) struct Connection<T = TcpStream> {
    stream: BufWriter<T>,
    // The buffer for reading frames.
    buffer: BytesMut,
}

impl<T> Connection<T>
where
    T: AsyncWrite + AsyncRead + Unpin,
{
    pub(crate) fn new(stream: T, buffer_size: Option<usize>) -> Self {
        Self {
            stream: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(buffer_size.unwrap_or(4 * 1024)),
        }
    }

    // Write a command as an array of bulk strings.
    // arguments are written as is, values are not copied.
    pub(crate) async fn write_command(&mut self, args: &[&[u8]]) -> Result<()> {
        self.stream.write_u8(frameprefix::ARRAY).await?;
        self.write_decimal(args.len()).await?;

        for arg in args {
            self.stream.write_u8(frameprefix::BULK).await?;
            self.write_decimal(arg.len()).await?;
            self.stream.write_all(arg).await?;
            self.stream.write_all(DELIMITER).await?;
        }

        self.stream.flush().await?;
        Ok(())
    }

    // Used by the fake servers in tests, clients only send commands.
    #[cfg(test)]
    pub(crate) async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let mut buf = Vec::new();
        frame.encode(&mut buf);

        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub(crate) async fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.parse_frame()? {
                trace!("Read {}", frame);
                return Ok(Some(frame));
            }

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return if self.buffer.is_empty() {
                    Ok(None)
                } else {
                    Err(ErrorKind::ConnectionResetByPeer.into())
                };
            }
        }
    }

    fn parse_frame(&mut self) -> Result<Option<Frame>> {
        use FrameError::Incomplete;

        let mut buf = Cursor::new(&self.buffer[..]);

        match Frame::check(&mut buf) {
            Ok(_) => {
                let len = buf.position() as usize;
                buf.set_position(0);
                let frame = Frame::parse(&mut buf)?;
                self.buffer.advance(len);

                Ok(Some(frame))
            }
            Err(Incomplete) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_decimal(&mut self, val: usize) -> std::io::Result<()> {
        use std::io::Write;

        let mut buf = [0u8; 20];
        let mut buf = Cursor::new(&mut buf[..]);
        write!(&mut buf, "{}", val)?;

        let pos = buf.position() as usize;
        self.stream.write_all(&buf.get_ref()[..pos]).await?;
        self.stream.write_all(DELIMITER).await
    }
}
