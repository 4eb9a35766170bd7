use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::client::Api;
use crate::common::{debug, ErrorKind, Result};
use crate::protocol::connection::Connection;
use crate::protocol::frame::Frame;
use crate::Key;

/// Client speaks the store protocol over a single connection.
/// requests are issued one at a time, no pipelining.
pub struct Client<T = TcpStream> {
    connection: Connection<T>,
}

impl Client<TcpStream> {
    pub async fn from_addr(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Client::new(stream))
    }
}

impl<T> Client<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: T) -> Self {
        Self {
            connection: Connection::new(stream, Some(1024 * 4)),
        }
    }

    /// Send AUTH. `username` is only sent when given (ACL style authentication).
    pub async fn authenticate(&mut self, username: Option<&str>, password: &str) -> Result<()> {
        let reply = match username {
            Some(username) => {
                self.request(&[b"AUTH", username.as_bytes(), password.as_bytes()])
                    .await?
            }
            None => self.request(&[b"AUTH", password.as_bytes()]).await?,
        };

        expect_ok("AUTH", reply)
    }

    // Return ping latency.
    pub async fn ping(&mut self) -> Result<chrono::Duration> {
        let start = chrono::Utc::now();
        match self.request(&[b"PING"]).await? {
            Frame::Simple(s) if s == "PONG" => Ok(chrono::Utc::now() - start),
            reply => Err(unexpected("PING", &reply)),
        }
    }

    async fn request(&mut self, args: &[&[u8]]) -> Result<Frame> {
        let command = String::from_utf8_lossy(args.first().copied().unwrap_or_default());
        debug!(%command, args = args.len().saturating_sub(1), "Request");

        self.connection.write_command(args).await?;

        match self.connection.read_frame().await? {
            Some(Frame::Error(message)) => Err(ErrorKind::Command {
                command: command.into_owned(),
                message,
            }
            .into()),
            Some(frame) => Ok(frame),
            None => Err(ErrorKind::ConnectionResetByPeer.into()),
        }
    }
}

#[async_trait]
impl<T> Api for Client<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn keys(&mut self, pattern: &str) -> Result<Vec<Key>> {
        let reply = self.request(&[b"KEYS", pattern.as_bytes()]).await?;
        Ok(expect_bulk_array("KEYS", reply)?
            .into_iter()
            .map(Key::from)
            .collect())
    }

    async fn key_type(&mut self, key: &Key) -> Result<String> {
        match self.request(&[b"TYPE", key]).await? {
            Frame::Simple(key_type) => Ok(key_type),
            reply => Err(unexpected("TYPE", &reply)),
        }
    }

    async fn pttl(&mut self, key: &Key) -> Result<i64> {
        let reply = self.request(&[b"PTTL", key]).await?;
        expect_integer("PTTL", reply)
    }

    async fn dump(&mut self, key: &Key) -> Result<Option<Bytes>> {
        let reply = self.request(&[b"DUMP", key]).await?;
        expect_bulk_or_null("DUMP", reply)
    }

    async fn restore(&mut self, key: &Key, ttl_ms: i64, value: &[u8]) -> Result<()> {
        let ttl = ttl_ms.to_string();
        let reply = self
            .request(&[b"RESTORE", key, ttl.as_bytes(), value])
            .await?;
        expect_ok("RESTORE", reply)
    }

    async fn delete(&mut self, key: &Key) -> Result<u64> {
        let reply = self.request(&[b"DEL", key]).await?;
        expect_integer("DEL", reply).map(|n| n.max(0) as u64)
    }

    async fn get(&mut self, key: &Key) -> Result<Option<Bytes>> {
        let reply = self.request(&[b"GET", key]).await?;
        expect_bulk_or_null("GET", reply)
    }

    async fn smembers(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        let reply = self.request(&[b"SMEMBERS", key]).await?;
        expect_bulk_array("SMEMBERS", reply)
    }

    async fn hgetall(&mut self, key: &Key) -> Result<Vec<(Bytes, Bytes)>> {
        let reply = self.request(&[b"HGETALL", key]).await?;
        let flat = expect_bulk_array("HGETALL", reply)?;
        if flat.len() % 2 != 0 {
            return Err(ErrorKind::UnexpectedReply {
                command: "HGETALL".into(),
                reply: format!("odd number of elements ({})", flat.len()),
            }
            .into());
        }

        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut iter = flat.into_iter();
        while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((field, value));
        }
        Ok(pairs)
    }

    async fn hmget(&mut self, key: &Key, fields: &[String]) -> Result<Vec<Option<Bytes>>> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(fields.len() + 2);
        args.push(b"HMGET");
        args.push(key);
        args.extend(fields.iter().map(|field| field.as_bytes()));

        match self.request(&args).await? {
            Frame::Array(frames) => frames
                .into_iter()
                .map(|frame| expect_bulk_or_null("HMGET", frame))
                .collect(),
            reply => Err(unexpected("HMGET", &reply)),
        }
    }

    async fn zrange(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        let reply = self.request(&[b"ZRANGE", key, b"0", b"-1"]).await?;
        expect_bulk_array("ZRANGE", reply)
    }

    async fn lrange(&mut self, key: &Key) -> Result<Vec<Bytes>> {
        let reply = self.request(&[b"LRANGE", key, b"0", b"-1"]).await?;
        expect_bulk_array("LRANGE", reply)
    }
}

fn unexpected(command: &str, reply: &Frame) -> crate::Error {
    ErrorKind::UnexpectedReply {
        command: command.to_owned(),
        reply: reply.to_string(),
    }
    .into()
}

fn expect_ok(command: &str, reply: Frame) -> Result<()> {
    match reply {
        Frame::Simple(s) if s == "OK" => Ok(()),
        reply => Err(unexpected(command, &reply)),
    }
}

fn expect_integer(command: &str, reply: Frame) -> Result<i64> {
    match reply {
        Frame::Integer(n) => Ok(n),
        reply => Err(unexpected(command, &reply)),
    }
}

fn expect_bulk_or_null(command: &str, reply: Frame) -> Result<Option<Bytes>> {
    match reply {
        Frame::Bulk(value) => Ok(Some(value)),
        Frame::Null => Ok(None),
        reply => Err(unexpected(command, &reply)),
    }
}

fn expect_bulk_array(command: &str, reply: Frame) -> Result<Vec<Bytes>> {
    match reply {
        Frame::Array(frames) => frames
            .into_iter()
            .map(|frame| match frame {
                Frame::Bulk(value) => Ok(value),
                Frame::Simple(s) => Ok(Bytes::from(s)),
                frame => Err(unexpected(command, &frame)),
            })
            .collect(),
        Frame::Null => Ok(Vec::new()),
        reply => Err(unexpected(command, &reply)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;

    // Serve scripted replies, returning the commands the client sent.
    fn serve(replies: Vec<Frame>) -> (Client<DuplexStream>, tokio::task::JoinHandle<Vec<Frame>>) {
        let (client, server) = tokio::io::duplex(1024);
        let handle = tokio::spawn(async move {
            let mut conn = Connection::new(server, None);
            let mut received = Vec::new();
            for reply in replies {
                received.push(conn.read_frame().await.unwrap().unwrap());
                conn.write_frame(&reply).await.unwrap();
            }
            received
        });
        (Client::new(client), handle)
    }

    fn bulk(s: &str) -> Frame {
        Frame::Bulk(Bytes::copy_from_slice(s.as_bytes()))
    }

    #[test]
    fn dump_commands() {
        tokio_test::block_on(async move {
            let (mut client, handle) = serve(vec![
                Frame::Array(vec![bulk("a1"), bulk("b1")]),
                Frame::Integer(-1),
                bulk("\x00\x03abc"),
                Frame::Null,
            ]);

            let keys = client.keys("*").await.unwrap();
            assert_eq!(keys, vec![Key::from("a1"), Key::from("b1")]);
            assert_eq!(client.pttl(&keys[0]).await.unwrap(), -1);
            assert_eq!(
                client.dump(&keys[0]).await.unwrap(),
                Some(Bytes::from_static(b"\x00\x03abc"))
            );
            assert_eq!(client.dump(&Key::from("gone")).await.unwrap(), None);

            let received = handle.await.unwrap();
            assert_eq!(received[0], Frame::command(["KEYS", "*"]));
            assert_eq!(received[1], Frame::command(["PTTL", "a1"]));
            assert_eq!(received[2], Frame::command(["DUMP", "a1"]));
            assert_eq!(received[3], Frame::command(["DUMP", "gone"]));
        })
    }

    #[test]
    fn restore_error_reply() {
        tokio_test::block_on(async move {
            let (mut client, handle) = serve(vec![
                Frame::Error("BUSYKEY Target key name already exists.".into()),
                Frame::Simple("OK".into()),
                Frame::Integer(1),
            ]);
            let key = Key::from("k");

            let err = client.restore(&key, 0, b"payload").await.unwrap_err();
            assert!(err.is_command());
            assert!(matches!(
                err.kind(),
                ErrorKind::Command { command, message }
                    if command == "RESTORE" && message.starts_with("BUSYKEY")
            ));

            // connection is still usable after an error reply.
            client.restore(&key, 1500, b"payload").await.unwrap();
            assert_eq!(client.delete(&key).await.unwrap(), 1);

            let received = handle.await.unwrap();
            assert_eq!(
                received[1],
                Frame::command(["RESTORE", "k", "1500", "payload"])
            );
            assert_eq!(received[2], Frame::command(["DEL", "k"]));
        })
    }

    #[test]
    fn inspect_commands() {
        tokio_test::block_on(async move {
            let (mut client, handle) = serve(vec![
                Frame::Simple("hash".into()),
                Frame::Array(vec![bulk("f1"), bulk("v1"), bulk("f2"), bulk("v2")]),
                Frame::Array(vec![bulk("v1"), Frame::Null]),
                Frame::Array(vec![bulk("x"), bulk("y")]),
            ]);
            let key = Key::from("h");

            assert_eq!(client.key_type(&key).await.unwrap(), "hash");
            assert_eq!(
                client.hgetall(&key).await.unwrap(),
                vec![
                    (Bytes::from_static(b"f1"), Bytes::from_static(b"v1")),
                    (Bytes::from_static(b"f2"), Bytes::from_static(b"v2")),
                ]
            );
            assert_eq!(
                client
                    .hmget(&key, &["f1".to_owned(), "nope".to_owned()])
                    .await
                    .unwrap(),
                vec![Some(Bytes::from_static(b"v1")), None]
            );
            assert_eq!(
                client.lrange(&Key::from("l")).await.unwrap(),
                vec![Bytes::from_static(b"x"), Bytes::from_static(b"y")]
            );

            let received = handle.await.unwrap();
            assert_eq!(received[2], Frame::command(["HMGET", "h", "f1", "nope"]));
            assert_eq!(received[3], Frame::command(["LRANGE", "l", "0", "-1"]));
        })
    }

    #[test]
    fn unexpected_reply() {
        tokio_test::block_on(async move {
            let (mut client, _handle) = serve(vec![bulk("not an integer")]);

            let err = client.pttl(&Key::from("k")).await.unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::UnexpectedReply { .. }));
        })
    }

    #[test]
    fn authenticate() {
        tokio_test::block_on(async move {
            let (mut client, handle) = serve(vec![
                Frame::Error("WRONGPASS invalid username-password pair".into()),
                Frame::Simple("OK".into()),
            ]);

            assert!(client.authenticate(None, "bad").await.is_err());
            client
                .authenticate(Some("default"), "secret")
                .await
                .unwrap();

            let received = handle.await.unwrap();
            assert_eq!(received[0], Frame::command(["AUTH", "bad"]));
            assert_eq!(
                received[1],
                Frame::command(["AUTH", "default", "secret"])
            );
        })
    }
}
