use async_trait::async_trait;
use bytes::Bytes;

use crate::{Key, Result};

mod provider;
pub use provider::Provider;

pub mod tcp;

/// Store commands needed to select, dump, restore and inspect keys.
///
/// Every call is a single request/response round trip. Implementations
/// return [`ErrorKind::Command`](crate::ErrorKind::Command) when the store
/// answers with an error reply.
#[async_trait]
pub trait Api: Send {
    /// Keys matching the store native glob `pattern`, in store order.
    async fn keys(&mut self, pattern: &str) -> Result<Vec<Key>>;
    /// Type name of the key, `none` if it does not exist.
    async fn key_type(&mut self, key: &Key) -> Result<String>;
    /// Remaining time to live in milliseconds.
    /// negative values follow the store convention (-1 no expiry, -2 missing).
    async fn pttl(&mut self, key: &Key) -> Result<i64>;
    /// Store native serialized value, `None` if the key does not exist.
    async fn dump(&mut self, key: &Key) -> Result<Option<Bytes>>;
    /// Recreate a key from a serialized value. `ttl_ms` 0 means no expiry.
    async fn restore(&mut self, key: &Key, ttl_ms: i64, value: &[u8]) -> Result<()>;
    /// Return the number of removed keys.
    async fn delete(&mut self, key: &Key) -> Result<u64>;

    async fn get(&mut self, key: &Key) -> Result<Option<Bytes>>;
    async fn smembers(&mut self, key: &Key) -> Result<Vec<Bytes>>;
    async fn hgetall(&mut self, key: &Key) -> Result<Vec<(Bytes, Bytes)>>;
    async fn hmget(&mut self, key: &Key, fields: &[String]) -> Result<Vec<Option<Bytes>>>;
    /// Whole sorted set, lowest score first.
    async fn zrange(&mut self, key: &Key) -> Result<Vec<Bytes>>;
    /// Whole list, head first.
    async fn lrange(&mut self, key: &Key) -> Result<Vec<Bytes>>;
}
