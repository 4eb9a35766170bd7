pub(crate) mod connection;
pub(crate) mod frame;

use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

pub(crate) const DELIMITER: &[u8; 2] = b"\r\n";

// Key is a binary safe key name as the store reports it.
// it is not required to be valid utf8.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Bytes);

impl Deref for Key {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.len() > 1024 {
            write!(f, "{:?}...", String::from_utf8_lossy(&self.0[..1024]))
        } else {
            write!(f, "{:?}", String::from_utf8_lossy(&self.0))
        }
    }
}

impl Key {
    pub fn new(key: impl Into<Bytes>) -> Self {
        Self(key.into())
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key(Bytes::from(s))
    }
}

impl From<&[u8]> for Key {
    fn from(b: &[u8]) -> Self {
        Key(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Key {
    fn from(b: Vec<u8>) -> Self {
        Key(Bytes::from(b))
    }
}

impl From<Bytes> for Key {
    fn from(b: Bytes) -> Self {
        Key(b)
    }
}
