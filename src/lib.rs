#![allow(clippy::module_inception)]

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod protocol;

pub use crate::error::{Error, ErrorKind};
pub type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

pub use protocol::Key;

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::Error;
    pub(crate) type ErrorKind = crate::error::ErrorKind;

    pub(crate) type Time = chrono::DateTime<chrono::Utc>;

    pub use tracing::{debug, error, info, trace, warn};
}
