use std::error;
use std::fmt;
use std::io;

use backtrace::Backtrace;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
}

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    // Could not establish or authenticate the store connection.
    Connection { addr: String, description: String },
    ConnectionResetByPeer,
    // The store answered a command with an error reply.
    Command { command: String, message: String },
    UnexpectedReply { command: String, reply: String },
    NetworkFraming(String),
    MalformedHeader { description: String },
    UnsupportedVersion { version: u8 },
    TruncatedRecord {
        field: &'static str,
        expected: u64,
        actual: u64,
    },
    InvalidRegex(regex::Error),
    KeyNotFound { key: String },
    UnsupportedType { key: String, key_type: String },
    Config(serde_yaml::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind() {
            ErrorKind::Io(err) => err.fmt(f),
            ErrorKind::Connection { addr, description } => {
                write!(f, "connection to {} failed. {}", addr, description)
            }
            ErrorKind::ConnectionResetByPeer => write!(f, "connection reset by peer"),
            ErrorKind::Command { command, message } => {
                write!(f, "{} failed: {}", command, message)
            }
            ErrorKind::UnexpectedReply { command, reply } => {
                write!(f, "unexpected reply to {}: {}", command, reply)
            }
            ErrorKind::NetworkFraming(description) => {
                write!(f, "network framing error. {}", description)
            }
            ErrorKind::MalformedHeader { description } => {
                write!(f, "malformed dump file header. {}", description)
            }
            ErrorKind::UnsupportedVersion { version } => {
                write!(f, "unsupported dump file version {}", version)
            }
            ErrorKind::TruncatedRecord {
                field,
                expected,
                actual,
            } => write!(
                f,
                "truncated record. {} needs {} bytes, only {} available",
                field, expected, actual
            ),
            ErrorKind::InvalidRegex(err) => write!(f, "invalid regex. {}", err),
            ErrorKind::KeyNotFound { key } => write!(f, "key {} not found", key),
            ErrorKind::UnsupportedType { key, key_type } => {
                write!(f, "key {} has unsupported type {}", key, key_type)
            }
            ErrorKind::Config(err) => write!(f, "config error. {}", err),
            ErrorKind::Json(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::from(ErrorKind::Io(err))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::from(ErrorKind::InvalidRegex(err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::from(ErrorKind::Config(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::from(ErrorKind::Json(err))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::with_backtrace(kind)
    }
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    pub fn is_eof(&self) -> bool {
        if let ErrorKind::Io(err) = self.kind() {
            err.kind().eq(&io::ErrorKind::UnexpectedEof)
        } else {
            false
        }
    }

    // The store itself rejected the command, the connection is still usable.
    pub fn is_command(&self) -> bool {
        matches!(self.kind(), ErrorKind::Command { .. })
    }

    fn with_backtrace(kind: ErrorKind) -> Self {
        Self {
            kind,
            backtrace: Some(Backtrace::new()),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::InvalidRegex(err) => Some(err),
            ErrorKind::Config(err) => Some(err),
            ErrorKind::Json(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_detection() {
        let err = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(err.is_eof());
        assert!(!err.is_command());

        let err = Error::from(ErrorKind::Command {
            command: "RESTORE".into(),
            message: "BUSYKEY Target key name already exists.".into(),
        });
        assert!(!err.is_eof());
        assert!(err.is_command());
        assert_eq!(
            err.to_string(),
            "RESTORE failed: BUSYKEY Target key name already exists."
        );
    }
}
