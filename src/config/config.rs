use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tokio::time::Duration;

use crate::common::Result;

// Store connection configuration.
// every field is optional, unset fields fall back to defaults.
#[derive(Deserialize, Default, Clone)]
pub struct Config {
    // store host.
    host: Option<String>,
    // store port.
    port: Option<u16>,
    // ACL username, only sent along with a password.
    username: Option<String>,
    // AUTH password. no authentication when unset.
    password: Option<String>,
    // Timeout for establishing the tcp connection.
    connect_timeout_milliseconds: Option<u64>,
}

impl Config {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 6379;

    pub async fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(config)
    }

    pub fn set_host(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.host = Some(val)
        }
    }
    pub fn set_port(&mut self, val: Option<u16>) {
        if let Some(val) = val {
            self.port = Some(val)
        }
    }
    pub fn set_username(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.username = Some(val)
        }
    }
    pub fn set_password(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.password = Some(val)
        }
    }
    pub fn set_connect_timeout_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.connect_timeout_milliseconds = Some(std::cmp::max(val, 1));
        }
    }

    // Fields set in other take precedence.
    pub fn override_merge(&mut self, other: &mut Config) {
        self.set_host(&mut other.host);
        self.set_port(other.port);
        self.set_username(&mut other.username);
        self.set_password(&mut other.password);
        self.set_connect_timeout_milliseconds(other.connect_timeout_milliseconds);
    }

    pub fn addr(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(Config::DEFAULT_HOST),
            self.port.unwrap_or(Config::DEFAULT_PORT),
        )
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_milliseconds.map(Duration::from_millis)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field(
                "connect_timeout_milliseconds",
                &self.connect_timeout_milliseconds,
            )
            .finish()
    }
}
