use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::cli::{dump, keys, print, restore};
use crate::client::Provider;
use crate::common::debug;
use crate::config::{env, Config};
use crate::core::{KeyFilter, Selector};
use crate::Result;

/// Dump and restore keys of a redis compatible store
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct KvdumpCommand {
    /// Client options
    #[command(flatten)]
    pub client: ClientOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Client options
#[derive(Args, Debug)]
pub struct ClientOptions {
    /// Store host [default: 127.0.0.1]
    #[arg(long, env = env::HOST, global = true)]
    pub host: Option<String>,
    /// Store port [default: 6379]
    #[arg(long, env = env::PORT, global = true)]
    pub port: Option<u16>,
    /// ACL username, sent along with the password
    #[arg(long, env = env::USERNAME, global = true)]
    pub username: Option<String>,
    /// Password, no authentication when unset
    #[arg(long, env = env::PASSWORD, hide_env_values = true, global = true)]
    pub password: Option<String>,
    /// Tcp connect timeout
    #[arg(long, global = true)]
    pub connect_timeout_milliseconds: Option<u64>,
    /// Configuration file path
    #[arg(long, short = 'C', env = env::CONFIG_PATH, global = true)]
    pub config: Option<PathBuf>,
}

/// Key selection options
#[derive(Args, Debug)]
pub struct SelectOptions {
    /// Store glob pattern
    #[arg(long = "keys", short = 'k', value_name = "PATTERN", default_value = "*")]
    pub pattern: String,
    /// Regular expression applied to the selected key names
    #[arg(long, short = 'r', value_name = "REGEX")]
    pub regex: Option<String>,
    /// Keep keys not matching the regular expression
    #[arg(long, short = 'v', action = ArgAction::SetTrue)]
    pub invert: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List selected keys
    Keys(keys::KeysCommand),
    /// Dump selected keys to a file
    Dump(dump::DumpCommand),
    /// Restore keys from a dump file
    Restore(restore::RestoreCommand),
    /// Print selected keys
    Print(print::PrintCommand),
}

/// Parse command line args
pub fn parse() -> KvdumpCommand {
    KvdumpCommand::parse()
}

impl KvdumpCommand {
    pub async fn run(self) -> Result<()> {
        let KvdumpCommand { client, command } = self;

        let config = client.into_config().await?;
        debug!("{:?}", config);

        let mut provider = Provider::new(config);

        match command {
            Command::Keys(keys) => keys.run(&mut provider).await,
            Command::Dump(dump) => dump.run(&mut provider).await,
            Command::Restore(restore) => restore.run(&mut provider).await,
            Command::Print(print) => print.run(&mut provider).await,
        }
    }
}

impl ClientOptions {
    /// Configuration file values overridden by flags and environment variables.
    pub async fn into_config(self) -> Result<Config> {
        let ClientOptions {
            mut host,
            port,
            mut username,
            mut password,
            connect_timeout_milliseconds,
            config,
        } = self;

        let mut base = match config {
            Some(path) => {
                debug!("Load config {}", path.display());
                Config::load_file(path).await?
            }
            None => Config::default(),
        };

        let mut config = {
            let mut config = Config::default();

            config.set_host(&mut host);
            config.set_port(port);
            config.set_username(&mut username);
            config.set_password(&mut password);
            config.set_connect_timeout_milliseconds(connect_timeout_milliseconds);
            config
        };

        base.override_merge(&mut config);

        Ok(base)
    }
}

impl SelectOptions {
    // Compiled before connecting, an invalid regex never reaches the store.
    pub fn selector(&self) -> Result<Selector> {
        let filter = KeyFilter::new(self.regex.as_deref(), self.invert)?;

        Ok(Selector::new(self.pattern.as_str(), filter))
    }
}
