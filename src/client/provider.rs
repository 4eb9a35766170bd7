use tokio::time::timeout;

use crate::client::tcp::Client;
use crate::client::Api;
use crate::common::{debug, info, ErrorKind, Result};
use crate::config::Config;

/// Provider hands out the single store connection, establishing it on first use.
///
/// The connection is authenticated when a password is configured and then
/// reused for every later call.
pub struct Provider {
    config: Config,
    client: Option<Client>,
}

impl Provider {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub async fn api(&mut self) -> Result<&mut dyn Api> {
        let client = match self.client.take() {
            Some(client) => client,
            None => self.connect().await?,
        };

        Ok(self.client.insert(client))
    }

    async fn connect(&self) -> Result<Client> {
        let addr = self.config.addr();
        let connection_err = |description: String| {
            crate::Error::from(ErrorKind::Connection {
                addr: addr.clone(),
                description,
            })
        };

        let connecting = Client::from_addr(addr.as_str());
        let mut client = match self.config.connect_timeout() {
            Some(duration) => timeout(duration, connecting)
                .await
                .map_err(|_| connection_err(format!("timed out after {:?}", duration)))?,
            None => connecting.await,
        }
        .map_err(|err| connection_err(err.to_string()))?;

        if let Some(password) = self.config.password() {
            client
                .authenticate(self.config.username(), password)
                .await
                .map_err(|err| connection_err(format!("authentication failed. {}", err)))?;
        }

        let latency = client
            .ping()
            .await
            .map_err(|err| connection_err(err.to_string()))?;
        debug!(latency_ms = latency.num_milliseconds(), "Ping");

        info!(%addr, "Connected");

        Ok(client)
    }
}
