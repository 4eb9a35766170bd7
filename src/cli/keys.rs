use clap::Args;

use crate::cli::SelectOptions;
use crate::client::Provider;
use crate::Result;

/// List selected keys
#[derive(Args, Debug)]
pub struct KeysCommand {
    #[command(flatten)]
    pub select: SelectOptions,
}

impl KeysCommand {
    pub async fn run(self, provider: &mut Provider) -> Result<()> {
        let selector = self.select.selector()?;

        let keys = selector.select(provider.api().await?).await?;

        for key in &keys {
            println!("{}", key);
        }
        println!("{} keys", keys.len());

        Ok(())
    }
}
