use clap::{ArgAction, Args};

use crate::cli::SelectOptions;
use crate::client::Provider;
use crate::core::Inspector;
use crate::Result;

/// Print selected keys
#[derive(Args, Debug)]
pub struct PrintCommand {
    #[command(flatten)]
    pub select: SelectOptions,

    /// Hash fields to print, all fields when omitted
    #[arg(long = "field", short = 'f', value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Pretty print values holding json documents
    #[arg(long, short = 'j', action = ArgAction::SetTrue)]
    pub json: bool,
}

impl PrintCommand {
    pub async fn run(self, provider: &mut Provider) -> Result<()> {
        let PrintCommand {
            select,
            fields,
            json,
        } = self;
        let selector = select.selector()?;

        let api = provider.api().await?;
        let keys = selector.select(api).await?;

        let inspector = Inspector::new(json);
        let mut stdout = std::io::stdout();
        for key in &keys {
            inspector.inspect(api, key, &fields, &mut stdout).await?;
        }

        Ok(())
    }
}
