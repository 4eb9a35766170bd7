use std::path::PathBuf;

use clap::Args;
use tokio::fs::File;
use tokio::io::BufWriter;

use crate::cli::SelectOptions;
use crate::client::Provider;
use crate::common::info;
use crate::core::dump;
use crate::Result;

/// Dump selected keys to a file
#[derive(Args, Debug)]
pub struct DumpCommand {
    #[command(flatten)]
    pub select: SelectOptions,

    /// Dump file path, truncated when it exists
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

impl DumpCommand {
    pub async fn run(self, provider: &mut Provider) -> Result<()> {
        let DumpCommand { select, output } = self;
        let selector = select.selector()?;

        let api = provider.api().await?;
        let keys = selector.select(api).await?;

        info!("Dump {} keys to {}", keys.len(), output.display());

        let mut writer = BufWriter::new(File::create(&output).await?);
        let summary = dump(api, &keys, &mut writer).await?;

        println!(
            "dumped {} keys ({} bytes) to {}",
            summary.keys,
            summary.bytes_written,
            output.display()
        );

        Ok(())
    }
}
