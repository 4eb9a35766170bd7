use std::path::PathBuf;

use clap::{ArgAction, Args};
use tokio::fs::File;
use tokio::io::BufReader;

use crate::client::Provider;
use crate::common::info;
use crate::core::{restore, RestoreOptions};
use crate::Result;

/// Restore keys from a dump file
#[derive(Args, Debug)]
pub struct RestoreCommand {
    /// Delete each key before restoring it
    #[arg(long, action = ArgAction::SetTrue)]
    pub delete: bool,

    /// Skip keys the store refuses to restore
    #[arg(long, action = ArgAction::SetTrue)]
    pub ignore_errors: bool,

    /// Dump file path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

impl RestoreCommand {
    pub async fn run(self, provider: &mut Provider) -> Result<()> {
        let RestoreCommand {
            delete,
            ignore_errors,
            input,
        } = self;

        // Open first, a missing file should not cost a connection.
        let mut reader = BufReader::new(File::open(&input).await?);

        info!("Restore from {}", input.display());

        let options = RestoreOptions {
            delete_first: delete,
            ignore_errors,
        };
        let summary = restore(provider.api().await?, &mut reader, options).await?;

        println!(
            "restored {} keys, skipped {}",
            summary.restored, summary.skipped
        );

        Ok(())
    }
}
