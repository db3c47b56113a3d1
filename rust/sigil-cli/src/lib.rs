#![warn(missing_docs)]

//! # Sigil CLI
//!
//! Uploads, deletes and presigned URLs from the command line, against the
//! S3-compatible service described by `SIGIL_*` environment variables (see
//! [StoreConfig::from_env](sigil_storage::StoreConfig::from_env)).
//!
//! ```bash
//! sigil put media avatars/1.png --file ./1.png
//! sigil url media avatars/1.png --expires 600
//! sigil delete media avatars/1.png
//! ```

mod cli;
pub use cli::*;

use std::time::Duration;

use anyhow::{Result, bail};
use sigil_storage::{ObjectLocator, SignedUrlStore, StoreConfig};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Execute `command` against the store described by `config`
pub async fn run(command: Command, config: &StoreConfig) -> Result<()> {
    let store = SignedUrlStore::open(config)?;

    match command {
        Command::Put {
            container,
            key,
            file,
        } => {
            let content = read_content(&file).await?;
            let locator = ObjectLocator::new(container, key);
            let written = store.put_object(&locator, &content).await?;

            if written == 0 && !content.is_empty() {
                bail!("Container {} does not exist", locator.container());
            }
            info!(%locator, written, "uploaded");
            println!("{written}");
        }
        Command::Delete { container, key } => {
            let locator = ObjectLocator::new(container, key);
            let removed = store.delete_object(&locator).await?;

            info!(%locator, removed, "delete finished");
            println!("{removed}");
        }
        Command::Url {
            container,
            key,
            expires,
        } => {
            let locator = ObjectLocator::new(container, key);
            let url = match expires {
                Some(seconds) => {
                    store
                        .get_url(&locator, Duration::from_secs(seconds), false)
                        .await?
                }
                None => store.get_url_with_default_expiration(&locator, false).await?,
            };

            let Some(url) = url else {
                bail!("Container {} does not exist", locator.container());
            };
            println!("{url}");
        }
    }

    Ok(())
}

/// The bytes of `path`, or of standard input when `path` is `-`
async fn read_content(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut content = Vec::new();
        tokio::io::stdin().read_to_end(&mut content).await?;
        Ok(content)
    } else {
        Ok(tokio::fs::read(path).await?)
    }
}
