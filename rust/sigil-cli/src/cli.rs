use clap::{Parser, Subcommand};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "sigil")]
#[command(bin_name = "sigil")]
#[command(about = "Store objects and hand out presigned URLs for them", long_about = None)]
#[command(version)]
pub struct SigilCli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Operations on a single object
#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Upload an object, replacing any existing one
    Put {
        /// Container (bucket) name
        container: String,
        /// Object key
        key: String,
        /// File to upload, `-` for standard input
        #[arg(short, long, default_value = "-")]
        file: String,
    },

    /// Delete an object; prints whether one was removed
    Delete {
        /// Container (bucket) name
        container: String,
        /// Object key
        key: String,
    },

    /// Print a presigned GET URL for an object
    Url {
        /// Container (bucket) name
        container: String,
        /// Object key
        key: String,
        /// URL validity in seconds; defaults to `SIGIL_URL_EXPIRATION`
        #[arg(short, long)]
        expires: Option<u64>,
    },
}
