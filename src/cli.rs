use crate::link::Provider;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.yaml and the file cache.
    /// Defaults to $TUNELINK_BASE_PATH or ~/.local/share/tunelink
    #[clap(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start tunelink as a service.
    Daemon {},

    /// Find a link on every other provider
    Resolve {
        /// Spotify or YouTube link
        #[clap(allow_hyphen_values = true)]
        link: String,

        /// Only search these providers, comma separated
        /// (spotify, youTube, appleMusic, deezer, soundCloud, tidal)
        #[clap(short, long, value_delimiter = ',')]
        adapters: Vec<Provider>,
    },

    /// Print a cached result by id, without searching
    Lookup { id: String },

    /// Show how a link is recognized
    Parse {
        #[clap(allow_hyphen_values = true)]
        link: String,
    },
}
