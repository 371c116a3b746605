use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[clap(name = "lnauto", version, about = "Keep a light novel library in sync with its metadata sources")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Import a series into the library
    Add {
        /// Metadata source (a provider name)
        source: String,
        /// Series id at the source
        external_id: String,
        /// Put the series into an existing group instead of a new one
        #[clap(long)]
        group: Option<String>,
    },
    /// Re-fetch one series and merge the changes
    Refresh { source: String, external_id: String },
    /// Re-fetch every series in the library
    RefreshAll,
    /// Refresh the whole library periodically until interrupted
    Watch,
    /// Show one series in detail, or list the library
    Status {
        /// Series id; omit to list every series
        series: Option<String>,
    },
    /// Show recent notifications, newest first
    Notifications {
        #[clap(long, default_value_t = 20)]
        limit: usize,
    },
    /// Mark a book, or every book of a series, as downloaded
    Downloaded {
        #[clap(value_enum)]
        target: Target,
        id: String,
        /// Mark as not downloaded instead
        #[clap(long)]
        undo: bool,
    },
    /// Monitor a book or a series (and its books)
    Monitor {
        #[clap(value_enum)]
        target: Target,
        id: String,
        /// Stop monitoring instead
        #[clap(long)]
        off: bool,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Book,
    Series,
}
