//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(
    name = "thoughtline",
    version,
    author = "neur0map",
    about = "Hybrid search and timeline correlation over personal thoughts",
    long_about = "Thoughtline searches a store of thoughts with a small query language \
                  (type:, after:, before:, sort:, order:), ranks results by a weighted mix of \
                  semantic, keyword, recency and confidence signals, and correlates timeline \
                  entries through the entities extracted from them."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/thoughtline/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile to apply on top of the configuration
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search thoughts with the query language
    Search {
        /// Query text, e.g. "coffee type:person after:2024-01-01 sort:date"
        query: String,

        /// User whose thoughts are searched
        #[arg(short, long)]
        user: String,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page (defaults to search.default_page_size)
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Suggest completions for a partial query
    Suggest {
        /// Partial query text
        partial: String,

        /// User whose thoughts are used
        #[arg(short, long)]
        user: String,

        /// Maximum number of suggestions (defaults to search.max_suggestions)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Group and correlate timeline entries
    Timeline {
        #[command(subcommand)]
        action: TimelineAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TimelineAction {
    /// Cluster a user's entries into groups
    Group {
        #[arg(short, long)]
        user: String,

        /// Grouping strategy (defaults to timeline.default_group_type)
        #[arg(short = 't', long = "type")]
        group_type: Option<String>,
    },

    /// Find entries sharing entities with one entry
    Related {
        #[arg(short, long)]
        user: String,

        /// Id of the entry to start from
        entry: Uuid,

        /// Maximum number of entries, 1-50 (defaults to timeline.default_related_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show activity statistics
    Summary {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Show only a specific section
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
