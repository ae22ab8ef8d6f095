use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "doxysearch")]
#[command(about = "Search the static index of Doxygen-generated documentation", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the index over MCP on stdio
    Serve {
        #[arg(short, long)]
        index: Option<PathBuf>,
    },
    /// Run one query and print the ranked results
    Query {
        query: String,
        #[arg(short, long)]
        index: Option<PathBuf>,
        #[arg(short = 's', long = "section")]
        sections: Vec<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Read queries from stdin, one per line, with latest-wins delivery
    Interactive {
        #[arg(short, long)]
        index: Option<PathBuf>,
        #[arg(short = 's', long = "section")]
        sections: Vec<String>,
    },
}
