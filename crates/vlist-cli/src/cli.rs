use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vlist")]
#[command(about = "Drive a recycling virtual list from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML list config (or set VLIST_CONFIG env var)
    #[arg(long, value_name = "FILE", env = "VLIST_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scroll through a generated data set and report the final window
    Scroll(ScrollArgs),
    /// Print the container markup
    Markup(MarkupArgs),
}

#[derive(Args)]
pub struct ScrollArgs {
    /// Items fetched per page
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Pages kept alive before elements are recycled
    #[arg(long)]
    pub pool_pages: Option<usize>,
    /// Element height in pixels
    #[arg(long)]
    pub element_height: Option<f64>,
    /// Margin between elements in pixels
    #[arg(long)]
    pub margin: Option<f64>,
    /// Total items the source serves (unbounded when omitted)
    #[arg(long)]
    pub items: Option<usize>,
    /// Scroll moves: `d` reveals the bottom sentinel, `u` the top one
    #[arg(long, default_value = "d")]
    pub moves: String,
    /// Simulated fetch latency in milliseconds
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
    /// Pages whose fetch fails
    #[arg(long, value_delimiter = ',')]
    pub fail_pages: Vec<usize>,
    /// Fire every move at once instead of waiting for each to settle
    #[arg(long)]
    pub burst: bool,
}

#[derive(Args)]
pub struct MarkupArgs {
    /// Prefix applied to every anchor id
    #[arg(long)]
    pub prefix: Option<String>,
}
