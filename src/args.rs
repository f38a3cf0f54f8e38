use clap::{Parser, Subcommand};
use review_harvest::SortOrder;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(about = "Scrapes hotel guest reviews through a headless browser")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// WebDriver server to open browser sessions on
    #[arg(long, env = "WEBDRIVER_URL", global = true)]
    pub webdriver_url: Option<String>,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where to listen for HTTP requests
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the scraping API over HTTP (default)
    Serve(ServeArgs),

    /// Scrape one hotel and print the reviews as JSON
    Scrape {
        /// Hotel name as it appears on the site
        hotel_name: String,

        /// Review ordering (default, newest, oldest, highest, lowest or a raw option key)
        #[arg(short, long, default_value = "default")]
        sort: SortOrder,

        /// Maximum number of review pages to visit
        #[arg(short, long)]
        max_pages: Option<usize>,
    },

    /// Run the scraper over saved HTML pages, in order, and print the reviews as JSON
    Replay {
        /// Saved review pages
        #[arg(required = true)]
        pages: Vec<PathBuf>,

        /// Maximum number of review pages to visit
        #[arg(short, long)]
        max_pages: Option<usize>,
    },
}

impl Args {
    /// The subcommand to run; serving is the default
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}
