use clap::Parser;
use review_harvest::browser::{SnapshotLauncher, WebDriverLauncher};
use review_harvest::scrapers::{ScrapeRequest, run_scrape};
use review_harvest::server::{self, AppState};
use review_harvest::{HotelReviews, ReviewRecord, ScraperConfig};
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;

mod args;
use args::{Args, Command, ServeArgs};

/// Address served to the snapshot browser during replay
const REPLAY_URL: &str = "file:///replay";

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::default(),
    }
    .with_webdriver_url(args.webdriver_url.clone());

    match args.into_command() {
        Command::Serve(ServeArgs { host, port }) => {
            let addr: SocketAddr = format!("{host}:{port}").parse()?;
            ::log::info!("Browser sessions will use WebDriver at {}", config.webdriver_url);
            let launcher = WebDriverLauncher::new(config.webdriver_url.clone());
            server::serve(addr, AppState::new(launcher, config)).await?;
        }
        Command::Scrape {
            hotel_name,
            sort,
            max_pages,
        } => {
            let mut reviews = HotelReviews::new(hotel_name).with_sort(sort).with_config(config);
            if let Some(max_pages) = max_pages {
                reviews = reviews.with_max_pages(max_pages);
            }
            print_records(&reviews.collect().await?)?;
        }
        Command::Replay { pages, max_pages } => {
            let records = replay(&config, &pages, max_pages).await?;
            print_records(&records)?;
        }
    }

    Ok(())
}

/// Runs the driver against saved pages instead of a live browser
async fn replay(
    config: &ScraperConfig,
    paths: &[PathBuf],
    max_pages: Option<usize>,
) -> Result<Vec<ReviewRecord>, Box<dyn Error>> {
    let pages = paths
        .iter()
        .map(std::fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;
    replay_pages(config, pages, max_pages).await
}

async fn replay_pages(
    config: &ScraperConfig,
    pages: Vec<String>,
    max_pages: Option<usize>,
) -> Result<Vec<ReviewRecord>, Box<dyn Error>> {
    ::log::info!("Replaying {} saved pages", pages.len());

    let max_pages = max_pages.unwrap_or(pages.len());
    let launcher = SnapshotLauncher::new(config.schema.next_page.clone()).with_any_url(pages);
    let request = ScrapeRequest::new(REPLAY_URL).with_max_pages(max_pages);
    Ok(run_scrape(&launcher, config, &request).await?)
}

fn print_records(records: &[ReviewRecord]) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_page(title: &str, next: &str) -> String {
        format!(
            r#"<html><body>
            <div data-testid="review-card">
                <h4 data-testid="review-title">{title}</h4>
                <div class="b08850ce41">Ana</div>
            </div>
            {next}
            </body></html>"#
        )
    }

    #[tokio::test]
    async fn test_replay_walks_saved_pages() {
        let pages = vec![
            saved_page("Uno", r#"<button aria-label="Página siguiente">›</button>"#),
            saved_page("Dos", ""),
        ];
        let records = replay_pages(&ScraperConfig::default(), pages, None)
            .await
            .unwrap();

        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Uno", "Dos"]);
        assert_eq!(records[0].user_name, "Ana");
    }
}
