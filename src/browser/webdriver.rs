use crate::browser::{BrowserError, Card, Launcher, Page};
use crate::config::BrowserOptions;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};

/// Interval between polls while waiting on the page
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Reports -1 until the document is loaded, then the number of resources fetched so far
const NETWORK_PROBE: &str = "return document.readyState === 'complete' \
     ? performance.getEntriesByType('resource').length : -1;";

/// Opens Chrome sessions through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    webdriver_url: String,
}

impl WebDriverLauncher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    type Page = WebDriverPage;

    async fn launch(&self, options: &BrowserOptions) -> Result<WebDriverPage, BrowserError> {
        let client = connect_to_webdriver(&self.webdriver_url, options).await?;
        Ok(WebDriverPage { client })
    }
}

/// Builds the capabilities describing the browser a scrape expects
pub fn chrome_capabilities(options: &BrowserOptions) -> serde_json::Map<String, Value> {
    let mut args = options.args.clone();
    if options.headless {
        args.push("--headless=new".to_string());
    }
    args.push(format!(
        "--window-size={},{}",
        options.viewport_width, options.viewport_height
    ));
    args.push(format!("--user-agent={}", options.user_agent));
    args.push(format!("--lang={}", options.locale));

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": args,
            "prefs": { "intl.accept_languages": options.locale },
        }),
    );
    caps
}

/// Connects to the WebDriver instance, trying common local ports if the
/// configured one does not answer
async fn connect_to_webdriver(
    webdriver_url: &str,
    options: &BrowserOptions,
) -> Result<Client, BrowserError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(chrome_capabilities(options));

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://127.0.0.1:4444",
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(BrowserError::Launch(first_error))
}

/// Maps a WebDriver command failure onto the capability error taxonomy
fn classify(error: CmdError, selector: &str) -> BrowserError {
    if error.is_no_such_element() {
        return BrowserError::NotFound(selector.to_string());
    }
    if matches!(error, CmdError::WaitTimeout) {
        return BrowserError::Timeout(selector.to_string());
    }
    let message = error.to_string();
    if error.is_stale_element_reference() || message.contains("stale element") {
        BrowserError::Detached
    } else {
        BrowserError::Command(message)
    }
}

/// A page driven over WebDriver
pub struct WebDriverPage {
    client: Client,
}

impl WebDriverPage {
    /// Polls until an element matching `selector` is displayed
    async fn poll_visible(&self, selector: &str) -> Result<(), BrowserError> {
        loop {
            match self.client.find(Locator::Css(selector)).await {
                Ok(element) => match element.is_displayed().await {
                    Ok(true) => return Ok(()),
                    Ok(false) => {}
                    Err(e) => match classify(e, selector) {
                        BrowserError::Detached => {}
                        other => return Err(other),
                    },
                },
                Err(e) => match classify(e, selector) {
                    BrowserError::NotFound(_) => {}
                    other => return Err(other),
                },
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Card = WebDriverCard;

    async fn goto(&mut self, url: &str, limit: Duration) -> Result<(), BrowserError> {
        let started = Instant::now();
        match timeout(limit, self.client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(BrowserError::Navigation(format!("{url}: {e}"))),
            Err(_) => return Err(BrowserError::Navigation(format!("{url}: timed out"))),
        }
        let remaining = limit.saturating_sub(started.elapsed());
        self.wait_for_network_idle(remaining)
            .await
            .map_err(|e| BrowserError::Navigation(format!("{url}: {e}")))
    }

    async fn wait_for(&mut self, selector: &str, limit: Duration) -> Result<(), BrowserError> {
        self.client
            .wait()
            .at_most(limit)
            .for_element(Locator::Css(selector))
            .await
            .map(|_| ())
            .map_err(|e| match classify(e, selector) {
                BrowserError::NotFound(s) => BrowserError::Timeout(s),
                other => other,
            })
    }

    async fn is_visible(&mut self, selector: &str, limit: Duration) -> Result<bool, BrowserError> {
        match timeout(limit, self.poll_visible(selector)).await {
            Ok(Ok(())) => Ok(true),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    async fn is_enabled(&mut self, selector: &str) -> Result<Option<bool>, BrowserError> {
        let element = match self.client.find(Locator::Css(selector)).await {
            Ok(element) => element,
            Err(e) => {
                return match classify(e, selector) {
                    BrowserError::NotFound(_) => Ok(None),
                    other => Err(other),
                };
            }
        };
        element
            .is_enabled()
            .await
            .map(Some)
            .map_err(|e| classify(e, selector))
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| classify(e, selector))?;
        element.click().await.map_err(|e| classify(e, selector))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.client
            .execute("window.scrollBy(0, document.body.scrollHeight);", vec![])
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Command(e.to_string()))
    }

    async fn wait_for_network_idle(&mut self, limit: Duration) -> Result<(), BrowserError> {
        let settle = async {
            let mut last: Option<i64> = None;
            loop {
                let count = self
                    .client
                    .execute(NETWORK_PROBE, vec![])
                    .await
                    .map_err(|e| BrowserError::Command(e.to_string()))?
                    .as_i64()
                    .unwrap_or(-1);

                // Quiet once the load is complete and no new resources arrived since the last poll
                if count >= 0 && last == Some(count) {
                    return Ok(());
                }
                last = Some(count);
                sleep(POLL_INTERVAL * 2).await;
            }
        };

        match timeout(limit, settle).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::Timeout("network idle".to_string())),
        }
    }

    async fn pause(&mut self, duration: Duration) {
        sleep(duration).await;
    }

    async fn cards(&mut self, selector: &str) -> Result<Vec<WebDriverCard>, BrowserError> {
        let elements = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| classify(e, selector))?;
        Ok(elements
            .into_iter()
            .map(|element| WebDriverCard { element })
            .collect())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| BrowserError::Command(e.to_string()))
    }
}

/// A review card element in a WebDriver session
pub struct WebDriverCard {
    element: Element,
}

#[async_trait]
impl Card for WebDriverCard {
    async fn text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let found = match self.element.find(Locator::Css(selector)).await {
            Ok(found) => found,
            Err(e) => {
                return match classify(e, selector) {
                    BrowserError::NotFound(_) => Ok(None),
                    other => Err(other),
                };
            }
        };
        found
            .text()
            .await
            .map(Some)
            .map_err(|e| classify(e, selector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_capabilities() {
        let caps = chrome_capabilities(&BrowserOptions::default());
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        let args: Vec<&str> = args.iter().filter_map(Value::as_str).collect();

        assert!(args.contains(&"--headless=new"));
        assert!(args.contains(&"--window-size=1920,1080"));
        assert!(args.contains(&"--lang=es-ES"));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert_eq!(
            caps["goog:chromeOptions"]["prefs"]["intl.accept_languages"],
            "es-ES"
        );
    }

    #[test]
    fn test_headful_has_no_headless_switch() {
        let options = BrowserOptions {
            headless: false,
            ..BrowserOptions::default()
        };
        let caps = chrome_capabilities(&options);
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn test_classify_command_errors() {
        use fantoccini::error::{ErrorStatus, WebDriver};

        let missing = CmdError::Standard(WebDriver::new(ErrorStatus::NoSuchElement, "missing"));
        assert_eq!(classify(missing, "#x"), BrowserError::NotFound("#x".into()));
        assert_eq!(
            classify(CmdError::WaitTimeout, "#x"),
            BrowserError::Timeout("#x".into())
        );

        let stale = CmdError::Standard(WebDriver::new(ErrorStatus::StaleElementReference, "gone"));
        assert_eq!(classify(stale, "#x"), BrowserError::Detached);

        let other = CmdError::Standard(WebDriver::new(ErrorStatus::JavascriptError, "boom"));
        assert!(matches!(classify(other, "#x"), BrowserError::Command(_)));
    }
}
