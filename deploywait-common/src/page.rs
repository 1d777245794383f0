///! Welcome page polling
///! Repeatedly fetches a URL until its body contains an expected text

use crate::timeout::UntilTimeout;
use crate::{Error, Result};
use std::time::Duration;
use tracing::{debug, info};

pub const WORDPRESS_WELCOME: &str =
    "Welcome to the famous five minute WordPress installation process!";

/// A page that is expected to show `expected_text` within `timeout`
#[derive(Debug, Clone)]
pub struct PageCheck {
    pub url: String,
    pub expected_text: String,
    pub timeout: Duration,
    /// Pause between attempts so the server is not hammered
    pub interval: Duration,
}

impl PageCheck {
    pub fn new(url: impl Into<String>, expected_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expected_text: expected_text.into(),
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(1),
        }
    }

    /// WordPress install page on `host`
    pub fn wordpress(host: &str) -> Self {
        Self::new(
            format!("http://{}/wp-admin/install.php", host),
            WORDPRESS_WELCOME,
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Single attempt: true when the page answered successfully with the text
    async fn probe(&self, client: &reqwest::Client, budget: Duration) -> bool {
        let response = match client.get(&self.url).timeout(budget).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request to {} failed: {}", self.url, e);
                return false;
            }
        };

        if !response.status().is_success() {
            debug!("{} answered {}", self.url, response.status());
            return false;
        }

        match response.text().await {
            Ok(body) => body.contains(&self.expected_text),
            Err(e) => {
                debug!("Failed to read body of {}: {}", self.url, e);
                false
            }
        }
    }

    /// Poll until the page shows the expected text or the timeout expires
    pub async fn wait(&self, client: &reqwest::Client) -> Result<()> {
        let mut countdown = UntilTimeout::new(self.timeout);
        while let Some(remaining) = countdown.next() {
            if self.probe(client, remaining).await {
                info!("{} is up", self.url);
                return Ok(());
            }
            tokio::time::sleep(self.interval.min(countdown.remaining())).await;
        }

        Err(Error::PageUnavailable {
            url: self.url.clone(),
        })
    }
}

/// HTTP client used for page checks
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("deploywait/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Check whether WordPress on `host` has come up, giving it 30 seconds
pub async fn check_wordpress(client: &reqwest::Client, host: &str) -> Result<()> {
    PageCheck::wordpress(host).wait(client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wordpress_check() {
        let check = PageCheck::wordpress("10.0.3.15");
        assert_eq!(check.url, "http://10.0.3.15/wp-admin/install.php");
        assert_eq!(check.expected_text, WORDPRESS_WELCOME);
        assert_eq!(check.timeout, Duration::from_secs(30));
        assert_eq!(check.interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_unreachable_page_times_out() {
        // Port 9 (discard) is closed on test machines, connections are refused
        let check = PageCheck::new("http://127.0.0.1:9/", "anything")
            .with_timeout(Duration::from_millis(100))
            .with_interval(Duration::from_millis(10));

        let err = check.wait(&http_client().unwrap()).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot get welcome screen at http://127.0.0.1:9/");
    }
}
