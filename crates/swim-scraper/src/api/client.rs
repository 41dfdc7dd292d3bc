//! Rate-limited page fetcher for the ranking site.

use super::rate_limiter::RateLimiter;
use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Anything that can turn a URL into page HTML.
///
/// [`PageFetcher`] is the live implementation; tests substitute static
/// fixtures.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP page fetcher.
///
/// One client and one rate limiter are shared by every request made through
/// this fetcher. Failed requests are not retried here; retry policy belongs
/// to the caller.
pub struct PageFetcher {
    /// HTTP client
    client: Client,
    /// Rate limiter
    rate_limiter: RateLimiter,
}

impl PageFetcher {
    /// Create a new fetcher
    pub fn new(min_interval: Duration, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(min_interval),
        })
    }

    /// Build a fetcher from the scraper section of the configuration
    pub fn from_config(config: &shared::config::ScraperConfig) -> Result<Self> {
        Self::new(
            Duration::from_millis(config.min_interval_ms),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

impl PageSource for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        // Held until the body is read or the request fails
        let _permit = self.rate_limiter.acquire().await;

        debug!(url = %url, "Fetching page");

        match self.get(url).await {
            Ok(body) => {
                debug!(url = %url, bytes = body.len(), "Fetched page");
                Ok(body)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = PageFetcher::new(
            Duration::from_millis(1000),
            Duration::from_secs(30),
            "swim-club-roster/test",
        );
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_from_config_uses_interval() -> Result<()> {
        let mut config = shared::config::ScraperConfig::default();
        config.min_interval_ms = 1500;

        let fetcher = PageFetcher::from_config(&config)?;
        assert_eq!(
            fetcher.rate_limiter().min_interval(),
            Duration::from_millis(1500)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() -> Result<()> {
        let fetcher = PageFetcher::new(
            Duration::from_millis(10),
            Duration::from_secs(2),
            "swim-club-roster/test",
        )?;

        // Port 9 on localhost is the discard port; nothing listens there
        let result = fetcher.fetch("http://127.0.0.1:9/index.php").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));

        // The gate was released despite the failure
        let second = tokio::time::timeout(
            Duration::from_secs(5),
            fetcher.fetch("http://127.0.0.1:9/index.php"),
        )
        .await;
        assert!(second.is_ok());
        Ok(())
    }

    const SERVER_ERROR: &str =
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const EMPTY_PAGE: &str =
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 15\r\nConnection: close\r\n\r\n<html>ok</html>";

    /// Answer one connection per canned response, in order, on loopback
    async fn serve(responses: Vec<&'static str>) -> Result<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Ok(format!("http://{}/index.php", addr))
    }

    fn local_fetcher() -> Result<PageFetcher> {
        PageFetcher::new(
            Duration::from_millis(10),
            Duration::from_secs(5),
            "swim-club-roster/test",
        )
    }

    #[tokio::test]
    async fn test_error_status_is_status_error() -> Result<()> {
        let url = serve(vec![SERVER_ERROR, PAGE]).await?;
        let fetcher = local_fetcher()?;

        let result = fetcher.fetch(&url).await;
        assert!(matches!(
            result,
            Err(FetchError::Status { status, .. }) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));

        // The gate was released after the failed request
        let next = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(&url)).await?;
        assert_eq!(next?, "<html>ok</html>");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_body_error() -> Result<()> {
        let url = serve(vec![EMPTY_PAGE, PAGE]).await?;
        let fetcher = local_fetcher()?;

        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(FetchError::EmptyBody { .. })));

        let next = tokio::time::timeout(Duration::from_secs(5), fetcher.fetch(&url)).await?;
        assert_eq!(next?, "<html>ok</html>");
        Ok(())
    }
}
