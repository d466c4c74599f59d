use std::error::Error as StdError;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{StatusCode, redirect};
use tokio::time::timeout;
use url::Url;

use super::types::Outcome;
use super::validation;
use crate::config;

/// A single reachability check against a fixed target
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// Issue exactly one request and classify it. Never retries.
    async fn probe(&self) -> Outcome;
}

/// HTTP(S) prober expecting one specific status code
pub struct HttpProber {
    client: reqwest::Client,
    endpoint: Url,
    expected_status: StatusCode,
    timeout_duration: Duration,
}

impl HttpProber {
    pub fn new(endpoint: Url, expected_status: StatusCode, timeout_duration: Duration) -> Result<Self> {
        // Redirects are reported as-is; a captive portal answering 302 is not
        // the endpoint answering.
        let client = reqwest::Client::builder()
            .timeout(timeout_duration)
            .redirect(redirect::Policy::none())
            .user_agent(concat!("netpinger/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, endpoint, expected_status, timeout_duration })
    }

    /// Build a prober from validated probe settings
    pub fn from_config(probe: &config::Probe) -> Result<Self> {
        let endpoint = validation::validate_endpoint(&probe.endpoint)?;
        let expected_status = validation::validate_expected_status(probe.expected_status)?;
        Self::new(endpoint, expected_status, probe.timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or("endpoint")
    }

    fn classify_error(&self, error: &reqwest::Error) -> Outcome {
        if error.is_timeout() {
            return self.timed_out();
        }
        Outcome::network_error(format!("failed to reach {}: {}", self.host(), error_chain(error)))
    }

    fn timed_out(&self) -> Outcome {
        Outcome::network_error(format!(
            "failed to reach {}: timeout after {}s",
            self.host(),
            self.timeout_duration.as_secs_f64()
        ))
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> Outcome {
        let request = self.client.get(self.endpoint.clone()).send();

        // The client timeout covers the request; this bounds everything else
        // (connection setup included) by the same budget.
        let response = match timeout(self.timeout_duration, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return self.classify_error(&e),
            Err(_) => return self.timed_out(),
        };

        let status = response.status();
        if status == self.expected_status {
            Outcome::success(format!("successfully reached {}: {}", self.host(), status))
        } else {
            Outcome::unexpected_status(format!(
                "wrong status code returned from {}: {}",
                self.host(),
                status
            ))
        }
    }
}

/// Render an error with its sources, `outer: inner: root`
fn error_chain(error: &dyn StdError) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !rendered.ends_with(&cause_text) {
            rendered.push_str(": ");
            rendered.push_str(&cause_text);
        }
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Start a mock backend answering every request with `status_line`.
    async fn start_mock_backend(status_line: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        addr
    }

    /// Start a backend that accepts connections and never answers.
    async fn start_silent_backend() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        addr
    }

    fn prober_for(addr: SocketAddr, timeout: Duration) -> HttpProber {
        let url = Url::parse(&format!("http://{addr}/generate_204")).unwrap();
        HttpProber::new(url, StatusCode::NO_CONTENT, timeout).unwrap()
    }

    #[tokio::test]
    async fn test_expected_status_is_success() {
        let addr = start_mock_backend("204 No Content").await;
        let outcome = prober_for(addr, Duration::from_secs(5)).probe().await;

        assert!(matches!(outcome, Outcome::Success(_)), "{outcome:?}");
        assert!(outcome.message().contains("204 No Content"));
    }

    #[tokio::test]
    async fn test_other_status_is_unexpected() {
        for status_line in ["200 OK", "302 Found", "503 Service Unavailable"] {
            let addr = start_mock_backend(status_line).await;
            let outcome = prober_for(addr, Duration::from_secs(5)).probe().await;

            assert!(matches!(outcome, Outcome::UnexpectedStatus(_)), "{outcome:?}");
            assert!(outcome.message().contains(status_line), "{outcome:?}");
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let outcome = prober_for(addr, Duration::from_secs(5)).probe().await;
        assert!(matches!(outcome, Outcome::NetworkError(_)), "{outcome:?}");
        assert!(outcome.message().starts_with("failed to reach 127.0.0.1"));
    }

    #[tokio::test]
    async fn test_timeout_is_bounded_network_error() {
        let addr = start_silent_backend().await;
        let prober = prober_for(addr, Duration::from_millis(300));

        let started = std::time::Instant::now();
        let outcome = prober.probe().await;

        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(matches!(outcome, Outcome::NetworkError(_)), "{outcome:?}");
        assert!(outcome.message().contains("timeout after"), "{outcome:?}");
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let probe = config::Probe { endpoint: "not a url".into(), ..config::Probe::default() };
        assert!(HttpProber::from_config(&probe).is_err());
    }
}
