//! HTTP seam shared by the resolver and the fetcher.
//!
//! Both stages talk to the network only through [`HttpTransport`], so tests
//! can script responses without sockets.

#[cfg(test)]
pub mod mock;

use std::io::Read;
use std::time::Duration;

use crate::error::TransportError;

/// Response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Content-Type` header, parameters included.
    pub content_type: Option<String>,
    pub body: Box<dyn Read + Send>,
}

/// Minimal GET client. Non-2xx statuses are reported as
/// [`TransportError::Status`].
pub trait HttpTransport: Send + Sync {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .user_agent(user_agent)
            .build();

        Self { agent }
    }

    fn classify(error: ureq::Error) -> TransportError {
        match error {
            ureq::Error::Status(code, _) => TransportError::Status(code),
            ureq::Error::Transport(transport) => {
                let message = transport.to_string();
                let lowered = message.to_ascii_lowercase();
                if lowered.contains("timed out") || lowered.contains("timeout") {
                    TransportError::Timeout(message)
                } else {
                    TransportError::Network(message)
                }
            }
        }
    }
}

impl HttpTransport for UreqTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.agent.get(url).timeout(timeout);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = request.call().map_err(Self::classify)?;

        Ok(HttpResponse {
            status: response.status(),
            content_type: response.header("Content-Type").map(|s| s.to_string()),
            body: Box::new(response.into_reader()),
        })
    }
}
