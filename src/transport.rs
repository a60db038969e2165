//! HTTP transport for QRZ queries.
//!
//! QRZ takes its parameters as `;`-separated `key=value` pairs and is
//! sensitive to their order, so a [`Query`] keeps pairs exactly as they were
//! added. A query containing `html` asks for a biography and is answered
//! with plain text; everything else is answered with XML.

use crate::error::{QrzError, Result};
use crate::markup::Document;
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Parameter that switches the service to an HTML biography response
pub const HTML_PARAM: &str = "html";

/// Keys whose values never appear in logs
const REDACTED_KEYS: &[&str] = &["password", "s"];

/// Ordered QRZ query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter after the ones already present
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.pairs.push((key, value.into()));
        self
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether the response to this query is plain text rather than XML
    pub fn expects_text(&self) -> bool {
        self.contains(HTML_PARAM)
    }

    /// Wire form: `k1=v1;k2=v2`, values form-encoded
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                let value: String = url::form_urlencoded::byte_serialize(v.as_bytes()).collect();
                format!("{k}={value}")
            })
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Endpoint with this query attached
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.encode()));
        }
        url
    }
}

/// Log-safe rendering with credentials and session keys masked
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            if REDACTED_KEYS.contains(k) {
                write!(f, "{k}=***")?;
            } else {
                write!(f, "{k}={v}")?;
            }
        }
        Ok(())
    }
}

/// Body of a successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Biography HTML, passed through untouched
    Text(String),
    /// Parsed XML response
    Markup(Document),
}

impl Payload {
    /// Interpret a 2xx body according to what `query` asked for
    pub fn from_body(query: &Query, body: String) -> Result<Self> {
        if query.expects_text() {
            Ok(Payload::Text(body))
        } else {
            Document::parse(&body).map(Payload::Markup)
        }
    }

    pub fn into_markup(self) -> Result<Document> {
        match self {
            Payload::Markup(doc) => Ok(doc),
            Payload::Text(_) => Err(QrzError::structural(
                "expected an XML response, received plain text",
            )),
        }
    }

    pub fn into_text(self) -> Result<String> {
        match self {
            Payload::Text(text) => Ok(text),
            Payload::Markup(_) => Err(QrzError::structural(
                "expected a plain-text response, received XML",
            )),
        }
    }
}

/// Check the status line before anything looks at the body
fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    warn!(status = status.as_u16(), "QRZ request failed");
    Err(QrzError::HttpStatus {
        status: status.as_u16(),
    })
}

/// Non-blocking transport: the call suspends while waiting for the response
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn get(&self, query: &Query) -> Result<Payload>;
}

/// Blocking transport: the call holds the caller until the response arrives
pub trait Transport {
    fn get(&self, query: &Query) -> Result<Payload>;
}

/// [`AsyncTransport`] over a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport with its own HTTP client
    pub fn new(config: &crate::client::ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, config.endpoint()?))
    }

    /// Use an existing HTTP client, e.g. one shared deliberately by the caller
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AsyncTransport for HttpTransport {
    async fn get(&self, query: &Query) -> Result<Payload> {
        debug!(endpoint = %self.endpoint, query = %query, "sending QRZ request");
        let response = self.client.get(query.to_url(&self.endpoint)).send().await?;
        check_status(response.status())?;

        let body = response.text().await?;
        Payload::from_body(query, body)
    }
}

/// [`Transport`] over a `reqwest::blocking::Client`
#[cfg(feature = "blocking")]
#[derive(Debug, Clone)]
pub struct BlockingHttpTransport {
    client: reqwest::blocking::Client,
    endpoint: Url,
}

#[cfg(feature = "blocking")]
impl BlockingHttpTransport {
    /// Build a transport with its own HTTP client.
    ///
    /// Must not be called from inside an async runtime.
    pub fn new(config: &crate::client::ClientConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, config.endpoint()?))
    }

    pub fn with_client(client: reqwest::blocking::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg(feature = "blocking")]
impl Transport for BlockingHttpTransport {
    fn get(&self, query: &Query) -> Result<Payload> {
        debug!(endpoint = %self.endpoint, query = %query, "sending QRZ request");
        let response = self.client.get(query.to_url(&self.endpoint)).send()?;
        check_status(response.status())?;

        let body = response.text()?;
        Payload::from_body(query, body)
    }
}
