//! Non-blocking QRZ.com client.

use crate::decode::{check_session, decode};
use crate::error::{is_not_found_message, QrzError, Result};
use crate::markup::Document;
use crate::session::{Session, SessionCheck};
use crate::transport::{AsyncTransport, HttpTransport, HTML_PARAM};
use crate::types::{ApiVersion, Biography, CountryEntity, DirectoryEntry, Lookup, SessionRecord};
use crate::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Configuration for the QRZ client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the QRZ XML API
    pub base_url: String,
    /// Versioned interface to talk to
    pub api_version: ApiVersion,
    /// Sent as the HTTP user agent and as the login `agent` parameter
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: ApiVersion::Current,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ClientConfig {
    /// Endpoint every query is sent to
    pub fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;

        match &self.api_version {
            ApiVersion::Legacy => {}
            ApiVersion::Current => {
                url = url.join("xml/current/")?;
            }
            ApiVersion::Specific(version) => {
                url = url.join(&format!("xml/{}/", version))?;
            }
        }
        Ok(url)
    }

    /// Per-request timeout handed to the HTTP client
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// QRZ.com XML client whose lookups suspend on network I/O.
///
/// Lookups take `&mut self` because they may replace the session token; use
/// one client per concurrent task.
pub struct QrzClient<T = HttpTransport> {
    transport: T,
    session: Session,
}

impl QrzClient<HttpTransport> {
    /// Create a new client with default configuration
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        Self::with_config(username, password, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(
        username: impl Into<String>,
        password: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let session = Session::new(username, password, config.user_agent);
        Ok(Self::with_transport(session, transport))
    }
}

impl<T: AsyncTransport> QrzClient<T> {
    /// Create a client over an explicitly constructed transport
    pub fn with_transport(session: Session, transport: T) -> Self {
        Self { transport, session }
    }

    /// Transport the client sends through
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Credentials, token and last session counters
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Check if a session token is currently held
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Lookup count and subscription details from the latest response
    pub fn session_status(&self) -> &SessionRecord {
        self.session.status()
    }

    /// Log in now instead of waiting for the first lookup
    pub async fn authenticate(&mut self) -> Result<()> {
        info!("Authenticating with QRZ.com");
        self.login().await
    }

    /// Drop the current token and log in again
    pub async fn reauthenticate(&mut self) -> Result<()> {
        self.session.clear();
        self.authenticate().await
    }

    /// Confirm the token with the service, logging in if it was rejected.
    ///
    /// Runs before every lookup. A transport failure on the check is returned
    /// without attempting a login.
    pub async fn ensure_valid_session(&mut self) -> Result<()> {
        let check = self.session.check_query();
        let document = self.transport.get(&check).await?.into_markup()?;

        match self.session.accept_check(&document)? {
            SessionCheck::Valid => Ok(()),
            SessionCheck::LoginRequired { reason } => {
                warn!(%reason, "QRZ session rejected, logging in");
                self.login().await
            }
        }
    }

    /// Look up information for a callsign
    pub async fn lookup_callsign(&mut self, callsign: &str) -> Result<Lookup<DirectoryEntry>> {
        let callsign = normalize_callsign(callsign)?;
        debug!("Looking up callsign: {}", callsign);

        let document = self.fetch_markup("callsign", &callsign).await?;
        let entry = classify(&callsign, decode::<DirectoryEntry>(&document))?;
        if let Lookup::Found(record) = &entry {
            info!("Successfully looked up callsign: {}", record.call);
        }
        Ok(entry)
    }

    /// Fetch biography HTML for a callsign
    pub async fn lookup_biography(&mut self, callsign: &str) -> Result<Lookup<Biography>> {
        let callsign = normalize_callsign(callsign)?;
        debug!("Fetching biography for callsign: {}", callsign);

        self.ensure_valid_session().await?;
        let query = self.session.lookup_query(HTML_PARAM, callsign.as_str());
        let html = self.transport.get(&query).await?.into_text()?;
        classify(&callsign, biography_from_text(&callsign, html))
    }

    /// Look up DXCC entity by entity number
    pub async fn lookup_dxcc_entity(&mut self, entity: u32) -> Result<Lookup<CountryEntity>> {
        debug!("Looking up DXCC entity: {}", entity);
        self.lookup_dxcc(entity.to_string()).await
    }

    /// Look up DXCC entity by callsign prefix matching
    pub async fn lookup_dxcc_by_callsign(
        &mut self,
        callsign: &str,
    ) -> Result<Lookup<CountryEntity>> {
        let prefix = normalize_dxcc_query(callsign)?;
        debug!("Looking up DXCC entity for callsign: {}", prefix);
        self.lookup_dxcc(prefix).await
    }

    /// Bulk listing of every DXCC entity. Always refused, without a request.
    pub async fn lookup_all_dxcc_entities(&mut self) -> Result<Vec<CountryEntity>> {
        Err(unsupported_bulk_dxcc())
    }

    async fn lookup_dxcc(&mut self, query: String) -> Result<Lookup<CountryEntity>> {
        let document = self.fetch_markup("dxcc", &query).await?;
        let entity = classify(&query, decode::<CountryEntity>(&document))?;
        if let Lookup::Found(record) = &entity {
            info!("Successfully looked up DXCC entity: {} - {}", record.id, record.name);
        }
        Ok(entity)
    }

    async fn login(&mut self) -> Result<()> {
        let query = self.session.login_query();
        debug!("Performing login to QRZ.com");
        let document = self.transport.get(&query).await?.into_markup()?;
        self.session.accept_login(&document)
    }

    async fn fetch_markup(&mut self, key: &'static str, value: &str) -> Result<Document> {
        self.ensure_valid_session().await?;
        let query = self.session.lookup_query(key, value);
        let document = self.transport.get(&query).await?.into_markup()?;
        self.session.observe(&document);
        Ok(document)
    }
}

/// Validate and upper-case a callsign before it is put on the wire
pub(crate) fn normalize_callsign(callsign: &str) -> Result<String> {
    let callsign = callsign.trim();
    if callsign.is_empty() {
        return Err(QrzError::invalid_input("Callsign cannot be empty"));
    }
    if !callsign.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(QrzError::invalid_input(format!(
            "Invalid callsign: {callsign:?}"
        )));
    }
    Ok(callsign.to_ascii_uppercase())
}

/// As [`normalize_callsign`], refusing the bulk `all` query
pub(crate) fn normalize_dxcc_query(query: &str) -> Result<String> {
    if query.trim().eq_ignore_ascii_case("all") {
        return Err(unsupported_bulk_dxcc());
    }
    normalize_callsign(query)
}

pub(crate) fn unsupported_bulk_dxcc() -> QrzError {
    warn!("Refusing bulk DXCC lookup");
    QrzError::unsupported("bulk DXCC lookup (dxcc=all)")
}

/// Turn a "Not found" service error into [`Lookup::NotFound`]
pub(crate) fn classify<R>(query: &str, decoded: Result<R>) -> Result<Lookup<R>> {
    match decoded {
        Ok(record) => Ok(Lookup::Found(record)),
        Err(QrzError::Service { message }) if is_not_found_message(&message) => {
            debug!(query, %message, "QRZ has no record");
            Ok(Lookup::NotFound {
                query: query.to_string(),
                message,
            })
        }
        Err(e) => Err(e),
    }
}

/// Biography responses are HTML, but errors still arrive as XML
pub(crate) fn biography_from_text(callsign: &str, html: String) -> Result<Biography> {
    if html.trim_start().starts_with("<?xml") {
        if let Ok(document) = Document::parse(&html) {
            check_session(&document)?;
        }
    }
    Ok(Biography::new(callsign, html))
}
