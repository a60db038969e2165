//! Blocking QRZ.com client.
//!
//! Same operations and session policy as [`crate::QrzClient`]; each call holds
//! the calling thread until its requests complete. Do not use it from inside
//! an async runtime.

use crate::client::{
    biography_from_text, classify, normalize_callsign, normalize_dxcc_query,
    unsupported_bulk_dxcc, ClientConfig,
};
use crate::decode::decode;
use crate::error::Result;
use crate::markup::Document;
use crate::session::{Session, SessionCheck};
use crate::transport::{BlockingHttpTransport, Transport, HTML_PARAM};
use crate::types::{Biography, CountryEntity, DirectoryEntry, Lookup, SessionRecord};
use tracing::{debug, info, warn};

/// QRZ.com XML client whose lookups block the calling thread
pub struct BlockingQrzClient<T = BlockingHttpTransport> {
    transport: T,
    session: Session,
}

impl BlockingQrzClient<BlockingHttpTransport> {
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
        let transport = BlockingHttpTransport::new(&config)?;
        let session = Session::new(username, password, config.user_agent);
        Ok(Self::with_transport(session, transport))
    }
}

impl<T: Transport> BlockingQrzClient<T> {
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
    pub fn authenticate(&mut self) -> Result<()> {
        info!("Authenticating with QRZ.com");
        self.login()
    }

    /// Drop the current token and log in again
    pub fn reauthenticate(&mut self) -> Result<()> {
        self.session.clear();
        self.authenticate()
    }

    /// See [`crate::QrzClient::ensure_valid_session`]
    pub fn ensure_valid_session(&mut self) -> Result<()> {
        let check = self.session.check_query();
        let document = self.transport.get(&check)?.into_markup()?;

        match self.session.accept_check(&document)? {
            SessionCheck::Valid => Ok(()),
            SessionCheck::LoginRequired { reason } => {
                warn!(%reason, "QRZ session rejected, logging in");
                self.login()
            }
        }
    }

    /// Look up information for a callsign
    pub fn lookup_callsign(&mut self, callsign: &str) -> Result<Lookup<DirectoryEntry>> {
        let callsign = normalize_callsign(callsign)?;
        debug!("Looking up callsign: {}", callsign);

        let document = self.fetch_markup("callsign", &callsign)?;
        let entry = classify(&callsign, decode::<DirectoryEntry>(&document))?;
        if let Lookup::Found(record) = &entry {
            info!("Successfully looked up callsign: {}", record.call);
        }
        Ok(entry)
    }

    /// Fetch biography HTML for a callsign
    pub fn lookup_biography(&mut self, callsign: &str) -> Result<Lookup<Biography>> {
        let callsign = normalize_callsign(callsign)?;
        debug!("Fetching biography for callsign: {}", callsign);

        self.ensure_valid_session()?;
        let query = self.session.lookup_query(HTML_PARAM, callsign.as_str());
        let html = self.transport.get(&query)?.into_text()?;
        classify(&callsign, biography_from_text(&callsign, html))
    }

    /// Look up DXCC entity by entity number
    pub fn lookup_dxcc_entity(&mut self, entity: u32) -> Result<Lookup<CountryEntity>> {
        debug!("Looking up DXCC entity: {}", entity);
        self.lookup_dxcc(entity.to_string())
    }

    /// Look up DXCC entity by callsign prefix matching
    pub fn lookup_dxcc_by_callsign(&mut self, callsign: &str) -> Result<Lookup<CountryEntity>> {
        let prefix = normalize_dxcc_query(callsign)?;
        debug!("Looking up DXCC entity for callsign: {}", prefix);
        self.lookup_dxcc(prefix)
    }

    /// Always refused, without a request
    pub fn lookup_all_dxcc_entities(&mut self) -> Result<Vec<CountryEntity>> {
        Err(unsupported_bulk_dxcc())
    }

    fn lookup_dxcc(&mut self, query: String) -> Result<Lookup<CountryEntity>> {
        let document = self.fetch_markup("dxcc", &query)?;
        let entity = classify(&query, decode::<CountryEntity>(&document))?;
        if let Lookup::Found(record) = &entity {
            info!("Successfully looked up DXCC entity: {} - {}", record.id, record.name);
        }
        Ok(entity)
    }

    fn login(&mut self) -> Result<()> {
        let query = self.session.login_query();
        debug!("Performing login to QRZ.com");
        let document = self.transport.get(&query)?.into_markup()?;
        self.session.accept_login(&document)
    }

    fn fetch_markup(&mut self, key: &'static str, value: &str) -> Result<Document> {
        self.ensure_valid_session()?;
        let query = self.session.lookup_query(key, value);
        let document = self.transport.get(&query)?.into_markup()?;
        self.session.observe(&document);
        Ok(document)
    }
}
