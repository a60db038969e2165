//! Session token lifecycle.
//!
//! [`Session`] holds the credentials and the current token, builds the check
//! and login queries, and interprets their responses. It does no I/O: the
//! async and blocking clients drive the same steps through their own
//! transports.
//!
//! The token is never trusted on local evidence. Before each lookup the
//! client sends a check query carrying the token; only an error reported by
//! the service in that response sends it through login. A transport failure
//! on the check is returned as is.

use crate::decode::decode;
use crate::error::{QrzError, Result};
use crate::markup::Document;
use crate::transport::Query;
use crate::types::SessionRecord;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of interpreting a check response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCheck {
    /// The service accepted the token
    Valid,
    /// The service rejected the token; `reason` is its error text
    LoginRequired { reason: String },
}

/// Credentials plus the token issued for them
#[derive(Clone)]
pub struct Session {
    username: String,
    password: String,
    useragent: String,
    token: String,
    status: SessionRecord,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("useragent", &self.useragent)
            .field("authenticated", &self.is_authenticated())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with no token; the first check will force a login
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        useragent: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            useragent: useragent.into(),
            token: String::new(),
            status: SessionRecord::default(),
        }
    }

    /// Start from a token issued earlier, e.g. one kept by the caller.
    ///
    /// The token still goes through the check query before its first use.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Replace the token; an empty string clears it
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Account name sent on login
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Agent string sent on login
    pub fn useragent(&self) -> &str {
        &self.useragent
    }

    /// Current token, if a login has succeeded and not been invalidated since
    pub fn token(&self) -> Option<&str> {
        (!self.token.is_empty()).then_some(self.token.as_str())
    }

    /// Check if a token is held; it may still be rejected by the service
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Last `Count`/`SubExp`/`GMTime`/`Message` the service reported
    pub fn status(&self) -> &SessionRecord {
        &self.status
    }

    /// Forget the token
    pub fn clear(&mut self) {
        self.token.clear();
    }

    /// Query that asks the service whether the current token is still good
    pub fn check_query(&self) -> Query {
        Query::new().with("s", self.token.as_str())
    }

    /// Query carrying the credentials, in `username`, `password`, `agent` order
    pub fn login_query(&self) -> Query {
        Query::new()
            .with("username", self.username.as_str())
            .with("password", self.password.as_str())
            .with("agent", self.useragent.as_str())
    }

    /// Token-scoped lookup query: `s` first, then `key=value`
    pub fn lookup_query(&self, key: &'static str, value: impl Into<String>) -> Query {
        self.check_query().with(key, value)
    }

    /// Interpret the response to [`Session::check_query`].
    ///
    /// A service error clears the token and asks for a login. Anything else
    /// wrong with the response is returned as an error.
    pub fn accept_check(&mut self, document: &Document) -> Result<SessionCheck> {
        match decode::<SessionRecord>(document) {
            Ok(record) => {
                debug!(count = ?record.count, "QRZ session still valid");
                self.observe_record(record);
                Ok(SessionCheck::Valid)
            }
            Err(QrzError::Service { message }) => {
                debug!(reason = %message, "QRZ rejected session token");
                self.clear();
                Ok(SessionCheck::LoginRequired { reason: message })
            }
            Err(e) => Err(e),
        }
    }

    /// Interpret the response to [`Session::login_query`] and store the token.
    ///
    /// The token stays unset on every failure path.
    pub fn accept_login(&mut self, document: &Document) -> Result<()> {
        self.clear();
        let record = decode::<SessionRecord>(document)?;

        if record.is_non_subscriber() {
            warn!(username = %self.username, "QRZ account has no XML subscription");
            return Err(QrzError::authorization(format!(
                "account {} is a non-subscriber",
                self.username
            )));
        }

        let key = record
            .key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| QrzError::structural("login response carried no session key"))?;

        self.token = key;
        self.observe_record(record);
        info!(username = %self.username, "authenticated with QRZ.com");
        Ok(())
    }

    /// Pick up the session counters from a lookup response.
    ///
    /// Responses whose session block carries an error are ignored here; the
    /// decoder reports that error for the lookup itself.
    pub fn observe(&mut self, document: &Document) {
        if let Ok(record) = decode::<SessionRecord>(document) {
            self.observe_record(record);
        }
    }

    fn observe_record(&mut self, record: SessionRecord) {
        let SessionRecord {
            key: _,
            count,
            sub_exp,
            gm_time,
            message,
        } = record;

        if count.is_some() {
            self.status.count = count;
        }
        if sub_exp.is_some() {
            self.status.sub_exp = sub_exp;
        }
        if gm_time.is_some() {
            self.status.gm_time = gm_time;
        }
        self.status.message = message;
    }
}
