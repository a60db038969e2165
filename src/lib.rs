//! # QRZ.com XML lookup client
//!
//! A Rust client for the QRZ.com XML subscription data service: callsign
//! records, DXCC entity information and biography HTML.
//!
//! ## Features
//!
//! - **Typed records**: responses are decoded into [`DirectoryEntry`] and
//!   [`CountryEntity`] with fixed defaults for absent fields
//! - **Session management**: the token is confirmed with the service before
//!   every lookup and replaced by a fresh login when rejected
//! - **Two clients**: [`QrzClient`] (async, reqwest + tokio) and
//!   `BlockingQrzClient` (blocking, behind the `blocking` feature) share the
//!   same session and decoding code
//! - **Misses are not errors**: a record QRZ does not have comes back as
//!   [`Lookup::NotFound`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrz_lookup::{Lookup, QrzClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = QrzClient::new("your_username", "your_password")?;
//!
//!     // Look up a callsign
//!     match client.lookup_callsign("AA7BQ").await? {
//!         Lookup::Found(entry) => println!("Found: {} - {}", entry.call, entry.name.first),
//!         Lookup::NotFound { message, .. } => println!("{}", message),
//!     }
//!
//!     // Look up DXCC entity
//!     if let Some(dxcc) = client.lookup_dxcc_entity(291).await?.found() {
//!         println!("DXCC 291: {}", dxcc.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! You need a valid QRZ.com username and password. Any QRZ user can log in,
//! but the XML service requires an active subscription; logging in with a
//! non-subscriber account fails with [`QrzError::Authorization`].

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod client;
pub mod decode;
pub mod error;
pub mod markup;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(feature = "blocking")]
pub use blocking::BlockingQrzClient;
pub use client::{ClientConfig, QrzClient};
pub use decode::{decode, FromMarkup, RecordKind};
pub use error::{ErrorKind, QrzError, Result};
pub use markup::Document;
pub use session::Session;
#[cfg(feature = "blocking")]
pub use transport::BlockingHttpTransport;
pub use transport::{AsyncTransport, HttpTransport, Payload, Query, Transport};
pub use types::{
    Address, ApiVersion, Biography, Continent, CountryEntity, DirectoryEntry, DxccRef,
    GeoCoordinate, GeoLocationSource, GridLocator, ImageMetadata, Lookup, Name, SessionRecord,
};

/// The default base URL for QRZ's XML API
pub const DEFAULT_BASE_URL: &str = "https://xmldata.qrz.com/xml";

/// Namespace of every element in a QRZ XML response
pub const XML_NAMESPACE: &str = "http://xmldata.qrz.com";

/// Default user agent string for requests
pub const DEFAULT_USER_AGENT: &str = concat!("qrz-lookup-rs/", env!("CARGO_PKG_VERSION"));
