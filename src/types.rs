//! Record types produced from QRZ responses.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API version enum for specifying which version of the QRZ XML interface to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiVersion {
    /// Use the current/latest version
    Current,
    /// Use a specific version (e.g., "1.34")
    Specific(String),
    /// Use legacy version (no version specified, defaults to 1.24)
    Legacy,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::Current => write!(f, "current"),
            ApiVersion::Specific(version) => write!(f, "{}", version),
            ApiVersion::Legacy => write!(f, ""),
        }
    }
}

impl ApiVersion {
    /// Create a specific version
    pub fn version(version: impl Into<String>) -> Self {
        Self::Specific(version.into())
    }
}

/// Outcome of a directory lookup.
///
/// A record the service does not have is an expected answer, not a fault, so
/// it is reported here instead of through [`crate::QrzError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The service returned the record
    Found(T),
    /// The service reported that nothing matches `query`
    NotFound { query: String, message: String },
}

impl<T> Lookup<T> {
    /// The record, if one was found
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound { .. })
    }

    /// Map the found record, keeping a miss as is
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound { query, message } => Lookup::NotFound { query, message },
        }
    }
}

/// Contents of the `Session` block carried by every response.
///
/// An `Error` never appears here: decoding turns it into
/// [`crate::QrzError::Service`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session key for authenticated requests
    pub key: Option<String>,
    /// Number of lookups performed in current 24-hour period
    pub count: Option<u32>,
    /// Subscription expiration date or "non-subscriber"
    pub sub_exp: Option<String>,
    /// Current GMT time
    pub gm_time: Option<String>,
    /// Informational message
    pub message: Option<String>,
}

impl SessionRecord {
    /// Check if the account is reported as lacking a subscription
    pub fn is_non_subscriber(&self) -> bool {
        self.sub_exp.as_deref() == Some(NON_SUBSCRIBER)
    }
}

pub(crate) const NON_SUBSCRIBER: &str = "non-subscriber";

/// Latitude/longitude pair in signed decimal degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// S < 0 < N
    pub lat: f64,
    /// W < 0 < E
    pub lon: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether this is the (0, 0) placeholder used when the service omits a location
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }
}

impl From<GeoCoordinate> for (f64, f64) {
    fn from(c: GeoCoordinate) -> Self {
        (c.lat, c.lon)
    }
}

/// Maidenhead grid locator, kept as the service sent it
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridLocator(String);

impl GridLocator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GridLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile image reference and its `imageinfo` dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Full URL of the primary image
    pub url: String,
    /// Height in pixels
    pub height: u32,
    /// Width in pixels
    pub width: u32,
    /// Approximate size in bytes
    pub size: u64,
}

/// DXCC entity the callsign belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DxccRef {
    /// Entity number
    pub id: u32,
    /// Entity name (`land`)
    pub name: String,
}

/// Operator name fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    /// First name(s)
    pub first: String,
    /// Last name, or the full name for some records
    pub name: String,
    /// Name used on the air
    pub nickname: String,
    /// Combined full name and nickname as QRZ formats it
    pub formatted_name: String,
}

impl Name {
    /// Get the full name (combining first and last name)
    pub fn full_name(&self) -> Option<String> {
        match (self.first.is_empty(), self.name.is_empty()) {
            (false, false) => Some(format!("{} {}", self.first, self.name)),
            (false, true) => Some(self.first.clone()),
            (true, false) => Some(self.name.clone()),
            (true, true) => None,
        }
    }
}

/// QSL mailing address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Attention line, printed above the address
    pub attn: String,
    /// House number and street
    pub line1: String,
    /// City
    pub line2: String,
    /// State (USA only)
    pub state: String,
    /// ZIP/postal code
    pub zip: String,
    /// Country name
    pub country: String,
    /// DXCC entity code of the mailing address country
    pub ccode: u32,
}

/// Source of the latitude/longitude on a directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeoLocationSource {
    User,
    Geocode,
    Grid,
    Zip,
    State,
    Dxcc,
    #[default]
    None,
}

impl GeoLocationSource {
    /// Map an upstream `geoloc` value, case-insensitively.
    /// Unknown values map to [`GeoLocationSource::None`].
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "geocode" => Self::Geocode,
            "grid" => Self::Grid,
            "zip" => Self::Zip,
            "state" => Self::State,
            "dxcc" => Self::Dxcc,
            _ => Self::None,
        }
    }
}

impl fmt::Display for GeoLocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::User => "User",
            Self::Geocode => "Geocode",
            Self::Grid => "Grid",
            Self::Zip => "Zip Code",
            Self::State => "State",
            Self::Dxcc => "DXCC",
            Self::None => "None",
        };
        f.write_str(label)
    }
}

/// Continent of a DXCC entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    /// Map a two-letter continent designator. Matching is case-sensitive.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "AF" => Some(Self::Africa),
            "AS" => Some(Self::Asia),
            "EU" => Some(Self::Europe),
            "NA" => Some(Self::NorthAmerica),
            "OC" => Some(Self::Oceania),
            "SA" => Some(Self::SouthAmerica),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Africa => "AF",
            Self::Asia => "AS",
            Self::Europe => "EU",
            Self::NorthAmerica => "NA",
            Self::Oceania => "OC",
            Self::SouthAmerica => "SA",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Africa => "Africa",
            Self::Asia => "Asia",
            Self::Europe => "Europe",
            Self::NorthAmerica => "North America",
            Self::Oceania => "Oceania",
            Self::SouthAmerica => "South America",
        };
        f.write_str(name)
    }
}

/// Full record for a callsign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Primary callsign, upper-case
    pub call: String,
    /// Query callsign that returned this record
    pub xref: String,
    /// Other callsigns that resolve to this record
    pub aliases: Vec<String>,
    /// Previous callsign
    pub prev_call: String,
    /// Trustee (club stations)
    pub trustee: String,
    /// QSL manager info
    pub qsl_manager: String,
    /// License effective date (USA)
    pub effective_date: NaiveDate,
    /// License expiration date (USA)
    pub expire_date: NaiveDate,
    /// License class
    pub lic_class: String,
    /// License type codes (USA)
    pub lic_codes: String,

    pub name: Name,
    pub address: Address,
    pub dxcc: DxccRef,
    /// Approximate location of the address
    pub location: GeoCoordinate,
    pub grid: GridLocator,
    /// County name (USA)
    pub county: String,
    /// FIPS county identifier (USA)
    pub fips: String,
    /// Metro Service Area (USPS)
    pub msa: String,
    /// Telephone area code (USA)
    pub area_code: String,
    pub cq_zone: u32,
    pub itu_zone: u32,
    /// IOTA designator
    pub iota: String,
    pub geoloc: GeoLocationSource,

    /// Time zone (USA)
    pub timezone: String,
    /// GMT time offset
    pub gmt_offset: String,
    pub observes_dst: bool,

    /// Operator's birth year
    pub born: u32,
    /// User who manages this callsign on QRZ
    pub user: String,
    pub email: String,
    /// Web page address
    pub url: String,
    /// QRZ web page views
    pub profile_views: u32,
    /// Biography size in bytes
    pub bio_size: u64,
    pub bio_updated: NaiveDateTime,
    pub image: ImageMetadata,
    /// QRZ database serial number
    pub serial: u64,
    pub last_modified: NaiveDateTime,
    pub eqsl: bool,
    pub mail_qsl: bool,
    pub lotw_qsl: bool,
}

impl DirectoryEntry {
    /// Empty record for `call`, every other field at its default
    pub fn new(call: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            xref: String::new(),
            aliases: Vec::new(),
            prev_call: String::new(),
            trustee: String::new(),
            qsl_manager: String::new(),
            effective_date: NaiveDate::MIN,
            expire_date: NaiveDate::MIN,
            lic_class: String::new(),
            lic_codes: String::new(),
            name: Name::default(),
            address: Address::default(),
            dxcc: DxccRef::default(),
            location: GeoCoordinate::default(),
            grid: GridLocator::default(),
            county: String::new(),
            fips: String::new(),
            msa: String::new(),
            area_code: String::new(),
            cq_zone: 0,
            itu_zone: 0,
            iota: String::new(),
            geoloc: GeoLocationSource::None,
            timezone: String::new(),
            gmt_offset: String::new(),
            observes_dst: false,
            born: 0,
            user: String::new(),
            email: String::new(),
            url: String::new(),
            profile_views: 0,
            bio_size: 0,
            bio_updated: NaiveDateTime::MIN,
            image: ImageMetadata::default(),
            serial: 0,
            last_modified: NaiveDateTime::MIN,
            eqsl: false,
            mail_qsl: false,
            lotw_qsl: false,
        }
    }

    /// Web page address, falling back to the QRZ profile page
    pub fn profile_url(&self) -> String {
        if self.url.is_empty() {
            format!("https://www.qrz.com/db/{}", self.call)
        } else {
            self.url.clone()
        }
    }

    /// Whether the service reported a location for this entry
    pub fn has_location(&self) -> bool {
        !self.location.is_unset()
    }
}

/// DXCC entity information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryEntity {
    /// DXCC entity number
    pub id: u32,
    /// ISO-3166 alpha-2 code
    pub cc2: String,
    /// ISO-3166 alpha-3 code
    pub cc3: String,
    /// Long country name
    pub name: String,
    pub continent: Option<Continent>,
    pub itu_zone: u32,
    pub cq_zone: u32,
    /// UTC offset as sent, e.g. `-5` or `545` for 5:45
    pub utc_offset: String,
    /// Approximate center
    pub location: GeoCoordinate,
    /// Special notes and exceptions
    pub notes: String,
}

impl Default for CountryEntity {
    fn default() -> Self {
        Self {
            id: 0,
            cc2: String::new(),
            cc3: String::new(),
            name: String::new(),
            continent: None,
            itu_zone: 0,
            cq_zone: 0,
            utc_offset: String::new(),
            location: GeoCoordinate::default(),
            notes: String::new(),
        }
    }
}

impl CountryEntity {
    /// Parse the UTC offset as hours (may include fractions)
    pub fn utc_offset_hours(&self) -> Option<f32> {
        // "+5", "-8", "545" (5 hours 45 minutes)
        let tz = self.utc_offset.trim_start_matches('+');
        if tz.is_empty() {
            return None;
        }
        let (sign, digits) = match tz.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, tz),
        };
        if !digits.is_ascii() {
            return None;
        }
        if digits.len() >= 3 {
            if let (Ok(hours), Ok(minutes)) = (
                digits[..digits.len() - 2].parse::<i32>(),
                digits[digits.len() - 2..].parse::<i32>(),
            ) {
                return Some(sign * (hours as f32 + minutes as f32 / 60.0));
            }
        }
        digits.parse::<f32>().ok().map(|h| sign * h)
    }
}

/// Biography HTML for a callsign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biography {
    /// The callsign this biography belongs to
    pub callsign: String,
    /// Raw HTML content
    pub html_content: String,
}

impl Biography {
    /// Create new biography data
    pub fn new(callsign: impl Into<String>, html_content: impl Into<String>) -> Self {
        Self {
            callsign: callsign.into(),
            html_content: html_content.into(),
        }
    }

    /// Get the HTML content
    pub fn html(&self) -> &str {
        &self.html_content
    }

    /// Check if the biography is empty
    pub fn is_empty(&self) -> bool {
        self.html_content.trim().is_empty()
    }
}
