//! Mapping of parsed responses onto typed records.
//!
//! Every decode starts with the `Session` block: an `Error` there wins over
//! whatever data the response also carries. The requested section is then
//! flattened into a [`FieldMap`] keyed by element local name, and the record
//! is filled from it with these defaults for absent fields: empty string,
//! zero, `false`, the minimum date, or an empty list.

use crate::error::{QrzError, Result};
use crate::markup::{Document, Element};
use crate::types::{
    Address, Continent, CountryEntity, DirectoryEntry, DxccRef, GeoCoordinate,
    GeoLocationSource, GridLocator, ImageMetadata, Name, SessionRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which section of a response a record is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Session,
    DirectoryEntry,
    CountryEntity,
}

impl RecordKind {
    /// Local name of the top-level element holding this kind
    pub fn element(&self) -> &'static str {
        match self {
            RecordKind::Session => "Session",
            RecordKind::DirectoryEntry => "Callsign",
            RecordKind::CountryEntity => "DXCC",
        }
    }
}

/// A record that can be filled from one response section
pub trait FromMarkup: Sized {
    const KIND: RecordKind;

    fn from_fields(fields: &FieldMap) -> Result<Self>;
}

/// Decode the section for `T` out of `document`.
///
/// Fails with [`QrzError::Service`] when the session block carries an error,
/// and with [`QrzError::Structural`] when the section is missing or a field
/// has the wrong type.
pub fn decode<T: FromMarkup>(document: &Document) -> Result<T> {
    let session = check_session(document)?;
    if T::KIND == RecordKind::Session {
        return T::from_fields(&session);
    }

    let element = T::KIND.element();
    let section = document.section(element).ok_or_else(|| {
        QrzError::structural(format!("response carried no <{element}> element"))
    })?;
    T::from_fields(&FieldMap::flatten(section))
}

/// Flatten the `Session` block, failing on any non-empty `Error` inside it
pub fn check_session(document: &Document) -> Result<FieldMap> {
    let session = document
        .section(RecordKind::Session.element())
        .ok_or_else(|| QrzError::structural("response carried no <Session> element"))?;
    let fields = FieldMap::flatten(session);
    if let Some(message) = fields.text("Error") {
        debug!(error = message, "QRZ session block reported an error");
        return Err(QrzError::service(message));
    }
    Ok(fields)
}

/// Local name to text for every element under a section.
///
/// Elements without text are left out, so an empty `<bio/>` reads the same as
/// a missing one. Elements from other namespaces are skipped. When a name
/// repeats, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: HashMap<String, String>,
}

impl FieldMap {
    pub fn flatten(element: &Element) -> Self {
        let fields = element
            .descendants()
            .filter(|e| e.in_schema() && !e.text().is_empty())
            .map(|e| (e.name().to_string(), e.text().to_string()))
            .collect();
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw text of `key`, if present
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn string(&self, key: &str) -> String {
        self.text(key).unwrap_or_default().to_string()
    }

    pub fn optional_string(&self, key: &str) -> Option<String> {
        self.text(key).map(str::to_string)
    }

    pub fn upper(&self, key: &str) -> String {
        self.text(key).unwrap_or_default().to_uppercase()
    }

    /// `"1"` is true, anything else or nothing is false
    pub fn flag(&self, key: &str) -> bool {
        self.text(key) == Some("1")
    }

    /// Numeric field, zero when absent
    pub fn number<N>(&self, key: &str) -> Result<N>
    where
        N: FromStr + Default,
    {
        Ok(self.optional_number(key)?.unwrap_or_default())
    }

    pub fn optional_number<N: FromStr>(&self, key: &str) -> Result<Option<N>> {
        match self.text(key) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                QrzError::structural(format!("field <{key}> is not a number: {raw:?}"))
            }),
        }
    }

    /// `YYYY-MM-DD` date, the minimum date when absent or unparseable
    pub fn date(&self, key: &str) -> NaiveDate {
        self.text(key)
            .and_then(|raw| match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(e) => {
                    debug!(field = key, value = raw, error = %e, "unparseable date, using minimum");
                    None
                }
            })
            .unwrap_or(NaiveDate::MIN)
    }

    /// `YYYY-MM-DD HH:MM:SS` timestamp, the minimum when absent or unparseable
    pub fn timestamp(&self, key: &str) -> NaiveDateTime {
        self.text(key)
            .and_then(
                |raw| match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
                    Ok(ts) => Some(ts),
                    Err(e) => {
                        debug!(field = key, value = raw, error = %e, "unparseable timestamp, using minimum");
                        None
                    }
                },
            )
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Comma-separated list, upper-cased, in upstream order
    pub fn list(&self, key: &str) -> Vec<String> {
        self.text(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_uppercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn coordinate(&self, lat: &str, lon: &str) -> Result<GeoCoordinate> {
        Ok(GeoCoordinate::new(self.number(lat)?, self.number(lon)?))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(_, v): &(String, String)| !v.is_empty())
                .collect(),
        }
    }
}

/// Build image metadata from a URL and a `height:width:size` triple
pub fn parse_image(url: String, info: Option<&str>) -> Result<ImageMetadata> {
    let info = info.unwrap_or("0:0:0");
    let malformed = || QrzError::structural(format!("field <imageinfo> is malformed: {info:?}"));

    let mut parts = info.split(':').map(str::trim);
    let (Some(height), Some(width), Some(size), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    Ok(ImageMetadata {
        url,
        height: height.parse().map_err(|_| malformed())?,
        width: width.parse().map_err(|_| malformed())?,
        size: size.parse().map_err(|_| malformed())?,
    })
}

impl FromMarkup for SessionRecord {
    const KIND: RecordKind = RecordKind::Session;

    fn from_fields(fields: &FieldMap) -> Result<Self> {
        Ok(Self {
            key: fields.optional_string("Key"),
            count: fields.optional_number("Count")?,
            sub_exp: fields.optional_string("SubExp"),
            gm_time: fields.optional_string("GMTime"),
            message: fields.optional_string("Message"),
        })
    }
}

impl FromMarkup for DirectoryEntry {
    const KIND: RecordKind = RecordKind::DirectoryEntry;

    fn from_fields(f: &FieldMap) -> Result<Self> {
        let call = f
            .text("call")
            .map(str::to_uppercase)
            .ok_or_else(|| QrzError::structural("callsign record carried no <call>"))?;

        Ok(Self {
            xref: f.upper("xref"),
            aliases: f.list("aliases"),
            prev_call: f.upper("p_call"),
            trustee: f.string("trustee"),
            qsl_manager: f.string("qslmgr"),
            effective_date: f.date("efdate"),
            expire_date: f.date("expdate"),
            lic_class: f.string("class"),
            lic_codes: f.string("codes"),

            name: Name {
                first: f.string("fname"),
                name: f.string("name"),
                nickname: f.string("nickname"),
                formatted_name: f.string("name_fmt"),
            },
            address: Address {
                attn: f.string("attn"),
                line1: f.string("addr1"),
                line2: f.string("addr2"),
                state: f.string("state"),
                zip: f.string("zip"),
                country: f.string("country"),
                ccode: f.number("ccode")?,
            },
            dxcc: DxccRef {
                id: f.number("dxcc")?,
                name: f.string("land"),
            },
            location: f.coordinate("lat", "lon")?,
            grid: GridLocator::new(f.string("grid")),
            county: f.string("county"),
            fips: f.string("fips"),
            msa: f.string("MSA"),
            area_code: f.string("AreaCode"),
            cq_zone: f.number("cqzone")?,
            itu_zone: f.number("ituzone")?,
            iota: f.string("iota"),
            geoloc: f
                .text("geoloc")
                .map_or(GeoLocationSource::None, GeoLocationSource::from_code),

            timezone: f.string("TimeZone"),
            gmt_offset: f.string("GMTOffset"),
            observes_dst: f.flag("DST"),

            born: f.number("born")?,
            user: f.string("user"),
            email: f.string("email"),
            url: f.string("url"),
            profile_views: f.number("u_views")?,
            bio_size: f.number("bio")?,
            bio_updated: f.timestamp("biodate"),
            image: parse_image(f.string("image"), f.text("imageinfo"))?,
            serial: f.number("serial")?,
            last_modified: f.timestamp("moddate"),
            eqsl: f.flag("eqsl"),
            mail_qsl: f.flag("mqsl"),
            lotw_qsl: f.flag("lotw"),
            call,
        })
    }
}

impl FromMarkup for CountryEntity {
    const KIND: RecordKind = RecordKind::CountryEntity;

    fn from_fields(f: &FieldMap) -> Result<Self> {
        Ok(Self {
            id: f.number("dxcc")?,
            cc2: f.string("cc"),
            cc3: f.string("ccc"),
            name: f.string("name"),
            continent: f.text("continent").and_then(Continent::from_code),
            itu_zone: f.number("ituzone")?,
            cq_zone: f.number("cqzone")?,
            utc_offset: f.string("timezone"),
            location: f.coordinate("lat", "lon")?,
            notes: f.string("notes"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Document {
        Document::parse(&format!(
            r#"<?xml version="1.0" ?><QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">{body}</QRZDatabase>"#
        ))
        .unwrap()
    }

    const SESSION: &str = "<Session><Key>KEY</Key><Count>12</Count></Session>";

    #[test]
    fn test_session_error_wins_for_every_kind() {
        let d = doc("<Session><Error>Not found: XX1XX</Error></Session><Callsign><call>W1AW</call></Callsign>");

        for err in [
            decode::<SessionRecord>(&d).unwrap_err(),
            decode::<DirectoryEntry>(&d).unwrap_err(),
            decode::<CountryEntity>(&d).unwrap_err(),
        ] {
            match err {
                QrzError::Service { message } => assert_eq!(message, "Not found: XX1XX"),
                other => panic!("expected Service error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_nested_session_error_is_found() {
        let d = doc("<Session><Detail><Error>Invalid session key</Error></Detail></Session>");
        assert!(matches!(
            check_session(&d),
            Err(QrzError::Service { message }) if message == "Invalid session key"
        ));
    }

    #[test]
    fn test_foreign_fields_are_skipped() {
        let d = doc(r#"<Callsign xmlns:x="urn:extra"><call>W1AW</call><x:dxcc>bogus</x:dxcc></Callsign><Session/>"#);
        let entry = decode::<DirectoryEntry>(&d).unwrap();
        assert_eq!(entry.dxcc.id, 0);
    }

    #[test]
    fn test_empty_error_is_ignored() {
        let d = doc("<Session><Error></Error><Key>KEY</Key></Session>");
        let session = decode::<SessionRecord>(&d).unwrap();
        assert_eq!(session.key.as_deref(), Some("KEY"));
    }

    #[test]
    fn test_missing_section_is_structural() {
        let d = doc(SESSION);
        assert!(matches!(
            decode::<DirectoryEntry>(&d),
            Err(QrzError::Structural { .. })
        ));

        let d = doc("<Callsign><call>W1AW</call></Callsign>");
        assert!(matches!(
            decode::<DirectoryEntry>(&d),
            Err(QrzError::Structural { .. })
        ));
    }

    #[test]
    fn test_session_record() {
        let d = doc("<Session><Key>ABC123</Key><Count>42</Count><SubExp>subscriber</SubExp><GMTime>Sun Aug 16 03:51:47 2024</GMTime></Session>");
        let session = decode::<SessionRecord>(&d).unwrap();
        assert_eq!(session.key.as_deref(), Some("ABC123"));
        assert_eq!(session.count, Some(42));
        assert!(!session.is_non_subscriber());
    }

    #[test]
    fn test_minimal_callsign() {
        let d = doc(&format!(
            "<Callsign><call>w1aw</call><dxcc>291</dxcc><lat>41.7</lat><lon>-72.7</lon></Callsign>{SESSION}"
        ));
        let entry = decode::<DirectoryEntry>(&d).unwrap();

        assert_eq!(entry.call, "W1AW");
        assert_eq!(entry.dxcc.id, 291);
        assert_eq!(entry.geoloc, GeoLocationSource::None);
        assert_eq!(entry.location, GeoCoordinate::new(41.7, -72.7));
        assert!(entry.aliases.is_empty());
        assert_eq!(entry.image, ImageMetadata::default());
        assert_eq!(entry.effective_date, NaiveDate::MIN);
        assert_eq!(entry.bio_updated, NaiveDateTime::MIN);
        assert!(!entry.eqsl && !entry.mail_qsl && !entry.lotw_qsl && !entry.observes_dst);
    }

    #[test]
    fn test_full_callsign() {
        let d = doc(&format!(
            "<Callsign>
                <call>AA7BQ</call>
                <xref>aa7bq/m</xref>
                <aliases>n6uft, KJ6RK,DL/AA7BQ</aliases>
                <p_call>kj6rk</p_call>
                <efdate>2013-09-20</efdate>
                <expdate>0000-00-00</expdate>
                <fname>FRED</fname>
                <name>LLOYD</name>
                <attn>c/o QRZ</attn>
                <addr1>8711 E PINNACLE PEAK RD 193</addr1>
                <addr2>SCOTTSDALE</addr2>
                <ccode>271</ccode>
                <land>United States</land>
                <grid>DM32af</grid>
                <geoloc>user</geoloc>
                <DST>1</DST>
                <born>1953</born>
                <u_views>115336</u_views>
                <bio>10157</bio>
                <biodate>2023-06-05 23:35:02</biodate>
                <image>https://cdn-xml.qrz.com/q/aa7bq/AA7BQ.jpg</image>
                <imageinfo>285:500:44218</imageinfo>
                <serial>3626</serial>
                <moddate>2023-06-05 23:36:01</moddate>
                <eqsl>0</eqsl>
                <mqsl>1</mqsl>
                <lotw>Y</lotw>
            </Callsign>{SESSION}"
        ));
        let entry = decode::<DirectoryEntry>(&d).unwrap();

        assert_eq!(entry.xref, "AA7BQ/M");
        assert_eq!(entry.aliases, vec!["N6UFT", "KJ6RK", "DL/AA7BQ"]);
        assert_eq!(entry.prev_call, "KJ6RK");
        assert_eq!(
            entry.effective_date,
            NaiveDate::from_ymd_opt(2013, 9, 20).unwrap()
        );
        assert_eq!(entry.expire_date, NaiveDate::MIN);
        assert_eq!(entry.name.full_name(), Some("FRED LLOYD".to_string()));
        assert_eq!(entry.address.attn, "c/o QRZ");
        assert_eq!(entry.address.ccode, 271);
        assert_eq!(entry.dxcc.name, "United States");
        assert_eq!(entry.grid.as_str(), "DM32af");
        assert_eq!(entry.geoloc, GeoLocationSource::User);
        assert!(entry.observes_dst);
        assert_eq!(entry.born, 1953);
        assert_eq!(entry.profile_views, 115336);
        assert_eq!(entry.bio_size, 10157);
        assert_eq!(
            entry.bio_updated,
            NaiveDate::from_ymd_opt(2023, 6, 5)
                .unwrap()
                .and_hms_opt(23, 35, 2)
                .unwrap()
        );
        assert_eq!(entry.image.url, "https://cdn-xml.qrz.com/q/aa7bq/AA7BQ.jpg");
        assert_eq!((entry.image.height, entry.image.width, entry.image.size), (285, 500, 44218));
        assert_eq!(entry.serial, 3626);
        assert!(!entry.eqsl);
        assert!(entry.mail_qsl);
        assert!(!entry.lotw_qsl);
    }

    #[test]
    fn test_non_numeric_field_is_structural() {
        let d = doc(&format!("<Callsign><call>W1AW</call><cqzone>five</cqzone></Callsign>{SESSION}"));
        match decode::<DirectoryEntry>(&d).unwrap_err() {
            QrzError::Structural { message } => assert!(message.contains("cqzone")),
            other => panic!("expected Structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_call_is_structural() {
        let d = doc(&format!("<Callsign><dxcc>291</dxcc></Callsign>{SESSION}"));
        assert!(matches!(
            decode::<DirectoryEntry>(&d),
            Err(QrzError::Structural { .. })
        ));
    }

    #[test]
    fn test_aliases() {
        let empty: FieldMap = [("aliases", "")].into_iter().collect();
        assert!(empty.list("aliases").is_empty());

        let listed: FieldMap = [("aliases", "k1abc,w2xyz,N3Q")].into_iter().collect();
        assert_eq!(listed.list("aliases"), vec!["K1ABC", "W2XYZ", "N3Q"]);
    }

    #[test]
    fn test_image_metadata() {
        assert_eq!(
            parse_image(String::new(), None).unwrap(),
            ImageMetadata {
                url: String::new(),
                height: 0,
                width: 0,
                size: 0
            }
        );
        assert_eq!(
            parse_image("u".to_string(), Some("10:20:30")).unwrap().size,
            30
        );

        for bad in ["10:20", "10:20:30:40", "a:b:c", "10x20x30", ""] {
            assert!(
                matches!(
                    parse_image(String::new(), Some(bad)),
                    Err(QrzError::Structural { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_country_entity() {
        let d = doc(&format!(
            "<DXCC>
                <dxcc>291</dxcc>
                <cc>US</cc>
                <ccc>USA</ccc>
                <name>United States</name>
                <continent>NA</continent>
                <ituzone>6</ituzone>
                <cqzone>3</cqzone>
                <timezone>-5</timezone>
                <lat>37.788081</lat>
                <lon>-97.470703</lon>
                <notes>Includes KH8 and KP4 prior to 1989</notes>
            </DXCC>{SESSION}"
        ));
        let entity = decode::<CountryEntity>(&d).unwrap();

        assert_eq!(entity.id, 291);
        assert_eq!(entity.cc2, "US");
        assert_eq!(entity.cc3, "USA");
        assert_eq!(entity.continent, Some(Continent::NorthAmerica));
        assert_eq!(entity.itu_zone, 6);
        assert_eq!(entity.cq_zone, 3);
        assert_eq!(entity.utc_offset_hours(), Some(-5.0));
        assert_eq!(entity.location, GeoCoordinate::new(37.788081, -97.470703));
        assert!(entity.notes.starts_with("Includes"));
    }

    #[test]
    fn test_unknown_continent_and_missing_location() {
        let d = doc(&format!(
            "<DXCC><dxcc>13</dxcc><name>Antarctica</name><continent>AN</continent></DXCC>{SESSION}"
        ));
        let entity = decode::<CountryEntity>(&d).unwrap();
        assert_eq!(entity.continent, None);
        assert!(entity.location.is_unset());
    }
}
