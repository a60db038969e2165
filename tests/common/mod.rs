//! Fixtures and wiremock matchers shared by the integration tests.

#![allow(dead_code)]

use qrz_lookup::{ApiVersion, ClientConfig};
use wiremock::{Match, Request};

pub const TEST_KEY: &str = "test_session_key_12345";

pub const SAMPLE_LOGIN_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Key>test_session_key_12345</Key>
    <Count>42</Count>
    <SubExp>Wed Jan 1 12:34:03 2025</SubExp>
    <GMTime>Sun Aug 16 03:51:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_CHECK_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Key>test_session_key_12345</Key>
    <Count>42</Count>
    <SubExp>Wed Jan 1 12:34:03 2025</SubExp>
    <GMTime>Sun Aug 16 03:51:50 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_NON_SUBSCRIBER_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Key>limited_key</Key>
    <SubExp>non-subscriber</SubExp>
    <GMTime>Sun Aug 16 03:51:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_CALLSIGN_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Callsign>
    <call>AA7BQ</call>
    <aliases>N6UFT,KJ6RK</aliases>
    <dxcc>291</dxcc>
    <fname>FRED</fname>
    <name>LLOYD</name>
    <addr1>123 TEST ST</addr1>
    <addr2>TESTVILLE</addr2>
    <state>AZ</state>
    <zip>12345</zip>
    <country>United States</country>
    <land>United States</land>
    <lat>34.12345</lat>
    <lon>-112.12345</lon>
    <grid>DM32af</grid>
    <class>E</class>
    <email>test@example.com</email>
    <eqsl>1</eqsl>
    <mqsl>0</mqsl>
    <lotw>1</lotw>
    <cqzone>3</cqzone>
    <ituzone>2</ituzone>
    <geoloc>geocode</geoloc>
    <imageinfo>285:500:44218</imageinfo>
    <image>https://cdn-xml.qrz.com/q/aa7bq/AA7BQ.jpg</image>
    <moddate>2023-06-05 23:36:01</moddate>
    <nickname>Test Op</nickname>
  </Callsign>
  <Session>
    <Key>test_session_key_12345</Key>
    <Count>43</Count>
    <SubExp>Wed Jan 1 12:34:03 2025</SubExp>
    <GMTime>Sun Aug 16 03:52:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_W1AW_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Callsign>
    <call>W1AW</call>
    <dxcc>291</dxcc>
    <lat>41.7</lat>
    <lon>-72.7</lon>
  </Callsign>
  <Session>
    <Key>test_session_key_12345</Key>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_DXCC_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <DXCC>
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
  </DXCC>
  <Session>
    <Key>test_session_key_12345</Key>
    <Count>44</Count>
    <SubExp>Wed Jan 1 12:34:03 2025</SubExp>
    <GMTime>Sun Aug 16 03:53:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_NOT_FOUND_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Error>Not found: INVALIDCALL</Error>
    <Key>test_session_key_12345</Key>
    <GMTime>Sun Aug 16 03:54:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_SESSION_TIMEOUT_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Error>Session Timeout</Error>
    <GMTime>Sun Aug 16 03:55:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_INVALID_KEY_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Error>Invalid session key</Error>
    <GMTime>Sun Aug 16 03:50:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_AUTH_ERROR_RESPONSE: &str = r#"<?xml version="1.0" ?>
<QRZDatabase version="1.34" xmlns="http://xmldata.qrz.com">
  <Session>
    <Error>Username/password incorrect</Error>
    <GMTime>Sun Aug 16 03:56:47 2024</GMTime>
  </Session>
</QRZDatabase>"#;

pub const SAMPLE_BIOGRAPHY: &str = "<p>Licensed in 1969. QRV on HF and 6m.</p>";

pub fn test_config(mock_server_uri: &str) -> ClientConfig {
    ClientConfig {
        base_url: format!("{}/xml", mock_server_uri),
        api_version: ApiVersion::Current,
        user_agent: "qrz-test/1.0".to_string(),
        timeout_seconds: 5,
    }
}

/// Matches when the `;`-separated query contains `pair` verbatim
pub struct QueryHas(pub &'static str);

impl Match for QueryHas {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query()
            .unwrap_or_default()
            .split(';')
            .any(|pair| pair == self.0)
    }
}

/// Matches when the whole query string, order included, equals `query`
pub struct QueryIs(pub &'static str);

impl Match for QueryIs {
    fn matches(&self, request: &Request) -> bool {
        request.url.query().unwrap_or_default() == self.0
    }
}

pub fn login_query() -> QueryIs {
    QueryIs("username=testuser;password=testpass;agent=qrz-test%2F1.0")
}

pub fn check_with_key() -> QueryIs {
    QueryIs("s=test_session_key_12345")
}

pub fn check_without_key() -> QueryIs {
    QueryIs("s=")
}
