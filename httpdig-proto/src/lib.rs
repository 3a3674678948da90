//! `httpdig-proto` provides the data types returned by DNS-over-HTTPS resolvers that speak the
//! JSON API (e.g. `https://dns.google.com/resolve`), as well as the means to decode them from a
//! response body. In simpler terms, you hand it the bytes the resolver sent and get back a typed
//! [`Response`].
//!
//! It is used as the backend for [`httpdig`], which takes care of sending the queries, but you
//! can use this library on its own as well.
//!
//! # Basic usage example
//! ```rust
//! use std::time::Duration;
//! use httpdig_proto::{RCode, RecordType, Response};
//!
//! let body = br#"{"Status": 0, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
//!     "Question": [{"name": "example.com.", "type": 1}],
//!     "Answer": [{"name": "example.com.", "type": 1, "TTL": 300, "data": "93.184.216.34"}]}"#;
//! let response = Response::parse(body).unwrap();
//! assert_eq!(response.rcode(), RCode::NOERROR);
//! assert_eq!(response.answers[0].rtype, RecordType::A);
//! assert_eq!(response.answers[0].ttl, Duration::from_secs(300));
//! ```
//!
//! # Usage note
//! Decoding is lenient in the same way the resolvers are: fields that are missing or `null` are
//! decoded as their zero value, and fields this crate does not know about are ignored. A
//! resolver-side failure such as `NXDOMAIN` is not an error here, it is a successfully decoded
//! [`Response`] with a non-zero [`Response::status`].
//!
//! [`httpdig`]: https://docs.rs/httpdig

use std::cmp::max;
use std::fmt::{self, Display};
use std::time::Duration;

use owo_colors::OwoColorize;
use repr_with_fallback::repr_with_fallback;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::EnumString;

pub mod error;
mod json;

use error::ParseError;

repr_with_fallback! {
    /// Represents a DNS TYPE.
    ///
    /// The JSON API sends types as integers; the mnemonic is only used for display and for
    /// parsing user input.
    ///
    /// This enum is non-exhaustive, see
    /// [here](https://en.wikipedia.org/wiki/List_of_DNS_record_types) for a more comprehensive
    /// overview.
    #[derive(PartialEq, Eq, Copy, Clone, EnumString, Debug)]
    #[non_exhaustive]
    pub enum RecordType {
        A = 1,
        NS = 2,
        CNAME = 5,
        SOA = 6,
        PTR = 12,
        HINFO = 13,
        MX = 15,
        TXT = 16,
        RP = 17,
        AAAA = 28,
        LOC = 29,
        SRV = 33,
        NAPTR = 35,
        CERT = 37,
        DNAME = 39,
        OPT = 41,
        DS = 43,
        SSHFP = 44,
        RRSIG = 46,
        NSEC = 47,
        DNSKEY = 48,
        NSEC3 = 50,
        NSEC3PARAM = 51,
        TLSA = 52,
        OPENPGPKEY = 61,
        SVCB = 64,
        HTTPS = 65,
        ANY = 255,
        CAA = 257,
        Unknown(u16),
    }
}

repr_with_fallback! {
    /// Represents a DNS RCODE, including those introduced by EDNS.
    ///
    /// See
    /// [here](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6)
    /// for further information.
    #[derive(PartialEq, Eq, Copy, Clone, Debug)]
    #[non_exhaustive]
    pub enum RCode {
        NOERROR = 0,
        FORMERR = 1,
        SERVFAIL = 2,
        NXDOMAIN = 3,
        NOTIMP = 4,
        REFUSED = 5,
        YXDOMAIN = 6,
        YXRRSET = 7,
        NXRRSET = 8,
        NOTAUTH = 9,
        NOTZONE = 10,
        DSOTYPENI = 11,
        BADVERSBADSIG = 16,
        BADKEY = 17,
        BADTIME = 18,
        BADMODE = 19,
        BADNAME = 20,
        BADALG = 21,
        BADTRUNC = 22,
        BADCOOKIE = 23,
        Unknown(u16),
    }
}

/// Represents an entry in the question section of a resolver response.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
#[serde(default)]
pub struct Question {
    /// The name that was queried, usually fully qualified (with a trailing dot).
    #[serde(deserialize_with = "json::nullable")]
    pub name: String,
    /// The [`RecordType`] that was queried.
    #[serde(rename = "type", deserialize_with = "json::nullable")]
    pub qtype: RecordType,
}

/// Represents an entry in the answer or authority section of a resolver response.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
#[serde(default)]
pub struct Record {
    /// The name that this record is for.
    #[serde(deserialize_with = "json::nullable")]
    pub name: String,
    /// The type of this record.
    #[serde(rename = "type", deserialize_with = "json::nullable")]
    pub rtype: RecordType,
    /// How long this record may be cached for.
    #[serde(rename = "TTL", with = "json::ttl")]
    pub ttl: Duration,
    /// The record data in presentation format, exactly as the resolver sent it.
    #[serde(deserialize_with = "json::nullable")]
    pub data: String,
}

/// Represents a complete resolver response.
///
/// The field names on the wire follow the JSON API (`Status`, `TC`, `Answer`, ...). The order of
/// the entries in every section is the order the resolver sent them in.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(default)]
pub struct Response {
    /// The DNS response code, see [`Self::rcode()`].
    #[serde(rename = "Status", deserialize_with = "json::nullable")]
    pub status: u16,
    /// Whether the response was truncated.
    #[serde(rename = "TC", deserialize_with = "json::nullable")]
    pub tc: bool,
    /// Recursion desired.
    #[serde(rename = "RD", deserialize_with = "json::nullable")]
    pub rd: bool,
    /// Recursion available.
    #[serde(rename = "RA", deserialize_with = "json::nullable")]
    pub ra: bool,
    /// Whether the resolver validated all records in the answer and authority sections with
    /// DNSSEC.
    #[serde(rename = "AD", deserialize_with = "json::nullable")]
    pub ad: bool,
    /// Whether DNSSEC validation was disabled for this query.
    #[serde(rename = "CD", deserialize_with = "json::nullable")]
    pub cd: bool,
    /// The list of questions.
    #[serde(rename = "Question", deserialize_with = "json::nullable")]
    pub questions: Vec<Question>,
    /// The list of answer records.
    #[serde(rename = "Answer", deserialize_with = "json::nullable")]
    pub answers: Vec<Record>,
    /// The list of authority records.
    #[serde(rename = "Authority", deserialize_with = "json::nullable")]
    pub authority: Vec<Record>,
    /// The additional section, left undecoded since resolvers put different things in here.
    /// See [`Self::additional_records()`] for a typed view.
    #[serde(rename = "Additional", deserialize_with = "json::nullable")]
    pub additional: Vec<serde_json::Value>,
    /// The client subnet the resolver used, echoed back. May be empty.
    #[serde(rename = "edns_client_subnet", deserialize_with = "json::nullable")]
    pub edns_client_subnet: String,
    /// Free-text diagnostics from the resolver. May be empty.
    #[serde(rename = "Comment", deserialize_with = "json::nullable")]
    pub comment: String,
}

impl Default for RecordType {
    fn default() -> Self {
        RecordType::Unknown(0)
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Unknown(x) => write!(f, "TYPE{}", x),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16((*self).into())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u16::deserialize(deserializer).map(RecordType::from)
    }
}

impl Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RCode::Unknown(x) => write!(f, "RCODE{}", x),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Question {
    /// Returns a string representing the question, with the name padded to `name_len`.
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn as_padded_string(&self, name_len: usize, output: Option<owo_colors::Stream>) -> String {
        let mut name = format!("{:<width$}", self.name, width = name_len);
        let mut qtype = self.qtype.to_string();
        if let Some(stream) = output {
            name = name.if_supports_color(stream, |s| s.green()).to_string();
            qtype = qtype.if_supports_color(stream, |s| s.purple()).to_string();
        }

        format!("{}          {}", name, qtype)
    }
}

impl Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DNS Question for '{}' (type: {})", self.name, self.qtype)
    }
}

impl Record {
    /// Returns a string representing the record in the format used in zone files, but without
    /// the class.
    ///
    /// If `separate_with_single_space` is true, the different fields of the record are always
    /// separated by a single space. If it is false, all fields are separated by two spaces, and
    /// the TTL field is always six characters long (not including separators).
    ///
    /// If `name_len`/`type_len` is [`Some`], the `name`/`type` field is padded to the specified
    /// length.
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn as_string(
        &self,
        separate_with_single_space: bool,
        name_len: Option<usize>,
        type_len: Option<usize>,
        output: Option<owo_colors::Stream>,
    ) -> String {
        let mut name = format!("{:<width$}", self.name, width = name_len.unwrap_or(0));
        let mut rtype = format!(
            "{:<width$}",
            self.rtype.to_string(),
            width = type_len.unwrap_or(0)
        );

        if let Some(stream) = output {
            name = name.if_supports_color(stream, |s| s.green()).to_string();
            rtype = rtype.if_supports_color(stream, |s| s.purple()).to_string();
        }

        let ttl = self.ttl.as_secs();
        if separate_with_single_space {
            format!("{} {} {} {}", name, ttl, rtype, self.data)
        } else {
            format!("{}  {:>6}  {}  {}", name, ttl, rtype, self.data)
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string(true, None, None, None))
    }
}

impl Response {
    /// Decodes a response body as sent by the resolver.
    ///
    /// Returns an error if the body is not JSON or does not have the shape of a resolver
    /// response. The top level must be an object; serde would otherwise also accept a sequence.
    pub fn parse(body: &[u8]) -> Result<Response, ParseError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
        Ok(Response::deserialize(serde_json::Value::Object(object))?)
    }

    /// The [`RCode`] corresponding to [`Self::status`].
    pub fn rcode(&self) -> RCode {
        self.status.into()
    }

    /// Returns the entries of the additional section that look like records (i.e. have at least
    /// a name and a type), skipping everything else.
    pub fn additional_records(&self) -> impl Iterator<Item = Record> + '_ {
        self.additional
            .iter()
            .filter(|value| value.get("name").is_some() && value.get("type").is_some())
            .filter_map(|value| Record::deserialize(value).ok())
    }

    /// Returns a one-line summary of the status and the flags that are set.
    pub fn info_str(&self) -> String {
        let mut s = format!("status: {}, flags: ", self.rcode());
        let flags = [
            (self.tc, "tc"),
            (self.rd, "rd"),
            (self.ra, "ra"),
            (self.ad, "ad"),
            (self.cd, "cd"),
        ];
        let set: Vec<_> = flags
            .iter()
            .filter_map(|(set, flag)| set.then_some(*flag))
            .collect();
        if set.is_empty() {
            s.push_str("<none>");
        } else {
            s.push_str(&set.join(" "));
        }
        s
    }

    /// Returns a string verbosely describing the response (i.e. status, flags and all the
    /// sections).
    ///
    /// If `output` is [`Some`] and the specified output stream supports colours, the output will
    /// be colourized.
    pub fn as_string(&self, output: Option<owo_colors::Stream>) -> String {
        let section_name = |s: &str| {
            let mut s = s.to_string();
            if let Some(stream) = output {
                s = s.if_supports_color(stream, |s| s.yellow()).to_string();
            }
            s
        };

        let mut max_name_len = 0;
        let mut max_type_len = 0;
        for q in &self.questions {
            max_name_len = max(max_name_len, q.name.len());
            max_type_len = max(max_type_len, q.qtype.to_string().len());
        }
        for record in self.answers.iter().chain(self.authority.iter()) {
            max_name_len = max(max_name_len, record.name.len());
            max_type_len = max(max_type_len, record.rtype.to_string().len());
        }

        let mut res = String::new();

        res.push_str(&section_name("Header:\n\t"));
        res.push_str(&self.info_str());
        res.push_str("\n\n");

        res.push_str(&section_name("Question Section:\n"));
        for question in &self.questions {
            res.push('\t');
            // nothing gets printed after the qtype, so it needs no padding
            res.push_str(&question.as_padded_string(max_name_len, output));
            res.push('\n');
        }
        res.push('\n');

        let sections = [
            ("Answer Section:\n", &self.answers),
            ("Authority Section:\n", &self.authority),
        ];
        for (name, records) in sections {
            if records.is_empty() {
                continue;
            }
            res.push_str(&section_name(name));
            for record in records {
                res.push('\t');
                res.push_str(&record.as_string(
                    false,
                    Some(max_name_len),
                    Some(max_type_len),
                    output,
                ));
                res.push('\n');
            }
            res.push('\n');
        }

        if !self.additional.is_empty() {
            res.push_str(&section_name("Additional Section:\n"));
            for value in &self.additional {
                res.push('\t');
                res.push_str(&value.to_string());
                res.push('\n');
            }
            res.push('\n');
        }

        if !self.edns_client_subnet.is_empty() {
            res.push_str(&section_name("EDNS Client Subnet:\n\t"));
            res.push_str(&self.edns_client_subnet);
            res.push_str("\n\n");
        }

        if !self.comment.is_empty() {
            res.push_str(&section_name("Comment:\n\t"));
            res.push_str(&self.comment);
            res.push('\n');
        }

        res.truncate(res.trim_end_matches('\n').len());
        res
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use super::{RCode, Record, RecordType, Response};

    const EXAMPLE_COM_A: &str = r#"{
        "Status": 0,
        "TC": false,
        "RD": true,
        "RA": true,
        "AD": false,
        "CD": false,
        "Question": [{"name": "example.com.", "type": 1}],
        "Answer": [{"name": "example.com.", "type": 1, "TTL": 300, "data": "93.184.216.34"}],
        "edns_client_subnet": "0.0.0.0/0",
        "Comment": "Response from 199.43.135.53."
    }"#;

    #[test]
    fn parse_single_answer() {
        let response = Response::parse(EXAMPLE_COM_A.as_bytes()).unwrap();
        assert_eq!(response.status, 0);
        assert_eq!(response.rcode(), RCode::NOERROR);
        assert!(!response.tc);
        assert!(response.rd);
        assert!(response.ra);
        assert_eq!(response.questions.len(), 1);
        assert_eq!(response.questions[0].name, "example.com.");
        assert_eq!(response.questions[0].qtype, RecordType::A);

        let answer = &response.answers[0];
        assert_eq!(answer.ttl, Duration::from_secs(300));
        assert_eq!(answer.ttl.as_secs(), 300);
        assert_eq!(answer.data, "93.184.216.34");
        assert_eq!(answer.rtype, RecordType::A);
        assert_eq!(response.edns_client_subnet, "0.0.0.0/0");
        assert_eq!(response.comment, "Response from 199.43.135.53.");
    }

    #[test]
    fn parse_preserves_order() {
        let body = r#"{
            "Status": 0,
            "Answer": [
                {"name": "example.com.", "type": 15, "TTL": 10, "data": "30 mx3.example.com."},
                {"name": "example.com.", "type": 15, "TTL": 20, "data": "10 mx1.example.com."},
                {"name": "example.com.", "type": 15, "TTL": 30, "data": "20 mx2.example.com."}
            ],
            "Authority": [
                {"name": "example.com.", "type": 2, "TTL": 3600, "data": "b.iana-servers.net."},
                {"name": "example.com.", "type": 2, "TTL": 7200, "data": "a.iana-servers.net."}
            ]
        }"#;
        let response = Response::parse(body.as_bytes()).unwrap();

        let answers: Vec<_> = response
            .answers
            .iter()
            .map(|r| (r.ttl.as_secs(), r.data.as_str()))
            .collect();
        assert_eq!(
            answers,
            vec![
                (10, "30 mx3.example.com."),
                (20, "10 mx1.example.com."),
                (30, "20 mx2.example.com."),
            ]
        );

        let authority: Vec<_> = response
            .authority
            .iter()
            .map(|r| (r.ttl.as_secs(), r.data.as_str()))
            .collect();
        assert_eq!(
            authority,
            vec![(3600, "b.iana-servers.net."), (7200, "a.iana-servers.net.")]
        );
    }

    #[test]
    fn parse_nxdomain_is_not_an_error() {
        let body = r#"{"Status": 3, "TC": false, "RD": true, "RA": true, "AD": true, "CD": false,
            "Question": [{"name": "nope.example.", "type": 1}],
            "Authority": [{"name": ".", "type": 6, "TTL": 1800,
                "data": "a.root-servers.net. nstld.verisign-grs.com. 2024010100 1800 900 604800 86400"}]}"#;
        let response = Response::parse(body.as_bytes()).unwrap();
        assert_eq!(response.rcode(), RCode::NXDOMAIN);
        assert!(response.answers.is_empty());
        assert_eq!(response.authority[0].rtype, RecordType::SOA);
        assert_eq!(response.authority[0].ttl, Duration::from_secs(1800));
    }

    #[test]
    fn parse_missing_and_null_fields() {
        let response = Response::parse(br#"{"Status": 2, "Answer": null, "Comment": null}"#).unwrap();
        assert_eq!(response.rcode(), RCode::SERVFAIL);
        assert!(response.answers.is_empty());
        assert!(response.questions.is_empty());
        assert!(response.comment.is_empty());
        assert!(!response.rd);

        assert_eq!(Response::parse(b"{}").unwrap(), Response::default());
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let response = Response::parse(br#"{"Status": 0, "SomethingNew": [1, 2, 3]}"#).unwrap();
        assert_eq!(response.rcode(), RCode::NOERROR);
    }

    #[test]
    fn parse_malformed() {
        assert!(Response::parse(b"{").is_err());
        assert!(Response::parse(b"").is_err());
        assert!(Response::parse(b"<html>502 Bad Gateway</html>").is_err());
        assert!(Response::parse(br#"{"Status": "zero"}"#).is_err());
        assert!(Response::parse(br#"{"Answer": {"name": "x"}}"#).is_err());
        assert!(Response::parse(b"[]").is_err());
        assert!(Response::parse(b"[0, false]").is_err());
        assert!(Response::parse(b"null").is_err());
        assert!(Response::parse(b"0").is_err());
    }

    #[test]
    fn additional_records_skip_foreign_entries() {
        let body = r#"{
            "Status": 0,
            "Additional": [
                {"name": "ns1.example.com.", "type": 28, "TTL": 60, "data": "2001:db8::1"},
                {"opt": {"udp": 512}},
                "just a string"
            ]
        }"#;
        let response = Response::parse(body.as_bytes()).unwrap();
        assert_eq!(response.additional.len(), 3);

        let records: Vec<Record> = response.additional_records().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rtype, RecordType::AAAA);
        assert_eq!(records[0].ttl, Duration::from_secs(60));
        assert_eq!(records[0].data, "2001:db8::1");
    }

    #[test]
    fn unknown_codes_round_trip() {
        let body = br#"{"Status": 42, "Question": [{"name": "x.", "type": 4242}]}"#;
        let response = Response::parse(body).unwrap();
        assert_eq!(response.rcode(), RCode::Unknown(42));
        assert_eq!(response.rcode().to_string(), "RCODE42");
        assert_eq!(response.questions[0].qtype, RecordType::Unknown(4242));
        assert_eq!(response.questions[0].qtype.to_string(), "TYPE4242");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["Question"][0]["type"], 4242);
    }

    #[test]
    fn serialize_keeps_wire_names() {
        let response = Response::parse(EXAMPLE_COM_A.as_bytes()).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["Status"], 0);
        assert_eq!(json["RD"], true);
        assert_eq!(json["Answer"][0]["TTL"], 300);
        assert_eq!(json["Answer"][0]["type"], 1);
        assert_eq!(json["edns_client_subnet"], "0.0.0.0/0");
    }

    #[test]
    fn record_type_from_mnemonic() {
        assert_eq!(RecordType::from_str("MX").unwrap(), RecordType::MX);
        assert_eq!(RecordType::from_str("HTTPS").unwrap(), RecordType::HTTPS);
        assert!(RecordType::from_str("example.com").is_err());
        assert_eq!(RecordType::NS.to_string(), "NS");
        assert_eq!(u16::from(RecordType::CAA), 257);
    }

    #[test]
    fn record_as_string() {
        let record = Record {
            name: "example.com.".into(),
            rtype: RecordType::A,
            ttl: Duration::from_secs(300),
            data: "93.184.216.34".into(),
        };
        assert_eq!(record.to_string(), "example.com. 300 A 93.184.216.34");
        assert_eq!(
            record.as_string(false, Some(14), Some(4), None),
            "example.com.       300  A     93.184.216.34"
        );
    }

    #[test]
    fn response_as_string() {
        let response = Response::parse(EXAMPLE_COM_A.as_bytes()).unwrap();
        let s = response.as_string(None);
        assert!(s.starts_with("Header:\n\tstatus: NOERROR, flags: rd ra\n"));
        assert!(s.contains("Question Section:\n\texample.com.          A\n"));
        assert!(s.contains("Answer Section:\n\texample.com.     300  A  93.184.216.34\n"));
        assert!(!s.contains("Authority Section"));
        assert!(s.contains("EDNS Client Subnet:\n\t0.0.0.0/0"));
        assert!(s.ends_with("Comment:\n\tResponse from 199.43.135.53."));
    }

    #[test]
    fn info_str_without_flags() {
        let response = Response {
            status: 5,
            ..Default::default()
        };
        assert_eq!(response.info_str(), "status: REFUSED, flags: <none>");
    }
}
