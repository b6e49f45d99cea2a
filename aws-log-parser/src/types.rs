//! Core types for the AWS log parser library
//!
//! This module defines the values and records the parser emits. A record is a
//! flat, schema-ordered list of named values; the parser never aggregates or
//! interprets records beyond coercing each field into its typed form.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::LogParserError;

/// Timestamp type used throughout the parser
pub type Timestamp = DateTime<Utc>;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, LogParserError>;

/// The AWS access-log variants the parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogType {
    /// CloudFront web distribution standard log (tab-delimited)
    CloudFront,
    /// Classic Elastic Load Balancer
    ClassicLoadBalancer,
    /// Application Load Balancer
    ApplicationLoadBalancer,
    /// Network Load Balancer (TLS listener logs)
    NetworkLoadBalancer,
}

impl LogType {
    /// Every supported log type, in registry order
    pub const ALL: [LogType; 4] = [
        LogType::CloudFront,
        LogType::ClassicLoadBalancer,
        LogType::ApplicationLoadBalancer,
        LogType::NetworkLoadBalancer,
    ];

    /// Canonical kebab-case name
    pub fn name(&self) -> &'static str {
        match self {
            LogType::CloudFront => "cloud-front",
            LogType::ClassicLoadBalancer => "classic-load-balancer",
            LogType::ApplicationLoadBalancer => "application-load-balancer",
            LogType::NetworkLoadBalancer => "network-load-balancer",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogType::CloudFront => write!(f, "CloudFront"),
            LogType::ClassicLoadBalancer => write!(f, "ClassicLoadBalancer"),
            LogType::ApplicationLoadBalancer => write!(f, "ApplicationLoadBalancer"),
            LogType::NetworkLoadBalancer => write!(f, "NetworkLoadBalancer"),
        }
    }
}

impl FromStr for LogType {
    type Err = LogParserError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "cloudfront" | "cf" => Ok(LogType::CloudFront),
            "classicloadbalancer" | "classic" | "clb" | "elb" => Ok(LogType::ClassicLoadBalancer),
            "applicationloadbalancer" | "application" | "alb" | "loadbalancer" => {
                Ok(LogType::ApplicationLoadBalancer)
            }
            "networkloadbalancer" | "network" | "nlb" => Ok(LogType::NetworkLoadBalancer),
            _ => Err(LogParserError::Config(format!("Unknown log type: {}", s))),
        }
    }
}

/// An IP address and port pair, as logged for ELB clients and targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPort {
    pub ip: IpAddr,
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(ip) => write!(f, "{}:{}", ip, self.port),
            IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, self.port),
        }
    }
}

/// The request line of an ELB log entry ("GET http://host:80/ HTTP/1.1")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub protocol: String,
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.url, self.protocol)
    }
}

/// A coerced field value
///
/// `Absent` is the typed form of AWS's `-` placeholder. It is never produced
/// by a failed coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The field held the `-` placeholder (or was cut off by an older format)
    Absent,
    Str(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(Timestamp),
    Ip(IpAddr),
    Host(HostPort),
    Request(HttpRequest),
    List(Vec<String>),
    /// Decoded query-string pairs, in their original order
    Query(Vec<(String, String)>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// The IP address of an `Ip` or `Host` value
    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Value::Ip(ip) => Some(*ip),
            Value::Host(host) => Some(host.ip),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&HostPort> {
        match self {
            Value::Host(host) => Some(host),
            _ => None,
        }
    }

    pub fn as_request(&self) -> Option<&HttpRequest> {
        match self {
            Value::Request(req) => Some(req),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_query(&self) -> Option<&[(String, String)]> {
        match self {
            Value::Query(pairs) => Some(pairs),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "-"),
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Ip(ip) => write!(f, "{}", ip),
            Value::Host(host) => write!(f, "{}", host),
            Value::Request(req) => write!(f, "{}", req),
            Value::List(items) => write!(f, "{}", items.join(" ")),
            Value::Query(pairs) => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, "&")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                Ok(())
            }
        }
    }
}

/// A named value inside a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name from the schema
    pub name: &'static str,
    /// Coerced value
    pub value: Value,
}

/// A fully parsed log line
///
/// Holds exactly one field per schema descriptor, in schema order. Records are
/// only ever constructed whole by the record builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    log_type: LogType,
    fields: Vec<Field>,
}

impl Record {
    pub(crate) fn new(log_type: LogType, fields: Vec<Field>) -> Self {
        Self { log_type, fields }
    }

    /// The log type whose schema produced this record
    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    /// All fields in schema order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Number of fields (always the schema's descriptor count)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|f| (f.name, &f.value))
    }

    /// Client IP address regardless of log type
    ///
    /// CloudFront logs the bare address in `client_ip`; the load balancers log
    /// `ip:port` in `client`.
    pub fn client_ip(&self) -> Option<IpAddr> {
        self.get("client_ip")
            .or_else(|| self.get("client"))
            .and_then(Value::as_ip)
    }

    /// Re-serialise this record in its log type's line format
    pub fn to_line(&self) -> String {
        crate::encode::encode(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_log_type_aliases() {
        assert_eq!("CloudFront".parse::<LogType>().unwrap(), LogType::CloudFront);
        assert_eq!("cf".parse::<LogType>().unwrap(), LogType::CloudFront);
        assert_eq!("ELB".parse::<LogType>().unwrap(), LogType::ClassicLoadBalancer);
        assert_eq!("LoadBalancer".parse::<LogType>().unwrap(), LogType::ApplicationLoadBalancer);
        assert_eq!("application_load_balancer".parse::<LogType>().unwrap(), LogType::ApplicationLoadBalancer);
        assert_eq!("nlb".parse::<LogType>().unwrap(), LogType::NetworkLoadBalancer);
        assert!("waf".parse::<LogType>().is_err());
    }

    #[test]
    fn test_log_type_name_round_trips() {
        for log_type in LogType::ALL {
            assert_eq!(log_type.name().parse::<LogType>().unwrap(), log_type);
            assert_eq!(log_type.to_string().parse::<LogType>().unwrap(), log_type);
        }
    }

    #[test]
    fn test_host_port_display() {
        let v4 = HostPort { ip: IpAddr::V4(Ipv4Addr::new(192, 168, 131, 39)), port: 2817 };
        assert_eq!(v4.to_string(), "192.168.131.39:2817");

        let v6 = HostPort { ip: "2001:db8::1".parse().unwrap(), port: 443 };
        assert_eq!(v6.to_string(), "[2001:db8::1]:443");
    }

    #[test]
    fn test_value_accessors() {
        assert!(Value::Absent.is_absent());
        assert_eq!(Value::Int(42).as_f64(), Some(42.0));
        assert_eq!(Value::Float(0.5).as_i64(), None);
        assert_eq!(Value::Str("GET".into()).as_str(), Some("GET"));

        let host = Value::Host(HostPort { ip: "10.0.0.1".parse().unwrap(), port: 80 });
        assert_eq!(host.as_ip(), Some("10.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Absent.to_string(), "-");
        assert_eq!(Value::List(vec!["a".into(), "b".into()]).to_string(), "a b");
        assert_eq!(
            Value::Query(vec![("a".into(), "1".into()), ("b".into(), "".into())]).to_string(),
            "a=1&b="
        );
    }

    #[test]
    fn test_record_lookup_and_serialization() {
        let record = Record::new(
            LogType::CloudFront,
            vec![
                Field { name: "client_ip", value: Value::Ip("192.0.2.1".parse().unwrap()) },
                Field { name: "referer", value: Value::Absent },
                Field { name: "bytes", value: Value::Int(392) },
            ],
        );

        assert_eq!(record.len(), 3);
        assert_eq!(record.client_ip(), Some("192.0.2.1".parse().unwrap()));
        assert!(record.get("referer").unwrap().is_absent());
        assert!(record.get("missing").is_none());

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"client_ip":"192.0.2.1","referer":null,"bytes":392}"#);
    }
}
