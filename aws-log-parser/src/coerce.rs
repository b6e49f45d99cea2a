//! Field coercers
//!
//! Each coercer turns one raw field into a typed [`Value`]. The `-`
//! placeholder is recognised here, before any type-specific parsing, so an
//! absent value can never be mistaken for a malformed one.

use crate::error::CoercionError;
use crate::types::{HostPort, HttpRequest, Timestamp, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use percent_encoding::percent_decode_str;
use std::net::{IpAddr, SocketAddr};

/// The literal AWS uses for a missing value
pub const MISSING: &str = "-";

/// Status codes AWS logs, as shown in error messages
pub const STATUS_CODES: &[&str] = &["000", "100..=599"];

/// Options that change how strictly values are checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoerceOptions {
    /// Accept unknown enumerated codes and status codes instead of failing
    pub enum_passthrough: bool,
}

/// Conversion from a raw field string to a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercer {
    /// Plain text, kept as-is
    Str,
    /// Percent-encoded text (CloudFront user agent, cookie, ...)
    UrlEncoded,
    /// Signed integer
    Int,
    /// Decimal number
    Float,
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM:SS` with optional fraction
    Time,
    /// ISO-8601 timestamp; a missing offset is taken as UTC
    Timestamp,
    /// Seconds since the Unix epoch with optional fraction
    EpochSeconds,
    /// IPv4 or IPv6 address
    Ip,
    /// `ip:port`
    HostPort,
    /// Three-digit HTTP status code
    StatusCode,
    /// Member of a fixed set of codes
    OneOf(&'static [&'static str]),
    /// `METHOD URL PROTOCOL` request line
    Request,
    /// Sub-tokens of one field, split on the given separator
    List(char),
    /// Like `List`, but every sub-token must be a member of the set
    OneOfList(char, &'static [&'static str]),
    /// `k=v&k2=v2` query string
    Query,
    /// Surplus trailing tokens, filled in by the record builder
    Extra,
}

impl Coercer {
    /// Human-readable name of the target type
    pub fn type_name(&self) -> &'static str {
        match self {
            Coercer::Str => "string",
            Coercer::UrlEncoded => "URL-encoded string",
            Coercer::Int => "integer",
            Coercer::Float => "float",
            Coercer::Date => "date",
            Coercer::Time => "time",
            Coercer::Timestamp => "timestamp",
            Coercer::EpochSeconds => "epoch timestamp",
            Coercer::Ip => "IP address",
            Coercer::HostPort => "host:port",
            Coercer::StatusCode => "HTTP status code",
            Coercer::OneOf(_) => "enumerated value",
            Coercer::Request => "HTTP request line",
            Coercer::List(_) => "list",
            Coercer::OneOfList(..) => "list of enumerated values",
            Coercer::Query => "query string",
            Coercer::Extra => "extra fields",
        }
    }

    /// Convert one raw field
    pub fn coerce(&self, raw: &str, options: &CoerceOptions) -> Result<Value, CoercionError> {
        if raw == MISSING {
            return Ok(Value::Absent);
        }

        match self {
            Coercer::Str => Ok(Value::Str(raw.to_string())),
            Coercer::UrlEncoded => Ok(Value::Str(url_decode(raw))),
            Coercer::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| CoercionError::invalid(raw, self.type_name())),
            Coercer::Float => parse_float(raw)
                .map(Value::Float)
                .ok_or_else(|| CoercionError::invalid(raw, self.type_name())),
            Coercer::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| CoercionError::invalid(raw, self.type_name())),
            Coercer::Time => NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|_| CoercionError::invalid(raw, self.type_name())),
            Coercer::Timestamp => parse_timestamp(raw)
                .map(Value::Timestamp)
                .ok_or_else(|| CoercionError::invalid(raw, self.type_name())),
            Coercer::EpochSeconds => parse_epoch(raw)
                .map(Value::Timestamp)
                .ok_or_else(|| CoercionError::invalid(raw, self.type_name())),
            Coercer::Ip => raw
                .parse::<IpAddr>()
                .map(Value::Ip)
                .map_err(|_| CoercionError::invalid(raw, self.type_name())),
            Coercer::HostPort => parse_host_port(raw)
                .map(Value::Host)
                .ok_or_else(|| CoercionError::invalid(raw, self.type_name())),
            Coercer::StatusCode => {
                let code = parse_status(raw)
                    .ok_or_else(|| CoercionError::invalid(raw, self.type_name()))?;
                if is_known_status(code) || options.enum_passthrough {
                    Ok(Value::Int(code))
                } else {
                    Err(CoercionError::UnknownEnumValue {
                        raw: raw.to_string(),
                        allowed: STATUS_CODES,
                    })
                }
            }
            Coercer::OneOf(allowed) => {
                if is_member(allowed, raw) || options.enum_passthrough {
                    Ok(Value::Str(raw.to_string()))
                } else {
                    Err(CoercionError::UnknownEnumValue {
                        raw: raw.to_string(),
                        allowed: *allowed,
                    })
                }
            }
            Coercer::Request => parse_request(raw)
                .map(|req| req.map_or(Value::Absent, Value::Request))
                .ok_or_else(|| CoercionError::invalid(raw, self.type_name())),
            Coercer::List(separator) => Ok(Value::List(split_list(raw, *separator))),
            Coercer::OneOfList(separator, allowed) => {
                let items = split_list(raw, *separator);
                if !options.enum_passthrough {
                    if let Some(unknown) = items.iter().find(|item| !is_member(allowed, item)) {
                        return Err(CoercionError::UnknownEnumValue {
                            raw: unknown.clone(),
                            allowed: *allowed,
                        });
                    }
                }
                Ok(Value::List(items))
            }
            Coercer::Query => Ok(Value::Query(parse_query(raw))),
            Coercer::Extra => Ok(Value::List(
                raw.split_whitespace().map(str::to_string).collect(),
            )),
        }
    }
}

fn is_member(allowed: &[&str], value: &str) -> bool {
    allowed.iter().any(|code| *code == value)
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn url_decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn parse_float(raw: &str) -> Option<f64> {
    let value = raw.parse::<f64>().ok()?;
    // "inf" and "NaN" parse as floats but never appear in AWS logs
    value.is_finite().then_some(value)
}

fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // NLB logs omit the zone designator
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse_epoch(raw: &str) -> Option<Timestamp> {
    let (secs, fraction) = match raw.split_once('.') {
        Some((secs, fraction)) => (secs, fraction),
        None => (raw, ""),
    };
    if secs.is_empty() || fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs = secs.parse::<i64>().ok()?;
    let nanos = if fraction.is_empty() {
        0
    } else {
        // Right-pad to nanosecond precision: ".5" is 500ms
        format!("{:0<9}", fraction).parse::<u32>().ok()?
    };
    DateTime::from_timestamp(secs, nanos)
}

fn parse_host_port(raw: &str) -> Option<HostPort> {
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return Some(HostPort {
            ip: addr.ip(),
            port: addr.port(),
        });
    }
    // Unbracketed IPv6: the port follows the last colon
    let (ip, port) = raw.rsplit_once(':')?;
    Some(HostPort {
        ip: ip.parse().ok()?,
        port: port.parse().ok()?,
    })
}

/// Any three digits; whether the code is one AWS emits is checked separately
fn parse_status(raw: &str) -> Option<i64> {
    if raw.len() != 3 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok()
}

fn is_known_status(code: i64) -> bool {
    // CloudFront logs 000 when the viewer hung up before a response was sent
    code == 0 || (100..=599).contains(&code)
}

/// `Some(None)` is the TCP-listener placeholder `- - - `
fn parse_request(raw: &str) -> Option<Option<HttpRequest>> {
    let mut parts = raw.split(' ');
    let method = parts.next()?;
    let url = parts.next()?;
    let protocol = parts.next()?;
    let rest = parts.next();

    if method == MISSING && url == MISSING && protocol == MISSING {
        return Some(None);
    }
    if method.is_empty() || url.is_empty() || protocol.is_empty() || rest.is_some() {
        return None;
    }

    Some(Some(HttpRequest {
        method: method.to_string(),
        url: url.to_string(),
        protocol: protocol.to_string(),
    }))
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (url_decode(key), url_decode(value)),
            None => (url_decode(pair), String::new()),
        })
        .collect()
}
