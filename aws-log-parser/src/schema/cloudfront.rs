//! CloudFront web distribution standard log schema
//!
//! Tab-delimited, 33 columns in the current format. The first 11 columns
//! (through `cs(User-Agent)`) appear in every revision; later columns were
//! appended over time and are absent from older lines.
//!
//! See <https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/standard-logs-reference.html>

use super::{FieldDescriptor as Field, Schema};
use crate::coerce::Coercer;
use crate::tokenizer::Delimiter;
use crate::types::LogType;

pub const METHODS: &[&str] = &["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

pub const EDGE_RESULT_TYPES: &[&str] = &[
    "Hit",
    "RefreshHit",
    "Miss",
    "LimitExceeded",
    "CapacityExceeded",
    "Error",
    "Redirect",
];

pub const PROTOCOLS: &[&str] = &["http", "https", "ws", "wss"];

const FIELDS: &[Field] = &[
    Field::required("date", Coercer::Date),
    Field::required("time", Coercer::Time),
    Field::required("edge_location", Coercer::Str),
    Field::required("bytes", Coercer::Int),
    Field::required("client_ip", Coercer::Ip),
    Field::required("method", Coercer::OneOf(METHODS)),
    Field::required("host", Coercer::Str),
    Field::required("uri_stem", Coercer::Str),
    Field::required("status", Coercer::StatusCode),
    Field::nullable("referer", Coercer::UrlEncoded),
    Field::nullable("user_agent", Coercer::UrlEncoded),
    // Appended by later format revisions
    Field::nullable("uri_query", Coercer::Query),
    Field::nullable("cookie", Coercer::UrlEncoded),
    Field::nullable("edge_result_type", Coercer::OneOf(EDGE_RESULT_TYPES)),
    Field::nullable("edge_request_id", Coercer::Str),
    Field::nullable("host_header", Coercer::Str),
    Field::nullable("protocol", Coercer::OneOf(PROTOCOLS)),
    Field::nullable("cs_bytes", Coercer::Int),
    Field::nullable("time_taken", Coercer::Float),
    Field::nullable("forwarded_for", Coercer::Str),
    Field::nullable("ssl_protocol", Coercer::Str),
    Field::nullable("ssl_cipher", Coercer::Str),
    Field::nullable("edge_response_result_type", Coercer::OneOf(EDGE_RESULT_TYPES)),
    Field::nullable("protocol_version", Coercer::Str),
    Field::nullable("fle_status", Coercer::Str),
    Field::nullable("fle_encrypted_fields", Coercer::Int),
    Field::nullable("client_port", Coercer::Int),
    Field::nullable("time_to_first_byte", Coercer::Float),
    // Open-ended: AWS keeps adding detailed result types
    Field::nullable("edge_detailed_result_type", Coercer::Str),
    Field::nullable("content_type", Coercer::UrlEncoded),
    Field::nullable("content_length", Coercer::Int),
    Field::nullable("range_start", Coercer::Int),
    Field::nullable("range_end", Coercer::Int),
];

pub static CLOUDFRONT: Schema = Schema {
    log_type: LogType::CloudFront,
    delimiter: Delimiter::Tab,
    fields: FIELDS,
    required: 11,
    catch_all: false,
};
