//! Elastic Load Balancing access log schemas
//!
//! All three generations are space-delimited with free-text fields wrapped in
//! double quotes. Application and Network load balancer logs gain columns over
//! time, so both end with a catch-all `extra` field.
//!
//! See <https://docs.aws.amazon.com/elasticloadbalancing/latest/classic/access-log-collection.html>,
//! <https://docs.aws.amazon.com/elasticloadbalancing/latest/application/load-balancer-access-logs.html>
//! and <https://docs.aws.amazon.com/elasticloadbalancing/latest/network/load-balancer-access-logs.html>.

use super::{FieldDescriptor as Field, Schema, EXTRA_FIELD};
use crate::coerce::Coercer;
use crate::tokenizer::Delimiter;
use crate::types::LogType;

pub const ALB_REQUEST_TYPES: &[&str] = &["http", "https", "h2", "grpcs", "ws", "wss"];

/// Values of the ALB `actions_executed` field
pub const ALB_ACTIONS: &[&str] = &[
    "authenticate",
    "fixed-response",
    "forward",
    "lambda",
    "redirect",
    "waf",
    "waf-failed",
];

/// HTTP desync mitigation classifications
pub const CLASSIFICATIONS: &[&str] = &["Acceptable", "Ambiguous", "Severe"];

pub const NLB_LISTENER_TYPES: &[&str] = &["tls"];

const CLASSIC_FIELDS: &[Field] = &[
    Field::required("timestamp", Coercer::Timestamp),
    Field::required("elb", Coercer::Str),
    Field::required("client", Coercer::HostPort),
    Field::nullable("backend", Coercer::HostPort),
    // -1 when the load balancer could not dispatch the request
    Field::required("request_processing_time", Coercer::Float),
    Field::required("backend_processing_time", Coercer::Float),
    Field::required("response_processing_time", Coercer::Float),
    Field::nullable("elb_status_code", Coercer::StatusCode),
    Field::nullable("backend_status_code", Coercer::StatusCode),
    Field::required("received_bytes", Coercer::Int),
    Field::required("sent_bytes", Coercer::Int),
    Field::nullable("request", Coercer::Request).quoted(),
    Field::nullable("user_agent", Coercer::Str).quoted(),
    Field::nullable("ssl_cipher", Coercer::Str),
    Field::nullable("ssl_protocol", Coercer::Str),
];

pub static CLASSIC: Schema = Schema {
    log_type: LogType::ClassicLoadBalancer,
    delimiter: Delimiter::Whitespace,
    fields: CLASSIC_FIELDS,
    required: 15,
    catch_all: false,
};

const APPLICATION_FIELDS: &[Field] = &[
    Field::required("type", Coercer::OneOf(ALB_REQUEST_TYPES)),
    Field::required("timestamp", Coercer::Timestamp),
    Field::required("elb", Coercer::Str),
    Field::required("client", Coercer::HostPort),
    Field::nullable("target", Coercer::HostPort),
    Field::required("request_processing_time", Coercer::Float),
    Field::required("target_processing_time", Coercer::Float),
    Field::required("response_processing_time", Coercer::Float),
    Field::nullable("elb_status_code", Coercer::StatusCode),
    Field::nullable("target_status_code", Coercer::StatusCode),
    Field::required("received_bytes", Coercer::Int),
    Field::required("sent_bytes", Coercer::Int),
    Field::nullable("request", Coercer::Request).quoted(),
    Field::nullable("user_agent", Coercer::Str).quoted(),
    Field::nullable("ssl_cipher", Coercer::Str),
    Field::nullable("ssl_protocol", Coercer::Str),
    Field::nullable("target_group_arn", Coercer::Str),
    Field::nullable("trace_id", Coercer::Str).quoted(),
    Field::nullable("domain_name", Coercer::Str).quoted(),
    Field::nullable("chosen_cert_arn", Coercer::Str).quoted(),
    Field::nullable("matched_rule_priority", Coercer::Int),
    Field::nullable("request_creation_time", Coercer::Timestamp),
    Field::nullable("actions_executed", Coercer::OneOfList(',', ALB_ACTIONS)).quoted(),
    Field::nullable("redirect_url", Coercer::Str).quoted(),
    Field::nullable("error_reason", Coercer::Str).quoted(),
    Field::nullable("target_port_list", Coercer::List(' ')).quoted(),
    Field::nullable("target_status_code_list", Coercer::List(' ')).quoted(),
    Field::nullable("classification", Coercer::OneOf(CLASSIFICATIONS)).quoted(),
    Field::nullable("classification_reason", Coercer::Str).quoted(),
    // Added in 2024
    Field::nullable("conn_trace_id", Coercer::Str),
    Field::nullable(EXTRA_FIELD, Coercer::Extra),
];

pub static APPLICATION: Schema = Schema {
    log_type: LogType::ApplicationLoadBalancer,
    delimiter: Delimiter::Whitespace,
    fields: APPLICATION_FIELDS,
    required: 29,
    catch_all: true,
};

const NETWORK_FIELDS: &[Field] = &[
    Field::required("type", Coercer::OneOf(NLB_LISTENER_TYPES)),
    Field::required("version", Coercer::Str),
    Field::required("timestamp", Coercer::Timestamp),
    Field::required("elb", Coercer::Str),
    Field::required("listener", Coercer::Str),
    Field::required("client", Coercer::HostPort),
    Field::required("destination", Coercer::HostPort),
    // milliseconds
    Field::required("connection_time", Coercer::Int),
    Field::nullable("tls_handshake_time", Coercer::Int),
    Field::required("received_bytes", Coercer::Int),
    Field::required("sent_bytes", Coercer::Int),
    Field::nullable("incoming_tls_alert", Coercer::Str),
    Field::nullable("chosen_cert_arn", Coercer::Str),
    Field::nullable("chosen_cert_serial", Coercer::Str),
    Field::nullable("tls_cipher", Coercer::Str),
    Field::nullable("tls_protocol_version", Coercer::Str),
    Field::nullable("tls_named_group", Coercer::Str),
    Field::nullable("domain_name", Coercer::Str),
    Field::nullable("alpn_fe_protocol", Coercer::Str),
    Field::nullable("alpn_be_protocol", Coercer::Str),
    Field::nullable("alpn_client_preference_list", Coercer::List(',')).quoted(),
    Field::nullable("tls_connection_creation_time", Coercer::Timestamp),
    Field::nullable(EXTRA_FIELD, Coercer::Extra),
];

pub static NETWORK: Schema = Schema {
    log_type: LogType::NetworkLoadBalancer,
    delimiter: Delimiter::Whitespace,
    fields: NETWORK_FIELDS,
    required: 22,
    catch_all: true,
};
