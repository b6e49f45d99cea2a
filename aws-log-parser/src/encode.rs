//! Record encoder
//!
//! Writes a record back out in its log type's line format. The output is not
//! byte-identical to the source line (whitespace runs collapse, optional
//! trailing columns are written as `-`), but parsing it yields an equal record.

use crate::coerce::{Coercer, MISSING};
use crate::schema::{registry, FieldDescriptor};
use crate::tokenizer::Delimiter;
use crate::types::{Record, Value};
use chrono::SecondsFormat;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in CloudFront URL-encoded fields
const URL_FIELD: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'%').add(b'\\');

/// Query-string components additionally escape the pair separators
const QUERY_COMPONENT: &AsciiSet = &URL_FIELD.add(b'&').add(b'=');

/// Encode a record as one log line (without a trailing newline)
pub fn encode(record: &Record) -> String {
    let schema = registry(record.log_type());
    let separator = match schema.delimiter {
        Delimiter::Tab => "\t",
        Delimiter::Whitespace => " ",
    };

    let mut parts = Vec::with_capacity(record.len());
    for (descriptor, field) in schema.fields.iter().zip(record.fields()) {
        if descriptor.coercer == Coercer::Extra {
            if let Value::List(tokens) = &field.value {
                parts.extend(tokens.iter().map(|token| encode_bare_token(token, schema.delimiter)));
            }
            continue;
        }

        let raw = encode_value(&field.value, descriptor);
        if descriptor.quoted && schema.delimiter == Delimiter::Whitespace {
            parts.push(quote(&raw));
        } else {
            // An empty or spaced value in an unquoted column still has to stay one token
            parts.push(encode_bare_token(&raw, schema.delimiter));
        }
    }

    parts.join(separator)
}

/// Render one value the way its coercer expects to read it back
fn encode_value(value: &Value, descriptor: &FieldDescriptor) -> String {
    match (value, descriptor.coercer) {
        (Value::Absent, _) => MISSING.to_string(),
        (Value::Str(s), Coercer::UrlEncoded) => {
            guard_placeholder(utf8_percent_encode(s, URL_FIELD).to_string())
        }
        (Value::Int(code), Coercer::StatusCode) => format!("{:03}", code),
        (Value::Timestamp(ts), Coercer::EpochSeconds) => {
            format!("{}.{:09}", ts.timestamp(), ts.timestamp_subsec_nanos())
        }
        (Value::Timestamp(ts), _) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        (Value::List(items), Coercer::List(separator) | Coercer::OneOfList(separator, _)) => {
            items.join(separator.to_string().as_str())
        }
        (Value::Query(pairs), _) => {
            let encoded = pairs
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, QUERY_COMPONENT),
                        utf8_percent_encode(value, QUERY_COMPONENT)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            guard_placeholder(encoded)
        }
        (other, _) => other.to_string(),
    }
}

/// A decoded value of `-` must not be written back as the placeholder
fn guard_placeholder(encoded: String) -> String {
    if encoded == MISSING {
        "%2D".to_string()
    } else {
        encoded
    }
}

fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn encode_bare_token(token: &str, delimiter: Delimiter) -> String {
    let needs_quotes = token.is_empty()
        || token.chars().any(|c| c.is_ascii_whitespace() || c == '"' || c == '\\');
    if delimiter == Delimiter::Whitespace && needs_quotes {
        quote(token)
    } else {
        token.to_string()
    }
}
