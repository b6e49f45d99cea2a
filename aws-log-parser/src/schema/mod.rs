//! Schema registry
//!
//! One static schema per log type. A schema lists the positional fields of a
//! line, how each is coerced, and whether it may be absent. Nothing outside
//! this module branches on the concrete log type.

use crate::coerce::Coercer;
use crate::tokenizer::Delimiter;
use crate::types::LogType;

pub mod cloudfront;
pub mod elb;

/// Name of the catch-all field that absorbs surplus trailing tokens
pub const EXTRA_FIELD: &str = "extra";

/// One positional column of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name in the produced record
    pub name: &'static str,
    /// How the raw string is converted
    pub coercer: Coercer,
    /// Whether `-` is an acceptable value
    pub nullable: bool,
    /// Whether the field is written inside double quotes
    pub quoted: bool,
}

impl FieldDescriptor {
    /// A field that must carry a value
    pub const fn required(name: &'static str, coercer: Coercer) -> Self {
        Self {
            name,
            coercer,
            nullable: false,
            quoted: false,
        }
    }

    /// A field that may hold `-`
    pub const fn nullable(name: &'static str, coercer: Coercer) -> Self {
        Self {
            name,
            coercer,
            nullable: true,
            quoted: false,
        }
    }

    /// Mark the field as double-quoted in the raw line
    pub const fn quoted(self) -> Self {
        Self {
            quoted: true,
            ..self
        }
    }
}

/// Column layout of one log type
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub log_type: LogType,
    pub delimiter: Delimiter,
    /// All descriptors, including the catch-all when present
    pub fields: &'static [FieldDescriptor],
    /// Number of leading fields every line must carry
    pub required: usize,
    /// Whether the last descriptor collects surplus trailing tokens
    pub catch_all: bool,
}

impl Schema {
    /// Number of descriptors (and therefore of record fields)
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Descriptors matched one-to-one against tokens
    pub fn positional(&self) -> &'static [FieldDescriptor] {
        let fields = self.fields;
        if self.catch_all {
            &fields[..fields.len() - 1]
        } else {
            fields
        }
    }

    /// Position of a field by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Accepted token count, for error messages
    pub fn expected_count(&self) -> String {
        let positional = self.positional().len();
        match (self.required == positional, self.catch_all) {
            (true, false) => positional.to_string(),
            (false, false) => format!("{}..={}", self.required, positional),
            (_, true) => format!("at least {}", self.required),
        }
    }
}

/// Look up the schema for a log type
pub fn registry(log_type: LogType) -> &'static Schema {
    match log_type {
        LogType::CloudFront => &cloudfront::CLOUDFRONT,
        LogType::ClassicLoadBalancer => &elb::CLASSIC,
        LogType::ApplicationLoadBalancer => &elb::APPLICATION,
        LogType::NetworkLoadBalancer => &elb::NETWORK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_matches_log_type() {
        for log_type in LogType::ALL {
            assert_eq!(registry(log_type).log_type, log_type);
        }
    }

    #[test]
    fn test_schema_shapes() {
        let cases = [
            (LogType::CloudFront, 33, 11, false),
            (LogType::ClassicLoadBalancer, 15, 15, false),
            (LogType::ApplicationLoadBalancer, 31, 29, true),
            (LogType::NetworkLoadBalancer, 23, 22, true),
        ];
        for (log_type, len, required, catch_all) in cases {
            let schema = registry(log_type);
            assert_eq!(schema.len(), len, "{}", log_type);
            assert_eq!(schema.required, required, "{}", log_type);
            assert_eq!(schema.catch_all, catch_all, "{}", log_type);
        }
    }

    #[test]
    fn test_field_names_unique() {
        for log_type in LogType::ALL {
            let schema = registry(log_type);
            let names: HashSet<_> = schema.fields.iter().map(|f| f.name).collect();
            assert_eq!(names.len(), schema.len(), "{}", log_type);
        }
    }

    #[test]
    fn test_optional_trailing_fields_are_nullable() {
        for log_type in LogType::ALL {
            let schema = registry(log_type);
            for field in &schema.fields[schema.required..] {
                assert!(field.nullable, "{}.{}", log_type, field.name);
            }
        }
    }

    #[test]
    fn test_catch_all_is_last() {
        for log_type in LogType::ALL {
            let schema = registry(log_type);
            let extra = schema.index_of(EXTRA_FIELD);
            if schema.catch_all {
                assert_eq!(extra, Some(schema.len() - 1));
                assert_eq!(schema.fields[schema.len() - 1].coercer, Coercer::Extra);
            } else {
                assert_eq!(extra, None);
            }
        }
    }

    #[test]
    fn test_quoting_only_in_whitespace_schemas() {
        let cloudfront = registry(LogType::CloudFront);
        assert_eq!(cloudfront.delimiter, Delimiter::Tab);
        assert!(cloudfront.fields.iter().all(|f| !f.quoted));

        let alb = registry(LogType::ApplicationLoadBalancer);
        assert_eq!(alb.delimiter, Delimiter::Whitespace);
        assert!(alb.fields[alb.index_of("request").unwrap()].quoted);
    }

    #[test]
    fn test_expected_count() {
        assert_eq!(registry(LogType::ClassicLoadBalancer).expected_count(), "15");
        assert_eq!(registry(LogType::CloudFront).expected_count(), "11..=33");
        assert_eq!(registry(LogType::ApplicationLoadBalancer).expected_count(), "at least 29");
    }
}
