//! Record builder
//!
//! Applies a schema to a token sequence. Tokens are coerced strictly in schema
//! order and the first failure is returned; a record is only produced when
//! every field converted.

use crate::coerce::CoerceOptions;
use crate::error::{CoercionError, ParseErrorKind};
use crate::schema::{FieldDescriptor, Schema};
use crate::types::{Field, Record, Value};

/// Builds typed records from raw tokens
pub struct RecordBuilder;

impl RecordBuilder {
    /// Build a record from the tokens of one line
    ///
    /// # Returns
    /// * `Ok(Record)` with exactly `schema.len()` fields
    /// * `Err(FieldCountMismatch)` if the line is too short, or too long for a
    ///   schema without a catch-all field
    /// * `Err(Coercion)` for the first field that failed to convert
    pub fn build(
        tokens: &[String],
        schema: &Schema,
        options: &CoerceOptions,
    ) -> Result<Record, ParseErrorKind> {
        let positional = schema.positional();
        let found = tokens.len();

        if found < schema.required || (found > positional.len() && !schema.catch_all) {
            return Err(ParseErrorKind::FieldCountMismatch {
                expected: schema.expected_count(),
                found,
            });
        }

        let mut fields = Vec::with_capacity(schema.len());

        for (index, descriptor) in positional.iter().enumerate() {
            // Columns from newer format revisions are simply absent on older lines
            let value = match tokens.get(index) {
                Some(raw) => Self::coerce_field(index, descriptor, raw, options)?,
                None => Value::Absent,
            };
            fields.push(Field {
                name: descriptor.name,
                value,
            });
        }

        if schema.catch_all {
            let extra = &schema.fields[positional.len()];
            let value = match tokens.get(positional.len()..) {
                Some(surplus) if !surplus.is_empty() => {
                    log::warn!(
                        "{} line has {} unrecognised trailing field(s), kept in `{}`",
                        schema.log_type,
                        surplus.len(),
                        extra.name
                    );
                    Value::List(surplus.to_vec())
                }
                _ => Value::Absent,
            };
            fields.push(Field {
                name: extra.name,
                value,
            });
        }

        Ok(Record::new(schema.log_type, fields))
    }

    /// Coerce one token, enforcing the descriptor's nullability
    fn coerce_field(
        index: usize,
        descriptor: &FieldDescriptor,
        raw: &str,
        options: &CoerceOptions,
    ) -> Result<Value, ParseErrorKind> {
        let to_error = |source| ParseErrorKind::Coercion {
            index,
            field: descriptor.name,
            source,
        };

        let value = descriptor.coercer.coerce(raw, options).map_err(to_error)?;
        if value.is_absent() && !descriptor.nullable {
            return Err(to_error(CoercionError::Missing));
        }
        Ok(value)
    }
}
