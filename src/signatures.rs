//! Accessor signatures for every field of a message or schema.
//!
//! An RBI template needs three type expressions per field: the getter return
//! type, the setter parameter type, and the `initialize` keyword argument
//! type. [`resolve_schema`] computes them for a whole schema in one pass and
//! keeps going past fields it cannot type, so the host generator can report
//! every problem at once instead of stopping at the first one.

use crate::error::{Error, Result};
use crate::namespace::qualified_name;
use crate::schema::{Field, MessageId, Schema};
use crate::type_map::{Accessor, field_type};

/// The three accessor types of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSignature {
    pub field: String,
    pub getter: String,
    pub setter: String,
    pub initializer: String,
}

/// The accessor types of every field of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSignatures {
    pub message: MessageId,
    /// Ruby constant of the message (e.g., `"Acme::Billing::Invoice"`).
    pub qualified_name: String,
    pub fields: Vec<FieldSignature>,
}

/// Counters collected by [`resolve_schema`] for reporting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    pub messages_resolved: usize,
    pub fields_resolved: usize,
    pub fields_failed: usize,
}

/// Result of resolving a whole schema.
#[derive(Debug, Default)]
pub struct SchemaSignatures {
    /// One entry per message, in declaration order. Fields that failed to
    /// resolve are left out.
    pub messages: Vec<MessageSignatures>,
    /// One error per field that failed to resolve.
    pub errors: Vec<Error>,
    pub stats: ResolutionStats,
}

impl SchemaSignatures {
    /// Whether every field resolved.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn the first recorded failure into an error, for callers that want
    /// to abort the run.
    pub fn into_result(self) -> Result<Vec<MessageSignatures>> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.messages),
        }
    }
}

/// Resolve the getter, setter and initializer types of `field`.
pub fn field_signature(schema: &Schema, field: &Field) -> Result<FieldSignature> {
    Ok(FieldSignature {
        field: field.name().to_string(),
        getter: field_type(schema, field, Accessor::Getter)?,
        setter: field_type(schema, field, Accessor::Setter)?,
        initializer: field_type(schema, field, Accessor::Initializer)?,
    })
}

/// Resolve every field of `message`, stopping at the first failure.
pub fn message_signatures(schema: &Schema, message: MessageId) -> Result<MessageSignatures> {
    let msg = schema.message(message);
    let fields = msg
        .fields()
        .iter()
        .map(|field| field_signature(schema, field))
        .collect::<Result<Vec<_>>>()?;
    Ok(MessageSignatures {
        message,
        qualified_name: qualified_name(schema, msg),
        fields,
    })
}

/// Resolve every field of every message in `schema`.
///
/// A field that fails is logged, recorded in [`SchemaSignatures::errors`],
/// and skipped; the rest of its message is still resolved.
pub fn resolve_schema(schema: &Schema) -> SchemaSignatures {
    let mut out = SchemaSignatures::default();

    for (id, msg) in schema.messages() {
        let qualified = qualified_name(schema, msg);
        let mut fields = Vec::with_capacity(msg.fields().len());

        for field in msg.fields() {
            match field_signature(schema, field) {
                Ok(sig) => {
                    log::trace!(
                        "{qualified}#{}: {} / {} / {}",
                        sig.field,
                        sig.getter,
                        sig.setter,
                        sig.initializer
                    );
                    out.stats.fields_resolved += 1;
                    fields.push(sig);
                }
                Err(err) => {
                    log::warn!("skipping {qualified}#{}: {err}", field.name());
                    out.stats.fields_failed += 1;
                    out.errors.push(err);
                }
            }
        }

        out.messages.push(MessageSignatures {
            message: id,
            qualified_name: qualified,
            fields,
        });
        out.stats.messages_resolved += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ElementType, FieldType, ScalarType, Scope, SchemaFile};

    fn shop_schema() -> (Schema, MessageId) {
        let mut schema = Schema::new();
        let file = schema.add_file(SchemaFile {
            name: "shop.proto".to_string(),
            package: "shop".to_string(),
            ruby_package: None,
        });
        let order = schema.add_message(Scope::File(file), "Order");
        schema.add_field(
            order,
            "id",
            FieldType::Singular(ElementType::Scalar(ScalarType::Uint64)),
        );
        schema.add_field(
            order,
            "skus",
            FieldType::Repeated(ElementType::Scalar(ScalarType::String)),
        );
        (schema, order)
    }

    #[test]
    fn field_signature_covers_all_accessors() {
        let (schema, order) = shop_schema();
        let skus = schema.message(order).field("skus").unwrap();
        assert_eq!(
            field_signature(&schema, skus).unwrap(),
            FieldSignature {
                field: "skus".to_string(),
                getter: "T::Array[:string]".to_string(),
                setter: "Google::Protobuf::RepeatedField".to_string(),
                initializer: "T::Array[:string]".to_string(),
            }
        );
    }

    #[test]
    fn message_signatures_in_field_order() {
        let (schema, order) = shop_schema();
        let sigs = message_signatures(&schema, order).unwrap();
        assert_eq!(sigs.qualified_name, "Shop::Order");
        let names: Vec<&str> = sigs.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, ["id", "skus"]);
        assert_eq!(sigs.fields[0].setter, ":integer");
    }

    #[test]
    fn message_signatures_stops_on_unsupported_field() {
        let (mut schema, order) = shop_schema();
        let legacy = schema.add_message(Scope::Message(order), "Legacy");
        schema.add_field(order, "legacy", FieldType::Singular(ElementType::Group(legacy)));
        assert!(matches!(
            message_signatures(&schema, order),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn resolve_schema_continues_past_failures() {
        let (mut schema, order) = shop_schema();
        let legacy = schema.add_message(Scope::Message(order), "Legacy");
        schema.add_field(order, "legacy", FieldType::Singular(ElementType::Group(legacy)));
        schema.add_field(
            order,
            "total",
            FieldType::Singular(ElementType::Scalar(ScalarType::Double)),
        );

        let out = resolve_schema(&schema);
        assert!(!out.is_complete());
        assert_eq!(
            out.stats,
            ResolutionStats {
                messages_resolved: 2,
                fields_resolved: 3,
                fields_failed: 1,
            }
        );
        let order_sigs = &out.messages[0];
        let names: Vec<&str> = order_sigs.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, ["id", "skus", "total"]);
        assert_eq!(out.messages[1].qualified_name, "Shop::Order::Legacy");
        assert!(out.into_result().is_err());
    }

    #[test]
    fn complete_schema_converts_to_ok() {
        let (schema, _) = shop_schema();
        let out = resolve_schema(&schema);
        assert!(out.is_complete());
        assert_eq!(out.into_result().unwrap().len(), 1);
    }
}
