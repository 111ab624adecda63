//! Maps protobuf field types to Sorbet type expressions.
//!
//! # Type Mapping Table
//!
//! | Proto type | Sorbet type | Notes |
//! |-----------|-------------|-------|
//! | `int32`, `int64`, `uint32`, `uint64`, `sint*`, `fixed*`, `sfixed*` | `:integer` | |
//! | `float`, `double` | `:float` | |
//! | `string`, `bytes` | `:string` | |
//! | `bool` | `:boolean` | |
//! | enum | `:string` | Enums are handled by their symbolic name |
//! | message | `Pkg::Outer::Inner` | See [`crate::namespace::qualified_name`] |
//! | `repeated T` | `T::Array[T]` | `Google::Protobuf::RepeatedField` for setters |
//! | `map<K, V>` | `T::Hash[K, V]` | `Google::Protobuf::Map` for setters |
//! | group | error | No Ruby type exists |

use crate::error::{Error, Result};
use crate::namespace::qualified_name;
use crate::schema::{ElementType, Entity, Field, FieldType, ScalarType, Schema};

/// Sorbet type of integer fields.
pub const INTEGER: &str = ":integer";
/// Sorbet type of `float` and `double` fields.
pub const FLOAT: &str = ":float";
/// Sorbet type of `string`, `bytes` and enum fields.
pub const STRING: &str = ":string";
/// Sorbet type of `bool` fields.
pub const BOOLEAN: &str = ":boolean";
/// What a generated map setter accepts.
pub const MAP_CONTAINER: &str = "Google::Protobuf::Map";
/// What a generated repeated-field setter accepts.
pub const REPEATED_CONTAINER: &str = "Google::Protobuf::RepeatedField";

/// The generated method a type expression annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// `def foo`
    Getter,
    /// `def foo=(value)`
    Setter,
    /// A keyword argument of `def initialize`.
    Initializer,
}

impl Accessor {
    pub const ALL: [Accessor; 3] = [Accessor::Getter, Accessor::Setter, Accessor::Initializer];
}

/// Resolve the Sorbet type of `field` as used by `accessor`.
///
/// Setters of map and repeated fields only accept the native protobuf
/// containers (see protocolbuffers/protobuf#4969), so they get the untyped
/// container class instead of `T::Hash` / `T::Array`. Singular fields resolve
/// the same way for every accessor.
pub fn field_type(schema: &Schema, field: &Field, accessor: Accessor) -> Result<String> {
    match field.field_type() {
        FieldType::Map { key, value } => {
            if accessor == Accessor::Setter {
                return Ok(MAP_CONTAINER.to_string());
            }
            let key = element_type(schema, field, key)?;
            let value = element_type(schema, field, value)?;
            Ok(format!("T::Hash[{key}, {value}]"))
        }
        FieldType::Repeated(element) => {
            if accessor == Accessor::Setter {
                return Ok(REPEATED_CONTAINER.to_string());
            }
            let element = element_type(schema, field, element)?;
            Ok(format!("T::Array[{element}]"))
        }
        FieldType::Singular(element) => element_type(schema, field, element),
    }
}

pub fn getter_field_type(schema: &Schema, field: &Field) -> Result<String> {
    field_type(schema, field, Accessor::Getter)
}

pub fn setter_field_type(schema: &Schema, field: &Field) -> Result<String> {
    field_type(schema, field, Accessor::Setter)
}

pub fn initializer_field_type(schema: &Schema, field: &Field) -> Result<String> {
    field_type(schema, field, Accessor::Initializer)
}

/// Resolve a single value type of `field`: the field itself when singular,
/// its element when repeated, or its key or value when a map.
///
/// Fails with [`Error::UnsupportedType`] naming `field` for groups.
pub fn element_type(schema: &Schema, field: &Field, element: ElementType) -> Result<String> {
    match element {
        ElementType::Scalar(scalar) => Ok(scalar_type(scalar).to_string()),
        ElementType::Enum(_) => Ok(STRING.to_string()),
        ElementType::Message(id) => Ok(qualified_name(schema, schema.message(id))),
        ElementType::Group(_) => Err(Error::UnsupportedType {
            message: schema.message(field.message()).full_name().to_string(),
            field: field.name().to_string(),
        }),
    }
}

/// Map a scalar to its Sorbet type.
pub fn scalar_type(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::Int32
        | ScalarType::Int64
        | ScalarType::Uint32
        | ScalarType::Uint64
        | ScalarType::Sint32
        | ScalarType::Sint64
        | ScalarType::Fixed32
        | ScalarType::Fixed64
        | ScalarType::Sfixed32
        | ScalarType::Sfixed64 => INTEGER,
        ScalarType::Double | ScalarType::Float => FLOAT,
        ScalarType::String | ScalarType::Bytes => STRING,
        ScalarType::Bool => BOOLEAN,
    }
}
