//! Protobuf schema graph: files, messages, enums, and fields.
//!
//! The graph is an arena. Entities are addressed by copyable ids and every
//! message or enum points at its parent by id, so walking from a nested type
//! up to its file is a plain loop and the structure can never hold a cycle:
//! a parent must already exist before a child can be added under it.
//!
//! A [`Schema`] can be built programmatically or loaded from a JSON
//! [`SchemaDocument`], which is a trimmed-down `FileDescriptorSet` with
//! nested messages written inline.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Index of a [`SchemaFile`] within the [`Schema`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// Index of a [`Message`] within the [`Schema`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(usize);

/// Index of an [`Enum`] within the [`Schema`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(usize);

/// Position of a [`Field`] inside its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub message: MessageId,
    index: usize,
}

/// Where a new message or enum is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of a file.
    File(FileId),
    /// Nested inside a message.
    Message(MessageId),
}

/// Either kind of named type, as returned by [`Schema::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Message(MessageId),
    Enum(EnumId),
}

// ── Type taxonomy ──────────────────────────────────────────────────────

/// The protobuf scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// Every scalar type, in descriptor order.
    pub const ALL: [ScalarType; 15] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int64,
        ScalarType::Uint64,
        ScalarType::Int32,
        ScalarType::Fixed64,
        ScalarType::Fixed32,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Bytes,
        ScalarType::Uint32,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Sint32,
        ScalarType::Sint64,
    ];

    /// Whether this is one of the ten integer encodings.
    pub fn is_int(self) -> bool {
        match self {
            ScalarType::Int32
            | ScalarType::Int64
            | ScalarType::Uint32
            | ScalarType::Uint64
            | ScalarType::Sint32
            | ScalarType::Sint64
            | ScalarType::Fixed32
            | ScalarType::Fixed64
            | ScalarType::Sfixed32
            | ScalarType::Sfixed64 => true,
            ScalarType::Double
            | ScalarType::Float
            | ScalarType::Bool
            | ScalarType::String
            | ScalarType::Bytes => false,
        }
    }

    /// Whether this is an integer or floating-point type.
    pub fn is_numeric(self) -> bool {
        self.is_int() || matches!(self, ScalarType::Double | ScalarType::Float)
    }

    /// The `.proto` keyword for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A descriptor `type` as written in a [`SchemaDocument`]: the scalars plus
/// the three kinds that reference another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtoType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Group,
    Message,
    Bytes,
    Uint32,
    Enum,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl ProtoType {
    /// The scalar this type names, or `None` for enum, message and group.
    pub fn scalar(self) -> Option<ScalarType> {
        let scalar = match self {
            ProtoType::Double => ScalarType::Double,
            ProtoType::Float => ScalarType::Float,
            ProtoType::Int64 => ScalarType::Int64,
            ProtoType::Uint64 => ScalarType::Uint64,
            ProtoType::Int32 => ScalarType::Int32,
            ProtoType::Fixed64 => ScalarType::Fixed64,
            ProtoType::Fixed32 => ScalarType::Fixed32,
            ProtoType::Bool => ScalarType::Bool,
            ProtoType::String => ScalarType::String,
            ProtoType::Bytes => ScalarType::Bytes,
            ProtoType::Uint32 => ScalarType::Uint32,
            ProtoType::Sfixed32 => ScalarType::Sfixed32,
            ProtoType::Sfixed64 => ScalarType::Sfixed64,
            ProtoType::Sint32 => ScalarType::Sint32,
            ProtoType::Sint64 => ScalarType::Sint64,
            ProtoType::Group | ProtoType::Message | ProtoType::Enum => return None,
        };
        Some(scalar)
    }
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scalar() {
            Some(scalar) => f.write_str(scalar.as_str()),
            None => f.write_str(match self {
                ProtoType::Group => "group",
                ProtoType::Message => "message",
                _ => "enum",
            }),
        }
    }
}

/// The type of a single value: a scalar, or a reference to another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Scalar(ScalarType),
    Enum(EnumId),
    Message(MessageId),
    /// proto2 group. Carried so the schema stays faithful, but no Ruby type
    /// exists for it.
    Group(MessageId),
}

/// The shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Singular(ElementType),
    Repeated(ElementType),
    Map { key: ElementType, value: ElementType },
}

// ── Entities ───────────────────────────────────────────────────────────

/// A `.proto` file. Only its namespace declaration matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFile {
    /// Path of the file (e.g., `"acme/billing/v1/invoice.proto"`).
    pub name: String,

    /// Dot-separated proto package (e.g., `"acme.billing.v1"`).
    pub package: String,

    /// The `ruby_package` file option, if set.
    pub ruby_package: Option<String>,
}

/// Common view over messages and enums.
pub trait Entity {
    /// Simple name as declared (e.g., `"Line"`).
    fn name(&self) -> &str;

    /// Dotted proto name without the leading dot (e.g., `"acme.Invoice.Line"`).
    fn full_name(&self) -> &str;

    /// Enclosing message, or `None` for a top-level declaration.
    fn parent(&self) -> Option<MessageId>;

    /// File the entity is declared in.
    fn file(&self) -> FileId;
}

#[derive(Debug, Clone)]
pub struct Message {
    name: String,
    full_name: String,
    parent: Option<MessageId>,
    file: FileId,
    fields: Vec<Field>,
}

impl Message {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Find a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Entity for Message {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn parent(&self) -> Option<MessageId> {
        self.parent
    }

    fn file(&self) -> FileId {
        self.file
    }
}

#[derive(Debug, Clone)]
pub struct Enum {
    name: String,
    full_name: String,
    parent: Option<MessageId>,
    file: FileId,
    values: Vec<String>,
}

impl Enum {
    /// Declared value names, in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Entity for Enum {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn parent(&self) -> Option<MessageId> {
        self.parent
    }

    fn file(&self) -> FileId {
        self.file
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    message: MessageId,
    field_type: FieldType,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The message this field belongs to.
    pub fn message(&self) -> MessageId {
        self.message
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

// ── Schema graph ───────────────────────────────────────────────────────

/// An immutable-once-built graph of protobuf declarations.
///
/// Ids are only meaningful for the schema that returned them; passing an id
/// from another schema is a logic error and panics on lookup.
#[derive(Debug, Default)]
pub struct Schema {
    files: Vec<SchemaFile>,
    messages: Vec<Message>,
    enums: Vec<Enum>,
    by_name: HashMap<String, EntityRef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file: SchemaFile) -> FileId {
        self.files.push(file);
        FileId(self.files.len() - 1)
    }

    /// Declare a message in `scope`. The full proto name is derived from the
    /// file package and enclosing messages.
    pub fn add_message(&mut self, scope: Scope, name: &str) -> MessageId {
        let (file, parent) = self.resolve_scope(scope);
        let full_name = self.scoped_name(scope, name);
        let id = MessageId(self.messages.len());
        self.by_name
            .insert(full_name.clone(), EntityRef::Message(id));
        self.messages.push(Message {
            name: name.to_string(),
            full_name,
            parent,
            file,
            fields: Vec::new(),
        });
        id
    }

    /// Declare an enum in `scope`.
    pub fn add_enum<I, S>(&mut self, scope: Scope, name: &str, values: I) -> EnumId
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (file, parent) = self.resolve_scope(scope);
        let full_name = self.scoped_name(scope, name);
        let id = EnumId(self.enums.len());
        self.by_name.insert(full_name.clone(), EntityRef::Enum(id));
        self.enums.push(Enum {
            name: name.to_string(),
            full_name,
            parent,
            file,
            values: values.into_iter().map(Into::into).collect(),
        });
        id
    }

    /// Append a field to `message`.
    pub fn add_field(&mut self, message: MessageId, name: &str, field_type: FieldType) -> FieldId {
        let fields = &mut self.messages[message.0].fields;
        fields.push(Field {
            name: name.to_string(),
            message,
            field_type,
        });
        FieldId {
            message,
            index: fields.len() - 1,
        }
    }

    pub fn file(&self, id: FileId) -> &SchemaFile {
        &self.files[id.0]
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn enum_def(&self, id: EnumId) -> &Enum {
        &self.enums[id.0]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.messages[id.message.0].fields[id.index]
    }

    /// All files with their ids, in insertion order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SchemaFile)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    /// All messages with their ids, in declaration order (parents before
    /// their nested messages).
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &Message)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i), m))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &Enum)> {
        self.enums.iter().enumerate().map(|(i, e)| (EnumId(i), e))
    }

    /// Look up a message or enum by full proto name. A leading `.` (as
    /// found in descriptor `type_name`s) is accepted.
    pub fn lookup(&self, full_name: &str) -> Option<EntityRef> {
        let name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.by_name.get(name).copied()
    }

    fn resolve_scope(&self, scope: Scope) -> (FileId, Option<MessageId>) {
        match scope {
            Scope::File(file) => (file, None),
            Scope::Message(parent) => (self.message(parent).file, Some(parent)),
        }
    }

    fn scoped_name(&self, scope: Scope, name: &str) -> String {
        let prefix = match scope {
            Scope::File(file) => self.file(file).package.as_str(),
            Scope::Message(parent) => self.message(parent).full_name.as_str(),
        };
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }
}

// ── JSON schema documents ──────────────────────────────────────────────

/// A set of files as read from JSON.
///
/// ```json
/// {"files": [{
///     "name": "acme/invoice.proto",
///     "package": "acme.billing",
///     "messages": [{
///         "name": "Invoice",
///         "fields": [
///             {"name": "id", "type": "int64"},
///             {"name": "lines", "label": "repeated", "type": "message",
///              "type_name": ".acme.billing.Invoice.Line"},
///             {"name": "tags", "label": "map",
///              "key": {"type": "string"}, "value": {"type": "string"}}
///         ],
///         "messages": [{"name": "Line"}]
///     }]
/// }]}
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub files: Vec<FileDocument>,
}

#[derive(Debug, Deserialize)]
pub struct FileDocument {
    pub name: String,

    #[serde(default)]
    pub package: String,

    /// The `ruby_package` option.
    #[serde(default)]
    pub ruby_package: Option<String>,

    #[serde(default)]
    pub messages: Vec<MessageDocument>,

    #[serde(default)]
    pub enums: Vec<EnumDocument>,
}

#[derive(Debug, Deserialize)]
pub struct MessageDocument {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<FieldDocument>,

    /// Nested message declarations.
    #[serde(default)]
    pub messages: Vec<MessageDocument>,

    /// Nested enum declarations.
    #[serde(default)]
    pub enums: Vec<EnumDocument>,
}

#[derive(Debug, Deserialize)]
pub struct EnumDocument {
    pub name: String,

    #[serde(default)]
    pub values: Vec<String>,
}

/// Field shape as written in a document. Defaults to `singular`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLabel {
    #[default]
    Singular,
    Repeated,
    Map,
}

#[derive(Debug, Deserialize)]
pub struct FieldDocument {
    pub name: String,

    #[serde(default)]
    pub label: FieldLabel,

    /// Element type for singular and repeated fields.
    #[serde(rename = "type", default)]
    pub proto_type: Option<ProtoType>,

    /// Absolute proto name of the referenced message or enum.
    #[serde(default)]
    pub type_name: Option<String>,

    /// Key type of a map field.
    #[serde(default)]
    pub key: Option<ElementDocument>,

    /// Value type of a map field.
    #[serde(default)]
    pub value: Option<ElementDocument>,
}

#[derive(Debug, Deserialize)]
pub struct ElementDocument {
    #[serde(rename = "type")]
    pub proto_type: ProtoType,

    #[serde(default)]
    pub type_name: Option<String>,
}

impl Schema {
    /// Build a schema from a parsed document.
    ///
    /// All messages and enums of all files are registered before any field
    /// is resolved, so fields may reference types declared later or in
    /// another file.
    pub fn from_document(doc: &SchemaDocument) -> Result<Schema> {
        let mut schema = Schema::new();
        let mut pending: Vec<(MessageId, &FieldDocument)> = Vec::new();

        for file_doc in &doc.files {
            let file = schema.add_file(SchemaFile {
                name: file_doc.name.clone(),
                package: file_doc.package.clone(),
                ruby_package: file_doc.ruby_package.clone(),
            });
            schema.register_enums(Scope::File(file), &file_doc.enums)?;

            // Pre-order walk keeps messages in declaration order.
            let mut stack: Vec<(Scope, &MessageDocument)> = file_doc
                .messages
                .iter()
                .rev()
                .map(|m| (Scope::File(file), m))
                .collect();
            while let Some((scope, msg_doc)) = stack.pop() {
                schema.ensure_undeclared(scope, &msg_doc.name)?;
                let id = schema.add_message(scope, &msg_doc.name);
                schema.register_enums(Scope::Message(id), &msg_doc.enums)?;
                pending.extend(msg_doc.fields.iter().map(|f| (id, f)));
                stack.extend(
                    msg_doc
                        .messages
                        .iter()
                        .rev()
                        .map(|m| (Scope::Message(id), m)),
                );
            }
        }

        for (message, field_doc) in pending {
            let field_type = schema.resolve_field_type(field_doc)?;
            schema.add_field(message, &field_doc.name, field_type);
        }

        log::debug!(
            "loaded schema: {} files, {} messages, {} enums",
            schema.files.len(),
            schema.messages.len(),
            schema.enums.len()
        );
        Ok(schema)
    }

    fn register_enums(&mut self, scope: Scope, enums: &[EnumDocument]) -> Result<()> {
        for enum_doc in enums {
            self.ensure_undeclared(scope, &enum_doc.name)?;
            self.add_enum(scope, &enum_doc.name, enum_doc.values.iter().cloned());
        }
        Ok(())
    }

    fn ensure_undeclared(&self, scope: Scope, name: &str) -> Result<()> {
        let full_name = self.scoped_name(scope, name);
        if self.by_name.contains_key(&full_name) {
            return Err(Error::Schema(format!("'{full_name}' is declared twice")));
        }
        Ok(())
    }

    fn resolve_field_type(&self, doc: &FieldDocument) -> Result<FieldType> {
        match doc.label {
            FieldLabel::Map => {
                let (Some(key), Some(value)) = (&doc.key, &doc.value) else {
                    return Err(Error::Schema(format!(
                        "map field '{}' must declare both key and value",
                        doc.name
                    )));
                };
                Ok(FieldType::Map {
                    key: self.resolve_element(&doc.name, key.proto_type, key.type_name.as_deref())?,
                    value: self.resolve_element(
                        &doc.name,
                        value.proto_type,
                        value.type_name.as_deref(),
                    )?,
                })
            }
            FieldLabel::Singular | FieldLabel::Repeated => {
                let Some(proto_type) = doc.proto_type else {
                    return Err(Error::Schema(format!("field '{}' has no type", doc.name)));
                };
                let element =
                    self.resolve_element(&doc.name, proto_type, doc.type_name.as_deref())?;
                Ok(if doc.label == FieldLabel::Repeated {
                    FieldType::Repeated(element)
                } else {
                    FieldType::Singular(element)
                })
            }
        }
    }

    fn resolve_element(
        &self,
        field: &str,
        proto_type: ProtoType,
        type_name: Option<&str>,
    ) -> Result<ElementType> {
        if let Some(scalar) = proto_type.scalar() {
            return Ok(ElementType::Scalar(scalar));
        }
        let Some(type_name) = type_name else {
            return Err(Error::Schema(format!(
                "field '{field}' of type {proto_type} needs a type_name"
            )));
        };
        match (proto_type, self.lookup(type_name)) {
            (ProtoType::Enum, Some(EntityRef::Enum(id))) => Ok(ElementType::Enum(id)),
            (ProtoType::Message, Some(EntityRef::Message(id))) => Ok(ElementType::Message(id)),
            (ProtoType::Group, Some(EntityRef::Message(id))) => Ok(ElementType::Group(id)),
            _ => Err(Error::UnresolvedType {
                field: field.to_string(),
                type_name: type_name.to_string(),
            }),
        }
    }
}

/// Parse a JSON [`SchemaDocument`] and build the schema graph.
pub fn parse_schema(json: &str) -> Result<Schema> {
    let doc: SchemaDocument = serde_json::from_str(json)?;
    Schema::from_document(&doc)
}
