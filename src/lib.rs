//! Resolve Sorbet type expressions for protobuf fields.
//!
//! `proto-rbi-types` is the type-mapping core of a `protoc` plugin that
//! writes RBI signatures for the Ruby classes generated by `ruby_out`. Given
//! a field and the accessor it annotates, it returns the exact string a
//! template splices into a `sig` block.
//!
//! # Features
//!
//! - Maps every proto scalar to `:integer`, `:float`, `:string` or `:boolean`
//! - Resolves message references to fully-qualified Ruby constants, honoring
//!   the `ruby_package` file option
//! - Renders `repeated` and `map` fields as `T::Array` / `T::Hash`, or as the
//!   native protobuf containers for setters
//! - Reports unsupported types (proto2 groups) as errors naming the field
//! - Loads the schema graph from a JSON document or builds it in code
//!
//! # Usage
//!
//! ```
//! use proto_rbi_types::schema::parse_schema;
//! use proto_rbi_types::signatures::resolve_schema;
//!
//! let schema = parse_schema(r#"{"files": [{
//!     "name": "shop.proto",
//!     "package": "shop.v1",
//!     "messages": [{"name": "Order", "fields": [
//!         {"name": "tags", "label": "map", "key": {"type": "int64"}, "value": {"type": "string"}}
//!     ]}]
//! }]}"#)?;
//!
//! let out = resolve_schema(&schema);
//! let tags = &out.messages[0].fields[0];
//! assert_eq!(tags.getter, "T::Hash[:integer, :string]");
//! assert_eq!(tags.setter, "Google::Protobuf::Map");
//! # Ok::<(), proto_rbi_types::error::Error>(())
//! ```

pub mod error;
pub mod namespace;
pub mod schema;
pub mod signatures;
pub mod type_map;
