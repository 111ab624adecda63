//! Ruby module and constant names for protobuf declarations.
//!
//! `ruby_out` places every message of a file inside the module path given by
//! the file's `ruby_package` option, or by its proto package when the option
//! is absent. Nested messages become nested constants of their parent class.
//!
//! | input | result |
//! |-------|--------|
//! | package `acme.billing` | `Acme::Billing` |
//! | package `acme_corp.api` | `AcmeCorp::Api` |
//! | `ruby_package = "Acme::Billing"` | `Acme::Billing` |
//! | message `Line` in `Invoice` in `acme.billing` | `Acme::Billing::Invoice::Line` |

use crate::schema::{Entity, FileId, Schema, SchemaFile};

/// The Ruby module path of a file (e.g., `"Acme::Billing"`).
///
/// `ruby_out` does not camel-case the package itself, which yields invalid
/// constant names for lower-case packages, so each component is converted
/// here.
pub fn ruby_package(file: &SchemaFile) -> String {
    package_components(file).join("::")
}

/// Every enclosing module of a file, outermost first.
///
/// Package `a.b.c` yields `["A", "A::B", "A::B::C"]`, one entry per
/// `module` block a template has to open.
pub fn ruby_modules(file: &SchemaFile) -> Vec<String> {
    let components = package_components(file);
    (1..=components.len())
        .map(|len| components[..len].join("::"))
        .collect()
}

/// The fully-qualified Ruby constant for a message or enum.
///
/// Walks the parent chain to the top-level declaration and prefixes the
/// file's module path: `Acme::Billing::Invoice::Line`. With an empty package
/// the result is the top-level reference `::Invoice`.
pub fn qualified_name<E: Entity + ?Sized>(schema: &Schema, entity: &E) -> String {
    let mut names = vec![capitalize(entity.name())];
    let mut parent = entity.parent();
    while let Some(id) = parent {
        let message = schema.message(id);
        names.push(capitalize(message.name()));
        parent = message.parent();
    }
    names.reverse();

    let package = ruby_package(schema.file(entity.file()));
    format!("{package}::{}", names.join("::"))
}

/// [`ruby_modules`] for a file id.
pub fn file_modules(schema: &Schema, file: FileId) -> Vec<String> {
    ruby_modules(schema.file(file))
}

/// Split the effective package on `.` and `::` and camel-case each part.
fn package_components(file: &SchemaFile) -> Vec<String> {
    let package = match file.ruby_package.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => file.package.as_str(),
    };
    package
        .split('.')
        .flat_map(|part| part.split("::"))
        .filter(|part| !part.is_empty())
        .map(to_upper_camel_case)
        .collect()
}

/// Convert one package component to UpperCamelCase.
///
/// - `"billing"` → `"Billing"`
/// - `"acme_corp"` → `"AcmeCorp"`
/// - `"Acme"` → `"Acme"` (already camel-cased parts are left alone)
fn to_upper_camel_case(s: &str) -> String {
    s.split('_').map(capitalize).collect()
}

/// Upper-case the first character, keep the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Scope;

    fn file(package: &str, ruby_package: Option<&str>) -> SchemaFile {
        SchemaFile {
            name: "test.proto".to_string(),
            package: package.to_string(),
            ruby_package: ruby_package.map(str::to_string),
        }
    }

    #[test]
    fn package_is_camel_cased() {
        assert_eq!(ruby_package(&file("a.b", None)), "A::B");
        assert_eq!(ruby_package(&file("acme.billing.v1", None)), "Acme::Billing::V1");
        assert_eq!(ruby_package(&file("acme_corp.api", None)), "AcmeCorp::Api");
    }

    #[test]
    fn ruby_package_option_overrides_package() {
        let f = file("acme.billing", Some("Billing::Api"));
        assert_eq!(ruby_package(&f), "Billing::Api");
        assert_eq!(ruby_modules(&f), ["Billing", "Billing::Api"]);
    }

    #[test]
    fn empty_ruby_package_option_falls_back() {
        assert_eq!(ruby_package(&file("acme.billing", Some(""))), "Acme::Billing");
    }

    #[test]
    fn modules_list_every_prefix() {
        assert_eq!(ruby_modules(&file("a.b.c", None)), ["A", "A::B", "A::B::C"]);
        assert_eq!(ruby_modules(&file("single", None)), ["Single"]);
    }

    #[test]
    fn empty_package_has_no_modules() {
        assert!(ruby_modules(&file("", None)).is_empty());
        assert_eq!(ruby_package(&file("", None)), "");
    }

    #[test]
    fn capitalize_only_touches_first_letter() {
        assert_eq!(capitalize("line"), "Line");
        assert_eq!(capitalize("HTTPRequest"), "HTTPRequest");
        assert_eq!(capitalize(""), "");
        assert_eq!(to_upper_camel_case("snake_case_name"), "SnakeCaseName");
    }

    #[test]
    fn qualified_name_of_top_level_and_nested() {
        let mut schema = Schema::new();
        let f = schema.add_file(file("a.b", None));
        let foo = schema.add_message(Scope::File(f), "Foo");
        let bar = schema.add_message(Scope::Message(foo), "Bar");
        let kind = schema.add_enum(Scope::Message(bar), "kind", ["A"]);

        assert_eq!(qualified_name(&schema, schema.message(foo)), "A::B::Foo");
        assert_eq!(qualified_name(&schema, schema.message(bar)), "A::B::Foo::Bar");
        assert_eq!(
            qualified_name(&schema, schema.enum_def(kind)),
            "A::B::Foo::Bar::Kind"
        );
    }

    #[test]
    fn qualified_name_without_package_is_top_level_reference() {
        let mut schema = Schema::new();
        let f = schema.add_file(file("", None));
        let foo = schema.add_message(Scope::File(f), "Foo");
        assert_eq!(qualified_name(&schema, schema.message(foo)), "::Foo");
    }

    #[test]
    fn qualified_name_handles_deep_nesting() {
        let mut schema = Schema::new();
        let f = schema.add_file(file("deep", None));
        let mut id = schema.add_message(Scope::File(f), "Level");
        for _ in 0..1_000 {
            id = schema.add_message(Scope::Message(id), "Level");
        }
        let name = qualified_name(&schema, schema.message(id));
        assert!(name.starts_with("Deep::Level::Level"));
        assert_eq!(name.matches("::").count(), 1_001);
    }
}
