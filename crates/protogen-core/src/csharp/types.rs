//! Schema type to C# type mapping.

use super::keywords::escape;
use crate::codegen::GeneratorContext;
use crate::descriptor::is_map_entry;
use prost_types::field_descriptor_proto::Type;
use prost_types::FieldDescriptorProto;
use std::fmt;
use tracing::debug;

const WELL_KNOWN_TIMESTAMP: &str = ".google.protobuf.Timestamp";
const WELL_KNOWN_DURATION: &str = ".google.protobuf.Duration";

/// Wire encoding carried as `global::ProtoBuf.DataFormat.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Sign-mapped varint (`sint32`, `sint64`)
    ZigZag,
    /// Fixed-width little-endian (`fixed*`, `sfixed*`)
    FixedSize,
    /// Start/end-group delimited message
    Group,
    /// Native substitute for a well-known message type
    WellKnown,
}

impl DataFormat {
    /// Member name on `global::ProtoBuf.DataFormat`
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::ZigZag => "ZigZag",
            DataFormat::FixedSize => "FixedSize",
            DataFormat::Group => "Group",
            DataFormat::WellKnown => "WellKnown",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered type of one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// C# type name
    pub name: String,
    /// Wire hint, if the plain encoding for `name` is not the right one
    pub data_format: Option<DataFormat>,
    /// The field references a map-entry message
    pub is_map: bool,
}

impl ResolvedType {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_format: None,
            is_map: false,
        }
    }

    fn hinted(name: impl Into<String>, data_format: DataFormat) -> Self {
        Self {
            name: name.into(),
            data_format: Some(data_format),
            is_map: false,
        }
    }
}

/// Maps one field to its C# type, wire hint, and map flag.
///
/// Resolved enum and message names are escaped like their declarations.
/// Unresolved references fall back to the schema type name with no hint.
pub fn resolve(ctx: &GeneratorContext<'_>, field: &FieldDescriptorProto) -> ResolvedType {
    match field.r#type() {
        Type::Double => ResolvedType::plain("double"),
        Type::Float => ResolvedType::plain("float"),
        Type::Bool => ResolvedType::plain("bool"),
        Type::String => ResolvedType::plain("string"),
        Type::Bytes => ResolvedType::plain("byte[]"),
        Type::Int32 => ResolvedType::plain("int"),
        Type::Sint32 => ResolvedType::hinted("int", DataFormat::ZigZag),
        Type::Sfixed32 => ResolvedType::hinted("int", DataFormat::FixedSize),
        Type::Int64 => ResolvedType::plain("long"),
        Type::Sint64 => ResolvedType::hinted("long", DataFormat::ZigZag),
        Type::Sfixed64 => ResolvedType::hinted("long", DataFormat::FixedSize),
        Type::Uint32 => ResolvedType::plain("uint"),
        Type::Fixed32 => ResolvedType::hinted("uint", DataFormat::FixedSize),
        Type::Uint64 => ResolvedType::plain("ulong"),
        Type::Fixed64 => ResolvedType::hinted("ulong", DataFormat::FixedSize),
        Type::Enum => match ctx.find_enum(field.type_name()) {
            Some(enum_type) => ResolvedType::plain(escape(&ctx.names.enum_name(enum_type))),
            None => unresolved(field),
        },
        Type::Message | Type::Group => {
            match field.type_name() {
                WELL_KNOWN_TIMESTAMP => {
                    return ResolvedType::hinted("global::System.DateTime?", DataFormat::WellKnown)
                }
                WELL_KNOWN_DURATION => {
                    return ResolvedType::hinted("global::System.TimeSpan?", DataFormat::WellKnown)
                }
                _ => {}
            }

            let Some(message) = ctx.find_message(field.type_name()) else {
                return unresolved(field);
            };
            ResolvedType {
                name: escape(&ctx.names.message_name(message)).into_owned(),
                data_format: (field.r#type() == Type::Group).then_some(DataFormat::Group),
                is_map: is_map_entry(message),
            }
        }
    }
}

fn unresolved(field: &FieldDescriptorProto) -> ResolvedType {
    debug!(
        "unresolved type reference {} on field {}, emitting it verbatim",
        field.type_name(),
        field.name()
    );
    ResolvedType::plain(field.type_name())
}

/// Repeated scalar kinds rendered as `T[]` rather than `List<T>`
pub fn use_array(field: &FieldDescriptorProto) -> bool {
    matches!(
        field.r#type(),
        Type::Bool
            | Type::Double
            | Type::Float
            | Type::Fixed32
            | Type::Fixed64
            | Type::Int32
            | Type::Int64
            | Type::Sfixed32
            | Type::Sfixed64
            | Type::Sint32
            | Type::Sint64
            | Type::Uint32
            | Type::Uint64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{CodeWriter, NamingStyle};
    use crate::descriptor::{ProtoSyntax, TypeIndex};
    use crate::test_util::{enumeration, field, file, map_entry, message, typed_field};
    use prost_types::field_descriptor_proto::Label;
    use prost_types::FileDescriptorProto;

    fn sample_files() -> Vec<FileDescriptorProto> {
        let mut holder = message("holder", vec![]);
        holder.nested_type.push(map_entry(
            "ScoresEntry",
            field("key", 1, Type::String, Label::Optional),
            field("value", 2, Type::Sint32, Label::Optional),
        ));
        let mut f = file("types.proto", "pkg", "proto2");
        f.message_type.push(holder);
        f.enum_type.push(enumeration("color_kind", &[("RED", 0)]));
        vec![f]
    }

    fn resolve_with(files: &[FileDescriptorProto], field: &FieldDescriptorProto) -> ResolvedType {
        let index = TypeIndex::new(files);
        let mut sink = String::new();
        let ctx = GeneratorContext {
            file: &files[0],
            syntax: ProtoSyntax::Proto2,
            index: &index,
            names: NamingStyle::Auto.normalizer(),
            out: CodeWriter::new(&mut sink, "    "),
        };
        resolve(&ctx, field)
    }

    #[test]
    fn test_scalar_table() {
        let files = sample_files();
        let cases = [
            (Type::Double, "double", None),
            (Type::Float, "float", None),
            (Type::Bool, "bool", None),
            (Type::String, "string", None),
            (Type::Bytes, "byte[]", None),
            (Type::Int32, "int", None),
            (Type::Sint32, "int", Some(DataFormat::ZigZag)),
            (Type::Sfixed32, "int", Some(DataFormat::FixedSize)),
            (Type::Int64, "long", None),
            (Type::Sint64, "long", Some(DataFormat::ZigZag)),
            (Type::Sfixed64, "long", Some(DataFormat::FixedSize)),
            (Type::Uint32, "uint", None),
            (Type::Fixed32, "uint", Some(DataFormat::FixedSize)),
            (Type::Uint64, "ulong", None),
            (Type::Fixed64, "ulong", Some(DataFormat::FixedSize)),
        ];
        for (ty, name, data_format) in cases {
            let f = field("f", 1, ty, Label::Optional);
            let first = resolve_with(&files, &f);
            assert_eq!(first.name, name, "{:?}", ty);
            assert_eq!(first.data_format, data_format, "{:?}", ty);
            assert!(!first.is_map);
            assert_eq!(first, resolve_with(&files, &f));
        }
    }

    #[test]
    fn test_well_known_types() {
        let files = sample_files();
        let ts = typed_field("at", 1, Type::Message, Label::Optional, ".google.protobuf.Timestamp");
        let resolved = resolve_with(&files, &ts);
        assert_eq!(resolved.name, "global::System.DateTime?");
        assert_eq!(resolved.data_format, Some(DataFormat::WellKnown));

        let d = typed_field("ttl", 2, Type::Message, Label::Optional, ".google.protobuf.Duration");
        assert_eq!(resolve_with(&files, &d).name, "global::System.TimeSpan?");
    }

    #[test]
    fn test_references() {
        let files = sample_files();

        let e = typed_field("c", 1, Type::Enum, Label::Optional, ".pkg.color_kind");
        assert_eq!(resolve_with(&files, &e), ResolvedType::plain("ColorKind"));

        let m = typed_field("h", 2, Type::Message, Label::Optional, ".pkg.holder");
        assert_eq!(resolve_with(&files, &m), ResolvedType::plain("Holder"));

        let g = typed_field("g", 3, Type::Group, Label::Optional, ".pkg.holder");
        assert_eq!(resolve_with(&files, &g).data_format, Some(DataFormat::Group));

        let map = typed_field("scores", 4, Type::Message, Label::Repeated, ".pkg.holder.ScoresEntry");
        assert!(resolve_with(&files, &map).is_map);
    }

    #[test]
    fn test_unresolved_falls_back_to_schema_name() {
        let files = sample_files();

        let e = typed_field("c", 1, Type::Enum, Label::Optional, ".other.Missing");
        assert_eq!(resolve_with(&files, &e), ResolvedType::plain(".other.Missing"));

        let g = typed_field("g", 2, Type::Group, Label::Optional, ".other.Gone");
        assert_eq!(resolve_with(&files, &g), ResolvedType::plain(".other.Gone"));
    }

    #[test]
    fn test_use_array() {
        assert!(use_array(&field("a", 1, Type::Sfixed64, Label::Repeated)));
        assert!(use_array(&field("a", 1, Type::Bool, Label::Repeated)));
        assert!(!use_array(&field("a", 1, Type::String, Label::Repeated)));
        assert!(!use_array(&field("a", 1, Type::Bytes, Label::Repeated)));
        assert!(!use_array(&field("a", 1, Type::Enum, Label::Repeated)));
        assert!(!use_array(&field("a", 1, Type::Message, Label::Repeated)));
    }
}
