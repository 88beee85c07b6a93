//! C# backend targeting the protobuf-net runtime.
//!
//! Messages become `partial class`es annotated with `ProtoContract`, enums
//! become C# enums annotated value by value. Field shapes are decided in
//! [`fields`].

mod defaults;
mod fields;
mod keywords;
mod types;

use crate::codegen::{CodeGenerator, Generator, GeneratorContext, OneofSet};
use crate::descriptor::Deprecation;
use prost_types::{DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto};
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::path::Path;

pub use defaults::render_default;
pub use fields::{FieldShape, FIELD_PREFIX};
pub use keywords::escape;
pub use types::{resolve, use_array, DataFormat, ResolvedType};

const SUPPRESSED_WARNINGS: &str = "CS1591, CS0612, CS3021";

/// Namespace opened by a file header, closed by the matching footer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScope {
    /// The namespace, when one was opened
    pub namespace: Option<String>,
}

/// protobuf-net C# generator
#[derive(Debug, Clone, Copy, Default)]
pub struct CSharpCodeGenerator;

impl Generator<CSharpCodeGenerator> {
    /// Generator with the C# backend and default config
    pub fn csharp() -> Self {
        Generator::new(CSharpCodeGenerator)
    }
}

impl CodeGenerator for CSharpCodeGenerator {
    type FileScope = FileScope;

    fn name(&self) -> &'static str {
        "C#"
    }

    fn file_extension(&self) -> &'static str {
        "cs"
    }

    fn escape<'n>(&self, identifier: &'n str) -> Cow<'n, str> {
        escape(identifier)
    }

    fn write_file_header(&self, ctx: &mut GeneratorContext<'_>) -> Result<FileScope, fmt::Error> {
        let input = Path::new(ctx.file.name())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(ctx.file.name());

        writeln!(ctx.out, "// This file was generated by a tool; you should avoid making direct changes.")?;
        writeln!(ctx.out, "// Consider using 'partial classes' to extend these types")?;
        writeln!(ctx.out, "// Input: {}", input)?;
        writeln!(ctx.out)?;
        writeln!(ctx.out, "#pragma warning disable {}", SUPPRESSED_WARNINGS)?;
        writeln!(ctx.out)?;

        let namespace = ctx
            .file
            .options
            .as_ref()
            .and_then(|o| o.csharp_namespace.as_deref())
            .unwrap_or(ctx.file.package())
            .trim();

        if namespace.is_empty() {
            return Ok(FileScope::default());
        }

        writeln!(ctx.out, "namespace {}", namespace)?;
        writeln!(ctx.out, "{{")?;
        ctx.out.indent();
        writeln!(ctx.out)?;
        Ok(FileScope {
            namespace: Some(namespace.to_string()),
        })
    }

    fn write_file_footer(&self, ctx: &mut GeneratorContext<'_>, scope: FileScope) -> fmt::Result {
        if scope.namespace.is_some() {
            ctx.out.outdent();
            writeln!(ctx.out, "}}")?;
            writeln!(ctx.out)?;
        }
        writeln!(ctx.out, "#pragma warning restore {}", SUPPRESSED_WARNINGS)
    }

    fn write_message_header(&self, ctx: &mut GeneratorContext<'_>, message: &DescriptorProto) -> fmt::Result {
        let name = ctx.names.message_name(message);
        writeln!(ctx.out, "[global::ProtoBuf.ProtoContract(Name = @\"{}\")]", message.name())?;
        write_options(ctx, message)?;
        writeln!(ctx.out, "public partial class {}", self.escape(&name))?;
        writeln!(ctx.out, "{{")?;
        ctx.out.indent();
        Ok(())
    }

    fn write_message_footer(&self, ctx: &mut GeneratorContext<'_>, _message: &DescriptorProto) -> fmt::Result {
        ctx.out.outdent();
        writeln!(ctx.out, "}}")?;
        writeln!(ctx.out)
    }

    fn write_field(
        &self,
        ctx: &mut GeneratorContext<'_>,
        field: &FieldDescriptorProto,
        oneofs: &mut OneofSet,
    ) -> fmt::Result {
        fields::write_field(ctx, field, oneofs)
    }

    fn write_enum_header(&self, ctx: &mut GeneratorContext<'_>, enum_type: &EnumDescriptorProto) -> fmt::Result {
        let name = ctx.names.enum_name(enum_type);
        writeln!(ctx.out, "[global::ProtoBuf.ProtoContract(Name = @\"{}\")]", enum_type.name())?;
        write_options(ctx, enum_type)?;
        writeln!(ctx.out, "public enum {}", self.escape(&name))?;
        writeln!(ctx.out, "{{")?;
        ctx.out.indent();
        Ok(())
    }

    fn write_enum_value(&self, ctx: &mut GeneratorContext<'_>, value: &EnumValueDescriptorProto) -> fmt::Result {
        let name = ctx.names.enum_value_name(value);
        writeln!(
            ctx.out,
            "[global::ProtoBuf.ProtoEnum(Name = @\"{}\", Value = {})]",
            value.name(),
            value.number()
        )?;
        write_options(ctx, value)?;
        writeln!(ctx.out, "{} = {},", self.escape(&name), value.number())
    }

    fn write_enum_footer(&self, ctx: &mut GeneratorContext<'_>, _enum_type: &EnumDescriptorProto) -> fmt::Result {
        ctx.out.outdent();
        writeln!(ctx.out, "}}")?;
        writeln!(ctx.out)
    }
}

/// Emits `[global::System.Obsolete]` for deprecated descriptors
fn write_options(ctx: &mut GeneratorContext<'_>, descriptor: &impl Deprecation) -> fmt::Result {
    if descriptor.is_deprecated() {
        writeln!(ctx.out, "[global::System.Obsolete]")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::GeneratorConfig;
    use crate::test_util::{
        enumeration, field, file, in_oneof, map_entry, message, oneof, typed_field, with_default,
    };
    use pretty_assertions::assert_eq;
    use prost_types::field_descriptor_proto::{Label, Type};
    use prost_types::{EnumOptions, EnumValueOptions, FileDescriptorProto, FileOptions, MessageOptions};

    #[test]
    fn test_full_file() {
        let mut person = message(
            "person",
            vec![
                field("name", 1, Type::String, Label::Optional),
                typed_field("attrs", 2, Type::Message, Label::Repeated, ".demo.person.AttrsEntry"),
                typed_field("category", 3, Type::Enum, Label::Optional, ".demo.person.kind"),
            ],
        );
        person.options = Some(MessageOptions {
            deprecated: Some(true),
            ..Default::default()
        });
        person.nested_type.push(map_entry(
            "AttrsEntry",
            field("key", 1, Type::String, Label::Optional),
            field("value", 2, Type::Int64, Label::Optional),
        ));
        let mut kind = enumeration("kind", &[("unknown", 0), ("default", 1)]);
        kind.value[1].options = Some(EnumValueOptions {
            deprecated: Some(true),
            ..Default::default()
        });
        person.enum_type.push(kind);

        let mut f = file("protos/demo.proto", "demo", "proto3");
        f.message_type.push(person);
        f.options = Some(FileOptions {
            csharp_namespace: Some("Demo.Contracts".into()),
            ..Default::default()
        });

        let generated = Generator::csharp().generate(&[f]).unwrap();
        assert_eq!(generated[0].name, "protos/demo.cs");
        assert_eq!(
            generated[0].content,
            r#"// This file was generated by a tool; you should avoid making direct changes.
// Consider using 'partial classes' to extend these types
// Input: demo.proto

#pragma warning disable CS1591, CS0612, CS3021

namespace Demo.Contracts
{

    [global::ProtoBuf.ProtoContract(Name = @"person")]
    [global::System.Obsolete]
    public partial class Person
    {
        [global::ProtoBuf.ProtoMember(1, Name = @"name")]
        [global::System.ComponentModel.DefaultValue("")]
        public string Name { get; set; } = "";

        [global::ProtoBuf.ProtoMember(2, Name = @"attrs")]
        [global::ProtoBuf.ProtoMap]
        public global::System.Collections.Generic.Dictionary<string, long> Attrs { get; } = new global::System.Collections.Generic.Dictionary<string, long>();

        [global::ProtoBuf.ProtoMember(3, Name = @"category")]
        public Kind Category { get; set; }

        [global::ProtoBuf.ProtoContract(Name = @"kind")]
        public enum Kind
        {
            [global::ProtoBuf.ProtoEnum(Name = @"unknown", Value = 0)]
            Unknown = 0,
            [global::ProtoBuf.ProtoEnum(Name = @"default", Value = 1)]
            [global::System.Obsolete]
            Default = 1,
        }

    }

}

#pragma warning restore CS1591, CS0612, CS3021
"#
        );
    }

    #[test]
    fn test_no_namespace_without_package() {
        let mut f = file("bare.proto", "", "proto2");
        let mut e = enumeration("event", &[("new", 0)]);
        e.options = Some(EnumOptions {
            deprecated: Some(true),
            ..Default::default()
        });
        f.enum_type.push(e);

        let generator = Generator::csharp().with_config(
            GeneratorConfig::new().naming(crate::codegen::NamingStyle::Original).indent_str("\t"),
        );
        let generated = generator.generate(&[f]).unwrap();
        assert_eq!(
            generated[0].content,
            "// This file was generated by a tool; you should avoid making direct changes.\n\
             // Consider using 'partial classes' to extend these types\n\
             // Input: bare.proto\n\
             \n\
             #pragma warning disable CS1591, CS0612, CS3021\n\
             \n\
             [global::ProtoBuf.ProtoContract(Name = @\"event\")]\n\
             [global::System.Obsolete]\n\
             public enum @event\n\
             {\n\
             \t[global::ProtoBuf.ProtoEnum(Name = @\"new\", Value = 0)]\n\
             \t@new = 0,\n\
             }\n\
             \n\
             #pragma warning restore CS1591, CS0612, CS3021\n"
        );
    }

    #[test]
    fn test_namespace_does_not_leak_across_files() {
        let first = file("a.proto", "alpha", "proto3");
        let second = file("b.proto", "", "proto3");
        let generated = Generator::csharp().generate(&[first, second]).unwrap();

        assert!(generated[0].content.contains("namespace alpha"));
        assert!(!generated[1].content.contains("namespace"));
        assert!(!generated[1].content.contains('}'));
    }

    #[test]
    fn test_keyword_type_references_are_escaped() {
        let holder = message(
            "holder",
            vec![
                typed_field("parent", 1, Type::Message, Label::Optional, ".kw.object"),
                with_default(typed_field("kind", 2, Type::Enum, Label::Optional, ".kw.event"), "A"),
                with_default(typed_field("fallback", 3, Type::Enum, Label::Optional, ".kw.event"), "default"),
                typed_field("items", 4, Type::Message, Label::Repeated, ".kw.object"),
            ],
        );
        let mut f = file("kw.proto", "kw", "proto2");
        f.message_type.push(message("object", vec![]));
        f.message_type.push(holder);
        f.enum_type.push(enumeration("event", &[("A", 0), ("default", 1)]));

        let generator = Generator::csharp()
            .with_config(GeneratorConfig::new().naming(crate::codegen::NamingStyle::Original));
        let content = &generator.generate(&[f]).unwrap()[0].content;

        assert!(content.contains("public partial class @object"));
        assert!(content.contains("public enum @event"));
        assert!(content.contains("public @object parent { get; set; }"));
        assert!(content.contains("public @event kind\n"));
        assert!(content.contains("get { return __pbn__kind ?? @event.A; }"));
        assert!(content.contains("private @event? __pbn__kind;"));
        assert!(content.contains("get { return __pbn__fallback ?? @event.@default; }"));
        assert!(content.contains("List<@object> items { get; }"));
        assert!(!content.contains(" object "));
        assert!(!content.contains(" event "));
    }

    #[test]
    fn test_shared_oneof_slot_across_message() {
        let mut msg = message(
            "event_envelope",
            vec![
                field("id", 1, Type::Int32, Label::Optional),
                in_oneof(field("created", 2, Type::Int64, Label::Optional), 0),
                field("tags", 3, Type::String, Label::Repeated),
                in_oneof(field("deleted", 4, Type::Bool, Label::Optional), 0),
            ],
        );
        msg.oneof_decl.push(oneof("change"));
        let files: Vec<FileDescriptorProto> = {
            let mut f = file("e.proto", "ev", "proto3");
            f.message_type.push(msg);
            vec![f]
        };

        let content = &Generator::csharp().generate(&files).unwrap()[0].content;
        let slot = "private global::ProtoBuf.DiscriminatedUnion64 __pbn__change;";
        assert_eq!(content.matches(slot).count(), 1);

        let slot_at = content.find(slot).unwrap();
        assert!(content.find("public long Created").unwrap() < slot_at);
        assert!(slot_at < content.find("Tags").unwrap());
        assert!(content.contains("public void ResetDeleted() => global::ProtoBuf.DiscriminatedUnion64.Reset(ref __pbn__change, 4);"));
    }
}
