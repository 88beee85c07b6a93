//! Default value literals for `optional` fields.

use super::keywords::escape;
use super::types::resolve;
use crate::codegen::GeneratorContext;
use crate::descriptor::is_message_like;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::FieldDescriptorProto;

/// Renders the declared default of an `optional` scalar or enum field as a
/// C# expression.
///
/// String fields always get a literal (`""` when nothing is declared). Other
/// kinds return `None` without a declared default, as does every non-optional
/// or message-typed field.
pub fn render_default(ctx: &GeneratorContext<'_>, field: &FieldDescriptorProto) -> Option<String> {
    if field.label() != Label::Optional || is_message_like(field) {
        return None;
    }
    let declared = field.default_value.as_deref();

    match field.r#type() {
        Type::String => Some(match declared {
            None | Some("") => "\"\"".to_string(),
            Some(text) => verbatim_string(text),
        }),
        Type::Double => declared.map(|v| float_literal(v, "double")),
        Type::Float => declared.map(|v| float_literal(v, "float")),
        Type::Enum => {
            let literal = declared.filter(|v| !v.trim().is_empty())?;
            Some(enum_literal(ctx, field, literal))
        }
        _ => declared.filter(|v| !v.trim().is_empty()).map(str::to_string),
    }
}

/// C# verbatim string: only `"` needs escaping, by doubling
fn verbatim_string(text: &str) -> String {
    format!("@\"{}\"", text.replace('"', "\"\""))
}

fn float_literal(value: &str, width: &str) -> String {
    match value {
        "inf" => format!("{}.PositiveInfinity", width),
        "-inf" => format!("{}.NegativeInfinity", width),
        "nan" => format!("{}.NaN", width),
        other => other.to_string(),
    }
}

fn enum_literal(ctx: &GeneratorContext<'_>, field: &FieldDescriptorProto, literal: &str) -> String {
    let enum_name = resolve(ctx, field).name;
    let value_name = ctx
        .find_enum(field.type_name())
        .and_then(|e| e.value.iter().find(|v| v.name() == literal))
        .map(|v| ctx.names.enum_value_name(v))
        .unwrap_or_else(|| literal.to_string());
    format!("{}.{}", enum_name, escape(&value_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{CodeWriter, NamingStyle};
    use crate::descriptor::{ProtoSyntax, TypeIndex};
    use crate::test_util::{enumeration, field, file, typed_field, with_default};
    use prost_types::FileDescriptorProto;

    fn render(field: &FieldDescriptorProto) -> Option<String> {
        let mut f = file("d.proto", "pkg", "proto2");
        f.enum_type.push(enumeration("mood", &[("MOOD_HAPPY", 0), ("MOOD_SAD", 1)]));
        let files: Vec<FileDescriptorProto> = vec![f];
        let index = TypeIndex::new(&files);
        let mut sink = String::new();
        let ctx = GeneratorContext {
            file: &files[0],
            syntax: ProtoSyntax::Proto2,
            index: &index,
            names: NamingStyle::Auto.normalizer(),
            out: CodeWriter::new(&mut sink, "    "),
        };
        render_default(&ctx, field)
    }

    #[test]
    fn test_string_defaults() {
        let s = field("s", 1, Type::String, Label::Optional);
        assert_eq!(render(&s).as_deref(), Some("\"\""));
        assert_eq!(render(&with_default(s.clone(), "")).as_deref(), Some("\"\""));
        assert_eq!(
            render(&with_default(s, "say \"hi\"")).as_deref(),
            Some("@\"say \"\"hi\"\"\"")
        );
    }

    #[test]
    fn test_float_specials() {
        let d = field("d", 1, Type::Double, Label::Optional);
        assert_eq!(render(&with_default(d.clone(), "inf")).as_deref(), Some("double.PositiveInfinity"));
        assert_eq!(render(&with_default(d.clone(), "-inf")).as_deref(), Some("double.NegativeInfinity"));
        assert_eq!(render(&with_default(d.clone(), "nan")).as_deref(), Some("double.NaN"));
        assert_eq!(render(&with_default(d.clone(), "1.5")).as_deref(), Some("1.5"));
        assert_eq!(render(&d), None);

        let f = field("f", 2, Type::Float, Label::Optional);
        assert_eq!(render(&with_default(f.clone(), "inf")).as_deref(), Some("float.PositiveInfinity"));
        assert_eq!(render(&with_default(f.clone(), "-inf")).as_deref(), Some("float.NegativeInfinity"));
        assert_eq!(render(&with_default(f, "nan")).as_deref(), Some("float.NaN"));
    }

    #[test]
    fn test_enum_defaults() {
        let e = typed_field("m", 1, Type::Enum, Label::Optional, ".pkg.mood");
        assert_eq!(render(&with_default(e.clone(), "MOOD_SAD")).as_deref(), Some("Mood.MOODSAD"));
        assert_eq!(render(&with_default(e.clone(), "MOOD_ANGRY")).as_deref(), Some("Mood.MOOD_ANGRY"));
        assert_eq!(render(&e), None);

        let missing = typed_field("m", 1, Type::Enum, Label::Optional, ".pkg.Unknown");
        assert_eq!(render(&with_default(missing, "X")).as_deref(), Some(".pkg.Unknown.X"));
    }

    #[test]
    fn test_passthrough_and_label_rules() {
        let i = field("i", 1, Type::Int64, Label::Optional);
        assert_eq!(render(&with_default(i, "-42")).as_deref(), Some("-42"));

        let b = field("b", 2, Type::Bool, Label::Optional);
        assert_eq!(render(&with_default(b, "true")).as_deref(), Some("true"));

        let required = field("r", 3, Type::Int32, Label::Required);
        assert_eq!(render(&with_default(required, "7")), None);

        let repeated = field("names", 4, Type::String, Label::Repeated);
        assert_eq!(render(&repeated), None);

        let msg = typed_field("m", 5, Type::Message, Label::Optional, ".pkg.Other");
        assert_eq!(render(&msg), None);
    }
}
