//! Field declaration shapes.
//!
//! Every field is classified into exactly one [`FieldShape`] and rendered as
//! a `ProtoMember` annotation followed by the member declaration. Repeated
//! fields further split into dictionary, array, and list containers.

use super::defaults::render_default;
use super::keywords::escape;
use super::types::{resolve, use_array, ResolvedType};
use super::write_options;
use crate::codegen::{GeneratorContext, OneofSet, OneofStub};
use crate::descriptor::{is_message_like, is_packed, ProtoSyntax};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::FieldDescriptorProto;
use std::fmt::{self, Write};
use tracing::trace;

/// Prefix of compiler-private backing members
pub const FIELD_PREFIX: &str = "__pbn__";

const LIST_TYPE: &str = "global::System.Collections.Generic.List";
const DICTIONARY_TYPE: &str = "global::System.Collections.Generic.Dictionary";

/// How a field is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `repeated` field or map
    Repeated,
    /// Member of a oneof with at least two members
    OneofMember,
    /// proto2 `optional` scalar with a nullable backing field
    ExplicitPresence,
    /// Auto-property
    Plain,
}

impl FieldShape {
    /// Picks the shape of `field`; `in_union` says whether it belongs to a
    /// oneof with at least two members
    pub fn classify(field: &FieldDescriptorProto, syntax: ProtoSyntax, in_union: bool) -> Self {
        if field.label() == Label::Repeated {
            FieldShape::Repeated
        } else if in_union {
            FieldShape::OneofMember
        } else if field.label() == Label::Optional
            && syntax == ProtoSyntax::Proto2
            && !is_message_like(field)
        {
            FieldShape::ExplicitPresence
        } else {
            FieldShape::Plain
        }
    }
}

/// Renders one field of the current message
pub(super) fn write_field(
    ctx: &mut GeneratorContext<'_>,
    field: &FieldDescriptorProto,
    oneofs: &mut OneofSet,
) -> fmt::Result {
    let name = ctx.names.field_name(field);
    let oneof = oneofs.union_of(field);
    let shape = FieldShape::classify(field, ctx.syntax, oneof.is_some());
    trace!("field {} ({}) as {:?}", field.name(), field.number(), shape);

    let default = render_default(ctx, field);
    let resolved = resolve(ctx, field);

    write!(
        ctx.out,
        "[global::ProtoBuf.ProtoMember({}, Name = @\"{}\"",
        field.number(),
        field.name()
    )?;
    if let Some(data_format) = resolved.data_format {
        write!(ctx.out, ", DataFormat = global::ProtoBuf.DataFormat.{}", data_format)?;
    }
    if is_packed(field) {
        write!(ctx.out, ", IsPacked = true")?;
    }
    if field.label() == Label::Required {
        write!(ctx.out, ", IsRequired = true")?;
    }
    writeln!(ctx.out, ")]")?;

    if let Some(value) = default.as_deref() {
        if !matches!(shape, FieldShape::Repeated | FieldShape::ExplicitPresence) {
            writeln!(ctx.out, "[global::System.ComponentModel.DefaultValue({})]", value)?;
        }
    }
    write_options(ctx, field)?;

    match shape {
        FieldShape::Repeated => write_container(ctx, field, &name, &resolved)?,
        FieldShape::OneofMember => match oneof {
            Some(stub) => write_oneof_member(ctx, field, &name, &resolved, default.as_deref(), stub)?,
            None => write_plain(ctx, &name, &resolved, default.as_deref())?,
        },
        FieldShape::ExplicitPresence => {
            write_explicit_presence(ctx, field, &name, &resolved, default.as_deref())?
        }
        FieldShape::Plain => write_plain(ctx, &name, &resolved, default.as_deref())?,
    }
    writeln!(ctx.out)
}

fn write_plain(
    ctx: &mut GeneratorContext<'_>,
    name: &str,
    resolved: &ResolvedType,
    default: Option<&str>,
) -> fmt::Result {
    write!(ctx.out, "public {} {} {{ get; set; }}", resolved.name, escape(name))?;
    if let Some(value) = default {
        write!(ctx.out, " = {};", value)?;
    }
    writeln!(ctx.out)
}

fn write_container(
    ctx: &mut GeneratorContext<'_>,
    field: &FieldDescriptorProto,
    name: &str,
    resolved: &ResolvedType,
) -> fmt::Result {
    if resolved.is_map && write_map(ctx, field, name)? {
        return Ok(());
    }

    if use_array(field) {
        writeln!(ctx.out, "public {}[] {} {{ get; set; }}", resolved.name, escape(name))
    } else {
        writeln!(
            ctx.out,
            "public {list}<{ty}> {name} {{ get; }} = new {list}<{ty}>();",
            list = LIST_TYPE,
            ty = resolved.name,
            name = escape(name),
        )
    }
}

/// Writes a dictionary for a map field; `false` when the entry message is
/// missing its key or value field
fn write_map(ctx: &mut GeneratorContext<'_>, field: &FieldDescriptorProto, name: &str) -> Result<bool, fmt::Error> {
    let Some(entry) = ctx.find_message(field.type_name()) else {
        return Ok(false);
    };
    let key = entry.field.iter().find(|f| f.number() == 1);
    let value = entry.field.iter().find(|f| f.number() == 2);
    let (Some(key), Some(value)) = (key, value) else {
        trace!("map entry {} lacks key or value, emitting as list", field.type_name());
        return Ok(false);
    };

    let key = resolve(ctx, key);
    let value = resolve(ctx, value);

    let mut formats = Vec::new();
    if let Some(data_format) = key.data_format {
        formats.push(format!("KeyFormat = global::ProtoBuf.DataFormat.{}", data_format));
    }
    if let Some(data_format) = value.data_format {
        formats.push(format!("ValueFormat = global::ProtoBuf.DataFormat.{}", data_format));
    }
    if formats.is_empty() {
        writeln!(ctx.out, "[global::ProtoBuf.ProtoMap]")?;
    } else {
        writeln!(ctx.out, "[global::ProtoBuf.ProtoMap({})]", formats.join(", "))?;
    }

    writeln!(
        ctx.out,
        "public {dict}<{k}, {v}> {name} {{ get; }} = new {dict}<{k}, {v}>();",
        dict = DICTIONARY_TYPE,
        k = key.name,
        v = value.name,
        name = escape(name),
    )?;
    Ok(true)
}

fn write_oneof_member(
    ctx: &mut GeneratorContext<'_>,
    field: &FieldDescriptorProto,
    name: &str,
    resolved: &ResolvedType,
    default: Option<&str>,
    stub: &mut OneofStub,
) -> fmt::Result {
    let type_name = &resolved.name;
    let number = field.number();
    let slot = format!("{}{}", FIELD_PREFIX, stub.name());
    let storage = Storage::of(field.r#type());
    let union = union_type(stub);
    let fallback = match default {
        Some(value) => value.to_string(),
        None => format!("default({})", type_name),
    };

    writeln!(ctx.out, "public {} {}", type_name, escape(name))?;
    writeln!(ctx.out, "{{")?;
    ctx.out.indent();
    if storage == Storage::Object || field.r#type() == Type::Enum {
        writeln!(
            ctx.out,
            "get {{ return {slot}.Is({number}) ? (({ty}){slot}.{storage}) : {fallback}; }}",
            ty = type_name,
            storage = storage.as_str(),
        )?;
    } else {
        writeln!(
            ctx.out,
            "get {{ return {slot}.Is({number}) ? {slot}.{storage} : {fallback}; }}",
            storage = storage.as_str(),
        )?;
    }
    let value = if field.r#type() == Type::Enum { "(int)value" } else { "value" };
    writeln!(
        ctx.out,
        "set {{ {slot} = new global::ProtoBuf.{union}({number}, {value}); }}"
    )?;
    ctx.out.outdent();
    writeln!(ctx.out, "}}")?;

    writeln!(ctx.out, "public bool ShouldSerialize{name}() => {slot}.Is({number});")?;
    writeln!(
        ctx.out,
        "public void Reset{name}() => global::ProtoBuf.{union}.Reset(ref {slot}, {number});"
    )?;

    if stub.claim_slot() {
        writeln!(ctx.out)?;
        writeln!(ctx.out, "private global::ProtoBuf.{} {};", union, slot)?;
    }
    Ok(())
}

fn write_explicit_presence(
    ctx: &mut GeneratorContext<'_>,
    field: &FieldDescriptorProto,
    name: &str,
    resolved: &ResolvedType,
    default: Option<&str>,
) -> fmt::Result {
    let type_name = &resolved.name;
    let backing = format!("{}{}", FIELD_PREFIX, name);
    // string and byte[] are already nullable
    let is_ref = matches!(field.r#type(), Type::String | Type::Bytes);
    let backing_type = if is_ref {
        type_name.clone()
    } else {
        format!("{}?", type_name)
    };

    writeln!(ctx.out, "public {} {}", type_name, escape(name))?;
    writeln!(ctx.out, "{{")?;
    ctx.out.indent();
    write!(ctx.out, "get {{ return {}", backing)?;
    match default {
        Some(value) => write!(ctx.out, " ?? {}", value)?,
        None if !is_ref => write!(ctx.out, ".GetValueOrDefault()")?,
        None => {}
    }
    writeln!(ctx.out, "; }}")?;
    writeln!(ctx.out, "set {{ {} = value; }}", backing)?;
    ctx.out.outdent();
    writeln!(ctx.out, "}}")?;

    writeln!(ctx.out, "public bool ShouldSerialize{}() => {} != null;", name, backing)?;
    writeln!(ctx.out, "public void Reset{}() => {} = null;", name, backing)?;
    writeln!(ctx.out, "private {} {};", backing_type, backing)
}

/// Payload member of a `DiscriminatedUnion*` holding a given field kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Boolean,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Object,
}

impl Storage {
    fn of(ty: Type) -> Self {
        match ty {
            Type::Bool => Storage::Boolean,
            Type::Int32 | Type::Sint32 | Type::Sfixed32 | Type::Enum => Storage::Int32,
            Type::Uint32 | Type::Fixed32 => Storage::UInt32,
            Type::Int64 | Type::Sint64 | Type::Sfixed64 => Storage::Int64,
            Type::Uint64 | Type::Fixed64 => Storage::UInt64,
            Type::Float => Storage::Single,
            Type::Double => Storage::Double,
            Type::String | Type::Bytes | Type::Message | Type::Group => Storage::Object,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Storage::Boolean => "Boolean",
            Storage::Int32 => "Int32",
            Storage::UInt32 => "UInt32",
            Storage::Int64 => "Int64",
            Storage::UInt64 => "UInt64",
            Storage::Single => "Single",
            Storage::Double => "Double",
            Storage::Object => "Object",
        }
    }

    fn is_wide(&self) -> bool {
        matches!(self, Storage::Int64 | Storage::UInt64 | Storage::Double)
    }
}

/// Narrowest `DiscriminatedUnion*` able to hold every member of the oneof
fn union_type(stub: &OneofStub) -> &'static str {
    let storages: Vec<Storage> = stub.member_types().iter().map(|&t| Storage::of(t)).collect();
    let has_object = storages.contains(&Storage::Object);
    let has_wide = storages.iter().any(Storage::is_wide);
    let has_narrow = storages.iter().any(|s| *s != Storage::Object && !s.is_wide());

    match (has_wide, has_narrow, has_object) {
        (true, _, false) => "DiscriminatedUnion64",
        (true, _, true) => "DiscriminatedUnion64Object",
        (false, true, false) => "DiscriminatedUnion32",
        (false, true, true) => "DiscriminatedUnion32Object",
        (false, false, _) => "DiscriminatedUnionObject",
    }
}
