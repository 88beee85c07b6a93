//! Descriptor helpers shared by the driver and the backends.
//!
//! Descriptors are the `google.protobuf` descriptor messages from
//! `prost-types`. They are treated as read-only snapshots: nothing in this
//! crate mutates them once decoded.

mod index;

use crate::error::{Error, Result};
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet,
};

pub use index::TypeIndex;

/// Proto syntax version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoSyntax {
    /// Proto2 syntax
    Proto2,
    /// Proto3 syntax
    Proto3,
}

impl ProtoSyntax {
    /// Returns the syntax declaration string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtoSyntax::Proto2 => "proto2",
            ProtoSyntax::Proto3 => "proto3",
        }
    }

    /// Resolves the syntax of a file, treating anything unknown as proto2
    pub fn of_file(file: &FileDescriptorProto) -> Self {
        match ProtoSyntax::try_from(file.syntax()) {
            Ok(syntax) => syntax,
            Err(e) => {
                tracing::warn!("{}: {}, generating as proto2", file.name(), e);
                ProtoSyntax::Proto2
            }
        }
    }
}

impl TryFrom<&str> for ProtoSyntax {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "" | "proto2" => Ok(ProtoSyntax::Proto2),
            "proto3" => Ok(ProtoSyntax::Proto3),
            _ => Err(Error::UnsupportedSyntax {
                syntax: value.to_string(),
            }),
        }
    }
}

/// Decodes a serialized `FileDescriptorSet` (`protoc --descriptor_set_out`)
pub fn decode_file_set(data: &[u8]) -> Result<Vec<FileDescriptorProto>> {
    let set = FileDescriptorSet::decode(data)?;
    if set.file.is_empty() {
        return Err(Error::NoFilesFound);
    }
    Ok(set.file)
}

/// Returns true for the compiler-synthesized entry type behind a `map<K, V>` field
pub fn is_map_entry(message: &DescriptorProto) -> bool {
    message
        .options
        .as_ref()
        .and_then(|o| o.map_entry)
        .unwrap_or(false)
}

/// Marks descriptors whose options carry a `deprecated` flag
pub trait Deprecation {
    /// Whether the descriptor is marked `[deprecated = true]`
    fn is_deprecated(&self) -> bool;
}

impl Deprecation for DescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().and_then(|o| o.deprecated).unwrap_or(false)
    }
}

impl Deprecation for FieldDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().and_then(|o| o.deprecated).unwrap_or(false)
    }
}

impl Deprecation for EnumDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().and_then(|o| o.deprecated).unwrap_or(false)
    }
}

impl Deprecation for EnumValueDescriptorProto {
    fn is_deprecated(&self) -> bool {
        self.options.as_ref().and_then(|o| o.deprecated).unwrap_or(false)
    }
}

/// Message and group fields carry no scalar default literal
pub fn is_message_like(field: &FieldDescriptorProto) -> bool {
    matches!(field.r#type(), Type::Message | Type::Group)
}

/// Scalar kinds that may use packed encoding when repeated
pub fn is_packable(field: &FieldDescriptorProto) -> bool {
    !matches!(
        field.r#type(),
        Type::String | Type::Bytes | Type::Message | Type::Group
    )
}

/// Whether the field is repeated and asks for packed encoding
pub fn is_packed(field: &FieldDescriptorProto) -> bool {
    field.label() == Label::Repeated
        && is_packable(field)
        && field.options.as_ref().and_then(|o| o.packed).unwrap_or(false)
}

/// Output file name for a schema file: `.proto` replaced by `extension`
pub fn output_file_name(file: &FileDescriptorProto, extension: &str) -> String {
    let name = file.name();
    let stem = name.strip_suffix(".proto").unwrap_or(name);
    format!("{}.{}", stem, extension)
}
