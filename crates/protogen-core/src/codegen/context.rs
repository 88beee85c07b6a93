use super::names::NameNormalizer;
use super::writer::CodeWriter;
use crate::descriptor::{ProtoSyntax, TypeIndex};
use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};

/// Everything a backend hook needs while rendering one file
pub struct GeneratorContext<'a> {
    /// The file being rendered
    pub file: &'a FileDescriptorProto,
    /// Syntax of `file`
    pub syntax: ProtoSyntax,
    /// Cross-reference lookup over the whole input set
    pub index: &'a TypeIndex<'a>,
    /// Identifier normalization policy
    pub names: &'a dyn NameNormalizer,
    /// Output sink for this file only
    pub out: CodeWriter<'a>,
}

impl<'a> GeneratorContext<'a> {
    /// Looks up a referenced message; `None` when the reference is unresolved
    pub fn find_message(&self, type_name: &str) -> Option<&'a DescriptorProto> {
        self.index.find_message(type_name)
    }

    /// Looks up a referenced enum; `None` when the reference is unresolved
    pub fn find_enum(&self, type_name: &str) -> Option<&'a EnumDescriptorProto> {
        self.index.find_enum(type_name)
    }
}
