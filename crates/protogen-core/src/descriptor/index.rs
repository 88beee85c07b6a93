//! Cross-reference lookup over a set of file descriptors.

use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Index from fully-qualified type name (`.pkg.Outer.Inner`) to descriptor.
///
/// Built once per file set before generation. Fully-qualified names are
/// assumed to be globally unique; on a collision the first registration is
/// kept.
#[derive(Debug, Default)]
pub struct TypeIndex<'a> {
    files: Vec<&'a FileDescriptorProto>,
    messages: HashMap<String, &'a DescriptorProto>,
    enums: HashMap<String, &'a EnumDescriptorProto>,
}

impl<'a> TypeIndex<'a> {
    /// Indexes every message and enum, nested ones included
    pub fn new(files: impl IntoIterator<Item = &'a FileDescriptorProto>) -> Self {
        let mut index = Self::default();
        for file in files {
            index.add_file(file);
        }
        index
    }

    fn add_file(&mut self, file: &'a FileDescriptorProto) {
        let scope = if file.package().is_empty() {
            String::new()
        } else {
            format!(".{}", file.package())
        };

        for message in &file.message_type {
            self.add_message(&scope, message);
        }
        for enum_type in &file.enum_type {
            self.add_enum(&scope, enum_type);
        }
        self.files.push(file);
    }

    fn add_message(&mut self, scope: &str, message: &'a DescriptorProto) {
        let qualified = format!("{}.{}", scope, message.name());
        for nested in &message.nested_type {
            self.add_message(&qualified, nested);
        }
        for enum_type in &message.enum_type {
            self.add_enum(&qualified, enum_type);
        }

        trace!("indexed message {}", qualified);
        if self.messages.contains_key(&qualified) {
            warn!("duplicate message name {}, keeping first definition", qualified);
        } else {
            self.messages.insert(qualified, message);
        }
    }

    fn add_enum(&mut self, scope: &str, enum_type: &'a EnumDescriptorProto) {
        let qualified = format!("{}.{}", scope, enum_type.name());
        trace!("indexed enum {}", qualified);
        if self.enums.contains_key(&qualified) {
            warn!("duplicate enum name {}, keeping first definition", qualified);
        } else {
            self.enums.insert(qualified, enum_type);
        }
    }

    /// Looks up a message by fully-qualified name
    pub fn find_message(&self, name: &str) -> Option<&'a DescriptorProto> {
        lookup(&self.messages, name)
    }

    /// Looks up an enum by fully-qualified name
    pub fn find_enum(&self, name: &str) -> Option<&'a EnumDescriptorProto> {
        lookup(&self.enums, name)
    }

    /// Looks up an indexed file by its file name
    pub fn file(&self, name: &str) -> Option<&'a FileDescriptorProto> {
        self.files.iter().copied().find(|f| f.name() == name)
    }
}

fn lookup<'a, T>(table: &HashMap<String, &'a T>, name: &str) -> Option<&'a T> {
    if name.starts_with('.') {
        table.get(name).copied()
    } else {
        table.get(&format!(".{}", name)).copied()
    }
}
