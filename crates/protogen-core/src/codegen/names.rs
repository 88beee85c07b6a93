//! Identifier normalization applied before backend escaping.

use prost_types::{DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto};

/// Maps schema names to rendered identifiers.
///
/// Normalizers never escape reserved words; that is the backend's job.
pub trait NameNormalizer: Send + Sync {
    /// Rendered name of a message type
    fn message_name(&self, message: &DescriptorProto) -> String;

    /// Rendered name of an enum type
    fn enum_name(&self, enum_type: &EnumDescriptorProto) -> String;

    /// Rendered name of an enum value
    fn enum_value_name(&self, value: &EnumValueDescriptorProto) -> String;

    /// Rendered name of a field
    fn field_name(&self, field: &FieldDescriptorProto) -> String;
}

/// Selects a [`NameNormalizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStyle {
    /// `snake_case` schema names become `PascalCase`
    #[default]
    Auto,
    /// Schema names are used verbatim
    Original,
}

impl NamingStyle {
    /// Returns the normalizer implementing this style
    pub fn normalizer(self) -> &'static dyn NameNormalizer {
        match self {
            NamingStyle::Auto => &PascalCaseNames,
            NamingStyle::Original => &OriginalNames,
        }
    }
}

/// Uses schema names as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct OriginalNames;

impl NameNormalizer for OriginalNames {
    fn message_name(&self, message: &DescriptorProto) -> String {
        message.name().to_string()
    }

    fn enum_name(&self, enum_type: &EnumDescriptorProto) -> String {
        enum_type.name().to_string()
    }

    fn enum_value_name(&self, value: &EnumValueDescriptorProto) -> String {
        value.name().to_string()
    }

    fn field_name(&self, field: &FieldDescriptorProto) -> String {
        field.name().to_string()
    }
}

/// Converts `snake_case` segments to `PascalCase`
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalCaseNames;

impl NameNormalizer for PascalCaseNames {
    fn message_name(&self, message: &DescriptorProto) -> String {
        to_pascal_case(message.name())
    }

    fn enum_name(&self, enum_type: &EnumDescriptorProto) -> String {
        to_pascal_case(enum_type.name())
    }

    fn enum_value_name(&self, value: &EnumValueDescriptorProto) -> String {
        to_pascal_case(value.name())
    }

    fn field_name(&self, field: &FieldDescriptorProto) -> String {
        to_pascal_case(field.name())
    }
}

/// Upper-cases the first character of every `_`-separated segment
pub fn to_pascal_case(name: &str) -> String {
    let pascal: String = name
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect();

    // all-underscore names would otherwise vanish
    if pascal.is_empty() {
        name.to_string()
    } else {
        pascal
    }
}
