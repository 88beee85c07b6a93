//! Backend hooks and the traversal driver.
//!
//! ## Architecture
//!
//! [`Generator`] owns traversal order. For every input file it:
//!
//! 1. Builds a [`GeneratorContext`] over a fresh output buffer
//! 2. Calls the backend's file header hook, keeping the returned scope value
//! 3. Visits top-level messages (fields, then nested types) and enums
//! 4. Hands the scope value back to the file footer hook
//!
//! Backends implement [`CodeGenerator`]; they are stateless renderers and
//! never drive traversal themselves. Map-entry messages are never visited as
//! classes: backends see them only through the field that references them.

mod context;
mod names;
mod oneof;
mod writer;

use crate::descriptor::{is_map_entry, output_file_name, ProtoSyntax, TypeIndex};
use crate::error::{Error, Result};
use prost_types::{DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto, FileDescriptorProto};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

pub use context::GeneratorContext;
pub use names::{to_pascal_case, NameNormalizer, NamingStyle, OriginalNames, PascalCaseNames};
pub use oneof::{OneofSet, OneofStub};
pub use writer::CodeWriter;

/// Configuration for code generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Indentation string (default: 4 spaces)
    pub indent_str: String,
    /// Identifier normalization policy
    pub naming: NamingStyle,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
            naming: NamingStyle::Auto,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Sets the naming style
    pub fn naming(mut self, naming: NamingStyle) -> Self {
        self.naming = naming;
        self
    }

    /// Parses a protoc plugin parameter string such as `names=original,indent=2`
    pub fn from_parameter(parameter: &str) -> Result<Self> {
        Self::default().with_parameter(parameter)
    }

    /// Applies the options named in a plugin parameter string over this config
    pub fn with_parameter(self, parameter: &str) -> Result<Self> {
        let mut config = self;
        for pair in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::invalid_parameter(pair, "expected key=value"))?;
            match key.trim() {
                "names" => {
                    config.naming = match value.trim() {
                        "auto" => NamingStyle::Auto,
                        "original" => NamingStyle::Original,
                        _ => {
                            return Err(Error::invalid_parameter(
                                pair,
                                "expected 'auto' or 'original'",
                            ))
                        }
                    }
                }
                "indent" => {
                    let width: usize = value
                        .trim()
                        .parse()
                        .map_err(|_| Error::invalid_parameter(pair, "expected a number of spaces"))?;
                    config.indent_str = " ".repeat(width);
                }
                _ => return Err(Error::invalid_parameter(pair, "unknown option")),
            }
        }
        Ok(config)
    }
}

/// A target-language backend.
///
/// Each hook renders one entity into `ctx.out`. The file header returns a
/// [`Self::FileScope`] value that the driver passes back, unchanged, to the
/// matching file footer; nothing else is carried between hooks except the
/// per-message [`OneofSet`].
pub trait CodeGenerator {
    /// Per-file value paired between header and footer
    type FileScope;

    /// Human-readable backend name
    fn name(&self) -> &'static str;

    /// Extension of generated files, without the dot
    fn file_extension(&self) -> &'static str;

    /// Guards an identifier against target-language reserved words
    fn escape<'n>(&self, identifier: &'n str) -> Cow<'n, str>;

    /// Opens a file; the returned scope is handed to [`Self::write_file_footer`]
    fn write_file_header(
        &self,
        ctx: &mut GeneratorContext<'_>,
    ) -> std::result::Result<Self::FileScope, fmt::Error>;

    /// Closes a file
    fn write_file_footer(&self, ctx: &mut GeneratorContext<'_>, scope: Self::FileScope) -> fmt::Result;

    /// Opens a message declaration
    fn write_message_header(&self, ctx: &mut GeneratorContext<'_>, message: &DescriptorProto) -> fmt::Result;

    /// Closes a message declaration
    fn write_message_footer(&self, ctx: &mut GeneratorContext<'_>, message: &DescriptorProto) -> fmt::Result;

    /// Renders one field of the current message
    fn write_field(
        &self,
        ctx: &mut GeneratorContext<'_>,
        field: &FieldDescriptorProto,
        oneofs: &mut OneofSet,
    ) -> fmt::Result;

    /// Opens an enum declaration
    fn write_enum_header(&self, ctx: &mut GeneratorContext<'_>, enum_type: &EnumDescriptorProto) -> fmt::Result;

    /// Renders one enum value
    fn write_enum_value(&self, ctx: &mut GeneratorContext<'_>, value: &EnumValueDescriptorProto) -> fmt::Result;

    /// Closes an enum declaration
    fn write_enum_footer(&self, ctx: &mut GeneratorContext<'_>, enum_type: &EnumDescriptorProto) -> fmt::Result;
}

/// One rendered source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Output path, relative to the output root
    pub name: String,
    /// Rendered source text
    pub content: String,
}

/// Drives a [`CodeGenerator`] over file descriptors
#[derive(Debug, Clone, Default)]
pub struct Generator<G> {
    backend: G,
    config: GeneratorConfig,
}

impl<G: CodeGenerator> Generator<G> {
    /// Creates a generator with the default config
    pub fn new(backend: G) -> Self {
        Self {
            backend,
            config: GeneratorConfig::default(),
        }
    }

    /// Replaces the config
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active config
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns the backend
    pub fn backend(&self) -> &G {
        &self.backend
    }

    /// Renders every file, indexing all of them for cross-references
    pub fn generate(&self, files: &[FileDescriptorProto]) -> Result<Vec<GeneratedFile>> {
        let index = TypeIndex::new(files);
        files
            .iter()
            .map(|file| self.generate_file(&index, file))
            .collect()
    }

    /// Renders only the named files, indexing all of them for cross-references
    pub fn generate_selected<S: AsRef<str>>(
        &self,
        files: &[FileDescriptorProto],
        targets: &[S],
    ) -> Result<Vec<GeneratedFile>> {
        let index = TypeIndex::new(files);
        targets
            .iter()
            .map(|target| {
                let file = index
                    .file(target.as_ref())
                    .ok_or_else(|| Error::unknown_file(target.as_ref()))?;
                self.generate_file(&index, file)
            })
            .collect()
    }

    /// Renders one file against an existing index
    pub fn generate_file(&self, index: &TypeIndex<'_>, file: &FileDescriptorProto) -> Result<GeneratedFile> {
        debug!("generating {} for {}", self.backend.name(), file.name());

        let mut content = String::new();
        {
            let mut ctx = GeneratorContext {
                file,
                syntax: ProtoSyntax::of_file(file),
                index,
                names: self.config.naming.normalizer(),
                out: CodeWriter::new(&mut content, &self.config.indent_str),
            };

            let scope = self.backend.write_file_header(&mut ctx)?;
            for message in &file.message_type {
                self.write_message(&mut ctx, message)?;
            }
            for enum_type in &file.enum_type {
                self.write_enum(&mut ctx, enum_type)?;
            }
            self.backend.write_file_footer(&mut ctx, scope)?;
        }

        Ok(GeneratedFile {
            name: output_file_name(file, self.backend.file_extension()),
            content,
        })
    }

    fn write_message(&self, ctx: &mut GeneratorContext<'_>, message: &DescriptorProto) -> fmt::Result {
        if is_map_entry(message) {
            trace!("skipping map entry {}", message.name());
            return Ok(());
        }

        self.backend.write_message_header(ctx, message)?;

        let mut oneofs = OneofSet::for_message(message);
        for field in &message.field {
            self.backend.write_field(ctx, field, &mut oneofs)?;
        }
        for nested in &message.nested_type {
            self.write_message(ctx, nested)?;
        }
        for enum_type in &message.enum_type {
            self.write_enum(ctx, enum_type)?;
        }

        self.backend.write_message_footer(ctx, message)
    }

    fn write_enum(&self, ctx: &mut GeneratorContext<'_>, enum_type: &EnumDescriptorProto) -> fmt::Result {
        self.backend.write_enum_header(ctx, enum_type)?;
        for value in &enum_type.value {
            self.backend.write_enum_value(ctx, value)?;
        }
        self.backend.write_enum_footer(ctx, enum_type)
    }
}
