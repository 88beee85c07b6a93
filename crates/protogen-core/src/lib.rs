//! # protogen-core
//!
//! Renders protobuf schema descriptors as C# sources for the protobuf-net
//! runtime.
//!
//! This crate provides:
//! - A cross-reference [`TypeIndex`] over decoded `FileDescriptorProto`s
//! - The [`Generator`] traversal driver and the [`CodeGenerator`] backend hooks
//! - The protobuf-net backend, [`CSharpCodeGenerator`], which decides the
//!   declaration shape of every field
//! - protoc plugin request handling in [`plugin`]
//!
//! ## Architecture
//!
//! - [`descriptor`]: descriptor helpers, syntax detection, type index
//! - [`codegen`]: backend trait, output sink, naming, oneof bookkeeping, driver
//! - [`csharp`]: the C# backend
//! - [`plugin`]: `CodeGeneratorRequest` to `CodeGeneratorResponse`
//! - [`error`]: error types
//!
//! ## Example
//!
//! ```no_run
//! use protogen_core::{decode_file_set, Generator};
//! use std::fs;
//!
//! // protoc --include_imports --descriptor_set_out=schema.pb schema.proto
//! let data = fs::read("schema.pb")?;
//! let files = decode_file_set(&data)?;
//!
//! for generated in Generator::csharp().generate(&files)? {
//!     println!("// {}\n{}", generated.name, generated.content);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Rendering is best-effort: references that cannot be resolved are emitted
//! verbatim instead of failing generation.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod codegen;
pub mod csharp;
pub mod descriptor;
pub mod error;
pub mod plugin;

#[cfg(test)]
mod test_util;

// Re-export primary types for convenience
pub use codegen::{CodeGenerator, GeneratedFile, Generator, GeneratorConfig, NamingStyle};
pub use csharp::CSharpCodeGenerator;
pub use descriptor::{decode_file_set, ProtoSyntax, TypeIndex};
pub use error::{Error, Result};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
