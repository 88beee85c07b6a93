//! Error types for the protogen-core library.
//!
//! Rendering never fails on schema content: unresolved references and
//! unsupported field types degrade to literal fallbacks. The variants here
//! cover decoding inputs, writing outputs, and plugin-protocol problems.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for protogen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all protogen operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Generated file name would escape the output directory
    #[error("path traversal detected: '{path}' would escape output directory")]
    PathTraversal {
        /// The suspicious path
        path: PathBuf,
    },

    /// Failed to decode a FileDescriptorSet or CodeGeneratorRequest
    #[error("failed to decode descriptor input: {0}")]
    DescriptorDecode(#[from] prost::DecodeError),

    /// Input contained no file descriptors
    #[error("no file descriptors found in input")]
    NoFilesFound,

    /// A file requested for generation is not part of the input set
    #[error("file '{name}' was requested for generation but is not in the descriptor set")]
    UnknownFile {
        /// Name of the missing file
        name: String,
    },

    /// Unsupported proto syntax version
    #[error("unsupported proto syntax: '{syntax}'")]
    UnsupportedSyntax {
        /// The unsupported syntax string
        syntax: String,
    },

    /// Malformed generator parameter (plugin `parameter` string)
    #[error("invalid generator parameter '{parameter}': {details}")]
    InvalidParameter {
        /// The offending `key=value` pair
        parameter: String,
        /// Why it was rejected
        details: String,
    },

    /// The output sink rejected a write
    #[error("failed to render output: {0}")]
    Render(#[from] std::fmt::Error),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Creates a new unknown-file error
    pub fn unknown_file(name: impl Into<String>) -> Self {
        Self::UnknownFile { name: name.into() }
    }

    /// Creates a new invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            details: details.into(),
        }
    }

    /// Returns true if this error only affects one input and the caller may
    /// continue with the rest
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. }
                | Self::DescriptorDecode(_)
                | Self::NoFilesFound
                | Self::UnsupportedSyntax { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::path_traversal("../../etc/passwd.cs");
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../../etc/passwd.cs"));

        let err = Error::invalid_parameter("names=shouty", "expected 'auto' or 'original'");
        assert!(err.to_string().contains("names=shouty"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::NoFilesFound.is_recoverable());
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(Error::file_read("schema.pb", missing).is_recoverable());
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::file_write("out/a.cs", denied).is_recoverable());
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!Error::directory_create("out", denied).is_recoverable());
        assert!(!Error::path_traversal("/test").is_recoverable());
        assert!(!Error::unknown_file("a.proto").is_recoverable());
    }
}
