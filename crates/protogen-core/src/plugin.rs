//! protoc plugin protocol.
//!
//! `protoc` writes a serialized `CodeGeneratorRequest` to the plugin's stdin
//! and expects a `CodeGeneratorResponse` on stdout. Problems with the request
//! are reported through the response's `error` field; the plugin process
//! itself still exits successfully.

use crate::codegen::{CodeGenerator, Generator};
use crate::error::Result;
use prost::Message;
use prost_types::compiler::code_generator_response::{Feature, File};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use tracing::{debug, warn};

/// Decodes a serialized `CodeGeneratorRequest`
pub fn decode_request(data: &[u8]) -> Result<CodeGeneratorRequest> {
    Ok(CodeGeneratorRequest::decode(data)?)
}

/// Generates every `file_to_generate` of the request.
///
/// Options named in the request parameter override the generator's config.
pub fn respond<G: CodeGenerator + Clone>(
    generator: &Generator<G>,
    request: &CodeGeneratorRequest,
) -> CodeGeneratorResponse {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    let generator = match request.parameter.as_deref() {
        Some(parameter) if !parameter.trim().is_empty() => {
            match generator.config().clone().with_parameter(parameter) {
                Ok(config) => generator.clone().with_config(config),
                Err(e) => {
                    warn!("rejecting plugin request: {}", e);
                    response.error = Some(e.to_string());
                    return response;
                }
            }
        }
        _ => generator.clone(),
    };

    debug!(
        "plugin request: {} file(s) to generate out of {}",
        request.file_to_generate.len(),
        request.proto_file.len()
    );

    match generator.generate_selected(&request.proto_file, &request.file_to_generate) {
        Ok(files) => {
            response.file = files
                .into_iter()
                .map(|f| File {
                    name: Some(f.name),
                    content: Some(f.content),
                    ..Default::default()
                })
                .collect();
        }
        Err(e) => {
            warn!("plugin generation failed: {}", e);
            response.error = Some(e.to_string());
        }
    }

    response
}
