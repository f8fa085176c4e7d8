//! Rewriting outgoing request bodies
//!
//! A host intercepts a request body before it is sent. If the body is a
//! JSON object carrying a non-empty `message` string, the message is
//! compiled and replaced by the rendered document; anything else passes
//! through untouched. On failure the host should keep the user's original
//! text rather than send a half-processed body.

use crate::compiler::{CompileError, Compiler};
use crate::eval::ExpressionEvaluator;
use serde_json::Value as Json;
use thiserror::Error;

/// Field holding the user's markup
pub const MESSAGE_FIELD: &str = "message";

/// Payload rewrite error
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("failed to encode rewritten payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to compile message: {0}")]
    Compile(#[from] CompileError),
}

/// Compile the `message` field of a JSON request body
///
/// Returns `Ok(None)` when the body needs no rewrite: it is not JSON, not
/// an object, or has no non-empty string `message`.
pub fn rewrite<E: ExpressionEvaluator>(
    body: &str,
    compiler: &Compiler<'_, E>,
) -> Result<Option<String>, PayloadError> {
    let Ok(mut json) = serde_json::from_str::<Json>(body) else {
        log::debug!("payload is not JSON; passing through");
        return Ok(None);
    };

    let Some(Json::String(message)) = json.get(MESSAGE_FIELD) else {
        return Ok(None);
    };
    if message.is_empty() {
        return Ok(None);
    }

    let rendered = match compiler.compile_document(message) {
        Ok(rendered) => rendered,
        Err(err) => {
            log::warn!("keeping original payload: {}", err);
            return Err(err.into());
        }
    };

    json[MESSAGE_FIELD] = Json::String(rendered);
    Ok(Some(serde_json::to_string(&json)?))
}
