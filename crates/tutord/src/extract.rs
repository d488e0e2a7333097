//! Attached-document text extraction.
//!
//! Only plain-text-like payloads are handled. An unsupported or unreadable
//! file never fails the request: the route swaps in a user-facing message
//! explaining what to do instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("could not read file: {0}")]
    Unreadable(String),
}

pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], mime_hint: Option<&str>) -> Result<String, ExtractError>;
}

/// Extractor for text payloads (plain text, markdown, code, JSON).
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], mime_hint: Option<&str>) -> Result<String, ExtractError> {
        if let Some(mime) = mime_hint {
            let mime = mime.split(';').next().unwrap_or(mime).trim();
            let textual = mime.starts_with("text/")
                || mime == "application/json"
                || mime == "application/xml"
                || mime == "application/javascript";
            if !textual {
                return Err(ExtractError::Unsupported(mime.to_string()));
            }
        }

        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(ExtractError::Unreadable("not valid UTF-8".to_string())),
        }
    }
}

/// Message shown to the student when their attachment cannot be used.
pub fn extraction_failure_message(file_name: &str, err: &ExtractError) -> String {
    match err {
        ExtractError::Unsupported(mime) => format!(
            "I can't read '{}' ({}) yet. Please paste the relevant text \
             into the chat, or attach it as a plain text file.",
            file_name, mime
        ),
        ExtractError::Unreadable(reason) => format!(
            "I couldn't read '{}' ({}). The file may be corrupted; \
             try re-saving it as plain text and attaching it again.",
            file_name, reason
        ),
    }
}
