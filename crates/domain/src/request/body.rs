//! HTTP Request body types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// HTTP request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// A JSON document, serialized at send time
    Json(Value),
    /// Raw text with an explicit content type
    Raw {
        /// The content type (e.g., "text/plain")
        content_type: String,
        /// The body text
        text: String,
    },
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub const fn none() -> Self {
        Self::None
    }

    /// Creates a JSON body.
    #[must_use]
    pub const fn json(value: Value) -> Self {
        Self::Json(value)
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Raw {
            content_type: "text/plain".to_string(),
            text: content.into(),
        }
    }

    /// Returns whether there is no body to send.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Returns the content type if applicable.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Json(_) => Some("application/json"),
            Self::Raw { content_type, .. } => Some(content_type),
        }
    }

    /// Serializes the body to the bytes that go on the wire.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBody` if the JSON value cannot be serialized.
    pub fn to_bytes(&self) -> DomainResult<Option<Vec<u8>>> {
        match self {
            Self::None => Ok(None),
            Self::Json(value) => serde_json::to_vec(value)
                .map(Some)
                .map_err(|e| DomainError::InvalidBody(e.to_string())),
            Self::Raw { text, .. } => Ok(Some(text.clone().into_bytes())),
        }
    }
}
