//! Typed request/result envelopes for the messaging channel.
//!
//! Requests and responses are closed tagged unions validated at the
//! channel boundary; the `requestId` correlates a request to its single
//! response.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::problem::ProblemRecord;

/// A request a caller can send to a target context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Reachability probe; the target answers `Pong`.
    Ping,

    /// Ask the target to extract the current page's problem.
    ExtractProblem,
}

/// A successful response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Response {
    /// Answer to a `Ping`.
    Pong,

    /// A freshly extracted problem record.
    Problem { record: ProblemRecord },
}

/// A request wrapped with its correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Opaque token correlating the request to its single response
    #[serde(rename = "requestId")]
    pub request_id: Uuid,

    /// The typed request
    #[serde(flatten)]
    pub request: Request,
}

impl RequestEnvelope {
    /// Wrap a request with a fresh correlation id.
    pub fn new(request: Request) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            request,
        }
    }
}

/// Optional structured context attached to a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Page the failure relates to, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Free-form key/value context
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

impl ErrorDetails {
    /// Create empty details.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the related URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a context key/value pair.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// A failure reported by the target, with a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeError {
    /// Human-readable message
    pub message: String,

    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl EnvelopeError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The single response to a request: success with data, or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Correlation id echoed from the request
    #[serde(rename = "requestId")]
    pub request_id: Uuid,

    /// Whether the target handled the request successfully
    pub success: bool,

    /// Response payload when `success` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Response>,

    /// Failure description when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
}

impl ResultEnvelope {
    /// Build a success envelope.
    pub fn ok(request_id: Uuid, response: Response) -> Self {
        Self {
            request_id,
            success: true,
            data: Some(response),
            error: None,
        }
    }

    /// Build a failure envelope.
    pub fn err(request_id: Uuid, error: EnvelopeError) -> Self {
        Self {
            request_id,
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Validate the envelope shape and convert to a typed outcome.
    ///
    /// A success envelope with no data (or a failure with no error) is
    /// structurally invalid and is normalized to a failure.
    pub fn into_outcome(self) -> std::result::Result<Response, EnvelopeError> {
        if self.success {
            match self.data {
                Some(response) => Ok(response),
                None => Err(EnvelopeError::new("success envelope carried no data")),
            }
        } else {
            Err(self
                .error
                .unwrap_or_else(|| EnvelopeError::new("target reported an unspecified failure")))
        }
    }
}
