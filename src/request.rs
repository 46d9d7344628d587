//! Edge request/response envelope.
//!
//! Mirrors the structure the edge platform hands to a viewer-request hook:
//! a URI path, a raw query string, and a multi-valued header map keyed by
//! lowercase header name.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One header record as delivered by the edge platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Original-case header name, when the platform preserves it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Header value.
    pub value: String,
}

impl HeaderRecord {
    /// Creates a record with an original-case name.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// Header map keyed by lowercase header name.
pub type HeaderMap = HashMap<String, Vec<HeaderRecord>>;

/// The incoming request as seen at the edge. Immutable from the gate's
/// point of view; forwarding returns it unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeRequest {
    /// URI path of the request.
    pub uri: String,
    /// Raw query string, without the leading `?`.
    #[serde(default)]
    pub querystring: String,
    /// Headers keyed by lowercase name.
    #[serde(default)]
    pub headers: HeaderMap,
}

impl EdgeRequest {
    /// Creates a request with no query string or headers.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            querystring: String::new(),
            headers: HashMap::new(),
        }
    }

    /// Sets the raw query string.
    #[must_use]
    pub fn with_querystring(mut self, querystring: impl Into<String>) -> Self {
        self.querystring = querystring.into();
        self
    }

    /// Appends a header record under its lowercase name.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(HeaderRecord::new(name, value));
        self
    }
}

/// A synthesized response returned instead of forwarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EdgeResponse {
    /// HTTP status code as a string, per the edge envelope convention.
    pub status: String,
    /// HTTP reason phrase.
    pub status_description: String,
    /// Response headers keyed by lowercase name.
    pub headers: HeaderMap,
}

impl EdgeResponse {
    /// Looks up the first value of a header by its lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|records| records.first())
            .map(|record| record.value.as_str())
    }
}

/// The gate's verdict for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EdgeDecision {
    /// Let the request proceed downstream unchanged.
    Forward {
        /// The original request, unmodified.
        request: EdgeRequest,
    },
    /// Answer the caller directly without forwarding.
    Respond {
        /// The synthesized response.
        response: EdgeResponse,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_lowercases_header_map_keys() {
        let request = EdgeRequest::new("/index.html").with_header("Cookie", "a=1");
        assert!(request.headers.contains_key("cookie"));
        assert_eq!(
            request.headers["cookie"][0].key.as_deref(),
            Some("Cookie")
        );
    }

    #[test]
    fn decision_serializes_with_action_tag() {
        let decision = EdgeDecision::Forward {
            request: EdgeRequest::new("/"),
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["action"], "forward");
        assert_eq!(json["request"]["uri"], "/");
    }

    #[test]
    fn request_roundtrips_through_json() {
        let request = EdgeRequest::new("/app")
            .with_querystring("code=abc")
            .with_header("cookie", "id_token=x");
        let json = serde_json::to_string(&request).unwrap();
        let back: EdgeRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
