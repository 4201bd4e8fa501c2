// Recommendation service: query validation, prompt rendering, model call,
// and fail-soft normalization of the model's reply.
// All model calls go through llm_client::TextModel.

pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod schema;
pub mod service;

use serde::Serialize;

use crate::errors::AppError;

/// Hard cap on the number of recommendations returned to a caller.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Error marker attached when the model reply is not structured data at all.
pub const PARSE_ERROR_MESSAGE: &str = "Could not parse response";

/// A validated, non-empty job description or hiring query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationQuery(String);

impl RecommendationQuery {
    pub fn new(text: impl Into<String>) -> Result<Self, AppError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AppError::Validation("query cannot be empty".to_string()));
        }
        Ok(Self(text))
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

/// One recommended assessment as returned to the caller.
///
/// Output keys are always snake_case regardless of the schema variant the
/// model was asked to use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    pub adaptive_support: String,
    pub description: String,
    pub duration: u32,
    pub remote_support: String,
    pub test_type: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub recommended_assessments: Vec<RecommendationItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl RecommendationResponse {
    pub fn success(items: Vec<RecommendationItem>) -> Self {
        Self {
            recommended_assessments: items,
            error: None,
            raw_response: None,
        }
    }

    /// Empty result carrying the raw model text for diagnostics.
    pub fn unparsed(raw: &str) -> Self {
        Self {
            recommended_assessments: Vec::new(),
            error: Some(PARSE_ERROR_MESSAGE.to_string()),
            raw_response: Some(raw.to_string()),
        }
    }

    pub fn is_soft_failure(&self) -> bool {
        self.error.is_some()
    }
}
