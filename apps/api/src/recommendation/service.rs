//! Recommendation pipeline: validate → render prompt → call model → normalize.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::llm_client::TextModel;
use crate::recommendation::normalize::parse_reply;
use crate::recommendation::prompts::render_prompt;
use crate::recommendation::schema::SchemaVariant;
use crate::recommendation::{RecommendationQuery, RecommendationResponse};

/// Stateless per request; the catalog and model are shared read-only.
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    model: Arc<dyn TextModel>,
    schema: SchemaVariant,
    timeout: Duration,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<Catalog>,
        model: Arc<dyn TextModel>,
        schema: SchemaVariant,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            model,
            schema,
            timeout,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn schema(&self) -> SchemaVariant {
        self.schema
    }

    /// Recommends up to 10 assessments for a free-text query.
    ///
    /// Fails only for an empty query (before any model call) or when the model
    /// cannot be reached in time. An unusable reply is returned as an empty,
    /// error-marked `RecommendationResponse`.
    pub async fn recommend(&self, text: &str) -> Result<RecommendationResponse, AppError> {
        let query = RecommendationQuery::new(text)?;
        let prompt = render_prompt(&query, &self.catalog, self.schema);
        debug!("Rendered recommendation prompt ({} chars)", prompt.len());

        let raw = match tokio::time::timeout(self.timeout, self.model.generate(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => return Err(AppError::Llm(format!("recommendation call failed: {e}"))),
            Err(_) => return Err(AppError::UpstreamTimeout(self.timeout.as_secs())),
        };

        let response = parse_reply(&raw, self.schema);
        if response.is_soft_failure() {
            warn!("Returning empty recommendations: model reply could not be parsed");
        } else {
            info!(
                "Returning {} recommendations",
                response.recommended_assessments.len()
            );
        }
        Ok(response)
    }
}
