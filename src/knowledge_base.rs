//! Knowledge base access for the retrieve tool.
//!
//! [`KnowledgeBase`] is the seam between the tool and the retrieval service.
//! [`BedrockKnowledgeBase`] implements it on the Bedrock Agent Runtime
//! `Retrieve` API using the standard AWS credential and region chain.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseQuery, KnowledgeBaseRetrievalConfiguration, KnowledgeBaseRetrievalResult,
    KnowledgeBaseVectorSearchConfiguration, RetrievalResultLocation,
};
use aws_sdk_bedrockagentruntime::Client;

use crate::constants::DEFAULT_KB_REGION;
use crate::error::KnowledgeBaseError;

/// One passage returned by a retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    /// Relevance score reported by the service, if any.
    pub score: Option<f64>,
    /// Where the passage came from (S3 URI or web URL).
    pub source: Option<String>,
    pub text: String,
}

#[async_trait::async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Returns up to `limit` passages relevant to `text`.
    async fn retrieve(
        &self,
        kb_id: &str,
        text: &str,
        limit: i32,
    ) -> Result<Vec<Passage>, KnowledgeBaseError>;
}

pub struct BedrockKnowledgeBase {
    client: Client,
}

impl BedrockKnowledgeBase {
    /// Builds a client from the AWS environment.
    ///
    /// An explicit `region` wins; otherwise the default region chain is
    /// consulted, falling back to [`DEFAULT_KB_REGION`].
    pub async fn from_env(region: Option<String>) -> Self {
        let region_provider = match region {
            Some(region) => RegionProviderChain::first_try(Region::new(region)),
            None => RegionProviderChain::default_provider().or_else(Region::new(DEFAULT_KB_REGION)),
        };
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        tracing::debug!(region = ?sdk_config.region(), "knowledge base client ready");
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait::async_trait]
impl KnowledgeBase for BedrockKnowledgeBase {
    async fn retrieve(
        &self,
        kb_id: &str,
        text: &str,
        limit: i32,
    ) -> Result<Vec<Passage>, KnowledgeBaseError> {
        let query = KnowledgeBaseQuery::builder().text(text).build();
        let config = KnowledgeBaseRetrievalConfiguration::builder()
            .vector_search_configuration(
                KnowledgeBaseVectorSearchConfiguration::builder()
                    .number_of_results(limit)
                    .build(),
            )
            .build();

        let output = self
            .client
            .retrieve()
            .knowledge_base_id(kb_id)
            .retrieval_query(query)
            .retrieval_configuration(config)
            .send()
            .await
            .map_err(|e| KnowledgeBaseError::Retrieve {
                kb_id: kb_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let passages: Vec<Passage> = output
            .retrieval_results()
            .iter()
            .map(to_passage)
            .collect();
        tracing::debug!(kb_id, count = passages.len(), "retrieved passages");
        Ok(passages)
    }
}

fn to_passage(result: &KnowledgeBaseRetrievalResult) -> Passage {
    Passage {
        score: result.score(),
        source: result.location().and_then(location_source),
        text: result
            .content()
            .map(|content| content.text())
            .unwrap_or_default()
            .to_string(),
    }
}

fn location_source(location: &RetrievalResultLocation) -> Option<String> {
    location
        .s3_location()
        .and_then(|s3| s3.uri())
        .or_else(|| location.web_location().and_then(|web| web.url()))
        .map(str::to_string)
}
