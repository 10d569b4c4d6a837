use crate::{
    aggregator::{aggregate, Verdict},
    cache::AnalysisCache,
    chunker::chunk_words,
    config::Config,
    error::AnalysisError,
    llm::{LlmClient, SegmentAnalyzer},
};
use std::time::Duration;
use tracing::{debug, info};

/// Drives the whole document pipeline: cache check, chunking, per-segment
/// analysis, aggregation, cache store.
///
/// Segments are analyzed strictly in order, one at a time; a failed
/// segment aborts the run and nothing partial is cached. Owns the verdict
/// cache for its lifetime.
pub struct DocumentAnalyzer<C = LlmClient> {
    config: Config,
    client: C,
    cache: AnalysisCache,
}

impl DocumentAnalyzer<LlmClient> {
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = LlmClient::new(config.llm.clone())?;
        Ok(Self::with_client(client, config))
    }
}

impl<C: SegmentAnalyzer> DocumentAnalyzer<C> {
    /// Build an analyzer around any [`SegmentAnalyzer`] backend.
    pub fn with_client(client: C, config: Config) -> Self {
        let cache = AnalysisCache::new(
            Duration::from_secs(config.analysis.cache_expiration_secs),
            config.analysis.cache_max_entries,
        );

        Self {
            config,
            client,
            cache,
        }
    }

    /// Analyze one document, returning a cached verdict when a fresh one
    /// exists for the identifier.
    pub async fn analyze(&self, text: &str, identifier: &str) -> Result<Verdict, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::Validation("document text is empty".into()));
        }
        if identifier.trim().is_empty() {
            return Err(AnalysisError::Validation(
                "document identifier is empty".into(),
            ));
        }

        if let Some(cached) = self.cache.get(identifier).await {
            info!(identifier, "serving analysis from cache");
            return Ok(cached);
        }

        let segments = chunk_words(text, self.config.analysis.max_words_per_segment);
        info!(identifier, segments = segments.len(), "analyzing document");

        let mut findings = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            debug!(segment = index + 1, total = segments.len(), "analyzing segment");
            let finding = self.client.analyze_segment(segment).await?;
            findings.push(finding);

            if index + 1 < segments.len() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }

        let verdict = aggregate(&findings);
        self.cache.insert(identifier, verdict.clone()).await;
        info!(identifier, risk_score = verdict.risk_score, "analysis complete");

        Ok(verdict)
    }

    /// The verdict cache, exposed so hosts can inspect or reset it.
    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }
}
