//! Shared state for the triage HTTP API.

use std::sync::Arc;

use crate::config::TriageConfig;
use crate::pipeline::triage::{CompletionClient, TriagePipeline};

/// Shared context for all API routes and middleware. Immutable after startup.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: TriagePipeline,
    pub config: Arc<TriageConfig>,
}

impl ApiContext {
    pub fn new(client: Arc<dyn CompletionClient>, config: TriageConfig) -> Self {
        Self {
            pipeline: TriagePipeline::new(client),
            config: Arc::new(config),
        }
    }

    pub fn client(&self) -> &Arc<dyn CompletionClient> {
        self.pipeline.client()
    }
}
