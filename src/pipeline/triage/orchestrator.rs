use std::sync::Arc;
use std::time::Instant;

use super::coerce::{check_schema, coerce_triage_output};
use super::consistency::review_consistency;
use super::parser::extract_model_output;
use super::prompt::build_triage_messages;
use super::sanitize::{sanitize_patient_text, MAX_COMPLAINT_CHARS, MAX_HISTORY_CHARS};
use super::types::{CompletionClient, CompletionRequest, TriageInput, TriageResult};
use super::vitals::normalize_vitals;
use super::TriageError;

/// Runs one triage request end to end:
/// sanitize → normalize vitals → prompt → completion → extract → coerce → check.
///
/// Stateless apart from the shared client; safe to call concurrently.
#[derive(Clone)]
pub struct TriagePipeline {
    client: Arc<dyn CompletionClient>,
}

impl TriagePipeline {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn CompletionClient> {
        &self.client
    }

    pub async fn triage(&self, input: &TriageInput) -> Result<TriageResult, TriageError> {
        let started = Instant::now();

        let complaint = sanitize_patient_text(&input.complaint, MAX_COMPLAINT_CHARS, "complaint");
        let history = sanitize_patient_text(
            input.history.as_deref().unwrap_or_default(),
            MAX_HISTORY_CHARS,
            "history",
        );
        let vitals = normalize_vitals(input.vitals.as_ref());

        tracing::debug!(
            complaint_chars = complaint.chars().count(),
            history_chars = history.chars().count(),
            missing_vitals = vitals.missing_count(),
            "Triage input normalized"
        );

        let request = CompletionRequest {
            messages: build_triage_messages(&complaint, &history, &vitals),
            ..Default::default()
        };
        let completion = self.client.complete(&request).await?;

        let raw = extract_model_output(&completion.text).inspect_err(|e| {
            tracing::warn!(error = %e, "Model answer carried no usable JSON object");
        })?;
        let result = coerce_triage_output(&raw);
        check_schema(&result)?;
        review_consistency(&result, &vitals);

        tracing::info!(
            priority = result.priority.as_str(),
            profile = result.profile.as_str(),
            confidence = result.confidence,
            red_flags = result.red_flags.len(),
            sources = result.sources.len(),
            model_version = completion.model_version.as_deref().unwrap_or("unknown"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Triage completed"
        );

        Ok(result)
    }
}
