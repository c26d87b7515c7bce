// Prometheus metrics for the HTTP service

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::analysis::{ClassificationResult, Mood};

/// Counters exposed on `/metrics`. Each server owns its own registry.
pub struct ServiceMetrics {
    registry: Registry,
    analyses: IntCounterVec,
    chat_requests: IntCounterVec,
    crisis_flags: IntCounter,
    request_errors: IntCounterVec,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let analyses = IntCounterVec::new(
            Opts::new("mindaura_analyses_total", "Conversations analyzed, by mood"),
            &["mood"],
        )?;
        let chat_requests = IntCounterVec::new(
            Opts::new("mindaura_chat_requests_total", "Chat replies, by responder"),
            &["responder"],
        )?;
        let crisis_flags = IntCounter::new(
            "mindaura_crisis_flags_total",
            "Analyses that detected crisis language",
        )?;
        let request_errors = IntCounterVec::new(
            Opts::new("mindaura_request_errors_total", "Failed requests, by kind"),
            &["kind"],
        )?;

        registry.register(Box::new(analyses.clone()))?;
        registry.register(Box::new(chat_requests.clone()))?;
        registry.register(Box::new(crisis_flags.clone()))?;
        registry.register(Box::new(request_errors.clone()))?;

        Ok(Self {
            registry,
            analyses,
            chat_requests,
            crisis_flags,
            request_errors,
        })
    }

    pub fn record_analysis(&self, result: &ClassificationResult) {
        self.analyses
            .with_label_values(&[result.overall_mood.as_str()])
            .inc();
        if result.overall_mood == Mood::Crisis {
            self.crisis_flags.inc();
        }
    }

    pub fn record_chat(&self, responder: &str) {
        self.chat_requests.with_label_values(&[responder]).inc();
    }

    /// `kind` is "client" for 4xx and "server" for 5xx
    pub fn record_error(&self, kind: &str) {
        self.request_errors.with_label_values(&[kind]).inc();
    }

    /// Render all counters in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{classify, ConversationInput};

    #[test]
    fn test_render_counts_moods() {
        let metrics = ServiceMetrics::new().unwrap();

        metrics.record_analysis(&classify(&ConversationInput::new("i want to die", 2)));
        metrics.record_analysis(&classify(&ConversationInput::new("", 2)));
        metrics.record_chat("scripted");
        metrics.record_error("client");

        let text = metrics.render().unwrap();
        assert!(text.contains("mindaura_analyses_total{mood=\"Crisis\"} 1"));
        assert!(text.contains("mindaura_analyses_total{mood=\"Neutral\"} 1"));
        assert!(text.contains("mindaura_crisis_flags_total 1"));
        assert!(text.contains("mindaura_chat_requests_total{responder=\"scripted\"} 1"));
        assert!(text.contains("mindaura_request_errors_total{kind=\"client\"} 1"));
    }

    #[test]
    fn test_registries_are_independent() {
        let a = ServiceMetrics::new().unwrap();
        let b = ServiceMetrics::new().unwrap();
        a.record_chat("gemini");

        assert!(!b.render().unwrap().contains("responder=\"gemini\""));
    }
}
