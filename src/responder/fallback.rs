// Fallback chain for responders
//
// Tries responders in priority order until one succeeds

use anyhow::Result;
use async_trait::async_trait;

use super::Responder;
use crate::conversation::ChatMessage;

/// A chain of responders to try in order
pub struct FallbackResponder {
    responders: Vec<Box<dyn Responder>>,
}

impl FallbackResponder {
    /// Create a new fallback chain with responders in priority order
    pub fn new(responders: Vec<Box<dyn Responder>>) -> Self {
        Self { responders }
    }

    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }

    /// Try each responder, returning the first reply and the name of its source
    pub async fn respond_with_source(&self, history: &[ChatMessage]) -> Result<(String, &str)> {
        let mut last_error = None;

        for (idx, responder) in self.responders.iter().enumerate() {
            match responder.respond(history).await {
                Ok(reply) => {
                    if idx > 0 {
                        tracing::info!(
                            "Responder {} succeeded after {} failed attempts",
                            responder.name(),
                            idx
                        );
                    }
                    return Ok((reply, responder.name()));
                }
                Err(e) => {
                    tracing::warn!(
                        "Responder {} failed (attempt {}/{}): {:#}",
                        responder.name(),
                        idx + 1,
                        self.responders.len(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("No responders configured"))
            .context("All responders failed"))
    }
}

#[async_trait]
impl Responder for FallbackResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        self.respond_with_source(history).await.map(|(reply, _)| reply)
    }

    fn name(&self) -> &str {
        self.responders
            .first()
            .map(|r| r.name())
            .unwrap_or("fallback")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Canned {
        name: &'static str,
        reply: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Canned {
        fn boxed(name: &'static str, reply: Option<&'static str>) -> (Box<dyn Responder>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let responder = Self {
                name,
                reply,
                calls: Arc::clone(&calls),
            };
            (Box::new(responder), calls)
        }
    }

    #[async_trait]
    impl Responder for Canned {
        async fn respond(&self, _history: &[ChatMessage]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => anyhow::bail!("{} is down", self.name),
            }
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let (primary, primary_calls) = Canned::boxed("primary", Some("from primary"));
        let (backup, backup_calls) = Canned::boxed("backup", Some("from backup"));
        let chain = FallbackResponder::new(vec![primary, backup]);

        let (reply, source) = chain.respond_with_source(&[]).await.unwrap();
        assert_eq!(reply, "from primary");
        assert_eq!(source, "primary");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(backup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let (primary, _) = Canned::boxed("primary", None);
        let (backup, _) = Canned::boxed("backup", Some("from backup"));
        let chain = FallbackResponder::new(vec![primary, backup]);

        let (reply, source) = chain.respond_with_source(&[]).await.unwrap();
        assert_eq!(reply, "from backup");
        assert_eq!(source, "backup");
        assert_eq!(chain.name(), "primary");
    }

    #[tokio::test]
    async fn test_all_failures_keep_last_error() {
        let (a, _) = Canned::boxed("a", None);
        let (b, _) = Canned::boxed("b", None);
        let chain = FallbackResponder::new(vec![a, b]);

        let err = chain.respond(&[]).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("All responders failed"));
        assert!(message.contains("b is down"));
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = FallbackResponder::new(vec![]);
        assert!(chain.is_empty());
        assert!(chain.respond(&[]).await.is_err());
    }
}
