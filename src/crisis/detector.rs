// Crisis keyword detector

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Phrases that switch the chat reply to the crisis message
pub const DEFAULT_CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "hurt myself",
    "self harm",
    "no point living",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CrisisKeywords {
    keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    keywords: Vec<String>,
}

impl CrisisDetector {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// Load crisis keywords from a JSON file of the form `{"keywords": [...]}`
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read crisis keywords file: {}", path.display()))?;

        let parsed: CrisisKeywords = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if parsed.keywords.is_empty() {
            anyhow::bail!("Crisis keywords file {} is empty", path.display());
        }

        Ok(Self::new(parsed.keywords))
    }

    /// Return the first crisis keyword found in `text`
    pub fn detect(&self, text: &str) -> Option<&str> {
        let text_lower = text.to_lowercase();

        let hit = self
            .keywords
            .iter()
            .find(|keyword| text_lower.contains(keyword.as_str()))?;

        tracing::warn!(keyword = %hit, "Crisis keyword detected");
        Some(hit.as_str())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CRISIS_KEYWORDS.iter().map(|k| k.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_crisis_detection() {
        let detector = CrisisDetector::default();

        assert_eq!(detector.detect("I'm thinking about suicide"), Some("suicide"));
        assert_eq!(detector.detect("I want to kill myself"), Some("kill myself"));
        assert_eq!(detector.detect("What is the meaning of life?"), None);
    }

    #[test]
    fn test_case_insensitive() {
        let detector = CrisisDetector::new(vec!["Self Harm".to_string()]);

        assert!(detector.detect("SELF HARM").is_some());
        assert!(detector.detect("thoughts of sElF hArM").is_some());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"keywords": ["giving up", "Goodbye Forever"]}}"#).unwrap();

        let detector = CrisisDetector::load_from_file(file.path()).unwrap();
        assert_eq!(detector.keywords(), &["giving up", "goodbye forever"]);
        assert!(detector.detect("I'm giving up").is_some());
        assert!(detector.detect("suicide").is_none());
    }

    #[test]
    fn test_load_rejects_empty_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"keywords": []}}"#).unwrap();

        assert!(CrisisDetector::load_from_file(file.path()).is_err());
    }
}
