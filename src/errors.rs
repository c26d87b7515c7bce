// User-friendly error messages
//
// Helpers that turn technical failures into messages telling the operator
// what to try next.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// Wrap an error with user-friendly context
pub trait UserFriendlyError {
    /// Add user-friendly context with a suggestion
    fn user_context_with_suggestion(self, problem: &str, suggestion: &str) -> Self;
}

impl<T> UserFriendlyError for Result<T> {
    fn user_context_with_suggestion(self, problem: &str, suggestion: &str) -> Self {
        self.with_context(|| {
            format!(
                "{}\n\n\x1b[1;33mSuggestion:\x1b[0m {}",
                problem, suggestion
            )
        })
    }
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(path: &Path, error: &str) -> String {
    format!(
        "Failed to parse config file {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat {}\x1b[0m\n\n\
        2. Move it aside to fall back to defaults:\n\
           \x1b[36mmv {} {}.backup\x1b[0m\n\n\
        3. Common mistakes:\n\
           • Missing quotes around strings\n\
           • Unclosed section headers like [server\n\
           • Unknown provider name (use \"scripted\" or \"gemini\")",
        path.display(),
        error,
        path.display(),
        path.display(),
        path.display()
    )
}

/// Format a bind failure with helpful suggestions
pub fn bind_failed_error(address: &str) -> String {
    format!(
        "Could not listen on {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Another process already uses this port\n\
        • The address is not assigned to this machine\n\
        • Ports below 1024 need elevated privileges\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Pick another port:\n\
           \x1b[36mmindaura serve --bind 127.0.0.1:8080\x1b[0m\n\n\
        2. Find what holds the port:\n\
           \x1b[36mlsof -i :{}\x1b[0m",
        address,
        address.rsplit(':').next().unwrap_or(address)
    )
}

/// Format an unreadable conversation file error
pub fn conversation_input_error(source: &str) -> String {
    format!(
        "Could not read a conversation from {}\n\n\
        \x1b[1;32mExpected JSON in one of these shapes:\x1b[0m\n\
           [{{\"role\": \"user\", \"content\": \"...\"}}, ...]\n\
           {{\"messages\": [{{\"role\": \"user\", \"content\": \"...\"}}, ...]}}",
        source
    )
}

/// Wrap a generic error with suggestions
pub fn wrap_error_with_suggestion(error: impl fmt::Display, suggestion: &str) -> String {
    format!(
        "{}\n\n\
        \x1b[1;33mSuggestion:\x1b[0m {}",
        error, suggestion
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_failed_names_port() {
        let msg = bind_failed_error("127.0.0.1:8000");
        assert!(msg.contains("127.0.0.1:8000"));
        assert!(msg.contains("lsof -i :8000"));
    }

    #[test]
    fn test_config_parse_error_has_backup_hint() {
        let msg = config_parse_error(Path::new("/tmp/config.toml"), "expected `]`");
        assert!(msg.contains("expected `]`"));
        assert!(msg.contains("/tmp/config.toml.backup"));
    }

    #[test]
    fn test_user_context_with_suggestion() {
        let result: Result<()> = Err(anyhow::anyhow!("boom"));
        let err = result
            .user_context_with_suggestion("Analysis failed", "check the input file")
            .unwrap_err();
        assert!(err.to_string().contains("check the input file"));
    }

    #[test]
    fn test_wrap_error_with_suggestion() {
        let msg = wrap_error_with_suggestion("nope", "try again");
        assert!(msg.starts_with("nope"));
        assert!(msg.contains("try again"));
    }
}
