// MindAura - Conversation analysis
// Keyword heuristics that turn a chat transcript into a wellness summary

mod classifier;
pub mod lexicon;
mod types;

pub use classifier::{assess, classify, Assessment};
pub use lexicon::SignalCounts;
pub use types::{ClassificationResult, ConversationInput, Mood, RiskLevel, Theme};
