// Analysis data types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conversation::{ChatMessage, Role};

/// Overall emotional tone of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Crisis,
    Struggling,
    Challenging,
    Neutral,
    Improving,
    Positive,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Crisis => "Crisis",
            Mood::Struggling => "Struggling",
            Mood::Challenging => "Challenging",
            Mood::Neutral => "Neutral",
            Mood::Improving => "Improving",
            Mood::Positive => "Positive",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse severity tier used to gate professional-help messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic tag detected in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "Work/Career")]
    WorkCareer,
    Family,
    Relationships,
    #[serde(rename = "Sleep & Energy")]
    SleepEnergy,
    Anxiety,
    Depression,
    #[serde(rename = "Financial Stress")]
    FinancialStress,
    #[serde(rename = "Health Concerns")]
    HealthConcerns,
    #[serde(rename = "Education/School")]
    EducationSchool,
    /// Emitted alone when nothing in the catalog matched
    #[serde(rename = "General Wellbeing")]
    GeneralWellbeing,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::WorkCareer => "Work/Career",
            Theme::Family => "Family",
            Theme::Relationships => "Relationships",
            Theme::SleepEnergy => "Sleep & Energy",
            Theme::Anxiety => "Anxiety",
            Theme::Depression => "Depression",
            Theme::FinancialStress => "Financial Stress",
            Theme::HealthConcerns => "Health Concerns",
            Theme::EducationSchool => "Education/School",
            Theme::GeneralWellbeing => "General Wellbeing",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifier input: a lower-cased transcript plus the session's turn count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationInput {
    /// Space-joined, lower-cased content of the user's turns
    pub text: String,
    /// Turns from both roles; only shapes the engagement insight
    pub message_count: usize,
}

impl ConversationInput {
    pub fn new(text: impl Into<String>, message_count: usize) -> Self {
        Self {
            text: text.into().to_lowercase(),
            message_count,
        }
    }

    /// Build the transcript from chat records, keeping only user turns
    pub fn from_messages(messages: &[ChatMessage]) -> Self {
        let text = messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(text, messages.len())
    }
}

/// Structured wellness summary of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub overall_mood: Mood,
    /// Wellness score in 10..=95
    pub mood_score: u8,
    pub key_themes: Vec<Theme>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk_level: RiskLevel,
    pub needs_professional_help: bool,
}
