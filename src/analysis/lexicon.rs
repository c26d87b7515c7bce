// Keyword tables for conversation analysis
//
// All tables are lowercase. A phrase matches when it occurs anywhere in the
// lower-cased transcript, so "stress" also matches "stressed".

use super::types::Theme;

pub const POSITIVE: &[&str] = &[
    "happy",
    "good",
    "great",
    "better",
    "excited",
    "grateful",
    "love",
    "amazing",
    "wonderful",
    "fantastic",
    "excellent",
    "pleased",
    "content",
    "joyful",
    "optimistic",
    "hopeful",
    "confident",
    "proud",
    "satisfied",
    "peaceful",
    "calm",
    "relaxed",
    "energetic",
    "motivated",
    "accomplished",
];

pub const NEGATIVE: &[&str] = &[
    "sad",
    "depressed",
    "anxious",
    "worried",
    "stressed",
    "tired",
    "angry",
    "frustrated",
    "overwhelmed",
    "hopeless",
    "lonely",
    "scared",
    "afraid",
    "panic",
    "exhausted",
    "worthless",
    "guilty",
    "ashamed",
    "disappointed",
    "hurt",
    "broken",
    "empty",
    "numb",
    "isolated",
    "desperate",
];

pub const CRISIS: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "hurt myself",
    "self harm",
    "no point",
    "give up",
    "can't go on",
    "better off dead",
    "end the pain",
    "not worth living",
];

pub const ANXIETY: &[&str] = &[
    "anxious",
    "worry",
    "panic",
    "nervous",
    "stress",
    "overwhelmed",
    "racing thoughts",
    "can't breathe",
    "heart racing",
    "restless",
];

pub const DEPRESSION: &[&str] = &[
    "sad",
    "depressed",
    "hopeless",
    "empty",
    "worthless",
    "tired",
    "no energy",
    "can't sleep",
    "don't care",
    "numb",
];

/// Theme catalog in display order.
///
/// Anxiety and Depression have no trigger phrases of their own; they are
/// driven by the [`ANXIETY`] and [`DEPRESSION`] counts instead.
pub const THEME_CATALOG: &[(Theme, &[&str])] = &[
    (Theme::WorkCareer, &["work", "job", "career", "boss"]),
    (Theme::Family, &["family", "parent", "mother", "father"]),
    (
        Theme::Relationships,
        &["relationship", "partner", "boyfriend", "girlfriend"],
    ),
    (
        Theme::SleepEnergy,
        &["sleep", "tired", "insomnia", "exhausted"],
    ),
    (Theme::Anxiety, &[]),
    (Theme::Depression, &[]),
    (
        Theme::FinancialStress,
        &["money", "financial", "debt", "bills"],
    ),
    (Theme::HealthConcerns, &["health", "sick", "pain", "medical"]),
    (
        Theme::EducationSchool,
        &["school", "college", "university", "student"],
    ),
];

/// Number of distinct phrases from each table found in a transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub positive: usize,
    pub negative: usize,
    pub crisis: usize,
    pub anxiety: usize,
    pub depression: usize,
}

impl SignalCounts {
    /// Scan a lower-cased transcript against every table
    pub fn scan(text: &str) -> Self {
        Self {
            positive: count_matches(text, POSITIVE),
            negative: count_matches(text, NEGATIVE),
            crisis: count_matches(text, CRISIS),
            anxiety: count_matches(text, ANXIETY),
            depression: count_matches(text, DEPRESSION),
        }
    }
}

/// Count how many phrases of `table` occur in `text` (each phrase counts once)
pub fn count_matches(text: &str, table: &[&str]) -> usize {
    table.iter().filter(|phrase| text.contains(*phrase)).count()
}

/// Check whether any phrase of `table` occurs in `text`
pub fn contains_any(text: &str, table: &[&str]) -> bool {
    table.iter().any(|phrase| text.contains(phrase))
}
