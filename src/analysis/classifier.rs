// Conversation classifier
//
// Pure and synchronous: no I/O, no shared state, safe to call from any task.

use super::lexicon::{self, SignalCounts, THEME_CATALOG};
use super::types::{ClassificationResult, ConversationInput, Mood, RiskLevel, Theme};

/// Outcome of the mood decision chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub mood: Mood,
    pub score: u8,
    pub risk: RiskLevel,
    pub needs_help: bool,
}

/// Map signal counts to mood, score, and risk. First matching branch wins.
pub fn assess(counts: &SignalCounts) -> Assessment {
    let pos = counts.positive as f64;
    let neg = counts.negative as f64;

    if counts.crisis > 0 {
        Assessment {
            mood: Mood::Crisis,
            score: to_score((25.0 - 5.0 * counts.crisis as f64).max(10.0)),
            risk: RiskLevel::High,
            needs_help: true,
        }
    } else if counts.negative > counts.positive + 3 {
        Assessment {
            mood: Mood::Struggling,
            score: to_score((35.0 - 2.0 * neg).max(15.0)),
            risk: if counts.negative > 8 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            },
            needs_help: counts.negative > 6,
        }
    } else if counts.negative > counts.positive {
        Assessment {
            mood: Mood::Challenging,
            score: to_score((45.0 - 1.5 * neg).max(25.0)),
            risk: if counts.negative > 5 {
                RiskLevel::Medium
            } else {
                RiskLevel::Low
            },
            needs_help: false,
        }
    } else if counts.positive > counts.negative + 2 {
        Assessment {
            mood: Mood::Positive,
            score: to_score((70.0 + 2.0 * pos).min(95.0)),
            risk: RiskLevel::Low,
            needs_help: false,
        }
    } else if counts.positive > counts.negative {
        Assessment {
            mood: Mood::Improving,
            score: to_score((60.0 + 1.5 * pos).min(85.0)),
            risk: RiskLevel::Low,
            needs_help: false,
        }
    } else {
        Assessment {
            mood: Mood::Neutral,
            score: 50,
            risk: RiskLevel::Low,
            needs_help: false,
        }
    }
}

// Every branch clamps into 10..=95 before this point.
fn to_score(raw: f64) -> u8 {
    raw.round().clamp(10.0, 95.0) as u8
}

/// Classify a conversation transcript
pub fn classify(input: &ConversationInput) -> ClassificationResult {
    let text = input.text.as_str();
    let counts = SignalCounts::scan(text);
    let assessment = assess(&counts);
    let themes = detect_themes(text, &counts);

    tracing::debug!(
        positive = counts.positive,
        negative = counts.negative,
        crisis = counts.crisis,
        anxiety = counts.anxiety,
        depression = counts.depression,
        mood = %assessment.mood,
        "Classified conversation"
    );

    let insights = build_insights(&assessment, &counts, themes.len(), input.message_count);
    let recommendations = build_recommendations(&assessment, &counts, &themes);

    let key_themes = if themes.is_empty() {
        vec![Theme::GeneralWellbeing]
    } else {
        themes
    };

    ClassificationResult {
        overall_mood: assessment.mood,
        mood_score: assessment.score,
        key_themes,
        insights,
        recommendations,
        risk_level: assessment.risk,
        needs_professional_help: assessment.needs_help,
    }
}

fn detect_themes(text: &str, counts: &SignalCounts) -> Vec<Theme> {
    THEME_CATALOG
        .iter()
        .filter(|(theme, triggers)| match theme {
            Theme::Anxiety => counts.anxiety > 0,
            Theme::Depression => counts.depression > 0,
            _ => lexicon::contains_any(text, triggers),
        })
        .map(|(theme, _)| *theme)
        .collect()
}

fn engagement_level(message_count: usize) -> &'static str {
    if message_count > 8 {
        "high"
    } else if message_count > 4 {
        "moderate"
    } else {
        "initial"
    }
}

fn build_insights(
    assessment: &Assessment,
    counts: &SignalCounts,
    theme_count: usize,
    message_count: usize,
) -> Vec<String> {
    let mut insights = vec![
        format!(
            "Your conversation reflects a {} emotional state",
            assessment.mood.as_str().to_lowercase()
        ),
        format!(
            "You've discussed {} main areas of concern",
            theme_count.max(1)
        ),
        format!(
            "Your engagement level appears {}",
            engagement_level(message_count)
        ),
    ];

    if counts.crisis > 0 {
        insights.push(
            "You've expressed some very serious concerns that require immediate attention"
                .to_string(),
        );
    } else if counts.negative > 5 {
        insights.push(
            "You're experiencing significant emotional challenges that may benefit from additional support"
                .to_string(),
        );
    } else if counts.positive > counts.negative {
        insights.push("You're showing positive coping strategies and resilience".to_string());
    }

    if counts.anxiety > 2 {
        insights.push(
            "Anxiety appears to be a significant factor in your current experience".to_string(),
        );
    }
    if counts.depression > 2 {
        insights
            .push("You're experiencing symptoms that align with depressive feelings".to_string());
    }

    insights
}

/// Fixed advice per theme, in the order they are offered
const THEME_ADVICE: &[(Theme, &[&str])] = &[
    (
        Theme::Anxiety,
        &[
            "Practice deep breathing exercises and mindfulness techniques",
            "Consider limiting caffeine and establishing calming routines",
        ],
    ),
    (
        Theme::SleepEnergy,
        &[
            "Establish a consistent sleep schedule and bedtime routine",
            "Limit screen time before bed and create a restful environment",
        ],
    ),
    (
        Theme::WorkCareer,
        &[
            "Consider work-life balance strategies and boundary setting",
            "Explore stress management techniques for workplace challenges",
        ],
    ),
    (
        Theme::Relationships,
        &["Practice open communication and consider couples/family counseling if needed"],
    ),
];

fn build_recommendations(
    assessment: &Assessment,
    counts: &SignalCounts,
    themes: &[Theme],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if assessment.needs_help {
        recommendations
            .push("Please consider speaking with a mental health professional immediately".to_string());
        if counts.crisis > 0 {
            recommendations.push(
                "Contact a crisis helpline (988) if you're having thoughts of self-harm".to_string(),
            );
        }
        recommendations
            .push("Reach out to trusted friends or family members for support".to_string());
        return recommendations;
    }

    recommendations
        .push("Continue regular check-ins with yourself about your mental health".to_string());

    for (theme, advice) in THEME_ADVICE {
        if themes.contains(theme) {
            recommendations.extend(advice.iter().map(|line| line.to_string()));
        }
    }

    recommendations.push("Maintain healthy social connections and support systems".to_string());
    recommendations
        .push("Engage in regular physical activity and self-care practices".to_string());

    if assessment.risk == RiskLevel::Medium {
        recommendations.push(
            "Consider speaking with a counselor or therapist for additional support".to_string(),
        );
    }

    recommendations
}
