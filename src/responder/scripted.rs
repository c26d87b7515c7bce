// Scripted responder: keyword-cued supportive replies

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::{choose, PhrasePicker, RandomPicker, Responder};
use crate::analysis::lexicon::contains_any;
use crate::conversation::{user_message_count, ChatMessage};
use crate::crisis::CrisisDetector;

const ANXIETY_CUES: &[&str] = &["anxious", "worried", "panic", "nervous", "stress", "overwhelmed"];
const DEPRESSION_CUES: &[&str] = &["sad", "depressed", "hopeless", "empty", "worthless", "tired"];
const ANGER_CUES: &[&str] = &["angry", "frustrated", "mad", "irritated", "furious"];
const POSITIVE_CUES: &[&str] = &["good", "better", "happy", "great", "excited", "grateful"];

const WORK_CUES: &[&str] = &["work", "job", "career"];
const RELATIONSHIP_CUES: &[&str] = &["relationship", "partner", "family"];
const SLEEP_CUES: &[&str] = &["sleep", "tired", "exhausted"];

pub const CRISIS_REPLY: &str = "I'm really concerned about what you're sharing with me. These feelings are incredibly difficult, and I want you to know that you don't have to face them alone. Please consider reaching out to a crisis counselor who can provide immediate support - you can call 988 for the Suicide & Crisis Lifeline. Your life has value, and there are people who want to help you through this difficult time. Can you tell me if you have someone you trust that you could reach out to right now?";

const FIRST_POSITIVE: &str = "I'm so glad to hear you're feeling good today! It's wonderful when we can recognize and appreciate those positive moments. What's been contributing to these good feelings? Sometimes understanding what helps us feel better can be really valuable for the future.";

const FIRST_DIFFICULT: &str = "Thank you for sharing that with me - it takes courage to open up about difficult feelings. I want you to know that what you're experiencing is valid, and you're not alone in feeling this way. Can you tell me a bit more about what's been weighing on your mind lately?";

const FIRST_OPENING: &str = "I appreciate you taking the time to connect today. Sometimes it can feel uncertain where to start when we're thinking about our mental health. There's no pressure - we can talk about whatever feels most important to you right now. What's been on your mind lately?";

const ANXIETY_REPLIES: &[&str] = &[
    "Anxiety can feel so overwhelming, especially when our minds start racing with 'what if' thoughts. I hear that you're struggling with these worried feelings. When you notice anxiety building up, what does it feel like in your body? Sometimes paying attention to those physical sensations can help us understand our anxiety better.",
    "Those anxious feelings sound really difficult to manage. It's completely understandable that you're feeling overwhelmed. Have you noticed any particular situations or thoughts that tend to trigger these anxious feelings? Understanding our patterns can sometimes help us feel more in control.",
    "I can hear how much anxiety is affecting you right now. It's exhausting when our minds won't quiet down, isn't it? One thing that many people find helpful is focusing on what we can control in this moment. What's one small thing that usually helps you feel even slightly more grounded?",
];

const DEPRESSION_REPLIES: &[&str] = &[
    "I hear the heaviness in what you're sharing, and I want you to know that these feelings of sadness and emptiness are real and valid. Depression can make everything feel so much harder, even simple daily tasks. You're showing strength by reaching out and talking about this. What has your energy been like lately?",
    "Thank you for trusting me with these difficult feelings. Depression can make us feel so isolated and hopeless, but please know that you're not alone in this experience. Even when it doesn't feel like it, you matter. Have you been able to do any small things for yourself lately, even tiny acts of self-care?",
    "I can sense how much you're struggling right now, and I'm glad you're here talking about it rather than keeping it all inside. Depression has a way of convincing us that things won't get better, but that's the depression talking, not the truth. What's one thing, however small, that used to bring you even a little bit of joy?",
];

const ANGER_REPLIES: &[&str] = &[
    "I can hear the frustration and anger in what you're sharing. Those feelings are completely valid - anger often shows up when we feel hurt, unheard, or when our boundaries have been crossed. It sounds like you're dealing with something really challenging. What's been building up these feelings of anger for you?",
    "Anger can be such a powerful emotion, and it sounds like you're experiencing a lot of it right now. Sometimes anger is our way of protecting ourselves when we feel vulnerable or hurt. I'm wondering what might be underneath these angry feelings - what do you think your anger might be trying to tell you?",
    "It sounds like you're feeling really frustrated and angry about your situation. Those are completely understandable feelings given what you're going through. When you feel this anger building up, how do you usually handle it? Have you found any ways to express or release these feelings that feel healthy for you?",
];

const POSITIVE_REPLIES: &[&str] = &[
    "It's so good to hear some positivity in your voice! I'm really glad you're experiencing these good feelings. It's important to acknowledge and celebrate these moments, even the small ones. What do you think has been helping you feel this way?",
    "I love hearing that you're feeling better! These positive shifts can be so meaningful, especially when we've been going through difficult times. It shows your resilience and strength. What's been different or helpful in your life recently?",
    "That's wonderful to hear! It sounds like something has shifted in a positive direction for you. These good feelings are just as important to talk about as the difficult ones. What would you like to focus on today - maybe exploring what's been working well for you?",
];

const WORK_REPLY: &str = "Work stress can really impact our overall wellbeing, can't it? It sounds like your job situation is weighing on you. Whether it's workload, relationships with colleagues, or feeling unfulfilled, work challenges can affect so many areas of our lives. What aspect of work has been most difficult for you lately?";

const RELATIONSHIP_REPLY: &str = "Relationships can be one of the most rewarding and challenging parts of our lives. It sounds like you're navigating some difficulties in this area. Relationship struggles can feel so personal and emotionally draining. What's been the most challenging part of this relationship situation for you?";

const SLEEP_REPLY: &str = "Sleep issues can affect everything - our mood, energy, ability to cope with stress, and overall mental health. It sounds like you're struggling with feeling rested. When our sleep is disrupted, it can make everything else feel so much harder. How long have you been experiencing these sleep difficulties?";

const GENERAL_REPLIES: &[&str] = &[
    "I hear you, and I want you to acknowledge how much strength it takes to share what you're going through. Your feelings and experiences are completely valid. What feels most important for you to talk about right now?",
    "Thank you for continuing to open up with me. It sounds like you're dealing with quite a bit, and I want you to know that you don't have to carry all of this alone. What kind of support feels most helpful to you in moments like this?",
    "I can sense that you're working through some complex feelings and situations. That takes real courage. Sometimes just putting our thoughts and feelings into words can help us process them differently. What's been on your mind the most lately?",
    "It sounds like you're in a difficult space right now, and I want you to know that your feelings make complete sense given what you're experiencing. You're showing real resilience by reaching out and talking about this. What would feel most supportive for you today?",
    "I appreciate you sharing more of what's going on for you. It's clear that you're dealing with some real challenges, and I want you to know that your feelings are completely understandable. What do you think would be most helpful to focus on in our conversation today?",
];

/// Offline responder that picks a reply from fixed phrase banks
pub struct ScriptedResponder {
    detector: CrisisDetector,
    picker: Arc<dyn PhrasePicker>,
}

impl ScriptedResponder {
    pub fn new(detector: CrisisDetector, picker: Arc<dyn PhrasePicker>) -> Self {
        Self { detector, picker }
    }

    /// Build the reply synchronously from the latest message, whoever sent it
    pub fn reply(&self, history: &[ChatMessage]) -> String {
        let input = history
            .last()
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        if self.detector.detect(&input).is_some() {
            return CRISIS_REPLY.to_string();
        }

        let anxious = contains_any(&input, ANXIETY_CUES);
        let depressed = contains_any(&input, DEPRESSION_CUES);
        let angry = contains_any(&input, ANGER_CUES);
        let positive = contains_any(&input, POSITIVE_CUES);

        if user_message_count(history) <= 1 {
            let opening = if positive {
                FIRST_POSITIVE
            } else if anxious || depressed {
                FIRST_DIFFICULT
            } else {
                FIRST_OPENING
            };
            return opening.to_string();
        }

        let picker = self.picker.as_ref();
        let reply = if anxious {
            choose(picker, ANXIETY_REPLIES)
        } else if depressed {
            choose(picker, DEPRESSION_REPLIES)
        } else if angry {
            choose(picker, ANGER_REPLIES)
        } else if positive {
            choose(picker, POSITIVE_REPLIES)
        } else if contains_any(&input, WORK_CUES) {
            WORK_REPLY
        } else if contains_any(&input, RELATIONSHIP_CUES) {
            RELATIONSHIP_REPLY
        } else if contains_any(&input, SLEEP_CUES) {
            SLEEP_REPLY
        } else {
            choose(picker, GENERAL_REPLIES)
        };

        reply.to_string()
    }
}

impl Default for ScriptedResponder {
    fn default() -> Self {
        Self::new(CrisisDetector::default(), Arc::new(RandomPicker))
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Result<String> {
        Ok(self.reply(history))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize);

    impl PhrasePicker for Fixed {
        fn pick(&self, _len: usize) -> usize {
            self.0
        }
    }

    fn responder(index: usize) -> ScriptedResponder {
        ScriptedResponder::new(CrisisDetector::default(), Arc::new(Fixed(index)))
    }

    fn history(turns: &[&str]) -> Vec<ChatMessage> {
        let mut messages = Vec::new();
        for turn in turns {
            messages.push(ChatMessage::user(*turn));
            messages.push(ChatMessage::assistant("..."));
        }
        messages.pop();
        messages
    }

    #[test]
    fn test_crisis_reply_takes_priority() {
        let reply = responder(0).reply(&history(&["I feel great but I want to die"]));
        assert_eq!(reply, CRISIS_REPLY);
        assert!(reply.contains("988"));
    }

    #[test]
    fn test_first_message_openings() {
        let r = responder(0);
        assert_eq!(r.reply(&history(&["I'm feeling good today"])), FIRST_POSITIVE);
        assert_eq!(r.reply(&history(&["so anxious"])), FIRST_DIFFICULT);
        assert_eq!(r.reply(&history(&["hello"])), FIRST_OPENING);
        assert_eq!(r.reply(&[]), FIRST_OPENING);
    }

    #[test]
    fn test_variant_selection_uses_picker() {
        let turns = history(&["hi", "I'm worried about tomorrow"]);
        assert_eq!(responder(0).reply(&turns), ANXIETY_REPLIES[0]);
        assert_eq!(responder(2).reply(&turns), ANXIETY_REPLIES[2]);
    }

    #[test]
    fn test_cue_priority() {
        let r = responder(1);
        // Anxiety outranks depression and anger
        assert_eq!(r.reply(&history(&["hi", "sad and stressed and mad"])), ANXIETY_REPLIES[1]);
        assert_eq!(r.reply(&history(&["hi", "feeling hopeless"])), DEPRESSION_REPLIES[1]);
        assert_eq!(r.reply(&history(&["hi", "so furious"])), ANGER_REPLIES[1]);
        assert_eq!(r.reply(&history(&["hi", "a happy day"])), POSITIVE_REPLIES[1]);
    }

    #[test]
    fn test_topic_replies() {
        let r = responder(0);
        assert_eq!(r.reply(&history(&["hi", "my job"])), WORK_REPLY);
        assert_eq!(r.reply(&history(&["hi", "my partner"])), RELATIONSHIP_REPLY);
        assert_eq!(r.reply(&history(&["hi", "can't sleep"])), SLEEP_REPLY);
        assert_eq!(r.reply(&history(&["hi", "just thinking"])), GENERAL_REPLIES[0]);
    }

    #[test]
    fn test_reads_latest_message() {
        let turns = history(&["I want to die", "things are calmer now"]);
        assert_eq!(responder(4).reply(&turns), GENERAL_REPLIES[4]);

        // A trailing assistant turn is what gets read
        let mut turns = history(&["hi", "just thinking"]);
        turns.push(ChatMessage::assistant("are you worried about it?"));
        assert_eq!(responder(0).reply(&turns), ANXIETY_REPLIES[0]);
    }

    #[tokio::test]
    async fn test_responder_trait() {
        let r = responder(0);
        let reply = r.respond(&history(&["hello"])).await.unwrap();
        assert_eq!(reply, FIRST_OPENING);
        assert_eq!(r.name(), "scripted");
    }
}
