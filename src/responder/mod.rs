// Chat reply generation
//
// A responder turns the conversation so far into the assistant's next
// message. The scripted responder works offline from keyword cues; the
// Gemini responder asks the hosted model and falls back to the script.

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use crate::conversation::ChatMessage;

pub mod fallback;
pub mod gemini;
pub mod scripted;
pub mod stream;

pub use fallback::FallbackResponder;
pub use gemini::{GeminiResponder, PERSONA_PROMPT};
pub use scripted::{ScriptedResponder, CRISIS_REPLY};
pub use stream::{encode_data_frame, stream_words, StreamPacing, WordStream, FINISH_FRAME};

/// Produces the assistant's next turn
#[async_trait]
pub trait Responder: Send + Sync {
    /// Generate a reply to the latest user message in `history`
    async fn respond(&self, history: &[ChatMessage]) -> Result<String>;

    /// Short name for logs and metrics
    fn name(&self) -> &str;
}

/// Source of indices for variant phrasing and timing jitter
pub trait PhrasePicker: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Draws from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible picker backed by a seeded RNG
#[derive(Debug)]
pub struct SeededPicker {
    rng: Mutex<StdRng>,
}

impl SeededPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl PhrasePicker for SeededPicker {
    fn pick(&self, len: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..len),
            // A poisoned lock only means another caller panicked mid-draw
            Err(poisoned) => poisoned.into_inner().gen_range(0..len),
        }
    }
}

/// `base_ms` plus a random extra of up to `jitter_ms`, saturating at `u64::MAX`
pub fn jittered_ms(picker: &dyn PhrasePicker, base_ms: u64, jitter_ms: u64) -> u64 {
    let span = usize::try_from(jitter_ms)
        .unwrap_or(usize::MAX)
        .saturating_add(1);
    let jitter = if jitter_ms > 0 {
        picker.pick(span) as u64
    } else {
        0
    };
    base_ms.saturating_add(jitter.min(jitter_ms))
}

/// Pick one entry of a non-empty phrase bank
pub fn choose<'a>(picker: &dyn PhrasePicker, bank: &[&'a str]) -> &'a str {
    bank[picker.pick(bank.len()).min(bank.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let a = SeededPicker::new(7);
        let b = SeededPicker::new(7);

        let draws_a: Vec<usize> = (0..20).map(|_| a.pick(5)).collect();
        let draws_b: Vec<usize> = (0..20).map(|_| b.pick(5)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_random_picker_in_range() {
        for _ in 0..100 {
            assert!(RandomPicker.pick(3) < 3);
        }
    }

    #[test]
    fn test_choose_clamps_out_of_range_picks() {
        struct Wild;
        impl PhrasePicker for Wild {
            fn pick(&self, _len: usize) -> usize {
                99
            }
        }

        assert_eq!(choose(&Wild, &["a", "b"]), "b");
    }

    #[test]
    fn test_jittered_ms_bounds() {
        let picker = SeededPicker::new(1);
        for _ in 0..50 {
            let ms = jittered_ms(&picker, 1000, 2000);
            assert!((1000..=3000).contains(&ms));
        }
        assert_eq!(jittered_ms(&picker, 40, 0), 40);
        assert_eq!(jittered_ms(&picker, u64::MAX, u64::MAX), u64::MAX);
    }
}
