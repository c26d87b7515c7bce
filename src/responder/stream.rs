// Word-by-word reply streaming
//
// Replays a finished reply as a paced sequence of words. The producer runs
// on its own task and stops as soon as the token is cancelled or the
// consumer drops the stream.

use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::{jittered_ms, PhrasePicker};

/// Terminates a data stream
pub const FINISH_FRAME: &str = "d\n";

const CHANNEL_CAPACITY: usize = 16;

/// Delay between words: `word_delay_ms` plus up to `word_jitter_ms` extra
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPacing {
    pub word_delay_ms: u64,
    pub word_jitter_ms: u64,
}

impl StreamPacing {
    pub fn immediate() -> Self {
        Self {
            word_delay_ms: 0,
            word_jitter_ms: 0,
        }
    }

    fn next_delay(&self, picker: &dyn PhrasePicker) -> Duration {
        Duration::from_millis(jittered_ms(picker, self.word_delay_ms, self.word_jitter_ms))
    }
}

impl Default for StreamPacing {
    fn default() -> Self {
        Self {
            word_delay_ms: 50,
            word_jitter_ms: 100,
        }
    }
}

/// Encode one text chunk as a data-stream frame: `0:"chunk"\n`
pub fn encode_data_frame(chunk: &str) -> String {
    format!("0:{}\n", serde_json::Value::String(chunk.to_string()))
}

/// Split a reply into chunks; every chunk but the last keeps its trailing space
fn split_words(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let words: Vec<&str> = text.split(' ').collect();
    let last = words.len() - 1;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i < last {
                format!("{} ", word)
            } else {
                word.to_string()
            }
        })
        .collect()
}

/// Finite, non-restartable sequence of reply chunks
pub struct WordStream {
    rx: mpsc::Receiver<String>,
    _guard: DropGuard,
}

impl Stream for WordStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.rx.poll_recv(cx)
    }
}

/// Start streaming `text` word by word.
///
/// Cancelling `cancel` stops the producer; dropping the returned stream
/// stops it too without cancelling `cancel` itself. Must be called from
/// within a tokio runtime.
pub fn stream_words(
    text: &str,
    pacing: StreamPacing,
    picker: Arc<dyn PhrasePicker>,
    cancel: &CancellationToken,
) -> WordStream {
    let words = split_words(text);
    let token = cancel.child_token();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    let producer_token = token.clone();
    tokio::spawn(async move {
        let total = words.len();
        for (idx, word) in words.into_iter().enumerate() {
            if idx > 0 {
                let delay = pacing.next_delay(picker.as_ref());
                if !delay.is_zero() {
                    tokio::select! {
                        _ = producer_token.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }

            if producer_token.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = producer_token.cancelled() => break,
                sent = tx.send(word) => {
                    if sent.is_err() {
                        tracing::debug!(sent = idx, total, "Stream consumer went away");
                        break;
                    }
                }
            }
        }
    });

    WordStream {
        rx,
        _guard: token.drop_guard(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::RandomPicker;
    use futures::StreamExt;

    #[test]
    fn test_data_frame_escapes_quotes() {
        assert_eq!(encode_data_frame("Hello "), "0:\"Hello \"\n");
        assert_eq!(encode_data_frame("say \"hi\""), "0:\"say \\\"hi\\\"\"\n");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("a b c"), vec!["a ", "b ", "c"]);
        assert_eq!(split_words("single"), vec!["single"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn test_pacing_delay_bounds() {
        let pacing = StreamPacing {
            word_delay_ms: 50,
            word_jitter_ms: 100,
        };
        for _ in 0..50 {
            let delay = pacing.next_delay(&RandomPicker);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay <= Duration::from_millis(150));
        }
        assert!(StreamPacing::immediate().next_delay(&RandomPicker).is_zero());
    }

    #[test]
    fn test_pacing_saturates_on_huge_values() {
        let pacing = StreamPacing {
            word_delay_ms: u64::MAX - 1,
            word_jitter_ms: u64::MAX,
        };
        assert_eq!(
            pacing.next_delay(&RandomPicker),
            Duration::from_millis(u64::MAX)
        );
    }

    #[tokio::test]
    async fn test_stream_reassembles_text() {
        let text = "You are not alone in this.";
        let cancel = CancellationToken::new();
        let chunks: Vec<String> =
            stream_words(text, StreamPacing::immediate(), Arc::new(RandomPicker), &cancel)
                .collect()
                .await;

        assert_eq!(chunks.len(), 6);
        assert_eq!(chunks.concat(), text);
        assert_eq!(chunks.last().map(String::as_str), Some("this."));
    }

    #[tokio::test]
    async fn test_cancel_stops_stream() {
        let text = vec!["word"; 100].join(" ");
        let cancel = CancellationToken::new();
        let pacing = StreamPacing {
            word_delay_ms: 20,
            word_jitter_ms: 0,
        };

        let mut stream = stream_words(&text, pacing, Arc::new(RandomPicker), &cancel);
        assert_eq!(stream.next().await.as_deref(), Some("word "));

        cancel.cancel();
        let rest = tokio::time::timeout(Duration::from_secs(2), stream.collect::<Vec<_>>())
            .await
            .expect("stream should end after cancellation");
        assert!(rest.len() < 99);
    }

    #[tokio::test]
    async fn test_dropping_stream_leaves_caller_token() {
        let cancel = CancellationToken::new();
        let stream = stream_words("a b c", StreamPacing::default(), Arc::new(RandomPicker), &cancel);
        drop(stream);
        assert!(!cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_empty_reply_yields_nothing() {
        let cancel = CancellationToken::new();
        let chunks: Vec<String> =
            stream_words("", StreamPacing::immediate(), Arc::new(RandomPicker), &cancel)
                .collect()
                .await;
        assert!(chunks.is_empty());
    }
}
