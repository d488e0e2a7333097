//! Stream emission pacing.
//!
//! The emitter sits between the pipeline and the HTTP response body. It paces
//! a finished answer back out as thinking steps, then small content chunks,
//! then one terminal `done` event. A dropped receiver (client disconnect)
//! just stops emission; it never propagates as an error.

use crate::config::PipelineConfig;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use tutor_common::{ProviderResult, StreamEvent};

pub struct StreamEmitter {
    tx: UnboundedSender<StreamEvent>,
    chunk_chars: usize,
    chunk_delay: Duration,
    thinking_delay: Duration,
}

impl StreamEmitter {
    pub fn new(tx: UnboundedSender<StreamEvent>, pipeline: &PipelineConfig) -> Self {
        Self {
            tx,
            chunk_chars: pipeline.content_chunk_chars.max(1),
            chunk_delay: Duration::from_millis(pipeline.content_chunk_delay_ms),
            thinking_delay: Duration::from_millis(pipeline.thinking_step_delay_ms),
        }
    }

    /// Send one event. Returns false once the client has gone away.
    fn send(&self, event: StreamEvent) -> bool {
        if self.tx.send(event).is_err() {
            debug!("[-]  Stream receiver dropped, stopping emission");
            return false;
        }
        true
    }

    /// Play a finished result out over the stream in protocol order.
    pub async fn emit_answer(&self, result: &ProviderResult, thinking_mode: bool) {
        if !self.send(StreamEvent::Status {
            message: "Generating answer...".to_string(),
        }) {
            return;
        }

        if thinking_mode {
            for thought in &result.thoughts {
                if !self.send(StreamEvent::Thinking {
                    thinking: thought.clone(),
                }) {
                    return;
                }
                tokio::time::sleep(self.thinking_delay).await;
            }
        }

        for chunk in chunk_answer(&result.answer, self.chunk_chars) {
            if !self.send(StreamEvent::Content { content: chunk }) {
                return;
            }
            tokio::time::sleep(self.chunk_delay).await;
        }

        self.send(StreamEvent::Done {
            full_response: result.answer.clone(),
            answer: result.answer.clone(),
            provider: result.provider.clone(),
            sources: result.sources.clone(),
            thinking_steps: if thinking_mode {
                result.thoughts.clone()
            } else {
                Vec::new()
            },
            thinking_summary: result.thinking_summary.clone().unwrap_or_default(),
        });
    }

    pub fn emit_error(&self, message: impl Into<String>) {
        self.send(StreamEvent::Error {
            error: message.into(),
        });
    }
}

/// Split an answer into fixed-size character chunks. Char-based so multibyte
/// text never splits inside a code point; the chunks concatenate back to the
/// input exactly.
pub fn chunk_answer(answer: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    for (i, c) in answer.chars().enumerate() {
        current.push(c);
        if (i + 1) % chunk_chars == 0 {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
