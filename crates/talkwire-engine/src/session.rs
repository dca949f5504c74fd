use crate::engine_trait::{RecognizerEngine, StreamHandle};
use talkwire_core::Recognition;

/// Live decoding state: one engine, one open stream bound to it, and the
/// text observed so far for the current utterance.
///
/// `last_text` belongs to the session so concurrent sessions never share
/// reconciler state.
pub struct RecognizerSession {
    engine: Box<dyn RecognizerEngine>,
    stream: StreamHandle,
    last_text: String,
}

impl RecognizerSession {
    pub fn new(engine: Box<dyn RecognizerEngine>, stream: StreamHandle) -> Self {
        Self {
            engine,
            stream,
            last_text: String::new(),
        }
    }

    pub fn last_text(&self) -> &str {
        &self.last_text
    }

    /// Feeds one frame and reconciles the engine's cumulative output into an
    /// incremental result.
    ///
    /// `text` is the cumulative result with the previously observed text
    /// stripped as a first-occurrence substring. When the engine revises
    /// words it already emitted this degrades to a literal strip rather than
    /// a true diff; that matches the observed recognizer behavior and is kept
    /// deliberately.
    ///
    /// `sentence` is the utterance-so-far; callers surface it only at an
    /// endpoint. On an endpoint the observed text is cleared (when non-empty)
    /// and the engine stream is reset unconditionally.
    pub fn reconcile(&mut self, sample_rate: u32, samples: &[f32]) -> Recognition {
        self.engine
            .accept_waveform(self.stream, sample_rate, samples);

        // Drain whatever the engine buffered; the engine bounds this loop.
        while self.engine.is_ready(self.stream) {
            self.engine.decode(self.stream);
        }

        let is_endpoint = self.engine.is_endpoint(self.stream);
        let result = self.engine.get_result(self.stream);
        let text = result.replacen(&self.last_text, "", 1);

        if !result.is_empty() && result != self.last_text {
            self.last_text = result;
        }

        let sentence = self.last_text.clone();
        if is_endpoint {
            if !self.last_text.is_empty() {
                self.last_text.clear();
            }
            self.engine.reset(self.stream);
        }

        Recognition {
            text,
            sentence,
            is_endpoint,
        }
    }
}
