/// One fixed-size slice of mono audio, owned by whoever holds it.
///
/// Steady-state frames carry exactly the configured frame size; the final
/// frame flushed at shutdown may be shorter. Frames move across the worker
/// channel by value, never by copy.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Opaque bundle identifying a recognizer variant and the bytes needed to
/// instantiate it. Fetched at most once per transcriber lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    pub model: String,
    pub module: Vec<u8>,
    pub data: Vec<u8>,
}

/// Reconciler output for one audio frame.
///
/// `text` is the delta appended since the last observation; `sentence` is the
/// full utterance-so-far and is only meaningful to callers when `is_endpoint`
/// is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub sentence: String,
    pub is_endpoint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Controller-facing event surface.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriberEvent {
    /// Incremental decode with a non-empty delta, or an endpoint-triggered
    /// flush carrying empty text.
    Message { text: String, is_endpoint: bool },
    /// Exactly one per finalized utterance, always non-empty.
    Sentence { text: String },
}
