/// Opaque handle to one decoding stream, minted by the engine that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(u64);

impl StreamHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Capability set required of any recognition engine binding.
///
/// The engine itself (model, decoder, endpoint heuristic) is opaque; this is
/// the full surface the pipeline relies on. Contract notes:
/// - `accept_waveform` must tolerate any frame length, including zero.
/// - `is_ready` must become false after a bounded number of `decode` calls
///   per accepted frame, or the drain loop in the reconciler will not
///   terminate.
/// - `get_result` is cumulative for the open utterance and non-shrinking
///   until `reset`.
/// - `reset` clears utterance-local decoder state without destroying the
///   stream handle.
pub trait RecognizerEngine: Send {
    fn name(&self) -> &str;

    fn create_stream(&mut self) -> StreamHandle;

    fn accept_waveform(&mut self, stream: StreamHandle, sample_rate: u32, samples: &[f32]);

    fn is_ready(&self, stream: StreamHandle) -> bool;

    fn decode(&mut self, stream: StreamHandle);

    fn is_endpoint(&self, stream: StreamHandle) -> bool;

    fn get_result(&self, stream: StreamHandle) -> String;

    fn reset(&mut self, stream: StreamHandle);
}
