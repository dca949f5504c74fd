use crate::engine_trait::{RecognizerEngine, StreamHandle};
use std::collections::VecDeque;
use talkwire_core::{EngineError, ModelSource};

/// One scripted engine response, consumed per accepted frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedFrame {
    /// How many times `is_ready` reports true before going false.
    pub decode_passes: u32,
    pub is_endpoint: bool,
    /// Cumulative utterance text as `get_result` should report it. After an
    /// endpoint the script author writes the next utterance from scratch,
    /// matching an engine whose `reset` cleared its state.
    pub result: String,
}

/// Deterministic recognizer used by tests and as the registry default.
///
/// Replays a fixed script instead of decoding audio. The script can be
/// carried in `ModelSource::data` (see [`ScriptedEngine::encode_script`]) so
/// the full initialize path is exercised without a real model.
pub struct ScriptedEngine {
    script: VecDeque<ScriptedFrame>,
    current: Option<ScriptedFrame>,
    pending_decodes: u32,
    samples_fed: usize,
    resets: usize,
    next_stream: u64,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(frames: Vec<ScriptedFrame>) -> Self {
        Self {
            script: frames.into(),
            current: None,
            pending_decodes: 0,
            samples_fed: 0,
            resets: 0,
            next_stream: 0,
        }
    }

    /// Registry factory: the script rides in `source.data`.
    pub fn from_source(source: &ModelSource) -> Result<Box<dyn RecognizerEngine>, EngineError> {
        let frames = Self::parse_script(&source.data)?;
        Ok(Box::new(Self::with_script(frames)))
    }

    /// Parses one frame per line: `decodes<TAB>endpoint<TAB>text`.
    /// Blank lines are skipped; `endpoint` is `0` or `1`.
    pub fn parse_script(data: &[u8]) -> Result<Vec<ScriptedFrame>, EngineError> {
        let text = std::str::from_utf8(data)
            .map_err(|e| EngineError::InvalidModelData(e.to_string()))?;
        let mut frames = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, '\t');
            let decodes = parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| {
                    EngineError::InvalidModelData(format!("bad decode count in line: {line}"))
                })?;
            let endpoint = match parts.next() {
                Some("0") => false,
                Some("1") => true,
                _ => {
                    return Err(EngineError::InvalidModelData(format!(
                        "bad endpoint flag in line: {line}"
                    )))
                }
            };
            let result = parts.next().unwrap_or("").to_string();
            frames.push(ScriptedFrame {
                decode_passes: decodes,
                is_endpoint: endpoint,
                result,
            });
        }
        Ok(frames)
    }

    /// Inverse of [`parse_script`](Self::parse_script), for building a
    /// `ModelSource` around a script.
    pub fn encode_script(frames: &[ScriptedFrame]) -> Vec<u8> {
        let mut out = String::new();
        for frame in frames {
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                frame.decode_passes,
                if frame.is_endpoint { 1 } else { 0 },
                frame.result
            ));
        }
        out.into_bytes()
    }

    pub fn samples_fed(&self) -> usize {
        self.samples_fed
    }

    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognizerEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn create_stream(&mut self) -> StreamHandle {
        self.next_stream += 1;
        StreamHandle::from_raw(self.next_stream)
    }

    fn accept_waveform(&mut self, _stream: StreamHandle, _sample_rate: u32, samples: &[f32]) {
        self.samples_fed += samples.len();
        self.current = self.script.pop_front();
        self.pending_decodes = self
            .current
            .as_ref()
            .map(|f| f.decode_passes)
            .unwrap_or(0);
        tracing::trace!(
            "scripted engine fed {} samples, {} script frames left",
            samples.len(),
            self.script.len()
        );
    }

    fn is_ready(&self, _stream: StreamHandle) -> bool {
        self.pending_decodes > 0
    }

    fn decode(&mut self, _stream: StreamHandle) {
        self.pending_decodes = self.pending_decodes.saturating_sub(1);
    }

    fn is_endpoint(&self, _stream: StreamHandle) -> bool {
        self.current.as_ref().map(|f| f.is_endpoint).unwrap_or(false)
    }

    fn get_result(&self, _stream: StreamHandle) -> String {
        self.current
            .as_ref()
            .map(|f| f.result.clone())
            .unwrap_or_default()
    }

    fn reset(&mut self, _stream: StreamHandle) {
        self.resets += 1;
    }
}
