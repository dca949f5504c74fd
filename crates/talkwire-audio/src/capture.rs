use cpal::traits::DeviceTrait;
use cpal::{Device, SampleRate, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use talkwire_core::AudioError;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    Ok,
    Error,
    Disabled,
}

// ── CaptureHandle ─────────────────────────────────────────────

#[derive(Clone)]
pub struct CaptureHandle {
    enabled: Arc<AtomicBool>,
    status: Arc<AtomicU8>,
}

impl CaptureHandle {
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, v: bool) {
        self.enabled.store(v, Ordering::Relaxed);
    }

    pub fn status(&self) -> CaptureStatus {
        match self.status.load(Ordering::Relaxed) {
            1 => CaptureStatus::Error,
            2 => CaptureStatus::Disabled,
            _ => CaptureStatus::Ok,
        }
    }

    pub fn set_status(&self, s: CaptureStatus) {
        let v = match s {
            CaptureStatus::Ok => 0,
            CaptureStatus::Error => 1,
            CaptureStatus::Disabled => 2,
        };
        self.status.store(v, Ordering::Relaxed);
    }
}

// ── CaptureNode ───────────────────────────────────────────────

/// Live input stream whose callback does exactly two things: copy channel 0
/// into an owned buffer (the backend reuses its buffer after the callback
/// returns) and fire-and-forget it down the tap. Nothing in the callback
/// blocks or decodes. Dropping the node disconnects the tap.
pub struct CaptureNode {
    _stream: Stream,
}

impl CaptureNode {
    pub fn new(
        device: &Device,
        sample_rate: u32,
        channels: u16,
        tap: mpsc::UnboundedSender<Vec<f32>>,
    ) -> Result<(Self, CaptureHandle), AudioError> {
        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let enabled = Arc::new(AtomicBool::new(true));
        let enabled_flag = Arc::clone(&enabled);
        let status = Arc::new(AtomicU8::new(0));
        let status_flag = Arc::clone(&status);

        let err_callback = move |err: cpal::StreamError| {
            tracing::error!("capture stream error: {}", err);
            status_flag.store(1, Ordering::Relaxed); // Error
        };

        let stride = channels.max(1) as usize;
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !enabled_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    let samples: Vec<f32> = if stride == 1 {
                        data.to_vec()
                    } else {
                        data.iter().step_by(stride).copied().collect()
                    };
                    // Receiver gone means the pipeline is stopping.
                    let _ = tap.send(samples);
                },
                err_callback,
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        let handle = CaptureHandle { enabled, status };
        Ok((Self { _stream: stream }, handle))
    }
}
