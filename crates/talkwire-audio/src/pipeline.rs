use crate::capture::{CaptureHandle, CaptureNode};
use crate::device;
use crate::fetch::ModelProvider;
use crate::framing::FrameAssembler;
use cpal::Device;
use futures::stream::{FuturesOrdered, StreamExt};
use talkwire_core::{
    AppConfig, AudioFrame, CaptureMode, ModelSource, PipelineError, Recognition, TranscriberEvent,
};
use talkwire_engine::EngineRegistry;
use talkwire_worker::{Body, PendingReply, WorkerChannel};
use tokio::sync::mpsc;

/// Live-microphone transcription pipeline.
///
/// Taps an input device, frames the sample stream, round-trips each frame
/// through the recognizer worker, and surfaces `Message`/`Sentence` events.
/// The audio callback never blocks: frames are fire-and-forget, so several
/// recognition requests may be in flight at once; the worker serializes them
/// against the single recognizer stream.
pub struct Transcriber {
    config: AppConfig,
    registry: EngineRegistry,
    provider: Box<dyn ModelProvider>,
    device: Option<Device>,
    channel: WorkerChannel,
    /// Cached across start/stop cycles; fetched at most once.
    model_source: Option<ModelSource>,
    capture: Option<CaptureNode>,
    capture_handle: Option<CaptureHandle>,
    tap_tx: Option<mpsc::UnboundedSender<Vec<f32>>>,
    events_tx: Option<mpsc::UnboundedSender<TranscriberEvent>>,
    events_rx: Option<mpsc::UnboundedReceiver<TranscriberEvent>>,
    destroyed: bool,
}

impl Transcriber {
    /// Fails before any resource is allocated when the environment has no
    /// audio backend at all.
    pub fn new(
        config: AppConfig,
        registry: EngineRegistry,
        provider: Box<dyn ModelProvider>,
    ) -> Result<Self, PipelineError> {
        if !device::host_available() {
            return Err(PipelineError::Unsupported);
        }
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            config,
            registry,
            provider,
            device: None,
            channel: WorkerChannel::disconnected(),
            model_source: None,
            capture: None,
            capture_handle: None,
            tap_tx: None,
            events_tx: Some(events_tx),
            events_rx: Some(events_rx),
            destroyed: false,
        })
    }

    /// Binds or replaces the input device. Takes effect at the next start.
    pub fn set_source(&mut self, device: Device) {
        self.device = Some(device);
    }

    pub fn take_event_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<TranscriberEvent>> {
        self.events_rx.take()
    }

    pub fn is_started(&self) -> bool {
        self.capture.is_some()
    }

    /// Begins tapping the audio source. No-op when already started.
    pub async fn start(&mut self) -> Result<(), PipelineError> {
        if self.destroyed {
            return Err(PipelineError::Destroyed);
        }
        if self.capture.is_some() {
            return Ok(());
        }
        if self.config.model.mode != CaptureMode::Push {
            return Err(PipelineError::UnsupportedMode(format!(
                "{:?}",
                self.config.model.mode
            )));
        }
        let Some(events_tx) = self.events_tx.clone() else {
            return Err(PipelineError::Destroyed);
        };
        if self.device.is_none() {
            return Err(PipelineError::NoAudioSource);
        }

        let source = match &self.model_source {
            Some(source) => source.clone(),
            None => {
                let source = self.provider.fetch(&self.config.model).await?;
                self.model_source = Some(source.clone());
                source
            }
        };

        if !self.channel.is_connected() {
            self.channel.connect(self.registry.clone())?;
        }
        if let Body::Error(message) = self.channel.request(Body::Initialize(source)).await? {
            return Err(PipelineError::Init(message));
        }
        tracing::debug!("recognizer worker initialized");

        let sample_rate = self.config.general.sample_rate;
        let (tap_tx, tap_rx) = mpsc::unbounded_channel();
        let (node, handle) = match &self.device {
            Some(device) => CaptureNode::new(device, sample_rate, 1, tap_tx.clone())?,
            None => return Err(PipelineError::NoAudioSource),
        };

        tokio::spawn(run_pump(
            self.channel.clone(),
            tap_rx,
            FrameAssembler::new(self.config.general.frame_size as usize),
            sample_rate,
            events_tx,
        ));

        self.capture = Some(node);
        self.capture_handle = Some(handle);
        self.tap_tx = Some(tap_tx);
        tracing::info!(
            "transcription started, model: {}, frame size: {}",
            self.config.model.engine,
            self.config.general.frame_size
        );
        Ok(())
    }

    /// Disconnects the audio tap and terminates the worker context. Requests
    /// still in flight are rejected as closed, which the pump treats as
    /// cancellation. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = &self.capture_handle {
            handle.set_enabled(false);
        }
        self.capture = None;
        self.capture_handle = None;
        // Closing the tap lets the pump drain and exit on its own.
        self.tap_tx = None;
        self.channel.teardown();
    }

    /// Terminal teardown: after this every `start` fails with a destroyed
    /// error. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.stop();
        self.model_source = None;
        self.events_tx = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for Transcriber {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Frame pump: assembles tap chunks into fixed-size frames, sends each as a
/// recognition request the moment it is complete, and applies the emission
/// policy to replies in send order. Exits when the tap closes, flushing the
/// final partial frame first.
pub async fn run_pump(
    channel: WorkerChannel,
    mut tap_rx: mpsc::UnboundedReceiver<Vec<f32>>,
    mut assembler: FrameAssembler,
    sample_rate: u32,
    events: mpsc::UnboundedSender<TranscriberEvent>,
) {
    let mut inflight: FuturesOrdered<PendingReply> = FuturesOrdered::new();
    let mut utterance_open = false;

    loop {
        tokio::select! {
            chunk = tap_rx.recv() => match chunk {
                Some(samples) => {
                    for frame in assembler.push(&samples) {
                        inflight.push_back(channel.request(Body::Recognition(AudioFrame {
                            samples: frame,
                            sample_rate,
                        })));
                    }
                }
                None => break,
            },
            Some(reply) = inflight.next(), if !inflight.is_empty() => {
                if !handle_reply(reply, &mut utterance_open, &events) {
                    return;
                }
            }
        }
    }

    // Tap disconnected: hand the recognizer the partial tail, then drain.
    if let Some(frame) = assembler.flush() {
        inflight.push_back(channel.request(Body::Recognition(AudioFrame {
            samples: frame,
            sample_rate,
        })));
    }
    while let Some(reply) = inflight.next().await {
        if !handle_reply(reply, &mut utterance_open, &events) {
            return;
        }
    }
}

/// Emission policy. A `Message` event fires for every non-empty delta, and
/// once more with empty text when an endpoint closes a running utterance. A
/// `Sentence` event fires exactly when an endpoint arrives with accumulated
/// text. Returns false when the channel went away and the pump should stop.
fn handle_reply(
    reply: Result<Body, talkwire_core::ChannelError>,
    utterance_open: &mut bool,
    events: &mpsc::UnboundedSender<TranscriberEvent>,
) -> bool {
    let body = match reply {
        Ok(body) => body,
        Err(_) => {
            tracing::debug!("channel closed while awaiting recognition reply");
            return false;
        }
    };
    let recognition: Recognition = match body {
        Body::Result(Some(r)) => r,
        Body::Error(message) => {
            tracing::warn!("recognizer error: {message}");
            return true;
        }
        // Empty-shaped result, or the payload echoed back with no worker.
        _ => return true,
    };

    if !recognition.text.is_empty() {
        *utterance_open = true;
        let _ = events.send(TranscriberEvent::Message {
            text: recognition.text,
            is_endpoint: recognition.is_endpoint,
        });
    } else if *utterance_open && recognition.is_endpoint {
        *utterance_open = false;
        let _ = events.send(TranscriberEvent::Message {
            text: String::new(),
            is_endpoint: true,
        });
    }

    if recognition.is_endpoint && !recognition.sentence.is_empty() {
        let _ = events.send(TranscriberEvent::Sentence {
            text: recognition.sentence,
        });
    }
    true
}
