use crate::protocol::{Body, Message};
use talkwire_core::{AudioFrame, EngineError, LogLevel, ModelSource, Recognition};
use talkwire_engine::{EngineRegistry, RecognizerSession};
use tokio::sync::mpsc;

/// Worker loop entry point, run on a dedicated thread. Messages are handled
/// strictly one at a time, which is what serializes concurrent recognition
/// requests against the single recognizer stream. Exits when the inbound
/// sender is dropped.
pub fn run(
    registry: EngineRegistry,
    mut inbound: mpsc::UnboundedReceiver<Message>,
    outbound: mpsc::UnboundedSender<Message>,
) {
    let mut runtime = WorkerRuntime::new(registry, outbound);
    while let Some(msg) = inbound.blocking_recv() {
        runtime.handle(msg);
    }
    tracing::debug!("worker inbound channel closed, exiting");
}

/// State machine hosting the recognizer inside the isolated context.
///
/// Uninitialized until the first `Initialize`; afterwards holds one
/// [`RecognizerSession`]. Recognition requests arriving before a session
/// exists get the empty-shaped result rather than an error.
pub struct WorkerRuntime {
    registry: EngineRegistry,
    outbound: mpsc::UnboundedSender<Message>,
    loaded_model: Option<String>,
    session: Option<RecognizerSession>,
}

impl WorkerRuntime {
    pub fn new(registry: EngineRegistry, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            registry,
            outbound,
            loaded_model: None,
            session: None,
        }
    }

    /// Handles one inbound message. Uncorrelated messages are ignored; any
    /// handler error becomes an `Error` reply with the same id, and the
    /// runtime keeps running.
    pub fn handle(&mut self, msg: Message) {
        let Some(id) = msg.id else {
            return;
        };
        let reply = match self.dispatch(msg.body) {
            Ok(body) => body,
            Err(e) => Body::Error(e.to_string()),
        };
        let _ = self.outbound.send(Message {
            id: Some(id),
            body: reply,
        });
    }

    fn dispatch(&mut self, body: Body) -> Result<Body, EngineError> {
        match body {
            Body::Initialize(source) => {
                self.initialize(source)?;
                Ok(Body::Result(None))
            }
            Body::Recognition(frame) => Ok(Body::Result(self.recognize(frame))),
            // Explicit default for request types without a handler.
            _ => Ok(Body::Result(None)),
        }
    }

    /// Idempotent per model type: re-initializing with the currently loaded
    /// type is a no-op.
    fn initialize(&mut self, source: ModelSource) -> Result<(), EngineError> {
        if self.loaded_model.as_deref() == Some(source.model.as_str()) {
            return Ok(());
        }
        let mut engine = self.registry.create(&source)?;
        self.log(LogLevel::Info, "recognizer created");
        let stream = engine.create_stream();
        self.log(LogLevel::Info, "recognizer stream created");
        self.session = Some(RecognizerSession::new(engine, stream));
        self.loaded_model = Some(source.model);
        Ok(())
    }

    fn recognize(&mut self, frame: AudioFrame) -> Option<Recognition> {
        let session = self.session.as_mut()?;
        Some(session.reconcile(frame.sample_rate, &frame.samples))
    }

    fn log(&self, level: LogLevel, message: &str) {
        let _ = self.outbound.send(Message {
            id: None,
            body: Body::Log {
                level,
                message: message.to_string(),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use talkwire_engine::{RecognizerEngine, ScriptedEngine, ScriptedFrame};

    static CREATED: AtomicUsize = AtomicUsize::new(0);

    fn counting_factory(
        source: &ModelSource,
    ) -> Result<Box<dyn RecognizerEngine>, EngineError> {
        CREATED.fetch_add(1, Ordering::SeqCst);
        ScriptedEngine::from_source(source)
    }

    fn test_registry() -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        registry.register("counting", counting_factory);
        registry
    }

    fn source(model: &str, script: &[ScriptedFrame]) -> ModelSource {
        ModelSource {
            model: model.to_string(),
            module: Vec::new(),
            data: ScriptedEngine::encode_script(script),
        }
    }

    fn correlated(id: u64, body: Body) -> Message {
        Message { id: Some(id), body }
    }

    fn script_frame(text: &str, endpoint: bool) -> ScriptedFrame {
        ScriptedFrame {
            decode_passes: 1,
            is_endpoint: endpoint,
            result: text.to_string(),
        }
    }

    fn frame(n: usize) -> AudioFrame {
        AudioFrame {
            samples: vec![0.0; n],
            sample_rate: 16000,
        }
    }

    /// Receives replies until one carries an id, returning it plus any log
    /// notifications seen on the way.
    fn next_reply(rx: &mut mpsc::UnboundedReceiver<Message>) -> (Message, usize) {
        let mut logs = 0;
        loop {
            let msg = rx.try_recv().expect("expected a reply");
            if msg.id.is_some() {
                return (msg, logs);
            }
            assert!(matches!(msg.body, Body::Log { .. }));
            logs += 1;
        }
    }

    #[test]
    fn test_recognition_before_initialize_is_empty_shaped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(1, Body::Recognition(frame(16))));

        let (reply, _) = next_reply(&mut rx);
        assert_eq!(reply.id, Some(1));
        assert!(matches!(reply.body, Body::Result(None)));
    }

    #[test]
    fn test_initialize_emits_logs_and_result() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(
            1,
            Body::Initialize(source("scripted", &[script_frame("hi", false)])),
        ));

        let (reply, logs) = next_reply(&mut rx);
        assert_eq!(reply.id, Some(1));
        assert!(matches!(reply.body, Body::Result(None)));
        // recognizer created + recognizer stream created
        assert_eq!(logs, 2);
    }

    #[test]
    fn test_initialize_is_idempotent_per_model_type() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);
        let before = CREATED.load(Ordering::SeqCst);

        runtime.handle(correlated(1, Body::Initialize(source("counting", &[]))));
        runtime.handle(correlated(2, Body::Initialize(source("counting", &[]))));

        assert_eq!(CREATED.load(Ordering::SeqCst) - before, 1);
        // Both calls still get a success-shaped reply.
        let (r1, _) = next_reply(&mut rx);
        let (r2, _) = next_reply(&mut rx);
        assert_eq!(r1.id, Some(1));
        assert_eq!(r2.id, Some(2));
        assert!(matches!(r2.body, Body::Result(None)));
    }

    #[test]
    fn test_initialize_and_recognize() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(
            1,
            Body::Initialize(source(
                "scripted",
                &[script_frame("hello", false), script_frame("hello", true)],
            )),
        ));
        let _ = next_reply(&mut rx);

        runtime.handle(correlated(2, Body::Recognition(frame(1024))));
        let (reply, _) = next_reply(&mut rx);
        match reply.body {
            Body::Result(Some(r)) => {
                assert_eq!(r.text, "hello");
                assert!(!r.is_endpoint);
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        runtime.handle(correlated(3, Body::Recognition(frame(1024))));
        let (reply, _) = next_reply(&mut rx);
        match reply.body {
            Body::Result(Some(r)) => {
                assert!(r.is_endpoint);
                assert_eq!(r.sentence, "hello");
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_model_type_replies_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(9, Body::Initialize(source("vosk", &[]))));

        let (reply, _) = next_reply(&mut rx);
        assert_eq!(reply.id, Some(9));
        match reply.body {
            Body::Error(msg) => assert!(msg.contains("vosk")),
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn test_error_does_not_stop_the_runtime() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(1, Body::Initialize(source("vosk", &[]))));
        let _ = next_reply(&mut rx);

        // The runtime keeps serving after a failed message.
        runtime.handle(correlated(2, Body::Recognition(frame(8))));
        let (reply, _) = next_reply(&mut rx);
        assert_eq!(reply.id, Some(2));
        assert!(matches!(reply.body, Body::Result(None)));
    }

    #[test]
    fn test_unhandled_request_type_gets_default_reply() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(correlated(4, Body::Buffer(vec![0.0; 4])));

        let (reply, _) = next_reply(&mut rx);
        assert_eq!(reply.id, Some(4));
        assert!(matches!(reply.body, Body::Result(None)));
    }

    #[test]
    fn test_uncorrelated_message_is_ignored() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runtime = WorkerRuntime::new(test_registry(), tx);

        runtime.handle(Message {
            id: None,
            body: Body::Recognition(frame(8)),
        });
        assert!(rx.try_recv().is_err());
    }
}
