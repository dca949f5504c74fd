use crate::protocol::{Body, Message, MessageType, RequestId};
use crate::runtime;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use talkwire_core::{ChannelError, LogLevel};
use talkwire_engine::EngineRegistry;
use tokio::sync::{mpsc, oneshot};

type PendingMap = HashMap<RequestId, oneshot::Sender<Body>>;
type Listener = Box<dyn Fn(Body) + Send>;
type ListenerMap = HashMap<MessageType, Listener>;

/// Controller end of the cross-context channel.
///
/// One multiplexed duplex link to the worker: correlated request/response
/// pairs resolve by id, unsolicited notifications route to a per-type
/// listener. The two paths share the wire format but nothing else.
/// Correctness never relies on FIFO delivery, only on id correlation.
///
/// Cloning shares the underlying link, so the pipeline and its pump task can
/// hold the same channel.
#[derive(Clone, Default)]
pub struct WorkerChannel {
    pending: Arc<Mutex<PendingMap>>,
    listeners: Arc<Mutex<ListenerMap>>,
    link: Arc<Mutex<Option<WorkerLink>>>,
}

struct WorkerLink {
    to_worker: mpsc::UnboundedSender<Message>,
    next_id: RequestId,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl WorkerChannel {
    /// A channel with no worker bound. Requests echo their payload back
    /// until `connect` is called.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.link.lock().unwrap().is_some()
    }

    /// Spawns the recognizer worker on a dedicated thread and binds this
    /// channel to it. Any previously bound context is torn down first.
    pub fn connect(&self, registry: EngineRegistry) -> Result<(), ChannelError> {
        let (worker_rx, worker_tx) = self.connect_raw();
        let handle = std::thread::Builder::new()
            .name("talkwire-worker".to_string())
            .spawn(move || runtime::run(registry, worker_rx, worker_tx))
            .map_err(|e| {
                self.teardown();
                ChannelError::Spawn(e.to_string())
            })?;
        if let Some(link) = self.link.lock().unwrap().as_mut() {
            link.worker = Some(handle);
        }
        Ok(())
    }

    /// Binds the channel to caller-supplied endpoints and returns the worker
    /// side: a receiver for requests and a sender for replies and
    /// notifications. Used for custom runtimes and in tests.
    pub fn connect_raw(
        &self,
    ) -> (
        mpsc::UnboundedReceiver<Message>,
        mpsc::UnboundedSender<Message>,
    ) {
        self.teardown();
        let (to_worker_tx, to_worker_rx) = mpsc::unbounded_channel();
        let (from_worker_tx, from_worker_rx) = mpsc::unbounded_channel();

        *self.link.lock().unwrap() = Some(WorkerLink {
            to_worker: to_worker_tx,
            next_id: 0,
            worker: None,
        });
        tokio::spawn(dispatch(
            from_worker_rx,
            Arc::clone(&self.pending),
            Arc::clone(&self.listeners),
        ));

        (to_worker_rx, from_worker_tx)
    }

    /// Sends a correlated request. The returned future resolves when the
    /// response bearing the same id arrives; no timeout is imposed. With no
    /// worker bound it resolves immediately with the payload echoed back,
    /// which callers must treat as the "no worker available" signal.
    pub fn request(&self, body: Body) -> PendingReply {
        let mut link_guard = self.link.lock().unwrap();
        let Some(link) = link_guard.as_mut() else {
            return PendingReply::Echo(Some(body));
        };
        link.next_id += 1;
        let id = link.next_id;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);
        if link.to_worker.send(Message { id: Some(id), body }).is_err() {
            // Worker already gone; the dropped sender rejects the wait.
            self.pending.lock().unwrap().remove(&id);
        }
        PendingReply::Wait(rx)
    }

    /// Registers the listener for one notification type. At most one per
    /// type; the last registration wins.
    pub fn on_notification<F>(&self, message_type: MessageType, listener: F)
    where
        F: Fn(Body) + Send + 'static,
    {
        self.listeners
            .lock()
            .unwrap()
            .insert(message_type, Box::new(listener));
    }

    /// Clears all listeners, rejects every outstanding request with
    /// [`ChannelError::Closed`], and terminates the worker context. The
    /// channel returns to the disconnected state. Safe to call repeatedly.
    pub fn teardown(&self) {
        self.listeners.lock().unwrap().clear();
        // Dropping the response senders settles every pending wait as Closed.
        self.pending.lock().unwrap().clear();
        // Dropping the link drops the worker-side sender: the worker loop
        // exits after its current message, and the dispatch task follows.
        let _link = self.link.lock().unwrap().take();
    }
}

/// Controller-side inbound routing: notification listeners fire for any
/// message of their type regardless of id; a matching pending request is
/// resolved and removed exactly once. Both can apply to one message.
async fn dispatch(
    mut from_worker: mpsc::UnboundedReceiver<Message>,
    pending: Arc<Mutex<PendingMap>>,
    listeners: Arc<Mutex<ListenerMap>>,
) {
    while let Some(msg) = from_worker.recv().await {
        if let Body::Log { level, message } = &msg.body {
            match level {
                LogLevel::Debug => tracing::debug!("worker: {message}"),
                LogLevel::Info => tracing::info!("worker: {message}"),
                LogLevel::Warn => tracing::warn!("worker: {message}"),
                LogLevel::Error => tracing::error!("worker: {message}"),
            }
        }

        {
            let guard = listeners.lock().unwrap();
            if let Some(listener) = guard.get(&msg.body.message_type()) {
                listener(msg.body.clone());
            }
        }

        if let Some(id) = msg.id {
            let entry = pending.lock().unwrap().remove(&id);
            if let Some(tx) = entry {
                let _ = tx.send(msg.body);
            }
        }
    }
    tracing::debug!("worker outbound channel closed, dispatch exiting");
}

/// One in-flight request. Resolves with the correlated response body, with
/// the echoed payload when no worker was bound, or with
/// [`ChannelError::Closed`] when the channel was torn down first.
pub enum PendingReply {
    Echo(Option<Body>),
    Wait(oneshot::Receiver<Body>),
}

impl Future for PendingReply {
    type Output = Result<Body, ChannelError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.get_mut() {
            PendingReply::Echo(body) => match body.take() {
                Some(body) => Poll::Ready(Ok(body)),
                None => Poll::Ready(Err(ChannelError::Closed)),
            },
            PendingReply::Wait(rx) => Pin::new(rx)
                .poll(cx)
                .map(|res| res.map_err(|_| ChannelError::Closed)),
        }
    }
}
