use talkwire_core::{AudioFrame, LogLevel, ModelSource, Recognition};

pub type RequestId = u64;

/// Wire tag for one message body, used to route unsolicited notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Initialize,
    Recognition,
    Result,
    Error,
    Log,
    Buffer,
}

/// Message body. Correlated requests and responses and unsolicited
/// notifications share this one wire shape; the two paths are kept apart by
/// the presence of an id on the enclosing [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Initialize(ModelSource),
    Recognition(AudioFrame),
    /// `None` is the empty-shaped result: the worker was not ready, or the
    /// request type had no specific handler.
    Result(Option<Recognition>),
    Error(String),
    Log { level: LogLevel, message: String },
    /// Streamed raw samples from an in-context audio path.
    Buffer(Vec<f32>),
}

impl Body {
    pub fn message_type(&self) -> MessageType {
        match self {
            Body::Initialize(_) => MessageType::Initialize,
            Body::Recognition(_) => MessageType::Recognition,
            Body::Result(_) => MessageType::Result,
            Body::Error(_) => MessageType::Error,
            Body::Log { .. } => MessageType::Log,
            Body::Buffer(_) => MessageType::Buffer,
        }
    }
}

/// The wire unit of the worker channel. `id` present means a correlated
/// request/response pair; absent means an unsolicited notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Option<RequestId>,
    pub body: Body,
}
