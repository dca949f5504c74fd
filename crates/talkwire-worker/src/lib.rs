pub mod channel;
pub mod protocol;
pub mod runtime;

pub use channel::{PendingReply, WorkerChannel};
pub use protocol::{Body, Message, MessageType, RequestId};
pub use runtime::WorkerRuntime;
