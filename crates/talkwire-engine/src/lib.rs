pub mod engine_trait;
pub mod registry;
pub mod scripted;
pub mod session;

pub use engine_trait::{RecognizerEngine, StreamHandle};
pub use registry::{EngineFactory, EngineRegistry};
pub use scripted::{ScriptedEngine, ScriptedFrame};
pub use session::RecognizerSession;
