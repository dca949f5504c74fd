pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CaptureMode, GeneralConfig, ModelConfig};
pub use error::{
    AudioError, ChannelError, ConfigError, EngineError, FetchError, PipelineError,
};
pub use types::{AudioFrame, LogLevel, ModelSource, Recognition, TranscriberEvent};
