use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to enumerate devices: {0}")]
    DeviceEnumeration(String),

    #[error("failed to build stream: {0}")]
    StreamBuild(String),

    #[error("stream error: {0}")]
    StreamError(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("recognizer engine not found: {0}")]
    NotFound(String),

    #[error("recognizer creation failed: {0}")]
    CreateFailed(String),

    #[error("malformed model data: {0}")]
    InvalidModelData(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    /// Returned for every request still pending when the channel is torn
    /// down. Callers treat this as cancellation, not a crash.
    #[error("channel closed before a response arrived")]
    Closed,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url} with status {status}")]
    Http { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("the current environment does not support audio capture")]
    Unsupported,

    #[error("cannot use the transcriber because it has been destroyed")]
    Destroyed,

    #[error("no audio source is bound")]
    NoAudioSource,

    #[error("capture mode not supported: {0}")]
    UnsupportedMode(String),

    #[error("recognizer initialization failed: {0}")]
    Init(String),

    #[error("audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("model fetch error: {0}")]
    Fetch(#[from] FetchError),
}
