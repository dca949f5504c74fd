pub mod capture;
pub mod device;
pub mod fetch;
pub mod framing;
pub mod pipeline;

pub use capture::{CaptureHandle, CaptureNode, CaptureStatus};
pub use device::DeviceManager;
pub use fetch::{provider_for, FileModelProvider, HttpModelProvider, ModelProvider};
pub use framing::FrameAssembler;
pub use pipeline::{run_pump, Transcriber};
