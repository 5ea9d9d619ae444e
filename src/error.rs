//! Error types for flowfield.

use thiserror::Error;

/// The main error type for flowfield operations.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no compatible GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("config error: {0}")]
    Config(String),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("frame capture error: {0}")]
    Capture(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for flowfield operations.
pub type Result<T> = std::result::Result<T, FlowError>;
