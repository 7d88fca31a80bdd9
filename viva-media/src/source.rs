use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("no input device found")]
    NoInputDevice,

    #[error("no camera feed installed")]
    NoCamera,

    #[error("device access denied")]
    AccessDenied,

    #[error("stream constraints request no tracks")]
    NoTracksRequested,

    #[error("failed to list input devices: {0}")]
    ListDevices(#[from] cpal::DevicesError),

    #[error("failed to get default config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to play stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("device worker failed: {0}")]
    Worker(String),

    #[error("device worker startup timeout")]
    WorkerTimeout,

    #[error("internal channel error")]
    Channel,
}

/// Which tracks a stream should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub audio: bool,
    pub video: bool,
}

impl StreamConstraints {
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }

    pub fn video_only() -> Self {
        Self {
            audio: false,
            video: true,
        }
    }

    pub fn audio_video() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

/// Encoding of the chunks a stream emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFormat {
    /// Raw little-endian 16-bit mono PCM at the given rate. Finalized into
    /// a WAV container when a recording stops.
    PcmS16Le { sample_rate_hz: u32 },
    /// Pre-containerized chunks (camera feeds); concatenated verbatim.
    Opaque { mime: String },
}

impl StreamFormat {
    /// Mime type of the finalized recording this format produces.
    pub fn mime(&self) -> &str {
        match self {
            StreamFormat::PcmS16Le { .. } => crate::wav::WAV_MIME,
            StreamFormat::Opaque { mime } => mime,
        }
    }
}

/// One batch of captured data as produced by the device callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaChunk {
    pub bytes: Vec<u8>,
}

/// Observer for a stream's track state, cloneable past the stream's
/// lifetime so callers can verify the device was let go.
#[derive(Debug, Clone, Default)]
pub struct TrackHandle(Arc<AtomicBool>);

impl TrackHandle {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn mark_released(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn released(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A live capture stream. Chunks flow from the moment the stream is open
/// until it is released.
pub trait MediaStream: Send {
    fn format(&self) -> StreamFormat;

    /// Hand over the chunk receiver. Yields `None` after the first call;
    /// one consumer owns the data.
    fn take_chunks(&mut self) -> Option<mpsc::Receiver<MediaChunk>>;

    fn track_handle(&self) -> TrackHandle;

    /// Stop the underlying tracks. Idempotent; implementations also release
    /// on Drop so no exit path leaves a device indicator lit.
    fn release(&mut self);
}

/// Acquisition seam over the platform's devices, so the session layer can
/// be exercised without hardware.
pub trait MediaSource: Send + Sync {
    fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>, DeviceError>;
}
