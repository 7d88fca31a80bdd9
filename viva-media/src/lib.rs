pub mod playback;
pub mod probe;
pub mod recorder;
pub mod resample;
pub mod scripted;
pub mod source;
pub mod wav;

mod cpal_source;

pub use cpal_source::CpalMediaSource;
pub use probe::DeviceProbe;
pub use recorder::{CaptureError, MediaRecorder};
pub use source::{
    DeviceError, MediaChunk, MediaSource, MediaStream, StreamConstraints, StreamFormat,
    TrackHandle,
};
