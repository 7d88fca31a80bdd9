use std::sync::mpsc;

use viva_core::MediaBlob;

use crate::source::{MediaStream, StreamFormat};
use crate::wav::wav_from_pcm_s16le;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("stream chunks already consumed")]
    ChunksTaken,

    #[error("failed to frame recording: {0}")]
    Frame(#[from] hound::Error),
}

struct ActiveRecording {
    stream: Box<dyn MediaStream>,
    chunks: mpsc::Receiver<crate::source::MediaChunk>,
}

/// Per-question capture state machine: idle until a stream is handed in,
/// recording until stopped, then idle again with a finalized blob.
///
/// At most one recording is active; a second `start` is a contract
/// violation and is rejected rather than silently restarting. Every exit
/// path, including Drop, releases the stream's tracks so the device
/// indicator goes dark between questions.
pub struct MediaRecorder {
    active: Option<ActiveRecording>,
}

impl MediaRecorder {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, mut stream: Box<dyn MediaStream>) -> Result<(), CaptureError> {
        if self.active.is_some() {
            // The rejected stream must not keep its tracks open.
            stream.release();
            return Err(CaptureError::AlreadyRecording);
        }

        let chunks = match stream.take_chunks() {
            Some(rx) => rx,
            None => {
                stream.release();
                return Err(CaptureError::ChunksTaken);
            }
        };

        self.active = Some(ActiveRecording { stream, chunks });
        Ok(())
    }

    /// Stop capturing and finalize the accumulated chunks into one blob.
    ///
    /// Tracks are released before framing, so the device is let go even
    /// when finalization fails. A recording that produced no chunks yields
    /// an empty blob with no container framing; callers refuse to submit
    /// those.
    pub fn stop(&mut self) -> Result<MediaBlob, CaptureError> {
        let mut rec = self.active.take().ok_or(CaptureError::NotRecording)?;
        let format = rec.stream.format();
        rec.stream.release();

        // Release joins the capture worker, so everything sent is already
        // buffered in the channel.
        let mut data = Vec::new();
        for chunk in rec.chunks.try_iter() {
            data.extend_from_slice(&chunk.bytes);
        }

        if data.is_empty() {
            return Ok(MediaBlob::empty(format.mime()));
        }

        match format {
            StreamFormat::PcmS16Le { sample_rate_hz } => {
                let wav = wav_from_pcm_s16le(&data, sample_rate_hz)?;
                Ok(MediaBlob::new(crate::wav::WAV_MIME, wav))
            }
            StreamFormat::Opaque { mime } => Ok(MediaBlob::new(mime, data)),
        }
    }

    /// Discard the active recording, if any, releasing its tracks.
    pub fn abort(&mut self) {
        if let Some(mut rec) = self.active.take() {
            rec.stream.release();
        }
    }
}

impl Default for MediaRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MediaRecorder {
    fn drop(&mut self) {
        self.abort();
    }
}
