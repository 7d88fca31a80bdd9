//! Deterministic media source for tests and the demo binary. Streams hold
//! their chunks up front, so flows run without hardware or timing.

use std::sync::{Mutex, mpsc};

use crate::source::{
    DeviceError, MediaChunk, MediaSource, MediaStream, StreamConstraints, StreamFormat,
    TrackHandle,
};

/// Behavior of one scripted capability.
#[derive(Debug, Clone)]
pub enum ScriptedDevice {
    /// Acquisition succeeds; streams carry these chunks.
    Available { chunks: Vec<Vec<u8>> },
    Denied,
    Absent,
}

impl ScriptedDevice {
    pub fn silent() -> Self {
        Self::Available { chunks: Vec::new() }
    }
}

pub struct ScriptedSource {
    sample_rate_hz: u32,
    audio: ScriptedDevice,
    video: ScriptedDevice,
    opened: Mutex<Vec<TrackHandle>>,
}

impl ScriptedSource {
    /// Microphone and camera both acquirable; audio streams carry `chunks`.
    pub fn available(sample_rate_hz: u32, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            sample_rate_hz,
            audio: ScriptedDevice::Available { chunks },
            video: ScriptedDevice::silent(),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn with_audio(mut self, audio: ScriptedDevice) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_video(mut self, video: ScriptedDevice) -> Self {
        self.video = video;
        self
    }

    /// Handles of every stream this source has served, in open order. Tests
    /// use these to assert that callers released what they acquired.
    pub fn opened_tracks(&self) -> Vec<TrackHandle> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl MediaSource for ScriptedSource {
    fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        if !constraints.audio && !constraints.video {
            return Err(DeviceError::NoTracksRequested);
        }

        let stream = if constraints.video {
            match &self.video {
                ScriptedDevice::Available { chunks } => {
                    // Camera-bearing capture comes back as one opaque
                    // container stream.
                    ScriptedStream::opaque("video/webm", chunks.clone())
                }
                ScriptedDevice::Denied => return Err(DeviceError::AccessDenied),
                ScriptedDevice::Absent => return Err(DeviceError::NoCamera),
            }
        } else {
            match &self.audio {
                ScriptedDevice::Available { chunks } => {
                    ScriptedStream::pcm(self.sample_rate_hz, chunks.clone())
                }
                ScriptedDevice::Denied => return Err(DeviceError::AccessDenied),
                ScriptedDevice::Absent => return Err(DeviceError::NoInputDevice),
            }
        };

        if let Ok(mut opened) = self.opened.lock() {
            opened.push(stream.track_handle());
        }
        Ok(Box::new(stream))
    }
}

pub struct ScriptedStream {
    format: StreamFormat,
    chunks: Option<mpsc::Receiver<MediaChunk>>,
    track: TrackHandle,
}

impl ScriptedStream {
    pub fn pcm(sample_rate_hz: u32, chunks: Vec<Vec<u8>>) -> Self {
        Self::with_format(StreamFormat::PcmS16Le { sample_rate_hz }, chunks)
    }

    pub fn opaque(mime: impl Into<String>, chunks: Vec<Vec<u8>>) -> Self {
        Self::with_format(StreamFormat::Opaque { mime: mime.into() }, chunks)
    }

    fn with_format(format: StreamFormat, chunks: Vec<Vec<u8>>) -> Self {
        let (tx, rx) = mpsc::channel();
        for bytes in chunks {
            let _ = tx.send(MediaChunk { bytes });
        }
        // The sender drops here; the receiver drains the scripted chunks
        // and then reports disconnect, like a stopped live stream.
        Self {
            format,
            chunks: Some(rx),
            track: TrackHandle::new(),
        }
    }
}

impl MediaStream for ScriptedStream {
    fn format(&self) -> StreamFormat {
        self.format.clone()
    }

    fn take_chunks(&mut self) -> Option<mpsc::Receiver<MediaChunk>> {
        self.chunks.take()
    }

    fn track_handle(&self) -> TrackHandle {
        self.track.clone()
    }

    fn release(&mut self) {
        self.track.mark_released();
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Little-endian byte form of 16-bit samples, for scripting audio chunks.
pub fn s16le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_serves_scripted_chunks_then_disconnects() {
        let mut stream = ScriptedStream::pcm(16_000, vec![vec![1, 2], vec![3, 4]]);
        let rx = stream.take_chunks().unwrap();
        assert!(stream.take_chunks().is_none());

        let collected: Vec<MediaChunk> = rx.try_iter().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].bytes, vec![1, 2]);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn release_is_observable_and_idempotent() {
        let mut stream = ScriptedStream::pcm(16_000, Vec::new());
        let track = stream.track_handle();
        assert!(!track.released());
        stream.release();
        stream.release();
        assert!(track.released());
    }

    #[test]
    fn denied_audio_fails_acquisition() {
        let source =
            ScriptedSource::available(16_000, Vec::new()).with_audio(ScriptedDevice::Denied);
        match source.open(StreamConstraints::audio_only()) {
            Err(DeviceError::AccessDenied) => {}
            Err(other) => panic!("expected AccessDenied, got {other:?}"),
            Ok(_) => panic!("expected AccessDenied, got a stream"),
        }
    }

    #[test]
    fn source_logs_served_streams() {
        let source = ScriptedSource::available(16_000, Vec::new());
        let mut stream = source.open(StreamConstraints::audio_only()).unwrap();

        let tracks = source.opened_tracks();
        assert_eq!(tracks.len(), 1);
        assert!(!tracks[0].released());

        stream.release();
        assert!(source.opened_tracks()[0].released());
    }
}
