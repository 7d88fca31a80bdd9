use std::sync::{Arc, mpsc};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream};

use crate::source::{
    DeviceError, MediaChunk, MediaSource, MediaStream, StreamConstraints, StreamFormat,
    TrackHandle,
};

/// Microphone-backed media source. Camera-bearing constraints are delegated
/// to a feed installed by the embedding shell; without one, camera
/// acquisition fails as hardware-absent.
pub struct CpalMediaSource {
    input_device: Option<String>,
    camera_feed: Option<Arc<dyn MediaSource>>,
}

impl CpalMediaSource {
    pub fn new() -> Self {
        Self {
            input_device: None,
            camera_feed: None,
        }
    }

    pub fn with_input_device(mut self, name: impl Into<String>) -> Self {
        self.input_device = Some(name.into());
        self
    }

    pub fn with_camera_feed(mut self, feed: Arc<dyn MediaSource>) -> Self {
        self.camera_feed = Some(feed);
        self
    }

    pub fn list_input_device_names() -> Result<Vec<String>, DeviceError> {
        let host = cpal::default_host();
        let mut out = Vec::new();
        for dev in host.input_devices()? {
            if let Ok(name) = dev.name() {
                out.push(name);
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }
}

impl Default for CpalMediaSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for CpalMediaSource {
    fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn MediaStream>, DeviceError> {
        if !constraints.audio && !constraints.video {
            return Err(DeviceError::NoTracksRequested);
        }

        if constraints.video {
            return match &self.camera_feed {
                Some(feed) => feed.open(constraints),
                None => Err(DeviceError::NoCamera),
            };
        }

        let stream = CpalAudioStream::open(self.input_device.as_deref())?;
        Ok(Box::new(stream))
    }
}

enum WorkerMsg {
    Ready,
    Error(String),
}

/// Live microphone stream. The cpal stream itself is not `Send`, so a
/// dedicated worker thread owns it; the handle only carries channels.
pub struct CpalAudioStream {
    stop_tx: mpsc::Sender<()>,
    worker_handle: Option<std::thread::JoinHandle<()>>,
    chunks: Option<mpsc::Receiver<MediaChunk>>,
    sample_rate_hz: u32,
    track: TrackHandle,
}

impl CpalAudioStream {
    fn open(preferred: Option<&str>) -> Result<Self, DeviceError> {
        let host = cpal::default_host();

        let mut device = None;
        if let Some(needle) = preferred {
            let needle = needle.trim();
            if !needle.is_empty() {
                if let Ok(devices) = host.input_devices() {
                    for dev in devices {
                        if let Ok(name) = dev.name() {
                            if name == needle {
                                log::info!("Using input device: {name}");
                                device = Some(dev);
                                break;
                            }
                        }
                    }
                }
                if device.is_none() {
                    log::warn!(
                        "Preferred input device not found, falling back to default: {needle}"
                    );
                }
            }
        }
        let device = match device {
            Some(d) => d,
            None => host
                .default_input_device()
                .ok_or(DeviceError::NoInputDevice)?,
        };

        // Capture at the device's default config; WAV framing keeps the
        // native rate, so no resample sits on the capture path.
        let default_cfg = device.default_input_config()?;
        let sample_rate_hz = default_cfg.sample_rate().0;

        let (chunk_tx, chunk_rx) = mpsc::channel::<MediaChunk>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (worker_tx, worker_rx) = mpsc::channel::<WorkerMsg>();

        let worker_handle = std::thread::spawn(move || {
            let config = default_cfg;
            let channels = config.channels() as usize;

            let stream = match config.sample_format() {
                SampleFormat::F32 => {
                    build_chunk_stream::<f32>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::I16 => {
                    build_chunk_stream::<i16>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::U16 => {
                    build_chunk_stream::<u16>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::I8 => {
                    build_chunk_stream::<i8>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::U8 => {
                    build_chunk_stream::<u8>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::I32 => {
                    build_chunk_stream::<i32>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::U32 => {
                    build_chunk_stream::<u32>(&device, &config.clone().into(), channels, chunk_tx)
                }
                SampleFormat::F64 => {
                    build_chunk_stream::<f64>(&device, &config.clone().into(), channels, chunk_tx)
                }
                _ => build_chunk_stream::<f32>(&device, &config.clone().into(), channels, chunk_tx),
            };

            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    let _ = worker_tx.send(WorkerMsg::Error(format!("build stream: {e}")));
                    log::error!("Input stream build failed: {e}");
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = worker_tx.send(WorkerMsg::Error(format!("play stream: {e}")));
                log::error!("Input stream play failed: {e}");
                return;
            }

            let _ = worker_tx.send(WorkerMsg::Ready);

            // Hold the stream until released; either the stop signal or the
            // handle dropping its sender ends it.
            let _ = stop_rx.recv();
            drop(stream);
        });

        // Block briefly until the worker has either started the stream or failed.
        match worker_rx.recv_timeout(Duration::from_secs(2)) {
            Ok(WorkerMsg::Ready) => {}
            Ok(WorkerMsg::Error(e)) => return Err(DeviceError::Worker(e)),
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(DeviceError::WorkerTimeout),
            Err(_) => return Err(DeviceError::Channel),
        }

        Ok(Self {
            stop_tx,
            worker_handle: Some(worker_handle),
            chunks: Some(chunk_rx),
            sample_rate_hz,
            track: TrackHandle::new(),
        })
    }
}

impl MediaStream for CpalAudioStream {
    fn format(&self) -> StreamFormat {
        StreamFormat::PcmS16Le {
            sample_rate_hz: self.sample_rate_hz,
        }
    }

    fn take_chunks(&mut self) -> Option<mpsc::Receiver<MediaChunk>> {
        self.chunks.take()
    }

    fn track_handle(&self) -> TrackHandle {
        self.track.clone()
    }

    fn release(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(h) = self.worker_handle.take() {
            let _ = h.join();
        }
        self.track.mark_released();
    }
}

impl Drop for CpalAudioStream {
    fn drop(&mut self) {
        self.release();
    }
}

fn build_chunk_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    chunk_tx: mpsc::Sender<MediaChunk>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: Sample + SizedSample + Send + 'static,
    f32: cpal::FromSample<T>,
{
    let cb = move |data: &[T], _: &cpal::InputCallbackInfo| {
        let frames = data.len() / channels.max(1);
        let mut bytes = Vec::with_capacity(frames * 2);

        if channels == 1 {
            for &s in data {
                push_sample_s16(&mut bytes, s.to_sample::<f32>());
            }
        } else {
            for frame in data.chunks_exact(channels) {
                let mono =
                    frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / channels as f32;
                push_sample_s16(&mut bytes, mono);
            }
        }

        let _ = chunk_tx.send(MediaChunk { bytes });
    };

    device.build_input_stream(
        config,
        cb,
        |err| {
            // These errors are crucial to debug "recording started but silent".
            log::error!("Input stream error: {err}");
        },
        None,
    )
}

fn push_sample_s16(out: &mut Vec<u8>, value: f32) {
    let quantized = (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
    out.extend_from_slice(&quantized.to_le_bytes());
}
