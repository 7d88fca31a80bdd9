use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream};

use crate::resample::resample_mono_f32;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("no output device found")]
    NoOutputDevice,

    #[error("failed to get default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to play stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("playback did not finish in time")]
    Timeout,

    #[error("failed to resample: {0}")]
    Resample(#[from] anyhow::Error),

    #[error("internal channel error")]
    Channel,
}

/// Play little-endian 16-bit mono PCM through the default output device,
/// blocking until the clip has drained. Synthesis output arrives at 16 kHz
/// and is resampled here to the device's native rate.
pub fn play_pcm_s16le(pcm: &[u8], sample_rate_hz: u32) -> Result<(), PlaybackError> {
    let samples = pcm_to_f32(pcm);
    if samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(PlaybackError::NoOutputDevice)?;
    let supported = device.default_output_config()?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let out_rate = config.sample_rate.0;
    let samples = if out_rate == sample_rate_hz {
        samples
    } else {
        resample_mono_f32(&samples, sample_rate_hz, out_rate)?
    };

    let channels = config.channels as usize;
    let clip_len = samples.len();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let stream = match sample_format {
        SampleFormat::F32 => {
            build_playback_stream::<f32>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::I16 => {
            build_playback_stream::<i16>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::U16 => {
            build_playback_stream::<u16>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::I8 => {
            build_playback_stream::<i8>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::U8 => {
            build_playback_stream::<u8>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::I32 => {
            build_playback_stream::<i32>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::U32 => {
            build_playback_stream::<u32>(&device, &config, channels, samples, done_tx)
        }
        SampleFormat::F64 => {
            build_playback_stream::<f64>(&device, &config, channels, samples, done_tx)
        }
        _ => build_playback_stream::<f32>(&device, &config, channels, samples, done_tx),
    }?;

    stream.play()?;

    let clip = Duration::from_secs_f64(clip_len as f64 / out_rate as f64);
    match done_rx.recv_timeout(clip + Duration::from_secs(5)) {
        Ok(()) => {}
        Err(mpsc::RecvTimeoutError::Timeout) => return Err(PlaybackError::Timeout),
        Err(mpsc::RecvTimeoutError::Disconnected) => return Err(PlaybackError::Channel),
    }

    // Let the device drain its last buffer before tearing the stream down.
    std::thread::sleep(Duration::from_millis(200));
    drop(stream);
    Ok(())
}

fn build_playback_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    samples: Vec<f32>,
    done_tx: mpsc::Sender<()>,
) -> Result<Stream, cpal::BuildStreamError>
where
    T: Sample + SizedSample + cpal::FromSample<f32> + Send + 'static,
{
    let mut pos = 0usize;
    let mut signalled = false;

    let cb = move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
        for frame in data.chunks_mut(channels.max(1)) {
            let value = if pos < samples.len() {
                let v = samples[pos];
                pos += 1;
                v
            } else {
                0.0
            };
            for slot in frame.iter_mut() {
                *slot = T::from_sample(value);
            }
        }
        if pos >= samples.len() && !signalled {
            signalled = true;
            let _ = done_tx.send(());
        }
    };

    device.build_output_stream(
        config,
        cb,
        |err| {
            log::error!("Output stream error: {err}");
        },
        None,
    )
}

fn pcm_to_f32(pcm: &[u8]) -> Vec<f32> {
    pcm.chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}
