use anyhow::Context;
use async_trait::async_trait;

use viva_core::config::SpeechConfig;
use viva_engine::traits::SpeechSynthesizer;
use viva_media::playback::play_pcm_s16le;
use viva_providers::elevenlabs::{self, ElevenLabsTtsConfig, TTS_SAMPLE_RATE_HZ};
use viva_providers::runtime;

/// Reads question text aloud through the default output device.
///
/// A speaker built without a key, or with speech disabled, swallows every
/// request so callers never branch on the setting.
#[derive(Debug)]
pub struct ElevenLabsSpeaker {
    cfg: Option<ElevenLabsTtsConfig>,
}

impl ElevenLabsSpeaker {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            cfg: Some(ElevenLabsTtsConfig {
                api_key: api_key.into(),
                voice_id: voice_id.into(),
            }),
        }
    }

    /// Speaker that ignores every request.
    pub fn muted() -> Self {
        Self { cfg: None }
    }

    /// Build from config plus the stored key. Enabled speech without a key
    /// mutes with a warning instead of failing the session.
    pub fn from_config(speech: &SpeechConfig, api_key: Option<String>) -> Self {
        if !speech.enabled {
            return Self::muted();
        }
        match api_key {
            Some(key) if !key.trim().is_empty() => Self::new(key, speech.voice_id.clone()),
            _ => {
                log::warn!("speech is enabled but no ElevenLabs API key is stored; muting");
                Self::muted()
            }
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeaker {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        let Some(cfg) = &self.cfg else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }

        let req = elevenlabs::build_tts_request(cfg, text);
        let resp = runtime::execute(&req).await.context("synthesize speech")?;
        if !(200..=299).contains(&resp.status) {
            return Err(anyhow::anyhow!(
                "speech synthesis failed: status={} body={}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            ));
        }

        // The body is raw PCM in the requested output format. Playback
        // blocks for the clip's duration, so it runs off the async runtime.
        let pcm = resp.body;
        tokio::task::spawn_blocking(move || play_pcm_s16le(&pcm, TTS_SAMPLE_RATE_HZ))
            .await
            .context("join playback task")?
            .context("play synthesized speech")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn muted_speaker_ignores_requests() {
        let speaker = ElevenLabsSpeaker::muted();
        speaker.speak("Describe a B-tree").await.unwrap();
    }

    #[test]
    fn speech_disabled_in_config_mutes() {
        let cfg = SpeechConfig {
            enabled: false,
            ..SpeechConfig::default()
        };
        let speaker = ElevenLabsSpeaker::from_config(&cfg, Some("key".into()));
        assert!(speaker.cfg.is_none());
    }

    #[test]
    fn a_missing_key_mutes_instead_of_failing() {
        let speaker = ElevenLabsSpeaker::from_config(&SpeechConfig::default(), None);
        assert!(speaker.cfg.is_none());

        let speaker = ElevenLabsSpeaker::from_config(&SpeechConfig::default(), Some("  ".into()));
        assert!(speaker.cfg.is_none());
    }

    #[test]
    fn a_stored_key_enables_synthesis() {
        let speaker = ElevenLabsSpeaker::from_config(&SpeechConfig::default(), Some("key".into()));
        assert!(speaker.cfg.is_some());
    }
}
