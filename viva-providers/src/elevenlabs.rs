use crate::request::{Body, HttpRequest};

/// Configuration for ElevenLabs text-to-speech.
#[derive(Clone, PartialEq, Eq)]
pub struct ElevenLabsTtsConfig {
    pub api_key: String,
    pub voice_id: String,
}

impl std::fmt::Debug for ElevenLabsTtsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsTtsConfig")
            .field("api_key", &"[REDACTED]")
            .field("voice_id", &self.voice_id)
            .finish()
    }
}

/// Synthesis is requested as raw 16 kHz PCM so playback needs no codec.
pub const TTS_OUTPUT_FORMAT: &str = "pcm_16000";
pub const TTS_SAMPLE_RATE_HZ: u32 = 16_000;

/// Build the synthesis call for one question's text. The response body is
/// the raw PCM clip.
pub fn build_tts_request(cfg: &ElevenLabsTtsConfig, text: &str) -> HttpRequest {
    let payload = serde_json::json!({ "text": text });

    HttpRequest {
        method: "POST".into(),
        url: format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}?output_format={}",
            cfg.voice_id, TTS_OUTPUT_FORMAT
        ),
        headers: vec![
            ("Content-Type".into(), "application/json".into()),
            ("xi-api-key".into(), cfg.api_key.clone()),
        ],
        body: Body::Json(payload.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_json_synthesis_request() {
        let cfg = ElevenLabsTtsConfig {
            api_key: "k".into(),
            voice_id: "Xb7hH8MSUJpSbSDYk0k2".into(),
        };
        let req = build_tts_request(&cfg, "Explain the CAP theorem");

        assert_eq!(req.method, "POST");
        assert!(req.url.contains("/v1/text-to-speech/Xb7hH8MSUJpSbSDYk0k2"));
        assert!(req.url.ends_with("output_format=pcm_16000"));
        assert_eq!(req.header("xi-api-key"), Some("k"));

        match &req.body {
            Body::Json(s) => {
                let v: serde_json::Value = serde_json::from_str(s).unwrap();
                assert_eq!(v["text"], "Explain the CAP theorem");
            }
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn config_debug_redacts_the_key() {
        let cfg = ElevenLabsTtsConfig {
            api_key: "xi-secret".into(),
            voice_id: "v".into(),
        };
        let s = format!("{cfg:?}");
        assert!(!s.contains("xi-secret"));
        assert!(s.contains("[REDACTED]"));
    }
}
