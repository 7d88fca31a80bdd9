use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client configuration: backend endpoint plus session and speech policy.
///
/// Secrets (the backend token, the speech API key) are stored outside this
/// struct at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Interview backend base URL, e.g. `https://interviews.example.com`.
    pub base_url: String,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub speech: SpeechConfig,

    /// Preferred capture device name; `None` selects the system default
    /// input.
    #[serde(default)]
    pub input_device: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session: SessionConfig::default(),
            speech: SpeechConfig::default(),
            input_device: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of questions in one interview run.
    #[serde(default = "default_question_budget")]
    pub question_budget: usize,

    #[serde(default)]
    pub first_question_auth: FirstQuestionAuth,

    /// Record the camera track alongside audio. Requires a camera feed
    /// from the embedding shell; the default captures audio only.
    #[serde(default)]
    pub capture_video: bool,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.question_budget == 0 {
            return Err(ConfigError::InvalidQuestionBudget);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            question_budget: default_question_budget(),
            first_question_auth: FirstQuestionAuth::default(),
            capture_video: false,
        }
    }
}

/// Policy for the first-question endpoint, which deployments commonly
/// expose without authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstQuestionAuth {
    /// Call the endpoint without credentials.
    #[default]
    Open,
    /// Attach the stored token, as every other interview call does.
    Bearer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Read each question aloud as it arrives.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Voice used for reading questions.
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            voice_id: default_voice_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("question budget must be at least 1")]
    InvalidQuestionBudget,
}

fn default_question_budget() -> usize {
    3
}

fn default_voice_id() -> String {
    "Xb7hH8MSUJpSbSDYk0k2".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_a_three_question_run() {
        let session = SessionConfig::default();
        assert_eq!(session.question_budget, 3);
        assert_eq!(session.first_question_auth, FirstQuestionAuth::Open);
        assert!(!session.capture_video);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let session = SessionConfig {
            question_budget: 0,
            ..SessionConfig::default()
        };
        assert_eq!(session.validate(), Err(ConfigError::InvalidQuestionBudget));
    }

    #[test]
    fn speech_defaults_to_enabled() {
        let speech = SpeechConfig::default();
        assert!(speech.enabled);
        assert!(!speech.voice_id.is_empty());
    }
}
