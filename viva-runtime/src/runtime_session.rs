use std::path::Path;
use std::sync::Arc;

use viva_core::config::ClientConfig;
use viva_core::types::SessionId;
use viva_engine::controller::SessionController;
use viva_engine::traits::{AnswerVault, QuestionExchange, SpeechSynthesizer};
use viva_media::CpalMediaSource;
use viva_media::source::MediaSource;

use crate::exchange::HttpQuestionExchange;
use crate::secrets::{SecretKey, get_secret};
use crate::speech::ElevenLabsSpeaker;
use crate::vault::FsAnswerVault;

/// Build a runnable controller from config + stored secrets.
///
/// This keeps the shell layer thin. `camera` is the shell's camera feed;
/// pass `None` for audio-only deployments (the camera check then reports
/// a failure and the session cannot arm with `capture_video` set).
pub fn build_controller_from_config(
    cfg: &ClientConfig,
    session: SessionId,
    data_dir: &Path,
    camera: Option<Arc<dyn MediaSource>>,
) -> anyhow::Result<SessionController> {
    let token = get_secret(SecretKey::ApiToken)?;
    let speech_key = get_secret(SecretKey::ElevenLabsApiKey)?;

    let exchange: Arc<dyn QuestionExchange> = Arc::new(HttpQuestionExchange::new(
        cfg.base_url.clone(),
        token,
        cfg.session.first_question_auth,
    )?);
    let speech: Arc<dyn SpeechSynthesizer> =
        Arc::new(ElevenLabsSpeaker::from_config(&cfg.speech, speech_key));
    let vault: Arc<dyn AnswerVault> =
        Arc::new(FsAnswerVault::at_root(data_dir.join("answers"), &session));

    let mut source = CpalMediaSource::new();
    if let Some(name) = &cfg.input_device {
        source = source.with_input_device(name.clone());
    }
    if let Some(feed) = camera {
        source = source.with_camera_feed(feed);
    }
    let source: Arc<dyn MediaSource> = Arc::new(source);

    Ok(SessionController::new(
        session,
        cfg.session,
        exchange,
        speech,
        vault,
        source,
    )?)
}
