use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use viva_core::config::ClientConfig;
use viva_core::types::SessionId;
use viva_engine::controller::SessionController;
use viva_engine::traits::{AnswerVault, QuestionExchange, SpeechSynthesizer};
use viva_media::scripted::{ScriptedSource, s16le_bytes};
use viva_media::source::MediaSource;
use viva_runtime::config_store::ConfigStore;
use viva_runtime::exchange::HttpQuestionExchange;
use viva_runtime::runtime_session::build_controller_from_config;
use viva_runtime::secrets::{SecretKey, get_secret};
use viva_runtime::speech::ElevenLabsSpeaker;
use viva_runtime::vault::FsAnswerVault;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn load_config(speech_key: &str) -> anyhow::Result<ClientConfig> {
    if let Ok(path) = std::env::var("VIVA_CONFIG") {
        return ConfigStore::at_path(path).load();
    }

    let mut cfg = ClientConfig::new(env_or("VIVA_BASE_URL", "http://localhost:8000"));
    if let Ok(budget) = std::env::var("VIVA_QUESTION_BUDGET") {
        cfg.session.question_budget = budget.parse().context("parse VIVA_QUESTION_BUDGET")?;
    }
    cfg.speech.enabled = !speech_key.trim().is_empty();
    Ok(cfg)
}

fn scripted_source() -> Arc<ScriptedSource> {
    // A short ramp so stored answers are recognizably non-silent.
    let samples: Vec<i16> = (0..1600).map(|i| ((i % 320) * 100 - 16_000) as i16).collect();
    Arc::new(ScriptedSource::available(16_000, vec![s16le_bytes(&samples)]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("viva interview client starting");

    // MVP CLI behavior: drive one full interview against a real backend.
    // Capture is scripted by default so this runs on machines without audio
    // hardware; set VIVA_CAPTURE_MIC=1 to record from the default input
    // device instead (secrets then come from the OS keyring).

    let capture_mic = std::env::var("VIVA_CAPTURE_MIC").is_ok();
    let speech_key = std::env::var("VIVA_ELEVENLABS_API_KEY").unwrap_or_default();

    let cfg = load_config(&speech_key)?;
    let session = SessionId::new(env_or("VIVA_TEST_ID", "demo-test"));
    let data_dir = PathBuf::from(env_or("VIVA_DATA_DIR", "viva-data"));

    let record_secs: u64 = match std::env::var("VIVA_RECORD_SECS") {
        Ok(v) => v.parse().context("parse VIVA_RECORD_SECS")?,
        Err(_) if capture_mic => 5,
        Err(_) => 0,
    };

    let mut controller = if capture_mic {
        // No real camera in a terminal; a scripted feed satisfies the
        // camera check so audio-only runs can arm.
        build_controller_from_config(&cfg, session.clone(), &data_dir, Some(scripted_source()))?
    } else {
        let token = match std::env::var("VIVA_API_TOKEN") {
            Ok(t) => Some(t),
            Err(_) => get_secret(SecretKey::ApiToken)
                .context("read token from keyring (set VIVA_API_TOKEN to skip)")?,
        };

        let exchange: Arc<dyn QuestionExchange> = Arc::new(HttpQuestionExchange::new(
            cfg.base_url.clone(),
            token,
            cfg.session.first_question_auth,
        )?);
        let speech: Arc<dyn SpeechSynthesizer> =
            Arc::new(ElevenLabsSpeaker::from_config(&cfg.speech, Some(speech_key)));
        let vault: Arc<dyn AnswerVault> =
            Arc::new(FsAnswerVault::at_root(data_dir.join("answers"), &session));
        let source: Arc<dyn MediaSource> = scripted_source();

        SessionController::new(session.clone(), cfg.session, exchange, speech, vault, source)?
    };

    controller.check_microphone()?;
    controller.check_speakers()?;
    controller.check_camera()?;
    let report = *controller.device_report();
    println!(
        "devices: microphone={:?} speakers={:?} camera={:?}",
        report.microphone, report.speakers, report.camera
    );
    if !report.all_ok() {
        anyhow::bail!("device checks failed; cannot start the interview");
    }

    controller.start().await?;

    loop {
        let snapshot = controller.snapshot();
        let Some(index) = snapshot.question_index else {
            break;
        };
        println!(
            "[q{}] {}",
            index + 1,
            snapshot.question_text.as_deref().unwrap_or("")
        );

        controller.begin_recording()?;
        if record_secs > 0 {
            println!("recording for {record_secs}s...");
            tokio::time::sleep(Duration::from_secs(record_secs)).await;
        }
        controller.end_recording()?;
        controller.submit_answer().await?;
    }

    let snapshot = controller.snapshot();
    println!("phase={}", snapshot.phase_label);
    if let Some(warning) = snapshot.last_warning {
        println!("warning: {warning}");
    }
    println!(
        "answers stored under {}",
        data_dir.join("answers").join(session.as_str()).display()
    );

    Ok(())
}
