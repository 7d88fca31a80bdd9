use std::sync::Arc;

use tokio::task;

use viva_core::{
    ConfigError, DeviceReport, DeviceStatus, MediaBlob, SessionConfig, SessionId, SubmissionStatus,
};
use viva_media::recorder::CaptureError;
use viva_media::source::{DeviceError, MediaSource, StreamConstraints};
use viva_media::{DeviceProbe, MediaRecorder};

use crate::session::{Phase, SessionSnapshot};
use crate::traits::{
    AnswerVault, ExchangeError, ExchangeOutcome, QuestionExchange, SpeechSynthesizer,
};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("device checks have not all passed")]
    NotArmed,

    #[error("device checks are only available before the session starts")]
    ChecksClosed,

    #[error("no question is awaiting an answer")]
    NoActiveQuestion,

    #[error("no recording is in progress")]
    NotRecording,

    #[error("no finalized recording to submit")]
    NoRecording,

    #[error("the recorded answer is empty; record it again before submitting")]
    EmptyRecording,

    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),

    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("exchange failed: {0}")]
    Exchange(#[from] ExchangeError),
}

/// Drives one interview run end to end: device checks gate `start`, then
/// each question cycles record → stop → submit until the budget or the
/// backend's sentinel finishes the session.
///
/// A single owner calls these `&mut self` entry points, so at most one
/// transition is in flight and every phase check is race-free. Collaborators
/// are trait objects; production wiring lives one crate up.
pub struct SessionController {
    session: SessionId,
    cfg: SessionConfig,
    exchange: Arc<dyn QuestionExchange>,
    speech: Arc<dyn SpeechSynthesizer>,
    vault: Arc<dyn AnswerVault>,
    source: Arc<dyn MediaSource>,
    probe: DeviceProbe,
    recorder: MediaRecorder,
    phase: Phase,
    question: Option<String>,
    pending: Option<MediaBlob>,
    last_warning: Option<String>,
    last_error: Option<String>,
}

impl SessionController {
    pub fn new(
        session: SessionId,
        cfg: SessionConfig,
        exchange: Arc<dyn QuestionExchange>,
        speech: Arc<dyn SpeechSynthesizer>,
        vault: Arc<dyn AnswerVault>,
        source: Arc<dyn MediaSource>,
    ) -> Result<Self, SessionError> {
        cfg.validate()?;
        Ok(Self {
            session,
            cfg,
            exchange,
            speech,
            vault,
            probe: DeviceProbe::new(Arc::clone(&source)),
            source,
            recorder: MediaRecorder::new(),
            phase: Phase::Idle,
            question: None,
            pending: None,
            last_warning: None,
            last_error: None,
        })
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn device_report(&self) -> &DeviceReport {
        self.probe.report()
    }

    /// True once a stopped recording awaits submission; shells use this to
    /// enable their submit control.
    pub fn has_pending_answer(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.clone(),
            phase_label: self.phase.label().to_string(),
            question_index: self.phase.question_index(),
            question_text: self.question.clone(),
            busy: self.phase.is_busy(),
            recording: self.phase.is_recording(),
            last_warning: self.last_warning.clone(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn check_microphone(&mut self) -> Result<DeviceStatus, SessionError> {
        self.ensure_checks_open()?;
        let status = self.probe.check_microphone();
        self.refresh_arming();
        Ok(status)
    }

    pub fn check_speakers(&mut self) -> Result<DeviceStatus, SessionError> {
        self.ensure_checks_open()?;
        let status = self.probe.check_speakers();
        self.refresh_arming();
        Ok(status)
    }

    pub fn check_camera(&mut self) -> Result<DeviceStatus, SessionError> {
        self.ensure_checks_open()?;
        let status = self.probe.check_camera();
        self.refresh_arming();
        Ok(status)
    }

    /// Join the interview and fetch question zero. Valid from `Armed`, and
    /// from `Faulted` so a failed start can simply be retried.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, Phase::Armed | Phase::Faulted { .. }) {
            return Err(SessionError::NotArmed);
        }

        self.phase = Phase::Starting;
        self.last_error = None;

        match self.run_start().await {
            Ok(first) => {
                self.question = Some(first.clone());
                self.phase = Phase::AskingQuestion { index: 0 };
                self.spawn_speech(&first);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.last_error = Some(message.clone());
                self.phase = Phase::Faulted { message };
                Err(SessionError::Exchange(e))
            }
        }
    }

    async fn run_start(&self) -> Result<String, ExchangeError> {
        let domain = self.exchange.join(&self.session).await?;
        log::info!(
            "joined interview {} in domain {}",
            self.session.as_str(),
            domain.as_str()
        );
        self.exchange.first_question(&domain).await
    }

    /// Open a capture stream for the current question. Any unsubmitted
    /// answer for this question is discarded; stopping again replaces it.
    pub fn begin_recording(&mut self) -> Result<(), SessionError> {
        let index = match self.phase {
            Phase::AskingQuestion { index } => index,
            Phase::Recording { .. } => {
                return Err(SessionError::Capture(CaptureError::AlreadyRecording));
            }
            _ => return Err(SessionError::NoActiveQuestion),
        };

        let constraints = if self.cfg.capture_video {
            StreamConstraints::audio_video()
        } else {
            StreamConstraints::audio_only()
        };
        let stream = self.source.open(constraints)?;
        self.recorder.start(stream)?;
        self.pending = None;
        self.phase = Phase::Recording { index };
        Ok(())
    }

    /// Stop capturing and hold the finalized blob for submission. The
    /// stream's tracks are released whether or not finalization succeeds.
    pub fn end_recording(&mut self) -> Result<(), SessionError> {
        let index = match self.phase {
            Phase::Recording { index } => index,
            _ => return Err(SessionError::NotRecording),
        };

        self.phase = Phase::AskingQuestion { index };
        let blob = self.recorder.stop()?;
        self.pending = Some(blob);
        Ok(())
    }

    /// Submit the held answer and advance. The vault write is initiated
    /// before the exchange call and the two complete independently; a vault
    /// failure downgrades to a warning. On exchange failure the index does
    /// not move and the answer stays held, so retry re-sends it without a
    /// new recording.
    pub async fn submit_answer(&mut self) -> Result<(), SessionError> {
        let index = match self.phase {
            Phase::AskingQuestion { index } => index,
            _ => return Err(SessionError::NoActiveQuestion),
        };
        let blob = match self.pending.take() {
            Some(b) => b,
            None => return Err(SessionError::NoRecording),
        };
        if blob.is_empty() {
            // Nothing reaches the exchange; the user records again.
            return Err(SessionError::EmptyRecording);
        }
        let previous = self.question.clone().unwrap_or_default();

        self.phase = Phase::Submitting { index };

        // The shadow log mirrors the vault's keys.
        if let Err(e) = self.vault.record_question(index, &previous) {
            self.note_warning(format!("question log write failed: {e}"));
        }

        // Initiate the durable write before the network call; a slow disk
        // must not delay the exchange.
        let vault = Arc::clone(&self.vault);
        let stored = blob.clone();
        let write = task::spawn_blocking(move || vault.store(index, &stored));

        let outcome = self
            .exchange
            .next_question(&self.session, &previous, &blob)
            .await;

        match write.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.note_warning(format!("answer not saved locally: {e}")),
            Err(e) => self.note_warning(format!("answer save task failed: {e}")),
        }

        match outcome {
            Err(e) => {
                self.record_vault_status(index, SubmissionStatus::Failed);
                self.pending = Some(blob);
                self.phase = Phase::AskingQuestion { index };
                self.last_error = Some(e.to_string());
                Err(SessionError::Exchange(e))
            }
            Ok(outcome) => {
                self.record_vault_status(index, SubmissionStatus::Submitted);
                self.last_error = None;
                let next_index = index + 1;
                match outcome {
                    ExchangeOutcome::Exhausted => self.finish(),
                    ExchangeOutcome::Question(_) if next_index >= self.cfg.question_budget => {
                        self.finish()
                    }
                    ExchangeOutcome::Question(text) => {
                        self.question = Some(text.clone());
                        self.phase = Phase::AskingQuestion { index: next_index };
                        self.spawn_speech(&text);
                    }
                }
                Ok(())
            }
        }
    }

    /// Release any held device stream and reset. Dropping the controller
    /// releases the stream too; this exists for orderly teardown.
    pub fn close(&mut self) {
        self.recorder.abort();
        self.pending = None;
        self.question = None;
        self.phase = Phase::Idle;
    }

    fn ensure_checks_open(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Idle | Phase::CheckingDevices | Phase::Armed | Phase::Faulted { .. } => Ok(()),
            _ => Err(SessionError::ChecksClosed),
        }
    }

    fn refresh_arming(&mut self) {
        self.phase = if self.probe.report().all_ok() {
            Phase::Armed
        } else {
            Phase::CheckingDevices
        };
    }

    fn finish(&mut self) {
        self.question = None;
        self.pending = None;
        self.phase = Phase::Finished;
    }

    fn record_vault_status(&mut self, index: usize, status: SubmissionStatus) {
        if let Err(e) = self.vault.set_status(index, status) {
            self.note_warning(format!("submission status not recorded: {e}"));
        }
    }

    fn note_warning(&mut self, message: String) {
        log::warn!("{message}");
        self.last_warning = Some(message);
    }

    fn spawn_speech(&self, text: &str) {
        let speech = Arc::clone(&self.speech);
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = speech.speak(&text).await {
                log::warn!("speech playback failed: {e:#}");
            }
        });
    }
}
