use async_trait::async_trait;
use viva_core::{Domain, MediaBlob, SessionId, SubmissionStatus};

/// Exchange failures are user-recoverable by retrying; the controller never
/// advances the question index on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("interview service returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// What a successful submission resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Question(String),
    /// The backend has no further questions for this session.
    Exhausted,
}

/// Network seam to the question-issuing backend.
#[async_trait]
pub trait QuestionExchange: Send + Sync {
    /// Enroll in the interview, resolving the domain questions are drawn
    /// from.
    async fn join(&self, session: &SessionId) -> Result<Domain, ExchangeError>;

    async fn first_question(&self, domain: &Domain) -> Result<String, ExchangeError>;

    /// Submit the recorded answer for the question last asked and fetch
    /// what follows it.
    async fn next_question(
        &self,
        session: &SessionId,
        previous_question: &str,
        answer: &MediaBlob,
    ) -> Result<ExchangeOutcome, ExchangeError>;
}

/// Speech is an accessibility aid. Callers run it detached and log
/// failures; it never blocks or fails a transition.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding: {0}")]
    Encode(String),

    #[error("no stored answer at index {0}")]
    Missing(usize),
}

/// Durable per-session store of recorded answers plus the question shadow
/// log. Keys are question indices; storing twice at one index overwrites.
/// Vault failures are non-fatal to a submission: callers downgrade them to
/// warnings and proceed with the exchange.
pub trait AnswerVault: Send + Sync {
    fn store(&self, index: usize, blob: &MediaBlob) -> Result<(), VaultError>;

    fn get(&self, index: usize) -> Result<Option<MediaBlob>, VaultError>;

    /// Indices with a stored answer, ascending.
    fn indices(&self) -> Result<Vec<usize>, VaultError>;

    fn set_status(&self, index: usize, status: SubmissionStatus) -> Result<(), VaultError>;

    /// Record the question text answered at `index`; the log mirrors the
    /// vault's keys.
    fn record_question(&self, index: usize, text: &str) -> Result<(), VaultError>;

    /// Question log entries as `(index, text)`, ascending by index.
    fn questions(&self) -> Result<Vec<(usize, String)>, VaultError>;
}
