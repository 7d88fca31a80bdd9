pub mod controller;
pub mod session;
pub mod traits;

pub use controller::{SessionController, SessionError};
pub use session::{Phase, SessionSnapshot};
pub use traits::{
    AnswerVault, ExchangeError, ExchangeOutcome, QuestionExchange, SpeechSynthesizer, VaultError,
};
