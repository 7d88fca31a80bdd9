pub mod elevenlabs;
pub mod interview;
pub mod parse;
pub mod request;
pub mod runtime;
