pub mod config_store;
pub mod exchange;
pub mod runtime_session;
pub mod secrets;
pub mod speech;
pub mod vault;
