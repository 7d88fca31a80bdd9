pub mod config;
pub mod device;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use device::*;
pub use types::*;
