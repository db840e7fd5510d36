pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub mod app;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileTokenStore, MemoryTokenStore};
pub use config::ClientConfig;
pub use core::{api_client::ApiClient, qr_gate::QrGate, qr_session::QrSessionService};
pub use utils::error::{ClientError, Result};
