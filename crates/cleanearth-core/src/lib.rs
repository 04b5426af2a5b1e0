//! Host-side core of the CleanEarth shell.
//!
//! Everything here is independent of the webview toolkit: the shell state
//! lives in [`bridge::HostShell`], background tasks talk to the webview only
//! by sending [`models::shell_types::ShellCommand`]s to a single foreground
//! dispatcher ([`bridge::run_foreground`]) that owns a [`bridge::WebSurface`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use bridge::{run_foreground, HostShell, WebSurface};
pub use config::ShellConfig;
pub use error::AppError;
