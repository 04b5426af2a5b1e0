use cleanearth_core::models::shell_types::NotificationKind;
use cleanearth_core::{AppError, HostShell, WebSurface};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
#[cfg(desktop)]
use tauri::window::{ProgressBarState, ProgressBarStatus};
use tauri::{Emitter, Manager, Url, WebviewWindow};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The main webview window as the shell's browser surface.
pub struct TauriSurface {
    window: WebviewWindow,
    client: reqwest::Client,
}

impl TauriSurface {
    pub fn new(window: WebviewWindow) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .map_err(|e| AppError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { window, client })
    }
}

impl WebSurface for TauriSurface {
    fn evaluate(&self, script: &str) -> Result<(), AppError> {
        self.window.eval(script).map_err(|e| AppError {
            message: format!("Failed to evaluate script: {}", e),
        })
    }

    /// Probes `url` first; an unreachable site goes to the error hook instead
    /// of leaving the webview on a blank page.
    fn navigate(&self, url: &str) -> Result<(), AppError> {
        let target = Url::parse(url).map_err(|e| AppError {
            message: format!("Invalid URL {}: {}", url, e),
        })?;
        let window = self.window.clone();
        let client = self.client.clone();

        tauri::async_runtime::spawn(async move {
            let failure = match client.get(target.clone()).send().await {
                Ok(response) => {
                    debug!("Probe of {} answered {}", target, response.status());
                    window.navigate(target).err().map(|e| e.to_string())
                }
                Err(e) => Some(e.to_string()),
            };
            if let Some(description) = failure {
                window.state::<Arc<HostShell>>().page_failed(&description);
            }
        });
        Ok(())
    }

    fn set_busy(&self, busy: bool) {
        #[cfg(desktop)]
        {
            let status = if busy {
                ProgressBarStatus::Indeterminate
            } else {
                ProgressBarStatus::None
            };
            let state = ProgressBarState {
                status: Some(status),
                progress: None,
            };
            if let Err(e) = self.window.set_progress_bar(state) {
                debug!("Progress bar unavailable: {}", e);
            }
        }
        if let Err(e) = self.window.emit("page-loading", busy) {
            warn!("Failed to emit page-loading: {}", e);
        }
    }

    fn notify(&self, message: &str, kind: NotificationKind) {
        info!("{}", message);
        if let Err(e) = self.window.emit(
            "shell-notification",
            serde_json::json!({ "message": message, "kind": kind }),
        ) {
            warn!("Failed to emit notification: {}", e);
        }
    }
}
