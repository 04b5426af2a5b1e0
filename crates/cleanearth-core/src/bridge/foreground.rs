use crate::bridge::scripts;
use crate::error::AppError;
use crate::models::shell_types::{NotificationKind, ShellCommand};
use log::{debug, error, warn};
use tokio::sync::mpsc;

pub const ANALYSIS_COMPLETE_MESSAGE: &str = "🤖 AI Analysis Complete!";

pub type CommandSender = mpsc::UnboundedSender<ShellCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<ShellCommand>;

/// The browser surface as seen from the shell. Only the foreground
/// dispatcher calls into it.
pub trait WebSurface: Send + Sync {
    fn evaluate(&self, script: &str) -> Result<(), AppError>;
    fn navigate(&self, url: &str) -> Result<(), AppError>;
    fn set_busy(&self, busy: bool);
    fn notify(&self, message: &str, kind: NotificationKind);
}

pub async fn run_foreground<S: WebSurface>(mut commands: CommandReceiver, surface: S) {
    while let Some(command) = commands.recv().await {
        apply_command(&surface, command);
    }
    debug!("Shell command channel closed, foreground dispatcher stopping");
}

pub fn apply_command<S: WebSurface + ?Sized>(surface: &S, command: ShellCommand) {
    match command {
        ShellCommand::SetBusy(busy) => surface.set_busy(busy),
        ShellCommand::Evaluate(script) => {
            if let Err(e) = surface.evaluate(&script) {
                warn!("Script injection failed: {}", e);
            }
        }
        ShellCommand::Navigate(url) => {
            if let Err(e) = surface.navigate(&url) {
                error!("Navigation to {} failed: {}", url, e);
            }
        }
        ShellCommand::ShowRetryPage(html) => {
            if let Err(e) = surface.evaluate(&scripts::replace_document_script(&html)) {
                error!("Failed to show retry page: {}", e);
            }
        }
        ShellCommand::DeliverResult(result) => {
            let json = match result.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!("{}", e);
                    return;
                }
            };
            match surface.evaluate(&scripts::delivery_script(&json)) {
                Ok(()) => surface.notify(ANALYSIS_COMPLETE_MESSAGE, NotificationKind::Success),
                Err(e) => warn!("Failed to deliver analysis result: {}", e),
            }
        }
        ShellCommand::Notify { message, kind } => surface.notify(&message, kind),
    }
}
