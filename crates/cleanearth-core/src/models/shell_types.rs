use crate::models::analysis_types::AnalysisResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// Work for the foreground dispatcher. Background tasks never touch the
/// webview directly; they send one of these instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    SetBusy(bool),
    Evaluate(String),
    Navigate(String),
    ShowRetryPage(String),
    DeliverResult(AnalysisResult),
    Notify {
        message: String,
        kind: NotificationKind,
    },
}
