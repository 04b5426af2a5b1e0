use crate::bridge::scripts;
use crate::config::ShellConfig;
use crate::models::shell_types::ShellCommand;
use log::{debug, info, warn};

/// Page-load bookkeeping for the single browser surface. Each hook returns
/// the commands the foreground has to apply, in order.
#[derive(Debug, Clone)]
pub struct NavigationLifecycle {
    base_url: String,
    bootstrap: String,
    busy: bool,
    showing_retry_page: bool,
}

impl NavigationLifecycle {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            bootstrap: scripts::bootstrap_script(config),
            busy: false,
            showing_retry_page: false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_showing_retry_page(&self) -> bool {
        self.showing_retry_page
    }

    pub fn on_start(&mut self, url: &str) -> Vec<ShellCommand> {
        debug!("Page load started: {}", url);
        self.busy = true;
        self.showing_retry_page = false;
        vec![ShellCommand::SetBusy(true)]
    }

    /// The script environment is rebuilt on every load, so the bootstrap is
    /// installed again each time.
    pub fn on_finish(&mut self, url: &str) -> Vec<ShellCommand> {
        debug!("Page load finished: {}", url);
        self.busy = false;
        vec![
            ShellCommand::SetBusy(false),
            ShellCommand::Evaluate(self.bootstrap.clone()),
        ]
    }

    pub fn on_error(&mut self, description: &str) -> Vec<ShellCommand> {
        warn!("Failed to load {}: {}", self.base_url, description);
        self.busy = false;
        self.showing_retry_page = true;
        vec![
            ShellCommand::SetBusy(false),
            ShellCommand::ShowRetryPage(scripts::retry_page(&self.base_url)),
        ]
    }

    /// Re-issues the navigation to the base URL. The indicator goes up here
    /// because the surface may check reachability before the load starts.
    pub fn reload(&mut self) -> Vec<ShellCommand> {
        info!("Navigating to {}", self.base_url);
        self.busy = true;
        self.showing_retry_page = false;
        vec![
            ShellCommand::SetBusy(true),
            ShellCommand::Navigate(self.base_url.clone()),
        ]
    }
}
