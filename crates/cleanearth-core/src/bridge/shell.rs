use crate::bridge::foreground::{CommandReceiver, CommandSender};
use crate::bridge::scripts::{self, READY_MESSAGE};
use crate::config::ShellConfig;
use crate::error::AppError;
use crate::models::analysis_types::{analysis_timestamp, AnalysisResult, Detection, ModelStatus};
use crate::models::selection_types::{FileSelection, SelectionParams, SelectionTicket};
use crate::models::shell_types::{NotificationKind, ShellCommand};
use crate::services::analysis::engine::DetectionRng;
use crate::services::analysis::pipeline::{AnalysisService, EngineState};
use crate::services::file_selection::{FilePicker, FileSelectionHandshake};
use crate::services::navigation::NavigationLifecycle;
use crate::services::permissions::{self, Permission, PermissionProbe};
use crate::services::readiness::{ModelReadiness, WarmUpOutcome};
use log::{info, warn};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};

pub const MODEL_FALLBACK_MESSAGE: &str = "AI Simulation initialized";

/// Everything the host shell owns: readiness, the analysis engine, the file
/// handshake and the navigation lifecycle. Webview work is never done here;
/// it is queued as [`ShellCommand`]s for the foreground dispatcher.
pub struct HostShell {
    config: ShellConfig,
    readiness: ModelReadiness,
    analysis: AnalysisService,
    selection: FileSelectionHandshake,
    navigation: Mutex<NavigationLifecycle>,
    commands: CommandSender,
}

impl HostShell {
    pub fn new(config: ShellConfig, rng: Box<dyn DetectionRng>) -> (Self, CommandReceiver) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let readiness = ModelReadiness::new();
        let analysis = AnalysisService::new(
            readiness.clone(),
            config.analysis_delay(),
            rng,
            commands.clone(),
        );
        let navigation = Mutex::new(NavigationLifecycle::new(&config));

        let shell = Self {
            config,
            readiness,
            analysis,
            selection: FileSelectionHandshake::new(),
            navigation,
            commands,
        };
        (shell, receiver)
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn readiness(&self) -> &ModelReadiness {
        &self.readiness
    }

    // Bridge operations

    pub fn request_analysis(&self, image_data: &str) -> u64 {
        self.analysis.request(image_data)
    }

    pub fn model_status(&self) -> ModelStatus {
        self.readiness.status()
    }

    pub fn simulated_detection(&self) -> Result<String, AppError> {
        AnalysisResult::Completed(Detection::sample(analysis_timestamp())).to_json()
    }

    pub fn analysis_state(&self) -> EngineState {
        self.analysis.state()
    }

    // Readiness warm-up

    pub async fn warm_up(&self) -> WarmUpOutcome {
        self.warm_up_with(async { Ok(()) }).await
    }

    pub async fn warm_up_with<F>(&self, load: F) -> WarmUpOutcome
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let outcome = self.readiness.warm_up(self.config.warm_up(), load).await;
        let (message, kind) = match &outcome {
            WarmUpOutcome::Loaded => (READY_MESSAGE, NotificationKind::Success),
            WarmUpOutcome::Fallback(_) => (MODEL_FALLBACK_MESSAGE, NotificationKind::Info),
        };
        self.send(ShellCommand::Notify {
            message: message.to_string(),
            kind,
        });
        outcome
    }

    // Navigation lifecycle

    pub fn load_home(&self) {
        let commands = self.lock_navigation().reload();
        self.send_all(commands);
    }

    pub fn page_started(&self, url: &str) {
        let commands = self.lock_navigation().on_start(url);
        self.send_all(commands);
    }

    pub fn page_finished(&self, url: &str) {
        let commands = self.lock_navigation().on_finish(url);
        self.send_all(commands);
    }

    pub fn page_failed(&self, description: &str) {
        let commands = self.lock_navigation().on_error(description);
        self.send_all(commands);
    }

    pub fn retry(&self) {
        let commands = self.lock_navigation().reload();
        self.send_all(commands);
    }

    pub fn go_back(&self) {
        self.send(ShellCommand::Evaluate(scripts::GO_BACK_SCRIPT.to_string()));
    }

    pub fn is_showing_retry_page(&self) -> bool {
        self.lock_navigation().is_showing_retry_page()
    }

    // Permissions

    /// Requests whatever `probe` reports missing. Returns true when the
    /// answer already reloaded the site, so the caller skips its own load.
    pub fn check_permissions(&self, probe: &dyn PermissionProbe) -> bool {
        let missing = permissions::missing_permissions(probe);
        if missing.is_empty() {
            return false;
        }
        warn!("Requesting missing permissions: {:?}", missing);
        let results = probe.request(&missing);
        self.permissions_resolved(&results)
    }

    pub fn permissions_resolved(&self, results: &[(Permission, bool)]) -> bool {
        if permissions::all_granted(results) {
            info!("Permissions granted, reloading {}", self.config.base_url);
            self.retry();
            true
        } else {
            warn!("Some permissions were denied, the site may fail to load");
            false
        }
    }

    // File selection

    pub fn begin_file_selection(
        &self,
        params: &SelectionParams,
        picker: &dyn FilePicker,
    ) -> oneshot::Receiver<FileSelection> {
        self.selection.begin(params, picker)
    }

    pub fn complete_file_selection(&self, ticket: SelectionTicket, locator: Option<String>) -> bool {
        self.selection.complete(ticket, locator)
    }

    pub fn file_selection_pending(&self) -> bool {
        self.selection.is_pending()
    }

    fn send(&self, command: ShellCommand) {
        if self.commands.send(command).is_err() {
            warn!("Foreground dispatcher is gone, dropping shell command");
        }
    }

    fn send_all(&self, commands: Vec<ShellCommand>) {
        for command in commands {
            self.send(command);
        }
    }

    fn lock_navigation(&self) -> MutexGuard<'_, NavigationLifecycle> {
        self.navigation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::foreground::tests::{RecordingSurface, SurfaceCall};
    use crate::bridge::run_foreground;
    use crate::services::analysis::engine::tests::ScriptedRng;
    use crate::services::file_selection::tests::RecordingPicker;
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::Instant;

    fn shell_with(rng: ScriptedRng) -> (HostShell, CommandReceiver) {
        HostShell::new(ShellConfig::default(), Box::new(rng))
    }

    fn drain(rx: &mut CommandReceiver) -> Vec<ShellCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        commands
    }

    async fn crashing_loader() -> Result<(), AppError> {
        panic!("model file corrupted")
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end_analysis_delivers_well_typed_json() {
        let (shell, rx) = shell_with(ScriptedRng::detecting());
        shell.readiness().mark_ready();
        let surface = RecordingSurface::default();
        let observed = surface.clone();
        let dispatcher = tokio::spawn(run_foreground(rx, surface));
        let start = Instant::now();

        let request_id = shell.request_analysis("data:image/jpeg;base64,/9j/4AAQ");

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(observed.calls().is_empty());
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(start.elapsed() >= Duration::from_millis(2000));

        let calls = observed.calls();
        let script = match &calls[0] {
            SurfaceCall::Evaluate(script) => script.clone(),
            other => panic!("expected evaluate, got {:?}", other),
        };
        let json = script
            .strip_prefix("if (typeof window.handleAIAnalysisResult === 'function') { window.handleAIAnalysisResult(")
            .and_then(|rest| rest.strip_suffix("); }"))
            .unwrap();
        let value: Value = serde_json::from_str(json).unwrap();

        assert!(value["has_garbage"].is_boolean());
        assert!(value["confidence"].is_f64());
        assert!(value["garbage_types"].is_array());
        assert!(value["cleanup_priority"].is_string());
        assert!(value["analysis_time"].is_string());
        assert_eq!(value["request_id"], request_id);
        assert!(matches!(calls[1], SurfaceCall::Notify(_, NotificationKind::Success)));

        drop(shell);
        dispatcher.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_loading_until_warm_up_then_ready_forever() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());
        let shell = std::sync::Arc::new(shell);
        assert_eq!(shell.model_status(), ModelStatus::Loading);

        let warming = shell.clone();
        let handle = tokio::spawn(async move { warming.warm_up().await });

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(shell.model_status(), ModelStatus::Loading);

        assert_eq!(handle.await.unwrap(), WarmUpOutcome::Loaded);
        assert_eq!(shell.model_status(), ModelStatus::Ready);
        assert_eq!(
            drain(&mut rx),
            vec![ShellCommand::Notify {
                message: READY_MESSAGE.to_string(),
                kind: NotificationKind::Success,
            }]
        );

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(shell.model_status(), ModelStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_faulted_warm_up_never_leaves_shell_loading() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        let outcome = shell.warm_up_with(crashing_loader()).await;

        assert!(matches!(outcome, WarmUpOutcome::Fallback(_)));
        assert_eq!(shell.model_status(), ModelStatus::Ready);
        assert_eq!(
            drain(&mut rx),
            vec![ShellCommand::Notify {
                message: MODEL_FALLBACK_MESSAGE.to_string(),
                kind: NotificationKind::Info,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_before_warm_up_fails_fast() {
        let (shell, mut rx) = shell_with(ScriptedRng::detecting());

        shell.request_analysis("image");

        match drain(&mut rx).as_slice() {
            [ShellCommand::DeliverResult(result)] => {
                assert!(result.is_error());
                assert_eq!(result.confidence(), 0.0);
            }
            other => panic!("expected one error result, got {:?}", other),
        }
        assert_eq!(shell.analysis_state(), EngineState::Idle);
    }

    #[test]
    fn test_simulated_detection_is_fixed_and_ignores_readiness() {
        let (shell, _rx) = shell_with(ScriptedRng::default());

        let value: Value = serde_json::from_str(&shell.simulated_detection().unwrap()).unwrap();

        assert_eq!(value["has_garbage"], true);
        assert_eq!(value["confidence"], 0.92);
        assert_eq!(value["garbage_types"], serde_json::json!(["plastic", "paper"]));
        assert_eq!(value["cleanup_priority"], "high");
        assert!(value["analysis_time"].is_string());
        assert_eq!(shell.model_status(), ModelStatus::Loading);
    }

    #[test]
    fn test_navigation_error_then_retry_navigates_exactly_once() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        shell.load_home();
        shell.page_started("http://192.168.1.9:5000/");
        shell.page_failed("net::ERR_CONNECTION_REFUSED");
        assert!(shell.is_showing_retry_page());

        let before_retry = drain(&mut rx);
        assert_eq!(before_retry[0], ShellCommand::SetBusy(true));
        assert_eq!(before_retry[1], ShellCommand::Navigate("http://192.168.1.9:5000".to_string()));
        assert!(matches!(before_retry.last(), Some(ShellCommand::ShowRetryPage(_))));

        shell.retry();

        let after_retry = drain(&mut rx);
        let navigations: Vec<_> = after_retry
            .iter()
            .filter(|c| matches!(c, ShellCommand::Navigate(_)))
            .collect();
        assert_eq!(navigations, vec![&ShellCommand::Navigate("http://192.168.1.9:5000".to_string())]);
        assert_eq!(after_retry[0], ShellCommand::SetBusy(true));
        assert!(!shell.is_showing_retry_page());
    }

    #[test]
    fn test_page_finish_reinstalls_bootstrap() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        shell.page_finished("http://192.168.1.9:5000/login");
        shell.page_finished("http://192.168.1.9:5000/dashboard");

        let bootstraps = drain(&mut rx)
            .into_iter()
            .filter(|c| matches!(c, ShellCommand::Evaluate(s) if s.contains("window.CleanEarthAI")))
            .count();
        assert_eq!(bootstraps, 2);
    }

    #[test]
    fn test_permission_grant_reloads() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        assert!(!shell.permissions_resolved(&[(Permission::ReadStorage, false)]));
        assert!(drain(&mut rx).is_empty());

        assert!(shell.permissions_resolved(&[
            (Permission::Internet, true),
            (Permission::WriteStorage, true),
        ]));
        assert_eq!(
            drain(&mut rx),
            vec![ShellCommand::SetBusy(true), ShellCommand::Navigate("http://192.168.1.9:5000".to_string())]
        );
    }

    struct PromptingPermissions {
        grant_on_request: bool,
    }

    impl PermissionProbe for PromptingPermissions {
        fn is_granted(&self, permission: Permission) -> bool {
            !matches!(permission, Permission::ReadStorage | Permission::WriteStorage)
        }

        fn request(&self, missing: &[Permission]) -> Vec<(Permission, bool)> {
            missing.iter().map(|p| (*p, self.grant_on_request)).collect()
        }
    }

    #[test]
    fn test_check_permissions_requests_missing_and_reloads_on_grant() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        assert!(shell.check_permissions(&PromptingPermissions { grant_on_request: true }));
        assert_eq!(
            drain(&mut rx),
            vec![ShellCommand::SetBusy(true), ShellCommand::Navigate("http://192.168.1.9:5000".to_string())]
        );

        assert!(!shell.check_permissions(&PromptingPermissions { grant_on_request: false }));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_check_permissions_on_desktop_leaves_loading_to_caller() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        assert!(!shell.check_permissions(&permissions::DesktopPermissions));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_go_back_evaluates_guarded_history_step() {
        let (shell, mut rx) = shell_with(ScriptedRng::default());

        shell.go_back();

        assert_eq!(
            drain(&mut rx),
            vec![ShellCommand::Evaluate(
                "if (window.history.length > 1) { window.history.back(); }".to_string()
            )]
        );
    }

    #[test]
    fn test_file_selection_through_shell() {
        let (shell, _rx) = shell_with(ScriptedRng::default());
        let picker = RecordingPicker::default();

        let mut rx = shell.begin_file_selection(&SelectionParams::images(), &picker);
        assert!(shell.file_selection_pending());

        assert!(shell.complete_file_selection(picker.last_ticket(), None));
        assert_eq!(rx.try_recv().unwrap(), None);
        assert!(!shell.file_selection_pending());
    }
}
