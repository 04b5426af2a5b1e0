use cleanearth_core::HostShell;
use std::sync::Arc;
use tauri::State;

#[tauri::command]
pub fn retry_navigation(shell: State<'_, Arc<HostShell>>) {
    shell.retry();
}

#[tauri::command]
pub fn go_back(shell: State<'_, Arc<HostShell>>) {
    shell.go_back();
}
