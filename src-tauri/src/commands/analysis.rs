use cleanearth_core::models::analysis_types::ModelStatus;
use cleanearth_core::{AppError, HostShell};
use std::sync::Arc;
use tauri::State;

/// Accepts an image for analysis and returns its request id. The result is
/// pushed to `handleAIAnalysisResult` once the simulated delay has elapsed.
#[tauri::command]
pub async fn request_analysis(
    shell: State<'_, Arc<HostShell>>,
    image_data: String,
) -> Result<u64, AppError> {
    Ok(shell.request_analysis(&image_data))
}

#[tauri::command]
pub fn get_model_status(shell: State<'_, Arc<HostShell>>) -> ModelStatus {
    shell.model_status()
}

#[tauri::command]
pub fn get_simulated_detection(shell: State<'_, Arc<HostShell>>) -> Result<String, AppError> {
    shell.simulated_detection()
}
