use crate::picker::DialogPicker;
use cleanearth_core::models::selection_types::{FileSelection, SelectionParams};
use cleanearth_core::{AppError, HostShell};
use std::sync::Arc;
use tauri::{AppHandle, State};

#[tauri::command]
pub async fn select_file(
    app: AppHandle,
    shell: State<'_, Arc<HostShell>>,
    params: Option<SelectionParams>,
) -> Result<FileSelection, AppError> {
    let params = params.unwrap_or_else(SelectionParams::images);
    let picker = DialogPicker::new(app);
    let selection = shell.begin_file_selection(&params, &picker);
    // A dropped responder means the request was abandoned.
    Ok(selection.await.unwrap_or(None))
}
